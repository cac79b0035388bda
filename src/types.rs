//! Core types shared across the prediction pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feature names in the order the classifiers were trained on
pub const FEATURE_NAMES: [&str; 9] = [
    "ph",
    "Hardness",
    "Solids",
    "Chloramines",
    "Sulfate",
    "Conductivity",
    "Organic_carbon",
    "Trihalomethanes",
    "Turbidity",
];

/// Number of features every classifier consumes
pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// Payload key that is always replaced by the telemetry reading
pub const SOLIDS_FIELD: &str = "Solids";

/// Validated, ordered input for the classifiers.
///
/// Every value is finite. Only the validator and [`FeatureVector::new`]
/// construct one, so holding a `FeatureVector` means the invariant holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build from raw values; on failure returns the name of the first
    /// non-finite feature in training order
    pub fn new(values: [f64; FEATURE_COUNT]) -> Result<Self, &'static str> {
        match values.iter().position(|v| !v.is_finite()) {
            Some(idx) => Err(FEATURE_NAMES[idx]),
            None => Ok(Self(values)),
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Look up a value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }

    pub fn solids(&self) -> f64 {
        self.0[2]
    }
}

/// Where a telemetry value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    /// Parsed from the provider's response
    Provider,
    /// Provider unavailable or response unusable
    Fallback,
}

/// A single telemetry value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReading {
    pub value: f64,
    pub source: ReadingSource,
    /// Provider timestamp of the entry, when reported
    pub created_at: Option<DateTime<Utc>>,
    pub entry_id: Option<u64>,
}

impl TelemetryReading {
    /// Value used whenever the provider cannot be read
    pub const FALLBACK_VALUE: f64 = 0.0;

    pub fn fallback() -> Self {
        Self {
            value: Self::FALLBACK_VALUE,
            source: ReadingSource::Fallback,
            created_at: None,
            entry_id: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ReadingSource::Fallback
    }
}

/// Label produced by one classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelLabel {
    pub model: String,
    pub label: i64,
}

/// Labels from both classifiers for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    pub decision_tree: ModelLabel,
    pub knn: ModelLabel,
}

/// Wire shape of a successful `/predict` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "Decision_Tree_Prediction")]
    pub decision_tree: i64,
    #[serde(rename = "KNN_Prediction")]
    pub knn: i64,
}

impl From<&PredictionResult> for PredictionResponse {
    fn from(result: &PredictionResult) -> Self {
        Self {
            decision_tree: result.decision_tree.label,
            knn: result.knn.label,
        }
    }
}

/// Wire shape of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

//! Test doubles shared by module tests

use crate::error::ModelError;
use crate::model::{Classifier, ModelHandle, PredictionEngine};
use crate::types::{FeatureVector, FEATURE_COUNT};
use std::sync::{Arc, Mutex};

/// Body of the documented end-to-end request (no `Solids`)
pub const SAMPLE_PAYLOAD: &str = r#"{"ph":7.0,"Hardness":150,"Chloramines":5,"Sulfate":250,"Conductivity":400,"Organic_carbon":10,"Trihalomethanes":60,"Turbidity":3}"#;

/// `SAMPLE_PAYLOAD` as classifier input with `Solids` = 0
pub const SAMPLE_VALUES: [f64; FEATURE_COUNT] =
    [7.0, 150.0, 0.0, 5.0, 250.0, 400.0, 10.0, 60.0, 3.0];

pub fn sample_vector() -> FeatureVector {
    FeatureVector::new(SAMPLE_VALUES).expect("sample values are finite")
}

/// Returns a fixed label and remembers every sample it saw
pub struct RecordingClassifier {
    label: i64,
    seen: Mutex<Vec<Vec<f64>>>,
}

impl RecordingClassifier {
    pub fn new(label: i64) -> Arc<Self> {
        Arc::new(Self {
            label,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<Vec<f64>> {
        self.seen.lock().expect("lock poisoned").clone()
    }
}

impl Classifier for RecordingClassifier {
    fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
        self.seen
            .lock()
            .expect("lock poisoned")
            .push(features.to_vec());
        Ok(self.label)
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }
}

/// Always fails inference
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict(&self, _features: &[f64]) -> Result<i64, ModelError> {
        Err(ModelError::Inference("model exploded".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }
}

/// Panics during inference
pub struct PanickingClassifier;

impl Classifier for PanickingClassifier {
    fn predict(&self, _features: &[f64]) -> Result<i64, ModelError> {
        panic!("index out of bounds in leaf table")
    }

    fn name(&self) -> &str {
        "panicking"
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }
}

/// Engine with both models present, returning fixed labels
pub fn ready_engine(tree_label: i64, knn_label: i64) -> PredictionEngine {
    PredictionEngine::new(
        Some(RecordingClassifier::new(tree_label) as ModelHandle),
        Some(RecordingClassifier::new(knn_label) as ModelHandle),
    )
}

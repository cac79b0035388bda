//! Classifiers and the dual-model prediction engine
//!
//! Both models are loaded once at startup and shared read-only across
//! requests. A model that fails to load stays absent; the engine then
//! refuses to classify instead of running with half its inputs.

mod decision_tree;
mod knn;

pub use decision_tree::{DecisionTree, TreeNode};
pub use knn::{KnnClassifier, Scaler};

use crate::config::ModelsConfig;
use crate::error::{ClassifyError, ModelError};
use crate::types::{FeatureVector, ModelLabel, PredictionResult, FEATURE_COUNT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// A loaded classifier
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    /// Predict the class label for one sample
    fn predict(&self, features: &[f64]) -> Result<i64, ModelError>;

    /// Model name for logging
    fn name(&self) -> &str;

    /// Number of features the model was trained on
    fn n_features(&self) -> usize;
}

/// Shared, immutable handle to a loaded classifier
pub type ModelHandle = Arc<dyn Classifier>;

/// Which models are available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelStatus {
    pub decision_tree: bool,
    pub knn: bool,
}

impl ModelStatus {
    pub fn all_loaded(&self) -> bool {
        self.decision_tree && self.knn
    }
}

/// Runs both classifiers on the same feature vector
pub struct PredictionEngine {
    decision_tree: Option<ModelHandle>,
    knn: Option<ModelHandle>,
}

impl PredictionEngine {
    pub fn new(decision_tree: Option<ModelHandle>, knn: Option<ModelHandle>) -> Self {
        Self { decision_tree, knn }
    }

    /// Load both artifacts from the configured directory.
    ///
    /// Load failures are logged and leave the model absent.
    pub fn load(config: &ModelsConfig) -> Self {
        let decision_tree = load_handle(&config.decision_tree_path(), |p| {
            DecisionTree::from_file(p).map(|m| Arc::new(m) as ModelHandle)
        });
        let knn = load_handle(&config.knn_path(), |p| {
            KnnClassifier::from_file(p).map(|m| Arc::new(m) as ModelHandle)
        });

        let engine = Self::new(decision_tree, knn);
        if engine.is_ready() {
            info!("Models loaded successfully");
        } else {
            error!(
                "Model files missing or invalid in {}; predictions are disabled",
                config.resolved_dir().display()
            );
        }
        engine
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus {
            decision_tree: self.decision_tree.is_some(),
            knn: self.knn.is_some(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status().all_loaded()
    }

    /// Classify with both models; either both labels or an error
    pub fn classify(&self, vector: &FeatureVector) -> Result<PredictionResult, ClassifyError> {
        let (Some(decision_tree), Some(knn)) = (&self.decision_tree, &self.knn) else {
            return Err(ClassifyError::ModelsNotLoaded);
        };

        let features = vector.as_slice();
        Ok(PredictionResult {
            decision_tree: ModelLabel {
                model: decision_tree.name().to_string(),
                label: decision_tree.predict(features)?,
            },
            knn: ModelLabel {
                model: knn.name().to_string(),
                label: knn.predict(features)?,
            },
        })
    }
}

fn load_handle<F>(path: &Path, load: F) -> Option<ModelHandle>
where
    F: FnOnce(&Path) -> Result<ModelHandle, ModelError>,
{
    let loaded = load(path).and_then(|model| {
        if model.n_features() == FEATURE_COUNT {
            Ok(model)
        } else {
            Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                actual: model.n_features(),
            })
        }
    });

    match loaded {
        Ok(model) => {
            info!("Loaded {} model from {}", model.name(), path.display());
            Some(model)
        }
        Err(e) => {
            error!("Failed to load model {}: {}", path.display(), e);
            None
        }
    }
}

/// Read and deserialize a JSON model artifact
pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ModelError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&raw).map_err(|e| ModelError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

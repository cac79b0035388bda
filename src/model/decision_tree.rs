//! Decision tree classifier loaded from a JSON artifact
//!
//! Nodes are stored flat in pre-order, root at index 0. A split sends the
//! sample left when `x[feature] <= threshold`, matching how the tree was
//! trained.

use super::{read_artifact, Classifier};
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        label: i64,
    },
}

#[derive(Debug, Deserialize)]
struct DecisionTreeArtifact {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    n_features: usize,
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Build a tree, rejecting layouts that could index out of range or loop
    pub fn new(n_features: usize, nodes: Vec<TreeNode>) -> Result<Self, ModelError> {
        if nodes.is_empty() {
            return Err(ModelError::Invalid("decision tree has no nodes".to_string()));
        }

        for (idx, node) in nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(ModelError::Invalid(format!(
                        "node {} splits on feature {} but the tree has {} features",
                        idx, feature, n_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ModelError::Invalid(format!(
                        "node {} has a non-finite threshold",
                        idx
                    )));
                }
                // Children after their parent keeps traversal acyclic
                for child in [*left, *right] {
                    if child <= idx || child >= nodes.len() {
                        return Err(ModelError::Invalid(format!(
                            "node {} has invalid child index {}",
                            idx, child
                        )));
                    }
                }
            }
        }

        Ok(Self { n_features, nodes })
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: DecisionTreeArtifact =
            serde_json::from_str(json).map_err(|e| ModelError::Parse {
                path: "<inline>".to_string(),
                source: e,
            })?;
        Self::new(artifact.n_features, artifact.nodes)
    }

    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let artifact: DecisionTreeArtifact = read_artifact(path)?;
        Self::new(artifact.n_features, artifact.nodes)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { label }) => return Ok(*label),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                None => {
                    return Err(ModelError::Inference(format!(
                        "decision tree reached missing node {}",
                        idx
                    )))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

//! Decision tree inference for exported water quality models.
//!
//! The production model is a scikit-learn `DecisionTreeClassifier` trained
//! offline. It is exported to JSON (parallel node arrays flattened into one
//! record per node) and evaluated here in pure Rust; this module handles
//! inference only, never training.
//!
//! # Export format
//!
//! ```text
//! {
//!   "feature_names": ["suhu", "ph", "do", "tds"],
//!   "classes": ["Kurang Layak", "Layak", "Tidak Layak"],
//!   "nodes": [
//!     {"feature": 1, "threshold": 6.25, "left": 1, "right": 2},
//!     {"feature": -2, "threshold": -2.0, "left": -1, "right": -1, "value": [12, 0, 3]},
//!     ...
//!   ]
//! }
//! ```
//!
//! Samples with `feature <= threshold` go left. A node with a negative
//! `feature` is a leaf; its `value` holds the training class counts, which
//! give both the predicted class (argmax) and the class probabilities.

use std::path::Path;

use serde::Deserialize;

use super::labels::ClassProbabilities;
use super::predictor::{ModelError, Predictor};
use crate::model::{Parameter, RawLabel, Reading};

// ---------------------------------------------------------------------------
// Export structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExportedTree {
    feature_names: Vec<String>,
    classes: Vec<RawLabel>,
    nodes: Vec<ExportedNode>,
}

#[derive(Debug, Deserialize)]
struct ExportedNode {
    feature: i64,
    threshold: f64,
    left: i64,
    right: i64,
    #[serde(default)]
    value: Vec<f64>,
}

// ---------------------------------------------------------------------------
// Validated tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        counts: Vec<f64>,
    },
}

/// A validated decision tree over the four water quality parameters.
#[derive(Debug, Clone)]
pub struct DecisionTreeModel {
    /// Column order the tree was trained with.
    features: Vec<Parameter>,
    classes: Vec<RawLabel>,
    nodes: Vec<Node>,
    source: String,
}

impl DecisionTreeModel {
    /// Loads and validates an exported tree from disk.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
        let mut model = Self::from_json(&text)?;
        model.source = path.display().to_string();
        Ok(model)
    }

    /// Parses and validates an exported tree.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let exported: ExportedTree =
            serde_json::from_str(json).map_err(|e| ModelError::ParseError(e.to_string()))?;
        Self::from_export(exported)
    }

    fn from_export(exported: ExportedTree) -> Result<Self, ModelError> {
        let features = exported
            .feature_names
            .iter()
            .map(|name| {
                Parameter::ALL
                    .iter()
                    .copied()
                    .find(|p| p.field() == name.trim())
                    .ok_or_else(|| ModelError::InvalidModel(format!("unknown feature '{}'", name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if exported.classes.is_empty() {
            return Err(ModelError::InvalidModel("no classes".into()));
        }
        if exported.nodes.is_empty() {
            return Err(ModelError::InvalidModel("no nodes".into()));
        }

        let n_nodes = exported.nodes.len();
        let n_classes = exported.classes.len();
        let mut nodes = Vec::with_capacity(n_nodes);

        for (i, node) in exported.nodes.into_iter().enumerate() {
            if node.feature < 0 {
                if node.value.len() != n_classes {
                    return Err(ModelError::InvalidModel(format!(
                        "leaf {} has {} class counts, expected {}",
                        i,
                        node.value.len(),
                        n_classes
                    )));
                }
                if node.value.iter().any(|c| !c.is_finite() || *c < 0.0)
                    || node.value.iter().sum::<f64>() <= 0.0
                {
                    return Err(ModelError::InvalidModel(format!(
                        "leaf {} has unusable class counts",
                        i
                    )));
                }
                nodes.push(Node::Leaf { counts: node.value });
                continue;
            }

            let feature = usize::try_from(node.feature)
                .ok()
                .filter(|f| *f < features.len())
                .ok_or_else(|| {
                    ModelError::InvalidModel(format!("node {} splits on unknown feature", i))
                })?;
            // Children must point forward; this also rules out cycles.
            let child = |c: i64| {
                usize::try_from(c)
                    .ok()
                    .filter(|c| *c > i && *c < n_nodes)
                    .ok_or_else(|| {
                        ModelError::InvalidModel(format!("node {} has invalid child {}", i, c))
                    })
            };
            if !node.threshold.is_finite() {
                return Err(ModelError::InvalidModel(format!(
                    "node {} has non-finite threshold",
                    i
                )));
            }
            nodes.push(Node::Split {
                feature,
                threshold: node.threshold,
                left: child(node.left)?,
                right: child(node.right)?,
            });
        }

        Ok(Self {
            features,
            classes: exported.classes,
            nodes,
            source: "<inline>".to_string(),
        })
    }

    /// Number of nodes in the tree.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Walks from the root to a leaf and returns that leaf's class counts.
    fn leaf_counts(&self, reading: &Reading) -> Result<&[f64], ModelError> {
        let mut idx = 0usize;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { counts }) => return Ok(counts),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = self.features[*feature].value_in(reading);
                    idx = if value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ModelError::InvalidModel(format!("dangling node {}", idx)));
                }
            }
        }
    }
}

impl Predictor for DecisionTreeModel {
    fn describe(&self) -> String {
        format!("decision tree ({} nodes) from {}", self.nodes.len(), self.source)
    }

    fn predict(&self, reading: &Reading) -> Result<RawLabel, ModelError> {
        let counts = self.leaf_counts(reading)?;
        // First maximum wins on ties.
        let best = counts
            .iter()
            .enumerate()
            .fold(0, |best, (i, c)| if *c > counts[best] { i } else { best });
        Ok(self.classes[best].clone())
    }

    fn predict_probability(
        &self,
        reading: &Reading,
    ) -> Result<Option<ClassProbabilities>, ModelError> {
        let counts = self.leaf_counts(reading)?;
        let total: f64 = counts.iter().sum();
        let probabilities = self
            .classes
            .iter()
            .zip(counts)
            .map(|(class, count)| (class.to_string(), count / total))
            .collect();
        Ok(Some(probabilities))
    }
}

//! Water quality classifiers.
//!
//! Submodules:
//! - `threshold`     — deterministic three-tier rule engine (always available).
//! - `labels`        — folding model output onto the shared 0/1/2 labels.
//! - `predictor`     — the model capability trait and model-path classification.
//! - `decision_tree` — in-process inference for exported decision trees.
//! - `remote`        — predictor backed by an HTTP prediction sidecar.

pub mod decision_tree;
pub mod labels;
pub mod predictor;
pub mod remote;
pub mod threshold;

pub use decision_tree::DecisionTreeModel;
pub use labels::{ClassProbabilities, confidence_from_probabilities, normalize_label};
pub use predictor::{ModelError, Predictor, classify_with_model};
pub use remote::RemoteModel;
pub use threshold::{classify_reading, classify_threshold, evaluate_parameter};

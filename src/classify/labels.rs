//! Mapping model output onto the shared label numbering.
//!
//! Models trained on the field data emit free-text class names with
//! inconsistent casing ("Kurang Layak", "Kurang layak", ...). Everything is
//! folded onto [`Label`] here so both classification paths agree on 0/1/2.
//!
//! # Unrecognized text
//! Unknown names map to `Suitable`. This optimistic default matches the
//! deployed behaviour but may hide a mislabeled model; it is kept, and every
//! occurrence is logged as a warning so it shows up in operations.

use std::collections::BTreeMap;

use crate::logging::{self, Component};
use crate::model::{ClassifyError, Label, RawLabel};

/// Class probabilities keyed by the model's own class name.
pub type ClassProbabilities = BTreeMap<String, f64>;

/// Label assumed for class names nobody recognizes.
pub const DEFAULT_LABEL: Label = Label::Suitable;

/// Known class names, lowercase.
const KNOWN_NAMES: &[(&str, Label)] = &[
    ("layak", Label::Suitable),
    ("kurang layak", Label::MarginallySuitable),
    ("tidak layak", Label::NotSuitable),
    ("suitable", Label::Suitable),
    ("marginally suitable", Label::MarginallySuitable),
    ("not suitable", Label::NotSuitable),
];

/// Looks up a class name, ignoring case and surrounding whitespace.
/// Returns `None` for names outside the known set.
pub fn lookup_label(text: &str) -> Option<Label> {
    let wanted = text.trim().to_lowercase();
    KNOWN_NAMES
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, label)| *label)
}

/// Normalizes free-text model output to a label, defaulting to
/// [`DEFAULT_LABEL`] for anything unrecognized.
pub fn normalize_label(text: &str) -> Label {
    match lookup_label(text) {
        Some(label) => label,
        None => {
            logging::warn(
                Component::Model,
                None,
                &format!(
                    "unrecognized class label {:?}, defaulting to {}",
                    text,
                    DEFAULT_LABEL.name()
                ),
            );
            DEFAULT_LABEL
        }
    }
}

/// Maps any raw model label to the shared numbering.
///
/// Text goes through [`normalize_label`]. Numeric class codes outside 0..=2
/// cannot be placed on the shared scale and are reported as unexpected.
pub fn map_raw_label(raw: &RawLabel) -> Result<Label, ClassifyError> {
    match raw {
        RawLabel::Text(text) => Ok(normalize_label(text)),
        RawLabel::Index(code) => Label::from_code(*code).ok_or_else(|| {
            ClassifyError::Unexpected(format!("model returned unknown class code {}", code))
        }),
    }
}

/// Confidence as a percentage: the largest class probability × 100.
/// Returns `None` if there are no finite probabilities.
pub fn confidence_from_probabilities(probabilities: &ClassProbabilities) -> Option<f64> {
    probabilities
        .values()
        .copied()
        .filter(|p| p.is_finite())
        .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.max(p))))
        .map(|p| p * 100.0)
}

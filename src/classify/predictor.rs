//! Model collaborator boundary.
//!
//! A [`Predictor`] is anything that maps a reading to a class label and,
//! optionally, a probability per class. The service never inspects model
//! internals; it only needs these two capabilities, which keeps the
//! classification path testable against a stub.

use std::fmt;

use super::labels::{ClassProbabilities, confidence_from_probabilities, map_raw_label};
use crate::logging;
use crate::model::{ClassificationResult, ClassifyError, Detail, Method, ModelOutput, RawLabel, Reading};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by a model while loading or predicting.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The model file could not be read.
    Io(String),
    /// The model definition or a model response could not be parsed.
    ParseError(String),
    /// The model definition is structurally unusable.
    InvalidModel(String),
    /// A remote model answered with a non-2xx status.
    HttpError(u16),
    /// A remote model could not be reached.
    Transport(String),
    /// The model declined to produce this output (e.g. no probabilities).
    Unsupported(&'static str),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Io(msg) => write!(f, "I/O error: {}", msg),
            ModelError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ModelError::InvalidModel(msg) => write!(f, "Invalid model: {}", msg),
            ModelError::HttpError(code) => write!(f, "HTTP error: {}", code),
            ModelError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ModelError::Unsupported(what) => write!(f, "Unsupported: {}", what),
        }
    }
}

impl std::error::Error for ModelError {}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// A pre-trained classifier.
///
/// Implementations are shared across HTTP worker threads.
pub trait Predictor: Send + Sync {
    /// Short description for logs and the startup banner.
    fn describe(&self) -> String;

    /// Predicts the class of a reading.
    fn predict(&self, reading: &Reading) -> Result<RawLabel, ModelError>;

    /// Probability per class, if the model can provide them.
    fn predict_probability(
        &self,
        _reading: &Reading,
    ) -> Result<Option<ClassProbabilities>, ModelError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Model classification
// ---------------------------------------------------------------------------

/// Classifies a reading with a model and maps the answer onto the shared
/// result schema.
///
/// A failed prediction is reported as [`ClassifyError::ModelUnavailable`] so
/// the caller can fall back to the threshold classifier. A failed probability
/// lookup only drops the confidence.
pub fn classify_with_model(
    predictor: &dyn Predictor,
    reading: &Reading,
) -> Result<ClassificationResult, ClassifyError> {
    let raw = predictor
        .predict(reading)
        .map_err(|e| ClassifyError::ModelUnavailable(e.to_string()))?;

    let label = map_raw_label(&raw)?;

    let confidence = match predictor.predict_probability(reading) {
        Ok(Some(probabilities)) => confidence_from_probabilities(&probabilities),
        Ok(None) => None,
        Err(e) => {
            logging::log_model_failure(&predictor.describe(), "predict_probability", &e);
            None
        }
    };

    Ok(ClassificationResult {
        classification: label,
        classification_label: label.name(),
        confidence,
        method: Method::DecisionTreeModel,
        detail: Detail::Model(ModelOutput {
            original_prediction: raw.to_string(),
            input: *reading,
        }),
        note: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Label;

    struct StubModel {
        label: Result<RawLabel, ModelError>,
        probabilities: Result<Option<ClassProbabilities>, ModelError>,
    }

    impl Predictor for StubModel {
        fn describe(&self) -> String {
            "stub".to_string()
        }

        fn predict(&self, _reading: &Reading) -> Result<RawLabel, ModelError> {
            self.label.clone()
        }

        fn predict_probability(
            &self,
            _reading: &Reading,
        ) -> Result<Option<ClassProbabilities>, ModelError> {
            self.probabilities.clone()
        }
    }

    fn reading() -> Reading {
        Reading::new(7.0, 200.0, 24.0, 5.0)
    }

    #[test]
    fn test_text_label_with_probabilities() {
        let mut probs = ClassProbabilities::new();
        probs.insert("Kurang layak".to_string(), 0.2);
        probs.insert("Layak".to_string(), 0.8);
        let model = StubModel {
            label: Ok(RawLabel::Text("Kurang layak".to_string())),
            probabilities: Ok(Some(probs)),
        };

        let result = classify_with_model(&model, &reading()).expect("model succeeds");
        assert_eq!(result.classification, Label::MarginallySuitable);
        assert_eq!(result.classification_label, "Kurang Layak");
        assert_eq!(result.method, Method::DecisionTreeModel);
        assert_eq!(result.confidence, Some(80.0));
        let output = result.model_output().expect("model detail");
        assert_eq!(output.original_prediction, "Kurang layak");
        assert_eq!(output.input, reading());
    }

    #[test]
    fn test_probability_failure_only_drops_confidence() {
        let model = StubModel {
            label: Ok(RawLabel::Index(2)),
            probabilities: Err(ModelError::Unsupported("predict_proba")),
        };
        let result = classify_with_model(&model, &reading()).expect("model succeeds");
        assert_eq!(result.classification, Label::NotSuitable);
        assert_eq!(result.confidence, None);
        assert_eq!(result.model_output().unwrap().original_prediction, "2");
    }

    #[test]
    fn test_prediction_failure_is_model_unavailable() {
        let model = StubModel {
            label: Err(ModelError::Transport("connection refused".to_string())),
            probabilities: Ok(None),
        };
        let err = classify_with_model(&model, &reading()).unwrap_err();
        assert!(matches!(err, ClassifyError::ModelUnavailable(_)));
    }

    #[test]
    fn test_out_of_range_class_code_is_unexpected() {
        let model = StubModel {
            label: Ok(RawLabel::Index(9)),
            probabilities: Ok(None),
        };
        let err = classify_with_model(&model, &reading()).unwrap_err();
        assert!(matches!(err, ClassifyError::Unexpected(_)));
    }
}

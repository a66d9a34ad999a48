/// Reading, Label, ParameterVerdict, ClassificationResult, ClassifyError
/// core data structures and error handling
///
/// Core data types for the water quality classification service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no classification logic and no I/O, only types and their
/// wire representations.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Wire field names
// ---------------------------------------------------------------------------

/// Request field carrying the pH reading.
pub const FIELD_PH: &str = "ph";

/// Request field carrying total dissolved solids, in mg/L.
pub const FIELD_TDS: &str = "tds";

/// Request field carrying water temperature, in °C.
pub const FIELD_TEMPERATURE: &str = "suhu";

/// Request field carrying dissolved oxygen, in mg/L.
pub const FIELD_DO: &str = "do";

/// All required request fields, in the order they are reported to callers.
pub const REQUIRED_FIELDS: [&str; 4] = [FIELD_PH, FIELD_TDS, FIELD_TEMPERATURE, FIELD_DO];

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One water sample: the four measured parameters.
///
/// A plain value type with no identity. Serializes with the wire names used
/// by the HTTP API (`suhu` for temperature, `do` for dissolved oxygen), which
/// is also the shape echoed back as `input` by the model path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub ph: f64,
    /// Total dissolved solids, mg/L.
    pub tds: f64,
    /// Water temperature, °C.
    #[serde(rename = "suhu")]
    pub temperature: f64,
    /// Dissolved oxygen, mg/L.
    #[serde(rename = "do")]
    pub dissolved_oxygen: f64,
}

impl Reading {
    pub const fn new(ph: f64, tds: f64, temperature: f64, dissolved_oxygen: f64) -> Self {
        Self {
            ph,
            tds,
            temperature,
            dissolved_oxygen,
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Suitability class, shared by per-parameter verdicts and the overall result.
///
/// The numeric codes are frozen: both classifiers and every downstream
/// consumer agree that 0 = marginal, 1 = suitable, 2 = not suitable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    MarginallySuitable,
    Suitable,
    NotSuitable,
}

impl Label {
    /// Numeric class code used on the wire.
    pub const fn code(self) -> u8 {
        match self {
            Label::MarginallySuitable => 0,
            Label::Suitable => 1,
            Label::NotSuitable => 2,
        }
    }

    /// Inverse of [`Label::code`].
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Label::MarginallySuitable),
            1 => Some(Label::Suitable),
            2 => Some(Label::NotSuitable),
            _ => None,
        }
    }

    /// Display name sent as `classification_label`.
    pub const fn name(self) -> &'static str {
        match self {
            Label::MarginallySuitable => "Kurang Layak",
            Label::Suitable => "Layak",
            Label::NotSuitable => "Tidak Layak",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A class label exactly as a model produced it: either a class index or
/// free text such as `"Kurang layak"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Index(i64),
    Text(String),
}

impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLabel::Index(i) => write!(f, "{}", i),
            RawLabel::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Which classifier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    SimpleThreshold,
    DecisionTreeModel,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::SimpleThreshold => "simple_threshold",
            Method::DecisionTreeModel => "decision_tree_model",
        }
    }
}

// ---------------------------------------------------------------------------
// Verdicts and results
// ---------------------------------------------------------------------------

/// The four measured parameters, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Ph,
    Tds,
    Temperature,
    DissolvedOxygen,
}

impl Parameter {
    /// Evaluation order for the threshold classifier; reasons follow it.
    pub const ALL: [Parameter; 4] = [
        Parameter::Ph,
        Parameter::Tds,
        Parameter::Temperature,
        Parameter::DissolvedOxygen,
    ];

    /// Wire field name.
    pub const fn field(self) -> &'static str {
        match self {
            Parameter::Ph => FIELD_PH,
            Parameter::Tds => FIELD_TDS,
            Parameter::Temperature => FIELD_TEMPERATURE,
            Parameter::DissolvedOxygen => FIELD_DO,
        }
    }

    pub fn value_in(self, reading: &Reading) -> f64 {
        match self {
            Parameter::Ph => reading.ph,
            Parameter::Tds => reading.tds,
            Parameter::Temperature => reading.temperature,
            Parameter::DissolvedOxygen => reading.dissolved_oxygen,
        }
    }
}

/// The verdict for one parameter of one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterVerdict {
    pub parameter: Parameter,
    pub value: f64,
    pub verdict: Label,
    /// Human-readable explanation; `None` when the verdict is `Suitable`.
    pub reason: Option<String>,
}

/// Threshold-path details: reasons and per-tier counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdBreakdown {
    /// One entry per non-suitable parameter, in evaluation order.
    pub reasons: Vec<String>,
    pub not_suitable_count: usize,
    pub less_suitable_count: usize,
    #[serde(skip)]
    pub verdicts: Vec<ParameterVerdict>,
}

/// Model-path details: what the model literally said and what it was fed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelOutput {
    pub original_prediction: String,
    pub input: Reading,
}

/// Method-specific part of a result. Flattened into the response body, so
/// only the fields of the active variant appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Detail {
    Threshold(ThresholdBreakdown),
    Model(ModelOutput),
}

/// The unified result shape emitted by both classifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub classification: Label,
    pub classification_label: &'static str,
    /// Maximum class probability as a percentage. Always `None` for the
    /// threshold method.
    pub confidence: Option<f64>,
    pub method: Method,
    #[serde(flatten)]
    pub detail: Detail,
    /// Set when the threshold classifier stood in for the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ClassificationResult {
    /// The threshold breakdown, if this result came from the threshold path.
    pub fn threshold(&self) -> Option<&ThresholdBreakdown> {
        match &self.detail {
            Detail::Threshold(t) => Some(t),
            Detail::Model(_) => None,
        }
    }

    /// The model output, if this result came from the model path.
    pub fn model_output(&self) -> Option<&ModelOutput> {
        match &self.detail {
            Detail::Model(m) => Some(m),
            Detail::Threshold(_) => None,
        }
    }

    /// Reasons from the threshold path; empty for model results.
    pub fn reasons(&self) -> &[String] {
        self.threshold().map(|t| t.reasons.as_slice()).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors a classification request can end in.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// One or more required fields are absent from the request body.
    MissingParameter(Vec<&'static str>),
    /// A field (or the body itself) could not be read as a real number.
    InvalidValue { parameter: String, detail: String },
    /// The model could not produce a prediction. Never reported to callers:
    /// the service falls back to the threshold classifier instead.
    ModelUnavailable(String),
    /// Anything else that went wrong while classifying.
    Unexpected(String),
}

impl ClassifyError {
    /// HTTP status code the request handler answers with.
    pub const fn status_code(&self) -> u16 {
        match self {
            ClassifyError::MissingParameter(_) | ClassifyError::InvalidValue { .. } => 400,
            ClassifyError::ModelUnavailable(_) | ClassifyError::Unexpected(_) => 500,
        }
    }
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::MissingParameter(_) => write!(
                f,
                "Missing required parameters. Need: {}",
                REQUIRED_FIELDS.join(", ")
            ),
            ClassifyError::InvalidValue { parameter, detail } => {
                write!(f, "Invalid input values: {}: {}", parameter, detail)
            }
            ClassifyError::ModelUnavailable(msg) => write!(f, "Model unavailable: {}", msg),
            ClassifyError::Unexpected(msg) => write!(f, "Classification failed: {}", msg),
        }
    }
}

impl std::error::Error for ClassifyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_codes_are_frozen() {
        assert_eq!(Label::MarginallySuitable.code(), 0);
        assert_eq!(Label::Suitable.code(), 1);
        assert_eq!(Label::NotSuitable.code(), 2);
        for code in 0..=2 {
            let label = Label::from_code(code).expect("codes 0..=2 are defined");
            assert_eq!(i64::from(label.code()), code);
        }
        assert_eq!(Label::from_code(3), None);
        assert_eq!(Label::from_code(-1), None);
    }

    #[test]
    fn test_label_serializes_as_number() {
        let json = serde_json::to_value(Label::NotSuitable).unwrap();
        assert_eq!(json, serde_json::json!(2));
    }

    #[test]
    fn test_reading_serializes_with_wire_names() {
        let json = serde_json::to_value(Reading::new(7.0, 200.0, 24.0, 5.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ph": 7.0, "tds": 200.0, "suhu": 24.0, "do": 5.0})
        );
    }

    #[test]
    fn test_raw_label_deserializes_number_or_text() {
        let idx: RawLabel = serde_json::from_str("2").unwrap();
        assert_eq!(idx, RawLabel::Index(2));
        let text: RawLabel = serde_json::from_str("\"Kurang layak\"").unwrap();
        assert_eq!(text, RawLabel::Text("Kurang layak".to_string()));
    }

    #[test]
    fn test_missing_parameter_message_names_all_fields() {
        let err = ClassifyError::MissingParameter(vec!["do"]);
        assert_eq!(
            err.to_string(),
            "Missing required parameters. Need: ph, tds, suhu, do"
        );
        assert_eq!(err.status_code(), 400);
    }
}

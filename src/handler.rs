//! Request handling for the classification API.
//!
//! Everything here is transport-independent: handlers take the request
//! method, path and body text and return a status code plus a JSON body.
//! The `server` module only moves bytes between sockets and these functions,
//! so the full request/response contract is tested without networking.
//!
//! # Classifier selection
//! The model is used when one is loaded. If it is not loaded, or it fails
//! while predicting, the threshold classifier answers instead and the
//! response carries a `note` saying so. Model failure is never surfaced to
//! the caller as an error.

use serde_json::{Value, json};

use crate::classify::predictor::{Predictor, classify_with_model};
use crate::classify::threshold::classify_reading;
use crate::logging::{self, Component};
use crate::model::{ClassificationResult, ClassifyError, REQUIRED_FIELDS, Reading};

/// Note attached when no model was loaded at startup.
pub const NOTE_MODEL_NOT_LOADED: &str = "Using fallback classification (model not loaded)";

/// Note attached when the loaded model failed on this request.
pub const NOTE_MODEL_FAILED: &str = "Using fallback classification (model prediction failed)";

pub const HEALTH_MESSAGE: &str = "Classification API is running";

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Holds the optional model and picks the classification path per request.
pub struct ClassifierService {
    model: Option<Box<dyn Predictor>>,
}

impl ClassifierService {
    pub fn new(model: Option<Box<dyn Predictor>>) -> Self {
        Self { model }
    }

    /// A service that always uses the threshold classifier.
    pub fn threshold_only() -> Self {
        Self { model: None }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_description(&self) -> Option<String> {
        self.model.as_ref().map(|m| m.describe())
    }

    /// Classifies a reading, falling back to thresholds when the model is
    /// missing or unavailable.
    pub fn classify(&self, reading: &Reading) -> Result<ClassificationResult, ClassifyError> {
        let Some(model) = &self.model else {
            return Ok(fallback(reading, NOTE_MODEL_NOT_LOADED));
        };

        match classify_with_model(model.as_ref(), reading) {
            Err(ClassifyError::ModelUnavailable(msg)) => {
                logging::warn(
                    Component::Model,
                    Some(&model.describe()),
                    &format!("prediction failed, using threshold fallback: {}", msg),
                );
                Ok(fallback(reading, NOTE_MODEL_FAILED))
            }
            other => other,
        }
    }
}

fn fallback(reading: &Reading, note: &str) -> ClassificationResult {
    let mut result = classify_reading(reading);
    result.note = Some(note.to_string());
    result
}

// ---------------------------------------------------------------------------
// Input coercion
// ---------------------------------------------------------------------------

/// Parses a `/classify` request body into a reading.
///
/// All four fields must be present; values may be JSON numbers or numeric
/// strings. Non-finite values are rejected.
pub fn parse_reading(body: &str) -> Result<Reading, ClassifyError> {
    let data: Value = serde_json::from_str(body).map_err(|e| ClassifyError::InvalidValue {
        parameter: "body".to_string(),
        detail: format!("request body is not valid JSON ({})", e),
    })?;

    let Some(object) = data.as_object() else {
        return Err(ClassifyError::MissingParameter(REQUIRED_FIELDS.to_vec()));
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(ClassifyError::MissingParameter(missing));
    }

    let [ph, tds, temperature, dissolved_oxygen] = REQUIRED_FIELDS;
    Ok(Reading::new(
        coerce_number(ph, &object[ph])?,
        coerce_number(tds, &object[tds])?,
        coerce_number(temperature, &object[temperature])?,
        coerce_number(dissolved_oxygen, &object[dissolved_oxygen])?,
    ))
}

/// Reads a JSON value as a finite `f64`.
pub fn coerce_number(field: &str, value: &Value) -> Result<f64, ClassifyError> {
    let invalid = |detail: String| ClassifyError::InvalidValue {
        parameter: field.to_string(),
        detail,
    };

    let number = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid(format!("{} is not representable as a float", n)))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(format!("could not convert string to float: {:?}", s)))?,
        other => return Err(invalid(format!("expected a number, got {}", other))),
    };

    if !number.is_finite() {
        return Err(invalid(format!("{} is not a finite number", number)));
    }
    Ok(number)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// A response ready to be written by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    /// `None` for bodiless replies (CORS preflight).
    pub body: Option<Value>,
}

impl HttpReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }
}

/// `GET /health`
pub fn handle_health(service: &ClassifierService) -> HttpReply {
    HttpReply::json(
        200,
        json!({
            "status": "healthy",
            "model_loaded": service.model_loaded(),
            "message": HEALTH_MESSAGE,
        }),
    )
}

/// `POST /classify`
pub fn handle_classify(service: &ClassifierService, body: &str) -> HttpReply {
    let outcome = parse_reading(body).and_then(|reading| service.classify(&reading));

    match outcome {
        Ok(result) => match serde_json::to_value(&result) {
            Ok(value) => {
                logging::debug(
                    Component::Http,
                    Some("/classify"),
                    &format!(
                        "{} via {} ({})",
                        result.classification_label,
                        result.method.as_str(),
                        result.classification.code()
                    ),
                );
                HttpReply::json(200, value)
            }
            Err(e) => {
                let err = ClassifyError::Unexpected(e.to_string());
                logging::error(Component::Http, Some("/classify"), &err.to_string());
                HttpReply::error(500, &err.to_string())
            }
        },
        Err(err) => {
            let status = err.status_code();
            if status >= 500 {
                logging::error(Component::Http, Some("/classify"), &err.to_string());
            } else {
                logging::warn(Component::Http, Some("/classify"), &err.to_string());
            }
            HttpReply::error(status, &err.to_string())
        }
    }
}

/// Dispatches a request to its handler.
pub fn route(service: &ClassifierService, method: &str, url: &str, body: &str) -> HttpReply {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        ("OPTIONS", _) => HttpReply {
            status: 204,
            body: None,
        },
        ("GET", "/health") => handle_health(service),
        ("POST", "/classify") => handle_classify(service, body),
        (_, "/health") | (_, "/classify") => HttpReply::error(405, "Method not allowed"),
        _ => HttpReply::error(404, "Not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers_and_numeric_strings() {
        let reading = parse_reading(r#"{"ph": "7.0", "tds": 200, "suhu": " 24 ", "do": 5.5}"#)
            .expect("coercible values");
        assert_eq!(reading, Reading::new(7.0, 200.0, 24.0, 5.5));
    }

    #[test]
    fn test_parse_reports_missing_fields() {
        let err = parse_reading(r#"{"ph": 7.0, "tds": 200}"#).unwrap_err();
        assert_eq!(err, ClassifyError::MissingParameter(vec!["suhu", "do"]));
    }

    #[test]
    fn test_parse_non_object_body_is_missing_everything() {
        let err = parse_reading("[7.0, 200, 24, 5]").unwrap_err();
        assert_eq!(err, ClassifyError::MissingParameter(REQUIRED_FIELDS.to_vec()));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        for body in [
            r#"{"ph": "abc", "tds": 200, "suhu": 24, "do": 5}"#,
            r#"{"ph": 7, "tds": null, "suhu": 24, "do": 5}"#,
            r#"{"ph": 7, "tds": 200, "suhu": true, "do": 5}"#,
            r#"{"ph": 7, "tds": 200, "suhu": 24, "do": "NaN"}"#,
            r#"{"ph": 7, "tds": 200, "suhu": 24, "do": "inf"}"#,
        ] {
            let err = parse_reading(body).unwrap_err();
            assert!(
                matches!(err, ClassifyError::InvalidValue { .. }),
                "{} should be invalid, got {:?}",
                body,
                err
            );
        }
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = parse_reading("{\"ph\": ").unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidValue { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_route_strips_query_string() {
        let service = ClassifierService::threshold_only();
        assert_eq!(route(&service, "GET", "/health?verbose=1", "").status, 200);
    }

    #[test]
    fn test_route_unknown_path_and_method() {
        let service = ClassifierService::threshold_only();
        assert_eq!(route(&service, "GET", "/nope", "").status, 404);
        assert_eq!(route(&service, "GET", "/classify", "").status, 405);
        assert_eq!(route(&service, "DELETE", "/health", "").status, 405);
    }

    #[test]
    fn test_preflight_has_no_body() {
        let service = ClassifierService::threshold_only();
        let reply = route(&service, "OPTIONS", "/classify", "");
        assert_eq!(reply.status, 204);
        assert_eq!(reply.body, None);
    }
}

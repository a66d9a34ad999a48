//! Remote prediction sidecar client.
//!
//! Some deployments keep the original pickled model behind a small Python
//! service instead of exporting it. This predictor forwards readings there:
//!
//!   POST {base}/predict        {"ph":..,"tds":..,"suhu":..,"do":..}  →  {"prediction": "Layak"}
//!   POST {base}/predict_proba  (same body)                           →  {"probabilities": {"Layak": 0.9, ...}}
//!
//! A sidecar that does not implement `/predict_proba` (404) simply yields
//! no confidence.

use std::time::Duration;

use serde::Deserialize;

use super::labels::ClassProbabilities;
use super::predictor::{ModelError, Predictor};
use crate::model::{RawLabel, Reading};

#[derive(Debug, Deserialize)]
struct PredictResponse {
    prediction: RawLabel,
}

#[derive(Debug, Deserialize)]
struct ProbabilityResponse {
    probabilities: ClassProbabilities,
}

/// Predictor backed by an HTTP prediction service.
pub struct RemoteModel {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl RemoteModel {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ModelError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str, reading: &Reading) -> Result<reqwest::blocking::Response, ModelError> {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .post(&url)
            .header("Accept", "application/json")
            .json(reading)
            .send()
            .map_err(|e| ModelError::Transport(e.to_string()))
    }
}

impl Predictor for RemoteModel {
    fn describe(&self) -> String {
        format!("remote model at {}", self.base_url)
    }

    fn predict(&self, reading: &Reading) -> Result<RawLabel, ModelError> {
        let response = self.post("/predict", reading)?;
        if !response.status().is_success() {
            return Err(ModelError::HttpError(response.status().as_u16()));
        }
        let body: PredictResponse = response
            .json()
            .map_err(|e| ModelError::ParseError(e.to_string()))?;
        Ok(body.prediction)
    }

    fn predict_probability(
        &self,
        reading: &Reading,
    ) -> Result<Option<ClassProbabilities>, ModelError> {
        let response = self.post("/predict_proba", reading)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ModelError::HttpError(response.status().as_u16()));
        }
        let body: ProbabilityResponse = response
            .json()
            .map_err(|e| ModelError::ParseError(e.to_string()))?;
        Ok(Some(body.probabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let model = RemoteModel::new("http://127.0.0.1:5001/", Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(model.base_url(), "http://127.0.0.1:5001");
        assert_eq!(model.describe(), "remote model at http://127.0.0.1:5001");
    }

    #[test]
    fn test_unreachable_sidecar_is_transport_error() {
        // Port 9 (discard) is essentially never listening on loopback.
        let model = RemoteModel::new("http://127.0.0.1:9", Duration::from_millis(500))
            .expect("client builds");
        let err = model.predict(&Reading::new(7.0, 200.0, 24.0, 5.0)).unwrap_err();
        assert!(matches!(err, ModelError::Transport(_)), "got {:?}", err);
    }

    #[test]
    fn test_response_bodies_parse() {
        let p: PredictResponse = serde_json::from_str(r#"{"prediction": "Tidak layak"}"#).unwrap();
        assert_eq!(p.prediction, RawLabel::Text("Tidak layak".to_string()));
        let p: PredictResponse = serde_json::from_str(r#"{"prediction": 0}"#).unwrap();
        assert_eq!(p.prediction, RawLabel::Index(0));
        let p: ProbabilityResponse =
            serde_json::from_str(r#"{"probabilities": {"Layak": 0.9, "Tidak Layak": 0.1}}"#).unwrap();
        assert_eq!(p.probabilities.get("Layak"), Some(&0.9));
    }
}

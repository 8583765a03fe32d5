//! Blocking HTTP client for the classifier service

use std::time::Duration;

use ureq::Agent;

use super::Classifier;
use super::types::{ApiReadiness, HealthResponse, PredictRequest, PredictResponse, Prediction};
use crate::consts::{DEFAULT_API_BASE, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::error::ClassifyError;

/// Talks to `GET /health` and `POST /predict` on a fixed base address
#[derive(Clone)]
pub struct HttpClassifier {
    agent: Agent,
    base_url: String,
}

impl Default for HttpClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }
}

impl HttpClassifier {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { agent, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw probe: `Ok(model_loaded)` or the failure that prevented an answer
    pub fn probe(&self) -> Result<bool, ClassifyError> {
        let url = self.endpoint("/health");
        let mut response = self.agent.get(url.as_str()).call().map_err(map_request_error)?;
        let health: HealthResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ClassifyError::Protocol(e.to_string()))?;
        Ok(health.model_loaded)
    }
}

impl Classifier for HttpClassifier {
    fn check_health(&self) -> ApiReadiness {
        match self.probe() {
            Ok(model_loaded) => ApiReadiness::from_model_loaded(model_loaded),
            Err(e) => {
                log::warn!("API health check failed: {e}");
                ApiReadiness::Error
            }
        }
    }

    fn classify(&self, encoded_image: &str) -> Result<Vec<Prediction>, ClassifyError> {
        let url = self.endpoint("/predict");
        let mut response = self
            .agent
            .post(url.as_str())
            .send_json(PredictRequest { image: encoded_image })
            .map_err(map_request_error)?;
        let body: PredictResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ClassifyError::Protocol(e.to_string()))?;
        log::debug!("Classifier returned {} predictions", body.predictions.len());
        Ok(body.predictions)
    }
}

fn map_request_error(e: ureq::Error) -> ClassifyError {
    match e {
        ureq::Error::StatusCode(code) => ClassifyError::Status(code),
        other => ClassifyError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpClassifier::new("http://localhost:8000/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.endpoint("/predict"), "http://localhost:8000/predict");
    }

    #[test]
    fn test_unreachable_service_is_error() {
        // Port 9 (discard) on localhost is essentially never listening
        let client = HttpClassifier::new("http://127.0.0.1:9", Duration::from_millis(500));
        assert_eq!(client.check_health(), ApiReadiness::Error);
        assert!(matches!(client.classify("AA=="), Err(ClassifyError::Transport(_))));
    }
}

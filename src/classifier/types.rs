//! Wire types for the classifier service

use serde::{Deserialize, Serialize};

/// A single (label, probability) result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub category: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(category: impl Into<String>, probability: f32) -> Self {
        Self {
            category: category.into(),
            probability,
        }
    }

    /// Confidence as a whole percentage
    pub fn confidence_percent(&self) -> u32 {
        crate::points_for_probability(self.probability)
    }
}

/// Classifier availability as last probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApiReadiness {
    #[default]
    Checking,
    Ready,
    ModelUnavailable,
    Error,
}

impl ApiReadiness {
    pub fn is_ready(&self) -> bool {
        *self == ApiReadiness::Ready
    }

    /// Map a successful probe body
    pub fn from_model_loaded(model_loaded: bool) -> Self {
        if model_loaded {
            ApiReadiness::Ready
        } else {
            ApiReadiness::ModelUnavailable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApiReadiness::Checking => "Checking API...",
            ApiReadiness::Ready => "API Connected",
            ApiReadiness::ModelUnavailable => "Model Not Loaded",
            ApiReadiness::Error => "API Error",
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub model_loaded: bool,
}

/// `POST /predict` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest<'a> {
    pub image: &'a str,
}

/// `POST /predict` response. `predictions[0]` is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    #[serde(default)]
    pub top_prediction: Option<Prediction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_mapping() {
        assert_eq!(ApiReadiness::from_model_loaded(true), ApiReadiness::Ready);
        assert_eq!(ApiReadiness::from_model_loaded(false), ApiReadiness::ModelUnavailable);
        assert_eq!(ApiReadiness::default(), ApiReadiness::Checking);
    }

    #[test]
    fn test_parse_predict_response() {
        let body = r#"{
            "predictions": [
                {"category": "cat", "probability": 0.8},
                {"category": "dog", "probability": 0.15}
            ],
            "top_prediction": {"category": "cat", "probability": 0.8}
        }"#;
        let parsed: PredictResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.predictions.len(), 2);
        assert_eq!(parsed.predictions[0], Prediction::new("cat", 0.8));
        assert_eq!(parsed.predictions[0].confidence_percent(), 80);
    }

    #[test]
    fn test_parse_empty_and_missing_predictions() {
        let parsed: PredictResponse = serde_json::from_str(r#"{"predictions": []}"#).unwrap();
        assert!(parsed.predictions.is_empty());
        let parsed: PredictResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.predictions.is_empty());
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(PredictRequest { image: "data:image/png;base64,AA==" }).unwrap();
        assert_eq!(body, serde_json::json!({"image": "data:image/png;base64,AA=="}));
    }

    #[test]
    fn test_health_requires_model_loaded() {
        let parsed: HealthResponse =
            serde_json::from_str(r#"{"status": "healthy", "model_loaded": false}"#).unwrap();
        assert!(!parsed.model_loaded);
        assert!(serde_json::from_str::<HealthResponse>(r#"{"status": "healthy"}"#).is_err());
    }
}

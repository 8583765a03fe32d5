//! Classifier service boundary
//!
//! - `types`: wire format and readiness states
//! - `http`: blocking HTTP client (`GET /health`, `POST /predict`)

pub mod http;
pub mod types;

pub use http::HttpClassifier;
pub use types::{ApiReadiness, HealthResponse, PredictRequest, PredictResponse, Prediction};

use crate::error::ClassifyError;

/// Anything that can probe readiness and classify an encoded raster.
/// Implementations make exactly one attempt per call (no retry, no cache).
pub trait Classifier: Send + Sync {
    /// Readiness probe; never fails, failures map to `ApiReadiness::Error`
    fn check_health(&self) -> ApiReadiness;

    /// Ranked predictions (highest probability first), possibly empty
    fn classify(&self, encoded_image: &str) -> Result<Vec<Prediction>, ClassifyError>;
}

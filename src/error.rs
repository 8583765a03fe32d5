//! Error taxonomy for the surface, classifier and game boundaries

use std::fmt;

use crate::classifier::ApiReadiness;
use crate::game::GameState;

/// Failures raised by the raster surface.
#[derive(Debug)]
pub enum SurfaceError {
    /// The bitmap could not be encoded to PNG.
    Encode(String),
    /// Input bytes were not a decodable image (or not a valid data URI).
    Decode(String),
    /// Writing the bitmap to disk failed.
    Io(std::io::Error),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(msg) => write!(f, "encode error: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for SurfaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SurfaceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failures talking to the classifier service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// Connection refused, timeout, DNS failure...
    Transport(String),
    /// The service answered with a non-success HTTP status.
    Status(u16),
    /// The response body was not the expected JSON shape.
    Protocol(String),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Status(code) => write!(f, "API error: {code}"),
            Self::Protocol(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for ClassifyError {}

/// Errors surfaced to the user by the game controller.
#[derive(Debug)]
pub enum GameError {
    /// Analyze/start attempted while the classifier is not ready.
    NotReady(ApiReadiness),
    /// The bitmap could not be exported for classification.
    Export(String),
    /// The request was sent but the service or transport failed.
    Classification(ClassifyError),
    /// The action is not valid from the current state.
    InvalidTransition { action: &'static str, state: GameState },
    /// Uploaded bytes could not be decoded as an image.
    Decode(String),
    /// Download could not be written.
    Io(std::io::Error),
}

impl GameError {
    /// True for the synchronous rejections that never reach the network.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotReady(_) | Self::Export(_))
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady(readiness) => write!(
                f,
                "API is not ready ({}). Please make sure the backend is running.",
                readiness.label()
            ),
            Self::Export(msg) => write!(f, "canvas not available: {msg}"),
            Self::Classification(e) => write!(f, "prediction failed: {e}"),
            Self::InvalidTransition { action, state } => {
                write!(f, "cannot {action} while {}", state.as_str())
            }
            Self::Decode(msg) => write!(f, "could not read image: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Classification(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ClassifyError> for GameError {
    fn from(e: ClassifyError) -> Self {
        Self::Classification(e)
    }
}

impl From<SurfaceError> for GameError {
    fn from(e: SurfaceError) -> Self {
        match e {
            SurfaceError::Encode(msg) => Self::Export(msg),
            SurfaceError::Decode(msg) => Self::Decode(msg),
            SurfaceError::Io(e) => Self::Io(e),
        }
    }
}

impl From<std::io::Error> for GameError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_classification() {
        assert!(GameError::NotReady(ApiReadiness::Error).is_precondition());
        assert!(GameError::Export("no bitmap".into()).is_precondition());
        assert!(!GameError::Classification(ClassifyError::Status(500)).is_precondition());
    }

    #[test]
    fn test_surface_error_maps_to_game_error() {
        let e: GameError = SurfaceError::Encode("png".into()).into();
        assert!(matches!(e, GameError::Export(_)));
        let e: GameError = SurfaceError::Decode("garbage".into()).into();
        assert!(matches!(e, GameError::Decode(_)));
    }

    #[test]
    fn test_status_message_includes_code() {
        let e = GameError::Classification(ClassifyError::Status(503));
        assert!(e.to_string().contains("503"));
    }
}

//! Embeddable raster payloads (`data:image/png;base64,...`)

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::SurfaceError;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Wrap PNG bytes as a data URI
pub fn encode_data_uri(png: &[u8]) -> String {
    let mut out = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len() * 4 / 3 + 4);
    out.push_str(PNG_DATA_URI_PREFIX);
    STANDARD.encode_string(png, &mut out);
    out
}

/// Extract the raw bytes from a `data:<mime>;base64,<payload>` URI.
/// A bare base64 payload (no `data:` header) is accepted as well.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, SurfaceError> {
    let payload = match uri.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| SurfaceError::Decode("data URI has no payload".into()))?;
            if !header.ends_with(";base64") {
                return Err(SurfaceError::Decode(format!(
                    "unsupported data URI encoding: {header}"
                )));
            }
            payload
        }
        None => uri,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|e| SurfaceError::Decode(e.to_string()))
}

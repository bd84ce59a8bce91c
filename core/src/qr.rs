//! Data-URI handling for the qr-code endpoint.
//!
//! The server embeds the PNG as `data:image/png;base64,<payload>`. Only that
//! exact prefix is stripped; any other prefix is left in place and the
//! decode is attempted on the whole string, which fails rather than
//! guessing at the format.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::ApiError;

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Decode a PNG data URI (or bare base64) into raw bytes.
pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, ApiError> {
    let payload = data_uri.strip_prefix(DATA_URI_PREFIX).unwrap_or(data_uri);
    STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::QrDecode(e.to_string()))
}

/// Encode raw bytes into the `data:image/png;base64,` form.
pub fn encode_data_uri(bytes: &[u8]) -> String {
    format!("{DATA_URI_PREFIX}{}", STANDARD.encode(bytes))
}

//! Image sources.
//!
//! Camera frames and picked files both normalize to [`ImageData`], which
//! carries the base64 payload and renders as a data URI.

mod camera;

pub use camera::*;

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

/// Capture errors.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image is empty")]
    Empty,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera capture failed: {0}")]
    CaptureFailed(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// An encoded still image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// e.g. `image/jpeg`
    pub mime_type: String,
    /// Standard base64 payload, no prefix
    pub base64: String,
}

impl ImageData {
    /// Encode raw bytes, detecting the format from magic bytes.
    pub fn from_bytes(bytes: &[u8]) -> CaptureResult<Self> {
        if bytes.is_empty() {
            return Err(CaptureError::Empty);
        }
        let mime_type = sniff_mime(bytes).ok_or(CaptureError::UnsupportedFormat)?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            base64: BASE64.encode(bytes),
        })
    }

    /// Read and encode a picked file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CaptureResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> CaptureResult<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| CaptureError::InvalidDataUri("missing data: prefix".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CaptureError::InvalidDataUri("missing payload separator".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| CaptureError::InvalidDataUri("payload is not base64".into()))?;

        if !mime_type.starts_with("image/") {
            return Err(CaptureError::UnsupportedFormat);
        }
        if payload.is_empty() {
            return Err(CaptureError::Empty);
        }
        BASE64
            .decode(payload)
            .map_err(|e| CaptureError::InvalidDataUri(e.to_string()))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            base64: payload.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }

    /// Decoded image bytes.
    pub fn decode(&self) -> CaptureResult<Vec<u8>> {
        BASE64
            .decode(&self.base64)
            .map_err(|e| CaptureError::InvalidDataUri(e.to_string()))
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some("image/png"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

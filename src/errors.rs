use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for token generation.
///
/// Every variant carries the input or path it concerns so the batch summary can
/// report per-item failures without parsing strings.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },

    #[error("Input error: {reason} ({input})")]
    Input { input: String, reason: String },

    #[error("Download error: fetching {url} failed")]
    Download {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The resampled buffer no longer matches 8-bit RGBA. Not recoverable.
    #[error("Pixel format error: resampled buffer does not fit a {width}x{height} RGBA image")]
    PixelFormat { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, TokenError>;

impl TokenError {
    pub(crate) fn input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Input {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convert I/O errors to filesystem errors.
///
/// Code that knows the path and operation should build `TokenError::FileSystem`
/// directly; this is the fallback for bare `?`.
impl From<std::io::Error> for TokenError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

/// Convert image crate errors to image processing errors.
impl From<image::ImageError> for TokenError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing {
            path: "unknown".to_string(),
            operation: "image processing".to_string(),
            source: Box::new(err),
        }
    }
}

/// Settings files are the only JSON this crate reads.
impl From<serde_json::Error> for TokenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration {
            message: format!("invalid settings file: {err}"),
        }
    }
}

//! Error types for the viewer workspace.

use thiserror::Error;

/// Result type alias using WxError.
pub type WxResult<T> = Result<T, WxError>;

/// Primary error type for viewer operations.
#[derive(Debug, Error)]
pub enum WxError {
    // === Configuration Errors ===
    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // === Data Server Errors ===
    #[error("Failed to fetch '{url}': {message}")]
    FetchError { url: String, message: String },

    #[error("Invalid JSON document: {0}")]
    JsonError(String),

    // === Style Errors ===
    #[error("Style parse error: {0}")]
    StyleParse(String),

    #[error("Style validation error: {0}")]
    StyleValidation(String),

    #[error("Style not found: {0}")]
    StyleNotFound(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Font error: {0}")]
    FontError(String),

    // === Infrastructure Errors ===
    #[error("IO error: {0}")]
    IoError(String),
}

// Conversion from common error types
impl From<std::io::Error> for WxError {
    fn from(err: std::io::Error) -> Self {
        WxError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for WxError {
    fn from(err: serde_json::Error) -> Self {
        WxError::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for WxError {
    fn from(err: serde_yaml::Error) -> Self {
        WxError::InvalidConfig(format!("YAML error: {}", err))
    }
}

//! Error types for Limbus Core

use thiserror::Error;

/// Errors that can occur at the crate's boundaries.
///
/// The analysis loop itself never fails: malformed landmark sets, stalled
/// clocks, and unknown hands are absorbed into no-op updates so a caller can
/// keep rendering every frame. These variants cover the edges where data
/// enters or leaves the core (frame parsing, configuration, encoding).
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to parse frame payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed hand detection: {0}")]
    MalformedDetection(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

use alloy_primitives::hex::FromHexError;
use aspect_provider::{params::ParamsError, JoinPointError};

/// Error types of the aspect-jp commands
#[derive(Debug, thiserror::Error)]
pub enum JpError {
    /// Failed to read file
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Invalid JSON input or output
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The transaction could not be turned into a join-point request
    #[error("Join point error: {0}")]
    JoinPoint(#[from] JoinPointError),

    /// The chain parameters are invalid or unreadable
    #[error("Params error: {0}")]
    Params(#[from] ParamsError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the aspect-jp commands
pub type Result<T> = std::result::Result<T, JpError>;

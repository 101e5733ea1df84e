//! Error types for safe-shield

use thiserror::Error;

/// Result type alias for safe-shield operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by collaborators and by the decoding pipeline.
///
/// Analyzers catch these at the boundary of each analysis step and turn them
/// into `FAILED` findings, so only contract violations (see
/// [`Error::MalformedCall`]) and configuration problems reach callers.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport failure talking to a collaborator
    #[error("Request to {what} failed: {reason}")]
    Http { what: &'static str, reason: String },

    /// Collaborator answered with a non-success status
    #[error("{what} returned HTTP {status}")]
    UnexpectedStatus { what: &'static str, status: u16 },

    /// Failed to fetch data from a collaborator
    #[error("Failed to fetch {what}: {reason}")]
    Fetch { what: &'static str, reason: String },

    /// Chain is not known to the chain registry
    #[error("Unsupported chain ID: {0}")]
    UnsupportedChain(u64),

    /// Decoder output violates the shape the flattener relies on
    #[error("Malformed {method} call: {reason}")]
    MalformedCall { method: String, reason: String },

    /// Packed/ABI encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// ABI decoding error
    #[error("ABI error: {0}")]
    Abi(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Threat scanner rejected or failed the scan
    #[error("Threat scan failed: {0}")]
    Scanner(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Invalid collaborator URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<alloy::sol_types::Error> for Error {
    fn from(err: alloy::sol_types::Error) -> Self {
        Error::Abi(err.to_string())
    }
}

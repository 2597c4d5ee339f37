//! Error types for modelgate-llm

use thiserror::Error;

/// Routing and ledger error type
///
/// Routing itself never fails. Errors only come from rejected configuration
/// changes and malformed snapshots, and both leave prior state untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Snapshot payload failed validation
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Configuration change rejected
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

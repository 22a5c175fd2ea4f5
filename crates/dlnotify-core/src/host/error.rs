use thiserror::Error;

/// Failure reported by a host capability call.
///
/// None of these are fatal: callers log them and fall back to a safe default.
#[derive(Error, Debug)]
pub enum HostError {
    /// The capability is missing on this host.
    #[error("host API unavailable: {0}")]
    Unavailable(&'static str),

    /// The host refused or failed the call.
    #[error("host call rejected: {0}")]
    Rejected(String),

    /// Persistent storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored value did not have the expected shape.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HostError {
    /// Create a `HostError::Rejected` with a custom message.
    pub fn rejected(msg: impl Into<String>) -> Self {
        HostError::Rejected(msg.into())
    }

    /// Create a `HostError::Storage` from any displayable error.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        HostError::Storage(err.to_string())
    }
}

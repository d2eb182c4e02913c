//! Crate-wide error taxonomy
//!
//! Configuration and environment errors are raised before any network I/O;
//! provider errors carry the transport's message. Nothing in this crate
//! retries a failed operation.

use thiserror::Error;

/// Errors surfaced by connections, contract handles, and models.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or incomplete configuration, detected before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required ambient capability (injected provider, account) is absent.
    #[error("environment error: {0}")]
    Environment(String),

    /// The underlying transport or signer failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// ABI lookup, encoding, or decoding failed.
    #[error("abi error: {0}")]
    Abi(String),

    /// Decimal/fixed-point conversion failed.
    #[error("numeric error: {0}")]
    Numeric(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn environment(message: impl Into<String>) -> Self {
        Self::Environment(message.into())
    }

    pub fn provider(message: impl std::fmt::Display) -> Self {
        Self::Provider(message.to_string())
    }

    pub fn abi(message: impl std::fmt::Display) -> Self {
        Self::Abi(message.to_string())
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::Numeric(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

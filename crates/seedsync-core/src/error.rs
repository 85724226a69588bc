//! Error types for seedsync
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for seedsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for seedsync
#[derive(Error, Debug)]
pub enum Error {
    /// Peer source-related errors
    #[error("Peer source error: {0}")]
    PeerSource(String),

    /// Zone editor-related errors
    #[error("Zone editor error: {0}")]
    ZoneEditor(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Remote procedure returned a fault or error object
    #[error("RPC fault {code}: {message}")]
    Rpc {
        /// Fault code reported by the remote side
        code: i64,
        /// Fault message reported by the remote side
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The configured zone is absent from the provider's zone list
    #[error("Zone {0} not found in zone list")]
    ZoneNotFound(i64),

    /// The active zone version is neither of the two alternated versions
    #[error("Active zone version {active} is not one of {versions:?}")]
    UnexpectedVersion {
        /// Version reported as active by the provider
        active: u32,
        /// The pre-provisioned version pair
        versions: [u32; 2],
    },

    /// Another run holds the lock file
    #[error("Another run is in progress: {0}")]
    RunLocked(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A request could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(String),
}

impl Error {
    /// Create a peer source error
    pub fn peer_source(msg: impl Into<String>) -> Self {
        Self::PeerSource(msg.into())
    }

    /// Create a zone editor error
    pub fn zone_editor(msg: impl Into<String>) -> Self {
        Self::ZoneEditor(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create an RPC fault error
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        Self::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a request-encoding error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the next scheduled run can be expected to succeed unchanged
    ///
    /// Transport failures, provider faults and rate limiting are transient.
    /// A missing zone, an unexpected active version, bad configuration, a
    /// request that cannot be encoded or a response of the wrong shape are
    /// logic errors that need an operator.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::PeerSource(_)
            | Error::ZoneEditor(_)
            | Error::Http(_)
            | Error::RateLimited(_)
            | Error::Rpc { .. }
            | Error::Provider { .. }
            | Error::Io(_)
            | Error::RunLocked(_) => true,
            Error::Config(_)
            | Error::Authentication(_)
            | Error::Decode(_)
            | Error::Encode(_)
            | Error::ZoneNotFound(_)
            | Error::UnexpectedVersion { .. }
            | Error::Json(_) => false,
        }
    }
}

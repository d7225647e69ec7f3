//! Error type for everything that can go wrong before a response body is
//! classified.
//!
//! # Design
//! `RequestError` never reaches callers of `Dispatcher` directly. Each
//! operation turns it into a failure `Envelope` whose `error` field is the
//! `Display` text below. Builder and configuration functions return it as a
//! normal `Result` so `?` works through the plumbing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The exchange could not be performed (DNS, connect, I/O, join failure).
    #[error("network error: {0}")]
    Network(String),

    /// The transport gave up waiting for the server.
    #[error("request timed out")]
    Timeout,

    /// The caller triggered the attached cancellation token.
    #[error("request aborted")]
    Aborted,

    /// A response arrived but its body is not a decodable envelope.
    #[error("undecodable response (HTTP {status}): {reason}")]
    Decode { status: u16, reason: String },

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RequestError {
    pub fn is_aborted(&self) -> bool {
        matches!(self, RequestError::Aborted)
    }
}

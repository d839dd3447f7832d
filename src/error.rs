//! Error types for wireline.

use thiserror::Error;

/// Main error type for all wireline operations.
///
/// These never escape the public [`Client`](crate::Client) boundary: the
/// session folds every failure into its state and reports it through the
/// `{code, message, data}` triple. The enum is still public so the lower
/// layers (transport, payload encoding) can be used directly.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused or never established.
    #[error("connection error: {0}")]
    Connection(String),

    /// Send or receive deadline exceeded.
    #[error("transport timeout")]
    Timeout,

    /// Peer closed the stream mid-operation.
    #[error("transport closed")]
    Closed,

    /// Malformed header or invalid decoded frame length.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Payload could not be encoded to a sendable form.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unexpected fault: invalid address, environment failure.
    #[error("system error: {0}")]
    System(String),

    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

//! Error types shared by every platform-API implementation.

use thiserror::Error;

/// Errors surfaced by platform-API calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The transport behind the API handle is not connected.
    #[error("api transport is not connected")]
    NotConnected,

    /// The platform accepted the request but rejected the call.
    #[error("platform rejected the call: {code} {message}")]
    Platform {
        /// Platform-defined error code.
        code: i64,
        /// Human-readable description from the platform.
        message: String,
    },

    /// The call did not complete within the transport deadline.
    #[error("api call timed out")]
    Timeout,

    /// The platform returned a payload the client could not decode.
    #[error("malformed platform payload: {0}")]
    Decode(String),
}

/// Result type for platform-API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors from the context's convenience operations.
///
/// Kept apart from [`ApiError`]: addressing a reply at an event with no
/// chat is a usage error of the context, not a platform failure.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// The current event carries no chat to address a reply to.
    #[error("event carries no chat to reply to")]
    NoChat,

    /// The underlying platform call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

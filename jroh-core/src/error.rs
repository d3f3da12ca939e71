//! Error types for jroh
//!
//! Two layers of error live here:
//!
//! - **Error**: the application-level enum used by every jroh crate
//! - **JsonRpcErrorData**: the `code`/`message` pair written into error envelopes
//!
//! # One Code on the Wire
//!
//! The server distinguishes many failure kinds for diagnostics (bad version,
//! reserved method, unknown method, handler failure, ...) but all of them
//! travel with the single reserved code [`SERVER_ERROR_CODE`]. The kind is
//! only visible through the message text.
//!
//! # Client-side Taxonomy
//!
//! On the client, three kinds of failure surface from a call:
//!
//! - `Error::Transport`: the HTTP exchange itself failed
//! - `Error::ProtocolViolation`: the response broke the envelope contract
//!   (wrong version, mismatched id); never confused with a remote error
//! - `Error::JsonRpc`: the server answered with an error envelope
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::{Error, JsonRpcErrorData, SERVER_ERROR_CODE};
//!
//! let error = Error::MethodNotFound("frobnicate".into());
//! let wire = JsonRpcErrorData::from(&error);
//! assert_eq!(wire.code, SERVER_ERROR_CODE);
//! assert_eq!(wire.message, "method does not exist: frobnicate");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The reserved code carried by every error envelope
pub const SERVER_ERROR_CODE: i32 = -32001;

/// Result type for jroh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level error type for jroh operations
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Error envelope received from the remote server
    #[error("{}", .0.message)]
    JsonRpc(#[from] JsonRpcErrorData),

    /// Conversion between Rust types and JSON failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The HTTP exchange failed (connection refused, DNS, unreadable body...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Low-level I/O failure such as binding a listener
    #[error("io error: {0}")]
    Io(String),

    /// The request envelope is malformed
    ///
    /// Covers non-object bodies, batch arrays, unparseable JSON and a wrong
    /// or missing `jsonrpc` version.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The method name starts with the reserved `_` prefix
    #[error("cannot call methods prefixed with _: {0}")]
    ReservedMethod(String),

    /// No handler is registered under the method name
    #[error("method does not exist: {0}")]
    MethodNotFound(String),

    /// `params` is not an array, or does not fit the handler's arguments
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// A handler (or a lazy handler's producer) failed
    ///
    /// The message is the handler's own error text, passed through untouched
    /// so callers see exactly what the handler reported.
    #[error("{0}")]
    Handler(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),

    /// The response violated the envelope contract on the client side
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl Error {
    /// Build a handler failure from anything displayable
    ///
    /// ```rust
    /// use jroh_core::Error;
    ///
    /// let err = Error::handler("disk on fire");
    /// assert_eq!(err.to_string(), "disk on fire");
    /// ```
    pub fn handler(err: impl fmt::Display) -> Self {
        Error::Handler(err.to_string())
    }

    /// Whether this error came back from the remote server
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::JsonRpc(_))
    }

    /// Short snake_case label for logs and metric attributes
    pub fn kind(&self) -> &'static str {
        match self {
            Error::JsonRpc(_) => "json_rpc",
            Error::Serialization(_) => "serialization",
            Error::Transport(_) => "transport",
            Error::Io(_) => "io",
            Error::InvalidRequest(_) => "invalid_request",
            Error::ReservedMethod(_) => "reserved_method",
            Error::MethodNotFound(_) => "method_not_found",
            Error::InvalidParams(_) => "invalid_params",
            Error::Handler(_) => "handler",
            Error::Internal(_) => "internal",
            Error::ProtocolViolation(_) => "protocol_violation",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// The `code`/`message` pair of an error envelope
///
/// Serialized flat into [`crate::JsonRpcResponse`], so it never appears as a
/// nested object on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcErrorData {
    /// Numeric error code; [`SERVER_ERROR_CODE`] for everything jroh emits
    pub code: i32,
    /// Human-readable failure description
    pub message: String,
}

impl JsonRpcErrorData {
    /// Create error data with an explicit code
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create error data with the reserved server code
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(SERVER_ERROR_CODE, message)
    }
}

impl From<&Error> for JsonRpcErrorData {
    /// Collapse any error to the reserved code, keeping its message
    ///
    /// A remote error relayed through a server keeps its original code.
    fn from(err: &Error) -> Self {
        match err {
            Error::JsonRpc(data) => data.clone(),
            other => Self::server_error(other.to_string()),
        }
    }
}

impl From<Error> for JsonRpcErrorData {
    fn from(err: Error) -> Self {
        JsonRpcErrorData::from(&err)
    }
}

impl fmt::Display for JsonRpcErrorData {
    /// Formats as "[code] message"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorData {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_server_error_uses_reserved_code() {
        let errors = vec![
            Error::InvalidRequest("batch requests are not supported".into()),
            Error::ReservedMethod("_private".into()),
            Error::MethodNotFound("nope".into()),
            Error::InvalidParams("params must be an array".into()),
            Error::Handler("boom".into()),
            Error::Internal("oops".into()),
        ];

        for error in errors {
            let data = JsonRpcErrorData::from(&error);
            assert_eq!(data.code, SERVER_ERROR_CODE);
            assert_eq!(data.message, error.to_string());
        }
    }

    #[test]
    fn test_handler_message_passes_through() {
        let data = JsonRpcErrorData::from(Error::handler("user not found"));
        assert_eq!(data.message, "user not found");
    }

    #[test]
    fn test_remote_error_keeps_code() {
        let remote = Error::JsonRpc(JsonRpcErrorData::new(-32601, "Method not found"));
        let data = JsonRpcErrorData::from(&remote);
        assert_eq!(data.code, -32601);
        assert!(remote.is_remote());
    }

    #[test]
    fn test_remote_error_display_is_message() {
        let remote = Error::JsonRpc(JsonRpcErrorData::server_error("boom"));
        assert_eq!(remote.to_string(), "boom");
    }

    #[test]
    fn test_reserved_method_display() {
        let error = Error::ReservedMethod("_internal".into());
        assert_eq!(error.to_string(), "cannot call methods prefixed with _: _internal");
    }

    #[test]
    fn test_error_from_serde() {
        let serde_error = serde_json::from_str::<serde_json::Value>("{\"a\": json").unwrap_err();
        match Error::from(serde_error) {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Serialization error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_data_display() {
        let data = JsonRpcErrorData::server_error("nope");
        assert_eq!(data.to_string(), "[-32001] nope");
    }

    #[test]
    fn test_error_data_round_trip() {
        let data: JsonRpcErrorData =
            serde_json::from_value(json!({"code": -32001, "message": "x"})).unwrap();
        assert_eq!(data, JsonRpcErrorData::server_error("x"));
    }
}

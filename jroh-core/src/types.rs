//! JSON-RPC 2.0 envelopes as exchanged over HTTP
//!
//! This module defines the two messages that cross the wire: the request
//! envelope posted by the client and the response envelope written back by
//! the server. Both are plain serde types; validation of untrusted input is
//! the dispatcher's job, not the deserializer's.
//!
//! # Wire Shapes
//!
//! ```text
//! request:  {"jsonrpc":"2.0","method":"hello","params":["pete"],"id":"1"}
//! success:  {"jsonrpc":"2.0","id":"1","result":"hello, pete!"}
//! error:    {"jsonrpc":"2.0","id":"1","code":-32001,"message":"..."}
//! ```
//!
//! Note that error envelopes carry `code` and `message` at the top level
//! rather than inside a nested `error` object.
//!
//! # Request IDs
//!
//! Clients assign string ids from a per-proxy counter. The server echoes
//! back whatever string or integer id it could recover from the body and
//! omits the field when none was present.

use crate::error::JsonRpcErrorData;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Protocol version literal carried by every envelope
pub const JSONRPC_VERSION: &str = "2.0";

/// Prefix of the method namespace that can never be called remotely
pub const RESERVED_METHOD_PREFIX: &str = "_";

/// JSON-RPC 2.0 request ID
///
/// The proxy always produces [`Id::String`]; [`Id::Number`] exists so the
/// server can echo integer ids sent by other clients.
///
/// # Examples
///
/// ```rust
/// use jroh_core::Id;
///
/// let id: Id = "7".into();
/// assert_eq!(id.to_string(), "\"7\"");
///
/// let id: Id = 7i64.into();
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier, the form produced by the proxy
    String(String),
    /// Integer identifier
    Number(i64),
}

impl Id {
    /// Recover an id from an arbitrary JSON value
    ///
    /// Only strings and integers qualify; everything else yields `None` so
    /// the error envelope omits the field instead of echoing garbage.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Id::String(s.clone())),
            Value::Number(n) => n.as_i64().map(Id::Number),
            _ => None,
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

/// JSON-RPC 2.0 request envelope
///
/// `params` is always a positional array. Named (object) params are not part
/// of this protocol and are rejected by the dispatcher.
///
/// # Examples
///
/// ```rust
/// use jroh_core::{JsonRpcRequest, Id};
/// use serde_json::json;
///
/// let request = JsonRpcRequest::new("hello", vec![json!("pete")], Id::from("1"));
/// assert_eq!(request.jsonrpc, "2.0");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version, always "2.0"
    pub jsonrpc: String,
    /// Name of the remote method to invoke
    pub method: String,
    /// Positional arguments, possibly empty
    pub params: Vec<Value>,
    /// Caller-assigned correlation id
    pub id: Id,
}

impl JsonRpcRequest {
    /// Create a new request; `jsonrpc` is set to "2.0"
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: Id) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// Whether a method name lives in the reserved `_` namespace
///
/// ```rust
/// assert!(jroh_core::is_reserved_method("_internal"));
/// assert!(!jroh_core::is_reserved_method("public_"));
/// ```
pub fn is_reserved_method(method: &str) -> bool {
    method.starts_with(RESERVED_METHOD_PREFIX)
}

/// JSON-RPC 2.0 response envelope
///
/// Exactly one of `result` or `error` is meaningful. The error data is
/// flattened, so an error envelope serializes `code` and `message` next to
/// `jsonrpc` and `id`.
///
/// A success whose result is JSON `null` deserializes with `result: None`;
/// use [`JsonRpcResponse::is_error`] to tell the two cases apart.
///
/// # Examples
///
/// ```rust
/// use jroh_core::{JsonRpcResponse, JsonRpcErrorData, Id};
/// use serde_json::json;
///
/// let ok = JsonRpcResponse::success(json!("goodbye"), Some(Id::from("2")));
/// assert!(ok.is_success());
///
/// let err = JsonRpcResponse::error(JsonRpcErrorData::server_error("boom"), None);
/// assert!(err.is_error());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version, always "2.0" on responses we produce
    pub jsonrpc: String,
    /// Id of the originating request; absent when it could not be recovered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Handler result on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error code and message on failure
    #[serde(flatten)]
    pub error: Option<JsonRpcErrorData>,
    /// A nested `error` member, as sent by peers using the standard shape
    ///
    /// jroh never writes it, but a client must not mistake such a response
    /// for a success. `null` deserializes to `None`.
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_member: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success envelope
    ///
    /// A `null` result is still written out as `"result": null`.
    pub fn success(result: Value, id: Option<Id>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
            error_member: None,
        }
    }

    /// Create an error envelope
    pub fn error(error: JsonRpcErrorData, id: Option<Id>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
            error_member: None,
        }
    }

    /// True unless the envelope carries an error
    pub fn is_success(&self) -> bool {
        !self.is_error()
    }

    /// True if the envelope carries an error, flat or nested
    pub fn is_error(&self) -> bool {
        self.error.is_some() || self.error_member.is_some()
    }

    /// Whether `jsonrpc` holds the expected protocol version
    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc == JSONRPC_VERSION
    }
}

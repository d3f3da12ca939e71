//! Codec for JSON-RPC envelope serialization
//!
//! Thin wrappers over `serde_json` that map failures into jroh errors:
//!
//! - encoding failures become `Error::Serialization`
//! - an inbound request body that is not JSON becomes `Error::InvalidRequest`
//!   (the server answers it with an error envelope)
//! - an inbound response body that is not an envelope becomes
//!   `Error::ProtocolViolation` (the client fails the call)
//!
//! Request bodies are decoded to a raw [`serde_json::Value`] rather than a
//! [`JsonRpcRequest`] because the dispatcher validates them step by step and
//! must still recover the `id` from a body that fails validation.
//!
//! # Examples
//!
//! ```rust
//! use jroh_core::{codec, JsonRpcRequest, Id};
//!
//! let request = JsonRpcRequest::new("ping", vec![], Id::from("1"));
//! let text = codec::encode_request(&request).unwrap();
//!
//! let body = codec::decode_body(text.as_bytes()).unwrap();
//! assert_eq!(body["method"], "ping");
//! ```

use crate::error::{Error, Result};
use crate::types::{JsonRpcRequest, JsonRpcResponse};
use serde::Serialize;
use serde_json::Value;

/// Encode any serializable message to a JSON string
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a request envelope
pub fn encode_request(req: &JsonRpcRequest) -> Result<String> {
    encode(req)
}

/// Encode a response envelope
pub fn encode_response(resp: &JsonRpcResponse) -> Result<String> {
    encode(resp)
}

/// Parse an inbound request body into raw JSON
///
/// Any well-formed JSON is accepted here, arrays and scalars included; the
/// dispatcher decides what to reject.
pub fn decode_body(data: &[u8]) -> Result<Value> {
    serde_json::from_slice(data)
        .map_err(|e| Error::InvalidRequest(format!("request body is not valid JSON: {}", e)))
}

/// Parse a response body received by the client
///
/// The caller still has to check the protocol version and id.
pub fn decode_response(value: Value) -> Result<JsonRpcResponse> {
    if !value.is_object() {
        return Err(Error::ProtocolViolation(
            "response body was not a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value)
        .map_err(|e| Error::ProtocolViolation(format!("malformed response envelope: {}", e)))
}

//! Request tracking for the JSON-RPC client
//!
//! Every outgoing call gets a fresh id and a [`PendingCall`] registered
//! under it. The pending call is settled exactly once, by the response
//! carrying the same id, and leaves the registry when it is settled or
//! dropped (a caller that stops awaiting also cleans up).
//!
//! # Request Lifecycle
//!
//! 1. **Generate ID**: next value of the per-client counter, as a string
//! 2. **Register**: record the id as in flight
//! 3. **Send**: POST the envelope through the transport
//! 4. **Settle**: check version and id, then resolve or reject

use jroh_core::{Error, Id, JsonRpcErrorData, JsonRpcResponse, Result, SERVER_ERROR_CODE};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Manager for tracking pending requests
#[derive(Clone)]
pub struct RequestManager {
    /// In-flight ids and when they were sent
    pending: Arc<Mutex<HashMap<String, Instant>>>,
    /// Counter for generating request ids, seeded at 1
    counter: Arc<AtomicU64>,
}

impl RequestManager {
    /// Create a new request manager
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Generate a new unique request id
    pub fn next_id(&self) -> Id {
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        Id::String(id.to_string())
    }

    /// Register a pending call under `id`
    pub fn register(&self, id: Id) -> PendingCall {
        let key = key(&id);
        let started = Instant::now();
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), started);

        PendingCall {
            id,
            key,
            started,
            pending: Arc::clone(&self.pending),
        }
    }

    /// Whether a call with this id is in flight
    pub fn is_pending(&self, id: &Id) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&key(id))
    }

    /// Get the number of pending requests
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for RequestManager {
    fn default() -> Self {
        Self::new()
    }
}

/// A call waiting for its response
pub struct PendingCall {
    id: Id,
    key: String,
    started: Instant,
    pending: Arc<Mutex<HashMap<String, Instant>>>,
}

impl PendingCall {
    /// Id the request was sent with
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Time since the call was registered
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Settle the call with the server's response envelope
    ///
    /// # Errors
    ///
    /// - wrong `jsonrpc` version or a different id: `Error::ProtocolViolation`
    /// - an error envelope: `Error::JsonRpc` with the server's code and message
    /// - a nested `error` member: `Error::JsonRpc` built from its `message`,
    ///   or `Error::ProtocolViolation` when it has none
    pub fn settle(self, response: JsonRpcResponse) -> Result<Value> {
        if !response.has_valid_version() {
            return Err(Error::ProtocolViolation(format!(
                "invalid jsonrpc version: {:?}",
                response.jsonrpc
            )));
        }

        if response.id.as_ref() != Some(&self.id) {
            return Err(Error::ProtocolViolation(format!(
                "invalid response id: expected {}, got {}",
                self.id,
                response
                    .id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "none".to_string())
            )));
        }

        if let Some(error) = response.error {
            return Err(Error::JsonRpc(error));
        }

        if let Some(member) = response.error_member {
            return Err(nested_error(member));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

impl Drop for PendingCall {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Turn a nested `error` member into the caller's error
fn nested_error(member: Value) -> Error {
    match member.get("message").and_then(Value::as_str) {
        Some(message) => {
            let code = member
                .get("code")
                .and_then(Value::as_i64)
                .and_then(|code| i32::try_from(code).ok())
                .unwrap_or(SERVER_ERROR_CODE);
            Error::JsonRpc(JsonRpcErrorData::new(code, message))
        }
        None => Error::ProtocolViolation(format!(
            "error member without a message: {}",
            member
        )),
    }
}

fn key(id: &Id) -> String {
    match id {
        Id::String(s) => s.clone(),
        Id::Number(n) => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_start_at_one_and_are_strings() {
        let manager = RequestManager::new();
        assert_eq!(manager.next_id(), Id::from("1"));
        assert_eq!(manager.next_id(), Id::from("2"));
    }

    #[test]
    fn test_clones_share_counter() {
        let manager = RequestManager::new();
        let clone = manager.clone();
        manager.next_id();
        assert_eq!(clone.next_id(), Id::from("2"));
    }

    #[test]
    fn test_settle_success() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        assert_eq!(manager.pending_count(), 1);

        let result = call
            .settle(JsonRpcResponse::success(json!(42), Some(Id::from("1"))))
            .unwrap();

        assert_eq!(result, json!(42));
        assert_eq!(manager.pending_count(), 0);
    }

    #[test]
    fn test_missing_result_is_null() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        let response: JsonRpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": "1"})).unwrap();
        assert_eq!(call.settle(response).unwrap(), Value::Null);
    }

    #[test]
    fn test_mismatched_id_is_protocol_violation() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        let err = call
            .settle(JsonRpcResponse::success(json!(42), Some(Id::from("2"))))
            .unwrap_err();
        assert!(matches!(err, Error::ProtocolViolation(_)));
    }

    #[test]
    fn test_numeric_id_does_not_match_string_id() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        let err = call
            .settle(JsonRpcResponse::success(json!(42), Some(Id::Number(1))))
            .unwrap_err();
        assert!(matches!(err, Error::ProtocolViolation(_)));
    }

    #[test]
    fn test_wrong_version_is_protocol_violation() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        let mut response = JsonRpcResponse::success(json!(42), Some(Id::from("1")));
        response.jsonrpc = "1.0".to_string();
        assert!(matches!(
            call.settle(response).unwrap_err(),
            Error::ProtocolViolation(_)
        ));
    }

    #[test]
    fn test_nested_error_member_is_remote_error() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": "1", "error": {"code": -32601, "message": "Method not found"}
        }))
        .unwrap();

        match call.settle(response).unwrap_err() {
            Error::JsonRpc(data) => {
                assert_eq!(data.code, -32601);
                assert_eq!(data.message, "Method not found");
            }
            other => panic!("Expected remote error, got {other:?}"),
        }
        assert_eq!(manager.pending_count(), 0);
    }

    #[test]
    fn test_nested_error_without_message_is_protocol_violation() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        let response: JsonRpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0", "id": "1", "error": "something broke"
        }))
        .unwrap();
        assert!(matches!(
            call.settle(response).unwrap_err(),
            Error::ProtocolViolation(_)
        ));
    }

    #[test]
    fn test_error_envelope_is_remote_error() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("1"));
        let err = call
            .settle(JsonRpcResponse::error(
                JsonRpcErrorData::server_error("disk on fire"),
                Some(Id::from("1")),
            ))
            .unwrap_err();

        assert!(err.is_remote());
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_drop_unregisters() {
        let manager = RequestManager::new();
        let call = manager.register(Id::from("7"));
        assert!(manager.is_pending(&Id::from("7")));
        drop(call);
        assert!(!manager.is_pending(&Id::from("7")));
    }
}

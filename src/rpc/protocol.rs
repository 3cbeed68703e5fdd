//! JSON-RPC 2.0 message types and the line codec.
//!
//! Field naming is fixed camelCase on the wire. Absent values are omitted on
//! encode, never serialized as explicit `null`; a response carries either
//! `result` or `error`, never both.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Protocol version tag carried by every message.
pub const PROTOCOL_VERSION: &str = "2.0";

/// The closed error-code space: reserved JSON-RPC codes plus the domain
/// extension range below -32000 for telephony conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed payload (-32700). Reserved; the bridge drops malformed
    /// input silently because no id is reliably known.
    ParseError,
    /// Invalid request shape (-32600).
    InvalidRequest,
    /// Unknown method (-32601).
    MethodNotFound,
    /// Invalid parameters (-32602).
    InvalidParams,
    /// Internal failure while handling a request (-32603).
    Internal,
    /// Telephony resource not connected (-32000).
    NotConnected,
    /// Telephony resource operation failed (-32001).
    DeviceOperation,
}

impl ErrorCode {
    pub fn value(self) -> i64 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::Internal => -32603,
            ErrorCode::NotConnected => -32000,
            ErrorCode::DeviceOperation => -32001,
        }
    }
}

/// Why a line could not be turned into a dispatchable request. Both variants
/// are logged and dropped upstream; neither ever produces wire output.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("request object has no usable method field")]
    MissingMethod,
}

/// One decoded request line. Transient: consumed by exactly one dispatch.
///
/// `id` presence decides whether a response is owed; notifications carry no
/// id and are never answered. Ids are plain integers and a response echoes
/// the request id unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Decodes one non-blank line. Blank lines are the caller's job to skip;
/// they never reach the codec.
pub fn decode(line: &str) -> Result<RpcRequest, DecodeError> {
    let request: RpcRequest = serde_json::from_str(line)?;
    if request.method.is_empty() {
        return Err(DecodeError::MissingMethod);
    }
    Ok(request)
}

/// Error object nested in an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// A response owed to an id-carrying request. Built via [`RpcResponse::result`]
/// or [`RpcResponse::error`] so `result` and `error` stay mutually exclusive.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    pub fn result(id: i64, result: Option<Value>) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            id,
            result,
            error: None,
        }
    }

    pub fn error(id: i64, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            id,
            result: None,
            error: Some(RpcErrorObject {
                code: code.value(),
                message: message.into(),
            }),
        }
    }
}

/// An unsolicited event (bridge → client). No id, never answered.
#[derive(Debug, Clone, Serialize)]
pub struct RpcEvent {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RpcEvent {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            method: method.into(),
            params,
        }
    }
}

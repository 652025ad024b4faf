//! Request, signing payload and bearer token types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::protocol::canonical::to_canonical_string;

/// JSON-RPC protocol version carried in every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// RPC parameters: always a JSON object.
pub type Params = Map<String, Value>;

/// Request metadata read by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// Unix seconds; identical to the signed payload's `timestamp`.
    pub ts: u64,
}

/// JSON-RPC request body sent to `/mcp/rpc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Params,
    pub id: String,
    #[serde(rename = "__meta")]
    pub meta: RequestMeta,
}

impl RpcRequest {
    /// Build a request stamped with `timestamp`.
    ///
    /// The id is derived from the timestamp alone, so two requests built in
    /// the same second share an id.
    pub fn new(method: impl Into<String>, params: Params, timestamp: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: format!("req_{}", timestamp),
            meta: RequestMeta { ts: timestamp },
        }
    }
}

/// The exact input handed to the signer.
#[derive(Debug, Clone, Copy)]
pub struct SigningPayload<'a> {
    pub method: &'a str,
    pub params: &'a Params,
    pub timestamp: u64,
}

impl<'a> SigningPayload<'a> {
    pub fn new(method: &'a str, params: &'a Params, timestamp: u64) -> Self {
        Self {
            method,
            params,
            timestamp,
        }
    }

    /// Rebuild the payload a request was signed over.
    pub fn from_request(request: &'a RpcRequest) -> Self {
        Self::new(&request.method, &request.params, request.meta.ts)
    }

    /// Canonical serialization: `{"method":..,"params":..,"timestamp":..}`.
    pub fn to_canonical(&self) -> String {
        to_canonical_string(&json!({
            "method": self.method,
            "params": self.params,
            "timestamp": self.timestamp,
        }))
    }
}

/// Credential carried in the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub did: String,
    pub signature: String,
}

impl AuthToken {
    pub fn new(did: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            signature: signature.into(),
        }
    }

    /// JSON form of the token.
    pub fn to_json(&self) -> String {
        json!({ "did": self.did, "signature": self.signature }).to_string()
    }

    /// Full header value: `Bearer {"did":..,"signature":..}`.
    pub fn to_bearer(&self) -> String {
        format!("Bearer {}", self.to_json())
    }

    /// Parse an `Authorization` header value produced by [`AuthToken::to_bearer`].
    pub fn from_bearer(header: &str) -> Option<Self> {
        let token = header.strip_prefix("Bearer ")?;
        serde_json::from_str(token.trim()).ok()
    }
}

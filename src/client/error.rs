//! Error taxonomy for signer and MCP server interactions.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by [`McpClient`](crate::client::McpClient) and the relay.
#[derive(Debug, Error)]
pub enum McpError {
    /// A call was attempted before `initialize` succeeded.
    #[error("MCP client not initialized")]
    NotInitialized,

    /// Signer health check unreachable or non-2xx.
    #[error("Signer unavailable: {0}")]
    SignerUnavailable(String),

    /// Signer did not return a usable DID.
    #[error("Identity fetch failed: {0}")]
    IdentityFetchFailed(String),

    /// MCP server liveness check failed during initialization.
    #[error("MCP server unavailable: {0}")]
    ServerUnavailable(String),

    /// Signer unreachable, non-2xx, or returned no signature.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// MCP server answered 401.
    #[error("Authentication failed: {body}")]
    AuthenticationFailed { body: String },

    /// MCP server answered 403.
    #[error("Access denied: {body}")]
    AccessDenied { body: String },

    /// MCP server answered any other non-2xx status.
    #[error("RPC call failed with status {status}: {body}")]
    RpcCallFailed { status: u16, body: String },

    /// No response was received.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A 2xx response whose body is not valid JSON.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Capabilities endpoint answered non-2xx.
    #[error("Capabilities unavailable: status {status}")]
    CapabilitiesUnavailable { status: u16 },

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request could not be built from the given input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The relay task has stopped.
    #[error("Relay closed")]
    RelayClosed,
}

/// Result type for client operations.
pub type McpResult<T> = Result<T, McpError>;

impl McpError {
    /// Classify a non-2xx RPC response.
    pub fn from_rpc_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => McpError::AuthenticationFailed { body },
            StatusCode::FORBIDDEN => McpError::AccessDenied { body },
            other => McpError::RpcCallFailed {
                status: other.as_u16(),
                body,
            },
        }
    }
}

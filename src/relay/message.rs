//! Typed messages exchanged with the relay task.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::schema::RelayConfig;
use crate::protocol::Params;

/// A request to the relay.
#[derive(Debug, Clone)]
pub enum RelayRequest {
    /// Replace the current client with one built from this config and initialize it.
    Init(Box<RelayConfig>),
    /// Route an RPC to the current client.
    Rpc { method: String, params: Params },
    /// Report connection state.
    Status,
    /// Liveness check.
    Ping,
}

/// A successful reply from the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayResponse {
    Connected { requires_signing: bool },
    RpcResult { data: Value, duration: Duration },
    Status(RelayStatus),
    Pong,
}

/// Connection state of the relay's client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
    Error,
}

/// Snapshot answered to [`RelayRequest::Status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayStatus {
    pub connection: ConnectionStatus,
    pub has_client: bool,
    pub initialized: bool,
    pub requires_signing: bool,
}

/// Broadcast to subscribers whenever an `Init` completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    Connected {
        server_url: String,
        requires_signing: bool,
    },
    Failed {
        error: String,
    },
}

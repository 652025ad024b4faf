//! Wire protocol shared by the client and any verifier.
//!
//! # Data Flow
//! ```text
//! (method, params, timestamp)
//!     → SigningPayload → canonical.rs (sorted keys, no whitespace)
//!     → signer /sign → jws
//!     → AuthToken { did, signature } → "Authorization: Bearer <json>"
//!
//! (method, params, timestamp)
//!     → RpcRequest { jsonrpc, method, params, id, __meta.ts }
//!     → POST /mcp/rpc
//! ```
//!
//! The timestamp in the signed payload and in `__meta.ts` is always the
//! same value; the verifier rebuilds the payload from the request body.

pub mod canonical;
pub mod types;

pub use canonical::to_canonical_string;
pub use types::{AuthToken, Params, RequestMeta, RpcRequest, SigningPayload, JSONRPC_VERSION};

use std::time::{SystemTime, UNIX_EPOCH};

use crate::client::error::{McpError, McpResult};

/// Current unix time in whole seconds.
pub fn unix_timestamp() -> McpResult<u64> {
    timestamp_at(SystemTime::now())
}

/// Unix seconds for `time`; a clock before the epoch is an error, never 0.
pub fn timestamp_at(time: SystemTime) -> McpResult<u64> {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| {
            tracing::warn!(error = %e, "System clock is before the unix epoch");
            McpError::InvalidRequest(format!("system clock before unix epoch: {}", e))
        })
}

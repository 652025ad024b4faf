//! MCP client subsystem.
//!
//! # Data Flow
//! ```text
//! McpClient::new(config)          (uninitialized)
//!     → initialize()              signer /health, /did; server /mcp/capabilities; trial sign
//!     → call(method, params)
//!         → SigningPayload → signer /sign → AuthToken   (signed mode only)
//!         → POST /mcp/rpc
//!         → 2xx: JSON body | 401/403/other: McpError
//! ```
//!
//! # Design Decisions
//! - One client type; `requires_signing` selects the DID or plain variant
//! - No retries; every failure surfaces as a typed error
//! - Identity is written only by `initialize(&mut self)`

pub mod error;
pub mod mcp;

pub use error::{McpError, McpResult};
pub use mcp::{McpClient, CAPABILITIES_PATH, RPC_PATH};

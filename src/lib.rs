//! MCP relay with DID request signing.
//!
//! Relays JSON-RPC calls to a local MCP server, optionally signing each
//! request through a local DID signer service.

pub mod client;
pub mod config;
pub mod observability;
pub mod protocol;
pub mod relay;
pub mod signer;

pub use client::{McpClient, McpError, McpResult};
pub use config::schema::RelayConfig;
pub use relay::{Relay, RelayHandle};

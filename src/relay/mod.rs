//! Request/response channel between front ends and the MCP client.
//!
//! # Data Flow
//! ```text
//! CLI / UI
//!     → RelayHandle::request(RelayRequest)      mpsc + oneshot reply
//!     → Relay task (owns Option<McpClient>)     one request at a time
//!     → RelayResponse | McpError
//!
//! Init outcomes
//!     → broadcast RelayEvent::{Connected, Failed}
//! ```

pub mod handler;
pub mod message;

pub use handler::{Relay, RelayHandle};
pub use message::{ConnectionStatus, RelayEvent, RelayRequest, RelayResponse, RelayStatus};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! client / signer / relay
//!     → tracing events with structured fields
//!     → logging.rs subscriber (EnvFilter → fmt layer → stderr)
//! ```
//!
//! stdout stays reserved for command output.

pub mod logging;

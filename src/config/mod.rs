//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated)
//!     → CLI flag overrides
//!     → McpClient::new
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - A new config means a new client; nothing is patched in place

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{AuthConfig, ObservabilityConfig, RelayConfig, ServerConfig, SignerConfig, TimeoutConfig};
pub use validation::{validate_config, ValidationError};

//! DID signer service client.
//!
//! # Endpoints
//! ```text
//! GET  /health                          → 2xx when live
//! GET  /did                             → { "did": "..." }
//! POST /sign   { payload }              → { "jws": "..." }
//! POST /verify { payload, signature, did } → { "valid": bool }
//! ```
//!
//! # Security Constraints
//! - Signatures are logged at debug level only
//! - The signer is never contacted when signing is disabled

pub mod client;

pub use client::SignerClient;

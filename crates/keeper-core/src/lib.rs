//! # keeper-core
//!
//! Core types, wire messages, and configuration for Keeper.
//!
//! This crate provides shared functionality used by both the server and the
//! client side of Keeper:
//!
//! - **Types**: secret type enumeration, decrypted payload shapes, listings
//! - **Wire**: JSON-RPC envelope and the request/response messages of every method
//! - **Configuration**: loading, validation, and environment overrides
//! - **Utilities**: path resolution, environment handling, redacted strings

pub mod config;
pub mod env;
pub mod error;
pub mod messages;
pub mod paths;
pub mod rpc;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
pub use types::*;

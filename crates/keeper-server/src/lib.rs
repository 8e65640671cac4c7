//! JSON-RPC server for Keeper.
//!
//! This crate provides:
//! - JSON-RPC 2.0 over HTTP (`POST /rpc`)
//! - A bearer-token gate in front of every method except login and registration
//! - Handlers for accounts, secrets, and secret types over `keeper-store`

pub mod auth;
pub mod error;
pub mod handlers;
pub mod methods;
pub mod server;

pub use auth::AuthGate;
pub use error::ServerError;
pub use handlers::HandlerContext;
pub use methods::{AuthenticatedCall, MethodHandler, MethodRegistry, ProtectedHandler};
pub use server::{build_context, Server, ServerConfig};

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

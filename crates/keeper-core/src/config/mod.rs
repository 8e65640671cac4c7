//! Configuration schema, loading, and environment overrides.

mod loader;
mod schema;

pub use schema::*;

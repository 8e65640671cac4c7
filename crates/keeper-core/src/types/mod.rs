//! Shared type definitions.

mod payload;
mod secret_type;

pub use payload::*;
pub use secret_type::*;

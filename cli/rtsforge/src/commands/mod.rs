//! CLI command implementations.

pub mod resolve;
pub mod target;

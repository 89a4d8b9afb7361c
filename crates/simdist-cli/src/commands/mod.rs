//! CLI command implementations.

pub mod bench;
pub mod eval;
pub mod info;

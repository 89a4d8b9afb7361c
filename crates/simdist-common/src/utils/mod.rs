//! Common utilities used throughout simdist.
//!
//! - [`error`] - Error types like [`Error`] and [`ConfigError`](error::ConfigError)

pub mod error;

pub use error::{Error, Result};

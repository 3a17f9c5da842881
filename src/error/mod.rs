//! Error handling module
//!
//! Defines the error taxonomy for configuration processing with exit codes

pub mod types;

pub use types::*;

//! # MA Plan Validator Shared
//!
//! Error taxonomy and configuration used across the validator crates.

pub mod config;
pub mod error;

// Re-exports
pub use config::*;
pub use error::*;

//! Shared library for the stream-resolver workspace.
//!
//! This crate provides the functionality common to the pipeline crates:
//! - Configuration management
//! - Data models for both anime sources
//! - The resolution error taxonomy
//! - Logging infrastructure

pub mod config;
pub mod error;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::ResolveError;
pub use logging::LogConfig;
pub use models::*;

//! Core plumbing shared by every layer of varmon.
//!
//! Configuration, the error type and instance addressing live here; the
//! metric model itself is in [`crate::metrics`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod target;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel, OutputFormat};
pub use error::{Result, VarmonError};
pub use target::{parse_targets, Target, DEFAULT_ENDPOINT};

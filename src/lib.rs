//! varmon - Terminal-native monitor for expvar-style JSON telemetry.
//!
//! varmon polls one or more processes that export their runtime state as a
//! JSON document (Go's `expvar` at `/debug/vars` being the classic case),
//! extracts configured metrics by dotted path and keeps a bounded history
//! of each for sparklines.
//!
//! # Features
//!
//! - **Typed metrics**: `mem:`, `duration:` and `str:` path prefixes pick
//!   byte-size, duration or string formatting
//! - **GC statistics**: pause durations and inter-GC intervals reconstructed
//!   from the runtime's 256-slot circular buffers into bounded histograms
//! - **Restart detection**: via failed-then-recovered fetches or a
//!   cumulative counter going backwards
//! - **Consistent ticks**: all instances refresh concurrently and are
//!   published together
//!
//! # Architecture
//!
//! - `core`: configuration, errors and target addressing
//! - `metrics`: metric paths, typed values, history and histograms
//! - `instance`: per-instance refresh state machine
//! - `fetch`: telemetry fetching over HTTP
//! - `poller`: tick loop with a join barrier
//! - `display`: renderers for tick snapshots
//! - `cli`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use varmon_lib::core::ConfigBuilder;
//! use varmon_lib::display::ConsoleRenderer;
//! use varmon_lib::Poller;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigBuilder::new().target("1234-1236").build()?;
//!     let mut poller = Poller::from_config(&config)?;
//!     let mut renderer = ConsoleRenderer::new(std::io::stdout());
//!     poller.run(&mut renderer, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod display;
pub mod fetch;
pub mod instance;
pub mod metrics;
pub mod poller;

// Re-export core types for convenience
pub use crate::core::{Config, Result, VarmonError};
pub use crate::instance::{InstanceState, RefreshState};
pub use crate::poller::{Poller, Snapshot};

//! Typed metrics extracted from instance telemetry.
//!
//! - `path`: dotted metric paths and their kinds
//! - `value`: the typed value family, one variant per kind
//! - `history`: bounded per-metric sample history with a running max
//! - `histogram`: bounded approximate distribution for GC statistics
//! - `gc`: pause/interval reconstruction from runtime circular buffers

pub mod format;
pub mod gc;
pub mod histogram;
pub mod history;
pub mod path;
pub mod sample;
pub mod value;

pub use gc::{GcIntervals, GcPauses, GC_BUFFER_SLOTS};
pub use histogram::{Bin, DistributionHistogram, DEFAULT_BINS};
pub use history::{HistoryBuffer, DEFAULT_CAPACITY};
pub use path::{parse_paths, Kind, MetricPath, GC_INTERVALS_PATH, GC_PAUSES_PATH};
pub use sample::{trimmed_average, Sample};
pub use value::{MetricValue, NOT_AVAILABLE};

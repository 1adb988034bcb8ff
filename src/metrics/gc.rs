//! Reconstruction of GC pause statistics from the runtime's circular buffers.
//!
//! The Go runtime exports the last `GC_BUFFER_SLOTS` pause durations
//! (`memstats.PauseNs`) and pause end timestamps (`memstats.PauseEnd`) as
//! fixed-size circular buffers without the write cursor. Unfilled slots are
//! zero, so zeros are padding rather than zero-length pauses.

use serde_json::Value;

use super::histogram::{DistributionHistogram, DEFAULT_BINS};

/// Slot count of the runtime's pause buffers.
pub const GC_BUFFER_SLOTS: usize = 256;

/// Copy a JSON array into a zero-padded slot buffer.
///
/// Non-array input, non-integer elements and elements past the last slot
/// read as zero.
fn read_slots(value: &Value) -> [u64; GC_BUFFER_SLOTS] {
    let mut slots = [0u64; GC_BUFFER_SLOTS];
    if let Some(items) = value.as_array() {
        for (slot, item) in slots.iter_mut().zip(items) {
            *slot = item
                .as_u64()
                .or_else(|| item.as_i64().map(i64::unsigned_abs))
                .unwrap_or(0);
        }
    }
    slots
}

/// Pause durations in nanoseconds.
#[derive(Debug, Clone)]
pub struct GcPauses {
    pauses: [u64; GC_BUFFER_SLOTS],
    summary: DistributionHistogram,
}

impl GcPauses {
    /// Replace the buffer contents from a decoded JSON array.
    pub fn set(&mut self, value: &Value) {
        self.pauses = read_slots(value);
        self.summary = self.histogram(DEFAULT_BINS);
    }

    /// Build a histogram of the non-zero pauses.
    pub fn histogram(&self, bins: usize) -> DistributionHistogram {
        let mut hist = DistributionHistogram::new(bins);
        hist.extend(self.pauses.iter().copied().filter(|p| *p > 0));
        hist
    }

    /// Mean pause, 0 before any pause was recorded.
    pub fn mean(&self) -> f64 {
        self.summary.mean()
    }
}

impl Default for GcPauses {
    fn default() -> Self {
        Self {
            pauses: [0; GC_BUFFER_SLOTS],
            summary: DistributionHistogram::default(),
        }
    }
}

/// Spacing between consecutive GC pauses, from end timestamps.
#[derive(Debug, Clone)]
pub struct GcIntervals {
    intervals: [u64; GC_BUFFER_SLOTS],
    summary: DistributionHistogram,
}

impl GcIntervals {
    /// Replace the buffer contents from a decoded JSON array of timestamps.
    pub fn set(&mut self, value: &Value) {
        self.intervals = intervals_from_timestamps(&read_slots(value));
        self.summary = self.histogram(DEFAULT_BINS);
    }

    /// Build a histogram of the true inter-GC intervals.
    ///
    /// The single largest candidate spans the buffer's wrap boundary and is
    /// dropped together with zero padding.
    pub fn histogram(&self, bins: usize) -> DistributionHistogram {
        let mut hist = DistributionHistogram::new(bins);

        let wrap_idx = self
            .intervals
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
            .map(|(idx, _)| idx);

        hist.extend(
            self.intervals
                .iter()
                .enumerate()
                .filter(|(idx, interval)| **interval > 0 && Some(*idx) != wrap_idx)
                .map(|(_, interval)| *interval),
        );
        hist
    }

    /// Mean interval, 0 while fewer than two pauses are known.
    pub fn mean(&self) -> f64 {
        self.summary.mean()
    }
}

impl Default for GcIntervals {
    fn default() -> Self {
        Self {
            intervals: [0; GC_BUFFER_SLOTS],
            summary: DistributionHistogram::default(),
        }
    }
}

/// Absolute difference of every timestamp to its predecessor.
///
/// Slot 0 is compared against the last slot. The scan stops at the first
/// zero timestamp after slot 0: the runtime has not written past it yet.
fn intervals_from_timestamps(stamps: &[u64; GC_BUFFER_SLOTS]) -> [u64; GC_BUFFER_SLOTS] {
    let mut intervals = [0u64; GC_BUFFER_SLOTS];
    intervals[0] = stamps[0].abs_diff(stamps[GC_BUFFER_SLOTS - 1]);

    let mut prev = stamps[0];
    for (slot, stamp) in intervals.iter_mut().zip(stamps).skip(1) {
        if *stamp == 0 {
            break;
        }
        *slot = stamp.abs_diff(prev);
        prev = *stamp;
    }
    intervals
}

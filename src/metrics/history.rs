//! Fixed-capacity sample history for sparklines.
//!
//! This module provides an index-based ring buffer that keeps the most
//! recent samples for one (instance, metric) pair with O(1) pushes, plus
//! the running maximum over everything ever pushed.

use crate::metrics::sample::Sample;
use std::cmp::Ordering;

/// Default number of samples kept per metric.
///
/// Enough for sparklines on high-resolution terminals with small fonts.
pub const DEFAULT_CAPACITY: usize = 1200;

/// Bounded FIFO of samples; the oldest sample is evicted on overflow.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buffer: Vec<Sample>,
    capacity: usize,
    /// Index of the oldest sample once the buffer has wrapped
    head: usize,
    max: Option<Sample>,
}

impl HistoryBuffer {
    /// Create a new history buffer with the specified capacity
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");

        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            head: 0,
            max: None,
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, sample: Sample) {
        self.update_max(&sample);

        if self.buffer.len() < self.capacity {
            self.buffer.push(sample);
        } else {
            self.buffer[self.head] = sample;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    fn update_max(&mut self, sample: &Sample) {
        let replace = match &self.max {
            None => true,
            Some(current) => sample.numeric_cmp(current) == Some(Ordering::Greater),
        };
        if replace {
            self.max = Some(sample.clone());
        }
    }

    /// Most recently pushed sample
    #[doc(alias = "latest")]
    pub fn front(&self) -> Option<&Sample> {
        if self.buffer.is_empty() {
            return None;
        }
        let idx = (self.head + self.buffer.len() - 1) % self.buffer.len();
        self.buffer.get(idx)
    }

    /// Largest sample pushed so far, including evicted ones
    pub fn max(&self) -> Option<&Sample> {
        self.max.as_ref()
    }

    /// Samples from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        let (newer, older) = self.buffer.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Sparkline projection of the samples, oldest first
    pub fn int_values(&self) -> Vec<i64> {
        self.iter().map(Sample::as_sparkline_int).collect()
    }

    /// Get current number of samples
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if no sample was pushed yet
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all samples and the running maximum
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.head = 0;
        self.max = None;
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

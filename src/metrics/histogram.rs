//! Bounded streaming histogram with merge-based compaction.
//!
//! Bins are kept sorted by value. Once the bin count exceeds the cap, the
//! two adjacent bins closest in value are merged into their count-weighted
//! average until the cap holds again. Memory stays bounded regardless of
//! how many samples are added, at the cost of approximate statistics.

use serde::Serialize;

/// Bin count used when a caller does not choose one.
pub const DEFAULT_BINS: usize = 20;

/// One `(value, count)` pair. Values are unique within a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bin {
    /// Representative value.
    pub value: u64,
    /// Number of samples folded into this bin.
    pub count: u64,
}

/// Approximate distribution over `u64` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionHistogram {
    bins: Vec<Bin>,
    max_bins: usize,
    total: u64,
}

impl DistributionHistogram {
    /// Create an empty histogram holding at most `max_bins` bins.
    ///
    /// A cap of zero is treated as one.
    pub fn new(max_bins: usize) -> Self {
        let max_bins = max_bins.max(1);
        Self {
            bins: Vec::with_capacity(max_bins + 1),
            max_bins,
            total: 0,
        }
    }

    /// Record one sample.
    pub fn add(&mut self, value: u64) {
        self.total += 1;

        match self.bins.binary_search_by_key(&value, |bin| bin.value) {
            Ok(idx) => self.bins[idx].count += 1,
            Err(idx) => {
                self.bins.insert(idx, Bin { value, count: 1 });
                self.compact();
            },
        }
    }

    /// Merge closest adjacent bins until the cap holds.
    ///
    /// On equal deltas the lowest pair wins.
    fn compact(&mut self) {
        while self.bins.len() > self.max_bins {
            let mut merge_at = 1;
            let mut min_delta = u64::MAX;
            for (idx, pair) in self.bins.windows(2).enumerate() {
                let delta = pair[1].value - pair[0].value;
                if delta < min_delta {
                    min_delta = delta;
                    merge_at = idx + 1;
                }
            }

            let left = self.bins[merge_at - 1];
            let right = self.bins[merge_at];
            let count = left.count + right.count;
            let weighted = u128::from(left.value) * u128::from(left.count)
                + u128::from(right.value) * u128::from(right.count);
            let value = u64::try_from(weighted / u128::from(count)).unwrap_or(u64::MAX);

            self.bins[merge_at - 1] = Bin { value, count };
            self.bins.remove(merge_at);
        }
    }

    /// Number of samples added so far.
    pub fn count(&self) -> u64 {
        self.total
    }

    /// Maximum number of bins.
    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    /// Current bins in ascending value order.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Number of bins currently held.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// True when no sample has been added.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Sample mean, 0 when empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        let sum: f64 = self
            .bins
            .iter()
            .map(|bin| bin.value as f64 * bin.count as f64)
            .sum();
        sum / self.total as f64
    }

    /// Population variance around the full-precision mean, 0 when empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn variance(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        let mean = self.mean();
        let sum: f64 = self
            .bins
            .iter()
            .map(|bin| {
                let delta = bin.value as f64 - mean;
                bin.count as f64 * delta * delta
            })
            .sum();
        sum / self.total as f64
    }

    /// Value of the first bin at which the cumulative count reaches
    /// `q * count()`, for `q` in `[0, 1]`.
    ///
    /// Returns 0 when empty and -1 if no bin qualifies.
    #[allow(clippy::cast_precision_loss)]
    pub fn quantile(&self, q: f64) -> i64 {
        if self.total == 0 {
            return 0;
        }

        let threshold = q * self.total as f64;
        let mut cumulative = 0u64;
        for bin in &self.bins {
            cumulative += bin.count;
            if cumulative as f64 >= threshold {
                return i64::try_from(bin.value).unwrap_or(i64::MAX);
            }
        }
        -1
    }

    /// Fraction of samples with value `<= x`, 0 when empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn cdf(&self, x: u64) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        let below: u64 = self
            .bins
            .iter()
            .take_while(|bin| bin.value <= x)
            .map(|bin| bin.count)
            .sum();
        below as f64 / self.total as f64
    }

    /// Smallest bin value, 0 when empty.
    pub fn min(&self) -> u64 {
        self.bins.first().map_or(0, |bin| bin.value)
    }

    /// Largest bin value, 0 when empty.
    pub fn max(&self) -> u64 {
        self.bins.last().map_or(0, |bin| bin.value)
    }

    /// Parallel value and count arrays for bar chart rendering.
    pub fn barchart_data(&self) -> (Vec<u64>, Vec<u64>) {
        self.bins.iter().map(|bin| (bin.value, bin.count)).unzip()
    }
}

impl Default for DistributionHistogram {
    fn default() -> Self {
        Self::new(DEFAULT_BINS)
    }
}

impl Extend<u64> for DistributionHistogram {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(max_bins: usize, values: &[u64]) -> DistributionHistogram {
        let mut hist = DistributionHistogram::new(max_bins);
        hist.extend(values.iter().copied());
        hist
    }

    #[test]
    fn test_empty_histogram_is_all_zero() {
        let hist = DistributionHistogram::new(10);
        assert_eq!(hist.count(), 0);
        assert_eq!(hist.mean(), 0.0);
        assert_eq!(hist.variance(), 0.0);
        assert_eq!(hist.quantile(0.5), 0);
        assert_eq!(hist.cdf(100), 0.0);
        assert_eq!(hist.min(), 0);
        assert_eq!(hist.max(), 0);
        assert_eq!(hist.barchart_data(), (vec![], vec![]));
    }

    #[test]
    fn test_add_keeps_bins_sorted_and_unique() {
        let hist = filled(10, &[30, 10, 20, 10, 30, 30]);
        assert_eq!(
            hist.bins(),
            &[
                Bin { value: 10, count: 2 },
                Bin { value: 20, count: 1 },
                Bin { value: 30, count: 3 },
            ]
        );
        assert_eq!(hist.count(), 6);
    }

    #[test]
    fn test_add_never_exceeds_max_bins() {
        let mut hist = DistributionHistogram::new(5);
        for value in (0..1000u64).map(|v| v * 7919 % 1009) {
            hist.add(value);
            assert!(hist.len() <= 5);
        }
        assert_eq!(hist.count(), 1000);
        assert_eq!(hist.bins().iter().map(|b| b.count).sum::<u64>(), 1000);
    }

    #[test]
    fn test_compaction_merges_closest_pair() {
        // 10 and 12 are closest: merged to (10*1 + 12*1) / 2 = 11
        let hist = filled(3, &[0, 10, 12, 100]);
        assert_eq!(
            hist.bins(),
            &[
                Bin { value: 0, count: 1 },
                Bin { value: 11, count: 2 },
                Bin { value: 100, count: 1 },
            ]
        );
    }

    #[test]
    fn test_compaction_tie_picks_lowest_pair() {
        // deltas are all 10; the first pair (0, 10) must merge
        let hist = filled(3, &[0, 10, 20, 30]);
        assert_eq!(
            hist.bins(),
            &[
                Bin { value: 5, count: 2 },
                Bin { value: 20, count: 1 },
                Bin { value: 30, count: 1 },
            ]
        );
    }

    #[test]
    fn test_merge_uses_weighted_truncating_average() {
        let hist = filled(1, &[10, 10, 11]);
        // (10*2 + 11*1) / 3 = 10 (truncated)
        assert_eq!(hist.bins(), &[Bin { value: 10, count: 3 }]);
    }

    #[test]
    fn test_zero_max_bins_clamped() {
        let hist = filled(0, &[1, 2, 3]);
        assert_eq!(hist.max_bins(), 1);
        assert_eq!(hist.len(), 1);
    }

    #[test]
    fn test_mean_and_variance() {
        let hist = filled(20, &[50, 100, 150]);
        assert_eq!(hist.mean(), 100.0);
        assert!((hist.variance() - 5000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_quantile_boundaries() {
        let hist = filled(20, &[50, 100, 150]);
        assert_eq!(hist.quantile(0.0), 50);
        assert_eq!(hist.quantile(0.5), 100);
        assert_eq!(hist.quantile(0.99), 150);
        assert_eq!(hist.quantile(1.0), 150);
        assert_eq!(hist.quantile(1.5), -1);
    }

    #[test]
    fn test_cdf() {
        let hist = filled(20, &[50, 100, 150, 150]);
        assert_eq!(hist.cdf(10), 0.0);
        assert_eq!(hist.cdf(100), 0.5);
        assert_eq!(hist.cdf(150), 1.0);
    }

    #[test]
    fn test_barchart_data_is_parallel() {
        let hist = filled(20, &[3, 1, 3]);
        assert_eq!(hist.barchart_data(), (vec![1, 3], vec![1, 2]));
        assert_eq!(hist.min(), 1);
        assert_eq!(hist.max(), 3);
    }
}

use std::cmp::Ordering;

use crate::descriptive::DescriptiveStats;

/// A count-weighted distribution over distinct values.
///
/// Unlike a fixed-width histogram, every distinct observed value gets its own bin,
/// which is what a compressed observation table naturally produces: one value with
/// the number of times it was observed. Bins are kept sorted in ascending order
/// (IEEE total order) and never hold a zero count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    bins: Vec<HistogramBin>,
    total_count: u64,
}

/// A single distinct value and the number of times it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    /// The observed value.
    pub value: f64,
    /// The number of observations of `value`.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram from `(value, count)` pairs.
    ///
    /// Pairs may arrive in any order and may repeat a value; repeated values are
    /// merged and zero counts are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use evoscore_stats::histogram::Histogram;
    /// let histogram = Histogram::new([(3.0, 1), (1.0, 0), (3.0, 2), (-1.0, 4)]);
    /// let values = histogram.bins().iter().map(|b| b.value).collect::<Vec<_>>();
    /// assert_eq!(values, [-1.0, 3.0]);
    /// assert_eq!(histogram.count_of(3.0), 3);
    /// ```
    #[must_use]
    pub fn new<I>(weighted_values: I) -> Self
    where
        I: IntoIterator<Item = (f64, u64)>,
    {
        let mut pairs = weighted_values
            .into_iter()
            .filter(|(_, c)| *c > 0)
            .collect::<Vec<_>>();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut bins: Vec<HistogramBin> = Vec::with_capacity(pairs.len());
        for (value, count) in pairs {
            match bins.last_mut() {
                Some(last) if last.value.total_cmp(&value) == Ordering::Equal => {
                    last.count += count;
                }
                _ => bins.push(HistogramBin { value, count }),
            }
        }
        let total_count = bins.iter().map(|b| b.count).sum();
        Self { bins, total_count }
    }

    /// Creates a histogram from individual observations.
    #[must_use]
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(values.into_iter().map(|v| (v, 1)))
    }

    /// Returns the bins in ascending value order.
    #[must_use]
    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    /// Returns the number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Returns the total number of observations.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Returns the number of observations of `value` (zero if never observed).
    #[must_use]
    pub fn count_of(&self, value: f64) -> u64 {
        self.bins
            .binary_search_by(|b| b.value.total_cmp(&value))
            .map_or(0, |idx| self.bins[idx].count)
    }

    /// Returns the empirical probability of `value`.
    ///
    /// Zero for an empty histogram.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn probability(&self, value: f64) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.count_of(value) as f64 / self.total_count as f64
    }

    /// Computes count-weighted descriptive statistics of the distribution.
    ///
    /// Returns `None` for an empty histogram.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::weighted(self.bins.iter().map(|b| (b.value, b.count as f64)))
    }
}

impl FromIterator<(f64, u64)> for Histogram {
    fn from_iter<T: IntoIterator<Item = (f64, u64)>>(iter: T) -> Self {
        Self::new(iter)
    }
}

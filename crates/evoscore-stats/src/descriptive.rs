/// Descriptive statistics summarizing a weighted dataset.
///
/// Every sample carries a non-negative weight (typically an occurrence count), so a
/// compressed dataset can be summarized without expanding it. Moments are population
/// moments: they are normalized by the total weight, not by `total_weight - 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// The sum of all sample weights.
    pub total_weight: f64,
    /// The minimum value with non-zero weight.
    pub min: f64,
    /// The maximum value with non-zero weight.
    pub max: f64,
    /// The weighted arithmetic mean.
    pub mean: f64,
    /// The weighted (population) variance.
    pub variance: f64,
    /// The weighted (population) standard deviation.
    pub std_dev: f64,
    /// The weighted skewness `m3 / m2^1.5`.
    ///
    /// Zero when the variance is zero, since a one-point distribution has no asymmetry.
    pub skewness: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unweighted values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use evoscore_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.variance, 2.0);
    /// assert_eq!(stats.skewness, 0.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        Self::weighted(values.into_iter().map(|v| (v, 1.0)))
    }

    /// Computes descriptive statistics from `(value, weight)` samples.
    ///
    /// Samples with zero weight are ignored.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the total weight is positive
    /// * `None` - if the dataset is empty or carries no weight
    ///
    /// # Panics
    ///
    /// Panics if any weight is negative.
    ///
    /// # Examples
    ///
    /// ```
    /// # use evoscore_stats::descriptive::DescriptiveStats;
    /// // Right-skewed: most of the mass sits at the low end.
    /// let stats = DescriptiveStats::weighted([(0.0, 8.0), (10.0, 1.0)]).unwrap();
    /// assert!(stats.skewness > 0.0);
    /// ```
    #[must_use]
    pub fn weighted<I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let samples = samples
            .into_iter()
            .inspect(|(_, w)| assert!(*w >= 0.0, "sample weights must be non-negative"))
            .filter(|(_, w)| *w > 0.0)
            .collect::<Vec<_>>();

        let total_weight = samples.iter().map(|(_, w)| w).sum::<f64>();
        if samples.is_empty() || total_weight <= 0.0 {
            return None;
        }

        let min = samples.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
        let max = samples
            .iter()
            .map(|(v, _)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        let mean = samples.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight;

        let (m2, m3) = samples.iter().fold((0.0, 0.0), |(m2, m3), (v, w)| {
            let d = v - mean;
            (m2 + w * d * d, m3 + w * d * d * d)
        });
        let variance = m2 / total_weight;
        let m3 = m3 / total_weight;
        let skewness = if variance > 0.0 {
            m3 / variance.powf(1.5)
        } else {
            0.0
        };

        Some(Self {
            total_weight,
            min,
            max,
            mean,
            variance,
            std_dev: variance.sqrt(),
            skewness,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_empty_and_weightless() {
        assert!(DescriptiveStats::new([]).is_none());
        assert!(DescriptiveStats::weighted([(1.0, 0.0), (2.0, 0.0)]).is_none());
    }

    #[test]
    fn test_weights_match_repetition() {
        let weighted = DescriptiveStats::weighted([(1.0, 3.0), (4.0, 1.0), (6.0, 2.0)]).unwrap();
        let repeated = DescriptiveStats::new([1.0, 1.0, 1.0, 4.0, 6.0, 6.0]).unwrap();
        assert_relative_eq!(weighted.mean, repeated.mean, epsilon = 1e-12);
        assert_relative_eq!(weighted.variance, repeated.variance, epsilon = 1e-12);
        assert_relative_eq!(weighted.skewness, repeated.skewness, epsilon = 1e-12);
    }

    #[test]
    fn test_skewness_sign() {
        let left = DescriptiveStats::new([0.0, 9.0, 10.0, 10.0]).unwrap();
        let right = DescriptiveStats::new([0.0, 0.0, 1.0, 10.0]).unwrap();
        assert!(left.skewness < 0.0);
        assert!(right.skewness > 0.0);
        assert_relative_eq!(left.skewness, -right.skewness, epsilon = 1e-12);
    }

    #[test]
    fn test_single_point_has_zero_skewness() {
        let stats = DescriptiveStats::weighted([(7.0, 5.0)]).unwrap();
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.min, 7.0);
        assert_eq!(stats.max, 7.0);
    }
}

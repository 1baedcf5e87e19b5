//! Rank-sum statistics over count-weighted distributions.
//!
//! The Mann-Whitney U statistic compares two samples by ranking their pooled
//! observations. Tied observations share the average of the ranks they span, and the
//! variance used for standardization carries the usual tie correction:
//!
//! ```text
//! U      = R₁ - n₁(n₁ + 1) / 2
//! μ_U    = n₁ n₂ / 2
//! σ²_U   = n₁ n₂ / 12 · ((n + 1) - Σ(t³ - t) / (n (n - 1)))
//! z      = (U - μ_U) / σ_U
//! ```
//!
//! where `R₁` is the rank sum of the first sample and `t` ranges over tie group sizes.

use std::cmp::Ordering;

use crate::histogram::{Histogram, HistogramBin};

/// Computes the Mann-Whitney U statistic of `sample` against `reference`.
///
/// Large values mean `sample` tends to rank above `reference`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mann_whitney_u(sample: &Histogram, reference: &Histogram) -> f64 {
    let ranks = pooled_ranks(sample, reference);
    let n1 = sample.total_count() as f64;
    ranks.sample_rank_sum - n1 * (n1 + 1.0) / 2.0
}

/// Computes the standardized (z-scored) Mann-Whitney U of `sample` against `reference`.
///
/// Positive when `sample` is shifted toward larger values than `reference`, negative when
/// shifted toward smaller ones. Returns `0.0` when either side is empty or when every
/// pooled observation is tied, since no shift can be measured.
///
/// # Examples
///
/// ```
/// use evoscore_stats::{histogram::Histogram, rank::standardized_mann_whitney_u};
///
/// let low = Histogram::from_values([1.0, 2.0, 3.0]);
/// let high = Histogram::from_values([4.0, 5.0, 6.0]);
/// let z = standardized_mann_whitney_u(&high, &low);
/// assert!(z > 1.9);
/// assert!((standardized_mann_whitney_u(&low, &high) + z).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn standardized_mann_whitney_u(sample: &Histogram, reference: &Histogram) -> f64 {
    let n1 = sample.total_count() as f64;
    let n2 = reference.total_count() as f64;
    if n1 == 0.0 || n2 == 0.0 {
        return 0.0;
    }

    let ranks = pooled_ranks(sample, reference);
    let u = ranks.sample_rank_sum - n1 * (n1 + 1.0) / 2.0;
    let n = n1 + n2;
    let mean = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - ranks.tie_correction / (n * (n - 1.0)));
    if variance <= 0.0 {
        return 0.0;
    }
    (u - mean) / variance.sqrt()
}

#[derive(Debug, Default)]
struct PooledRanks {
    sample_rank_sum: f64,
    tie_correction: f64,
}

#[expect(clippy::cast_precision_loss)]
fn pooled_ranks(sample: &Histogram, reference: &Histogram) -> PooledRanks {
    let mut ranks = PooledRanks::default();
    let mut assigned = 0.0;

    let mut add_group = |in_sample: u64, in_reference: u64| {
        let tied = (in_sample + in_reference) as f64;
        let average_rank = assigned + (tied + 1.0) / 2.0;
        ranks.sample_rank_sum += in_sample as f64 * average_rank;
        ranks.tie_correction += tied * tied * tied - tied;
        assigned += tied;
    };

    let mut s = sample.bins().iter().peekable();
    let mut r = reference.bins().iter().peekable();
    loop {
        match (s.peek().copied(), r.peek().copied()) {
            (Some(a), Some(b)) => match a.value.total_cmp(&b.value) {
                Ordering::Less => {
                    add_group(a.count, 0);
                    s.next();
                }
                Ordering::Greater => {
                    add_group(0, b.count);
                    r.next();
                }
                Ordering::Equal => {
                    add_group(a.count, b.count);
                    s.next();
                    r.next();
                }
            },
            (Some(HistogramBin { count, .. }), None) => {
                add_group(*count, 0);
                s.next();
            }
            (None, Some(HistogramBin { count, .. })) => {
                add_group(0, *count);
                r.next();
            }
            (None, None) => break,
        }
    }
    ranks
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_u_without_ties() {
        // Pooled order: 1(s) 2(r) 3(s) 4(r) → sample ranks 1 + 3 = 4, U = 4 - 3 = 1.
        let sample = Histogram::from_values([1.0, 3.0]);
        let reference = Histogram::from_values([2.0, 4.0]);
        assert_relative_eq!(mann_whitney_u(&sample, &reference), 1.0);
        assert_relative_eq!(mann_whitney_u(&reference, &sample), 3.0);
    }

    #[test]
    fn test_ties_share_ranks() {
        // Pooled: 1, 1, 1 (ranks 1..=3, average 2), 2 (rank 4).
        let sample = Histogram::new([(1.0, 2)]);
        let reference = Histogram::new([(1.0, 1), (2.0, 1)]);
        assert_relative_eq!(mann_whitney_u(&sample, &reference), 4.0 - 3.0);
    }

    #[test]
    fn test_identical_samples_have_zero_shift() {
        let sample = Histogram::from_values([1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(
            standardized_mann_whitney_u(&sample, &sample),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_degenerate_inputs() {
        let one = Histogram::new([(5.0, 3)]);
        assert_eq!(standardized_mann_whitney_u(&one, &one), 0.0);
        assert_eq!(standardized_mann_whitney_u(&Histogram::default(), &one), 0.0);
    }

    #[test]
    fn test_standardized_matches_normal_approximation() {
        let sample = Histogram::from_values([6.0, 7.0, 8.0]);
        let reference = Histogram::from_values([1.0, 2.0, 3.0, 4.0]);
        // U = 12, μ = 6, σ² = 12 / 12 · 8 = 8.
        assert_relative_eq!(
            standardized_mann_whitney_u(&sample, &reference),
            6.0 / 8.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }
}

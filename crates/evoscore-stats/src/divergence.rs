//! Kullback-Leibler divergence between count-weighted distributions.
//!
//! Both distributions are empirical: each bin's probability is its count divided by
//! the histogram's total count. The divergence of `q` from `p` is
//!
//! ```text
//! D(q || p) = Σₓ q(x) · ln(q(x) / p(x))
//! ```
//!
//! summed over the support of `q`. It is finite whenever the support of `q` is
//! contained in the support of `p`, which always holds when `q` is a conditioned
//! sub-sample of `p`. A value in `q` that `p` never observed contributes `+∞`.

use crate::histogram::Histogram;

/// Computes the Kullback-Leibler divergence `D(q || p)` in nats.
///
/// Returns `0.0` when `q` is empty.
///
/// # Examples
///
/// ```
/// use evoscore_stats::{divergence::kl_divergence, histogram::Histogram};
///
/// let p = Histogram::from_values([1.0, 2.0]);
/// assert_eq!(kl_divergence(&p, &p), 0.0);
///
/// let q = Histogram::from_values([1.0]);
/// assert!((kl_divergence(&q, &p) - 2.0_f64.ln()).abs() < 1e-12);
/// ```
#[must_use]
pub fn kl_divergence(q: &Histogram, p: &Histogram) -> f64 {
    kl_divergence_terms(q, p).into_iter().sum()
}

/// Computes the per-value terms `q(x) · ln(q(x) / p(x))` of `D(q || p)`.
///
/// One term per distinct value of `q`, in ascending value order. Individual terms may
/// be negative; their sum is not.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kl_divergence_terms(q: &Histogram, p: &Histogram) -> Vec<f64> {
    let q_total = q.total_count() as f64;
    q.bins()
        .iter()
        .map(|bin| {
            let q_x = bin.count as f64 / q_total;
            let p_x = p.probability(bin.value);
            if p_x > 0.0 {
                q_x * (q_x / p_x).ln()
            } else {
                f64::INFINITY
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_identical_distributions() {
        let p = Histogram::new([(1.0, 3), (2.0, 5), (7.0, 1)]);
        let q = Histogram::new([(1.0, 6), (2.0, 10), (7.0, 2)]);
        assert_relative_eq!(kl_divergence(&q, &p), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_terms_sum_to_total() {
        let p = Histogram::new([(1.0, 4), (2.0, 4), (3.0, 2)]);
        let q = Histogram::new([(1.0, 1), (3.0, 2)]);
        let terms = kl_divergence_terms(&q, &p);
        assert_eq!(terms.len(), 2);
        assert_relative_eq!(terms.iter().sum::<f64>(), kl_divergence(&q, &p));
        assert!(kl_divergence(&q, &p) > 0.0);
    }

    #[test]
    fn test_missing_support_is_infinite() {
        let p = Histogram::from_values([1.0]);
        let q = Histogram::from_values([1.0, 2.0]);
        assert_eq!(kl_divergence(&q, &p), f64::INFINITY);
    }

    #[test]
    fn test_empty_q() {
        let p = Histogram::from_values([1.0]);
        assert_eq!(kl_divergence(&Histogram::default(), &p), 0.0);
    }
}

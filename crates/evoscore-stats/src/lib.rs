//! Statistical utilities for the evoscore scorers.
//!
//! This crate provides the small set of distribution statistics the scorers need to
//! compare a predicate-conditioned output distribution against the unconditioned one:
//!
//! - **Descriptive statistics**: Count-weighted mean, variance, standard deviation and skewness
//! - **Histograms**: Count-weighted distributions over distinct observed values
//! - **Divergence**: Kullback-Leibler divergence between two histograms, whole or per value
//! - **Rank statistics**: Standardized Mann-Whitney U with tie correction
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing weighted samples
//! - [`histogram`]: Count-weighted histograms keyed by distinct values
//! - [`divergence`]: Kullback-Leibler divergence between histograms
//! - [`rank`]: Rank-sum statistics comparing two histograms
//!
//! # Examples
//!
//! ## Computing weighted descriptive statistics
//!
//! ```
//! use evoscore_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::weighted([(1.0, 1.0), (3.0, 3.0)]).unwrap();
//! assert_eq!(stats.mean, 2.5);
//! assert_eq!(stats.total_weight, 4.0);
//! ```
//!
//! ## Building a histogram
//!
//! ```
//! use evoscore_stats::histogram::Histogram;
//!
//! let histogram = Histogram::new([(2.0, 1), (1.0, 2), (2.0, 3)]);
//! assert_eq!(histogram.len(), 2);
//! assert_eq!(histogram.count_of(2.0), 4);
//! assert_eq!(histogram.total_count(), 6);
//! ```
//!
//! ## Comparing two distributions
//!
//! ```
//! use evoscore_stats::{divergence, histogram::Histogram, rank};
//!
//! let all = Histogram::from_values([1.0, 2.0, 3.0, 4.0]);
//! let upper = Histogram::from_values([3.0, 4.0]);
//!
//! // Dropping half the support costs ln(2) nats.
//! let kld = divergence::kl_divergence(&upper, &all);
//! assert!((kld - 2.0_f64.ln()).abs() < 1e-12);
//!
//! // The upper half ranks above the whole sample.
//! assert!(rank::standardized_mann_whitney_u(&upper, &all) > 0.0);
//! ```

pub mod descriptive;
pub mod divergence;
pub mod histogram;
pub mod rank;

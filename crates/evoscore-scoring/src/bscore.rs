//! The scorer contract shared by every behavioral scorer.
//!
//! A scorer is built once from an immutable observation table and a fixed configuration,
//! then asked to score many candidates. Scoring a candidate yields a
//! [`PenalizedBScore`]: a behavioral score vector (one component per row, per bucket or
//! per statistic, depending on the scorer) plus one scalar complexity penalty.
//!
//! ```text
//! CTable ──(construction: totals, thresholds, histograms)──▶ scorer
//! candidate ──▶ scorer.score() ──▶ PenalizedBScore ──▶ optimizer
//! ```
//!
//! Components are oriented so that larger is better. The optimizer ranks candidates by
//! [`PenalizedBScore::score`], compares improvements against [`BScore::min_improv`], and
//! stops early once [`BScore::best_possible_bscore`] is reached.

use std::fmt;

use evoscore_table::Expr;
use serde::{Deserialize, Serialize};

use crate::{ScoreError, complexity::ComplexityPenalty};

/// Per-row (or per-statistic) fitness contributions.
pub type BehavioralScore = Vec<f64>;

/// The sentinel for an unbeatable score component.
pub const BEST_SCORE: f64 = f64::MAX;

/// The sentinel for a candidate that must be rejected outright.
pub const WORST_SCORE: f64 = f64::MIN;

/// A behavioral score together with the candidate's complexity penalty.
///
/// The penalty is added once per candidate, never per row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PenalizedBScore {
    pub bscore: BehavioralScore,
    pub complexity_penalty: f64,
}

impl PenalizedBScore {
    #[must_use]
    pub fn new(bscore: BehavioralScore, complexity_penalty: f64) -> Self {
        Self {
            bscore,
            complexity_penalty,
        }
    }

    /// Returns the aggregate fitness: the component sum minus the complexity penalty.
    ///
    /// # Examples
    ///
    /// ```
    /// use evoscore_scoring::PenalizedBScore;
    ///
    /// let pbs = PenalizedBScore::new(vec![-1.0, 0.0, -2.0], 0.5);
    /// assert_eq!(pbs.score(), -3.5);
    /// ```
    #[must_use]
    pub fn score(&self) -> f64 {
        self.bscore.iter().sum::<f64>() - self.complexity_penalty
    }
}

impl fmt::Display for PenalizedBScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, c) in self.bscore.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "] penalty={}", self.complexity_penalty)
    }
}

/// A behavioral scorer.
///
/// Implementations are read-only once configured, so one instance can be shared by many
/// candidate-evaluation workers. The complexity calibration setters are meant to be
/// called once, before scoring starts.
pub trait BScore: fmt::Debug + Send + Sync {
    /// Scores a candidate program.
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError>;

    /// Returns the best behavioral score any candidate could reach (or an estimate of it).
    fn best_possible_bscore(&self) -> BehavioralScore;

    /// Returns the smallest score delta that counts as a real improvement.
    ///
    /// Positive values are absolute; negative values are relative thresholds
    /// (`-0.05` means a 5% improvement).
    fn min_improv(&self) -> f64;

    /// Returns the current complexity calibration.
    fn complexity_penalty(&self) -> ComplexityPenalty;

    /// Replaces the complexity calibration.
    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty);

    /// Calibrates the Occam's razor penalty from an alphabet size and a noise level.
    ///
    /// The default uses the discrete form and disables the penalty outside `(0, 0.5)`.
    fn set_complexity_coef(&mut self, alphabet_size: usize, noise: f64) {
        self.set_complexity_penalty(ComplexityPenalty::discrete(alphabet_size, noise));
    }

    /// Calibrates the Occam's razor penalty from a target complexity ratio.
    fn set_complexity_ratio(&mut self, ratio: f64) {
        self.set_complexity_penalty(ComplexityPenalty::from_ratio(ratio));
    }
}

pub(crate) fn log_candidate(candidate: &Expr, pbs: &PenalizedBScore) {
    tracing::trace!(%candidate, bscore = %pbs, "evaluated candidate");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let pbs = PenalizedBScore::new(vec![1.0, -0.5], 0.25);
        assert_eq!(pbs.to_string(), "[1 -0.5] penalty=0.25");
    }

    #[test]
    fn test_score_with_sentinel_stays_worst() {
        let pbs = PenalizedBScore::new(vec![WORST_SCORE], 0.0);
        assert_eq!(pbs.score(), WORST_SCORE);
    }
}

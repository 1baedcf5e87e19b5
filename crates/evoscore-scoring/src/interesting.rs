//! How much a predicate shifts a contin target's distribution.
//!
//! [`InterestingPredicateBScore`] conditions the target on the rows where a boolean
//! predicate takes the target polarity and compares that conditioned distribution with
//! the unconditioned one. Each enabled signal becomes one weighted component:
//!
//! | Weight            | Component                                                      |
//! |-------------------|----------------------------------------------------------------|
//! | `kld_weight`      | `D(conditioned ‖ unconditioned)`, or its per-value terms       |
//! | `skewness_weight` | conditioned skewness minus unconditioned (optionally absolute) |
//! | `std_u_weight`    | `\|z\|` of the Mann-Whitney U of conditioned vs unconditioned  |
//! | `skew_u_weight`   | `z × skewness difference`: positive when both shift together   |
//!
//! followed by the activation penalty on the fraction of observations selected. A
//! predicate selecting fewer than two distinct target values yields the single component
//! [`WORST_SCORE`], since its statistics are undefined.

use std::sync::Arc;

use evoscore_stats::{
    divergence::{kl_divergence, kl_divergence_terms},
    histogram::Histogram,
    rank::standardized_mann_whitney_u,
};
use evoscore_table::{CTable, Expr, ValueType};
use serde::{Deserialize, Serialize};

use crate::{
    BEST_SCORE, BScore, BScoreConfigError, BehavioralScore, ComplexityPenalty, PenalizedBScore,
    ScoreError, ThresholdPenalty, WORST_SCORE, bscore::log_candidate,
};

const NAME: &str = "interesting predicate scorer";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterestingPredicateParams {
    pub kld_weight: f64,
    pub skewness_weight: f64,
    pub std_u_weight: f64,
    pub skew_u_weight: f64,
    pub min_activation: f64,
    pub max_activation: f64,
    /// Hardness of the activation penalty.
    pub penalty: f64,
    /// Target polarity.
    pub positive: bool,
    pub abs_skewness: bool,
    /// Emit one KL divergence term per conditioned value instead of their sum.
    pub decompose_kld: bool,
}

impl Default for InterestingPredicateParams {
    fn default() -> Self {
        Self {
            kld_weight: 1.0,
            skewness_weight: 1.0,
            std_u_weight: 1.0,
            skew_u_weight: 1.0,
            min_activation: 0.5,
            max_activation: 1.0,
            penalty: 1.0,
            positive: true,
            abs_skewness: false,
            decompose_kld: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InterestingPredicateBScore {
    table: Arc<CTable>,
    params: InterestingPredicateParams,
    activation: ThresholdPenalty,
    distribution: Histogram,
    skewness: f64,
    occam: ComplexityPenalty,
}

impl InterestingPredicateBScore {
    pub fn new(
        table: Arc<CTable>,
        params: &InterestingPredicateParams,
    ) -> Result<Self, BScoreConfigError> {
        if table.output_type() != ValueType::Contin {
            return Err(BScoreConfigError::UnsupportedOutputType {
                scorer: NAME,
                output_type: table.output_type(),
            });
        }
        let activation = ThresholdPenalty::new(
            params.min_activation,
            params.max_activation,
            params.penalty,
        )?;
        let distribution = table
            .iter()
            .flat_map(|row| row.outputs.iter())
            .filter_map(|(v, c)| v.as_contin().map(|v| (v, c)))
            .collect::<Histogram>();
        let skewness = distribution.stats().map_or(0.0, |s| s.skewness);
        tracing::info!(
            distinct_values = distribution.len(),
            skewness,
            "built interesting predicate scorer"
        );

        Ok(Self {
            table,
            params: *params,
            activation,
            distribution,
            skewness,
            occam: ComplexityPenalty::DISABLED,
        })
    }

    /// Returns the unconditioned target distribution.
    #[must_use]
    pub fn distribution(&self) -> &Histogram {
        &self.distribution
    }

    /// Returns the skewness of the unconditioned target distribution.
    #[must_use]
    pub fn skewness(&self) -> f64 {
        self.skewness
    }

    fn divergence_components(&self, conditioned: &Histogram, bscore: &mut BehavioralScore) {
        let p = &self.params;
        if p.kld_weight > 0.0 {
            if p.decompose_kld {
                bscore.extend(
                    kl_divergence_terms(conditioned, &self.distribution)
                        .into_iter()
                        .map(|t| p.kld_weight * t),
                );
            } else {
                let kld = kl_divergence(conditioned, &self.distribution);
                tracing::debug!(kld, "conditioned divergence");
                bscore.push(p.kld_weight * kld);
            }
        }

        if p.skewness_weight <= 0.0 && p.std_u_weight <= 0.0 && p.skew_u_weight <= 0.0 {
            return;
        }

        let mut diff_skewness = 0.0;
        if p.skewness_weight > 0.0 || p.skew_u_weight > 0.0 {
            let pred_skewness = conditioned.stats().map_or(0.0, |s| s.skewness);
            diff_skewness = pred_skewness - self.skewness;
            tracing::debug!(pred_skewness, diff_skewness, "conditioned skewness");
            if p.skewness_weight > 0.0 {
                let val = if p.abs_skewness {
                    diff_skewness.abs()
                } else {
                    diff_skewness
                };
                bscore.push(p.skewness_weight * val);
            }
        }

        let mut std_u = 0.0;
        if p.std_u_weight > 0.0 || p.skew_u_weight > 0.0 {
            std_u = standardized_mann_whitney_u(conditioned, &self.distribution);
            tracing::debug!(std_u, "conditioned rank shift");
            if p.std_u_weight > 0.0 {
                bscore.push(p.std_u_weight * std_u.abs());
            }
        }

        if p.skew_u_weight > 0.0 {
            bscore.push(p.skew_u_weight * std_u * diff_skewness);
        }
    }
}

impl BScore for InterestingPredicateBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let mut actives = 0;
        let mut total = 0;
        let mut selected = vec![];
        for row in self.table.iter() {
            let count = row.outputs.total_count();
            total += count;
            if candidate.eval_bool(&row.inputs)? == self.params.positive {
                actives += count;
                selected.extend(
                    row.outputs
                        .iter()
                        .filter_map(|(v, c)| v.as_contin().map(|v| (v, c))),
                );
            }
        }
        let conditioned = Histogram::new(selected);
        tracing::debug!(
            total,
            actives,
            distinct_values = conditioned.len(),
            "conditioned target"
        );

        let pbs = if conditioned.len() > 1 {
            let mut bscore = vec![];
            self.divergence_components(&conditioned, &mut bscore);

            let activation = actives as f64 / total as f64;
            let activation_penalty = self.activation.penalty(activation);
            tracing::debug!(activation, activation_penalty, "activation");
            bscore.push(activation_penalty);

            PenalizedBScore::new(bscore, self.occam.penalty(candidate.complexity() as f64))
        } else {
            PenalizedBScore::new(vec![WORST_SCORE], 0.0)
        };
        log_candidate(candidate, &pbs);
        Ok(pbs)
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        vec![BEST_SCORE]
    }

    fn min_improv(&self) -> f64 {
        0.0
    }

    fn complexity_penalty(&self) -> ComplexityPenalty {
        self.occam
    }

    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty) {
        self.occam = penalty;
    }

    /// Uses the contin form: `noise` is the standard deviation of the target noise.
    fn set_complexity_coef(&mut self, alphabet_size: usize, noise: f64) {
        self.occam = ComplexityPenalty::contin(alphabet_size, noise);
    }
}

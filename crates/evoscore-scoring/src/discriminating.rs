//! Scorers that maximize one classification rate while holding the other inside a band.
//!
//! [`RecallBScore`] maximizes recall subject to a precision band; [`PrerecBScore`]
//! maximizes precision subject to a recall band. Both produce a two-component score:
//!
//! ```text
//! [maximized rate, hardness × ln(1 - distance of constrained rate to band)]
//! ```
//!
//! Their best-possible estimate is the greedy prefix of rows ranked by per-row
//! contribution to the maximized rate, stopping once the constrained rate reaches the
//! band's minimum.

use std::{fmt, marker::PhantomData, sync::Arc};

use evoscore_table::{CTable, Expr};
use serde::{Deserialize, Serialize};

use crate::{
    BScore, BScoreConfigError, BehavioralScore, ComplexityPenalty, DiscriminationCounts,
    Discriminator, PenalizedBScore, ScoreError, ThresholdPenalty,
    bscore::log_candidate,
    greedy::{Contribution, accumulate_until},
};

/// Construction parameters shared by [`RecallBScore`] and [`PrerecBScore`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Lower bound of the constrained rate.
    pub min_threshold: f64,
    /// Upper bound of the constrained rate.
    pub max_threshold: f64,
    pub hardness: f64,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            min_threshold: 0.5,
            max_threshold: 1.0,
            hardness: 1.0,
        }
    }
}

/// Per-row shares used by the greedy best-possible estimate.
#[derive(Debug, Clone, Copy)]
pub struct RowShare {
    /// Positive mass of the row.
    pub positive: f64,
    /// Observations in the row.
    pub count: f64,
    /// Positive mass of the whole table.
    pub positive_total: f64,
    /// Observations in the whole table.
    pub table_size: f64,
}

impl RowShare {
    fn normalized_positive(&self) -> f64 {
        if self.count > 0.0 && self.positive_total != 0.0 {
            self.positive / (self.count * self.positive_total)
        } else {
            0.0
        }
    }

    fn uniform(&self) -> f64 {
        1.0 / self.table_size
    }
}

/// Which rate a [`DiscriminatingBScore`] maximizes and which one it constrains.
pub trait Objective: fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;
    const MAXIMIZED: &'static str;
    const CONSTRAINED: &'static str;

    /// Returns `(maximized, constrained)`.
    fn split(counts: &DiscriminationCounts) -> (f64, f64);

    /// The row's contribution to the maximized rate.
    fn variable(share: &RowShare) -> f64;

    /// The row's contribution to the constrained rate.
    fn fixed(share: &RowShare) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct MaximizeRecall;

impl Objective for MaximizeRecall {
    const NAME: &'static str = "recall scorer";
    const MAXIMIZED: &'static str = "recall";
    const CONSTRAINED: &'static str = "precision";

    fn split(counts: &DiscriminationCounts) -> (f64, f64) {
        (counts.recall(), counts.precision())
    }

    fn variable(share: &RowShare) -> f64 {
        share.uniform()
    }

    fn fixed(share: &RowShare) -> f64 {
        share.normalized_positive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MaximizePrecision;

impl Objective for MaximizePrecision {
    const NAME: &'static str = "prerec scorer";
    const MAXIMIZED: &'static str = "precision";
    const CONSTRAINED: &'static str = "recall";

    fn split(counts: &DiscriminationCounts) -> (f64, f64) {
        (counts.precision(), counts.recall())
    }

    fn variable(share: &RowShare) -> f64 {
        share.normalized_positive()
    }

    fn fixed(share: &RowShare) -> f64 {
        share.uniform()
    }
}

/// Maximizes recall while keeping precision inside the band.
pub type RecallBScore = DiscriminatingBScore<MaximizeRecall>;

/// Maximizes precision while keeping recall inside the band.
pub type PrerecBScore = DiscriminatingBScore<MaximizePrecision>;

#[derive(Debug, Clone)]
pub struct DiscriminatingBScore<O> {
    discriminator: Discriminator,
    band: ThresholdPenalty,
    table_size: f64,
    occam: ComplexityPenalty,
    _objective: PhantomData<O>,
}

impl<O: Objective> DiscriminatingBScore<O> {
    /// Builds the scorer over a boolean- or contin-output table.
    #[expect(clippy::cast_precision_loss)]
    pub fn new(table: Arc<CTable>, params: &ThresholdParams) -> Result<Self, BScoreConfigError> {
        let band = ThresholdPenalty::new(
            params.min_threshold,
            params.max_threshold,
            params.hardness,
        )?;
        let table_size = table.uncompressed_size() as f64;
        let discriminator = Discriminator::new(O::NAME, table)?;
        tracing::info!(
            scorer = O::NAME,
            positive_total = discriminator.positive_total(),
            negative_total = discriminator.negative_total(),
            min_threshold = band.min(),
            max_threshold = band.max(),
            "built discriminating scorer"
        );
        Ok(Self {
            discriminator,
            band,
            table_size,
            occam: ComplexityPenalty::DISABLED,
            _objective: PhantomData,
        })
    }

    #[must_use]
    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    #[must_use]
    pub fn band(&self) -> &ThresholdPenalty {
        &self.band
    }

    #[expect(clippy::cast_precision_loss)]
    fn contributions(&self) -> Vec<Contribution> {
        self.discriminator
            .table()
            .iter()
            .enumerate()
            .map(|(row, r)| {
                let (positive, _) = self.discriminator.row_masses(&r.outputs);
                let share = RowShare {
                    positive,
                    count: r.outputs.total_count() as f64,
                    positive_total: self.discriminator.positive_total(),
                    table_size: self.table_size,
                };
                let variable = O::variable(&share);
                Contribution {
                    row,
                    rank: variable,
                    variable,
                    fixed: O::fixed(&share),
                }
            })
            .collect()
    }
}

impl<O: Objective> BScore for DiscriminatingBScore<O> {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let counts = self.discriminator.count(candidate)?;
        let (maximized, constrained) = O::split(&counts);
        let penalty = self.band.penalty(constrained);
        tracing::debug!(
            scorer = O::NAME,
            maximized_rate = O::MAXIMIZED,
            maximized,
            constrained_rate = O::CONSTRAINED,
            constrained,
            penalty,
            "scored discriminating candidate"
        );

        let pbs = PenalizedBScore::new(
            vec![maximized, penalty],
            self.occam.penalty(candidate.complexity() as f64),
        );
        log_candidate(candidate, &pbs);
        Ok(pbs)
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        let prefix = accumulate_until(self.contributions(), self.band.min());
        let penalty = self.band.penalty(prefix.fixed_sum);
        tracing::info!(
            scorer = O::NAME,
            score_at_threshold = prefix.variable_sum,
            fixed_at_threshold = prefix.fixed_sum,
            penalty_at_threshold = penalty,
            "estimated best possible score"
        );
        vec![prefix.variable_sum, penalty]
    }

    fn min_improv(&self) -> f64 {
        1.0 / self.table_size
    }

    fn complexity_penalty(&self) -> ComplexityPenalty {
        self.occam
    }

    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty) {
        self.occam = penalty;
    }

    // Both rates are normalized by the table size, so the coefficient is too.
    fn set_complexity_coef(&mut self, alphabet_size: usize, noise: f64) {
        self.occam = ComplexityPenalty::discrete(alphabet_size, noise).scaled(self.table_size);
    }

    fn set_complexity_ratio(&mut self, ratio: f64) {
        self.occam = ComplexityPenalty::from_ratio(ratio).scaled(self.table_size);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use evoscore_table::Value;

    use super::*;

    // x0 x1 -> y
    //  T  T -> T T T
    //  T  F -> T F
    //  F  T -> F
    //  F  F -> F F
    fn table() -> Arc<CTable> {
        let t = Value::from(true);
        let f = Value::from(false);
        let obs = [
            ([true, true], true),
            ([true, true], true),
            ([true, true], true),
            ([true, false], true),
            ([true, false], false),
            ([false, true], false),
            ([false, false], false),
            ([false, false], false),
        ];
        Arc::new(
            CTable::from_observations(
                vec!["x0".to_owned(), "x1".to_owned()],
                obs.into_iter().map(|(inputs, output)| {
                    let inputs = inputs
                        .into_iter()
                        .map(|b| if b { t.clone() } else { f.clone() })
                        .collect();
                    (inputs, Value::from(output))
                }),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_recall_score() {
        let scorer = RecallBScore::new(table(), &ThresholdParams::default()).unwrap();
        // x0 accepts 5 observations, 4 of them positive; all 4 positives are found.
        let pbs = scorer.score(&Expr::Arg(0)).unwrap();
        assert_relative_eq!(pbs.bscore[0], 1.0);
        assert_eq!(pbs.bscore[1], 0.0);
        assert_eq!(pbs.complexity_penalty, 0.0);

        // x0 ∧ x1 is fully precise but only finds 3 of 4 positives.
        let pbs = scorer
            .score(&Expr::And(vec![Expr::Arg(0), Expr::Arg(1)]))
            .unwrap();
        assert_relative_eq!(pbs.bscore[0], 0.75);
        assert_eq!(pbs.bscore[1], 0.0);
    }

    #[test]
    fn test_recall_precision_penalty() {
        let params = ThresholdParams {
            min_threshold: 0.9,
            ..ThresholdParams::default()
        };
        let scorer = RecallBScore::new(table(), &params).unwrap();
        let pbs = scorer.score(&Expr::Arg(0)).unwrap();
        let precision: f64 = 4.0 / 5.0;
        assert_relative_eq!(pbs.bscore[1], (precision / 0.9).ln());
        assert!(pbs.bscore[1] < 0.0);
    }

    #[test]
    fn test_prerec_swaps_roles() {
        let params = ThresholdParams {
            min_threshold: 0.8,
            ..ThresholdParams::default()
        };
        let scorer = PrerecBScore::new(table(), &params).unwrap();
        let pbs = scorer
            .score(&Expr::And(vec![Expr::Arg(0), Expr::Arg(1)]))
            .unwrap();
        assert_relative_eq!(pbs.bscore[0], 1.0);
        assert_relative_eq!(pbs.bscore[1], (0.75_f64 / 0.8).ln());
    }

    #[test]
    fn test_prerec_best_possible() {
        let scorer = PrerecBScore::new(table(), &ThresholdParams::default()).unwrap();
        // Ranked by precision share: TT 0.25, TF 0.125, then FF and FT at 0. Each row
        // adds 1/8 of recall, so the fourth row reaches the 0.5 floor.
        let best = scorer.best_possible_bscore();
        assert_relative_eq!(best[0], 0.375);
        assert_eq!(best[1], 0.0);
        assert_relative_eq!(scorer.min_improv(), 1.0 / 8.0);
    }

    #[test]
    fn test_recall_best_possible() {
        let scorer = RecallBScore::new(table(), &ThresholdParams::default()).unwrap();
        // Every row adds 1/8 of recall, so rows are taken in table order: FF 0, FT 0,
        // TF 0.125, TT 0.25 of precision share. The floor is never reached.
        let best = scorer.best_possible_bscore();
        assert_relative_eq!(best[0], 0.5);
        assert_relative_eq!(best[1], (0.375_f64 / 0.5).ln());
    }

    #[test]
    fn test_mixed_sign_contin_rates_stay_finite_or_infinite() {
        let table = CTable::from_observations(
            vec![],
            [
                (vec![Value::from(true)], Value::from(2.0)),
                (vec![Value::from(false)], Value::from(-1.0)),
            ],
        )
        .unwrap();
        let scorer = PrerecBScore::new(Arc::new(table), &ThresholdParams::default()).unwrap();
        // tp = 2, fn = -1: recall is 2, past the top of the band.
        let pbs = scorer.score(&Expr::Arg(0)).unwrap();
        assert!(pbs.bscore.iter().all(|v| !v.is_nan()), "{pbs}");
        assert_eq!(pbs.bscore[0], 1.0);
        assert_eq!(pbs.bscore[1], f64::NEG_INFINITY);
        assert!(!scorer.best_possible_bscore().iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_precision_floor_never_binds_on_contin() {
        let table = CTable::from_observations(
            vec![],
            [
                (vec![Value::from(true)], Value::from(3.0)),
                (vec![Value::from(true)], Value::from(-2.0)),
                (vec![Value::from(false)], Value::from(1.0)),
            ],
        )
        .unwrap();
        let params = ThresholdParams {
            min_threshold: 0.9,
            ..ThresholdParams::default()
        };
        let scorer = RecallBScore::new(Arc::new(table), &params).unwrap();
        let pbs = scorer.score(&Expr::Arg(0)).unwrap();
        assert_relative_eq!(pbs.bscore[0], 0.5);
        assert_eq!(pbs.bscore[1], 0.0);
    }

    #[test]
    fn test_complexity_is_normalized_by_table_size() {
        let mut scorer = RecallBScore::new(table(), &ThresholdParams::default()).unwrap();
        scorer.set_complexity_ratio(2.0);
        assert_relative_eq!(scorer.complexity_penalty().coef(), 1.0 / 16.0);

        let candidate = Expr::And(vec![Expr::Arg(0), Expr::literal(1, false)]);
        let pbs = scorer.score(&candidate).unwrap();
        assert_relative_eq!(pbs.complexity_penalty, 2.0 / 16.0);

        scorer.set_complexity_coef(2, 0.1);
        let expected = -(2.0_f64.ln()) / (0.1_f64 / 0.9).ln() / 8.0;
        assert_relative_eq!(scorer.complexity_penalty().coef(), expected);
    }

    #[test]
    fn test_rejects_non_boolean_candidate() {
        let scorer = RecallBScore::new(table(), &ThresholdParams::default()).unwrap();
        assert!(matches!(
            scorer.score(&Expr::Contin(1.0)),
            Err(ScoreError::Eval(_))
        ));
    }
}

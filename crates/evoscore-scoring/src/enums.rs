//! Scorers for enum-valued outputs.
//!
//! All four scorers count, per table row, how many observations the candidate gets wrong
//! (`count(candidate output) - total`, so `0` is perfect). They differ in how they treat
//! conditional candidates:
//!
//! - [`EnumTableBScore`]: any candidate, evaluated as a whole.
//! - [`EnumFilterBScore`]: additionally punishes rows where the first predicate fires but
//!   its consequent is not the dominant output of the row.
//! - [`EnumGradedBScore`]: scores each row by the first firing clause, weighting later
//!   clauses geometrically less.
//! - [`EnumEffectiveBScore`]: like graded, but only clauses that actually get something
//!   right advance the weight decay.
//!
//! The graded scorers also grade the complexity penalty with [`graded_complexity`].

use std::sync::Arc;

use evoscore_table::{CTable, Cond, Counter, Expr, Value, ValueType};
use serde::{Deserialize, Serialize};

use crate::{
    BScore, BScoreConfigError, BehavioralScore, ComplexityPenalty, PenalizedBScore, ScoreError,
    bscore::log_candidate,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumFilterParams {
    /// Penalty per observation in rows where the filter fires wrongly.
    pub punish: f64,
}

impl Default for EnumFilterParams {
    fn default() -> Self {
        Self { punish: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingParams {
    /// Geometric weight decay per clause, in `(0, 1)`.
    pub grading: f64,
}

impl Default for GradingParams {
    fn default() -> Self {
        Self { grading: 0.9 }
    }
}

/// Returns the clause-weighted complexity of a conditional.
///
/// Clause `i` (0-based) contributes `grading^i × complexity(predicate_i)`; the `otherwise`
/// branch contributes with the weight of the position after the last clause.
///
/// # Examples
///
/// ```
/// use evoscore_scoring::graded_complexity;
/// use evoscore_table::Expr;
///
/// let Expr::Cond(cond) = Expr::cond(
///     [
///         (Expr::And(vec![Expr::Arg(0), Expr::Arg(1)]), Expr::enum_constant("a")),
///         (Expr::Arg(2), Expr::enum_constant("b")),
///     ],
///     Expr::enum_constant("c"),
/// ) else {
///     unreachable!()
/// };
/// assert!((graded_complexity(&cond, 0.5) - (2.0 + 0.5 + 0.25)).abs() < 1e-12);
/// ```
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn graded_complexity(cond: &Cond, grading: f64) -> f64 {
    let mut weight = 1.0;
    let mut complexity = 0.0;
    for clause in &cond.clauses {
        complexity += weight * clause.predicate.complexity() as f64;
        weight *= grading;
    }
    complexity + weight * cond.otherwise.complexity() as f64
}

fn check_enum_output(scorer: &'static str, table: &CTable) -> Result<(), BScoreConfigError> {
    match table.output_type() {
        ValueType::Enum => Ok(()),
        output_type => Err(BScoreConfigError::UnsupportedOutputType {
            scorer,
            output_type,
        }),
    }
}

fn check_grading(grading: f64) -> Result<(), BScoreConfigError> {
    if grading > 0.0 && grading < 1.0 {
        Ok(())
    } else {
        Err(BScoreConfigError::InvalidGrading { grading })
    }
}

/// `count(value) - total`: minus the number of observations `value` gets wrong.
#[expect(clippy::cast_precision_loss)]
fn row_error(outputs: &Counter, value: &Value) -> f64 {
    outputs.get(value) as f64 - outputs.total_count() as f64
}

fn as_cond<'a>(scorer: &'static str, candidate: &'a Expr) -> Result<&'a Cond, ScoreError> {
    match candidate {
        Expr::Cond(cond) => Ok(cond),
        _ => Err(ScoreError::UnexpectedCandidate {
            scorer,
            candidate: candidate.to_string(),
        }),
    }
}

/// Counts wrong observations per row.
#[derive(Debug, Clone)]
pub struct EnumTableBScore {
    table: Arc<CTable>,
    occam: ComplexityPenalty,
}

impl EnumTableBScore {
    const NAME: &str = "enum table scorer";

    pub fn new(table: Arc<CTable>) -> Result<Self, BScoreConfigError> {
        Self::with_name(Self::NAME, table)
    }

    fn with_name(scorer: &'static str, table: Arc<CTable>) -> Result<Self, BScoreConfigError> {
        check_enum_output(scorer, &table)?;
        tracing::info!(scorer, rows = table.len(), "built enum scorer");
        Ok(Self {
            table,
            occam: ComplexityPenalty::DISABLED,
        })
    }

    fn bscore(&self, candidate: &Expr) -> Result<BehavioralScore, ScoreError> {
        self.table
            .iter()
            .map(|row| -> Result<f64, ScoreError> {
                Ok(row_error(&row.outputs, &candidate.eval(&row.inputs)?))
            })
            .collect()
    }

    fn penalize(
        &self,
        candidate: &Expr,
        bscore: BehavioralScore,
        complexity: f64,
    ) -> PenalizedBScore {
        let pbs = PenalizedBScore::new(bscore, self.occam.penalty(complexity));
        log_candidate(candidate, &pbs);
        pbs
    }
}

impl BScore for EnumTableBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let bscore = self.bscore(candidate)?;
        Ok(self.penalize(candidate, bscore, candidate.complexity() as f64))
    }

    /// Per row, `max_count - total`: a deterministic candidate can at best match the
    /// most frequent output.
    #[expect(clippy::cast_precision_loss)]
    fn best_possible_bscore(&self) -> BehavioralScore {
        self.table
            .iter()
            .map(|row| row.outputs.max_count() as f64 - row.outputs.total_count() as f64)
            .collect()
    }

    fn min_improv(&self) -> f64 {
        0.5
    }

    fn complexity_penalty(&self) -> ComplexityPenalty {
        self.occam
    }

    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty) {
        self.occam = penalty;
    }
}

/// Punishes a single-clause filter whose predicate fires on rows it gets wrong.
///
/// The candidate is either a bare enum constant, scored as [`EnumTableBScore`] does, or a
/// conditional whose first clause is the filter. On every row where the filter's
/// predicate holds and its consequent is not a most frequent output of the row,
/// `punish × total` is subtracted on top of the table error.
#[derive(Debug, Clone)]
pub struct EnumFilterBScore {
    base: EnumTableBScore,
    punish: f64,
}

impl EnumFilterBScore {
    const NAME: &str = "enum filter scorer";

    pub fn new(table: Arc<CTable>, params: &EnumFilterParams) -> Result<Self, BScoreConfigError> {
        if params.punish.is_nan() || params.punish <= 0.0 {
            return Err(BScoreConfigError::NonPositiveHardness {
                hardness: params.punish,
            });
        }
        Ok(Self {
            base: EnumTableBScore::with_name(Self::NAME, table)?,
            punish: params.punish,
        })
    }
}

impl BScore for EnumFilterBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        if candidate.as_enum_constant().is_some() {
            return self.base.score(candidate);
        }
        let cond = as_cond(Self::NAME, candidate)?;
        let filter = cond.clauses.first().ok_or_else(|| ScoreError::UnexpectedCandidate {
            scorer: Self::NAME,
            candidate: candidate.to_string(),
        })?;

        let mut bscore = Vec::with_capacity(self.base.table.len());
        for row in self.base.table.iter() {
            let total = row.outputs.total_count();
            let mut sc = row_error(&row.outputs, &cond.eval(&row.inputs)?);
            if filter.predicate.eval_bool(&row.inputs)? {
                let consequent = filter.consequent.eval(&row.inputs)?;
                if row.outputs.get(&consequent) < row.outputs.max_count() {
                    sc -= self.punish * total as f64;
                }
            }
            bscore.push(sc);
        }
        Ok(self
            .base
            .penalize(candidate, bscore, candidate.complexity() as f64))
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        self.base.best_possible_bscore()
    }

    fn min_improv(&self) -> f64 {
        self.base.min_improv()
    }

    fn complexity_penalty(&self) -> ComplexityPenalty {
        self.base.occam
    }

    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty) {
        self.base.occam = penalty;
    }
}

/// Scores each row by the first clause whose predicate holds, weighted by the clause's
/// position: clause `i` counts `grading^i` as much as the head clause.
#[derive(Debug, Clone)]
pub struct EnumGradedBScore {
    base: EnumTableBScore,
    grading: f64,
}

impl EnumGradedBScore {
    const NAME: &str = "enum graded scorer";

    pub fn new(table: Arc<CTable>, params: &GradingParams) -> Result<Self, BScoreConfigError> {
        check_grading(params.grading)?;
        Ok(Self {
            base: EnumTableBScore::with_name(Self::NAME, table)?,
            grading: params.grading,
        })
    }

    #[must_use]
    pub fn grading(&self) -> f64 {
        self.grading
    }
}

impl BScore for EnumGradedBScore {
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        if candidate.as_enum_constant().is_some() {
            return self.base.score(candidate);
        }
        let cond = as_cond(Self::NAME, candidate)?;

        let mut bscore = Vec::with_capacity(self.base.table.len());
        for row in self.base.table.iter() {
            let mut weight = 1.0;
            let mut consequent = &*cond.otherwise;
            for clause in &cond.clauses {
                if clause.predicate.eval_bool(&row.inputs)? {
                    consequent = &clause.consequent;
                    break;
                }
                weight *= self.grading;
            }
            let value = consequent.eval(&row.inputs)?;
            bscore.push(weight * row_error(&row.outputs, &value));
        }
        Ok(self
            .base
            .penalize(candidate, bscore, graded_complexity(cond, self.grading)))
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        self.base.best_possible_bscore()
    }

    /// Relative: grading wrecks any sense of an absolute improvement.
    fn min_improv(&self) -> f64 {
        -0.05
    }

    fn complexity_penalty(&self) -> ComplexityPenalty {
        self.base.occam
    }

    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty) {
        self.base.occam = penalty;
    }
}

/// Like [`EnumGradedBScore`], but clause by clause over the rows not yet resolved.
///
/// A clause is *effective* when it fires on some unresolved row and its consequent is
/// observed there at least once. Only effective clauses decay the weight, so clauses that
/// never fire do not dilute the clauses after them.
#[derive(Debug, Clone)]
pub struct EnumEffectiveBScore {
    base: EnumTableBScore,
    grading: f64,
}

impl EnumEffectiveBScore {
    const NAME: &str = "enum effective scorer";

    pub fn new(table: Arc<CTable>, params: &GradingParams) -> Result<Self, BScoreConfigError> {
        check_grading(params.grading)?;
        Ok(Self {
            base: EnumTableBScore::with_name(Self::NAME, table)?,
            grading: params.grading,
        })
    }
}

impl BScore for EnumEffectiveBScore {
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        // A bare constant is charged no complexity penalty.
        if candidate.as_enum_constant().is_some() {
            let pbs = PenalizedBScore::new(self.base.bscore(candidate)?, 0.0);
            log_candidate(candidate, &pbs);
            return Ok(pbs);
        }
        let cond = as_cond(Self::NAME, candidate)?;
        let rows = self.base.table.rows();

        let mut bscore = vec![0.0; rows.len()];
        let mut done = vec![false; rows.len()];
        let mut weight = 1.0;
        for (position, clause) in cond.clauses.iter().enumerate() {
            let mut effective = false;
            for ((row, sc), done) in rows.iter().zip(&mut bscore).zip(&mut done) {
                if *done || !clause.predicate.eval_bool(&row.inputs)? {
                    continue;
                }
                let value = clause.consequent.eval(&row.inputs)?;
                if row.outputs.get(&value) != 0 {
                    effective = true;
                }
                *sc += weight * row_error(&row.outputs, &value);
                *done = true;
            }
            tracing::trace!(position, effective, weight, "enum clause pass");
            if effective {
                weight *= self.grading;
            }
        }
        for ((row, sc), _) in rows
            .iter()
            .zip(&mut bscore)
            .zip(&done)
            .filter(|(_, done)| !**done)
        {
            let value = cond.otherwise.eval(&row.inputs)?;
            *sc += weight * row_error(&row.outputs, &value);
        }

        Ok(self
            .base
            .penalize(candidate, bscore, graded_complexity(cond, self.grading)))
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        self.base.best_possible_bscore()
    }

    fn min_improv(&self) -> f64 {
        -0.05
    }

    fn complexity_penalty(&self) -> ComplexityPenalty {
        self.base.occam
    }

    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty) {
        self.base.occam = penalty;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn table(rows: &[([bool; 2], &str)]) -> Arc<CTable> {
        Arc::new(
            CTable::from_observations(
                vec!["a".to_owned(), "b".to_owned()],
                rows.iter().map(|(inputs, output)| {
                    (
                        inputs.iter().copied().map(Value::from).collect(),
                        Value::from(*output),
                    )
                }),
            )
            .unwrap(),
        )
    }

    // Rows in table order (inputs sorted, false < true):
    //   (F,F) -> z
    //   (F,T) -> y y
    //   (T,F) -> x x x, y
    //   (T,T) -> x
    fn sample() -> Arc<CTable> {
        table(&[
            ([true, false], "x"),
            ([true, false], "x"),
            ([true, false], "x"),
            ([true, false], "y"),
            ([true, true], "x"),
            ([false, true], "y"),
            ([false, true], "y"),
            ([false, false], "z"),
        ])
    }

    fn enum_(name: &str) -> Expr {
        Expr::enum_constant(name)
    }

    #[test]
    fn test_table_scores_constant() {
        let scorer = EnumTableBScore::new(sample()).unwrap();
        let pbs = scorer.score(&enum_("x")).unwrap();
        assert_eq!(pbs.bscore, [-1.0, -2.0, -1.0, 0.0]);
        assert_eq!(scorer.min_improv(), 0.5);
    }

    #[test]
    fn test_table_best_possible() {
        let scorer = EnumTableBScore::new(sample()).unwrap();
        let best = scorer.best_possible_bscore();
        // Zero exactly where one output accounts for the whole row.
        assert_eq!(best, [0.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_table_rejects_other_outputs() {
        let table = CTable::from_observations(
            vec![],
            [(vec![Value::from(true)], Value::from(true))],
        )
        .unwrap();
        assert!(matches!(
            EnumTableBScore::new(Arc::new(table)),
            Err(BScoreConfigError::UnsupportedOutputType {
                output_type: ValueType::Boolean,
                ..
            })
        ));
    }

    #[test]
    fn test_filter_punishes_wrong_firing() {
        let scorer = EnumFilterBScore::new(sample(), &EnumFilterParams { punish: 2.0 }).unwrap();
        // "if b then y else x": fires on (F,T), right, and on (T,T), wrong.
        let candidate = Expr::cond([(Expr::Arg(1), enum_("y"))], enum_("x"));
        let pbs = scorer.score(&candidate).unwrap();
        assert_eq!(pbs.bscore, [-1.0, 0.0, -1.0, -1.0 - 2.0]);

        let pbs = scorer.score(&enum_("z")).unwrap();
        assert_eq!(pbs.bscore, [0.0, -2.0, -4.0, -1.0]);
    }

    #[test]
    fn test_filter_spares_tied_dominant_output() {
        // (F,F) -> x; (T,F) -> x, y tied.
        let tied = table(&[
            ([true, false], "x"),
            ([true, false], "y"),
            ([false, false], "x"),
        ]);
        let scorer = EnumFilterBScore::new(tied, &EnumFilterParams::default()).unwrap();
        let candidate = Expr::cond([(Expr::Arg(0), enum_("y"))], enum_("x"));
        let pbs = scorer.score(&candidate).unwrap();
        assert_eq!(pbs.bscore, [0.0, -1.0]);

        // A consequent never observed on the row is punished.
        let candidate = Expr::cond([(Expr::Arg(0), enum_("z"))], enum_("x"));
        let pbs = scorer.score(&candidate).unwrap();
        assert_eq!(pbs.bscore, [0.0, -2.0 - 2.0]);
    }

    #[test]
    fn test_filter_rejects_other_shapes() {
        let scorer = EnumFilterBScore::new(sample(), &EnumFilterParams::default()).unwrap();
        assert!(matches!(
            scorer.score(&Expr::Arg(0)),
            Err(ScoreError::UnexpectedCandidate { .. })
        ));
        assert!(matches!(
            scorer.score(&Expr::cond(Vec::new(), enum_("x"))),
            Err(ScoreError::UnexpectedCandidate { .. })
        ));
    }

    #[test]
    fn test_graded_weights_later_clauses_less() {
        let scorer = EnumGradedBScore::new(sample(), &GradingParams { grading: 0.5 }).unwrap();
        // if a then x elif b then y else z
        let candidate = Expr::cond(
            [(Expr::Arg(0), enum_("x")), (Expr::Arg(1), enum_("y"))],
            enum_("z"),
        );
        let pbs = scorer.score(&candidate).unwrap();
        // (F,F): else, weight 0.25, right.  (F,T): clause 2, weight 0.5, right.
        // (T,F): clause 1, one wrong.       (T,T): clause 1, right.
        assert_eq!(pbs.bscore, [0.0, 0.0, -1.0, 0.0]);

        // if b then x elif a then x else y
        let candidate = Expr::cond(
            [(Expr::Arg(1), enum_("x")), (Expr::Arg(0), enum_("x"))],
            enum_("y"),
        );
        let pbs = scorer.score(&candidate).unwrap();
        assert_eq!(pbs.bscore, [-0.25, -2.0, -0.5, 0.0]);
        assert_eq!(scorer.min_improv(), -0.05);
    }

    #[test]
    fn test_graded_complexity_penalty() {
        let mut scorer =
            EnumGradedBScore::new(sample(), &GradingParams { grading: 0.5 }).unwrap();
        scorer.set_complexity_ratio(1.0);
        let candidate = Expr::cond(
            [
                (Expr::And(vec![Expr::Arg(0), Expr::Arg(1)]), enum_("x")),
                (Expr::Arg(1), enum_("y")),
            ],
            enum_("z"),
        );
        let pbs = scorer.score(&candidate).unwrap();
        assert_relative_eq!(pbs.complexity_penalty, 2.0 + 0.5 + 0.25);
    }

    #[test]
    fn test_graded_rejects_invalid_grading() {
        for grading in [0.0, 1.0, 1.5, -0.1] {
            assert!(matches!(
                EnumGradedBScore::new(sample(), &GradingParams { grading }),
                Err(BScoreConfigError::InvalidGrading { .. })
            ));
        }
    }

    #[test]
    fn test_effective_skips_decay_for_ineffective_clauses() {
        let graded = EnumGradedBScore::new(sample(), &GradingParams { grading: 0.5 }).unwrap();
        let effective =
            EnumEffectiveBScore::new(sample(), &GradingParams { grading: 0.5 }).unwrap();
        // The first clause never fires, so the effective scorer does not decay after it.
        let candidate = Expr::cond(
            [
                (Expr::And(vec![Expr::literal(0, false), Expr::Arg(0)]), enum_("x")),
                (Expr::Arg(0), enum_("y")),
            ],
            enum_("z"),
        );
        let g = graded.score(&candidate).unwrap();
        let e = effective.score(&candidate).unwrap();
        // (F,F) -> z right; (F,T) -> z wrong twice; (T,F) -> y wrong 3 times; (T,T) -> y wrong.
        assert_eq!(g.bscore, [0.0, -2.0 * 0.25, -3.0 * 0.5, -0.5]);
        assert_eq!(e.bscore, [0.0, -2.0 * 0.5, -3.0, -1.0]);
    }

    #[test]
    fn test_effective_charges_no_penalty_for_constants() {
        let mut effective =
            EnumEffectiveBScore::new(sample(), &GradingParams::default()).unwrap();
        effective.set_complexity_ratio(1.0);
        let pbs = effective.score(&enum_("x")).unwrap();
        assert_eq!(pbs.bscore, [-1.0, -2.0, -1.0, 0.0]);
        assert_eq!(pbs.complexity_penalty, 0.0);

        let mut graded = EnumGradedBScore::new(sample(), &GradingParams::default()).unwrap();
        graded.set_complexity_ratio(1.0);
        assert_relative_eq!(graded.score(&enum_("x")).unwrap().complexity_penalty, 1.0);
    }

    #[test]
    fn test_effective_matches_table_for_constants() {
        let table = EnumTableBScore::new(sample()).unwrap();
        let effective = EnumEffectiveBScore::new(sample(), &GradingParams::default()).unwrap();
        assert_eq!(
            table.score(&enum_("y")).unwrap(),
            effective.score(&enum_("y")).unwrap()
        );
    }
}

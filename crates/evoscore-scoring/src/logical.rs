//! Boolean-output scorers.
//!
//! [`LogicalBScore`] compares a candidate against a complete truth table, one component
//! per assignment of the inputs. [`CTruthTableBScore`] does the same against a compressed
//! table of boolean observations, where one row may hold both outputs.

use std::sync::Arc;

use evoscore_table::{CTable, Expr, Value, ValueType};

use crate::{
    BScore, BScoreConfigError, BehavioralScore, ComplexityPenalty, PenalizedBScore, ScoreError,
    bscore::log_candidate,
};

/// Returns the inputs of row `row` of a complete truth table of `arity` inputs.
///
/// Input `j` is bit `j` of the row index.
///
/// # Examples
///
/// ```
/// use evoscore_scoring::truth_table_inputs;
/// use evoscore_table::Value;
///
/// assert_eq!(
///     truth_table_inputs(3, 0b110),
///     [Value::from(false), Value::from(true), Value::from(true)]
/// );
/// ```
#[must_use]
pub fn truth_table_inputs(arity: usize, row: usize) -> Vec<Value> {
    (0..arity).map(|j| Value::Bool((row >> j) & 1 == 1)).collect()
}

fn truth_table_size(arity: usize) -> Option<usize> {
    u32::try_from(arity).ok().and_then(|a| 1_usize.checked_shl(a))
}

/// Scores a candidate against a complete truth table: `-1` per mismatching row.
#[derive(Debug, Clone)]
pub struct LogicalBScore {
    arity: usize,
    target: Vec<bool>,
    occam: ComplexityPenalty,
}

impl LogicalBScore {
    /// Builds the scorer from the target outputs, one per row in truth table order.
    pub fn new(arity: usize, target: Vec<bool>) -> Result<Self, BScoreConfigError> {
        let expected = truth_table_size(arity).unwrap_or(usize::MAX);
        if target.len() != expected {
            return Err(BScoreConfigError::TruthTableSize {
                arity,
                expected,
                found: target.len(),
            });
        }
        tracing::info!(arity, rows = target.len(), "built logical scorer");
        Ok(Self {
            arity,
            target,
            occam: ComplexityPenalty::DISABLED,
        })
    }

    /// Builds the scorer from the truth table of a target program.
    pub fn from_program(arity: usize, program: &Expr) -> Result<Self, LogicalTargetError> {
        let rows = truth_table_size(arity).ok_or(LogicalTargetError::Config(
            BScoreConfigError::TruthTableSize {
                arity,
                expected: usize::MAX,
                found: 0,
            },
        ))?;
        let target = (0..rows)
            .map(|row| program.eval_bool(&truth_table_inputs(arity, row)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(LogicalTargetError::Eval)?;
        Self::new(arity, target).map_err(LogicalTargetError::Config)
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[must_use]
    pub fn target(&self) -> &[bool] {
        &self.target
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LogicalTargetError {
    #[display("invalid truth table: {_0}")]
    Config(BScoreConfigError),
    #[display("failed to evaluate target program: {_0}")]
    Eval(evoscore_table::EvalError),
}

impl BScore for LogicalBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let bscore = self
            .target
            .iter()
            .enumerate()
            .map(|(row, &expected)| -> Result<f64, ScoreError> {
                let actual = candidate.eval_bool(&truth_table_inputs(self.arity, row))?;
                Ok(if actual == expected { 0.0 } else { -1.0 })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let pbs = PenalizedBScore::new(bscore, self.occam.penalty(candidate.complexity() as f64));
        log_candidate(candidate, &pbs);
        Ok(pbs)
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        vec![0.0; self.target.len()]
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

/// Scores a candidate against a compressed boolean table: per row, minus the number of
/// observations opposite to the candidate's output.
#[derive(Debug, Clone)]
pub struct CTruthTableBScore {
    table: Arc<CTable>,
    occam: ComplexityPenalty,
}

impl CTruthTableBScore {
    const NAME: &str = "compressed truth table scorer";

    pub fn new(table: Arc<CTable>) -> Result<Self, BScoreConfigError> {
        if table.output_type() != ValueType::Boolean {
            return Err(BScoreConfigError::UnsupportedOutputType {
                scorer: Self::NAME,
                output_type: table.output_type(),
            });
        }
        tracing::info!(rows = table.len(), "built compressed truth table scorer");
        Ok(Self {
            table,
            occam: ComplexityPenalty::DISABLED,
        })
    }
}

impl BScore for CTruthTableBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let bscore = self
            .table
            .iter()
            .map(|row| -> Result<f64, ScoreError> {
                let output = candidate.eval_bool(&row.inputs)?;
                Ok(-(row.outputs.get(&Value::Bool(!output)) as f64))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let pbs = PenalizedBScore::new(bscore, self.occam.penalty(candidate.complexity() as f64));
        log_candidate(candidate, &pbs);
        Ok(pbs)
    }

    /// Per row, the minority output cannot be satisfied.
    #[expect(clippy::cast_precision_loss)]
    fn best_possible_bscore(&self) -> BehavioralScore {
        self.table
            .iter()
            .map(|row| {
                let t = row.outputs.get(&Value::Bool(true));
                let f = row.outputs.get(&Value::Bool(false));
                -(t.min(f) as f64)
            })
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

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn xor() -> Expr {
        Expr::Or(vec![
            Expr::And(vec![Expr::literal(0, true), Expr::literal(1, false)]),
            Expr::And(vec![Expr::literal(0, false), Expr::literal(1, true)]),
        ])
    }

    #[test]
    fn test_logical_from_program() {
        let scorer = LogicalBScore::from_program(2, &xor()).unwrap();
        assert_eq!(scorer.target(), [false, true, true, false]);

        let pbs = scorer.score(&xor()).unwrap();
        assert_eq!(pbs.bscore, [0.0; 4]);
        let pbs = scorer.score(&Expr::Or(vec![Expr::Arg(0), Expr::Arg(1)])).unwrap();
        assert_eq!(pbs.bscore, [0.0, 0.0, 0.0, -1.0]);
        assert_eq!(scorer.best_possible_bscore(), [0.0; 4]);
    }

    #[test]
    fn test_logical_complexity() {
        let mut scorer = LogicalBScore::from_program(2, &xor()).unwrap();
        scorer.set_complexity_coef(2, 0.25);
        let pbs = scorer.score(&xor()).unwrap();
        assert_relative_eq!(pbs.complexity_penalty, 4.0 * 2.0_f64.ln() / 3.0_f64.ln());
    }

    #[test]
    fn test_logical_rejects_wrong_size() {
        assert!(matches!(
            LogicalBScore::new(2, vec![true; 3]),
            Err(BScoreConfigError::TruthTableSize {
                expected: 4,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_ctruth_table() {
        let t = Value::from(true);
        let f = Value::from(false);
        let table = CTable::from_observations(
            vec![],
            [
                (vec![t.clone()], t.clone()),
                (vec![t.clone()], t.clone()),
                (vec![t.clone()], f.clone()),
                (vec![f.clone()], f.clone()),
            ],
        )
        .unwrap();
        let scorer = CTruthTableBScore::new(Arc::new(table)).unwrap();
        // Rows: (F) -> F, (T) -> T T F.
        assert_eq!(scorer.best_possible_bscore(), [0.0, -1.0]);
        assert_eq!(scorer.score(&Expr::Arg(0)).unwrap().bscore, [0.0, -1.0]);
        assert_eq!(scorer.score(&Expr::Bool(false)).unwrap().bscore, [0.0, -2.0]);
        assert_eq!(scorer.min_improv(), 0.5);
    }
}

use std::sync::Arc;

use evoscore_table::{CTable, Expr, ValueType};

use crate::{
    BScore, BScoreConfigError, BehavioralScore, ComplexityPenalty, PenalizedBScore, ScoreError,
    bscore::log_candidate,
};

/// Least-squares regression scorer: per row, `-Σ count × (output - observed)²`.
#[derive(Debug, Clone)]
pub struct ContinBScore {
    table: Arc<CTable>,
    occam: ComplexityPenalty,
}

impl ContinBScore {
    const NAME: &str = "contin scorer";

    pub fn new(table: Arc<CTable>) -> Result<Self, BScoreConfigError> {
        if table.output_type() != ValueType::Contin {
            return Err(BScoreConfigError::UnsupportedOutputType {
                scorer: Self::NAME,
                output_type: table.output_type(),
            });
        }
        tracing::info!(rows = table.len(), "built contin scorer");
        Ok(Self {
            table,
            occam: ComplexityPenalty::DISABLED,
        })
    }
}

impl BScore for ContinBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let bscore = self
            .table
            .iter()
            .map(|row| -> Result<f64, ScoreError> {
                let output = candidate.eval_contin(&row.inputs)?;
                Ok(-row
                    .outputs
                    .iter()
                    .filter_map(|(v, c)| v.as_contin().map(|v| c as f64 * (output - v).powi(2)))
                    .sum::<f64>())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let pbs = PenalizedBScore::new(bscore, self.occam.penalty(candidate.complexity() as f64));
        log_candidate(candidate, &pbs);
        Ok(pbs)
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        vec![0.0; self.table.len()]
    }

    /// Relative, so the search stops tweaking past the fourth decimal place.
    fn min_improv(&self) -> f64 {
        -1e-4
    }

    fn complexity_penalty(&self) -> ComplexityPenalty {
        self.occam
    }

    fn set_complexity_penalty(&mut self, penalty: ComplexityPenalty) {
        self.occam = penalty;
    }

    /// Uses the contin form: `noise` is the standard deviation of the output noise.
    fn set_complexity_coef(&mut self, alphabet_size: usize, noise: f64) {
        self.occam = ComplexityPenalty::contin(alphabet_size, noise);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use evoscore_table::Value;

    use super::*;

    fn table() -> Arc<CTable> {
        Arc::new(
            CTable::from_observations(
                vec!["x".to_owned()],
                [(0.0, 1.0), (1.0, 3.0), (1.0, 2.0), (2.0, 5.0)]
                    .into_iter()
                    .map(|(x, y)| (vec![Value::from(x)], Value::from(y))),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_squared_error() {
        let scorer = ContinBScore::new(table()).unwrap();
        // 2x + 1
        let candidate = Expr::Plus(vec![
            Expr::Times(vec![Expr::Contin(2.0), Expr::Arg(0)]),
            Expr::Contin(1.0),
        ]);
        let pbs = scorer.score(&candidate).unwrap();
        assert_eq!(pbs.bscore, [0.0, -1.0, 0.0]);
        assert_eq!(scorer.best_possible_bscore(), [0.0; 3]);
        assert_eq!(scorer.min_improv(), -1e-4);
    }

    #[test]
    fn test_contin_calibration() {
        let mut scorer = ContinBScore::new(table()).unwrap();
        scorer.set_complexity_coef(4, 0.5);
        let pbs = scorer.score(&Expr::Arg(0)).unwrap();
        assert_relative_eq!(pbs.complexity_penalty, 4.0_f64.ln() * 0.5);
    }

    #[test]
    fn test_rejects_boolean_candidate() {
        let scorer = ContinBScore::new(table()).unwrap();
        assert!(matches!(
            scorer.score(&Expr::Bool(true)),
            Err(ScoreError::Eval(_))
        ));
    }
}

use std::sync::Arc;

use evoscore_table::{CTable, Expr, ValueType};
use serde::{Deserialize, Serialize};

use crate::{
    BScore, BScoreConfigError, BehavioralScore, ComplexityPenalty, PenalizedBScore, ScoreError,
    bscore::log_candidate,
};

const NAME: &str = "discretized contin scorer";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretizeParams {
    /// Class boundaries; sorted at construction.
    pub thresholds: Vec<f64>,
    /// Weight each class inversely to its frequency in the target.
    pub weighted_accuracy: bool,
}

/// Scores a contin-valued candidate by the class bucket its output falls in.
///
/// `k` sorted thresholds split the real line into `k + 1` classes; class `i` holds values
/// in `[thresholds[i - 1], thresholds[i])`. Each observation whose class differs from the
/// class of the candidate's output on that row costs the weight of the observation's
/// class, so one component per row is `-Σ count × weight` over mismatching outputs.
#[derive(Debug, Clone)]
pub struct DiscretizeContinBScore {
    table: Arc<CTable>,
    thresholds: Vec<f64>,
    /// Per row, `(class, count)` of every observed output.
    classes: Vec<Vec<(usize, u64)>>,
    weights: Vec<f64>,
    occam: ComplexityPenalty,
}

impl DiscretizeContinBScore {
    #[expect(clippy::cast_precision_loss)]
    pub fn new(table: Arc<CTable>, params: &DiscretizeParams) -> Result<Self, BScoreConfigError> {
        if table.output_type() != ValueType::Contin {
            return Err(BScoreConfigError::UnsupportedOutputType {
                scorer: NAME,
                output_type: table.output_type(),
            });
        }
        if params.thresholds.is_empty() || params.thresholds.iter().any(|t| !t.is_finite()) {
            return Err(BScoreConfigError::InvalidDiscretization);
        }
        let mut thresholds = params.thresholds.clone();
        thresholds.sort_by(f64::total_cmp);

        let classes = table
            .iter()
            .map(|row| {
                row.outputs
                    .iter()
                    .filter_map(|(v, c)| v.as_contin().map(|v| (class_idx(&thresholds, v), c)))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let class_count = thresholds.len() + 1;
        let mut weights = vec![1.0; class_count];
        if params.weighted_accuracy {
            let mut frequencies = vec![0_u64; class_count];
            for &(class, count) in classes.iter().flatten() {
                frequencies[class] += count;
            }
            let n = table.uncompressed_size() as f64;
            for (weight, &freq) in weights.iter_mut().zip(&frequencies) {
                if freq > 0 {
                    *weight = n / (class_count as f64 * freq as f64);
                }
            }
        }
        tracing::info!(
            thresholds = ?thresholds,
            weights = ?weights,
            "built discretized contin scorer"
        );

        Ok(Self {
            table,
            thresholds,
            classes,
            weights,
            occam: ComplexityPenalty::DISABLED,
        })
    }

    #[must_use]
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the class bucket of `value`.
    ///
    /// A value equal to a threshold belongs to the upper bucket.
    #[must_use]
    pub fn class_idx(&self, value: f64) -> usize {
        class_idx(&self.thresholds, value)
    }
}

fn class_idx(sorted_thresholds: &[f64], value: f64) -> usize {
    sorted_thresholds.partition_point(|&t| t <= value)
}

impl BScore for DiscretizeContinBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let bscore = self
            .table
            .iter()
            .zip(&self.classes)
            .map(|(row, classes)| -> Result<f64, ScoreError> {
                let predicted = self.class_idx(candidate.eval_contin(&row.inputs)?);
                Ok(-classes
                    .iter()
                    .filter(|(class, _)| *class != predicted)
                    .map(|&(class, count)| count as f64 * self.weights[class])
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

    fn min_improv(&self) -> f64 {
        0.0
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
    use evoscore_table::Value;
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn table(rows: &[(f64, f64)]) -> Arc<CTable> {
        Arc::new(
            CTable::from_observations(
                vec!["x".to_owned()],
                rows.iter()
                    .map(|&(x, y)| (vec![Value::from(x)], Value::from(y))),
            )
            .unwrap(),
        )
    }

    fn scorer(thresholds: &[f64], weighted_accuracy: bool) -> DiscretizeContinBScore {
        let params = DiscretizeParams {
            thresholds: thresholds.to_vec(),
            weighted_accuracy,
        };
        DiscretizeContinBScore::new(table(&[(0.0, 0.0)]), &params).unwrap()
    }

    fn linear_scan(sorted: &[f64], value: f64) -> usize {
        let mut idx = 0;
        for &t in sorted {
            if value >= t {
                idx += 1;
            }
        }
        idx
    }

    #[test]
    fn test_class_idx_boundaries() {
        let scorer = scorer(&[3.0, 1.0, 2.0], false);
        assert_eq!(scorer.thresholds(), [1.0, 2.0, 3.0]);
        assert_eq!(scorer.class_idx(0.5), 0);
        assert_eq!(scorer.class_idx(1.0), 1);
        assert_eq!(scorer.class_idx(1.5), 1);
        assert_eq!(scorer.class_idx(2.0), 2);
        assert_eq!(scorer.class_idx(3.0), 3);
        assert_eq!(scorer.class_idx(1e9), 3);
        assert_eq!(scorer.class_idx(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_class_idx_matches_linear_scan() {
        let mut rng = Pcg32::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let len = rng.random_range(1..8);
            let thresholds = (0..len)
                .map(|_| f64::from(rng.random_range(-5_i32..5)) / 2.0)
                .collect::<Vec<_>>();
            let scorer = scorer(&thresholds, false);
            let mut previous = 0;
            for step in -14..=14 {
                let v = f64::from(step) / 4.0;
                let idx = scorer.class_idx(v);
                assert_eq!(idx, linear_scan(scorer.thresholds(), v), "v = {v}");
                assert!(idx >= previous);
                previous = idx;
            }
            for &t in &thresholds {
                assert_eq!(scorer.class_idx(t), linear_scan(scorer.thresholds(), t));
            }
        }
    }

    #[test]
    fn test_score_penalizes_wrong_class() {
        let table = table(&[(0.0, 0.5), (1.0, 1.5), (2.0, 2.5), (2.0, 0.2)]);
        let params = DiscretizeParams {
            thresholds: vec![1.0, 2.0],
            weighted_accuracy: false,
        };
        let scorer = DiscretizeContinBScore::new(table, &params).unwrap();

        // The identity shifted by one half lands in the right class except for 0.2.
        let candidate = Expr::Plus(vec![Expr::Arg(0), Expr::Contin(0.5)]);
        let pbs = scorer.score(&candidate).unwrap();
        assert_eq!(pbs.bscore, [0.0, 0.0, -1.0]);
        assert_eq!(scorer.best_possible_bscore(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_weighted_accuracy() {
        // Classes: three observations in class 0, one in class 1.
        let table = table(&[(0.0, 0.1), (1.0, 0.2), (2.0, 0.3), (3.0, 5.0)]);
        let params = DiscretizeParams {
            thresholds: vec![1.0],
            weighted_accuracy: true,
        };
        let scorer = DiscretizeContinBScore::new(table, &params).unwrap();
        assert_relative_eq!(scorer.weights()[0], 4.0 / (2.0 * 3.0));
        assert_relative_eq!(scorer.weights()[1], 4.0 / (2.0 * 1.0));

        let pbs = scorer.score(&Expr::Contin(0.0)).unwrap();
        assert_relative_eq!(pbs.score(), -2.0);
        let pbs = scorer.score(&Expr::Contin(9.0)).unwrap();
        assert_relative_eq!(pbs.score(), -2.0);
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        let err = DiscretizeContinBScore::new(table(&[(0.0, 0.0)]), &DiscretizeParams::default())
            .unwrap_err();
        assert_eq!(err, BScoreConfigError::InvalidDiscretization);

        let boolean =
            CTable::from_observations(vec![], [(vec![Value::from(true)], Value::from(true))])
                .unwrap();
        let params = DiscretizeParams {
            thresholds: vec![0.0],
            weighted_accuracy: false,
        };
        assert!(matches!(
            DiscretizeContinBScore::new(Arc::new(boolean), &params),
            Err(BScoreConfigError::UnsupportedOutputType { .. })
        ));
    }
}

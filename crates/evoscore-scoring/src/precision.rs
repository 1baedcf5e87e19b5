//! Precision under an activation constraint.
//!
//! [`PrecisionBScore`] scores a boolean predicate by how good the outputs are on the rows
//! it selects (its *precision*) while an activation penalty keeps the fraction of selected
//! observations inside `[min_activation, max_activation]`.
//!
//! The target polarity decides both which rows count as selected (those where the
//! predicate evaluates to `positive`) and which outputs count as hits:
//!
//! - boolean tables: observations equal to `positive`
//! - contin tables: the count-weighted output values, negated when `positive` is false
//!
//! Precision is `(sum of selected outputs / selected observations) / max_output`, or `1.0`
//! when nothing is selected. With `worst_norm`, contin precision is further divided by the
//! magnitude of the average over the worst decile of selected negative rows.

use std::sync::Arc;

use evoscore_table::{CTable, CTableRow, Counter, Expr, Value, ValueType};
use serde::{Deserialize, Serialize};

use crate::{
    BScore, BScoreConfigError, BehavioralScore, ComplexityPenalty, PenalizedBScore, ScoreError,
    ThresholdPenalty, WORST_SCORE,
    bscore::log_candidate,
    greedy::{Contribution, GreedyPrefix, accumulate_until},
};

const NAME: &str = "precision scorer";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionParams {
    /// Hardness of the activation penalty.
    pub penalty: f64,
    pub min_activation: f64,
    pub max_activation: f64,
    /// Target polarity.
    pub positive: bool,
    /// Normalize contin precision by the worst decile of selected rows.
    pub worst_norm: bool,
}

impl Default for PrecisionParams {
    fn default() -> Self {
        Self {
            penalty: 1.0,
            min_activation: 0.5,
            max_activation: 1.0,
            positive: true,
            worst_norm: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrecisionBScore {
    table: Arc<CTable>,
    table_size: f64,
    output_type: ValueType,
    activation: ThresholdPenalty,
    positive: bool,
    worst_norm: bool,
    max_output: f64,
    occam: ComplexityPenalty,
}

impl PrecisionBScore {
    #[expect(clippy::cast_precision_loss)]
    pub fn new(table: Arc<CTable>, params: &PrecisionParams) -> Result<Self, BScoreConfigError> {
        let output_type = table.output_type();
        let max_output = match output_type {
            ValueType::Boolean => 1.0,
            ValueType::Contin => table
                .iter()
                .flat_map(|row| row.outputs.iter())
                .filter_map(|(v, _)| v.as_contin())
                .map(|v| if params.positive { v } else { -v })
                .fold(WORST_SCORE, f64::max),
            ValueType::Enum => {
                return Err(BScoreConfigError::UnsupportedOutputType {
                    scorer: NAME,
                    output_type,
                });
            }
        };
        let activation = ThresholdPenalty::new(
            params.min_activation,
            params.max_activation,
            params.penalty,
        )?;
        tracing::info!(
            penalty = params.penalty,
            min_activation = params.min_activation,
            max_activation = params.max_activation,
            positive = params.positive,
            max_output,
            "built precision scorer"
        );
        Ok(Self {
            table_size: table.uncompressed_size() as f64,
            table,
            output_type,
            activation,
            positive: params.positive,
            worst_norm: params.worst_norm,
            max_output,
            occam: ComplexityPenalty::DISABLED,
        })
    }

    /// Returns the largest (polarity-adjusted) output; `1.0` for boolean tables.
    #[must_use]
    pub fn max_output(&self) -> f64 {
        self.max_output
    }

    #[expect(clippy::cast_precision_loss)]
    fn sum_outputs(&self, outputs: &Counter) -> f64 {
        match self.output_type {
            ValueType::Boolean => outputs.get(&Value::Bool(self.positive)) as f64,
            ValueType::Contin | ValueType::Enum => {
                let sum = outputs
                    .iter()
                    .filter_map(|(v, c)| v.as_contin().map(|v| v * c as f64))
                    .sum::<f64>();
                if self.positive { sum } else { -sum }
            }
        }
    }

    /// Averages the most negative selected row sums until they hold more than a tenth of
    /// the selected observations.
    #[expect(clippy::cast_precision_loss)]
    fn worst_decile_average(mut worst: Vec<(f64, u64)>, active: u64) -> f64 {
        worst.sort_by(|a, b| a.0.total_cmp(&b.0));
        let n_deciles = active / 10;
        let mut worst_count = 0;
        let mut sum = 0.0;
        for (sumo, count) in worst {
            worst_count += count;
            sum += sumo;
            if worst_count > n_deciles {
                break;
            }
        }
        if worst_count == 0 {
            0.0
        } else {
            sum / worst_count as f64
        }
    }

    #[expect(clippy::cast_precision_loss)]
    fn greedy_prefix(&self) -> GreedyPrefix {
        let contributions = self
            .table
            .iter()
            .enumerate()
            .map(|(row, r)| {
                let sumo = self.sum_outputs(&r.outputs);
                let total = r.outputs.total_count() as f64;
                Contribution {
                    row,
                    rank: sumo / total,
                    variable: sumo,
                    fixed: total,
                }
            })
            .collect();
        accumulate_until(contributions, self.table_size * self.activation.min())
    }

    /// Builds a predicate selecting exactly the rows of the best-possible estimate.
    ///
    /// The result is a disjunction with one conjunctive clause per selected row; each
    /// clause has one literal per input, positive when the input is `true` and negated
    /// otherwise. When the target polarity is negative the disjunction is negated, so the
    /// predicate evaluates to `false` on the selected rows.
    #[must_use]
    pub fn gen_canonical_best_candidate(&self) -> Expr {
        let prefix = self.greedy_prefix();
        let rows = self.table.rows();
        let clauses = prefix
            .rows
            .iter()
            .map(|&i| conjunctive_clause(&rows[i]))
            .collect();
        let candidate = Expr::Or(clauses);
        if self.positive {
            candidate
        } else {
            Expr::Not(Box::new(candidate))
        }
    }
}

fn conjunctive_clause(row: &CTableRow) -> Expr {
    Expr::And(
        row.inputs
            .iter()
            .enumerate()
            .map(|(i, input)| Expr::literal(i, input.is_true()))
            .collect(),
    )
}

impl BScore for PrecisionBScore {
    #[expect(clippy::cast_precision_loss)]
    fn score(&self, candidate: &Expr) -> Result<PenalizedBScore, ScoreError> {
        let mut active = 0;
        let mut sao = 0.0;
        let mut worst = vec![];
        for row in self.table.iter() {
            if candidate.eval_bool(&row.inputs)? != self.positive {
                continue;
            }
            let sumo = self.sum_outputs(&row.outputs);
            let total = row.outputs.total_count();
            sao += sumo;
            active += total;
            if self.worst_norm && sumo < 0.0 {
                worst.push((sumo, total));
            }
        }

        let mut precision = if active > 0 {
            (sao / active as f64) / self.max_output
        } else {
            1.0
        };
        if self.worst_norm && sao > 0.0 {
            let avg_worst = Self::worst_decile_average(worst, active);
            if avg_worst < 0.0 {
                tracing::debug!(precision, avg_worst, "normalizing precision by worst decile");
                precision /= -avg_worst;
            }
        }

        let activation = active as f64 / self.table_size;
        let activation_penalty = self.activation.penalty(activation);
        tracing::debug!(
            precision,
            activation,
            activation_penalty,
            "scored precision candidate"
        );

        let pbs = PenalizedBScore::new(
            vec![precision, activation_penalty],
            self.occam.penalty(candidate.complexity() as f64),
        );
        log_candidate(candidate, &pbs);
        Ok(pbs)
    }

    fn best_possible_bscore(&self) -> BehavioralScore {
        let prefix = self.greedy_prefix();
        let precision = if prefix.fixed_sum > 0.0 {
            (prefix.variable_sum / prefix.fixed_sum) / self.max_output
        } else {
            1.0
        };
        let activation = prefix.fixed_sum / self.table_size;
        let activation_penalty = self.activation.penalty(activation);
        tracing::info!(
            precision,
            activation,
            activation_penalty,
            "estimated best possible precision at minimum activation"
        );
        vec![precision, activation_penalty]
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

    // Precision is normalized by the table size, so the coefficient is too.
    fn set_complexity_coef(&mut self, alphabet_size: usize, noise: f64) {
        self.occam = ComplexityPenalty::discrete(alphabet_size, noise).scaled(self.table_size);
    }

    fn set_complexity_ratio(&mut self, ratio: f64) {
        self.occam = ComplexityPenalty::from_ratio(ratio).scaled(self.table_size);
    }
}

use std::sync::Arc;

use evoscore_table::{CTable, Counter, Expr, Value, ValueType};

use crate::{BScoreConfigError, ScoreError};

/// Confusion-matrix sums of a boolean candidate over a table.
///
/// For boolean outputs the sums are observation counts. For contin outputs the positive
/// mass of a row is the count-weighted sum of its values and the negative mass is its
/// negation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiscriminationCounts {
    pub true_positive_sum: f64,
    pub false_positive_sum: f64,
    pub true_negative_sum: f64,
    pub false_negative_sum: f64,
    /// Observations in rows the candidate accepts.
    pub positive_count: u64,
    /// Observations in rows the candidate rejects.
    pub negative_count: u64,
}

impl DiscriminationCounts {
    /// `tp / (tp + fp)`, or `1.0` when nothing is accepted.
    ///
    /// For contin outputs every row's negative mass cancels its positive mass, so
    /// `tp + fp` is always zero and precision is always `1.0`. A precision floor therefore
    /// never binds on a contin table.
    #[must_use]
    pub fn precision(&self) -> f64 {
        let predicted = self.true_positive_sum + self.false_positive_sum;
        if predicted == 0.0 {
            1.0
        } else {
            self.true_positive_sum / predicted
        }
    }

    /// `tp / (tp + fn)`, or `1.0` when there is nothing to find.
    #[must_use]
    pub fn recall(&self) -> f64 {
        let actual = self.true_positive_sum + self.false_negative_sum;
        if actual == 0.0 {
            1.0
        } else {
            self.true_positive_sum / actual
        }
    }
}

/// Splits every table row into positive and negative mass and tallies how a boolean
/// candidate classifies it.
#[derive(Debug, Clone)]
pub struct Discriminator {
    table: Arc<CTable>,
    positive_total: f64,
    negative_total: f64,
}

impl Discriminator {
    pub fn new(scorer: &'static str, table: Arc<CTable>) -> Result<Self, BScoreConfigError> {
        let output_type = table.output_type();
        if !matches!(output_type, ValueType::Boolean | ValueType::Contin) {
            return Err(BScoreConfigError::UnsupportedOutputType {
                scorer,
                output_type,
            });
        }
        let (positive_total, negative_total) = table
            .iter()
            .map(|row| row_masses(&row.outputs))
            .fold((0.0, 0.0), |(p, n), (rp, rn)| (p + rp, n + rn));
        Ok(Self {
            table,
            positive_total,
            negative_total,
        })
    }

    #[must_use]
    pub fn table(&self) -> &Arc<CTable> {
        &self.table
    }

    /// Returns the positive mass of the whole table.
    #[must_use]
    pub fn positive_total(&self) -> f64 {
        self.positive_total
    }

    /// Returns the negative mass of the whole table.
    #[must_use]
    pub fn negative_total(&self) -> f64 {
        self.negative_total
    }

    /// Returns the `(positive, negative)` mass of one row's outputs.
    #[must_use]
    pub fn row_masses(&self, outputs: &Counter) -> (f64, f64) {
        row_masses(outputs)
    }

    /// Tallies the confusion matrix of `candidate`.
    pub fn count(&self, candidate: &Expr) -> Result<DiscriminationCounts, ScoreError> {
        let mut counts = DiscriminationCounts::default();
        for row in self.table.iter() {
            let (pos, neg) = row_masses(&row.outputs);
            let total = row.outputs.total_count();
            if candidate.eval_bool(&row.inputs)? {
                counts.true_positive_sum += pos;
                counts.false_positive_sum += neg;
                counts.positive_count += total;
            } else {
                counts.false_negative_sum += pos;
                counts.true_negative_sum += neg;
                counts.negative_count += total;
            }
        }
        Ok(counts)
    }
}

#[expect(clippy::cast_precision_loss)]
fn row_masses(outputs: &Counter) -> (f64, f64) {
    let mut pos = 0.0;
    let mut contin = false;
    for (value, count) in outputs.iter() {
        match value {
            Value::Bool(true) => pos += count as f64,
            Value::Contin(c) => {
                contin = true;
                pos += c.0 * count as f64;
            }
            Value::Bool(false) | Value::Enum(_) => {}
        }
    }
    if contin {
        (pos, -pos)
    } else {
        (pos, outputs.total_count() as f64 - pos)
    }
}

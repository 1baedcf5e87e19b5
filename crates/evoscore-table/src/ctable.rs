use std::collections::BTreeMap;

use crate::{Counter, Value, ValueType};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TableError {
    #[display("observation table has no rows")]
    Empty,
    #[display("row {row} has {found} inputs, expected {expected}")]
    ArityMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("row {row} has a {found} output, expected {expected}")]
    OutputTypeMismatch {
        row: usize,
        expected: ValueType,
        found: ValueType,
    },
    #[display("row {row} has no observed outputs")]
    EmptyRow { row: usize },
}

/// One entry of a compressed observation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CTableRow {
    /// The input vector, unique within the table.
    pub inputs: Vec<Value>,
    /// Every output observed for `inputs`, with its count.
    pub outputs: Counter,
}

/// A compressed observation table.
///
/// Raw observations sharing an identical input vector are merged into a single row whose
/// [`Counter`] holds every observed output and its count. Rows are ordered by input
/// vector, all rows have the same arity, and all outputs have the same [`ValueType`].
///
/// The table is immutable once built; scorers share it through an `Arc` and precompute
/// whatever summaries they need at construction.
///
/// # Example
///
/// ```
/// use evoscore_table::{CTable, Value, ValueType};
///
/// let table = CTable::from_observations(
///     vec!["x".to_owned()],
///     [
///         (vec![Value::from(true)], Value::from(true)),
///         (vec![Value::from(true)], Value::from(false)),
///         (vec![Value::from(false)], Value::from(false)),
///     ],
/// )
/// .unwrap();
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.uncompressed_size(), 3);
/// assert_eq!(table.output_type(), ValueType::Boolean);
/// ```
#[derive(Debug, Clone)]
pub struct CTable {
    labels: Vec<String>,
    arity: usize,
    output_type: ValueType,
    rows: Vec<CTableRow>,
    uncompressed_size: u64,
}

impl CTable {
    /// Builds a table from raw `(inputs, output)` observations.
    ///
    /// The arity and output type are taken from the first observation. `labels` names the
    /// inputs and may be empty.
    pub fn from_observations<I>(labels: Vec<String>, observations: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (Vec<Value>, Value)>,
    {
        Self::from_rows(
            labels,
            observations
                .into_iter()
                .map(|(inputs, output)| (inputs, [(output, 1)].into_iter().collect())),
        )
    }

    /// Builds a table from `(inputs, outputs)` rows, merging rows with equal inputs.
    pub fn from_rows<I>(labels: Vec<String>, rows: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (Vec<Value>, Counter)>,
    {
        let mut merged = BTreeMap::<Vec<Value>, Counter>::new();
        let mut shape: Option<(usize, ValueType)> = None;

        for (row, (inputs, outputs)) in rows.into_iter().enumerate() {
            if outputs.total_count() == 0 {
                return Err(TableError::EmptyRow { row });
            }
            let (arity, output_type) = *shape.get_or_insert_with(|| {
                let first = outputs.iter().next().map(|(v, _)| v.value_type());
                (inputs.len(), first.unwrap_or(ValueType::Boolean))
            });
            if inputs.len() != arity {
                return Err(TableError::ArityMismatch {
                    row,
                    expected: arity,
                    found: inputs.len(),
                });
            }
            if let Some((v, _)) = outputs.iter().find(|(v, _)| v.value_type() != output_type) {
                return Err(TableError::OutputTypeMismatch {
                    row,
                    expected: output_type,
                    found: v.value_type(),
                });
            }
            merged.entry(inputs).or_default().merge(&outputs);
        }

        let (arity, output_type) = shape.ok_or(TableError::Empty)?;
        let rows = merged
            .into_iter()
            .map(|(inputs, outputs)| CTableRow { inputs, outputs })
            .collect::<Vec<_>>();
        let uncompressed_size = rows.iter().map(|r| r.outputs.total_count()).sum();

        Ok(Self {
            labels,
            arity,
            output_type,
            rows,
            uncompressed_size,
        })
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the number of inputs per row.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    #[must_use]
    pub fn output_type(&self) -> ValueType {
        self.output_type
    }

    #[must_use]
    pub fn rows(&self) -> &[CTableRow] {
        &self.rows
    }

    /// Returns the number of distinct input vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the total number of observations before compression.
    #[must_use]
    pub fn uncompressed_size(&self) -> u64 {
        self.uncompressed_size
    }

    pub fn iter(&self) -> impl Iterator<Item = &CTableRow> + '_ {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a CTable {
    type Item = &'a CTableRow;
    type IntoIter = std::slice::Iter<'a, CTableRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(v: bool) -> Value {
        Value::from(v)
    }

    #[test]
    fn test_merges_duplicate_inputs() {
        let table = CTable::from_observations(
            vec![],
            [
                (vec![b(true), b(false)], b(true)),
                (vec![b(false), b(false)], b(false)),
                (vec![b(true), b(false)], b(true)),
                (vec![b(true), b(false)], b(false)),
            ],
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.arity(), 2);
        assert_eq!(table.uncompressed_size(), 4);

        let row = table
            .iter()
            .find(|r| r.inputs == [b(true), b(false)])
            .unwrap();
        assert_eq!(row.outputs.get(&b(true)), 2);
        assert_eq!(row.outputs.get(&b(false)), 1);
    }

    #[test]
    fn test_rejects_empty() {
        let err = CTable::from_observations(vec![], []).unwrap_err();
        assert!(matches!(err, TableError::Empty));
    }

    #[test]
    fn test_rejects_arity_mismatch() {
        let err = CTable::from_observations(
            vec![],
            [(vec![b(true)], b(true)), (vec![b(true), b(true)], b(true))],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TableError::ArityMismatch {
                row: 1,
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn test_rejects_mixed_output_types() {
        let err = CTable::from_observations(
            vec![],
            [(vec![b(true)], b(true)), (vec![b(false)], Value::from(1.0))],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TableError::OutputTypeMismatch {
                row: 1,
                expected: ValueType::Boolean,
                found: ValueType::Contin
            }
        ));
    }

    #[test]
    fn test_rejects_empty_row() {
        let err = CTable::from_rows(vec![], [(vec![b(true)], Counter::new())]).unwrap_err();
        assert!(matches!(err, TableError::EmptyRow { row: 0 }));
    }
}

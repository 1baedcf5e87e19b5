//! Greedy upper bounds over table rows.
//!
//! Several scorers estimate their best possible score the same way: rank every row by how
//! much it helps the maximized metric, take rows in that order, and stop as soon as the
//! constrained metric reaches its minimum. The taken prefix doubles as the recipe for a
//! canonical best candidate.

/// What one row would contribute if a candidate selected it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// Row index in the table.
    pub row: usize,
    /// Sort key; higher is taken first.
    pub rank: f64,
    /// Contribution to the maximized metric.
    pub variable: f64,
    /// Contribution to the constrained metric.
    pub fixed: f64,
}

/// The prefix of rows taken by [`accumulate_until`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GreedyPrefix {
    pub variable_sum: f64,
    pub fixed_sum: f64,
    /// Taken row indices, in the order they were taken.
    pub rows: Vec<usize>,
}

/// Takes contributions by descending rank until `fixed_sum >= threshold`.
///
/// The row that crosses the threshold is included. Ties keep their input order, so the
/// result is deterministic. If the threshold is never reached every row is taken.
///
/// # Examples
///
/// ```
/// use evoscore_scoring::greedy::{Contribution, accumulate_until};
///
/// let rows = [(0.2, 1.0), (0.9, 1.0), (0.5, 1.0)]
///     .into_iter()
///     .enumerate()
///     .map(|(row, (rank, fixed))| Contribution { row, rank, variable: rank, fixed })
///     .collect::<Vec<_>>();
/// let prefix = accumulate_until(rows, 2.0);
/// assert_eq!(prefix.rows, [1, 2]);
/// assert_eq!(prefix.fixed_sum, 2.0);
/// assert!((prefix.variable_sum - 1.4).abs() < 1e-12);
/// ```
#[must_use]
pub fn accumulate_until(mut contributions: Vec<Contribution>, threshold: f64) -> GreedyPrefix {
    contributions.sort_by(|a, b| b.rank.total_cmp(&a.rank));

    let mut prefix = GreedyPrefix::default();
    for c in contributions {
        prefix.variable_sum += c.variable;
        prefix.fixed_sum += c.fixed;
        prefix.rows.push(c.row);
        if threshold <= prefix.fixed_sum {
            break;
        }
    }
    prefix
}

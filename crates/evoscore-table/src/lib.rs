//! Observation tables and candidate programs for the evoscore scorers.
//!
//! This crate holds the data the scorers read but never own:
//!
//! - [`Value`] / [`ValueType`] - Boolean, contin and enum values with a total order
//! - [`Counter`] - Multiset of output values observed for one input vector
//! - [`CTable`] - Compressed observation table (unique input vector → output counter)
//! - [`Expr`] - Candidate program with an evaluator and a complexity measure
//!
//! # Architecture
//!
//! ```text
//! raw observations (inputs, output)
//!     ↓ merged by input vector
//! CTable (rows of inputs + Counter)
//!     ↓ read by
//! scorers (evoscore-scoring) ← Expr candidates evaluated row by row
//! ```
//!
//! # Example
//!
//! ```
//! use evoscore_table::{CTable, Expr, Value};
//!
//! let t = Value::from(true);
//! let f = Value::from(false);
//! let table = CTable::from_observations(
//!     vec!["a".to_owned(), "b".to_owned()],
//!     [
//!         (vec![t.clone(), t.clone()], t.clone()),
//!         (vec![t.clone(), f.clone()], f.clone()),
//!         (vec![t.clone(), t.clone()], t.clone()),
//!     ],
//! )
//! .unwrap();
//!
//! let candidate = Expr::And(vec![Expr::Arg(0), Expr::Arg(1)]);
//! let hits = table
//!     .iter()
//!     .filter(|row| candidate.eval(&row.inputs).unwrap() == t)
//!     .map(|row| row.outputs.get(&t))
//!     .sum::<u64>();
//! assert_eq!(hits, 2);
//! ```

pub use self::{counter::*, ctable::*, program::*, value::*};

mod counter;
mod ctable;
pub mod program;
mod value;

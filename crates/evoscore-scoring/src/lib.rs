//! Behavioral scorers for evolutionary program learning.
//!
//! A behavioral scorer turns a candidate program into a vector of fitness components
//! measured against a compressed observation table ([`CTable`]), plus a scalar complexity
//! penalty. The optimizer driving the search only sees the [`BScore`] trait.
//!
//! # Scorers
//!
//! | Scorer                          | Outputs         | Components                            |
//! |---------------------------------|-----------------|---------------------------------------|
//! | [`RecallBScore`]                | boolean, contin | recall, precision-floor penalty       |
//! | [`PrerecBScore`]                | boolean, contin | precision, recall-floor penalty       |
//! | [`PrecisionBScore`]             | boolean, contin | precision, activation penalty         |
//! | [`DiscretizeContinBScore`]      | contin          | one per row, by class bucket          |
//! | [`EnumTableBScore`]             | enum            | one per row, mismatch count           |
//! | [`EnumFilterBScore`]            | enum            | per row, punished wrong filters       |
//! | [`EnumGradedBScore`]            | enum            | per row, graded by clause position    |
//! | [`EnumEffectiveBScore`]         | enum            | per row, graded by effective clauses  |
//! | [`InterestingPredicateBScore`]  | contin          | KL divergence, skewness, Mann-Whitney |
//! | [`LogicalBScore`]               | truth table     | one per row, mismatch                 |
//! | [`CTruthTableBScore`]           | boolean         | one per row, mismatch count           |
//! | [`ContinBScore`]                | contin          | one per row, squared error            |
//!
//! Scorers are usually built from a serializable [`ScorerConfig`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use evoscore_scoring::{BScore, ScorerConfig};
//! use evoscore_table::{CTable, Expr, Value};
//!
//! let t = Value::from(true);
//! let f = Value::from(false);
//! let table = CTable::from_observations(
//!     vec!["x".to_owned()],
//!     [
//!         (vec![t.clone()], t.clone()),
//!         (vec![t.clone()], t.clone()),
//!         (vec![f.clone()], f.clone()),
//!     ],
//! )
//! .unwrap();
//!
//! let config: ScorerConfig = serde_json::from_str(r#"{"kind": "ctruth-table"}"#).unwrap();
//! let scorer = config.build(Arc::new(table)).unwrap();
//!
//! let perfect = scorer.score(&Expr::Arg(0)).unwrap();
//! assert_eq!(perfect.score(), 0.0);
//! let inverted = scorer.score(&Expr::literal(0, false)).unwrap();
//! assert_eq!(inverted.score(), -3.0);
//! ```

use evoscore_table::{EvalError, ValueType};

pub use self::{
    bscore::*, complexity::*, config::*, contin::*, discretize::*, discriminating::*,
    discriminator::*, enums::*, interesting::*, logical::*, penalty::*, precision::*,
};

mod bscore;
mod complexity;
mod config;
mod contin;
mod discretize;
mod discriminating;
mod discriminator;
mod enums;
pub mod greedy;
mod interesting;
mod logical;
mod penalty;
mod precision;

/// Failure to score one candidate.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ScoreError {
    #[display("failed to evaluate candidate: {_0}")]
    Eval(EvalError),
    #[display("{scorer} expects an enum constant or a conditional, got `{candidate}`")]
    UnexpectedCandidate {
        scorer: &'static str,
        candidate: String,
    },
}

impl From<EvalError> for ScoreError {
    fn from(err: EvalError) -> Self {
        Self::Eval(err)
    }
}

/// Invalid scorer configuration, reported at construction time.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum BScoreConfigError {
    #[display("{scorer} does not support {output_type} outputs")]
    UnsupportedOutputType {
        scorer: &'static str,
        output_type: ValueType,
    },
    #[display("thresholds must satisfy 0 < min <= max <= 1, got min = {min}, max = {max}")]
    InvalidThresholds { min: f64, max: f64 },
    #[display("penalty hardness must be positive, got {hardness}")]
    NonPositiveHardness { hardness: f64 },
    #[display("discretization needs at least one finite threshold")]
    InvalidDiscretization,
    #[display("grading must lie strictly between 0 and 1, got {grading}")]
    InvalidGrading { grading: f64 },
    #[display("alphabet size must be at least 2, got {alphabet_size}")]
    InvalidAlphabetSize { alphabet_size: usize },
    #[display("a truth table of arity {arity} needs {expected} rows, got {found}")]
    TruthTableSize {
        arity: usize,
        expected: usize,
        found: usize,
    },
}

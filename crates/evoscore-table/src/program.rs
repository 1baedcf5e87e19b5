//! Candidate programs and their evaluation.
//!
//! A candidate is a small expression tree over the input vector of an observation table.
//! Boolean connectives, a little arithmetic, a contin-to-boolean threshold and an ordered
//! conditional (`cond`) cover the shapes the scorers need to reason about:
//!
//! - boolean predicates (discriminating, precision and interesting-predicate scorers)
//! - contin-valued expressions (contin and discretized scorers)
//! - chains of `if predicate then enum` clauses (enum scorers)
//!
//! # Complexity
//!
//! [`Expr::complexity`] is the size measure the Occam's razor penalty multiplies. Literals
//! (an argument or a negated argument), constants and arithmetic operators count one
//! each; `and`, `or`, `not` of a non-literal and `cond` add nothing of their own. Under
//! this measure a conjunction of `k` literals has complexity `k`.
//!
//! # JSON form
//!
//! ```
//! use evoscore_table::{Expr, Value};
//!
//! let expr: Expr = serde_json::from_str(r#"{"and": [{"arg": 0}, {"not": {"arg": 1}}]}"#).unwrap();
//! assert_eq!(expr.to_string(), "and($1 !$2)");
//! assert_eq!(expr.complexity(), 2);
//! assert_eq!(
//!     expr.eval(&[Value::from(true), Value::from(false)]).unwrap(),
//!     Value::from(true)
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Value, ValueType};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum EvalError {
    #[display("argument ${} is out of range for {arity} inputs", index + 1)]
    ArgumentOutOfRange { index: usize, arity: usize },
    #[display("expected a {expected} value, found a {found} value")]
    TypeMismatch {
        expected: ValueType,
        found: ValueType,
    },
}

/// A candidate program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Bool(bool),
    Contin(f64),
    Enum(String),
    /// The input at this 0-based index.
    Arg(usize),
    Not(Box<Expr>),
    /// Conjunction; `true` when empty.
    And(Vec<Expr>),
    /// Disjunction; `false` when empty.
    Or(Vec<Expr>),
    Plus(Vec<Expr>),
    Times(Vec<Expr>),
    /// `true` when the contin operand is strictly positive.
    GreaterThanZero(Box<Expr>),
    Cond(Cond),
}

/// An ordered conditional: the consequent of the first clause whose predicate holds,
/// otherwise the `otherwise` branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cond {
    pub clauses: Vec<Clause>,
    pub otherwise: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub predicate: Expr,
    pub consequent: Expr,
}

impl Expr {
    /// A positive (`$i`) or negated (`!$i`) literal over input `index`.
    #[must_use]
    pub fn literal(index: usize, positive: bool) -> Self {
        if positive {
            Self::Arg(index)
        } else {
            Self::Not(Box::new(Self::Arg(index)))
        }
    }

    #[must_use]
    pub fn enum_constant(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Builds `cond(p₁ c₁ … pₙ cₙ otherwise)`.
    #[must_use]
    pub fn cond<I>(clauses: I, otherwise: Expr) -> Self
    where
        I: IntoIterator<Item = (Expr, Expr)>,
    {
        Self::Cond(Cond {
            clauses: clauses
                .into_iter()
                .map(|(predicate, consequent)| Clause {
                    predicate,
                    consequent,
                })
                .collect(),
            otherwise: Box::new(otherwise),
        })
    }

    /// Returns the enum name if this program is a bare enum constant.
    #[must_use]
    pub fn as_enum_constant(&self) -> Option<&str> {
        match self {
            Self::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Evaluates the program on one input vector.
    pub fn eval(&self, inputs: &[Value]) -> Result<Value, EvalError> {
        match self {
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Contin(c) => Ok(Value::from(*c)),
            Self::Enum(name) => Ok(Value::Enum(name.clone())),
            Self::Arg(index) => {
                inputs
                    .get(*index)
                    .cloned()
                    .ok_or(EvalError::ArgumentOutOfRange {
                        index: *index,
                        arity: inputs.len(),
                    })
            }
            Self::Not(e) => Ok(Value::Bool(!e.eval_bool(inputs)?)),
            Self::And(es) => {
                for e in es {
                    if !e.eval_bool(inputs)? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Self::Or(es) => {
                for e in es {
                    if e.eval_bool(inputs)? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            Self::Plus(es) => es
                .iter()
                .try_fold(0.0, |acc, e| e.eval_contin(inputs).map(|v| acc + v))
                .map(Value::from),
            Self::Times(es) => es
                .iter()
                .try_fold(1.0, |acc, e| e.eval_contin(inputs).map(|v| acc * v))
                .map(Value::from),
            Self::GreaterThanZero(e) => Ok(Value::Bool(e.eval_contin(inputs)? > 0.0)),
            Self::Cond(cond) => cond.eval(inputs),
        }
    }

    /// Evaluates the program and requires a boolean result.
    pub fn eval_bool(&self, inputs: &[Value]) -> Result<bool, EvalError> {
        let value = self.eval(inputs)?;
        value.as_bool().ok_or(EvalError::TypeMismatch {
            expected: ValueType::Boolean,
            found: value.value_type(),
        })
    }

    /// Evaluates the program and requires a contin result.
    pub fn eval_contin(&self, inputs: &[Value]) -> Result<f64, EvalError> {
        let value = self.eval(inputs)?;
        value.as_contin().ok_or(EvalError::TypeMismatch {
            expected: ValueType::Contin,
            found: value.value_type(),
        })
    }

    /// Returns the tree complexity used by the Occam's razor penalty.
    #[must_use]
    pub fn complexity(&self) -> usize {
        match self {
            Self::Bool(_) | Self::Contin(_) | Self::Enum(_) | Self::Arg(_) => 1,
            Self::Not(e) => e.complexity(),
            Self::And(es) | Self::Or(es) => es.iter().map(Expr::complexity).sum(),
            Self::Plus(es) | Self::Times(es) => 1 + es.iter().map(Expr::complexity).sum::<usize>(),
            Self::GreaterThanZero(e) => 1 + e.complexity(),
            Self::Cond(cond) => {
                cond.clauses
                    .iter()
                    .map(|c| c.predicate.complexity() + c.consequent.complexity())
                    .sum::<usize>()
                    + cond.otherwise.complexity()
            }
        }
    }
}

impl Cond {
    pub fn eval(&self, inputs: &[Value]) -> Result<Value, EvalError> {
        for clause in &self.clauses {
            if clause.predicate.eval_bool(inputs)? {
                return clause.consequent.eval(inputs);
            }
        }
        self.otherwise.eval(inputs)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, head: &str, es: &[Expr]) -> fmt::Result {
    write!(f, "{head}(")?;
    for (i, e) in es.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{e}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Contin(c) => write!(f, "{c}"),
            Self::Enum(name) => f.write_str(name),
            Self::Arg(index) => write!(f, "${}", index + 1),
            Self::Not(e) => match e.as_ref() {
                Self::Arg(index) => write!(f, "!${}", index + 1),
                e => write!(f, "not({e})"),
            },
            Self::And(es) => write_list(f, "and", es),
            Self::Or(es) => write_list(f, "or", es),
            Self::Plus(es) => write_list(f, "+", es),
            Self::Times(es) => write_list(f, "*", es),
            Self::GreaterThanZero(e) => write!(f, "0<({e})"),
            Self::Cond(cond) => {
                f.write_str("cond(")?;
                for clause in &cond.clauses {
                    write!(f, "{} {} ", clause.predicate, clause.consequent)?;
                }
                write!(f, "{})", cond.otherwise)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(bits: &[bool]) -> Vec<Value> {
        bits.iter().copied().map(Value::from).collect()
    }

    #[test]
    fn test_boolean_connectives() {
        let expr = Expr::Or(vec![
            Expr::And(vec![Expr::literal(0, true), Expr::literal(1, false)]),
            Expr::literal(2, true),
        ]);
        assert!(expr.eval_bool(&inputs(&[true, false, false])).unwrap());
        assert!(!expr.eval_bool(&inputs(&[true, true, false])).unwrap());
        assert!(expr.eval_bool(&inputs(&[false, true, true])).unwrap());
        assert!(Expr::And(vec![]).eval_bool(&[]).unwrap());
        assert!(!Expr::Or(vec![]).eval_bool(&[]).unwrap());
    }

    #[test]
    fn test_arithmetic() {
        let expr = Expr::GreaterThanZero(Box::new(Expr::Plus(vec![
            Expr::Arg(0),
            Expr::Times(vec![Expr::Contin(-2.0), Expr::Arg(1)]),
        ])));
        let x = [Value::from(3.0), Value::from(1.0)];
        assert!(expr.eval_bool(&x).unwrap());
        let x = [Value::from(1.0), Value::from(1.0)];
        assert!(!expr.eval_bool(&x).unwrap());
        assert_eq!(expr.complexity(), 6);
    }

    #[test]
    fn test_cond_picks_first_true_clause() {
        let expr = Expr::cond(
            [
                (Expr::Arg(0), Expr::enum_constant("a")),
                (Expr::Arg(1), Expr::enum_constant("b")),
            ],
            Expr::enum_constant("c"),
        );
        assert_eq!(
            expr.eval(&inputs(&[true, true])).unwrap(),
            Value::from("a")
        );
        assert_eq!(
            expr.eval(&inputs(&[false, true])).unwrap(),
            Value::from("b")
        );
        assert_eq!(
            expr.eval(&inputs(&[false, false])).unwrap(),
            Value::from("c")
        );
        assert_eq!(expr.to_string(), "cond($1 a $2 b c)");
        assert_eq!(expr.complexity(), 5);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Expr::Arg(3).eval(&inputs(&[true])).unwrap_err(),
            EvalError::ArgumentOutOfRange { index: 3, arity: 1 }
        );
        assert_eq!(
            Expr::Not(Box::new(Expr::Contin(1.0)))
                .eval(&[])
                .unwrap_err(),
            EvalError::TypeMismatch {
                expected: ValueType::Boolean,
                found: ValueType::Contin
            }
        );
    }

    #[test]
    fn test_json_shape() {
        let expr = Expr::cond(
            [(Expr::literal(0, false), Expr::enum_constant("x"))],
            Expr::enum_constant("y"),
        );
        let json = serde_json::to_string(&expr).unwrap();
        assert_eq!(
            json,
            r#"{"cond":{"clauses":[{"predicate":{"not":{"arg":0}},"consequent":{"enum":"x"}}],"otherwise":{"enum":"y"}}}"#
        );
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);
    }
}

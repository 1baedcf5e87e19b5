use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// A continuous value with a total order.
///
/// Ordering and equality follow [`f64::total_cmp`], so contin values can key ordered
/// maps. `-0.0` and `0.0` are distinct, and NaN equals itself.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Contin(pub f64);

impl Contin {
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Contin {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Contin {}

impl PartialOrd for Contin {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Contin {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for Contin {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Contin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[display("boolean")]
    Boolean,
    #[display("contin")]
    Contin,
    #[display("enum")]
    Enum,
}

/// An input or output value of an observation table or a candidate program.
///
/// Serialized untagged: `true`, `1.5` and `"red"` are a boolean, a contin and an enum
/// value respectively.
///
/// # Example
///
/// ```
/// use evoscore_table::{Value, ValueType};
///
/// let v: Value = serde_json::from_str("2.5").unwrap();
/// assert_eq!(v, Value::from(2.5));
/// assert_eq!(v.value_type(), ValueType::Contin);
/// assert!(Value::from(true) < Value::from(0.0));
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Contin(Contin),
    Enum(String),
}

impl Value {
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Boolean,
            Self::Contin(_) => ValueType::Contin,
            Self::Enum(_) => ValueType::Enum,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_contin(&self) -> Option<f64> {
        match self {
            Self::Contin(c) => Some(c.get()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` only for `Value::Bool(true)`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Contin(Contin(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Enum(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Enum(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
            Self::Contin(c) => write!(f, "{c}"),
            Self::Enum(s) => write!(f, "{s}"),
        }
    }
}

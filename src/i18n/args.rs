//! Message arguments.

use std::collections::HashMap;
use std::fmt;

/// Named arguments passed to a message pattern.
pub type Args = HashMap<String, Value>;

/// Build an argument map from `(name, value)` pairs.
///
/// ```
/// use i18n_kit::i18n::{args, Value};
///
/// let params = args([("name", Value::from("Ann")), ("count", Value::from(3))]);
/// assert_eq!(params["count"], Value::Int(3));
/// ```
pub fn args<I, K, V>(pairs: I) -> Args
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A single argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Numeric view of a value, used by `number` and `plural`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn minus(self, offset: i64) -> Number {
        match self {
            Number::Int(n) => Number::Int(n.saturating_sub(offset)),
            Number::Float(f) => Number::Float(f - offset as f64),
        }
    }

    pub(crate) fn is_one(self) -> bool {
        match self {
            Number::Int(n) => n == 1,
            Number::Float(f) => f == 1.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

impl Value {
    /// Interpret command-line text: integers, then finite floats, else a string.
    pub fn parse(text: &str) -> Value {
        if let Ok(n) = text.parse::<i64>() {
            return Value::Int(n);
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() && text.bytes().any(|b| b.is_ascii_digit()) => Value::Float(f),
            _ => Value::Str(text.to_string()),
        }
    }

    /// The numeric value, if the argument is (or spells) a number.
    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Str(s) => match Value::parse(s.trim()) {
                Value::Int(n) => Some(Number::Int(n)),
                Value::Float(f) => Some(Number::Float(f)),
                Value::Str(_) => None,
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Value::Float(n as f64), Value::Int)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

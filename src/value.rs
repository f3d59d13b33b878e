//! Value cells stored at every settings node
//!
//! A [`ValueCell`] is either `Unspecified` or holds a concrete [`Value`]. Leaves
//! of the settings tree only ever hold scalars; the composite variants are used
//! when settings are flattened into the nested structures handed to the
//! marshaling bridge.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A concrete value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Ordered pair, e.g. an axis range.
    Pair(Box<ValueCell>, Box<ValueCell>),
    Seq(Vec<ValueCell>),
    Map(BTreeMap<String, ValueCell>),
    /// Explicit null, distinct from an unset cell.
    None,
}

/// Either unset or holding a concrete [`Value`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ValueCell {
    #[default]
    Unspecified,
    Set(Value),
}

/// The scalar type a settings leaf accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Text,
    /// Text restricted to a list of choices.
    Choice,
}

impl ValueCell {
    /// Shorthand for a text cell.
    pub fn text(s: impl Into<String>) -> Self {
        ValueCell::Set(Value::Text(s.into()))
    }

    /// Build a pair cell.
    pub fn pair(a: impl Into<ValueCell>, b: impl Into<ValueCell>) -> Self {
        ValueCell::Set(Value::Pair(Box::new(a.into()), Box::new(b.into())))
    }

    /// Build a sequence cell.
    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ValueCell>,
    {
        ValueCell::Set(Value::Seq(items.into_iter().map(Into::into).collect()))
    }

    /// Build a mapping cell.
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ValueCell)>,
        K: Into<String>,
    {
        ValueCell::Set(Value::Map(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Explicit null.
    pub fn none() -> Self {
        ValueCell::Set(Value::None)
    }

    pub fn is_specified(&self) -> bool {
        matches!(self, ValueCell::Set(_))
    }

    pub fn is_unspecified(&self) -> bool {
        !self.is_specified()
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ValueCell::Set(v) => Some(v),
            ValueCell::Unspecified => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value()? {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value()? {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self.value()? {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.value()? {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// String form used for display and persistence. Unset cells render empty.
    pub fn display_string(&self) -> String {
        match self {
            ValueCell::Unspecified => String::new(),
            ValueCell::Set(v) => v.to_string(),
        }
    }

    /// Parse user or file input according to `ty`.
    ///
    /// Empty input and input that does not parse both yield `Unspecified`.
    pub fn parse(ty: ValueType, input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return ValueCell::Unspecified;
        }
        let parsed = match ty {
            ValueType::Bool => parse_bool(input).map(Value::Bool),
            ValueType::Int => input.parse::<i64>().ok().map(Value::Int),
            ValueType::Float => input
                .parse::<f64>()
                .ok()
                .filter(|f| !f.is_nan())
                .map(Value::Float),
            ValueType::Text | ValueType::Choice => Some(Value::Text(input.to_string())),
        };
        parsed.map_or(ValueCell::Unspecified, ValueCell::Set)
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::Pair(a, b) => write!(f, "({}, {})", a.display_string(), b.display_string()),
            Value::Seq(items) => {
                let parts: Vec<String> = items.iter().map(ValueCell::display_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.display_string()))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::None => write!(f, "None"),
        }
    }
}

impl From<Value> for ValueCell {
    fn from(v: Value) -> Self {
        ValueCell::Set(v)
    }
}

impl From<bool> for ValueCell {
    fn from(b: bool) -> Self {
        ValueCell::Set(Value::Bool(b))
    }
}

impl From<i64> for ValueCell {
    fn from(i: i64) -> Self {
        ValueCell::Set(Value::Int(i))
    }
}

impl From<i32> for ValueCell {
    fn from(i: i32) -> Self {
        ValueCell::Set(Value::Int(i64::from(i)))
    }
}

impl From<usize> for ValueCell {
    fn from(i: usize) -> Self {
        ValueCell::Set(Value::Int(i as i64))
    }
}

impl From<f64> for ValueCell {
    fn from(x: f64) -> Self {
        ValueCell::Set(Value::Float(x))
    }
}

impl From<&str> for ValueCell {
    fn from(s: &str) -> Self {
        ValueCell::text(s)
    }
}

impl From<String> for ValueCell {
    fn from(s: String) -> Self {
        ValueCell::Set(Value::Text(s))
    }
}

impl<T: Into<ValueCell>> From<Option<T>> for ValueCell {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(ValueCell::Unspecified, Into::into)
    }
}

#[cfg(feature = "arrays")]
impl From<ndarray::Array1<f64>> for ValueCell {
    fn from(column: ndarray::Array1<f64>) -> Self {
        ValueCell::seq(column.iter().copied())
    }
}

#[cfg(feature = "arrays")]
impl From<ndarray::Array2<f64>> for ValueCell {
    fn from(table: ndarray::Array2<f64>) -> Self {
        ValueCell::seq(
            table
                .rows()
                .into_iter()
                .map(|row| ValueCell::seq(row.iter().copied())),
        )
    }
}

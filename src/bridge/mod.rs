//! One-directional marshaling of [`ValueCell`]s into a foreign object graph
//!
//! The conversion dispatches on the shape of the value:
//!
//! | Value                         | Foreign object            |
//! |-------------------------------|---------------------------|
//! | `Unspecified`, `None`         | the null singleton        |
//! | `Bool`, `Int`, `Float`, `Text`| the matching primitive    |
//! | `Seq`                         | list, element-wise        |
//! | `Pair`                        | 2-tuple                   |
//! | `Map`                         | mapping, keys via [`ForeignRuntime::key`] |
//!
//! A mapping of arbitrary values is only accepted at the outermost call.
//! Nested mappings must be *leaf maps*: every value a scalar, null, or a
//! sequence of scalars. Anything else is an unsupported shape.
//!
//! [`to_foreign_value`] degrades unsupported shapes to null and logs a
//! warning: a partially valid plot configuration omits the offending setting
//! instead of failing the whole run. [`try_to_foreign_value`] reports them as
//! [`ForeignError::UnsupportedShape`].
//!
//! Errors raised by the runtime itself abort the enclosing list or mapping;
//! the objects already built for it are dropped with it.
//!
//! [`ValueCell`]: crate::value::ValueCell

pub mod runtime;

pub use runtime::{ForeignObject, ObjectGraph};

use crate::value::{Value, ValueCell};
use thiserror::Error;
use tracing::warn;

/// Errors raised while building foreign objects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForeignError {
    #[error("Foreign runtime refused a value: {message}")]
    Runtime { message: String },

    #[error("Unsupported value shape: {shape}")]
    UnsupportedShape { shape: String },
}

/// Object constructors of a foreign runtime.
///
/// Objects are owned by the caller; dropping one releases it in the runtime.
pub trait ForeignRuntime {
    type Object;

    /// The null singleton.
    fn none(&mut self) -> Self::Object;

    fn bool(&mut self, value: bool) -> Result<Self::Object, ForeignError>;

    fn int(&mut self, value: i64) -> Result<Self::Object, ForeignError>;

    fn float(&mut self, value: f64) -> Result<Self::Object, ForeignError>;

    fn str(&mut self, value: &str) -> Result<Self::Object, ForeignError>;

    /// Convert a mapping key. Defaults to a plain string.
    fn key(&mut self, key: &str) -> Result<Self::Object, ForeignError> {
        self.str(key)
    }

    fn list(&mut self, items: Vec<Self::Object>) -> Result<Self::Object, ForeignError>;

    fn tuple(&mut self, first: Self::Object, second: Self::Object)
        -> Result<Self::Object, ForeignError>;

    fn dict(
        &mut self,
        entries: Vec<(Self::Object, Self::Object)>,
    ) -> Result<Self::Object, ForeignError>;

    /// Look up a callable by name.
    fn function(&mut self, name: &str) -> Result<Self::Object, ForeignError>;
}

/// Convert `cell`, degrading unsupported shapes to null.
///
/// # Examples
///
/// ```
/// use fitgrid::bridge::{to_foreign_value, ObjectGraph};
/// use fitgrid::value::ValueCell;
///
/// let cell = ValueCell::map([
///     ("a", ValueCell::Unspecified),
///     ("b", ValueCell::seq([1i64, 2, 3])),
/// ]);
/// let object = to_foreign_value(&cell, &mut ObjectGraph::new()).unwrap();
/// assert_eq!(object.to_json(), serde_json::json!({"a": null, "b": [1, 2, 3]}));
/// ```
pub fn to_foreign_value<R>(cell: &ValueCell, runtime: &mut R) -> Result<R::Object, ForeignError>
where
    R: ForeignRuntime + ?Sized,
{
    Converter { strict: false }.cell(cell, runtime, 0)
}

/// Convert `cell`, failing on unsupported shapes.
pub fn try_to_foreign_value<R>(cell: &ValueCell, runtime: &mut R) -> Result<R::Object, ForeignError>
where
    R: ForeignRuntime + ?Sized,
{
    Converter { strict: true }.cell(cell, runtime, 0)
}

struct Converter {
    strict: bool,
}

impl Converter {
    fn cell<R>(&self, cell: &ValueCell, rt: &mut R, depth: usize) -> Result<R::Object, ForeignError>
    where
        R: ForeignRuntime + ?Sized,
    {
        match cell {
            ValueCell::Unspecified => Ok(rt.none()),
            ValueCell::Set(value) => self.value(value, rt, depth),
        }
    }

    fn value<R>(&self, value: &Value, rt: &mut R, depth: usize) -> Result<R::Object, ForeignError>
    where
        R: ForeignRuntime + ?Sized,
    {
        match value {
            Value::None => Ok(rt.none()),
            Value::Bool(b) => rt.bool(*b),
            Value::Int(i) => rt.int(*i),
            Value::Float(f) => rt.float(*f),
            Value::Text(s) => rt.str(s),
            Value::Pair(a, b) => {
                let first = self.cell(a, rt, depth + 1)?;
                let second = self.cell(b, rt, depth + 1)?;
                rt.tuple(first, second)
            }
            Value::Seq(items) => {
                let mut objects = Vec::with_capacity(items.len());
                for item in items {
                    objects.push(self.cell(item, rt, depth + 1)?);
                }
                rt.list(objects)
            }
            Value::Map(entries) => {
                if depth > 0 && !is_leaf_map(value) {
                    return self.unsupported("nested map of dynamic values", rt);
                }
                let mut objects = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    let key = rt.key(key)?;
                    let item = self.cell(item, rt, depth + 1)?;
                    objects.push((key, item));
                }
                rt.dict(objects)
            }
        }
    }

    fn unsupported<R>(&self, shape: &str, rt: &mut R) -> Result<R::Object, ForeignError>
    where
        R: ForeignRuntime + ?Sized,
    {
        if self.strict {
            return Err(ForeignError::UnsupportedShape {
                shape: shape.to_string(),
            });
        }
        warn!(shape, "unsupported value shape marshaled as null");
        Ok(rt.none())
    }
}

fn is_scalar(cell: &ValueCell) -> bool {
    match cell {
        ValueCell::Unspecified => true,
        ValueCell::Set(v) => matches!(
            v,
            Value::None | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Text(_)
        ),
    }
}

/// A map whose values are scalars or sequences of scalars.
fn is_leaf_map(value: &Value) -> bool {
    let Value::Map(entries) = value else {
        return false;
    };
    entries.values().all(|cell| match cell.value() {
        Some(Value::Seq(items)) => items.iter().all(is_scalar),
        _ => is_scalar(cell),
    })
}

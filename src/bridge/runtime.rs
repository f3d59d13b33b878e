//! In-crate foreign runtime producing a plain object graph

use super::{to_foreign_value, ForeignError, ForeignRuntime};
use crate::value::ValueCell;
use serde_json::{Map, Number, Value as Json};

/// Object built by [`ObjectGraph`].
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignObject {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ForeignObject>),
    Tuple(Box<ForeignObject>, Box<ForeignObject>),
    Dict(Vec<(ForeignObject, ForeignObject)>),
    /// Handle to a named callable.
    Function(String),
}

impl ForeignObject {
    /// Render as JSON. Tuples become arrays, non-string keys are rendered
    /// as their JSON text, non-finite floats as strings.
    pub fn to_json(&self) -> Json {
        match self {
            ForeignObject::None => Json::Null,
            ForeignObject::Bool(b) => Json::Bool(*b),
            ForeignObject::Int(i) => Json::from(*i),
            ForeignObject::Float(f) => Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or_else(|| Json::String(f.to_string())),
            ForeignObject::Str(s) => Json::String(s.clone()),
            ForeignObject::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            ForeignObject::Tuple(a, b) => Json::Array(vec![a.to_json(), b.to_json()]),
            ForeignObject::Dict(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = match key {
                        ForeignObject::Str(s) => s.clone(),
                        other => other.to_json().to_string(),
                    };
                    map.insert(key, value.to_json());
                }
                Json::Object(map)
            }
            ForeignObject::Function(name) => Json::String(format!("<function {}>", name)),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ForeignObject::None)
    }

    /// Value stored under `key` when this is a mapping with string keys.
    pub fn get(&self, key: &str) -> Option<&ForeignObject> {
        match self {
            ForeignObject::Dict(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, ForeignObject::Str(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Runtime that never refuses a value.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    built: usize,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects constructed so far.
    pub fn objects_built(&self) -> usize {
        self.built
    }

    /// Convert a cell; this runtime cannot fail.
    pub fn convert(&mut self, cell: &ValueCell) -> ForeignObject {
        to_foreign_value(cell, self).unwrap_or(ForeignObject::None)
    }

    fn build(&mut self, object: ForeignObject) -> Result<ForeignObject, ForeignError> {
        self.built += 1;
        Ok(object)
    }
}

impl ForeignRuntime for ObjectGraph {
    type Object = ForeignObject;

    fn none(&mut self) -> ForeignObject {
        ForeignObject::None
    }

    fn bool(&mut self, value: bool) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::Bool(value))
    }

    fn int(&mut self, value: i64) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::Int(value))
    }

    fn float(&mut self, value: f64) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::Float(value))
    }

    fn str(&mut self, value: &str) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::Str(value.to_string()))
    }

    fn list(&mut self, items: Vec<ForeignObject>) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::List(items))
    }

    fn tuple(
        &mut self,
        first: ForeignObject,
        second: ForeignObject,
    ) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::Tuple(Box::new(first), Box::new(second)))
    }

    fn dict(
        &mut self,
        entries: Vec<(ForeignObject, ForeignObject)>,
    ) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::Dict(entries))
    }

    fn function(&mut self, name: &str) -> Result<ForeignObject, ForeignError> {
        self.build(ForeignObject::Function(name.to_string()))
    }
}

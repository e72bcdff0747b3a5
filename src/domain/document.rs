//! Schema-less store documents
//!
//! Every field read in the crate goes through the accessors on [`Document`].
//! Paths are dotted (`inventory_info.unitPrice`); a numeric segment indexes
//! into an array (`category_info.0.category`). JSON `null` is treated as
//! absent everywhere.

use crate::domain::errors::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder used for absent text fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Field holding the store-assigned document identity
pub const ID_FIELD: &str = "_id";

/// A JSON object as stored in a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::InvalidDocument(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Store identity of the document, if assigned
    pub fn id(&self) -> Option<String> {
        match self.0.get(ID_FIELD)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }

    /// Looks up a dotted path, treating `null` as absent
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        if current.is_null() {
            None
        } else {
            Some(current)
        }
    }

    /// Whether the path resolves to a non-null value
    pub fn has(&self, path: &str) -> bool {
        self.get_path(path).is_some()
    }

    /// Numeric value at `path`, if the field holds a number
    pub fn number(&self, path: &str) -> Option<f64> {
        self.get_path(path).and_then(Value::as_f64)
    }

    /// Numeric value at `path`, defaulting to 0 when absent or not a number
    pub fn number_or_zero(&self, path: &str) -> f64 {
        self.number(path).unwrap_or(0.0)
    }

    /// Integral value at `path`; floats with no fractional part are accepted
    pub fn integer(&self, path: &str) -> Option<i64> {
        let value = self.get_path(path)?;
        if let Some(i) = value.as_i64() {
            return Some(i);
        }
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    }

    /// Text value at `path`; numbers and booleans are rendered as text
    pub fn text(&self, path: &str) -> Option<String> {
        match self.get_path(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Text value at `path`, defaulting to `N/A`
    pub fn text_or_na(&self, path: &str) -> String {
        self.text(path)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// First present text among several candidate fields
    pub fn text_any(&self, paths: &[&str]) -> Option<String> {
        paths.iter().find_map(|p| self.text(p))
    }

    /// Array at `path`, empty when absent or not an array
    pub fn array(&self, path: &str) -> &[Value] {
        match self.get_path(path) {
            Some(Value::Array(items)) => items,
            _ => &[],
        }
    }

    /// Raw top-level field access (null is returned as-is)
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Sets a top-level field
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Builder-style variant of [`Document::set`]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Removes a top-level field, returning its previous value
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Keeps only the listed top-level keys
    pub fn retain_keys(&mut self, keys: &[String]) {
        self.0.retain(|k, _| keys.iter().any(|keep| keep == k));
    }

    /// Top-level field names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Whether the document has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Short JSON type name for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

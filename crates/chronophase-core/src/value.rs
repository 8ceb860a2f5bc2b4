//! Option values for provider settings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An option value as written in a settings file.
///
/// Deserializes from any of the supported formats without a type tag, so
/// `date_system = 1904` and `date_system = "1904"` both load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Table(IndexMap<String, Value>),
}

impl Value {
    /// Kind of value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Table(_) => "table",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Scalar rendered as text. Integers are written in decimal; other
    /// kinds have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Per-provider options, keyed by option name.
pub type Options = IndexMap<String, Value>;

/// Builder and lookup helpers for [`Options`].
pub trait OptionsExt {
    fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self;

    /// Text form of an option, see [`Value::to_text`].
    fn get_text(&self, key: &str) -> Option<String>;
}

impl OptionsExt for Options {
    fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key.into(), value.into());
        self
    }

    fn get_text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::to_text)
    }
}

//! The closed set of value types a widget model can hold.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

/// Declared type of a model property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    /// Text.
    String,
    /// Double-precision number.
    Number,
    /// True or false.
    Boolean,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
}

impl PropType {
    /// Lowercase type name, as used in schemas and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed model value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text value.
    String(String),
    /// Numeric value. `NaN` is a valid number.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
    /// Object value.
    Object(JsonMap<String, JsonValue>),
    /// Array value.
    Array(Vec<JsonValue>),
}

impl Value {
    /// The type this value satisfies.
    pub fn kind(&self) -> PropType {
        match self {
            Self::String(_) => PropType::String,
            Self::Number(_) => PropType::Number,
            Self::Boolean(_) => PropType::Boolean,
            Self::Object(_) => PropType::Object,
            Self::Array(_) => PropType::Array,
        }
    }

    /// Convert a JSON value. Returns `None` for `null`, which has no model
    /// type.
    pub fn from_json(value: JsonValue) -> Option<Self> {
        Some(match value {
            JsonValue::Null => return None,
            JsonValue::Bool(b) => Self::Boolean(b),
            JsonValue::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(a) => Self::Array(a),
            JsonValue::Object(o) => Self::Object(o),
        })
    }

    /// Convert into a JSON value. Non-finite numbers become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Number(n) => JsonNumber::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number),
            Self::Boolean(b) => JsonValue::Bool(*b),
            Self::Object(o) => JsonValue::Object(o.clone()),
            Self::Array(a) => JsonValue::Array(a.clone()),
        }
    }

    /// The string written to a host attribute when this value is reflected.
    ///
    /// `false` is written as the empty string so that it casts back to
    /// `false` under truthiness.
    pub fn to_attribute(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Boolean(true) => "true".into(),
            Self::Boolean(false) => String::new(),
            Self::Object(o) => JsonValue::Object(o.clone()).to_string(),
            Self::Array(a) => JsonValue::Array(a.clone()).to_string(),
        }
    }

    /// The text, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Name of a JSON value's runtime type, for diagnostics.
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Format a number the way a UI host prints it: integral values without a
/// fractional part.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        String::from(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        "0".into()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<JsonValue>> for Value {
    fn from(a: Vec<JsonValue>) -> Self {
        Self::Array(a)
    }
}

impl From<JsonMap<String, JsonValue>> for Value {
    fn from(o: JsonMap<String, JsonValue>) -> Self {
        Self::Object(o)
    }
}

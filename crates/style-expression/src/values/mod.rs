//! Runtime values produced by evaluating expressions.

pub mod collator;
pub mod color;
pub mod color_spaces;
pub mod formatted;
pub mod padding;
pub mod resolved_image;

pub use collator::Collator;
pub use color::Color;
pub use formatted::{Formatted, FormattedSection};
pub use padding::Padding;
pub use resolved_image::ResolvedImage;

use crate::types::Type;
use crate::util::number_to_string;
use indexmap::IndexMap;
use serde_json::Value as Json;
use std::fmt;

pub type Object = IndexMap<String, Value>;

/// Any value an expression can produce.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Color(Color),
    Collator(Collator),
    Formatted(Formatted),
    Padding(Padding),
    ResolvedImage(ResolvedImage),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// JavaScript truthiness, as used by `to-boolean`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Numeric conversion as done by `to-number`. Returns NaN for values
    /// with no numeric reading.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(items) => match items.as_slice() {
                [] => 0.0,
                [single] if !matches!(single, Value::Array(_)) => single.to_number(),
                _ => f64::NAN,
            },
            _ => f64::NAN,
        }
    }

    /// Strict (`===`) equality: primitives compare by value, everything else
    /// is an object with its own identity and never equals a fresh value.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    /// Converts the value to plain JSON. Non-JSON values use their string
    /// form, except padding which becomes its component array.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Boolean(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Padding(p) => Json::Array(p.values.iter().map(|v| number_to_json(*v)).collect()),
            Value::Collator(_) => Json::Object(serde_json::Map::new()),
            other => Json::String(other.to_string()),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let lower = s.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Integral numbers become JSON integers so `1.0` serialises as `1`.
/// Non-finite numbers have no JSON form and become `null`.
pub fn number_to_json(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Json::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(Json::Number)
        .unwrap_or(Json::Null)
}

/// The runtime type of a value.
pub fn type_of(value: &Value) -> Type {
    match value {
        Value::Null => Type::Null,
        Value::Boolean(_) => Type::Boolean,
        Value::Number(_) => Type::Number,
        Value::String(_) => Type::String,
        Value::Color(_) => Type::Color,
        Value::Collator(_) => Type::Collator,
        Value::Formatted(_) => Type::Formatted,
        Value::Padding(_) => Type::Padding,
        Value::ResolvedImage(_) => Type::ResolvedImage,
        Value::Object(_) => Type::Object,
        Value::Array(items) => {
            let mut item_type: Option<Type> = None;
            for item in items {
                let t = type_of(item);
                match &item_type {
                    None => item_type = Some(t),
                    Some(existing) if *existing == t => {}
                    Some(_) => {
                        item_type = Some(Type::Value);
                        break;
                    }
                }
            }
            Type::array(item_type.unwrap_or(Type::Value), Some(items.len()))
        }
    }
}

/// Whether a raw JSON value can be represented as a literal.
pub fn is_value(json: &Json) -> bool {
    match json {
        Json::Number(n) => n.as_f64().is_some(),
        Json::Array(items) => items.iter().all(is_value),
        Json::Object(map) => map.values().all(is_value),
        _ => true,
    }
}

/// String conversion used by `to-string`, `concat` and formatted text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&number_to_string(*n)),
            Value::String(s) => f.write_str(s),
            Value::Color(c) => write!(f, "{}", c),
            Value::Formatted(t) => write!(f, "{}", t),
            Value::Padding(p) => write!(f, "{}", p),
            Value::ResolvedImage(img) => f.write_str(&img.name),
            Value::Collator(_) => f.write_str("{}"),
            Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(*b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            Json::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::from(&json)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_of_arrays() {
        let v = Value::from(json!([1, 2, 3]));
        assert_eq!(type_of(&v), Type::array(Type::Number, Some(3)));
        let mixed = Value::from(json!([1, "a"]));
        assert_eq!(type_of(&mixed), Type::array(Type::Value, Some(2)));
        assert_eq!(type_of(&Value::Array(vec![])), Type::array(Type::Value, Some(0)));
    }

    #[test]
    fn test_to_string() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Number(1.0).to_string(), "1");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::from(json!({"a": [1, 2]})).to_string(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_strict_equals() {
        assert!(Value::from("a").strict_equals(&Value::from("a")));
        assert!(!Value::Number(1.0).strict_equals(&Value::from("1")));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        let arr = Value::from(json!([1]));
        assert!(!arr.strict_equals(&arr.clone()));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::from(" 12.5 ").to_number(), 12.5);
        assert_eq!(Value::from("").to_number(), 0.0);
        assert_eq!(Value::Boolean(true).to_number(), 1.0);
        assert!(Value::from("inf").to_number().is_nan());
        assert!(Value::from("abc").to_number().is_nan());
        assert_eq!(Value::from(json!([7])).to_number(), 7.0);
        assert!(Value::from(json!([1, 2])).to_number().is_nan());
    }
}

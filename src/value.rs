//! Value model for encoder input.
//!
//! Context and variant payloads arrive as arbitrary nested, dynamically
//! typed data. [`Value`] is the closed set of shapes the encoder accepts:
//! strings, integers, floats, booleans, null, ordered sequences and
//! string-keyed mappings.
//!
//! Native Rust types reach the encoder through the [`ToValue`] trait, so a
//! struct can be encoded without first being rendered to JSON text.
//!
//! # Example
//!
//! ```rust
//! use feature_encoder::{ToValue, Value};
//!
//! struct Offer {
//!     sku: String,
//!     price: f64,
//! }
//!
//! impl ToValue for Offer {
//!     fn to_value(&self) -> Value {
//!         Value::mapping([
//!             ("sku", self.sku.to_value()),
//!             ("price", self.price.to_value()),
//!         ])
//!     }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A dynamically typed, acyclic input value.
///
/// Mapping keys are unique and kept sorted, which makes every traversal of a
/// mapping independent of how it was built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    /// Parse a JSON document into a value.
    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from(parsed))
    }

    /// Build a mapping from `(key, value)` pairs. Later duplicates win.
    pub fn mapping<K, I>(items: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Mapping(items.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a sequence from values.
    pub fn sequence<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Sequence(items.into_iter().collect())
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Sequence(_) | Value::Mapping(_))
    }

    /// Look up a key on a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Convert a scalar to its textual atom.
    ///
    /// This is the single stringification used for categorical feature keys
    /// and for canonical strings of scalars. Returns `None` for containers.
    pub fn to_atom(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(format_float(*f)),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Null => Some("null".to_string()),
            Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

/// Format a float the way JSON serialization prints it (`1.0`, `2.5`,
/// `1e20`). Non-finite values have no JSON form and print as `NaN`, `inf`,
/// `-inf`.
fn format_float(f: f64) -> String {
    match serde_json::Number::from_f64(f) {
        Some(n) => n.to_string(),
        None => f.to_string(),
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Sequence(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Mapping(
                obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => serde_json::Value::String(s),
            Value::Integer(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Null => serde_json::Value::Null,
            Value::Sequence(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Mapping(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Trait for types that can be encoded directly.
///
/// Implement this for domain types so they can be handed to the encoder
/// without a round trip through JSON text.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

// =============================================================================
// Built-in implementations for Rust primitives
// =============================================================================

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::String((*self).to_string())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

macro_rules! impl_to_value_int {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::Integer(*self as i64)
                }
            }
        )*
    };
}

impl_to_value_int!(i8, i16, i32, i64, u8, u16, u32);

// Wider unsigned types fall back to a float when they overflow i64.
impl ToValue for u64 {
    fn to_value(&self) -> Value {
        match i64::try_from(*self) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Float(*self as f64),
        }
    }
}

impl ToValue for usize {
    fn to_value(&self) -> Value {
        (*self as u64).to_value()
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<V: ToValue> ToValue for HashMap<String, V> {
    fn to_value(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<V: ToValue> ToValue for HashMap<&str, V> {
    fn to_value(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(k, v)| ((*k).to_string(), v.to_value()))
                .collect(),
        )
    }
}

impl<V: ToValue> ToValue for BTreeMap<String, V> {
    fn to_value(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_number_kinds() {
        let v = Value::from_json(r#"[1, -1, 2.2, 1.0, 18446744073709551615]"#).unwrap();
        let Value::Sequence(items) = v else {
            panic!("expected sequence");
        };
        assert_eq!(items[0], Value::Integer(1));
        assert_eq!(items[1], Value::Integer(-1));
        assert_eq!(items[2], Value::Float(2.2));
        assert_eq!(items[3], Value::Float(1.0));
        assert_eq!(items[4], Value::Float(18446744073709551615.0));
    }

    #[test]
    fn test_bool_stays_bool() {
        let v = Value::from_json("true").unwrap();
        assert_eq!(v, Value::Boolean(true));
        assert!(v.is_scalar());
    }

    #[test]
    fn test_to_atom() {
        assert_eq!(Value::String("baz".into()).to_atom().as_deref(), Some("baz"));
        assert_eq!(Value::Integer(2).to_atom().as_deref(), Some("2"));
        assert_eq!(Value::Float(1.0).to_atom().as_deref(), Some("1.0"));
        assert_eq!(Value::Float(-2.2).to_atom().as_deref(), Some("-2.2"));
        assert_eq!(Value::Boolean(false).to_atom().as_deref(), Some("false"));
        assert_eq!(Value::Null.to_atom().as_deref(), Some("null"));
        assert_eq!(Value::Float(f64::NAN).to_atom().as_deref(), Some("NaN"));
        assert_eq!(Value::Sequence(vec![]).to_atom(), None);
    }

    #[test]
    fn test_serde_roundtrip_through_json() {
        let v: Value = serde_json::from_str(r#"{"b": [1, null], "a": "x"}"#).unwrap();
        assert_eq!(v.get("a"), Some(&Value::String("x".into())));
        let text = serde_json::to_string(&v).unwrap();
        assert_eq!(text, r#"{"a":"x","b":[1,null]}"#);
    }

    #[test]
    fn test_non_finite_float_serializes_as_null() {
        let json: serde_json::Value = Value::Float(f64::INFINITY).into();
        assert_eq!(json, serde_json::Value::Null);
    }

    #[test]
    fn test_to_value_native_types() {
        let mut m: HashMap<String, Option<i32>> = HashMap::new();
        m.insert("x".to_string(), Some(10));
        m.insert("y".to_string(), None);

        let v = m.to_value();
        assert_eq!(v.get("x"), Some(&Value::Integer(10)));
        assert_eq!(v.get("y"), Some(&Value::Null));

        let list = vec!["a", "b"].to_value();
        assert_eq!(
            list,
            Value::sequence([Value::String("a".into()), Value::String("b".into())])
        );
        assert_eq!(u64::MAX.to_value(), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn test_custom_struct() {
        struct Person {
            name: String,
            age: u32,
        }

        impl ToValue for Person {
            fn to_value(&self) -> Value {
                Value::mapping([
                    ("name", self.name.to_value()),
                    ("age", self.age.to_value()),
                ])
            }
        }

        let p = Person {
            name: "Alice".to_string(),
            age: 30,
        };

        let v = p.to_value();
        assert_eq!(v.type_name(), "mapping");
        assert_eq!(v.get("age"), Some(&Value::Integer(30)));
    }
}

//! Flattener: nested values to flat features.
//!
//! Walks a [`Value`] and produces one `(key, weight)` entry per leaf. The key
//! is the leaf's path with segments joined by [`SEPARATOR`]; categorical
//! leaves carry their value in the key instead of the weight:
//!
//! ```json
//! {"bar": ["baz", null, 1.0, 2]}
//! ```
//!
//! flattens to
//!
//! | key          | weight |
//! |--------------|--------|
//! | `bar.0=baz`  | 1.0    |
//! | `bar.1=null` | 1.0    |
//! | `bar.2`      | 1.0    |
//! | `bar.3`      | 2.0    |
//!
//! Booleans are always one-hot (`flag=true`), never numeric. Empty mappings
//! and sequences contribute nothing.

use std::collections::BTreeMap;

use crate::error::{EncoderError, Result};
use crate::value::Value;

/// Joins path segments in flattened keys.
pub const SEPARATOR: &str = ".";

/// Flat feature mapping, sorted by key.
pub type FlatFeatures = BTreeMap<String, f64>;

/// Flatten a value with an empty prefix.
pub fn flatten(value: &Value) -> Result<FlatFeatures> {
    flatten_with_prefix(value, "")
}

/// Flatten a value under `prefix`.
///
/// An empty prefix means leaves of a top-level scalar get a bare key
/// (`"=string"` for a string, `""` for a number).
pub fn flatten_with_prefix(value: &Value, prefix: &str) -> Result<FlatFeatures> {
    let mut out = FlatFeatures::new();
    flatten_into(value, prefix, &mut out)?;
    Ok(out)
}

/// Flatten `value` into an existing mapping.
///
/// Two paths that spell the same key (a literal `"a.b"` next to
/// `{"a": {"b": ..}}`) have their weights summed.
pub fn flatten_into(value: &Value, path: &str, out: &mut FlatFeatures) -> Result<()> {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                flatten_into(child, &make_path(path, key), out)?;
            }
        }
        Value::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(item, &make_path(path, &i.to_string()), out)?;
            }
        }
        // Matched ahead of the numeric arms: a boolean is never a number here.
        Value::Boolean(b) => {
            emit(out, one_hot(path, if *b { "true" } else { "false" }), 1.0);
        }
        Value::Integer(i) => emit(out, path.to_string(), *i as f64),
        Value::Float(f) => {
            if f.is_nan() {
                return Ok(());
            }
            if f.is_infinite() {
                return Err(EncoderError::UnsupportedValue {
                    path: path.to_string(),
                    reason: format!("non-finite number {f}"),
                });
            }
            emit(out, path.to_string(), *f);
        }
        Value::Null => emit(out, one_hot(path, "null"), 1.0),
        Value::String(s) => emit(out, one_hot(path, s), 1.0),
    }
    Ok(())
}

fn make_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{SEPARATOR}{key}")
    }
}

fn one_hot(path: &str, atom: &str) -> String {
    format!("{path}={atom}")
}

fn emit(out: &mut FlatFeatures, key: String, weight: f64) {
    *out.entry(key).or_insert(0.0) += weight;
}

//! Canonical string identity for values.
//!
//! Two variants that hold the same data must compare equal as strings, no
//! matter how their mappings were built. The rules:
//!
//! - scalars convert directly (`"baz"` → `baz`, `2` → `2`, `true` → `true`)
//! - a mapping with an `"id"` field is identified by that field alone
//! - anything else serializes to compact JSON with sorted mapping keys

use std::collections::HashSet;

use crate::value::Value;

/// Key whose value stands in for the whole mapping.
pub const ID_KEY: &str = "id";

/// Produce the canonical string for a value.
pub fn canonical_string(value: &Value) -> String {
    if let Some(atom) = value.to_atom() {
        return atom;
    }
    if let Some(id) = value.get(ID_KEY) {
        return canonical_string(id);
    }
    canonical_json(value)
}

/// Serialize a value as compact JSON with every mapping's keys sorted.
///
/// Non-finite floats have no JSON spelling and serialize as `null`.
pub fn canonical_json(value: &Value) -> String {
    // Mappings are converted in key order, so the object keys come out sorted.
    serde_json::Value::from(value.clone()).to_string()
}

/// Keep the first value of each canonical identity, in input order.
pub fn dedup_by_canonical<I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = Value>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(canonical_string(v)))
        .collect()
}

//! Seed table: deterministic namespace → hash seed mapping.
//!
//! Every namespace (`"context"`, `"variant"`, or any caller-defined category)
//! owns a seed, so identical keys from different namespaces land in
//! unrelated slots. The table also fixes the feature-space width shared by
//! all namespaces.
//!
//! The per-key hash seeds are derived once, at construction, from
//! `(model_seed, namespace seed, namespace name)`. A table is immutable after
//! construction and is meant to be shared behind an `Arc`.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::error::{EncoderError, Result};

const SLOT_ROLE: &str = "slot";
const SIGN_ROLE: &str = "sign";

/// Seeds used to hash keys of one namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamespaceSeeds {
    /// The seed as supplied in the table.
    pub seed: u64,
    /// Seeds the hash that picks a key's slot.
    pub slot_seed: u64,
    /// Seeds the independent hash that picks a key's sign.
    pub sign_seed: u64,
}

/// Immutable namespace seed table plus feature-space width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedTable {
    namespaces: BTreeMap<String, NamespaceSeeds>,
    n_features: usize,
    model_seed: u64,
}

impl SeedTable {
    /// Build a table from `(namespace, seed)` pairs.
    ///
    /// Fails if there are no namespaces or the width is zero.
    pub fn new<I, K>(seeds: I, n_features: usize, model_seed: u64) -> Result<Self>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        if n_features == 0 {
            return Err(EncoderError::InvalidFeatureCount(n_features));
        }

        let namespaces: BTreeMap<String, NamespaceSeeds> = seeds
            .into_iter()
            .map(|(name, seed)| {
                let name = name.into();
                let seeds = NamespaceSeeds {
                    seed,
                    slot_seed: derive_seed(model_seed, seed, &name, SLOT_ROLE),
                    sign_seed: derive_seed(model_seed, seed, &name, SIGN_ROLE),
                };
                (name, seeds)
            })
            .collect();

        if namespaces.is_empty() {
            return Err(EncoderError::InvalidSeedTable(
                "table defines no namespaces".to_string(),
            ));
        }

        Ok(Self {
            namespaces,
            n_features,
            model_seed,
        })
    }

    /// Build a table from the `table` rows of a model metadata document.
    ///
    /// Row 0 maps namespace names to non-negative integer seeds. Row 1 is the
    /// per-feature metadata row; only its length is used, as the feature
    /// width. Later rows are ignored.
    pub fn from_rows(table: &[serde_json::Value], model_seed: u64) -> Result<Self> {
        let seed_row = table
            .first()
            .and_then(serde_json::Value::as_object)
            .ok_or_else(|| {
                EncoderError::InvalidSeedTable("row 0 must map namespaces to seeds".to_string())
            })?;

        let feature_row = table
            .get(1)
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| {
                EncoderError::InvalidSeedTable("row 1 must be the per-feature array".to_string())
            })?;

        let mut seeds = Vec::with_capacity(seed_row.len());
        for (name, seed) in seed_row {
            let seed = seed.as_u64().ok_or_else(|| {
                EncoderError::InvalidSeedTable(format!(
                    "seed for namespace '{name}' must be a non-negative integer, got {seed}"
                ))
            })?;
            seeds.push((name.clone(), seed));
        }

        Self::new(seeds, feature_row.len(), model_seed)
    }

    /// Width of every encoded vector.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn model_seed(&self) -> u64 {
        self.model_seed
    }

    /// Namespace names, sorted.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Look up the hash seeds of a namespace.
    pub fn seeds(&self, namespace: &str) -> Result<&NamespaceSeeds> {
        self.namespaces
            .get(namespace)
            .ok_or_else(|| EncoderError::UnknownNamespace(namespace.to_string()))
    }
}

/// SHA-256 of `(model_seed || seed || namespace || 0x00 || role)`, first 8
/// bytes little endian.
fn derive_seed(model_seed: u64, seed: u64, namespace: &str, role: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(model_seed.to_le_bytes());
    hasher.update(seed.to_le_bytes());
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(role.as_bytes());
    let hash = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deterministic() {
        let t1 = SeedTable::new([("context", 1u64), ("variant", 2)], 64, 42).unwrap();
        let t2 = SeedTable::new([("variant", 2u64), ("context", 1)], 64, 42).unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_derived_seeds_are_stable() {
        let table = SeedTable::new([("context", 3u64), ("variant", 5)], 32, 1).unwrap();
        assert_eq!(
            table.seeds("context").unwrap(),
            &NamespaceSeeds {
                seed: 3,
                slot_seed: 6997400071677710324,
                sign_seed: 11167897025542989211,
            }
        );
        assert_eq!(
            table.seeds("variant").unwrap(),
            &NamespaceSeeds {
                seed: 5,
                slot_seed: 699519002793261398,
                sign_seed: 16416954071127347622,
            }
        );
    }

    #[test]
    fn test_namespaces_and_seeds_differ() {
        let table = SeedTable::new([("context", 7u64), ("variant", 7)], 64, 42).unwrap();
        let ctx = table.seeds("context").unwrap();
        let var = table.seeds("variant").unwrap();

        // Same table seed, different namespace names
        assert_ne!(ctx.slot_seed, var.slot_seed);
        assert_ne!(ctx.slot_seed, ctx.sign_seed);
    }

    #[test]
    fn test_model_seed_changes_derived_seeds() {
        let a = SeedTable::new([("context", 1u64)], 8, 1).unwrap();
        let b = SeedTable::new([("context", 1u64)], 8, 2).unwrap();
        assert_ne!(
            a.seeds("context").unwrap().slot_seed,
            b.seeds("context").unwrap().slot_seed
        );
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(matches!(
            SeedTable::new([("context", 1u64)], 0, 0),
            Err(EncoderError::InvalidFeatureCount(0))
        ));
        assert!(matches!(
            SeedTable::new(Vec::<(String, u64)>::new(), 8, 0),
            Err(EncoderError::InvalidSeedTable(_))
        ));
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            json!({"context": 11, "variant": 22}),
            json!(["f0", "f1", "f2", "f3", "f4"]),
        ];
        let table = SeedTable::from_rows(&rows, 9).unwrap();
        assert_eq!(table.n_features(), 5);
        assert_eq!(table.model_seed(), 9);
        assert_eq!(table.namespaces().collect::<Vec<_>>(), vec!["context", "variant"]);
        assert_eq!(table.seeds("variant").unwrap().seed, 22);
        assert!(matches!(
            table.seeds("items"),
            Err(EncoderError::UnknownNamespace(name)) if name == "items"
        ));
    }

    #[test]
    fn test_from_rows_errors() {
        let missing_width = vec![json!({"context": 1})];
        assert!(matches!(
            SeedTable::from_rows(&missing_width, 0),
            Err(EncoderError::InvalidSeedTable(_))
        ));

        let empty_width = vec![json!({"context": 1}), json!([])];
        assert!(matches!(
            SeedTable::from_rows(&empty_width, 0),
            Err(EncoderError::InvalidFeatureCount(0))
        ));

        let negative_seed = vec![json!({"context": -1}), json!([0])];
        assert!(matches!(
            SeedTable::from_rows(&negative_seed, 0),
            Err(EncoderError::InvalidSeedTable(_))
        ));
    }
}

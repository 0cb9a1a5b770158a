//! # feature-encoder: hashing-trick rows for decision models
//!
//! Turns nested, dynamically typed context and variant values into
//! fixed-width `f64` rows for a gradient-boosted-tree model. Encoding is
//! deterministic: the same value, seed table and noise level always produce
//! the bit-identical row.
//!
//! ## Quick Start
//!
//! ```rust
//! use feature_encoder::{canonical_string, FeatureEncoder, SeedTable, EncoderConfig, Value};
//!
//! let table = SeedTable::new([("context", 3), ("variant", 5)], 1024, 42)?;
//! let encoder = FeatureEncoder::new(table, EncoderConfig::default())?;
//!
//! let variant = Value::from_json(r#"{"bar": ["baz", null, 1.0, 2]}"#)?;
//! let row = encoder.encode_variant(&variant, 0.0)?;
//! assert_eq!(row.dimensions(), 1024);
//!
//! // Stable identity for deduplication
//! let a = Value::from_json(r#"{"x": 1, "y": 2}"#)?;
//! let b = Value::from_json(r#"{"y": 2, "x": 1}"#)?;
//! assert_eq!(canonical_string(&a), canonical_string(&b));
//! # Ok::<(), feature_encoder::EncoderError>(())
//! ```
//!
//! ## Pipeline
//!
//! - **Flatten**: nested value → `key → weight` ([`flatten()`])
//! - **Hash**: each key → slot of an `n_features` row, contributions summed
//!   ([`FeatureHasher`])
//! - **Compose**: context and variant rows share one row, isolated by
//!   namespace seeds ([`FeatureEncoder`])

pub mod canonical;
pub mod config;
pub mod encoder;
pub mod error;
pub mod flatten;
pub mod hashing;
pub mod metadata;
pub mod seed_table;
pub mod value;
pub mod vector;

// Re-exports for convenience
pub use canonical::{canonical_json, canonical_string, dedup_by_canonical};
pub use config::EncoderConfig;
pub use encoder::{FeatureEncoder, FeatureRequest};
pub use error::{EncoderError, Result};
pub use flatten::{flatten, flatten_with_prefix, FlatFeatures, SEPARATOR};
pub use hashing::{FeatureHasher, Noise};
pub use metadata::ModelMetadata;
pub use seed_table::{NamespaceSeeds, SeedTable};
pub use value::{ToValue, Value};
pub use vector::FeatureVector;

//! Feature encoder: context and variant values to model rows.
//!
//! [`FeatureEncoder`] runs the flattener and the hashing encoder for the two
//! encoding contracts:
//!
//! - **context**: what is known about the decision (user, device, session)
//! - **variant**: the candidate being scored
//!
//! Both land in the same `n_features`-wide row, isolated by their namespace
//! seeds. Because contributions are additive, a context row can be encoded
//! once and reused as the base for many variants.
//!
//! # Example
//!
//! ```rust
//! use feature_encoder::{FeatureEncoder, ModelMetadata, Value};
//!
//! let metadata = ModelMetadata::from_json(
//!     r#"{"table": [{"context": 3, "variant": 5}, [0, 1, 2, 3, 4, 5, 6, 7]], "model_seed": 42}"#,
//! )?;
//! let encoder = FeatureEncoder::from_metadata(&metadata)?;
//!
//! let context = encoder.encode_context(&Value::from_json(r#"{"os": "ios"}"#)?, 0.0)?;
//! let variant = encoder.encode_variant(&Value::from_json(r#"{"theme": "dark"}"#)?, 0.0)?;
//! assert_eq!(context.dimensions(), 8);
//! assert_eq!(variant.dimensions(), 8);
//! # Ok::<(), feature_encoder::EncoderError>(())
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EncoderConfig;
use crate::error::{EncoderError, Result};
use crate::flatten::flatten;
use crate::hashing::{FeatureHasher, Noise};
use crate::metadata::ModelMetadata;
use crate::seed_table::SeedTable;
use crate::value::Value;
use crate::vector::FeatureVector;

/// Values to encode, grouped by contract and keyed by namespace.
///
/// ```json
/// {"context": {"context": {"os": "ios"}}, "variant": {"variant": "dark"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRequest {
    pub context: BTreeMap<String, Value>,
    pub variant: BTreeMap<String, Value>,
}

impl FeatureRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, namespace: impl Into<String>, value: Value) -> Self {
        self.context.insert(namespace.into(), value);
        self
    }

    pub fn with_variant(mut self, namespace: impl Into<String>, value: Value) -> Self {
        self.variant.insert(namespace.into(), value);
        self
    }
}

/// Encoder for context and variant values.
///
/// Immutable after construction. Clones share the seed table, and one
/// instance can serve any number of threads.
#[derive(Clone, Debug)]
pub struct FeatureEncoder {
    hasher: FeatureHasher,
    config: EncoderConfig,
}

impl FeatureEncoder {
    /// Create an encoder over a seed table.
    ///
    /// Fails if the config is invalid or the table lacks the configured
    /// context or variant namespace.
    pub fn new(table: SeedTable, config: EncoderConfig) -> Result<Self> {
        Self::with_shared_table(Arc::new(table), config)
    }

    /// Create an encoder over a table already shared elsewhere.
    pub fn with_shared_table(table: Arc<SeedTable>, config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        for namespace in [&config.context_namespace, &config.variant_namespace] {
            if !table.contains(namespace) {
                return Err(EncoderError::MissingNamespace(namespace.clone()));
            }
        }

        let namespaces: Vec<&str> = table.namespaces().collect();
        debug!(
            n_features = table.n_features(),
            model_seed = table.model_seed(),
            ?namespaces,
            alternate_sign = config.alternate_sign,
            "feature_encoder_created"
        );

        Ok(Self {
            hasher: FeatureHasher::new(table, config.alternate_sign),
            config,
        })
    }

    /// Create an encoder from a parsed model metadata document.
    pub fn from_metadata(metadata: &ModelMetadata) -> Result<Self> {
        Self::new(metadata.seed_table()?, metadata.encoder_config())
    }

    /// Create an encoder from a model metadata file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_metadata(&ModelMetadata::load(path)?)
    }

    /// Width of every encoded row.
    pub fn n_features(&self) -> usize {
        self.hasher.n_features()
    }

    pub fn model_seed(&self) -> u64 {
        self.hasher.table().model_seed()
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn seed_table(&self) -> &SeedTable {
        self.hasher.table()
    }

    // =========================================================================
    // Encoding
    // =========================================================================

    /// Encode a context value into a fresh row.
    pub fn encode_context(&self, context: &Value, noise: f64) -> Result<FeatureVector> {
        self.encode_namespace(&self.config.context_namespace, context, noise)
    }

    /// Encode a variant value into a fresh row.
    pub fn encode_variant(&self, variant: &Value, noise: f64) -> Result<FeatureVector> {
        self.encode_namespace(&self.config.variant_namespace, variant, noise)
    }

    /// Encode a value under any namespace of the seed table.
    pub fn encode_namespace(
        &self,
        namespace: &str,
        value: &Value,
        noise: f64,
    ) -> Result<FeatureVector> {
        let result = Noise::new(noise).and_then(|noise| {
            let mut row = FeatureVector::zeros(self.n_features());
            self.encode_value_into(namespace, value, &noise, &mut row)?;
            Ok(row)
        });
        log_failure(namespace, result)
    }

    /// Encode a full request into one row.
    ///
    /// With `base_context`, the context half of `request` is ignored and the
    /// variant values are added onto a copy of that precomputed row. Without
    /// it, the context values are encoded fresh.
    pub fn encode_features(
        &self,
        request: &FeatureRequest,
        noise: f64,
        base_context: Option<&FeatureVector>,
    ) -> Result<FeatureVector> {
        let noise = Noise::new(noise)?;
        let mut row = match base_context {
            Some(base) => self.checked_base(base)?,
            None => self.encode_values(&request.context, &noise)?,
        };
        self.encode_values_into(&request.variant, &noise, &mut row)?;
        Ok(row)
    }

    /// Encode many variants against one context.
    ///
    /// The context is encoded once; each returned row is that context plus
    /// one variant.
    pub fn encode_variants(
        &self,
        context: &BTreeMap<String, Value>,
        variants: &[BTreeMap<String, Value>],
        noise: f64,
    ) -> Result<Vec<FeatureVector>> {
        let noise = Noise::new(noise)?;
        let base = self.encode_values(context, &noise)?;
        variants
            .iter()
            .map(|variant| {
                let mut row = base.clone();
                self.encode_values_into(variant, &noise, &mut row)?;
                Ok(row)
            })
            .collect()
    }

    fn checked_base(&self, base: &FeatureVector) -> Result<FeatureVector> {
        if base.dimensions() != self.n_features() {
            return Err(EncoderError::DimensionMismatch {
                expected: self.n_features(),
                got: base.dimensions(),
            });
        }
        Ok(base.clone())
    }

    fn encode_values(
        &self,
        values: &BTreeMap<String, Value>,
        noise: &Noise,
    ) -> Result<FeatureVector> {
        let mut row = FeatureVector::zeros(self.n_features());
        self.encode_values_into(values, noise, &mut row)?;
        Ok(row)
    }

    fn encode_values_into(
        &self,
        values: &BTreeMap<String, Value>,
        noise: &Noise,
        row: &mut FeatureVector,
    ) -> Result<()> {
        for (namespace, value) in values {
            log_failure(
                namespace,
                self.encode_value_into(namespace, value, noise, row),
            )?;
        }
        Ok(())
    }

    fn encode_value_into(
        &self,
        namespace: &str,
        value: &Value,
        noise: &Noise,
        row: &mut FeatureVector,
    ) -> Result<()> {
        let flat = flatten(value)?;
        self.hasher.encode_into(&flat, namespace, noise, row)
    }
}

fn log_failure<T>(namespace: &str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        warn!(namespace, error = %err, "encode_failure");
    }
    result
}

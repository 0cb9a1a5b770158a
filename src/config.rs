//! Encoder configuration.
//!
//! Holds the tunables that are not part of the seed table itself: which
//! namespaces carry the context and variant contracts, and whether hashed
//! contributions get an alternating sign. Pure data; no I/O.

use serde::{Deserialize, Serialize};

use crate::error::{EncoderError, Result};

/// Namespace encoded by [`encode_context`](crate::FeatureEncoder::encode_context).
pub const DEFAULT_CONTEXT_NAMESPACE: &str = "context";

/// Namespace encoded by [`encode_variant`](crate::FeatureEncoder::encode_variant).
pub const DEFAULT_VARIANT_NAMESPACE: &str = "variant";

/// Configuration for a [`FeatureEncoder`](crate::FeatureEncoder).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EncoderConfig {
    /// Seed-table namespace used for context values.
    pub context_namespace: String,
    /// Seed-table namespace used for variant values.
    pub variant_namespace: String,
    /// Flip the sign of each contribution from a second hash of its key.
    ///
    /// Colliding keys then cancel out in expectation instead of piling up.
    pub alternate_sign: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            context_namespace: DEFAULT_CONTEXT_NAMESPACE.to_string(),
            variant_namespace: DEFAULT_VARIANT_NAMESPACE.to_string(),
            alternate_sign: true,
        }
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.context_namespace = namespace.into();
        self
    }

    pub fn with_variant_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.variant_namespace = namespace.into();
        self
    }

    pub fn with_alternate_sign(mut self, alternate_sign: bool) -> Self {
        self.alternate_sign = alternate_sign;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.context_namespace.is_empty() {
            return Err(EncoderError::InvalidConfig(
                "context namespace must not be empty".to_string(),
            ));
        }
        if self.variant_namespace.is_empty() {
            return Err(EncoderError::InvalidConfig(
                "variant namespace must not be empty".to_string(),
            ));
        }
        if self.context_namespace == self.variant_namespace {
            return Err(EncoderError::InvalidConfig(format!(
                "context and variant share namespace '{}'",
                self.context_namespace
            )));
        }
        Ok(())
    }
}

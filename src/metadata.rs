//! Model metadata: the file-backed source of the seed table.
//!
//! The training pipeline exports a JSON document next to each model:
//!
//! ```json
//! {
//!   "table": [{"context": 3, "variant": 5}, ["f0", "f1", "f2", "f3"]],
//!   "model_seed": 42,
//!   "alternate_sign": true
//! }
//! ```
//!
//! The encoder only reads it, once, at construction.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EncoderConfig;
use crate::error::{EncoderError, Result};
use crate::seed_table::SeedTable;

fn default_alternate_sign() -> bool {
    true
}

/// Parsed model metadata document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    /// Seed table rows; see [`SeedTable::from_rows`].
    pub table: Vec<serde_json::Value>,
    /// Global seed mixed into every namespace's hash seeds.
    pub model_seed: u64,
    #[serde(default = "default_alternate_sign")]
    pub alternate_sign: bool,
}

impl ModelMetadata {
    /// Parse metadata from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load metadata from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| EncoderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            rows = metadata.table.len(),
            model_seed = metadata.model_seed,
            "model_metadata_loaded"
        );
        Ok(metadata)
    }

    /// Build the seed table described by this document.
    pub fn seed_table(&self) -> Result<SeedTable> {
        SeedTable::from_rows(&self.table, self.model_seed)
    }

    /// Encoder configuration implied by this document.
    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig::default().with_alternate_sign(self.alternate_sign)
    }
}

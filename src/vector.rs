//! Feature vector type.
//!
//! A fixed-width row of `f64` features, the shape the downstream model
//! consumes. Columns are indexed `0..n_features`.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::error::{EncoderError, Result};

/// A fixed-width feature row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    /// Create a new zero vector of given width.
    pub fn zeros(dimensions: usize) -> Self {
        Self {
            data: vec![0.0; dimensions],
        }
    }

    /// Create a vector from raw data.
    pub fn from_data(data: Vec<f64>) -> Self {
        Self { data }
    }

    /// Get the width.
    pub fn dimensions(&self) -> usize {
        self.data.len()
    }

    /// Get the raw data as a slice.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get mutable access to the raw data.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.data
    }

    /// Add `other` element-wise. Widths must match.
    pub fn add(&mut self, other: &FeatureVector) -> Result<()> {
        if self.dimensions() != other.dimensions() {
            return Err(EncoderError::DimensionMismatch {
                expected: self.dimensions(),
                got: other.dimensions(),
            });
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }

    /// Count non-zero elements.
    pub fn nnz(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0.0).count()
    }

    pub fn is_zero(&self) -> bool {
        self.nnz() == 0
    }

    /// Non-zero columns as `column → value`.
    pub fn to_sparse(&self) -> BTreeMap<usize, f64> {
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(|(i, &v)| (i, v))
            .collect()
    }

    /// Every column keyed by its decimal index.
    ///
    /// This is the JSON object shape used by recorded reference rows.
    pub fn to_column_map(&self) -> BTreeMap<String, f64> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, &v)| (i.to_string(), v))
            .collect()
    }

    /// Bitwise equality, distinguishing `0.0` from `-0.0` and comparing NaN
    /// payloads.
    pub fn bit_eq(&self, other: &FeatureVector) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<usize> for FeatureVector {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

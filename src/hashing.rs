//! Hashing encoder: flat features into a fixed-width vector.
//!
//! Each flattened key is hashed with its namespace's slot seed and reduced
//! modulo the feature width. Contributions that land in the same slot are
//! **summed**, never overwritten:
//!
//! ```text
//! slot(key) = xxh3(key, slot_seed) % n_features
//! sign(key) = +1 if the top bit of xxh3(key, sign_seed) is clear, else -1
//! row[slot(key)] += sign(key) * sprinkle(weight)
//! ```
//!
//! # Noise
//!
//! A noise level in `[0, 1]` perturbs every weight by a tiny, reproducible
//! amount, `sprinkle(x) = (x + shift) * scale` with
//! `shift = f32(noise * 2^-142)` and `scale = f32(1 + noise * 2^-17)`. Both
//! factors are narrowed to `f32` and widened back; reference rows depend on
//! that rounding. The shift only survives rounding when `x` is zero, which
//! keeps a present zero distinguishable from a missing feature. Noise `0.0`
//! leaves weights bit-identical.

use std::collections::BTreeMap;
use std::sync::Arc;

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::error::{EncoderError, Result};
use crate::flatten::FlatFeatures;
use crate::seed_table::{NamespaceSeeds, SeedTable};
use crate::vector::FeatureVector;

/// 2^-142, built from its bit pattern so it is exact everywhere.
fn noise_shift_unit() -> f64 {
    f64::from_bits((1023 - 142) << 52)
}

/// 2^-17.
fn noise_scale_unit() -> f64 {
    f64::from_bits((1023 - 17) << 52)
}

/// Validated noise level with its precomputed shift and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Noise {
    level: f64,
    shift: f64,
    scale: f64,
}

impl Noise {
    /// No perturbation.
    pub const NONE: Noise = Noise {
        level: 0.0,
        shift: 0.0,
        scale: 1.0,
    };

    /// Validate a noise level. NaN and values outside `[0, 1]` are rejected.
    pub fn new(level: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&level) {
            return Err(EncoderError::InvalidNoise(level));
        }
        Ok(Self {
            level,
            shift: f64::from((level * noise_shift_unit()) as f32),
            scale: f64::from((1.0 + level * noise_scale_unit()) as f32),
        })
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    /// Apply the perturbation to one weight.
    #[inline]
    pub fn sprinkle(&self, x: f64) -> f64 {
        (x + self.shift) * self.scale
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::NONE
    }
}

/// Hashing-trick encoder bound to a shared seed table.
///
/// Cloning is cheap; clones share the table.
#[derive(Clone, Debug)]
pub struct FeatureHasher {
    table: Arc<SeedTable>,
    alternate_sign: bool,
}

impl FeatureHasher {
    pub fn new(table: Arc<SeedTable>, alternate_sign: bool) -> Self {
        Self {
            table,
            alternate_sign,
        }
    }

    pub fn table(&self) -> &SeedTable {
        &self.table
    }

    pub fn n_features(&self) -> usize {
        self.table.n_features()
    }

    pub fn alternate_sign(&self) -> bool {
        self.alternate_sign
    }

    /// Slot and sign a key hashes to within a namespace.
    pub fn slot(&self, namespace: &str, key: &str) -> Result<(usize, f64)> {
        let seeds = self.table.seeds(namespace)?;
        Ok(slot_with(seeds, self.table.n_features(), self.alternate_sign, key))
    }

    /// Encode flat features of `namespace` into a fresh zero vector.
    pub fn encode(
        &self,
        flat: &FlatFeatures,
        namespace: &str,
        noise: &Noise,
    ) -> Result<FeatureVector> {
        let mut out = FeatureVector::zeros(self.table.n_features());
        self.encode_into(flat, namespace, noise, &mut out)?;
        Ok(out)
    }

    /// Accumulate flat features of `namespace` onto `out`.
    ///
    /// `out` must be exactly `n_features` wide. On error `out` is left
    /// untouched.
    pub fn encode_into(
        &self,
        flat: &FlatFeatures,
        namespace: &str,
        noise: &Noise,
        out: &mut FeatureVector,
    ) -> Result<()> {
        accumulate(&self.table, self.alternate_sign, flat, namespace, noise, out)
    }
}

fn slot_with(
    seeds: &NamespaceSeeds,
    n_features: usize,
    alternate_sign: bool,
    key: &str,
) -> (usize, f64) {
    let bytes = key.as_bytes();
    let width = n_features as u64;
    let index = (xxh3_64_with_seed(bytes, seeds.slot_seed) % width) as usize;
    let sign = if alternate_sign && xxh3_64_with_seed(bytes, seeds.sign_seed) >> 63 == 1 {
        -1.0
    } else {
        1.0
    };
    (index, sign)
}

/// Shared accumulation over a borrowed table.
///
/// Touched slots are summed on the side in key order and only written back
/// once every slot is known to stay finite.
fn accumulate(
    table: &SeedTable,
    alternate_sign: bool,
    flat: &FlatFeatures,
    namespace: &str,
    noise: &Noise,
    out: &mut FeatureVector,
) -> Result<()> {
    if out.dimensions() != table.n_features() {
        return Err(EncoderError::DimensionMismatch {
            expected: table.n_features(),
            got: out.dimensions(),
        });
    }
    let seeds = table.seeds(namespace)?;

    let mut touched: BTreeMap<usize, f64> = BTreeMap::new();
    for (key, &weight) in flat {
        if weight.is_nan() {
            continue;
        }
        if weight.is_infinite() {
            return Err(EncoderError::UnsupportedValue {
                path: key.clone(),
                reason: format!("non-finite weight {weight}"),
            });
        }
        let (index, sign) = slot_with(seeds, table.n_features(), alternate_sign, key);
        let cell = touched.entry(index).or_insert(out[index]);
        *cell += sign * noise.sprinkle(weight);
        if !cell.is_finite() {
            return Err(EncoderError::UnsupportedValue {
                path: key.clone(),
                reason: format!("slot {index} overflowed to {cell}"),
            });
        }
    }

    for (index, value) in touched {
        out[index] = value;
    }
    Ok(())
}

/// Encode flat features with alternating sign on.
///
/// Convenience over [`FeatureHasher`] for one-off calls; `noise` is the raw
/// level in `[0, 1]`. The table is borrowed, not copied.
pub fn encode(
    flat: &FlatFeatures,
    namespace: &str,
    seed_table: &SeedTable,
    noise: f64,
) -> Result<FeatureVector> {
    let noise = Noise::new(noise)?;
    let mut out = FeatureVector::zeros(seed_table.n_features());
    accumulate(seed_table, true, flat, namespace, &noise, &mut out)?;
    Ok(out)
}

// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Block codec: perturb a block's embeddable coefficients and read its bit.
//!
//! The same [`decide_bit`] rule drives the optimizer's fitness and the final
//! extraction, so the two can never disagree about what a block carries.

use crate::error::{GboError, Result};
use crate::scheme::Scheme;
use crate::transform::{self, Block, CoefficientVector, BLOCK_LEN};

/// Floor for a decision-region magnitude sum. Keeps the fitness ratio finite
/// on flat blocks whose AC energy is exactly zero.
pub const REGION_FLOOR: f64 = 1e-3;

/// PSNR reported for two identical blocks (MSE exactly zero).
pub const IDENTICAL_PSNR: f64 = 100.0;

/// Peak pixel value for PSNR.
const MAX_PIXEL: f64 = 255.0;

/// Add `delta` to the magnitude of `coeff`, keeping the original sign.
///
/// Returns `sign(coeff) * | |coeff| + delta |`, with zero counted as positive.
/// A negative `delta` larger than `|coeff|` does not flip the sign: the
/// magnitude folds back up through zero, so the response is V-shaped around
/// `delta = -|coeff|`.
pub fn fold_magnitude(coeff: f64, delta: f64) -> f64 {
    let sign = if coeff >= 0.0 { 1.0 } else { -1.0 };
    sign * (coeff.abs() + delta).abs()
}

/// Apply a perturbation vector to `block` under `scheme` and return the new block.
///
/// Component `idx` of `vector` is folded into the coefficient at
/// `scheme.embed_region[idx]`; all other coefficients pass through.
///
/// # Errors
/// [`GboError::DimensionMismatch`] if `vector.len()` differs from the
/// scheme's embedding region size.
pub fn apply_vector(vector: &[f64], block: &Block, scheme: &Scheme) -> Result<Block> {
    check_dimension(vector, scheme)?;
    Ok(apply_to_coeffs(&transform::forward(block), vector, scheme))
}

/// [`apply_vector`] starting from the already-transformed original block.
///
/// The optimizer evaluates thousands of vectors against one block, so the
/// forward transform of the original is computed once and reused here.
pub(crate) fn apply_to_coeffs(original: &CoefficientVector, vector: &[f64], scheme: &Scheme) -> Block {
    debug_assert_eq!(vector.len(), scheme.dimension());
    let mut coeffs = *original;
    for (&pos, &delta) in scheme.embed_region.iter().zip(vector) {
        coeffs[pos] = fold_magnitude(coeffs[pos], delta);
    }
    transform::inverse_vector(&coeffs)
}

pub(crate) fn check_dimension(vector: &[f64], scheme: &Scheme) -> Result<()> {
    if vector.len() != scheme.dimension() {
        return Err(GboError::DimensionMismatch { expected: scheme.dimension(), actual: vector.len() });
    }
    Ok(())
}

/// Sum of coefficient magnitudes over `region`, floored at [`REGION_FLOOR`].
pub fn region_sum(coeffs: &CoefficientVector, region: &[usize]) -> f64 {
    let sum: f64 = region.iter().map(|&p| coeffs[p].abs()).sum();
    sum.max(REGION_FLOOR)
}

/// Floored `(s1, s0)` energies of a coefficient vector under `scheme`.
pub fn region_energies(coeffs: &CoefficientVector, scheme: &Scheme) -> (f64, f64) {
    (region_sum(coeffs, &scheme.s1_region), region_sum(coeffs, &scheme.s0_region))
}

/// Recover the bit carried by `block`: 1 if the s1 energy is at least the s0
/// energy, else 0. Pure and deterministic.
pub fn decide_bit(block: &Block, scheme: &Scheme) -> u8 {
    let (s1, s0) = region_energies(&transform::forward(block), scheme);
    if s1 >= s0 { 1 } else { 0 }
}

/// Per-block PSNR over the 64 pixels; [`IDENTICAL_PSNR`] when MSE is zero.
pub fn block_psnr(original: &Block, modified: &Block) -> f64 {
    let se: f64 = original
        .pixels()
        .iter()
        .zip(modified.pixels().iter())
        .map(|(&a, &b)| {
            let d = a as f64 - b as f64;
            d * d
        })
        .sum();
    let mse = se / BLOCK_LEN as f64;
    if mse == 0.0 {
        return IDENTICAL_PSNR;
    }
    10.0 * (MAX_PIXEL * MAX_PIXEL / mse).log10()
}

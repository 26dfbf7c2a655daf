// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Pixel blocks and their frequency-domain representation.
//!
//! A [`Block`] is an 8×8 grid of 8-bit intensities. [`forward`] turns it into a
//! [`CoefficientVector`]: the orthonormal DCT-II of the grid, reordered by
//! [`zigzag::POSITION_TO_GRID`]. [`inverse`] reverses the reorder, applies the
//! inverse DCT and rounds/clamps back to pixel range.

pub mod dct;
pub mod zigzag;

use crate::error::{GboError, Result};

/// Side length of a block.
pub const BLOCK_DIM: usize = 8;

/// Number of pixels (and coefficients) in a block.
pub const BLOCK_LEN: usize = BLOCK_DIM * BLOCK_DIM;

/// 64 transform coefficients in vector (reordered) order.
pub type CoefficientVector = [f64; BLOCK_LEN];

/// An 8×8 block of grayscale pixels, row-major.
///
/// Blocks are never mutated by the codec or the optimizer: every operation
/// reads the original and returns a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block {
    pixels: [u8; BLOCK_LEN],
}

impl Block {
    pub fn new(pixels: [u8; BLOCK_LEN]) -> Self {
        Self { pixels }
    }

    /// A block with every pixel set to `value`.
    pub fn filled(value: u8) -> Self {
        Self { pixels: [value; BLOCK_LEN] }
    }

    /// Build a block from a `rows × cols` row-major 8-bit slice.
    ///
    /// # Errors
    /// [`GboError::InvalidShape`] unless `rows == cols == 8` and the slice
    /// holds exactly 64 samples.
    pub fn from_pixels(rows: usize, cols: usize, pixels: &[u8]) -> Result<Self> {
        check_shape(rows, cols, pixels.len())?;
        let mut out = [0u8; BLOCK_LEN];
        out.copy_from_slice(pixels);
        Ok(Self { pixels: out })
    }

    /// Build a block from floating-point samples.
    ///
    /// Samples must be finite integral values in 0–255; anything else is a
    /// wrong sample representation rather than a pixel.
    ///
    /// # Errors
    /// [`GboError::InvalidShape`] for a non-8×8 shape,
    /// [`GboError::InvalidPixelType`] for a non-integral or out-of-range sample.
    pub fn from_samples(rows: usize, cols: usize, samples: &[f64]) -> Result<Self> {
        check_shape(rows, cols, samples.len())?;
        let mut out = [0u8; BLOCK_LEN];
        for (dst, &s) in out.iter_mut().zip(samples) {
            if !s.is_finite() || s.fract() != 0.0 || !(0.0..=255.0).contains(&s) {
                return Err(GboError::InvalidPixelType);
            }
            *dst = s as u8;
        }
        Ok(Self { pixels: out })
    }

    /// Row-major pixel values.
    pub fn pixels(&self) -> &[u8; BLOCK_LEN] {
        &self.pixels
    }

    /// Pixel at (`row`, `col`), both 0–7.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        debug_assert!(row < BLOCK_DIM && col < BLOCK_DIM);
        self.pixels[row * BLOCK_DIM + col]
    }

    /// Pixels widened to `f64`, row-major.
    pub fn to_f64(&self) -> [f64; BLOCK_LEN] {
        let mut out = [0.0f64; BLOCK_LEN];
        for (dst, &p) in out.iter_mut().zip(self.pixels.iter()) {
            *dst = p as f64;
        }
        out
    }
}

fn check_shape(rows: usize, cols: usize, len: usize) -> Result<()> {
    if rows != BLOCK_DIM || cols != BLOCK_DIM || len != BLOCK_LEN {
        return Err(GboError::InvalidShape { rows, cols });
    }
    Ok(())
}

/// Block → coefficient vector: DCT-II, then reorder so that position `k`
/// holds the coefficient at row-major index `POSITION_TO_GRID[k]`.
pub fn forward(block: &Block) -> CoefficientVector {
    zigzag::to_vector(&dct::dct_8x8(&block.to_f64()))
}

/// Coefficient vector → block: reverse reorder, inverse DCT, round and clamp.
///
/// # Errors
/// [`GboError::InvalidVectorSize`] if `coeffs` does not hold exactly 64 values.
pub fn inverse(coeffs: &[f64]) -> Result<Block> {
    let coeffs: &CoefficientVector = coeffs
        .try_into()
        .map_err(|_| GboError::InvalidVectorSize(coeffs.len()))?;
    Ok(inverse_vector(coeffs))
}

/// Infallible form of [`inverse`] for callers that already hold 64 values.
pub(crate) fn inverse_vector(coeffs: &CoefficientVector) -> Block {
    let samples = dct::idct_8x8(&zigzag::to_grid(coeffs));
    let mut pixels = [0u8; BLOCK_LEN];
    for (dst, &s) in pixels.iter_mut().zip(samples.iter()) {
        *dst = to_pixel(s);
    }
    Block { pixels }
}

/// Round half to even and saturate to 0–255. NaN maps to 0.
fn to_pixel(sample: f64) -> u8 {
    if sample.is_nan() {
        return 0;
    }
    sample.round_ties_even().clamp(0.0, 255.0) as u8
}

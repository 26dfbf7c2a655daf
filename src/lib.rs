// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # phasm-gbo
//!
//! Pure-Rust block watermarking engine that hides one bit per 8×8 pixel
//! block. A Gradient-Based Optimizer (GBO) searches for a small perturbation
//! of selected DCT coefficient magnitudes that makes the block decode to the
//! target bit while keeping the block's PSNR high.
//!
//! - **Block core** (`transform`, `scheme`, `codec`, `fitness`, `optimizer`):
//!   embed a bit into one block with [`optimize_block`], read it back with
//!   [`decide_bit`].
//! - **Image layer** (`image`, `watermark`, `metrics`): tile a grayscale
//!   image, cycle a watermark over its blocks, recover it by majority vote,
//!   and score the result.
//! - **Attacks** (`attack`): brightness, contrast, noise, equalization,
//!   sharpening and smoothing degradations for robustness checks.
//!
//! Randomness is always injected: pass any [`rand::Rng`]. Seeded
//! [`rand_chacha::ChaCha20Rng`] instances give bit-identical results on every
//! platform. With the default `parallel` feature, image embedding spreads
//! blocks across the rayon pool without changing the output.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use phasm_gbo::{decide_bit, optimize_block, Block};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let block = Block::filled(128);
//! let mut rng = ChaCha20Rng::seed_from_u64(7);
//! let marked = optimize_block(&block, 0, 0, &mut rng).unwrap();
//! assert_eq!(decide_bit(&marked, 0).unwrap(), 0);
//! ```

pub mod attack;
pub mod codec;
pub mod error;
mod filter;
pub mod fitness;
pub mod image;
pub mod metrics;
pub mod optimizer;
pub mod progress;
pub mod scheme;
pub mod transform;
pub mod watermark;

use rand::Rng;

pub use attack::Attack;
pub use error::{GboError, Result};
pub use fitness::{fitness, FitnessEvaluator};
pub use image::{assemble_blocks, split_blocks, GrayImage};
pub use optimizer::population::{Population, Worst};
pub use optimizer::random::generate_random_indices;
pub use optimizer::{BlockOutcome, Gbo, GboConfig};
pub use progress::Progress;
pub use scheme::{Scheme, SCHEMES};
pub use transform::{forward, inverse, Block, CoefficientVector};
pub use watermark::{
    bits_from_image, embed_bits, embed_bits_with_progress, embed_uniform_bit, extract_bits, image_from_bits,
};

/// Embed `target_bit` into `block` under scheme `scheme_id` with the default
/// configuration and return the new block.
///
/// # Errors
/// [`GboError::InvalidBitValue`] or [`GboError::InvalidScheme`]. Both are
/// checked before any random draw.
pub fn optimize_block<R: Rng + ?Sized>(block: &Block, target_bit: u8, scheme_id: usize, rng: &mut R) -> Result<Block> {
    error::check_bit(target_bit)?;
    let scheme = Scheme::get(scheme_id)?;
    Ok(Gbo::default().optimize(block, target_bit, scheme, rng)?.block)
}

/// Read the bit `block` carries under scheme `scheme_id`.
///
/// # Errors
/// [`GboError::InvalidScheme`] for an unknown id.
pub fn decide_bit(block: &Block, scheme_id: usize) -> Result<u8> {
    Ok(codec::decide_bit(block, Scheme::get(scheme_id)?))
}

/// Apply a perturbation vector to `block` under scheme `scheme_id`.
///
/// # Errors
/// [`GboError::InvalidScheme`] or [`GboError::DimensionMismatch`].
pub fn apply_vector(vector: &[f64], block: &Block, scheme_id: usize) -> Result<Block> {
    codec::apply_vector(vector, block, Scheme::get(scheme_id)?)
}

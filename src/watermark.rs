// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Image-level watermark embedding and extraction.
//!
//! Block `i` of the cover (raster order) carries watermark bit
//! `i % bits.len()`, so a watermark smaller than the block count is repeated
//! across the image. Extraction reads every block with [`decide_bit`] and
//! takes a per-bit majority vote over its copies.
//!
//! Each block is optimized with its own ChaCha20 stream (the caller's seed,
//! stream = block index), so output is identical whether blocks run serially
//! or on the rayon pool.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::codec::decide_bit;
use crate::error::{check_bit, GboError, Result};
use crate::image::{assemble_blocks, split_blocks, GrayImage};
use crate::optimizer::{Gbo, GboConfig};
use crate::progress::Progress;
use crate::scheme::Scheme;
use crate::transform::Block;

/// Pixels above this binarize to 1.
const BINARIZE_THRESHOLD: u8 = 127;

/// Binarize a watermark image: pixel > 127 → 1, else 0 (row-major).
pub fn bits_from_image(image: &GrayImage) -> Vec<u8> {
    image.pixels().iter().map(|&p| u8::from(p > BINARIZE_THRESHOLD)).collect()
}

/// Render watermark bits as a black/white image (1 → 255, 0 → 0).
///
/// # Errors
/// [`GboError::SizeMismatch`] if `bits.len() != width * height`.
pub fn image_from_bits(width: usize, height: usize, bits: &[u8]) -> Result<GrayImage> {
    let pixels = bits.iter().map(|&b| if b != 0 { 255 } else { 0 }).collect();
    GrayImage::new(width, height, pixels)
}

/// ChaCha20 generator for one block: the caller's seed on stream `index`.
pub fn block_rng(seed: &[u8; 32], index: usize) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::from_seed(*seed);
    rng.set_stream(index as u64);
    rng
}

/// Embed `bits` into `cover`, cycling the bits over its blocks.
///
/// # Errors
/// - [`GboError::EmptyWatermark`] if `bits` is empty.
/// - [`GboError::InvalidBitValue`] for any bit other than 0/1.
/// - [`GboError::InvalidScheme`] for an unknown scheme.
/// - [`GboError::InvalidImageSize`] if the cover is not block-aligned.
/// - Whatever [`GboConfig::validate`] rejects.
pub fn embed_bits(
    cover: &GrayImage,
    bits: &[u8],
    scheme_id: usize,
    config: &GboConfig,
    seed: &[u8; 32],
) -> Result<GrayImage> {
    embed_bits_with_progress(cover, bits, scheme_id, config, seed, &Progress::new())
}

/// [`embed_bits`] reporting to a caller-owned [`Progress`].
///
/// The handle ticks once per block. Cancelling it (before or during the run)
/// stops the run at the next block boundary.
///
/// # Errors
/// As [`embed_bits`], plus [`GboError::Cancelled`].
pub fn embed_bits_with_progress(
    cover: &GrayImage,
    bits: &[u8],
    scheme_id: usize,
    config: &GboConfig,
    seed: &[u8; 32],
    progress: &Progress,
) -> Result<GrayImage> {
    if bits.is_empty() {
        return Err(GboError::EmptyWatermark);
    }
    for &b in bits {
        check_bit(b)?;
    }
    let scheme = Scheme::get(scheme_id)?;
    let gbo = Gbo::new(config.clone())?;
    let blocks = split_blocks(cover)?;

    info!(
        "embedding {} bits into {} blocks ({}x{}) with scheme {}",
        bits.len(),
        blocks.len(),
        cover.width(),
        cover.height(),
        scheme.id
    );
    progress.start(u32::try_from(blocks.len()).unwrap_or(u32::MAX));

    let embed_one = |(i, block): (usize, &Block)| -> Result<(Block, bool)> {
        progress.ensure_running()?;
        let bit = bits[i % bits.len()];
        let mut rng = block_rng(seed, i);
        let outcome = gbo.optimize(block, bit, scheme, &mut rng)?;
        progress.tick();
        Ok((outcome.block, outcome.decoded_bit == bit))
    };

    #[cfg(feature = "parallel")]
    let results: Result<Vec<(Block, bool)>> = blocks.par_iter().enumerate().map(embed_one).collect();
    #[cfg(not(feature = "parallel"))]
    let results: Result<Vec<(Block, bool)>> = blocks.iter().enumerate().map(embed_one).collect();

    let results = results?;
    progress.complete();

    let missed = results.iter().filter(|(_, ok)| !ok).count();
    if missed > 0 {
        info!("{missed} of {} blocks do not decode to their target bit", results.len());
    }
    let embedded: Vec<Block> = results.into_iter().map(|(b, _)| b).collect();
    assemble_blocks(cover.width(), cover.height(), &embedded)
}

/// Embed the same `bit` into every block of `cover`.
///
/// # Errors
/// As [`embed_bits`].
pub fn embed_uniform_bit(
    cover: &GrayImage,
    bit: u8,
    scheme_id: usize,
    config: &GboConfig,
    seed: &[u8; 32],
) -> Result<GrayImage> {
    embed_bits(cover, &[bit], scheme_id, config, seed)
}

/// Decide the bit of every block of `image`, in raster order.
///
/// # Errors
/// [`GboError::InvalidScheme`] or [`GboError::InvalidImageSize`].
pub fn block_bits(image: &GrayImage, scheme_id: usize) -> Result<Vec<u8>> {
    let scheme = Scheme::get(scheme_id)?;
    let blocks = split_blocks(image)?;
    Ok(blocks.iter().map(|b| decide_bit(b, scheme)).collect())
}

/// Recover `bit_count` watermark bits from `image` by majority vote.
///
/// Bit `k` collects the decisions of blocks `k, k + bit_count, ...`. A strict
/// majority decides; an exact tie (or a bit with no copies) is settled by a
/// coin flip from `tie_seed`.
///
/// # Errors
/// - [`GboError::EmptyWatermark`] if `bit_count == 0`.
/// - [`GboError::InvalidScheme`] or [`GboError::InvalidImageSize`].
pub fn extract_bits(image: &GrayImage, bit_count: usize, scheme_id: usize, tie_seed: u64) -> Result<Vec<u8>> {
    if bit_count == 0 {
        return Err(GboError::EmptyWatermark);
    }
    let decisions = block_bits(image, scheme_id)?;

    let mut ones = vec![0usize; bit_count];
    let mut copies = vec![0usize; bit_count];
    for (i, &bit) in decisions.iter().enumerate() {
        ones[i % bit_count] += bit as usize;
        copies[i % bit_count] += 1;
    }

    let mut rng = ChaCha20Rng::seed_from_u64(tie_seed);
    let mut ties = 0usize;
    let bits: Vec<u8> = ones
        .iter()
        .zip(&copies)
        .map(|(&v, &n)| {
            if 2 * v > n {
                1
            } else if 2 * v < n {
                0
            } else {
                ties += 1;
                u8::from(rng.gen::<bool>())
            }
        })
        .collect();

    if ties > 0 {
        warn!("{ties} of {bit_count} watermark bits tied and were decided at random");
    }
    info!("extracted {bit_count} bits from {} blocks", decisions.len());
    Ok(bits)
}

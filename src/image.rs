// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Grayscale rasters and their 8×8 block tiling.

use crate::error::{GboError, Result};
use crate::transform::{Block, BLOCK_DIM, BLOCK_LEN};

/// An 8-bit grayscale image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayImage {
    /// # Errors
    /// [`GboError::SizeMismatch`] if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(GboError::SizeMismatch);
        }
        Ok(Self { width, height, pixels })
    }

    /// An image with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self { width, height, pixels: vec![value; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[y * self.width + x] = value;
    }

    /// Number of blocks horizontally and vertically.
    ///
    /// # Errors
    /// [`GboError::InvalidImageSize`] unless both dimensions are non-zero
    /// multiples of 8.
    pub fn block_grid(&self) -> Result<(usize, usize)> {
        block_grid(self.width, self.height)
    }

    pub(crate) fn same_size(&self, other: &GrayImage) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(GboError::SizeMismatch);
        }
        Ok(())
    }
}

fn block_grid(width: usize, height: usize) -> Result<(usize, usize)> {
    if width == 0 || height == 0 || width % BLOCK_DIM != 0 || height % BLOCK_DIM != 0 {
        return Err(GboError::InvalidImageSize { width, height });
    }
    Ok((width / BLOCK_DIM, height / BLOCK_DIM))
}

/// Cut `image` into 8×8 blocks in raster order (left to right, top to bottom).
///
/// # Errors
/// [`GboError::InvalidImageSize`] for dimensions that are not non-zero
/// multiples of 8.
pub fn split_blocks(image: &GrayImage) -> Result<Vec<Block>> {
    let (bw, bh) = image.block_grid()?;
    let mut blocks = Vec::with_capacity(bw * bh);
    for by in 0..bh {
        for bx in 0..bw {
            let mut px = [0u8; BLOCK_LEN];
            for row in 0..BLOCK_DIM {
                let start = (by * BLOCK_DIM + row) * image.width + bx * BLOCK_DIM;
                px[row * BLOCK_DIM..(row + 1) * BLOCK_DIM].copy_from_slice(&image.pixels[start..start + BLOCK_DIM]);
            }
            blocks.push(Block::new(px));
        }
    }
    Ok(blocks)
}

/// Reassemble blocks produced by [`split_blocks`] into a `width × height` image.
///
/// # Errors
/// - [`GboError::InvalidImageSize`] for dimensions that are not non-zero
///   multiples of 8.
/// - [`GboError::SizeMismatch`] if `blocks.len()` is not `(width/8) * (height/8)`.
pub fn assemble_blocks(width: usize, height: usize, blocks: &[Block]) -> Result<GrayImage> {
    let (bw, bh) = block_grid(width, height)?;
    if blocks.len() != bw * bh {
        return Err(GboError::SizeMismatch);
    }
    let mut pixels = vec![0u8; width * height];
    for (i, block) in blocks.iter().enumerate() {
        let (bx, by) = (i % bw, i / bw);
        for row in 0..BLOCK_DIM {
            let start = (by * BLOCK_DIM + row) * width + bx * BLOCK_DIM;
            pixels[start..start + BLOCK_DIM].copy_from_slice(&block.pixels()[row * BLOCK_DIM..(row + 1) * BLOCK_DIM]);
        }
    }
    Ok(GrayImage { width, height, pixels })
}

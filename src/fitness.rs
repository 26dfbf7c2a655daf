// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Fitness of a perturbation vector (lower is better).
//!
//! `fitness = ratio - 0.01 * psnr`, where `ratio = s1/s0` when the target bit
//! is 0 and `s0/s1` when it is 1, measured on the re-transformed modified
//! block. Minimizing the ratio pushes the decision toward the target bit; the
//! PSNR term buys back fidelity once the margin is already adequate.

use crate::codec::{self, block_psnr, region_energies};
use crate::error::{check_bit, Result};
use crate::scheme::Scheme;
use crate::transform::{self, Block, CoefficientVector};

/// Weight of the PSNR reward in the fitness.
pub const PSNR_WEIGHT: f64 = 0.01;

/// Scores perturbation vectors against one (block, target bit, scheme) triple.
///
/// Holds the forward transform of the original block so each evaluation
/// costs one inverse and one forward DCT.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<'a> {
    block: Block,
    original: CoefficientVector,
    target_bit: u8,
    scheme: &'a Scheme,
}

impl<'a> FitnessEvaluator<'a> {
    /// # Errors
    /// [`crate::GboError::InvalidBitValue`] unless `target_bit` is 0 or 1.
    pub fn new(block: Block, target_bit: u8, scheme: &'a Scheme) -> Result<Self> {
        check_bit(target_bit)?;
        Ok(Self { original: transform::forward(&block), block, target_bit, scheme })
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn target_bit(&self) -> u8 {
        self.target_bit
    }

    pub fn scheme(&self) -> &'a Scheme {
        self.scheme
    }

    /// Dimensionality of the vectors this evaluator accepts.
    pub fn dimension(&self) -> usize {
        self.scheme.dimension()
    }

    /// Block produced by applying `vector` to the original.
    pub fn apply(&self, vector: &[f64]) -> Block {
        codec::apply_to_coeffs(&self.original, vector, self.scheme)
    }

    /// Fitness of `vector`. Deterministic; no randomness is drawn.
    pub fn evaluate(&self, vector: &[f64]) -> f64 {
        let modified = self.apply(vector);
        let psnr = block_psnr(&self.block, &modified);
        let (s1, s0) = region_energies(&transform::forward(&modified), self.scheme);
        let ratio = if self.target_bit == 0 { s1 / s0 } else { s0 / s1 };
        ratio - PSNR_WEIGHT * psnr
    }
}

/// One-shot fitness of `vector` for `block`, `target_bit` and `scheme`.
///
/// # Errors
/// [`crate::GboError::InvalidBitValue`] for a bit other than 0/1,
/// [`crate::GboError::DimensionMismatch`] for a vector of the wrong length.
pub fn fitness(vector: &[f64], block: &Block, target_bit: u8, scheme: &Scheme) -> Result<f64> {
    codec::check_dimension(vector, scheme)?;
    Ok(FitnessEvaluator::new(*block, target_bit, scheme)?.evaluate(vector))
}

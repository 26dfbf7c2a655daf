// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for block embedding, optimization and extraction.
//!
//! [`GboError`] covers every precondition the engine checks. All of them are
//! raised before any randomness is consumed; nothing inside the optimizer
//! loop itself can fail.

use core::fmt;

/// Errors that can occur while embedding or extracting a watermark bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GboError {
    /// A block was not exactly 8×8 (or its sample count did not match).
    InvalidShape { rows: usize, cols: usize },
    /// A pixel sample was not an integral intensity in 0–255.
    InvalidPixelType,
    /// A coefficient vector did not hold exactly 64 values.
    InvalidVectorSize(usize),
    /// Scheme id outside the configured scheme table.
    InvalidScheme(usize),
    /// Target bit other than 0 or 1.
    InvalidBitValue(u8),
    /// Too few individuals to draw 4 distinct partners excluding best and current.
    InsufficientPopulationSize(usize),
    /// Perturbation vector length differs from the scheme's embedding region.
    DimensionMismatch { expected: usize, actual: usize },
    /// Image dimensions are zero or not multiples of 8.
    InvalidImageSize { width: usize, height: usize },
    /// Two inputs that must have equal size differ (pixels, blocks, bits).
    SizeMismatch,
    /// No watermark bits were supplied.
    EmptyWatermark,
    /// An optimizer parameter is out of its valid range.
    InvalidConfig(&'static str),
    /// An attack strength or kernel size is out of its valid range.
    InvalidAttack(&'static str),
    /// The operation was cancelled by the user.
    Cancelled,
}

impl fmt::Display for GboError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape { rows, cols } => write!(f, "block must be 8x8, got {rows}x{cols}"),
            Self::InvalidPixelType => write!(f, "pixel samples must be integers in 0..=255"),
            Self::InvalidVectorSize(n) => write!(f, "coefficient vector must hold 64 values, got {n}"),
            Self::InvalidScheme(id) => write!(f, "unknown embedding scheme: {id}"),
            Self::InvalidBitValue(b) => write!(f, "target bit must be 0 or 1, got {b}"),
            Self::InsufficientPopulationSize(n) => {
                write!(f, "population of {n} is too small (need at least 6 individuals)")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "perturbation vector length {actual} does not match embedding region size {expected}")
            }
            Self::InvalidImageSize { width, height } => {
                write!(f, "image size {width}x{height} is not a non-zero multiple of 8")
            }
            Self::SizeMismatch => write!(f, "input sizes do not match"),
            Self::EmptyWatermark => write!(f, "watermark has no bits"),
            Self::InvalidConfig(msg) => write!(f, "invalid optimizer configuration: {msg}"),
            Self::InvalidAttack(msg) => write!(f, "invalid attack parameter: {msg}"),
            Self::Cancelled => write!(f, "operation cancelled by user"),
        }
    }
}

impl std::error::Error for GboError {}

pub type Result<T> = std::result::Result<T, GboError>;

/// Reject any target bit other than 0 or 1.
pub(crate) fn check_bit(bit: u8) -> Result<()> {
    if bit > 1 {
        return Err(GboError::InvalidBitValue(bit));
    }
    Ok(())
}

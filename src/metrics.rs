// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Watermark and image quality metrics.
//!
//! BER compares watermark bit strings; MSE, PSNR, NCC and SSIM compare a
//! cover image with its marked version. All image metrics require equal,
//! non-empty dimensions.

use std::sync::OnceLock;

use crate::error::{GboError, Result};
use crate::filter::{convolve_separable, gaussian_kernel};
use crate::image::GrayImage;

const MAX_PIXEL: f64 = 255.0;

/// SSIM stabilizers `(0.01 * 255)^2` and `(0.03 * 255)^2`.
const SSIM_C1: f64 = 6.5025;
const SSIM_C2: f64 = 58.5225;

const SSIM_WINDOW: usize = 11;
const SSIM_SIGMA: f64 = 1.5;

/// Bit error rate: fraction of positions where `a` and `b` differ.
///
/// # Errors
/// [`GboError::SizeMismatch`] on different lengths,
/// [`GboError::EmptyWatermark`] if both are empty.
pub fn ber(a: &[u8], b: &[u8]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(GboError::SizeMismatch);
    }
    if a.is_empty() {
        return Err(GboError::EmptyWatermark);
    }
    let errors = a.iter().zip(b).filter(|(x, y)| x != y).count();
    Ok(errors as f64 / a.len() as f64)
}

fn check_pair(a: &GrayImage, b: &GrayImage) -> Result<()> {
    a.same_size(b)?;
    if a.pixels().is_empty() {
        return Err(GboError::InvalidImageSize { width: a.width(), height: a.height() });
    }
    Ok(())
}

/// Mean squared pixel error.
///
/// # Errors
/// [`GboError::SizeMismatch`] or [`GboError::InvalidImageSize`] for empty images.
pub fn mse(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    check_pair(a, b)?;
    let sum: f64 = a
        .pixels()
        .iter()
        .zip(b.pixels())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    Ok(sum / a.pixels().len() as f64)
}

/// Peak signal-to-noise ratio in dB. Identical images give `f64::INFINITY`.
///
/// # Errors
/// As [`mse`].
pub fn psnr(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    let m = mse(a, b)?;
    if m == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (MAX_PIXEL * MAX_PIXEL / m).log10())
}

/// Zero-mean normalized cross-correlation in `[-1, 1]`.
/// Returns 0 when either image is flat.
///
/// # Errors
/// As [`mse`].
pub fn ncc(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    check_pair(a, b)?;
    let n = a.pixels().len() as f64;
    let mean_a = a.pixels().iter().map(|&p| p as f64).sum::<f64>() / n;
    let mean_b = b.pixels().iter().map(|&p| p as f64).sum::<f64>() / n;

    let (mut num, mut ea, mut eb) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.pixels().iter().zip(b.pixels()) {
        let da = x as f64 - mean_a;
        let db = y as f64 - mean_b;
        num += da * db;
        ea += da * da;
        eb += db * db;
    }
    let den = (ea * eb).sqrt();
    if den == 0.0 {
        return Ok(0.0);
    }
    Ok(num / den)
}

/// Normalized 11-tap Gaussian, sigma 1.5.
fn ssim_kernel() -> &'static [f64] {
    static KERNEL: OnceLock<Vec<f64>> = OnceLock::new();
    KERNEL.get_or_init(|| gaussian_kernel(SSIM_WINDOW, SSIM_SIGMA))
}

fn blur(plane: &[f64], width: usize, height: usize) -> Vec<f64> {
    convolve_separable(plane, width, height, ssim_kernel())
}

/// Mean structural similarity over an 11×11 Gaussian window.
///
/// # Errors
/// As [`mse`].
pub fn ssim(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    check_pair(a, b)?;
    let (w, h) = (a.width(), a.height());
    let fa: Vec<f64> = a.pixels().iter().map(|&p| p as f64).collect();
    let fb: Vec<f64> = b.pixels().iter().map(|&p| p as f64).collect();
    let product = |x: &[f64], y: &[f64]| -> Vec<f64> { x.iter().zip(y).map(|(p, q)| p * q).collect() };

    let mu_a = blur(&fa, w, h);
    let mu_b = blur(&fb, w, h);
    let aa = blur(&product(&fa, &fa), w, h);
    let bb = blur(&product(&fb, &fb), w, h);
    let ab = blur(&product(&fa, &fb), w, h);

    let total: f64 = (0..fa.len())
        .map(|i| {
            let (ma, mb) = (mu_a[i], mu_b[i]);
            let var_a = aa[i] - ma * ma;
            let var_b = bb[i] - mb * mb;
            let cov = ab[i] - ma * mb;
            let num = (2.0 * ma * mb + SSIM_C1) * (2.0 * cov + SSIM_C2);
            let den = (ma * ma + mb * mb + SSIM_C1) * (var_a + var_b + SSIM_C2);
            num / den
        })
        .sum();
    Ok(total / fa.len() as f64)
}

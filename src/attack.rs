// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Image attacks for robustness testing.
//!
//! Each [`Attack`] maps a grayscale image to a degraded image of the same
//! size. The noise attacks draw from the caller's generator, so a seeded
//! [`rand_chacha::ChaCha20Rng`] reproduces them exactly; the others ignore
//! it. Percent strengths follow one convention: `10.0` means 10%.
//!
//! Kernel-based attacks use reflect-101 borders, except the median filter,
//! which replicates the edge pixel.

use core::fmt;

use rand::Rng;
use tracing::debug;

use crate::error::{GboError, Result};
use crate::filter::{convolve3x3, convolve_separable, gaussian_kernel, replicate, to_pixel};
use crate::image::GrayImage;
use crate::optimizer::random::standard_normal;

/// Midpoint that contrast changes pivot around.
const CONTRAST_PIVOT: f64 = 128.0;

/// Laplacian sharpening kernel (identity plus 4-neighbour Laplacian).
const SHARPEN: [[f64; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// A single image degradation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attack {
    /// Add a constant to every pixel (saturating).
    BrightnessIncrease(u8),
    /// Subtract a constant from every pixel (saturating).
    BrightnessDecrease(u8),
    /// Stretch intensities away from 128 by the given percent.
    ContrastIncrease(f64),
    /// Pull intensities toward 128 by the given percent (at most 100).
    ContrastDecrease(f64),
    /// Replace the given percent of pixels with black or white.
    SaltPepper(f64),
    /// Multiplicative noise `p + p * N(0, sd)`, `sd` in percent.
    Speckle(f64),
    /// Global histogram equalization.
    HistogramEqualization,
    /// 3×3 Laplacian sharpening.
    Sharpening,
    /// Gaussian blur with an odd kernel size; sigma follows the kernel size.
    GaussianFilter(usize),
    /// Median filter with an odd square window.
    MedianFilter(usize),
    /// Box blur with an odd square window.
    AverageFilter(usize),
}

/// One mild instance of every attack: strength 10 and 3×3 kernels.
pub const MILD_ATTACKS: [Attack; 11] = [
    Attack::BrightnessIncrease(10),
    Attack::BrightnessDecrease(10),
    Attack::ContrastIncrease(10.0),
    Attack::ContrastDecrease(10.0),
    Attack::SaltPepper(10.0),
    Attack::Speckle(10.0),
    Attack::HistogramEqualization,
    Attack::Sharpening,
    Attack::GaussianFilter(3),
    Attack::MedianFilter(3),
    Attack::AverageFilter(3),
];

impl Attack {
    /// Whether this attack consumes randomness.
    pub fn is_random(&self) -> bool {
        matches!(self, Self::SaltPepper(_) | Self::Speckle(_))
    }

    /// # Errors
    /// [`GboError::InvalidAttack`] for a non-finite or out-of-range strength
    /// or an even or zero kernel size.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::ContrastIncrease(p) | Self::Speckle(p) => {
                if !p.is_finite() || p < 0.0 {
                    return Err(GboError::InvalidAttack("strength must be finite and non-negative"));
                }
            }
            Self::ContrastDecrease(p) | Self::SaltPepper(p) => {
                if !(0.0..=100.0).contains(&p) {
                    return Err(GboError::InvalidAttack("percent must lie in [0, 100]"));
                }
            }
            Self::GaussianFilter(k) | Self::MedianFilter(k) | Self::AverageFilter(k) => {
                if k % 2 == 0 {
                    return Err(GboError::InvalidAttack("kernel size must be odd"));
                }
            }
            Self::BrightnessIncrease(_) | Self::BrightnessDecrease(_) | Self::HistogramEqualization | Self::Sharpening => {}
        }
        Ok(())
    }

    /// Apply the attack to `image`.
    ///
    /// # Errors
    /// - [`GboError::InvalidImageSize`] for an image with no pixels.
    /// - Whatever [`Attack::validate`] rejects.
    pub fn apply<R: Rng + ?Sized>(&self, image: &GrayImage, rng: &mut R) -> Result<GrayImage> {
        let (w, h) = (image.width(), image.height());
        if image.pixels().is_empty() {
            return Err(GboError::InvalidImageSize { width: w, height: h });
        }
        self.validate()?;
        debug!("attack {} on {w}x{h} image", self);

        let px = image.pixels();
        let out: Vec<u8> = match *self {
            Self::BrightnessIncrease(d) => px.iter().map(|&p| p.saturating_add(d)).collect(),
            Self::BrightnessDecrease(d) => px.iter().map(|&p| p.saturating_sub(d)).collect(),
            Self::ContrastIncrease(p) => scale_contrast(px, 1.0 + p / 100.0),
            Self::ContrastDecrease(p) => scale_contrast(px, 1.0 - p / 100.0),
            Self::SaltPepper(p) => {
                let density = p / 100.0;
                px.iter()
                    .map(|&v| {
                        if rng.gen::<f64>() < density {
                            if rng.gen::<bool>() { 255 } else { 0 }
                        } else {
                            v
                        }
                    })
                    .collect()
            }
            Self::Speckle(p) => {
                let sd = p / 100.0;
                px.iter()
                    .map(|&v| {
                        let v = f64::from(v);
                        to_pixel(v + v * sd * standard_normal(rng))
                    })
                    .collect()
            }
            Self::HistogramEqualization => equalize(px),
            Self::Sharpening => convolve3x3(&to_plane(px), w, h, &SHARPEN).into_iter().map(to_pixel).collect(),
            Self::GaussianFilter(k) => {
                let kernel = gaussian_kernel(k, gaussian_sigma(k));
                convolve_separable(&to_plane(px), w, h, &kernel).into_iter().map(to_pixel).collect()
            }
            Self::MedianFilter(k) => median(px, w, h, k),
            Self::AverageFilter(k) => {
                let kernel = vec![1.0 / k as f64; k];
                convolve_separable(&to_plane(px), w, h, &kernel).into_iter().map(to_pixel).collect()
            }
        };
        GrayImage::new(w, h, out)
    }
}

impl fmt::Display for Attack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrightnessIncrease(d) => write!(f, "brightness +{d}"),
            Self::BrightnessDecrease(d) => write!(f, "brightness -{d}"),
            Self::ContrastIncrease(p) => write!(f, "contrast +{p}%"),
            Self::ContrastDecrease(p) => write!(f, "contrast -{p}%"),
            Self::SaltPepper(p) => write!(f, "salt-and-pepper {p}%"),
            Self::Speckle(p) => write!(f, "speckle {p}%"),
            Self::HistogramEqualization => write!(f, "histogram equalization"),
            Self::Sharpening => write!(f, "sharpening"),
            Self::GaussianFilter(k) => write!(f, "gaussian {k}x{k}"),
            Self::MedianFilter(k) => write!(f, "median {k}x{k}"),
            Self::AverageFilter(k) => write!(f, "average {k}x{k}"),
        }
    }
}

/// Sigma for a Gaussian kernel of size `k` when none is given.
pub fn gaussian_sigma(k: usize) -> f64 {
    0.3 * ((k as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

fn to_plane(px: &[u8]) -> Vec<f64> {
    px.iter().map(|&p| f64::from(p)).collect()
}

fn scale_contrast(px: &[u8], factor: f64) -> Vec<u8> {
    px.iter().map(|&p| to_pixel(CONTRAST_PIVOT + (f64::from(p) - CONTRAST_PIVOT) * factor)).collect()
}

/// Map intensities through the scaled cumulative histogram. The lowest
/// occupied level maps to 0; a single-level image is returned unchanged.
fn equalize(px: &[u8]) -> Vec<u8> {
    let mut hist = [0usize; 256];
    for &p in px {
        hist[p as usize] += 1;
    }
    let Some(lowest) = hist.iter().position(|&c| c > 0) else {
        return px.to_vec();
    };
    let rest = px.len() - hist[lowest];
    if rest == 0 {
        return px.to_vec();
    }

    let scale = 255.0 / rest as f64;
    let mut lut = [0u8; 256];
    let mut cumulative = 0usize;
    for level in lowest + 1..256 {
        cumulative += hist[level];
        lut[level] = to_pixel(cumulative as f64 * scale);
    }
    px.iter().map(|&p| lut[p as usize]).collect()
}

fn median(px: &[u8], width: usize, height: usize, k: usize) -> Vec<u8> {
    let half = (k / 2) as isize;
    let mut window = Vec::with_capacity(k * k);
    let mut out = Vec::with_capacity(px.len());
    for y in 0..height {
        for x in 0..width {
            window.clear();
            for dy in -half..=half {
                let sy = replicate(y as isize + dy, height);
                for dx in -half..=half {
                    window.push(px[sy * width + replicate(x as isize + dx, width)]);
                }
            }
            let mid = window.len() / 2;
            let (_, m, _) = window.select_nth_unstable(mid);
            out.push(*m);
        }
    }
    out
}

// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Plane filtering helpers shared by the quality metrics and the attacks.
//!
//! Planes are row-major `f64` buffers of `width × height` samples. Borders
//! are mirrored with [`reflect101`] unless a caller picks another rule.

/// Mirror an out-of-range index without repeating the edge sample
/// (`gfedcb|abcdefgh|gfedcba`).
pub(crate) fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let m = i.rem_euclid(period);
    let m = if m >= len as isize { period - m } else { m };
    m as usize
}

/// Clamp an out-of-range index to the nearest edge (`aaaaaa|abcdefgh|hhhhhhh`).
pub(crate) fn replicate(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Normalized 1-D Gaussian of odd length `size`.
pub(crate) fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f64> {
    let half = (size / 2) as f64;
    let mut k: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - half;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = k.iter().sum();
    for w in k.iter_mut() {
        *w /= sum;
    }
    k
}

/// Separable convolution of a plane with the same odd-length kernel along
/// rows and then columns, reflect-101 borders.
pub(crate) fn convolve_separable(plane: &[f64], width: usize, height: usize, kernel: &[f64]) -> Vec<f64> {
    let half = (kernel.len() / 2) as isize;

    let mut tmp = vec![0.0f64; plane.len()];
    for y in 0..height {
        let row = &plane[y * width..(y + 1) * width];
        for x in 0..width {
            tmp[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(t, &w)| w * row[reflect101(x as isize + t as isize - half, width)])
                .sum();
        }
    }

    let mut out = vec![0.0f64; plane.len()];
    for y in 0..height {
        for x in 0..width {
            out[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(t, &w)| w * tmp[reflect101(y as isize + t as isize - half, height) * width + x])
                .sum();
        }
    }
    out
}

/// 3×3 convolution with reflect-101 borders.
pub(crate) fn convolve3x3(plane: &[f64], width: usize, height: usize, kernel: &[[f64; 3]; 3]) -> Vec<f64> {
    let mut out = vec![0.0f64; plane.len()];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (dy, row) in kernel.iter().enumerate() {
                let sy = reflect101(y as isize + dy as isize - 1, height);
                for (dx, &w) in row.iter().enumerate() {
                    let sx = reflect101(x as isize + dx as isize - 1, width);
                    acc += w * plane[sy * width + sx];
                }
            }
            out[y * width + x] = acc;
        }
    }
    out
}

/// Round to the nearest intensity (ties to even) and saturate to 0..=255.
pub(crate) fn to_pixel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round_ties_even().clamp(0.0, 255.0) as u8
}

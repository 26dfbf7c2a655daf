// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Random draws used by the optimizer.
//!
//! Every helper takes the caller's generator, so a run is reproducible from
//! its seed and parallel runs never share state. Integer ranges go through
//! `u32` so the entropy consumed per draw is the same on 32- and 64-bit
//! targets.

use rand::Rng;

use crate::error::{GboError, Result};

/// Number of partner indices drawn per population slot.
pub const PARTNERS: usize = 4;

/// Smallest population from which [`generate_random_indices`] can draw.
pub const MIN_POPULATION: usize = PARTNERS + 2;

/// Mean of the truncated normal drawn by [`gaussian_unit`].
const GAUSS_MEAN: f64 = 0.5;
/// Standard deviation of the truncated normal drawn by [`gaussian_unit`].
const GAUSS_SD: f64 = 0.15;

/// Uniform draw in the half-open interval (0, 1].
pub fn uniform_open01<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.gen::<f64>()
}

/// Uniform draw in `[lo, hi)`.
pub fn uniform_in<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.gen::<f64>()
}

/// Fair coin: 0.0 or 1.0.
pub fn coin<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    if uniform_open01(rng) < 0.5 { 0.0 } else { 1.0 }
}

/// Uniform index in `0..n`. `n` must be non-zero.
pub fn random_index<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    debug_assert!(n > 0 && n <= u32::MAX as usize);
    rng.gen_range(0..n as u32) as usize
}

/// Draw 4 distinct indices from `0..n`, none equal to `best` or `current`.
///
/// Returned in ascending order.
///
/// # Errors
/// [`GboError::InsufficientPopulationSize`] if `n < 6`.
pub fn generate_random_indices<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    best: usize,
    current: usize,
) -> Result<[usize; PARTNERS]> {
    if n < MIN_POPULATION {
        return Err(GboError::InsufficientPopulationSize(n));
    }
    let mut picked = [usize::MAX; PARTNERS];
    let mut count = 0;
    while count < PARTNERS {
        let idx = random_index(rng, n);
        if idx == best || idx == current || picked[..count].contains(&idx) {
            continue;
        }
        picked[count] = idx;
        count += 1;
    }
    picked.sort_unstable();
    Ok(picked)
}

/// Normal(0.5, 0.15) draw, rejected until it lands in [0, 1].
///
/// Box–Muller via [`standard_normal`]; the truncation rejects about
/// 0.1% of draws.
pub fn gaussian_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let x = GAUSS_MEAN + GAUSS_SD * standard_normal(rng);
        if (0.0..=1.0).contains(&x) {
            return x;
        }
    }
}

/// Standard normal draw (Box–Muller, cosine branch). Consumes two words.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = uniform_open01(rng);
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    /// Generator that replays a fixed list of words, for tests that pin
    /// exact arithmetic. Panics when the script runs out.
    pub(crate) struct Scripted(VecDeque<u64>);

    impl Scripted {
        pub(crate) fn new(words: impl IntoIterator<Item = u64>) -> Self {
            Self(words.into_iter().collect())
        }

        pub(crate) fn remaining(&self) -> usize {
            self.0.len()
        }
    }

    impl RngCore for Scripted {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0.pop_front().expect("scripted generator exhausted")
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let w = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&w[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    /// Word that makes `rng.gen::<f64>()` return `u` (a multiple of 2^-53).
    pub(crate) fn unit(u: f64) -> u64 {
        debug_assert!((0.0..1.0).contains(&u));
        ((u * (1u64 << 53) as f64) as u64) << 11
    }

    /// Word that makes [`uniform_open01`] return `a`.
    pub(crate) fn open(a: f64) -> u64 {
        unit(1.0 - a)
    }

    /// Word that makes [`random_index`]`(rng, n)` return `b`.
    pub(crate) fn index(b: usize, n: usize) -> u64 {
        let n = n as u64;
        ((b as u64) << 32).div_ceil(n)
    }

    /// Two words that make [`gaussian_unit`] return exactly 0.5.
    pub(crate) fn gaussian_mean() -> [u64; 2] {
        [open(1.0), unit(0.5)]
    }

    #[test]
    fn scripted_words_decode_as_intended() {
        let mut rng = Scripted::new([unit(0.25), open(0.75), index(7, 30), index(0, 6), index(5, 6)]);
        assert_eq!(rng.gen::<f64>(), 0.25);
        assert_eq!(uniform_open01(&mut rng), 0.75);
        assert_eq!(random_index(&mut rng, 30), 7);
        assert_eq!(random_index(&mut rng, 6), 0);
        assert_eq!(random_index(&mut rng, 6), 5);
        let mut rng = Scripted::new(gaussian_mean());
        assert_eq!(gaussian_unit(&mut rng), 0.5);
        assert_eq!(rng.remaining(), 0);
    }

    #[test]
    fn open_interval_bounds() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for _ in 0..10_000 {
            let u = uniform_open01(&mut rng);
            assert!(u > 0.0 && u <= 1.0);
        }
    }

    #[test]
    fn indices_distinct_and_exclusive() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..2_000 {
            let idx = generate_random_indices(&mut rng, 30, 0, 1).unwrap();
            assert_eq!(idx.len(), 4);
            for (i, &a) in idx.iter().enumerate() {
                assert!(a < 30);
                assert!(a != 0 && a != 1);
                for &b in &idx[i + 1..] {
                    assert_ne!(a, b);
                }
            }
            assert!(idx.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn indices_when_best_is_current() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        // Only one index excluded, still 4 distinct.
        let idx = generate_random_indices(&mut rng, 6, 2, 2).unwrap();
        assert!(!idx.contains(&2));
    }

    #[test]
    fn indices_smallest_population() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let idx = generate_random_indices(&mut rng, 6, 0, 5).unwrap();
        assert_eq!(idx, [1, 2, 3, 4]);
    }

    #[test]
    fn indices_need_six() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert_eq!(
            generate_random_indices(&mut rng, 5, 0, 1),
            Err(GboError::InsufficientPopulationSize(5))
        );
    }

    #[test]
    fn gaussian_stays_in_unit_interval() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut sum = 0.0;
        let n = 20_000;
        for _ in 0..n {
            let g = gaussian_unit(&mut rng);
            assert!((0.0..=1.0).contains(&g));
            sum += g;
        }
        let mean = sum / n as f64;
        assert!((mean - 0.5).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn random_index_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mut seen = [false; 30];
        for _ in 0..5_000 {
            seen[random_index(&mut rng, 30)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}

// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Block transform and decision laws.
//!
//! - `inverse(forward(b))` reproduces any block exactly (pixel rounding
//!   absorbs the floating-point error of the orthonormal DCT).
//! - `forward` lays coefficients out in the fixed zigzag order.
//! - `decide_bit` and `fitness` are pure functions of their inputs.

use phasm_gbo::codec::block_psnr;
use phasm_gbo::transform::dct::dct_8x8;
use phasm_gbo::transform::zigzag::POSITION_TO_GRID;
use phasm_gbo::{apply_vector, decide_bit, fitness, forward, inverse, Block, GboError, SCHEMES};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn random_block(rng: &mut ChaCha20Rng) -> Block {
    let mut px = [0u8; 64];
    rng.fill(&mut px[..]);
    Block::new(px)
}

#[test]
fn round_trip_is_lossless() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let block = random_block(&mut rng);
        assert_eq!(inverse(&forward(&block)).unwrap(), block);
    }
    for v in [0u8, 1, 127, 128, 254, 255] {
        let block = Block::filled(v);
        assert_eq!(inverse(&forward(&block)).unwrap(), block);
    }
}

#[test]
fn coefficients_follow_zigzag_order() {
    let mut px = [0u8; 64];
    for (i, p) in px.iter_mut().enumerate() {
        *p = (i * 3) as u8;
    }
    let block = Block::new(px);
    let grid = dct_8x8(&block.to_f64());
    let vector = forward(&block);
    for k in 0..64 {
        assert_eq!(vector[k], grid[POSITION_TO_GRID[k]], "position {k}");
    }
    assert_eq!(vector[0], grid[0]);
}

#[test]
fn inverse_rejects_wrong_length() {
    assert_eq!(inverse(&[0.0; 63]), Err(GboError::InvalidVectorSize(63)));
    assert_eq!(inverse(&[0.0; 65]), Err(GboError::InvalidVectorSize(65)));
}

#[test]
fn block_shape_is_checked() {
    assert_eq!(
        Block::from_pixels(8, 7, &[0; 56]),
        Err(GboError::InvalidShape { rows: 8, cols: 7 })
    );
    assert_eq!(Block::from_samples(8, 8, &[0.5; 64]), Err(GboError::InvalidPixelType));
    assert!(Block::from_samples(8, 8, &[12.0; 64]).is_ok());
}

#[test]
fn decision_and_fitness_are_pure() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    for scheme in SCHEMES.iter() {
        let block = random_block(&mut rng);
        let v: Vec<f64> = (0..scheme.dimension()).map(|_| rng.gen_range(-10.0..10.0)).collect();
        let marked = apply_vector(&v, &block, scheme.id).unwrap();
        assert_eq!(decide_bit(&marked, scheme.id).unwrap(), decide_bit(&marked, scheme.id).unwrap());
        for bit in [0u8, 1] {
            let a = fitness(&v, &block, bit, scheme).unwrap();
            let b = fitness(&v, &block, bit, scheme).unwrap();
            assert_eq!(a, b);
            assert!(a.is_finite());
        }
    }
}

#[test]
fn zero_vector_leaves_block_untouched() {
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let block = random_block(&mut rng);
    for scheme in SCHEMES.iter() {
        let zeros = vec![0.0; scheme.dimension()];
        let out = apply_vector(&zeros, &block, scheme.id).unwrap();
        assert_eq!(out, block);
        assert_eq!(block_psnr(&block, &out), 100.0);
    }
}

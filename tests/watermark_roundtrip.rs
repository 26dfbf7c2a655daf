// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Image-level embed → extract round trips and quality metrics.
//!
//! Covers are synthetic so the tests need no fixture files. Each run owns
//! its progress handle, so the tests can run concurrently.

use phasm_gbo::metrics::{ber, mse, ncc, psnr, ssim};
use phasm_gbo::watermark::block_bits;
use phasm_gbo::{
    bits_from_image, embed_bits, embed_bits_with_progress, embed_uniform_bit, extract_bits, image_from_bits, GboConfig,
    GboError, GrayImage, Progress,
};
use std::sync::Arc;
use std::thread;

fn textured_cover(width: usize, height: usize) -> GrayImage {
    let mut px = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            px.push((40 + 3 * x + 2 * y + (x * y) % 5) as u8);
        }
    }
    GrayImage::new(width, height, px).unwrap()
}

#[test]
fn watermark_image_survives_round_trip() {
    let cover = textured_cover(32, 32);
    // 2×2 logo: four bits, four copies each across the 16 blocks.
    let logo = GrayImage::new(2, 2, vec![255, 0, 0, 200]).unwrap();
    let bits = bits_from_image(&logo);
    assert_eq!(bits, vec![1, 0, 0, 1]);

    let marked = embed_bits(&cover, &bits, 0, &GboConfig::default(), &[42u8; 32]).unwrap();
    let per_block = block_bits(&marked, 0).unwrap();
    let correct = per_block.iter().enumerate().filter(|&(i, &b)| b == bits[i % 4]).count();
    assert!(correct >= 14, "only {correct}/16 blocks carry their bit");

    let recovered = extract_bits(&marked, bits.len(), 0, 0).unwrap();
    assert!(ber(&bits, &recovered).unwrap() <= 0.25);
    let rendered = image_from_bits(2, 2, &recovered).unwrap();
    assert_eq!(rendered.width(), 2);

    assert!(psnr(&cover, &marked).unwrap() > 30.0);
    assert!(mse(&cover, &marked).unwrap() > 0.0);
    assert!(ncc(&cover, &marked).unwrap() > 0.95);
    assert!(ssim(&cover, &marked).unwrap() > 0.5);
}

#[test]
fn uniform_bit_marks_every_block() {
    let cover = GrayImage::filled(24, 16, 128);
    let cfg = GboConfig { iterations: 20, ..GboConfig::default() };
    let marked = embed_uniform_bit(&cover, 0, 1, &cfg, &[5u8; 32]).unwrap();
    let per_block = block_bits(&marked, 1).unwrap();
    assert_eq!(per_block.len(), 6);
    assert!(per_block.iter().filter(|&&b| b == 0).count() >= 5);
    assert_eq!(extract_bits(&marked, 1, 1, 0).unwrap(), vec![0]);
}

#[test]
fn same_seed_same_image() {
    let cover = textured_cover(16, 16);
    let cfg = GboConfig { iterations: 8, ..GboConfig::default() };
    let a = embed_bits(&cover, &[1, 0, 1], 1, &cfg, &[9u8; 32]).unwrap();
    let b = embed_bits(&cover, &[1, 0, 1], 1, &cfg, &[9u8; 32]).unwrap();
    let c = embed_bits(&cover, &[1, 0, 1], 1, &cfg, &[10u8; 32]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn extraction_errors() {
    let img = GrayImage::filled(16, 16, 0);
    assert_eq!(extract_bits(&img, 0, 0, 0), Err(GboError::EmptyWatermark));
    assert_eq!(extract_bits(&img, 4, 7, 0), Err(GboError::InvalidScheme(7)));
    let odd = GrayImage::filled(10, 16, 0);
    assert_eq!(
        extract_bits(&odd, 4, 0, 0),
        Err(GboError::InvalidImageSize { width: 10, height: 16 })
    );
}

#[test]
fn more_bits_than_blocks_still_extracts() {
    // Bits with no carrier block are settled by the tie-break coin.
    let img = GrayImage::filled(8, 8, 128);
    let bits = extract_bits(&img, 5, 0, 3).unwrap();
    assert_eq!(bits.len(), 5);
    assert_eq!(bits[0], 1);
    assert!(bits.iter().all(|&b| b <= 1));
    assert_eq!(bits, extract_bits(&img, 5, 0, 3).unwrap());
}

#[test]
fn concurrent_runs_keep_separate_progress() {
    let cover = Arc::new(textured_cover(16, 16));
    let cfg = GboConfig { iterations: 4, ..GboConfig::default() };
    let stopped = Arc::new(Progress::new());
    stopped.cancel();

    let runs: Vec<_> = [Arc::clone(&stopped), Arc::new(Progress::new())]
        .into_iter()
        .map(|progress| {
            let cover = Arc::clone(&cover);
            let cfg = cfg.clone();
            thread::spawn(move || {
                let out = embed_bits_with_progress(&cover, &[1, 0], 0, &cfg, &[4u8; 32], &progress);
                (out, progress.snapshot())
            })
        })
        .collect();
    let results: Vec<_> = runs.into_iter().map(|r| r.join().unwrap()).collect();

    assert_eq!(results[0].0, Err(GboError::Cancelled));
    assert!(results[1].0.is_ok());
    assert_eq!(results[1].1, (4, 4));
}

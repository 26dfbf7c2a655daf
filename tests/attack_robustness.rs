// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Watermark extraction after mild attacks.
//!
//! A 64×64 cover carries 4 bits with 16 copies each. Extraction from the
//! attacked image is compared against extraction from the clean marked image.
//!
//! - Brightness shifts only move the DC coefficient, so the bits survive.
//! - Small contrast changes scale every AC coefficient alike, so the region
//!   comparison survives up to rounding.
//! - Every other mild attack still yields a same-size image that extracts.

use phasm_gbo::attack::{Attack, MILD_ATTACKS};
use phasm_gbo::metrics::{ber, psnr};
use phasm_gbo::{embed_bits, extract_bits, GboConfig, GrayImage};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const BITS: [u8; 4] = [1, 0, 0, 1];

fn cover() -> GrayImage {
    let (w, h) = (64usize, 64usize);
    let mut px = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            px.push((30 + x + 3 * y / 2 + (x * y) % 5) as u8);
        }
    }
    GrayImage::new(w, h, px).unwrap()
}

fn marked() -> GrayImage {
    embed_bits(&cover(), &BITS, 0, &GboConfig::default(), &[21u8; 32]).unwrap()
}

#[test]
fn brightness_shift_keeps_every_bit() {
    let marked = marked();
    let clean = extract_bits(&marked, BITS.len(), 0, 0).unwrap();
    assert!(ber(&BITS, &clean).unwrap() <= 0.25);

    let mut rng = ChaCha20Rng::seed_from_u64(1);
    for attack in [Attack::BrightnessIncrease(10), Attack::BrightnessDecrease(10)] {
        let attacked = attack.apply(&marked, &mut rng).unwrap();
        let bits = extract_bits(&attacked, BITS.len(), 0, 0).unwrap();
        assert_eq!(ber(&clean, &bits).unwrap(), 0.0, "{attack}");
    }
}

#[test]
fn small_contrast_change_keeps_ber_low() {
    let marked = marked();
    let clean = extract_bits(&marked, BITS.len(), 0, 0).unwrap();
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    for attack in [Attack::ContrastIncrease(5.0), Attack::ContrastDecrease(5.0)] {
        let attacked = attack.apply(&marked, &mut rng).unwrap();
        let bits = extract_bits(&attacked, BITS.len(), 0, 0).unwrap();
        assert!(ber(&clean, &bits).unwrap() <= 0.25, "{attack}");
        assert!(psnr(&marked, &attacked).unwrap() > 20.0, "{attack}");
    }
}

#[test]
fn every_mild_attack_extracts() {
    let marked = marked();
    for attack in MILD_ATTACKS {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let attacked = attack.apply(&marked, &mut rng).unwrap();
        assert_eq!((attacked.width(), attacked.height()), (64, 64), "{attack}");
        let bits = extract_bits(&attacked, BITS.len(), 0, 0).unwrap();
        let rate = ber(&BITS, &bits).unwrap();
        assert!((0.0..=1.0).contains(&rate), "{attack}");

        let mut again = ChaCha20Rng::seed_from_u64(3);
        assert_eq!(attack.apply(&marked, &mut again).unwrap(), attacked, "{attack}");
    }
}

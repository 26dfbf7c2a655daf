// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Embedding scheme table.
//!
//! A scheme names three sets of coefficient-vector positions (see
//! [`crate::transform::zigzag`]):
//!
//! - `embed_region`: positions the optimizer may perturb. Its length is the
//!   dimensionality of every perturbation vector for the scheme.
//! - `s1_region` / `s0_region`: disjoint positions whose summed magnitudes are
//!   compared to recover the bit.
//!
//! The decision regions need not partition the embedding region. Positions
//! perturbed but not compared widen the decision margin without being
//! measured directly.

use std::borrow::Cow;

use crate::error::{GboError, Result};
use crate::transform::BLOCK_LEN;

/// Static configuration for one embedding scheme.
///
/// Built-in schemes borrow their regions from static tables; schemes made
/// with [`Scheme::custom`] own theirs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    /// Id used by callers to select the scheme.
    pub id: usize,
    /// Revision of the region layout. Bumped whenever any region changes,
    /// since marks embedded under one revision do not decode under another.
    pub revision: u32,
    pub embed_region: Cow<'static, [usize]>,
    pub s1_region: Cow<'static, [usize]>,
    pub s0_region: Cow<'static, [usize]>,
}

const SCHEME_0_EMBED: &[usize] = &[3, 4, 5, 6, 7, 10, 11, 14, 15, 22, 23, 40, 41, 48, 49, 52, 53, 56, 57, 58, 59, 60];
const SCHEME_0_S1: &[usize] = &[3, 4, 5, 6, 7, 10, 11, 15, 22, 40, 41];
const SCHEME_0_S0: &[usize] = &[14, 23, 48, 49, 52, 53, 56, 57, 58, 59, 60];

const SCHEME_1_EMBED: &[usize] = &[
    3, 4, 5, 6, 7, 10, 11, 14, 15, 20, 22, 23, 25, 26, 40, 41, 48, 49, 52, 53, 56, 57, 58, 59, 60,
];
const SCHEME_1_S1: &[usize] = &[3, 4, 7, 15, 20, 25, 40, 41, 49, 52, 53, 57, 58];
const SCHEME_1_S0: &[usize] = &[5, 6, 10, 11, 14, 22, 23, 26, 48, 56, 59, 60];

// A bad table edit fails to build.
const _: () = assert!(regions_consistent(SCHEME_0_EMBED, SCHEME_0_S1, SCHEME_0_S0));
const _: () = assert!(regions_consistent(SCHEME_1_EMBED, SCHEME_1_S1, SCHEME_1_S0));

/// Scheme 0: 22 perturbable positions along the anti-diagonal band.
pub static SCHEME_0: Scheme = Scheme {
    id: 0,
    revision: 2,
    embed_region: Cow::Borrowed(SCHEME_0_EMBED),
    s1_region: Cow::Borrowed(SCHEME_0_S1),
    s0_region: Cow::Borrowed(SCHEME_0_S0),
};

/// Scheme 1: scheme 0's band widened by three off-band positions per side.
pub static SCHEME_1: Scheme = Scheme {
    id: 1,
    revision: 1,
    embed_region: Cow::Borrowed(SCHEME_1_EMBED),
    s1_region: Cow::Borrowed(SCHEME_1_S1),
    s0_region: Cow::Borrowed(SCHEME_1_S0),
};

/// All built-in schemes, indexed by id.
pub static SCHEMES: [&Scheme; 2] = [&SCHEME_0, &SCHEME_1];

impl Scheme {
    /// Look up a built-in scheme by id.
    ///
    /// # Errors
    /// [`GboError::InvalidScheme`] if no scheme has this id.
    pub fn get(id: usize) -> Result<&'static Scheme> {
        SCHEMES.get(id).copied().ok_or(GboError::InvalidScheme(id))
    }

    /// Number of built-in schemes.
    pub fn count() -> usize {
        SCHEMES.len()
    }

    /// Build a caller-defined scheme from runtime region lists, checking the
    /// same invariants as the built-in table.
    ///
    /// # Errors
    /// [`GboError::InvalidConfig`] if any region is empty, has a duplicate or
    /// an index ≥ 64, or if the two decision regions overlap.
    pub fn custom(id: usize, embed_region: Vec<usize>, s1_region: Vec<usize>, s0_region: Vec<usize>) -> Result<Scheme> {
        if !regions_consistent(&embed_region, &s1_region, &s0_region) {
            return Err(GboError::InvalidConfig(
                "scheme regions must be non-empty, in 0..64, duplicate-free, with disjoint s1/s0",
            ));
        }
        Ok(Scheme {
            id,
            revision: 0,
            embed_region: Cow::Owned(embed_region),
            s1_region: Cow::Owned(s1_region),
            s0_region: Cow::Owned(s0_region),
        })
    }

    /// Dimensionality of perturbation vectors for this scheme.
    pub fn dimension(&self) -> usize {
        self.embed_region.len()
    }

    /// Region invariants: every region non-empty, indices in 0..64 with no
    /// duplicates, and `s1_region ∩ s0_region = ∅`.
    pub fn is_consistent(&self) -> bool {
        regions_consistent(&self.embed_region, &self.s1_region, &self.s0_region)
    }
}

const fn regions_consistent(embed: &[usize], s1: &[usize], s0: &[usize]) -> bool {
    if !region_ok(embed) || !region_ok(s1) || !region_ok(s0) {
        return false;
    }
    let mut i = 0;
    while i < s1.len() {
        if contains(s0, s1[i]) {
            return false;
        }
        i += 1;
    }
    true
}

const fn region_ok(region: &[usize]) -> bool {
    if region.is_empty() {
        return false;
    }
    let mut seen = [false; BLOCK_LEN];
    let mut i = 0;
    while i < region.len() {
        let pos = region[i];
        if pos >= BLOCK_LEN || seen[pos] {
            return false;
        }
        seen[pos] = true;
        i += 1;
    }
    true
}

const fn contains(region: &[usize], pos: usize) -> bool {
    let mut i = 0;
    while i < region.len() {
        if region[i] == pos {
            return true;
        }
        i += 1;
    }
    false
}

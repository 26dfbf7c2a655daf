// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Coefficient reordering between the 8×8 grid and the 64-entry vector.

/// Maps vector position `k` (0–63) to the row-major grid index it is read from.
///
/// Scheme regions are expressed as positions in this order, so the table is
/// part of the embedding format: changing it changes which coefficients
/// every scheme perturbs and compares.
pub const POSITION_TO_GRID: [usize; 64] = [
     0,  1,  5,  6, 14, 15, 27, 28,
     2,  4,  7, 13, 16, 26, 29, 42,
     3,  8, 12, 17, 25, 30, 41, 43,
     9, 11, 18, 24, 31, 40, 44, 53,
    10, 19, 23, 32, 39, 45, 52, 54,
    20, 22, 33, 38, 46, 51, 55, 60,
    21, 34, 37, 47, 50, 56, 59, 61,
    35, 36, 48, 49, 57, 58, 62, 63,
];

/// Maps a row-major grid index (0–63) back to its vector position.
///
/// Inverse of [`POSITION_TO_GRID`].
pub const GRID_TO_POSITION: [usize; 64] = {
    let mut table = [0usize; 64];
    let mut k = 0;
    while k < 64 {
        table[POSITION_TO_GRID[k]] = k;
        k += 1;
    }
    table
};

/// Read a row-major 8×8 grid into vector order.
pub fn to_vector(grid: &[f64; 64]) -> [f64; 64] {
    let mut out = [0.0f64; 64];
    for (k, v) in out.iter_mut().enumerate() {
        *v = grid[POSITION_TO_GRID[k]];
    }
    out
}

/// Scatter a vector back into a row-major 8×8 grid.
pub fn to_grid(vector: &[f64; 64]) -> [f64; 64] {
    let mut out = [0.0f64; 64];
    for (k, &v) in vector.iter().enumerate() {
        out[POSITION_TO_GRID[k]] = v;
    }
    out
}

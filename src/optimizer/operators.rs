// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! GBO search operators.
//!
//! - **DM** (direction of movement): a random fraction of `rho1` times the
//!   difference of two guide vectors.
//! - **GSR** (gradient search rule): a Newton-like step built from the best,
//!   worst and current vectors and a random partner, then renormalized
//!   through two random convex blends.
//! - **LEO** (local escaping operator): an occasional jump mixing the best
//!   vector, a random member or a fresh random point, and the GSR pair.
//!
//! All arithmetic is component-wise. GSR and LEO draw their own random
//! scalars from the caller's generator in a fixed order; DM takes its factor
//! from the caller so the optimizer controls where it is drawn.

use rand::Rng;

use super::population::Population;
use super::random::{coin, gaussian_unit, random_index, uniform_in, uniform_open01};

/// Which vector the first GSR stage steps away from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Step from the current individual (produces `x1`).
    Current,
    /// Step from the best individual (produces `x2`).
    Best,
}

/// Vectors the gradient search rule reads.
#[derive(Debug, Clone, Copy)]
pub struct GsrInputs<'v> {
    pub rho2: f64,
    pub best: &'v [f64],
    pub worst: &'v [f64],
    pub current: &'v [f64],
    /// First random partner.
    pub xr1: &'v [f64],
    /// Direction-of-movement term for this stage.
    pub dm: &'v [f64],
    /// Mean of the four random partners.
    pub xm: &'v [f64],
    pub population_size: usize,
}

/// Direction of movement: `dm_rand * rho1 * (to - from)`.
pub fn direction_of_movement(dm_rand: f64, rho1: f64, to: &[f64], from: &[f64]) -> Vec<f64> {
    let k = dm_rand * rho1;
    to.iter().zip(from).map(|(&t, &f)| k * (t - f)).collect()
}

/// Gradient search rule.
///
/// Draws, in order: `a`, `b` (an integer in `0..population_size`), `c`, `eps`,
/// then `p1`, `p2`, `q1`, `q2` and a truncated-normal `d`.
pub fn gradient_search_rule<R: Rng + ?Sized>(rng: &mut R, inp: &GsrInputs<'_>, anchor: Anchor) -> Vec<f64> {
    let a = uniform_open01(rng);
    let b = random_index(rng, inp.population_size) as f64;
    let c = uniform_open01(rng);
    let eps = 0.01 * uniform_open01(rng);

    let dim = inp.current.len();
    let mut del_x = vec![0.0f64; dim];
    let mut xs = vec![0.0f64; dim];
    for j in 0..dim {
        let cur = inp.current[j];
        let delta = 2.0 * a * (inp.xm[j] - cur + eps).abs();
        let step = 0.5 * (inp.best[j] - inp.xr1[j] + delta);
        del_x[j] = b * step.abs();
        let gsr = c * inp.rho2 * 2.0 * (del_x[j] * cur) / (inp.best[j] - inp.worst[j] + eps);
        let origin = match anchor {
            Anchor::Current => cur,
            Anchor::Best => inp.best[j],
        };
        xs[j] = origin - gsr + inp.dm[j];
    }

    let p1 = uniform_open01(rng);
    let p2 = uniform_open01(rng);
    let q1 = uniform_open01(rng);
    let q2 = uniform_open01(rng);
    let d = gaussian_unit(rng);

    (0..dim)
        .map(|j| {
            let cur = inp.current[j];
            let mid = 0.5 * (xs[j] + cur);
            let yp = p1 * (mid + p2 * del_x[j]);
            let yq = q1 * (mid - q2 * del_x[j]);
            d * inp.rho2 * 2.0 * (del_x[j] * cur) / (yp - yq + eps)
        })
        .collect()
}

/// Vectors the local escaping operator reads.
#[derive(Debug, Clone, Copy)]
pub struct LeoInputs<'v> {
    pub rho1: f64,
    pub th: f64,
    pub x_next: &'v [f64],
    pub best: &'v [f64],
    pub xr1: &'v [f64],
    pub xr2: &'v [f64],
    pub x1: &'v [f64],
    pub x2: &'v [f64],
}

/// Local escaping operator. The caller decides whether to apply it.
///
/// `x = Y + f1*(u1*best - u2*x_mk) + 0.5*f2*rho1*(u3*(x2 - x1) + u2*(xr1 - xr2))`
/// where `Y` is `x_next` or `best` and `x_mk` is a random member or a fresh
/// uniform point. The result is not clamped.
///
/// Draws, in order: `L1`, `u1`, `u2`, `u3`, one spare uniform, the member
/// index, the fresh point, `L2`, the `Y` coin, `f1`, `f2`.
pub fn local_escape<R: Rng + ?Sized>(rng: &mut R, inp: &LeoInputs<'_>, population: &Population<'_>) -> Vec<f64> {
    let l1 = coin(rng);
    let u1 = l1 * 2.0 * uniform_open01(rng) + (1.0 - l1);
    let u2 = l1 * uniform_open01(rng) + (1.0 - l1);
    let u3 = l1 * uniform_open01(rng) + (1.0 - l1);
    // Drawn but unused.
    let _nu2 = uniform_open01(rng);

    let x_p = population.individual(random_index(rng, population.len()));
    let x_rand: Vec<f64> = (0..x_p.len()).map(|_| uniform_in(rng, -inp.th, inp.th)).collect();

    let l2 = coin(rng);
    let y = if uniform_open01(rng) < 0.5 { inp.x_next } else { inp.best };

    let f1 = 2.0 * uniform_open01(rng) - 1.0;
    let f2 = 2.0 * uniform_open01(rng) - 1.0;

    (0..x_p.len())
        .map(|j| {
            let x_mk = l2 * x_p[j] + (1.0 - l2) * x_rand[j];
            y[j] + f1 * (u1 * inp.best[j] - u2 * x_mk)
                + 0.5 * f2 * inp.rho1 * (u3 * (inp.x2[j] - inp.x1[j]) + u2 * (inp.xr1[j] - inp.xr2[j]))
        })
        .collect()
}

/// Clamp every component into `[-th, th]` in place. NaN components become 0.
pub fn clamp_into(v: &mut [f64], th: f64) {
    for x in v.iter_mut() {
        *x = if x.is_nan() { 0.0 } else { x.clamp(-th, th) };
    }
}

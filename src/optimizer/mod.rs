// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Gradient-Based Optimizer (GBO) for single-block embedding.
//!
//! For one (block, target bit, scheme) the optimizer evolves a population of
//! perturbation vectors for a fixed number of generations. Each generation
//! visits every slot in order, builds two GSR/DM candidates `x1`, `x2`, blends
//! them with a third point `x3`, optionally applies the local escaping
//! operator, and greedily offers the result to that slot. The best vector
//! found is applied to the block once more to produce the output.
//!
//! There is no early termination and no cancellation: the generation count
//! is the only stopping rule. All preconditions are checked before the first
//! random draw.

pub mod operators;
pub mod population;
pub mod random;

use std::f64::consts::PI;

use rand::Rng;
use tracing::{debug, trace};

use crate::codec::decide_bit;
use crate::error::{check_bit, GboError, Result};
use crate::fitness::FitnessEvaluator;
use crate::scheme::Scheme;
use crate::transform::Block;

use operators::{
    clamp_into, direction_of_movement, gradient_search_rule, local_escape, Anchor, GsrInputs, LeoInputs,
};
use population::Population;
use random::{generate_random_indices, uniform_open01, MIN_POPULATION, PARTNERS};

/// Individuals per population.
pub const POPULATION_SIZE: usize = 30;

/// Generations per block.
pub const ITERATIONS: usize = 40;

/// Bound on every perturbation component: each lies in `[-TH, TH]`.
pub const TH: f64 = 10.0;

/// Lower end of the `betta` schedule.
pub const BETTA_MIN: f64 = 0.2;

/// Upper end of the `betta` schedule.
pub const BETTA_MAX: f64 = 1.2;

/// Probability of applying the local escaping operator per slot.
pub const LEO_PROBABILITY: f64 = 0.5;

/// Phase angle used in the `alpha` schedule.
const ANGLE: f64 = 1.5 * PI;

/// Optimizer parameters. [`Default`] gives the standard configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GboConfig {
    pub population_size: usize,
    pub iterations: usize,
    pub th: f64,
    pub betta_min: f64,
    pub betta_max: f64,
    pub leo_probability: f64,
}

impl Default for GboConfig {
    fn default() -> Self {
        Self {
            population_size: POPULATION_SIZE,
            iterations: ITERATIONS,
            th: TH,
            betta_min: BETTA_MIN,
            betta_max: BETTA_MAX,
            leo_probability: LEO_PROBABILITY,
        }
    }
}

impl GboConfig {
    /// # Errors
    /// - [`GboError::InsufficientPopulationSize`] if fewer than 6 individuals.
    /// - [`GboError::InvalidConfig`] for a zero iteration count, a
    ///   non-positive bound, a probability outside [0, 1] or an unordered
    ///   `betta` range.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < MIN_POPULATION {
            return Err(GboError::InsufficientPopulationSize(self.population_size));
        }
        if self.iterations == 0 {
            return Err(GboError::InvalidConfig("iterations must be at least 1"));
        }
        if !self.th.is_finite() || self.th <= 0.0 {
            return Err(GboError::InvalidConfig("th must be finite and positive"));
        }
        if !(0.0..=1.0).contains(&self.leo_probability) {
            return Err(GboError::InvalidConfig("leo_probability must lie in [0, 1]"));
        }
        if !self.betta_min.is_finite() || !self.betta_max.is_finite() || self.betta_min > self.betta_max {
            return Err(GboError::InvalidConfig("betta_min must not exceed betta_max"));
        }
        Ok(())
    }

    /// `betta(m) = min + (max - min) * (1 - ((m+1)/iterations)^3)^2`
    pub fn betta(&self, generation: usize) -> f64 {
        let t = (generation + 1) as f64 / self.iterations as f64;
        self.betta_min + (self.betta_max - self.betta_min) * (1.0 - t.powi(3)).powi(2)
    }

    /// `alpha(m) = |betta * sin(1.5π + sin(1.5π * betta))|`
    pub fn alpha(&self, generation: usize) -> f64 {
        let betta = self.betta(generation);
        (betta * (ANGLE + (ANGLE * betta).sin()).sin()).abs()
    }
}

/// Result of optimizing one block.
#[derive(Debug, Clone)]
pub struct BlockOutcome {
    /// The embedded block.
    pub block: Block,
    /// Winning perturbation vector.
    pub perturbation: Vec<f64>,
    /// Its fitness.
    pub fitness: f64,
    /// Bit the embedded block decodes to under the same scheme.
    pub decoded_bit: u8,
}

/// The optimizer. Cheap to construct; holds only its configuration.
#[derive(Debug, Clone, Default)]
pub struct Gbo {
    config: GboConfig,
}

impl Gbo {
    /// # Errors
    /// Whatever [`GboConfig::validate`] rejects.
    pub fn new(config: GboConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GboConfig {
        &self.config
    }

    /// Embed `target_bit` into `block` under `scheme`.
    ///
    /// # Errors
    /// [`GboError::InvalidBitValue`] for a bit other than 0/1. Raised before
    /// any random draw.
    pub fn optimize<R: Rng + ?Sized>(
        &self,
        block: &Block,
        target_bit: u8,
        scheme: &Scheme,
        rng: &mut R,
    ) -> Result<BlockOutcome> {
        check_bit(target_bit)?;
        let cfg = &self.config;
        let evaluator = FitnessEvaluator::new(*block, target_bit, scheme)?;
        let mut pop = Population::new(evaluator, scheme.dimension(), cfg.population_size, cfg.th, rng)?;

        for m in 0..cfg.iterations {
            let alpha = cfg.alpha(m);
            for i in 0..pop.len() {
                let next = self.next_candidate(&pop, i, alpha, rng)?;
                pop.update(next, i);
            }
            trace!("generation {m}: best fitness {:.6}", pop.best_fitness());
        }

        let perturbation = pop.best().to_vec();
        let out = pop.evaluator().apply(&perturbation);
        let decoded_bit = decide_bit(&out, scheme);
        debug!(
            "scheme {} bit {target_bit}: fitness {:.6}, decoded {decoded_bit}",
            scheme.id,
            pop.best_fitness()
        );
        Ok(BlockOutcome { block: out, perturbation, fitness: pop.best_fitness(), decoded_bit })
    }

    /// Build the candidate offered to slot `i` in one generation.
    fn next_candidate<R: Rng + ?Sized>(
        &self,
        pop: &Population<'_>,
        i: usize,
        alpha: f64,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let th = self.config.th;
        let n = pop.len();

        let mut rho1 = alpha * (2.0 * uniform_open01(rng) - 1.0);
        let rho2 = alpha * (2.0 * uniform_open01(rng) - 1.0);
        let dm_rand = uniform_open01(rng);
        let partners = generate_random_indices(rng, n, pop.best_index(), i)?;

        let best = pop.best();
        let current = pop.individual(i);
        let worst = pop.worst().vector.as_slice();
        let xr1 = pop.individual(partners[0]);
        let xr2 = pop.individual(partners[1]);

        let mut xm = vec![0.0f64; current.len()];
        for &p in &partners {
            for (acc, &x) in xm.iter_mut().zip(pop.individual(p)) {
                *acc += x;
            }
        }
        for acc in xm.iter_mut() {
            *acc /= PARTNERS as f64;
        }

        let gsr_with = |rng: &mut R, dm: &[f64], anchor: Anchor| {
            let inp = GsrInputs { rho2, best, worst, current, xr1, dm, xm: &xm, population_size: n };
            gradient_search_rule(rng, &inp, anchor)
        };

        // Every DM term gets a fresh factor; the first one is drawn before
        // the partners.
        let dm = direction_of_movement(dm_rand, rho1, best, xr1);
        let gsr = gsr_with(rng, &dm, Anchor::Current);
        let dm = direction_of_movement(uniform_open01(rng), rho1, best, xr1);
        let x1: Vec<f64> = (0..current.len()).map(|j| current[j] + dm[j] - gsr[j]).collect();

        let dm = direction_of_movement(uniform_open01(rng), rho1, xr1, xr2);
        let gsr = gsr_with(rng, &dm, Anchor::Best);
        let dm = direction_of_movement(uniform_open01(rng), rho1, xr1, xr2);
        let x2: Vec<f64> = (0..current.len()).map(|j| best[j] + dm[j] - gsr[j]).collect();

        rho1 = alpha * (2.0 * uniform_open01(rng) - 1.0);
        let ra = uniform_open01(rng);
        let rb = uniform_open01(rng);

        let mut x_next: Vec<f64> = (0..current.len())
            .map(|j| {
                let x3 = current[j] - rho1 * (x2[j] - x1[j]);
                ra * (rb * x1[j] + (1.0 - rb) * x2[j]) + (1.0 - ra) * x3
            })
            .collect();
        clamp_into(&mut x_next, th);

        if uniform_open01(rng) < self.config.leo_probability {
            let inp = LeoInputs { rho1, th, x_next: &x_next, best, xr1, xr2, x1: &x1, x2: &x2 };
            x_next = local_escape(rng, &inp, pop);
            clamp_into(&mut x_next, th);
        }

        Ok(x_next)
    }
}

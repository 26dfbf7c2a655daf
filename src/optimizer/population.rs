// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Fixed-size population of perturbation vectors with cached fitness.

use rand::Rng;

use crate::error::{GboError, Result};
use crate::fitness::FitnessEvaluator;

use super::random::{uniform_in, MIN_POPULATION};

/// Repulsion reference for the gradient-search rule.
///
/// Starts as the worst initial individual, then tracks the worst *rejected*
/// candidate seen by [`Population::update`]. It is therefore not necessarily
/// a member of the live population.
#[derive(Debug, Clone)]
pub struct Worst {
    pub vector: Vec<f64>,
    pub fitness: f64,
}

/// Candidate vectors for one (block, target bit, scheme) run.
#[derive(Debug, Clone)]
pub struct Population<'a> {
    evaluator: FitnessEvaluator<'a>,
    individuals: Vec<Vec<f64>>,
    fitness: Vec<f64>,
    best: usize,
    worst: Worst,
}

impl<'a> Population<'a> {
    /// Draw `size` vectors uniformly from `[-th, th]^dimension` and score them.
    ///
    /// The best index is the first minimum; the worst reference is the first
    /// maximum of the initial set.
    ///
    /// # Errors
    /// - [`GboError::InsufficientPopulationSize`] if `size < 6`.
    /// - [`GboError::DimensionMismatch`] if `dimension` differs from the
    ///   evaluator's scheme.
    pub fn new<R: Rng + ?Sized>(
        evaluator: FitnessEvaluator<'a>,
        dimension: usize,
        size: usize,
        th: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if size < MIN_POPULATION {
            return Err(GboError::InsufficientPopulationSize(size));
        }
        if dimension != evaluator.dimension() {
            return Err(GboError::DimensionMismatch { expected: evaluator.dimension(), actual: dimension });
        }

        let mut individuals = Vec::with_capacity(size);
        let mut fitness = Vec::with_capacity(size);
        for _ in 0..size {
            let v: Vec<f64> = (0..dimension).map(|_| uniform_in(rng, -th, th)).collect();
            fitness.push(evaluator.evaluate(&v));
            individuals.push(v);
        }

        let mut best = 0;
        let mut worst_idx = 0;
        for i in 1..size {
            if fitness[i] < fitness[best] {
                best = i;
            }
            if fitness[i] > fitness[worst_idx] {
                worst_idx = i;
            }
        }
        let worst = Worst { vector: individuals[worst_idx].clone(), fitness: fitness[worst_idx] };

        Ok(Self { evaluator, individuals, fitness, best, worst })
    }

    /// Offer `candidate` for slot `index`.
    ///
    /// Replaces the slot if strictly fitter (and moves the best index if it
    /// also beats the current best). A rejected candidate strictly worse than
    /// the tracked worst becomes the new worst reference without entering the
    /// population.
    pub fn update(&mut self, candidate: Vec<f64>, index: usize) {
        let f = self.evaluator.evaluate(&candidate);
        if f < self.fitness[index] {
            self.individuals[index] = candidate;
            self.fitness[index] = f;
            if f < self.fitness[self.best] {
                self.best = index;
            }
        } else if f > self.worst.fitness {
            self.worst = Worst { vector: candidate, fitness: f };
        }
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.evaluator.dimension()
    }

    pub fn individual(&self, index: usize) -> &[f64] {
        &self.individuals[index]
    }

    pub fn individuals(&self) -> &[Vec<f64>] {
        &self.individuals
    }

    pub fn fitness(&self, index: usize) -> f64 {
        self.fitness[index]
    }

    pub fn fitness_values(&self) -> &[f64] {
        &self.fitness
    }

    pub fn best_index(&self) -> usize {
        self.best
    }

    pub fn best(&self) -> &[f64] {
        &self.individuals[self.best]
    }

    pub fn best_fitness(&self) -> f64 {
        self.fitness[self.best]
    }

    pub fn worst(&self) -> &Worst {
        &self.worst
    }

    pub fn evaluator(&self) -> &FitnessEvaluator<'a> {
        &self.evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheme::SCHEME_0;
    use crate::transform::Block;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn population(seed: u64) -> Population<'static> {
        let ev = FitnessEvaluator::new(Block::filled(128), 1, &SCHEME_0).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Population::new(ev, 22, 30, 10.0, &mut rng).unwrap()
    }

    #[test]
    fn initialization_shape() {
        let pop = population(1);
        assert_eq!(pop.len(), 30);
        assert_eq!(pop.fitness_values().len(), 30);
        for v in pop.individuals() {
            assert_eq!(v.len(), 22);
            assert!(v.iter().all(|x| (-10.0..=10.0).contains(x)));
        }
        assert!(pop.best_index() < 30);
    }

    #[test]
    fn best_and_worst_are_extremes() {
        let pop = population(2);
        let min = pop.fitness_values().iter().cloned().fold(f64::INFINITY, f64::min);
        let max = pop.fitness_values().iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(pop.best_fitness(), min);
        assert_eq!(pop.worst().fitness, max);
    }

    #[test]
    fn cached_fitness_matches_evaluator() {
        let pop = population(3);
        for i in 0..pop.len() {
            assert_eq!(pop.fitness(i), pop.evaluator().evaluate(pop.individual(i)));
        }
    }

    #[test]
    fn update_replaces_only_on_strict_improvement() {
        let mut pop = population(4);
        let best_idx = pop.best_index();
        let slot = (best_idx + 1) % pop.len();
        let before = pop.individual(slot).to_vec();
        let before_f = pop.fitness(slot);
        let worst_f = pop.worst().fitness;

        // Equal fitness is not an improvement, and not worse than the worst.
        pop.update(before.clone(), slot);
        assert_eq!(pop.individual(slot), &before[..]);
        assert_eq!(pop.worst().fitness, worst_f);

        // Offering the best vector copies it in unless the slot ties it.
        let best = pop.best().to_vec();
        let best_f = pop.best_fitness();
        pop.update(best.clone(), slot);
        assert_eq!(pop.fitness(slot), before_f.min(best_f));
        assert_eq!(pop.best_index(), best_idx);
    }

    #[test]
    fn rejected_candidate_becomes_worst_without_joining() {
        let mut pop = population(5);
        // Target bit 1 on a flat block: energy only in s0 makes s0/s1 enormous.
        let terrible: Vec<f64> = SCHEME_0
            .embed_region
            .iter()
            .map(|p| if SCHEME_0.s0_region.contains(p) { 10.0 } else { 0.0 })
            .collect();
        let f = pop.evaluator().evaluate(&terrible);
        assert!(f > pop.worst().fitness);

        let slot = pop.best_index();
        pop.update(terrible.clone(), slot);
        assert_eq!(pop.worst().vector, terrible);
        assert_eq!(pop.worst().fitness, f);
        assert!(pop.individuals().iter().all(|v| v != &terrible));
    }

    #[test]
    fn update_can_move_best() {
        let mut pop = population(6);
        // Whether or not the zero vector wins, best must stay the global minimum.
        let slot = (pop.best_index() + 3) % pop.len();
        pop.update(vec![0.0; 22], slot);
        let min = pop.fitness_values().iter().cloned().fold(f64::INFINITY, f64::min);
        assert_eq!(pop.best_fitness(), min);
    }

    #[test]
    fn rejects_small_population_and_wrong_dimension() {
        let ev = FitnessEvaluator::new(Block::filled(128), 0, &SCHEME_0).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(matches!(
            Population::new(ev.clone(), 22, 5, 10.0, &mut rng),
            Err(GboError::InsufficientPopulationSize(5))
        ));
        assert!(matches!(
            Population::new(ev, 21, 30, 10.0, &mut rng),
            Err(GboError::DimensionMismatch { expected: 22, actual: 21 })
        ));
    }
}

//! Random instance generator.
//!
//! Produces Taillard-style job-shop instances: every job visits every
//! machine exactly once, in a random order, with uniformly drawn
//! durations. The same seed always yields the same instance.
//!
//! # Reference
//! Taillard (1993), "Benchmarks for basic scheduling problems"

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::JobShopInstance;
use crate::validation::InvalidInstance;

/// Size and duration range of generated instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub num_jobs: usize,
    pub num_machines: usize,
    /// Inclusive duration range (min, max).
    pub duration_range: (i64, i64),
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_jobs: 4,
            num_machines: 3,
            duration_range: (1, 9),
        }
    }
}

impl GeneratorConfig {
    /// Instances the exact search proves optimal in milliseconds.
    pub fn tiny() -> Self {
        Self {
            num_jobs: 3,
            num_machines: 3,
            duration_range: (1, 9),
        }
    }

    pub fn small() -> Self {
        Self {
            num_jobs: 5,
            num_machines: 4,
            duration_range: (1, 20),
        }
    }

    /// Taillard's duration range on a 6x6 grid.
    pub fn medium() -> Self {
        Self {
            num_jobs: 6,
            num_machines: 6,
            duration_range: (1, 99),
        }
    }
}

/// Seeded generator.
pub struct InstanceGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl InstanceGenerator {
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draws raw jobs as `(machine, duration)` routes.
    pub fn generate_jobs(&mut self) -> Vec<Vec<(i64, i64)>> {
        let (low, high) = self.config.duration_range;
        let (low, high) = (low.min(high), low.max(high));
        let mut machines: Vec<i64> = (0..self.config.num_machines as i64).collect();

        (0..self.config.num_jobs)
            .map(|_| {
                machines.shuffle(&mut self.rng);
                machines
                    .iter()
                    .map(|&m| (m, self.rng.random_range(low..=high)))
                    .collect()
            })
            .collect()
    }

    /// Draws an instance.
    ///
    /// # Errors
    /// [`InvalidInstance`] when the configuration cannot produce a valid
    /// instance (no jobs, no machines or negative durations).
    pub fn generate(&mut self) -> Result<JobShopInstance, InvalidInstance> {
        let jobs = self.generate_jobs();
        JobShopInstance::with_machines(jobs, self.config.num_machines)
    }
}

//! Configuration management for local clustering runs

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::cluster::sweep::SweepSelector;
use crate::cluster::walk::DEFAULT_EXPLORATION_DAMPING;
use crate::cluster::{CutMetric, PageRankScorer, RandomWalkScorer, Scorer, Variant};
use crate::error::ClusterResult;
use crate::graph::VertexId;

/// Knobs for a single nibble run or coverage pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Seed-expansion strategy
    pub variant: Variant,

    /// Cut quality measure used by the sweep
    pub metric: CutMetric,

    /// Largest community the sweep may select (0 = no cap)
    pub max_cutsize: usize,

    /// Walk steps, or the PageRank iteration cap
    pub max_iterations: usize,

    /// Minimum normalized score for a vertex to join a community
    pub epsilon: f64,

    /// PageRank convergence tolerance
    pub tolerance: f64,

    /// PageRank damping factor
    pub alpha: f64,

    /// Growth damping of the random walk's degree budget
    pub exploration_damping: f64,

    /// Expected number of distinct vertices a walk touches (0 = graph size)
    pub domain_hint: usize,

    /// Seed for the walk's random source
    pub rng_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::PageRank,
            metric: CutMetric::Conductance,
            max_cutsize: 10,
            max_iterations: 100,
            epsilon: 1e-7,
            tolerance: 1e-7,
            alpha: 0.85,
            exploration_damping: DEFAULT_EXPLORATION_DAMPING,
            domain_hint: 0,
            rng_seed: 42,
        }
    }
}

impl Config {
    /// Create a new configuration with custom values
    pub fn new(
        variant: Variant,
        metric: CutMetric,
        max_cutsize: usize,
        max_iterations: usize,
        epsilon: f64,
    ) -> Self {
        Self {
            variant,
            metric,
            max_cutsize,
            max_iterations,
            epsilon,
            ..Self::default()
        }
    }

    /// Sweep selector for these settings
    pub fn sweep_selector(&self) -> SweepSelector {
        SweepSelector::new(self.metric, self.max_cutsize)
    }

    /// Scorer for the configured variant. Walks get a fresh RNG seeded from `rng_seed`.
    pub fn scorer(&self) -> ClusterResult<Box<dyn Scorer>> {
        Ok(match self.variant {
            Variant::Vanilla => Box::new(
                RandomWalkScorer::new(StdRng::seed_from_u64(self.rng_seed), self.max_iterations)
                    .with_damping(self.exploration_damping)
                    .with_domain_hint(self.domain_hint),
            ),
            Variant::PageRank => Box::new(PageRankScorer::new(
                self.alpha,
                self.tolerance,
                self.max_iterations,
            )?),
        })
    }
}

/// Parameter grid for a sweep over seeds and settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub seeds: Vec<VertexId>,
    pub variants: Vec<Variant>,
    pub metrics: Vec<CutMetric>,
    pub cutsizes: Vec<usize>,
    pub epsilons: Vec<f64>,
    pub iterations: Vec<usize>,

    /// Settings not covered by the grid
    pub base: Config,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            seeds: vec![4],
            variants: vec![Variant::Vanilla, Variant::PageRank],
            metrics: vec![CutMetric::Conductance],
            cutsizes: vec![10, 15],
            epsilons: vec![1e-4, 1e-7, 1e-10],
            iterations: vec![100, 200],
            base: Config::default(),
        }
    }
}

impl SweepPlan {
    /// Number of runs the grid expands to
    pub fn run_count(&self) -> usize {
        self.seeds.len()
            * self.variants.len()
            * self.metrics.len()
            * self.cutsizes.len()
            * self.epsilons.len()
            * self.iterations.len()
    }
}

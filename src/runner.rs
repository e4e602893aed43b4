//! Parameter sweeps and coverage runs over a loaded graph

use anyhow::{Context, Result};
use itertools::iproduct;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cluster::detection::{nibble, CoverageDriver, CoverageReport, NibbleResult};
use crate::cluster::{CutMetric, Variant};
use crate::config::{Config, SweepPlan};
use crate::error::ClusterError;
use crate::graph::{CompressedGraph, VertexId};

/// Annotation key for one configuration, e.g. `v=pr_s=4_m=conductance_cs=10_e=1e-7_i=100`
pub fn annotation_key(
    variant: Variant,
    seed: VertexId,
    metric: CutMetric,
    cutsize: usize,
    epsilon: f64,
    iteration: usize,
) -> String {
    format!("v={variant}_s={seed}_m={metric}_cs={cutsize}_e={epsilon:e}_i={iteration}")
}

/// One single-seed nibble from a sweep
#[derive(Debug, Clone, Serialize)]
pub struct NibbleRun {
    pub seed: VertexId,
    pub config: Config,
    pub outcome: crate::cluster::SweepOutcome,
    pub community: Vec<VertexId>,
    #[serde(skip)]
    pub result: NibbleResult,
}

impl NibbleRun {
    pub fn key(&self) -> String {
        annotation_key(
            self.config.variant,
            self.seed,
            self.config.metric,
            self.config.max_cutsize,
            self.config.epsilon,
            self.config.max_iterations,
        )
    }
}

/// Run a single nibble with `config` from `seed`
pub fn run_nibble(graph: &CompressedGraph, seed: VertexId, config: &Config) -> Result<NibbleRun, ClusterError> {
    let mut scorer = config.scorer()?;
    let result = nibble(graph, seed, scorer.as_mut(), &config.sweep_selector())?;
    Ok(NibbleRun {
        seed,
        config: config.clone(),
        outcome: result.outcome,
        community: result.community(config.epsilon),
        result,
    })
}

/// Expand `plan` into every seed/setting combination and run a nibble for each.
///
/// Seeds whose walk gets stuck are logged and skipped; an unknown seed fails the sweep.
pub fn run_nibble_sweep(graph: &CompressedGraph, plan: &SweepPlan) -> Result<Vec<NibbleRun>> {
    log::info!("Running parameter sweep of {} configurations", plan.run_count());

    let mut runs = Vec::with_capacity(plan.run_count());
    for (&seed, &variant, &metric, &cutsize, &epsilon, &iterations) in iproduct!(
        &plan.seeds,
        &plan.variants,
        &plan.metrics,
        &plan.cutsizes,
        &plan.epsilons,
        &plan.iterations
    ) {
        let config = Config {
            variant,
            metric,
            max_cutsize: cutsize,
            max_iterations: iterations,
            epsilon,
            tolerance: epsilon,
            ..plan.base.clone()
        };

        let key = annotation_key(variant, seed, metric, cutsize, epsilon, iterations);
        log::info!("currently {}", key);

        match run_nibble(graph, seed, &config) {
            Ok(run) => runs.push(run),
            Err(err @ ClusterError::StuckWalk { .. }) => {
                log::warn!("Skipping {}: {}", key, err);
            }
            Err(err) => return Err(err).with_context(|| format!("nibble run {key}")),
        }
    }

    log::info!("Completed {} of {} runs", runs.len(), plan.run_count());
    Ok(runs)
}

/// Cover the whole graph starting from `seed`
pub fn run_coverage(graph: &CompressedGraph, seed: VertexId, config: &Config) -> Result<CoverageReport> {
    log::info!(
        "Covering graph from seed {} with {} nibble and {}",
        seed,
        config.variant,
        config.metric
    );

    let mut scorer = config.scorer()?;
    let driver = CoverageDriver::from_config(graph, seed, config)
        .with_context(|| format!("coverage from seed {seed}"))?;
    let report = driver.run(scorer.as_mut())?;

    Ok(report)
}

/// Seed, variant and epsilon for coverage annotation keys
pub fn coverage_key(config: &Config, seed: VertexId, iteration: usize) -> String {
    annotation_key(
        config.variant,
        seed,
        config.metric,
        config.max_cutsize,
        config.epsilon,
        iteration,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::detection::CoverageState;
    use crate::graph::builder::GraphBuilder;

    fn two_triangles_bridged() -> CompressedGraph {
        GraphBuilder::from_edges(&[(1, 2), (2, 3), (3, 1), (3, 4), (4, 5), (5, 6), (6, 4)])
    }

    #[test]
    fn test_annotation_key_format() {
        let key = annotation_key(Variant::PageRank, 4, CutMetric::Conductance, 10, 1e-7, 100);
        assert_eq!(key, "v=pr_s=4_m=conductance_cs=10_e=1e-7_i=100");
    }

    #[test]
    fn test_sweep_runs_every_combination() {
        let graph = two_triangles_bridged();
        let plan = SweepPlan {
            seeds: vec![1, 5],
            variants: vec![Variant::Vanilla, Variant::PageRank],
            metrics: vec![CutMetric::Conductance, CutMetric::NormalizedCut],
            cutsizes: vec![0],
            epsilons: vec![1e-7],
            iterations: vec![100],
            base: Config::default(),
        };

        let runs = run_nibble_sweep(&graph, &plan).unwrap();
        assert_eq!(runs.len(), 8);
        for run in &runs {
            assert!(run.community.len() <= graph.node_count);
            assert!(matches!(run.outcome, crate::cluster::SweepOutcome::Cut(_)));
        }
    }

    #[test]
    fn test_sweep_skips_stuck_seeds() {
        let mut builder = GraphBuilder::with_capacity(3);
        builder.add_edge(1, 2);
        builder.get_or_create_node(3);
        let graph = builder.build();

        let plan = SweepPlan {
            seeds: vec![3],
            variants: vec![Variant::Vanilla],
            metrics: vec![CutMetric::Conductance],
            cutsizes: vec![10],
            epsilons: vec![1e-7],
            iterations: vec![10],
            base: Config::default(),
        };
        assert!(run_nibble_sweep(&graph, &plan).unwrap().is_empty());
    }

    #[test]
    fn test_sweep_fails_on_unknown_seed() {
        let graph = two_triangles_bridged();
        let plan = SweepPlan {
            seeds: vec![99],
            ..SweepPlan::default()
        };
        assert!(run_nibble_sweep(&graph, &plan).is_err());
    }

    #[test]
    fn test_coverage_run_terminates() {
        let graph = two_triangles_bridged();
        let report = run_coverage(&graph, 1, &Config::default()).unwrap();

        assert_ne!(report.state, CoverageState::Running);
        assert!(report.records.len() <= graph.node_count);
    }
}

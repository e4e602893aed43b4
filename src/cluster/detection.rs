//! Community detection: single-seed nibbles and whole-graph coverage

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cluster::rank::rank_by_degree;
use crate::cluster::seed::pick_seed;
use crate::cluster::sweep::SweepSelector;
use crate::cluster::{
    community_prefix, CommunityRecord, PageRankScorer, RandomWalkScorer, Ranking, Scorer, SweepOutcome,
};
use crate::config::Config;
use crate::error::{ClusterError, ClusterResult};
use crate::graph::{CompressedGraph, VertexId};

/// Ranking and sweep outcome of one nibble
#[derive(Debug, Clone, PartialEq)]
pub struct NibbleResult {
    pub outcome: SweepOutcome,
    pub ranking: Ranking,
}

impl NibbleResult {
    /// Number of ranking entries the sweep selected
    pub fn community_size(&self) -> usize {
        match self.outcome {
            SweepOutcome::Cut(cut) => cut.k,
            SweepOutcome::Degenerate { .. } => 1,
            SweepOutcome::Empty => 0,
        }
    }

    /// Selected vertices whose normalized score reaches `epsilon`
    pub fn community(&self, epsilon: f64) -> Vec<VertexId> {
        community_prefix(&self.ranking, self.community_size(), epsilon)
    }
}

/// Score, rank and sweep around `seed` in `graph`
pub fn nibble(
    graph: &CompressedGraph,
    seed: VertexId,
    scorer: &mut dyn Scorer,
    selector: &SweepSelector,
) -> ClusterResult<NibbleResult> {
    let scores = scorer.score(graph, seed)?;
    let ranking = rank_by_degree(&scores, graph)?;
    let outcome = selector.select(graph, &ranking)?;

    log::debug!(
        "{} nibble from {}: {} ranked, outcome {:?}",
        scorer.variant(),
        seed,
        ranking.len(),
        outcome
    );

    Ok(NibbleResult { outcome, ranking })
}

/// Random-walk nibble with the walk driven by `rng`
pub fn vanilla_nibble<R: rand::Rng>(
    graph: &CompressedGraph,
    seed: VertexId,
    config: &Config,
    rng: R,
) -> ClusterResult<NibbleResult> {
    let mut scorer = RandomWalkScorer::new(rng, config.max_iterations)
        .with_damping(config.exploration_damping)
        .with_domain_hint(config.domain_hint);
    nibble(graph, seed, &mut scorer, &config.sweep_selector())
}

/// Personalized-PageRank nibble
pub fn pagerank_nibble(graph: &CompressedGraph, seed: VertexId, config: &Config) -> ClusterResult<NibbleResult> {
    let mut scorer = PageRankScorer::new(config.alpha, config.tolerance, config.max_iterations)?;
    nibble(graph, seed, &mut scorer, &config.sweep_selector())
}

/// Coverage driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverageState {
    Running,
    /// The top-ranked score was zero or the walk got stuck; no structure left to find
    Stalled,
    /// Every vertex is claimed
    Covered,
}

/// Everything a coverage pass produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub records: Vec<CommunityRecord>,
    pub state: CoverageState,
    /// Claimed vertices in claim order
    pub used: Vec<VertexId>,
}

/// Repeatedly nibbles from fresh seeds, removing claimed vertices, until the
/// graph is covered or exploration stalls.
pub struct CoverageDriver<'a> {
    graph: &'a CompressedGraph,
    selector: SweepSelector,
    epsilon: f64,
    used: HashSet<VertexId>,
    claimed: Vec<VertexId>,
    seed: VertexId,
    state: CoverageState,
    records: Vec<CommunityRecord>,
}

impl<'a> CoverageDriver<'a> {
    pub fn new(
        graph: &'a CompressedGraph,
        seed: VertexId,
        selector: SweepSelector,
        epsilon: f64,
    ) -> ClusterResult<Self> {
        graph.index_of(seed)?;
        Ok(Self {
            graph,
            selector,
            epsilon,
            used: HashSet::with_capacity(graph.node_count),
            claimed: Vec::with_capacity(graph.node_count),
            seed,
            state: CoverageState::Running,
            records: Vec::new(),
        })
    }

    pub fn from_config(graph: &'a CompressedGraph, seed: VertexId, config: &Config) -> ClusterResult<Self> {
        Self::new(graph, seed, config.sweep_selector(), config.epsilon)
    }

    pub fn state(&self) -> CoverageState {
        self.state
    }

    pub fn used(&self) -> &HashSet<VertexId> {
        &self.used
    }

    pub fn records(&self) -> &[CommunityRecord] {
        &self.records
    }

    /// Run one iteration. A no-op once the driver has left `Running`.
    pub fn step(&mut self, scorer: &mut dyn Scorer) -> ClusterResult<CoverageState> {
        if self.state != CoverageState::Running {
            return Ok(self.state);
        }

        let seed = self.seed;
        let view = self.graph.restrict(&self.used);

        let scores = match scorer.score(&view, seed) {
            Ok(scores) => scores,
            Err(err @ ClusterError::StuckWalk { .. }) => {
                log::info!("Stalled at iteration {}: {}", self.records.len(), err);
                return Ok(self.finish(CoverageState::Stalled));
            }
            Err(err) => return Err(err),
        };
        let ranking = rank_by_degree(&scores, &view)?;

        // Prefixes are scored against the full graph; only scoring sees the view
        let (k, quality) = match self.selector.select(self.graph, &ranking)? {
            SweepOutcome::Cut(cut) => (cut.k, cut.quality),
            SweepOutcome::Degenerate { vertex, .. } => (1, self.selector.metric.evaluate(self.graph, &[vertex])?),
            SweepOutcome::Empty => {
                log::info!("Stalled at iteration {}: nothing ranked from seed {}", self.records.len(), seed);
                return Ok(self.finish(CoverageState::Stalled));
            }
        };

        if ranking[0].1 == 0.0 {
            log::info!("Stalled at iteration {}: top score from seed {} is zero", self.records.len(), seed);
            return Ok(self.finish(CoverageState::Stalled));
        }

        let mut members = community_prefix(&ranking, k, self.epsilon);
        if !members.contains(&seed) {
            members.push(seed);
        }
        for &vertex in &members {
            if self.used.insert(vertex) {
                self.claimed.push(vertex);
            }
        }

        log::debug!(
            "Iteration {}: seed {} claimed {} vertices (k={}, {}={:.6}); {}/{} used",
            self.records.len(),
            seed,
            members.len(),
            k,
            self.selector.metric,
            quality,
            self.used.len(),
            self.graph.node_count
        );

        self.records.push(CommunityRecord {
            iteration: self.records.len(),
            seed,
            members,
            k,
            quality,
        });

        match pick_seed(self.graph, &self.used) {
            Ok(next) => {
                self.seed = next;
                Ok(self.state)
            }
            Err(ClusterError::NoSeedAvailable) => Ok(self.finish(CoverageState::Covered)),
            Err(err) => Err(err),
        }
    }

    /// Iterate until the driver stops. Bounded by the vertex count, since
    /// every iteration claims at least its seed.
    pub fn run(mut self, scorer: &mut dyn Scorer) -> ClusterResult<CoverageReport> {
        for _ in 0..self.graph.node_count {
            if self.step(scorer)? != CoverageState::Running {
                break;
            }
        }

        log::info!(
            "Coverage finished {:?} after {} iterations with {}/{} vertices used",
            self.state,
            self.records.len(),
            self.used.len(),
            self.graph.node_count
        );

        Ok(CoverageReport {
            records: self.records,
            state: self.state,
            used: self.claimed,
        })
    }

    fn finish(&mut self, state: CoverageState) -> CoverageState {
        self.state = state;
        state
    }
}

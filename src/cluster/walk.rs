//! Truncated random-walk scoring ("vanilla nibble")

use std::collections::{BTreeMap, HashMap};
use std::iter;

use rand::Rng;

use crate::cluster::{ScoreMap, Scorer, Variant};
use crate::error::{ClusterError, ClusterResult};
use crate::graph::{CompressedGraph, VertexId};

/// Default factor moderating how fast the walk's degree budget grows
pub const DEFAULT_EXPLORATION_DAMPING: f64 = 0.4;

/// Random-walk scorer with an injected random source
pub struct RandomWalkScorer<R> {
    rng: R,
    max_steps: usize,
    domain_hint: usize,
    damping: f64,
}

impl<R: Rng> RandomWalkScorer<R> {
    pub fn new(rng: R, max_steps: usize) -> Self {
        Self {
            rng,
            max_steps,
            domain_hint: 0,
            damping: DEFAULT_EXPLORATION_DAMPING,
        }
    }

    /// Expected number of distinct vertices; sizes the transition table
    pub fn with_domain_hint(mut self, domain_hint: usize) -> Self {
        self.domain_hint = domain_hint;
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }
}

impl<R: Rng> Scorer for RandomWalkScorer<R> {
    fn score(&mut self, graph: &CompressedGraph, seed: VertexId) -> ClusterResult<ScoreMap> {
        let domain = if self.domain_hint > 0 {
            self.domain_hint
        } else {
            graph.node_count
        };
        random_walk(graph, seed, self.max_steps, domain, self.damping, &mut self.rng)
    }

    fn variant(&self) -> Variant {
        Variant::Vanilla
    }
}

/// Degree-weighted local exploration from `seed`.
///
/// Each step freezes `1 / current_degree` into every still-unset entry of the
/// current vertex's transition row (its neighbors plus itself) and records
/// that value for vertices scored for the first time. The walk then moves to
/// a uniformly chosen vertex with nonzero weight in that row. The degree
/// budget only grows on steps that set at least one entry.
///
/// Fails with `StuckWalk` when the current vertex has no incident edge or its
/// row holds no usable weight (the budget overflowed).
pub fn random_walk<R: Rng + ?Sized>(
    graph: &CompressedGraph,
    seed: VertexId,
    max_steps: usize,
    domain_hint: usize,
    damping: f64,
    rng: &mut R,
) -> ClusterResult<ScoreMap> {
    let start = graph.index_of(seed)?;

    // Sparse transition table: row per visited vertex, ordered for reproducible picks
    let mut weights: HashMap<usize, BTreeMap<usize, f64>> =
        HashMap::with_capacity(domain_hint.min(max_steps.saturating_add(1)));
    let mut result = ScoreMap::with_capacity(domain_hint.min(graph.node_count));

    let mut current = start;
    let mut current_degree = (graph.degree_at(start) + 1) as f64;

    for step in 0..max_steps {
        let neighbors = graph.neighbor_indices(current);
        if neighbors.is_empty() {
            return Err(ClusterError::StuckWalk {
                vertex: graph.id_at(current),
                step,
            });
        }

        let weight = 1.0 / current_degree;
        let usable = weight.is_finite() && weight > 0.0;
        let row = weights.entry(current).or_default();

        let mut changed = false;
        for node in neighbors.iter().map(|&n| n as usize).chain(iter::once(current)) {
            let entry = row.entry(node).or_insert(0.0);
            if *entry == 0.0 && usable {
                *entry = weight;
                result.insert_if_absent(graph.id_at(node), weight);
                changed = true;
            }
        }

        let candidates: Vec<usize> = row
            .iter()
            .filter(|(_, &w)| w > 0.0)
            .map(|(&node, _)| node)
            .collect();
        if candidates.is_empty() {
            return Err(ClusterError::StuckWalk {
                vertex: graph.id_at(current),
                step,
            });
        }

        let next = candidates[rng.gen_range(0..candidates.len())];
        if changed {
            current_degree *= (graph.degree_at(next) + 1) as f64 * damping;
        }
        current = next;
    }

    log::debug!(
        "Random walk from {} touched {} vertices in {} steps",
        seed,
        result.len(),
        max_steps
    );

    Ok(result)
}

//! Personalized PageRank scoring ("pagerank nibble")

use crate::cluster::{ScoreMap, Scorer, Variant};
use crate::error::{ClusterError, ClusterResult};
use crate::graph::algorithms::{PageRankSolver, PowerIteration};
use crate::graph::{CompressedGraph, VertexId};

/// Scores vertices by PageRank personalized on a seed's closed neighborhood
pub struct PageRankScorer<S = PowerIteration> {
    solver: S,
    alpha: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl PageRankScorer<PowerIteration> {
    pub fn new(alpha: f64, tolerance: f64, max_iterations: usize) -> ClusterResult<Self> {
        Self::with_solver(PowerIteration, alpha, tolerance, max_iterations)
    }
}

impl<S: PageRankSolver> PageRankScorer<S> {
    pub fn with_solver(solver: S, alpha: f64, tolerance: f64, max_iterations: usize) -> ClusterResult<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ClusterError::InvalidParameter {
                name: "alpha",
                message: "damping factor must lie strictly between 0 and 1",
            });
        }
        Ok(Self {
            solver,
            alpha,
            tolerance,
            max_iterations,
        })
    }
}

impl<S: PageRankSolver> Scorer for PageRankScorer<S> {
    fn score(&mut self, graph: &CompressedGraph, seed: VertexId) -> ClusterResult<ScoreMap> {
        let personalization = personalization_vector(graph, seed)?;
        Ok(self.solver.compute(
            graph,
            self.alpha,
            &personalization,
            self.max_iterations,
            self.tolerance,
        ))
    }

    fn variant(&self) -> Variant {
        Variant::PageRank
    }
}

/// Uniform mass on `{seed} ∪ neighbors(seed)`, zero elsewhere, indexed by node index
pub fn personalization_vector(graph: &CompressedGraph, seed: VertexId) -> ClusterResult<Vec<f64>> {
    let seed_idx = graph.index_of(seed)?;
    let neighbors = graph.neighbor_indices(seed_idx);
    let mass = 1.0 / (neighbors.len() + 1) as f64;

    let mut personalization = vec![0.0; graph.node_count];
    personalization[seed_idx] = mass;
    for &n in neighbors {
        personalization[n as usize] = mass;
    }

    Ok(personalization)
}

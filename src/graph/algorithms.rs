//! Graph algorithms used by the clustering kernel

use crate::cluster::ScoreMap;
use crate::graph::CompressedGraph;

/// A personalized PageRank solver.
///
/// The clustering kernel only builds the personalization vector and consumes
/// the scores; the linear algebra lives behind this trait.
pub trait PageRankSolver {
    /// Compute personalized PageRank over every vertex of `graph`.
    ///
    /// `personalization` is indexed by internal node index and must have
    /// `graph.node_count` entries.
    fn compute(
        &self,
        graph: &CompressedGraph,
        damping: f64,
        personalization: &[f64],
        max_iterations: usize,
        tolerance: f64,
    ) -> ScoreMap;
}

/// Power-iteration PageRank on an undirected graph
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerIteration;

impl PageRankSolver for PowerIteration {
    fn compute(
        &self,
        graph: &CompressedGraph,
        damping: f64,
        personalization: &[f64],
        max_iterations: usize,
        tolerance: f64,
    ) -> ScoreMap {
        let scores = personalized_pagerank(graph, damping, personalization, max_iterations, tolerance);

        let mut result = ScoreMap::with_capacity(graph.node_count);
        for (idx, score) in scores.into_iter().enumerate() {
            result.insert_if_absent(graph.id_at(idx), score);
        }
        result
    }
}

/// Personalized PageRank by power iteration.
///
/// Starts from the uniform vector. Mass sitting on isolated nodes is handed
/// back through the personalization vector. Stops once the L1 change drops
/// below `node_count * tolerance`; if `max_iterations` is reached first the
/// last iterate is returned and a warning is logged.
pub fn personalized_pagerank(
    graph: &CompressedGraph,
    damping: f64,
    personalization: &[f64],
    max_iterations: usize,
    tolerance: f64,
) -> Vec<f64> {
    let n = graph.node_count;
    if n == 0 {
        return Vec::new();
    }
    let n_f64 = n as f64;

    let p_sum: f64 = personalization.iter().sum();
    let p_vec: Vec<f64> = if p_sum > 0.0 {
        personalization.iter().map(|&x| x / p_sum).collect()
    } else {
        vec![1.0 / n_f64; n]
    };

    let mut scores = vec![1.0 / n_f64; n];
    let mut new_scores = vec![0.0; n];

    for iteration in 0..max_iterations {
        let dangling_sum: f64 = (0..n)
            .filter(|&node| graph.degree_at(node) == 0)
            .map(|node| scores[node])
            .sum();

        for node in 0..n {
            new_scores[node] = (1.0 - damping) * p_vec[node] + damping * dangling_sum * p_vec[node];
        }

        for src in 0..n {
            let degree = graph.degree_at(src);
            if degree == 0 {
                continue;
            }
            let share = damping * scores[src] / degree as f64;
            for &dst in graph.neighbor_indices(src) {
                new_scores[dst as usize] += share;
            }
        }

        let diff: f64 = scores
            .iter()
            .zip(new_scores.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut scores, &mut new_scores);

        if diff < n_f64 * tolerance {
            log::debug!("PageRank converged after {} iterations", iteration + 1);
            return scores;
        }
    }

    log::warn!(
        "PageRank did not converge within {} iterations (tolerance {:e})",
        max_iterations,
        tolerance
    );
    scores
}

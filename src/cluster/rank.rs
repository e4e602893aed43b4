//! Degree-normalized ranking of score maps

use crate::cluster::{Ranking, ScoreMap};
use crate::error::ClusterResult;
use crate::graph::CompressedGraph;

/// Normalize every score by its vertex degree and sort descending.
///
/// Degree-0 vertices get a normalized score of 0. The sort is stable, so
/// equal scores keep the score map's insertion order.
pub fn rank_by_degree(scores: &ScoreMap, graph: &CompressedGraph) -> ClusterResult<Ranking> {
    let mut ranking = Vec::with_capacity(scores.len());

    for (vertex, score) in scores.iter() {
        let degree = graph.degree(vertex)?;
        let normalized = if degree > 0 { score / degree as f64 } else { 0.0 };
        ranking.push((vertex, normalized));
    }

    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranking)
}

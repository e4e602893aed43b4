//! Seed selection among unclaimed vertices

use std::collections::HashSet;

use crate::error::{ClusterError, ClusterResult};
use crate::graph::{CompressedGraph, VertexId};

/// Highest-degree vertex of `graph` once `used` is removed.
///
/// Degrees are taken in the restricted view. Ties go to the vertex
/// enumerated first. Fails with `NoSeedAvailable` when nothing is left.
pub fn pick_seed(graph: &CompressedGraph, used: &HashSet<VertexId>) -> ClusterResult<VertexId> {
    let remaining = graph.restrict(used);
    max_degree_vertex(&remaining).ok_or(ClusterError::NoSeedAvailable)
}

/// Highest-degree vertex, first in enumeration order on ties
pub fn max_degree_vertex(graph: &CompressedGraph) -> Option<VertexId> {
    let mut best: Option<(usize, usize)> = None;
    for node in 0..graph.node_count {
        let degree = graph.degree_at(node);
        if best.map_or(true, |(_, best_degree)| degree > best_degree) {
            best = Some((node, degree));
        }
    }
    best.map(|(node, _)| graph.id_at(node))
}

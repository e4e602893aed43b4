//! Cut quality metrics for candidate communities

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClusterResult;
use crate::graph::{CompressedGraph, VertexId};

/// Cut quality measure; lower is better for all variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CutMetric {
    /// cut / min(vol(S), vol(¬S))
    Conductance,
    /// cut / |S| + cut / |¬S|
    RatioCut,
    /// cut / vol(S) + cut / vol(¬S)
    NormalizedCut,
}

impl CutMetric {
    /// Quality of the vertex set `members` in `graph`
    pub fn evaluate(&self, graph: &CompressedGraph, members: &[VertexId]) -> ClusterResult<f64> {
        Ok(self.score(&CutStats::compute(graph, members)?))
    }

    /// Quality from precomputed statistics
    pub fn score(&self, stats: &CutStats) -> f64 {
        let cut = stats.cut as f64;
        match self {
            CutMetric::Conductance => ratio(cut, stats.volume_in.min(stats.volume_out)),
            CutMetric::RatioCut => ratio(cut, stats.size_in) + ratio(cut, stats.size_out),
            CutMetric::NormalizedCut => ratio(cut, stats.volume_in) + ratio(cut, stats.volume_out),
        }
    }
}

impl fmt::Display for CutMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CutMetric::Conductance => "conductance",
            CutMetric::RatioCut => "ratio-cut",
            CutMetric::NormalizedCut => "normalized-cut",
        };
        f.write_str(name)
    }
}

/// `numerator / denominator`, or 0 for an empty denominator
fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}

/// Boundary and volume counts of a vertex set against the rest of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CutStats {
    /// Edges with exactly one endpoint inside the set
    pub cut: usize,
    /// Sum of degrees inside the set
    pub volume_in: usize,
    /// Sum of degrees outside the set
    pub volume_out: usize,
    /// Vertices inside the set
    pub size_in: usize,
    /// Vertices outside the set
    pub size_out: usize,
}

impl CutStats {
    /// Count boundary edges and volumes for `members`.
    ///
    /// Only the inside is walked: each boundary edge has exactly one endpoint
    /// there, so it is counted once. Repeated ids count once.
    pub fn compute(graph: &CompressedGraph, members: &[VertexId]) -> ClusterResult<CutStats> {
        let mut inside: HashSet<u32> = HashSet::with_capacity(members.len());
        for &vertex in members {
            inside.insert(graph.index_of(vertex)? as u32);
        }

        let mut cut = 0;
        let mut volume_in = 0;
        for &node in &inside {
            let node = node as usize;
            volume_in += graph.degree_at(node);
            cut += graph
                .neighbor_indices(node)
                .iter()
                .filter(|&&n| !inside.contains(&n))
                .count();
        }

        let size_in = inside.len();
        Ok(CutStats {
            cut,
            volume_in,
            volume_out: graph.total_volume() - volume_in,
            size_in,
            size_out: graph.node_count - size_in,
        })
    }
}

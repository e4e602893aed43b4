//! Local cluster analysis module

pub mod walk;
pub mod ppr;
pub mod rank;
pub mod metrics;
pub mod sweep;
pub mod seed;
pub mod detection;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClusterResult;
use crate::graph::{CompressedGraph, VertexId};

pub use metrics::CutMetric;
pub use ppr::PageRankScorer;
pub use sweep::SweepOutcome;
pub use walk::RandomWalkScorer;

/// Seed-local scoring strategy
pub trait Scorer {
    /// Score vertices around `seed` in `graph`
    fn score(&mut self, graph: &CompressedGraph, seed: VertexId) -> ClusterResult<ScoreMap>;

    /// Which expansion strategy this scorer implements
    fn variant(&self) -> Variant;
}

/// Vertex scores produced by a scorer.
///
/// Only touched vertices appear. Iteration follows insertion order, so two
/// runs that touch vertices in the same order rank them the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    entries: Vec<(VertexId, f64)>,
    positions: HashMap<VertexId, usize>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Record a score unless the vertex already has one. Returns whether it was recorded.
    pub fn insert_if_absent(&mut self, vertex: VertexId, score: f64) -> bool {
        if self.positions.contains_key(&vertex) {
            return false;
        }
        self.positions.insert(vertex, self.entries.len());
        self.entries.push((vertex, score));
        true
    }

    pub fn get(&self, vertex: VertexId) -> Option<f64> {
        self.positions.get(&vertex).map(|&pos| self.entries[pos].1)
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.positions.contains_key(&vertex)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, f64)> + '_ {
        self.entries.iter().copied()
    }
}

/// `(vertex, normalized score)` pairs, sorted descending by score
pub type Ranking = Vec<(VertexId, f64)>;

/// A prefix length and its quality under some metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cut {
    pub k: usize,
    pub quality: f64,
}

/// Seed-expansion strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Truncated random walk ("vanilla nibble")
    Vanilla,
    /// Personalized PageRank ("pagerank nibble")
    #[serde(rename = "pagerank")]
    #[value(name = "pagerank")]
    PageRank,
}

impl Variant {
    /// Short tag used in annotation keys
    pub fn tag(&self) -> &'static str {
        match self {
            Variant::Vanilla => "v",
            Variant::PageRank => "pr",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A community claimed by one iteration of the coverage driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecord {
    /// Zero-based iteration index
    pub iteration: usize,

    /// Seed the community grew from
    pub seed: VertexId,

    /// Claimed vertices; always contains the seed
    pub members: Vec<VertexId>,

    /// Selected prefix length
    pub k: usize,

    /// Cut quality of the selected prefix
    pub quality: f64,
}

impl CommunityRecord {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Take the first `k` ranking entries, stopping early at the first entry
/// whose score falls below `epsilon`.
pub fn community_prefix(ranking: &[(VertexId, f64)], k: usize, epsilon: f64) -> Vec<VertexId> {
    ranking
        .iter()
        .take(k)
        .take_while(|&&(_, score)| score >= epsilon)
        .map(|&(vertex, _)| vertex)
        .collect()
}

//! Best-prefix selection over a ranking

use serde::{Deserialize, Serialize};

use crate::cluster::{Cut, CutMetric, Ranking};
use crate::error::ClusterResult;
use crate::graph::{CompressedGraph, VertexId};

/// Result of a sweep.
///
/// The normal path yields a `(k, quality)` cut. When the scan range is empty
/// the top ranking entry comes back unchanged as `(vertex, score)`, so
/// callers have to branch on the shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SweepOutcome {
    Cut(Cut),
    Degenerate { vertex: VertexId, score: f64 },
    Empty,
}

/// Scans increasing prefixes of a ranking for the lowest cut quality
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSelector {
    pub metric: CutMetric,
    /// Largest prefix considered; 0 means the whole ranking
    pub max_cutsize: usize,
}

impl SweepSelector {
    pub fn new(metric: CutMetric, max_cutsize: usize) -> Self {
        Self { metric, max_cutsize }
    }

    /// Effective scan limit for a ranking of `len` entries
    pub fn limit(&self, len: usize) -> usize {
        if self.max_cutsize < 1 || self.max_cutsize > len {
            len
        } else {
            self.max_cutsize
        }
    }

    /// Prefix sizes that will be evaluated; the limit itself never is
    fn scan_range(&self, len: usize) -> std::ops::Range<usize> {
        1..self.limit(len).max(1)
    }

    /// Every evaluated `(k, quality)` pair in scan order.
    ///
    /// Statistics are recomputed from scratch for each prefix.
    pub fn profile(&self, graph: &CompressedGraph, ranking: &Ranking) -> ClusterResult<Vec<Cut>> {
        let vertices: Vec<VertexId> = ranking.iter().map(|&(vertex, _)| vertex).collect();

        self.scan_range(ranking.len())
            .map(|k| {
                let quality = self.metric.evaluate(graph, &vertices[..k])?;
                Ok(Cut { k, quality })
            })
            .collect()
    }

    /// Pick the prefix with minimal quality; ties go to the smallest k
    pub fn select(&self, graph: &CompressedGraph, ranking: &Ranking) -> ClusterResult<SweepOutcome> {
        let Some(&(top_vertex, top_score)) = ranking.first() else {
            return Ok(SweepOutcome::Empty);
        };

        let mut best: Option<Cut> = None;
        for cut in self.profile(graph, ranking)? {
            log::debug!("{} at k={}: {:.6}", self.metric, cut.k, cut.quality);
            if best.map_or(true, |b| cut.quality < b.quality) {
                best = Some(cut);
            }
        }

        Ok(match best {
            Some(cut) => SweepOutcome::Cut(cut),
            None => SweepOutcome::Degenerate {
                vertex: top_vertex,
                score: top_score,
            },
        })
    }
}

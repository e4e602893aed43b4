//! Error types for the clustering kernel

use crate::graph::VertexId;
use thiserror::Error;

/// Conditions raised by the local clustering kernel.
///
/// Everything except `VertexNotFound` is recoverable: the coverage driver
/// turns those into state transitions instead of failing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// The random walk reached a vertex whose transition row has no usable entry
    #[error("random walk stuck at vertex {vertex} after {step} steps")]
    StuckWalk { vertex: VertexId, step: usize },

    /// Lookup on a vertex that is not part of the graph view
    #[error("vertex {0} not found in graph")]
    VertexNotFound(VertexId),

    /// Every vertex has been claimed; there is nothing left to seed from
    #[error("no seed available: all vertices are claimed")]
    NoSeedAvailable,

    /// A kernel parameter is out of its valid range
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: &'static str,
    },
}

/// Result alias for kernel operations.
pub type ClusterResult<T> = std::result::Result<T, ClusterError>;

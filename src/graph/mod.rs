//! Graph representation and algorithms module

pub mod compressed;
pub mod builder;
pub mod algorithms;

pub use compressed::CompressedGraph;

/// External vertex identifier, as read from the edge list
pub type VertexId = u64;

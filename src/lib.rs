//! Seed-local graph clustering: random-walk and personalized-PageRank nibbles,
//! cut-quality sweeps, and whole-graph coverage

pub mod config;
pub mod error;
pub mod data;
pub mod graph;
pub mod cluster;
pub mod runner;
pub mod storage;
pub mod viz;

pub use anyhow::{Result, anyhow};
pub use error::{ClusterError, ClusterResult};

//! Graph construction module

use std::collections::HashMap;

use crate::graph::{CompressedGraph, VertexId};

/// Builder for incrementally constructing an undirected CompressedGraph
pub struct GraphBuilder {
    /// Number of nodes
    node_count: usize,

    /// Mapping from external ids to node indices
    id_to_index: HashMap<VertexId, u32>,

    /// External ids in first-seen order
    node_ids: Vec<VertexId>,

    /// Adjacency lists for each node
    adjacency_lists: Vec<Vec<u32>>,

    /// Self-loops dropped while building
    skipped_self_loops: usize,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            node_count: 0,
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
            skipped_self_loops: 0,
        }
    }

    /// Build a graph straight from an edge list
    pub fn from_edges(edges: &[(VertexId, VertexId)]) -> CompressedGraph {
        let mut builder = Self::with_capacity(edges.len());
        for &(a, b) in edges {
            builder.add_edge(a, b);
        }
        builder.build()
    }

    /// Get or create a node index for the given vertex id
    pub fn get_or_create_node(&mut self, id: VertexId) -> u32 {
        if let Some(&idx) = self.id_to_index.get(&id) {
            return idx;
        }

        let idx = self.node_count as u32;
        self.id_to_index.insert(id, idx);
        self.node_ids.push(id);
        self.adjacency_lists.push(Vec::new());
        self.node_count += 1;

        idx
    }

    /// Add an undirected edge. Self-loops register the vertex but add no edge.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) {
        let a_idx = self.get_or_create_node(a);
        let b_idx = self.get_or_create_node(b);

        if a_idx == b_idx {
            self.skipped_self_loops += 1;
            return;
        }

        self.adjacency_lists[a_idx as usize].push(b_idx);
        self.adjacency_lists[b_idx as usize].push(a_idx);
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Build the compressed graph, collapsing duplicate edges
    pub fn build(mut self) -> CompressedGraph {
        if self.skipped_self_loops > 0 {
            log::debug!("Dropped {} self-loops", self.skipped_self_loops);
        }

        for list in &mut self.adjacency_lists {
            // Sorted for binary search; dedup collapses repeated edges
            list.sort_unstable();
            list.dedup();
        }

        let edge_count: usize = self.adjacency_lists.iter().map(|list| list.len()).sum();

        let mut offsets = Vec::with_capacity(self.node_count + 1);
        offsets.push(0);

        let mut offset = 0;
        for list in &self.adjacency_lists {
            offset += list.len() as u32;
            offsets.push(offset);
        }

        let mut edges = Vec::with_capacity(edge_count);
        for list in &self.adjacency_lists {
            edges.extend_from_slice(list);
        }

        CompressedGraph {
            node_count: self.node_count,
            offsets,
            edges,
            node_ids: self.node_ids,
            id_to_index: self.id_to_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_edges_collapse() {
        let graph = GraphBuilder::from_edges(&[(1, 2), (2, 1), (1, 2), (2, 3)]);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(1).unwrap(), 1);
        assert_eq!(graph.degree(2).unwrap(), 2);
    }

    #[test]
    fn test_self_loop_registers_vertex_only() {
        let graph = GraphBuilder::from_edges(&[(5, 5), (1, 2)]);
        assert_eq!(graph.node_count, 3);
        assert_eq!(graph.degree(5).unwrap(), 0);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_first_seen_order() {
        let graph = GraphBuilder::from_edges(&[(9, 3), (3, 7)]);
        assert_eq!(graph.vertices().collect::<Vec<_>>(), vec![9, 3, 7]);
    }
}

//! Memory-efficient undirected graph representation

use std::collections::{HashMap, HashSet};
use std::mem;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::error::{ClusterError, ClusterResult};
use crate::graph::VertexId;

/// Compressed sparse row representation of an undirected graph.
///
/// Every edge is stored in both endpoints' adjacency lists. Internal indices
/// follow the order in which vertices were first seen, which is also the
/// vertex enumeration order. The structure is never mutated after
/// construction; [`CompressedGraph::restrict`] hands back a new value.
#[derive(Debug, Clone, Default)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Offset array: index where each node's edges begin
    /// offsets[i] to offsets[i+1] defines the edge range for node i
    pub offsets: Vec<u32>,

    /// Edge array: concatenated, sorted lists of neighbor indices
    pub edges: Vec<u32>,

    /// Mapping from internal node indices to external vertex ids
    pub node_ids: Vec<VertexId>,

    /// Reverse lookup from external vertex id to internal index
    pub id_to_index: HashMap<VertexId, u32>,
}

impl CompressedGraph {
    /// Create an empty graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count: 0,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count),
            node_ids: Vec::with_capacity(node_count),
            id_to_index: HashMap::with_capacity(node_count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Neighbor indices of the node at `node`
    pub fn neighbor_indices(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Degree of the node at index `node`
    pub fn degree_at(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }

    /// Internal index of a vertex id
    pub fn index_of(&self, vertex: VertexId) -> ClusterResult<usize> {
        self.id_to_index
            .get(&vertex)
            .map(|&idx| idx as usize)
            .ok_or(ClusterError::VertexNotFound(vertex))
    }

    /// External id of the node at `node`
    pub fn id_at(&self, node: usize) -> VertexId {
        self.node_ids[node]
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.id_to_index.contains_key(&vertex)
    }

    /// Neighbors of `vertex` as external ids
    pub fn neighbors(&self, vertex: VertexId) -> ClusterResult<impl Iterator<Item = VertexId> + '_> {
        let idx = self.index_of(vertex)?;
        Ok(self
            .neighbor_indices(idx)
            .iter()
            .map(move |&n| self.node_ids[n as usize]))
    }

    pub fn degree(&self, vertex: VertexId) -> ClusterResult<usize> {
        Ok(self.degree_at(self.index_of(vertex)?))
    }

    /// Vertex ids in enumeration order
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.node_ids.iter().copied()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Sum of all degrees (twice the edge count)
    pub fn total_volume(&self) -> usize {
        self.edges.len()
    }

    /// Build a new graph with `excluded` vertices and their incident edges removed.
    ///
    /// The source graph is left untouched. Excluded ids that are not part of
    /// the graph are ignored. Surviving vertices keep their relative order.
    pub fn restrict(&self, excluded: &HashSet<VertexId>) -> CompressedGraph {
        let keep: Vec<bool> = self
            .node_ids
            .iter()
            .map(|id| !excluded.contains(id))
            .collect();
        let kept_count = keep.iter().filter(|&&k| k).count();

        // Create mapping from original to restricted indices
        let mut orig_to_new = vec![u32::MAX; self.node_count];
        let mut next_idx = 0u32;
        for node in 0..self.node_count {
            if keep[node] {
                orig_to_new[node] = next_idx;
                next_idx += 1;
            }
        }

        let mut restricted = CompressedGraph::with_capacity(kept_count, self.edges.len());
        restricted.offsets.push(0);
        let mut offset = 0u32;

        for node in 0..self.node_count {
            if !keep[node] {
                continue;
            }

            for &target in self.neighbor_indices(node) {
                let target_idx = target as usize;
                // Only include edges where both endpoints survive
                if keep[target_idx] {
                    // Mapping is monotone, so lists stay sorted
                    restricted.edges.push(orig_to_new[target_idx]);
                    offset += 1;
                }
            }
            restricted.offsets.push(offset);

            let id = self.node_ids[node];
            restricted.id_to_index.insert(id, orig_to_new[node]);
            restricted.node_ids.push(id);
        }

        restricted.node_count = kept_count;
        restricted
    }

    /// Convert to a petgraph undirected graph whose node weights are vertex ids.
    ///
    /// Node indices of the result match this graph's internal indices.
    pub fn to_petgraph(&self) -> UnGraph<VertexId, ()> {
        let mut graph = UnGraph::with_capacity(self.node_count, self.edge_count());
        for &id in &self.node_ids {
            graph.add_node(id);
        }

        for src in 0..self.node_count {
            for &dst in self.neighbor_indices(src) {
                // Each undirected edge once
                if (dst as usize) > src {
                    graph.add_edge(NodeIndex::new(src), NodeIndex::new(dst as usize), ());
                }
            }
        }

        graph
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let edges = self.edges.capacity() * mem::size_of::<u32>();
        let ids = self.node_ids.capacity() * mem::size_of::<VertexId>();
        let lookup = self.id_to_index.capacity() * (mem::size_of::<VertexId>() + mem::size_of::<u32>());

        base + offsets + edges + ids + lookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn path_graph() -> CompressedGraph {
        // 10 - 20 - 30 - 40
        GraphBuilder::from_edges(&[(10, 20), (20, 30), (30, 40)])
    }

    #[test]
    fn test_neighbors_and_degree() {
        let graph = path_graph();

        assert_eq!(graph.node_count, 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.total_volume(), 6);
        assert_eq!(graph.degree(20).unwrap(), 2);
        assert_eq!(graph.degree(40).unwrap(), 1);

        let neighbors: Vec<_> = graph.neighbors(30).unwrap().collect();
        assert_eq!(neighbors, vec![20, 40]);
    }

    #[test]
    fn test_missing_vertex() {
        let graph = path_graph();
        assert_eq!(graph.degree(99), Err(ClusterError::VertexNotFound(99)));
        assert!(graph.neighbors(99).is_err());
        assert!(!graph.contains(99));
    }

    #[test]
    fn test_restrict_leaves_source_untouched() {
        let graph = path_graph();
        let excluded: HashSet<VertexId> = [20].into_iter().collect();

        let restricted = graph.restrict(&excluded);

        assert_eq!(restricted.node_count, 3);
        assert_eq!(restricted.edge_count(), 1);
        assert_eq!(restricted.vertices().collect::<Vec<_>>(), vec![10, 30, 40]);
        assert_eq!(restricted.degree(10).unwrap(), 0);
        assert_eq!(restricted.degree(30).unwrap(), 1);
        assert!(!restricted.contains(20));

        // Source keeps its edges
        assert_eq!(graph.node_count, 4);
        assert_eq!(graph.degree(20).unwrap(), 2);
    }

    #[test]
    fn test_restrict_ignores_unknown_ids() {
        let graph = path_graph();
        let excluded: HashSet<VertexId> = [7, 8].into_iter().collect();
        let restricted = graph.restrict(&excluded);
        assert_eq!(restricted.node_count, 4);
        assert_eq!(restricted.edge_count(), 3);
    }

    #[test]
    fn test_to_petgraph() {
        let graph = path_graph();
        let pg = graph.to_petgraph();
        assert_eq!(pg.node_count(), 4);
        assert_eq!(pg.edge_count(), 3);
        assert_eq!(petgraph::algo::connected_components(&pg), 1);
    }
}

//! Shared utilities for graph algorithms
//!
//! Provides a read-only, optimized view of the graph topology for algorithm execution.

use std::collections::HashMap;
use std::hash::Hash;

/// Opaque handle the caller attaches to every projected edge.
///
/// Algorithms hand these back in their results so the caller can map a
/// path step onto its own edge identifiers.
pub type EdgeRef = usize;

/// A dense, integer-indexed view of the graph topology using Compressed Sparse Row (CSR) format.
///
/// `N` is the caller's node key. Symmetric relationships are projected as two
/// arcs sharing the same [`EdgeRef`].
#[derive(Debug, Clone)]
pub struct GraphView<N> {
    /// Number of nodes
    pub node_count: usize,
    /// Mapping from dense index (0..N) back to the node key
    pub index_to_node: Vec<N>,
    /// Mapping from node key to dense index
    pub node_to_index: HashMap<N, usize>,
    /// Whether a path may pass through each node. Stop nodes can still
    /// start or end a path.
    pub transit: Vec<bool>,

    /// Offsets into `out_targets`. Size = node_count + 1
    pub out_offsets: Vec<usize>,
    /// Contiguous array of target node indices
    pub out_targets: Vec<usize>,
    /// Edge handles, aligned with `out_targets`
    pub out_edges: Vec<EdgeRef>,
    /// Edge weights, aligned with `out_targets`
    pub weights: Vec<f64>,
}

impl<N: Hash + Eq + Clone> GraphView<N> {
    /// Dense index of a node key, if projected
    pub fn index_of(&self, node: &N) -> Option<usize> {
        self.node_to_index.get(node).copied()
    }

    /// Can a path continue out of this node when it is not the source?
    pub fn is_transit(&self, idx: usize) -> bool {
        self.transit[idx]
    }

    /// Get the out-degree of a node (by index)
    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Get outgoing neighbors (successors) of a node
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Get the edge handles of a node's outgoing arcs
    pub fn edge_refs(&self, idx: usize) -> &[EdgeRef] {
        &self.out_edges[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Get weights for outgoing arcs of a node
    pub fn arc_weights(&self, idx: usize) -> &[f64] {
        &self.weights[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Number of projected arcs
    pub fn arc_count(&self) -> usize {
        self.out_targets.len()
    }
}

/// Incremental builder for a [`GraphView`].
///
/// Nodes are registered first (duplicates are ignored), then arcs between
/// registered nodes. Arcs touching an unregistered node are dropped. Node
/// filters are expressed with [`add_stop`](Self::add_stop), which keeps the
/// view usable for any pair of endpoints.
#[derive(Debug)]
pub struct GraphViewBuilder<N> {
    index_to_node: Vec<N>,
    node_to_index: HashMap<N, usize>,
    transit: Vec<bool>,
    outgoing: Vec<Vec<(usize, EdgeRef, f64)>>,
}

impl<N: Hash + Eq + Clone> GraphViewBuilder<N> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            index_to_node: Vec::with_capacity(nodes),
            node_to_index: HashMap::with_capacity(nodes),
            transit: Vec::with_capacity(nodes),
            outgoing: Vec::with_capacity(nodes),
        }
    }

    /// Register a node, returning its dense index
    pub fn add_node(&mut self, node: N) -> usize {
        self.register(node, true)
    }

    /// Register a node that paths may start or end at but never pass through
    pub fn add_stop(&mut self, node: N) -> usize {
        self.register(node, false)
    }

    fn register(&mut self, node: N, transit: bool) -> usize {
        if let Some(&idx) = self.node_to_index.get(&node) {
            return idx;
        }
        let idx = self.index_to_node.len();
        self.index_to_node.push(node.clone());
        self.node_to_index.insert(node, idx);
        self.transit.push(transit);
        self.outgoing.push(Vec::new());
        idx
    }

    pub fn contains(&self, node: &N) -> bool {
        self.node_to_index.contains_key(node)
    }

    /// Add a directed arc. Returns false if either endpoint is not registered.
    pub fn add_arc(&mut self, from: &N, to: &N, edge: EdgeRef, weight: f64) -> bool {
        let (Some(&u), Some(&v)) = (self.node_to_index.get(from), self.node_to_index.get(to)) else {
            return false;
        };
        self.outgoing[u].push((v, edge, weight));
        true
    }

    /// Flatten the adjacency lists into CSR form
    pub fn build(self) -> GraphView<N> {
        let node_count = self.index_to_node.len();
        let mut out_offsets = Vec::with_capacity(node_count + 1);
        let mut out_targets = Vec::new();
        let mut out_edges = Vec::new();
        let mut weights = Vec::new();

        out_offsets.push(0);
        for arcs in self.outgoing {
            for (target, edge, weight) in arcs {
                out_targets.push(target);
                out_edges.push(edge);
                weights.push(weight);
            }
            out_offsets.push(out_targets.len());
        }

        GraphView {
            node_count,
            index_to_node: self.index_to_node,
            node_to_index: self.node_to_index,
            transit: self.transit,
            out_offsets,
            out_targets,
            out_edges,
            weights,
        }
    }
}

impl<N: Hash + Eq + Clone> Default for GraphViewBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_csr_layout() {
        let mut builder = GraphViewBuilder::new();
        builder.add_node("a");
        builder.add_node("b");
        builder.add_node("c");
        assert!(builder.add_arc(&"a", &"b", 10, 1.0));
        assert!(builder.add_arc(&"a", &"c", 11, 2.0));
        assert!(builder.add_arc(&"b", &"c", 12, 0.5));
        let view = builder.build();

        assert_eq!(view.node_count, 3);
        assert_eq!(view.arc_count(), 3);
        let a = view.index_of(&"a").unwrap();
        let c = view.index_of(&"c").unwrap();
        assert_eq!(view.out_degree(a), 2);
        assert_eq!(view.out_degree(c), 0);
        assert_eq!(view.successors(a), &[1, 2]);
        assert_eq!(view.edge_refs(a), &[10, 11]);
        assert_eq!(view.arc_weights(a), &[1.0, 2.0]);
    }

    #[test]
    fn test_arcs_to_unregistered_nodes_are_dropped() {
        let mut builder = GraphViewBuilder::new();
        builder.add_node(1u64);
        assert!(!builder.add_arc(&1, &2, 0, 1.0));
        assert_eq!(builder.add_node(1), 0);
        assert!(builder.contains(&1));
        let view = builder.build();
        assert_eq!(view.arc_count(), 0);
    }

    #[test]
    fn test_stop_nodes() {
        let mut builder = GraphViewBuilder::new();
        builder.add_node("a");
        builder.add_stop("b");
        assert_eq!(builder.add_node("b"), 1);
        let view = builder.build();
        assert!(view.is_transit(0));
        assert!(!view.is_transit(1));
    }
}

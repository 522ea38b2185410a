//! Pathfinding algorithms
//!
//! BFS (fewest hops) and Dijkstra (weighted shortest path), both with an
//! optional hop cap and both reporting the edge handles used along the path.

use super::common::{EdgeRef, GraphView};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::hash::Hash;

/// Result of a pathfinding algorithm
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult<N> {
    pub source: N,
    pub target: N,
    /// Nodes from source to target inclusive
    pub path: Vec<N>,
    /// Edge handles, one per step (`path.len() - 1` entries)
    pub edges: Vec<EdgeRef>,
    pub cost: f64,
    /// Nodes settled before the target was reached
    pub nodes_visited: usize,
    /// Arcs examined during relaxation
    pub edges_traversed: usize,
}

impl<N> PathResult<N> {
    pub fn hops(&self) -> usize {
        self.edges.len()
    }
}

/// Breadth-First Search (Unweighted Shortest Path)
///
/// Cost is the hop count. Returns `None` if the target is unreachable or
/// only reachable in more than `max_hops` steps. Stop nodes are only
/// expanded when they are the source.
pub fn bfs<N: Hash + Eq + Clone>(
    view: &GraphView<N>,
    source: &N,
    target: &N,
    max_hops: Option<usize>,
) -> Option<PathResult<N>> {
    let source_idx = view.index_of(source)?;
    let target_idx = view.index_of(target)?;

    let mut queue = VecDeque::new();
    // index -> (parent index, edge used, depth)
    let mut visited: HashMap<usize, Option<(usize, EdgeRef)>> = HashMap::new();
    let mut depth: HashMap<usize, usize> = HashMap::new();
    let mut nodes_visited = 0;
    let mut edges_traversed = 0;

    queue.push_back(source_idx);
    visited.insert(source_idx, None);
    depth.insert(source_idx, 0);

    while let Some(current_idx) = queue.pop_front() {
        nodes_visited += 1;
        if current_idx == target_idx {
            let (path, edges) = reconstruct(view, target_idx, |idx| visited.get(&idx).copied().flatten());
            return Some(PathResult {
                source: source.clone(),
                target: target.clone(),
                cost: edges.len() as f64,
                path,
                edges,
                nodes_visited,
                edges_traversed,
            });
        }

        let current_depth = depth[&current_idx];
        if max_hops.is_some_and(|cap| current_depth >= cap) {
            continue;
        }
        if current_idx != source_idx && !view.is_transit(current_idx) {
            continue;
        }

        let successors = view.successors(current_idx);
        let refs = view.edge_refs(current_idx);
        for (i, &next_idx) in successors.iter().enumerate() {
            edges_traversed += 1;
            if !visited.contains_key(&next_idx) {
                visited.insert(next_idx, Some((current_idx, refs[i])));
                depth.insert(next_idx, current_depth + 1);
                queue.push_back(next_idx);
            }
        }
    }

    None
}

/// State for Dijkstra priority queue
#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node_idx: usize,
    hops: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare costs reversed for min-heap; break ties on the lower index
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node_idx.cmp(&self.node_idx))
            .then_with(|| other.hops.cmp(&self.hops))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra's Algorithm (Weighted Shortest Path)
///
/// Arcs with a negative or non-finite weight are impassable. With a hop cap
/// the search runs over (node, hops) states so that a cheap path is not
/// discarded in favour of a shorter-but-costlier one that fits the cap.
/// Stop nodes are only expanded when they are the source.
pub fn dijkstra<N: Hash + Eq + Clone>(
    view: &GraphView<N>,
    source: &N,
    target: &N,
    max_hops: Option<usize>,
) -> Option<PathResult<N>> {
    let source_idx = view.index_of(source)?;
    let target_idx = view.index_of(target)?;

    // Without a cap every state collapses onto hop bucket 0
    let bucket = |hops: usize| if max_hops.is_some() { hops } else { 0 };

    let mut dist: HashMap<(usize, usize), f64> = HashMap::new();
    let mut parent: HashMap<(usize, usize), (usize, usize, EdgeRef)> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut nodes_visited = 0;
    let mut edges_traversed = 0;

    dist.insert((source_idx, 0), 0.0);
    heap.push(State { cost: 0.0, node_idx: source_idx, hops: 0 });

    while let Some(State { cost, node_idx, hops }) = heap.pop() {
        let key = (node_idx, bucket(hops));
        if cost > *dist.get(&key).unwrap_or(&f64::INFINITY) {
            continue;
        }
        nodes_visited += 1;

        if node_idx == target_idx {
            let mut path = vec![view.index_to_node[target_idx].clone()];
            let mut edges = Vec::new();
            let mut curr = key;
            while let Some(&(prev_idx, prev_bucket, edge)) = parent.get(&curr) {
                edges.push(edge);
                path.push(view.index_to_node[prev_idx].clone());
                curr = (prev_idx, prev_bucket);
            }
            path.reverse();
            edges.reverse();
            return Some(PathResult {
                source: source.clone(),
                target: target.clone(),
                path,
                edges,
                cost,
                nodes_visited,
                edges_traversed,
            });
        }

        if max_hops.is_some_and(|cap| hops >= cap) {
            continue;
        }
        if node_idx != source_idx && !view.is_transit(node_idx) {
            continue;
        }

        let successors = view.successors(node_idx);
        let refs = view.edge_refs(node_idx);
        let weights = view.arc_weights(node_idx);

        for (i, &next_idx) in successors.iter().enumerate() {
            edges_traversed += 1;
            let weight = weights[i];
            if !weight.is_finite() || weight < 0.0 {
                continue;
            }

            let next_cost = cost + weight;
            let next_key = (next_idx, bucket(hops + 1));

            if next_cost < *dist.get(&next_key).unwrap_or(&f64::INFINITY) {
                dist.insert(next_key, next_cost);
                parent.insert(next_key, (key.0, key.1, refs[i]));
                heap.push(State { cost: next_cost, node_idx: next_idx, hops: hops + 1 });
            }
        }
    }

    None
}

fn reconstruct<N: Clone>(
    view: &GraphView<N>,
    target_idx: usize,
    parent_of: impl Fn(usize) -> Option<(usize, EdgeRef)>,
) -> (Vec<N>, Vec<EdgeRef>) {
    let mut path = Vec::new();
    let mut edges = Vec::new();
    let mut curr = target_idx;
    path.push(view.index_to_node[curr].clone());
    while let Some((prev, edge)) = parent_of(curr) {
        edges.push(edge);
        path.push(view.index_to_node[prev].clone());
        curr = prev;
    }
    path.reverse();
    edges.reverse();
    (path, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::GraphViewBuilder;

    fn chain() -> GraphView<u64> {
        // 1->2->3
        let mut builder = GraphViewBuilder::new();
        for id in 1..=3 {
            builder.add_node(id);
        }
        builder.add_arc(&1, &2, 100, 1.0);
        builder.add_arc(&2, &3, 101, 1.0);
        builder.build()
    }

    #[test]
    fn test_bfs() {
        let view = chain();
        let result = bfs(&view, &1, &3, None).unwrap();
        assert_eq!(result.path, vec![1, 2, 3]);
        assert_eq!(result.edges, vec![100, 101]);
        assert_eq!(result.cost, 2.0);
    }

    #[test]
    fn test_bfs_hop_cap() {
        let view = chain();
        assert!(bfs(&view, &1, &3, Some(1)).is_none());
        assert!(bfs(&view, &1, &3, Some(2)).is_some());
    }

    #[test]
    fn test_dijkstra() {
        // 1->2 (10.0), 2->3 (5.0), 1->3 (50.0)
        let mut builder = GraphViewBuilder::new();
        for id in 1..=3u64 {
            builder.add_node(id);
        }
        builder.add_arc(&1, &2, 0, 10.0);
        builder.add_arc(&1, &3, 1, 50.0); // Direct 1->3
        builder.add_arc(&2, &3, 2, 5.0);
        let view = builder.build();

        let result = dijkstra(&view, &1, &3, None).unwrap();
        assert_eq!(result.path, vec![1, 2, 3]);
        assert_eq!(result.edges, vec![0, 2]);
        assert_eq!(result.cost, 15.0);
    }

    #[test]
    fn test_dijkstra_hop_cap_prefers_feasible_path() {
        // Cheap route needs 3 hops, expensive route needs 1
        let mut builder = GraphViewBuilder::new();
        for id in 1..=4u64 {
            builder.add_node(id);
        }
        builder.add_arc(&1, &2, 0, 1.0);
        builder.add_arc(&2, &3, 1, 1.0);
        builder.add_arc(&3, &4, 2, 1.0);
        builder.add_arc(&1, &4, 3, 9.0);
        let view = builder.build();

        let uncapped = dijkstra(&view, &1, &4, None).unwrap();
        assert_eq!(uncapped.cost, 3.0);

        let capped = dijkstra(&view, &1, &4, Some(2)).unwrap();
        assert_eq!(capped.path, vec![1, 4]);
        assert_eq!(capped.cost, 9.0);
    }

    #[test]
    fn test_dijkstra_skips_negative_weights() {
        let mut builder = GraphViewBuilder::new();
        builder.add_node(1u64);
        builder.add_node(2u64);
        builder.add_arc(&1, &2, 0, -1.0);
        let view = builder.build();
        assert!(dijkstra(&view, &1, &2, None).is_none());
    }

    #[test]
    fn test_stop_nodes_end_but_do_not_relay_paths() {
        // 1 - 2 - 3 where 2 is a stop
        let mut builder = GraphViewBuilder::new();
        builder.add_node(1u64);
        builder.add_stop(2u64);
        builder.add_node(3u64);
        for (from, to, edge) in [(1, 2, 0), (2, 1, 0), (2, 3, 1), (3, 2, 1)] {
            builder.add_arc(&from, &to, edge, 1.0);
        }
        let view = builder.build();

        assert!(bfs(&view, &1, &3, None).is_none());
        assert!(dijkstra(&view, &1, &3, None).is_none());
        assert_eq!(bfs(&view, &1, &2, None).unwrap().path, vec![1, 2]);
        assert_eq!(dijkstra(&view, &2, &3, None).unwrap().path, vec![2, 3]);
    }

    #[test]
    fn test_source_equals_target() {
        let view = chain();
        let result = dijkstra(&view, &2, &2, None).unwrap();
        assert_eq!(result.path, vec![2]);
        assert!(result.edges.is_empty());
        assert_eq!(result.cost, 0.0);
    }
}

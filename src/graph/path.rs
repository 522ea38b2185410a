//! Shortest paths between schema elements
//!
//! `find_path` projects the (filtered) graph into a dense [`GraphView`] and
//! hands it to the algorithms crate. The projection depends only on the
//! filters and weighting, so it is shared by every endpoint pair asking with
//! the same options. Projections and results are both memoized until the
//! next mutation.

use super::edge::Edge;
use super::store::{timed, OpResult, SchemaGraph};
use super::types::{EdgeId, EdgeType, NodeId, NodeType};
use crate::config::GraphConfig;
use lru::LruCache;
use schemagraph_algorithms::{bfs, dijkstra, GraphView, GraphViewBuilder, PathResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;

/// Caller-supplied edge cost. Negative or non-finite results make the edge
/// impassable.
pub type WeightFn = Arc<dyn Fn(&Edge) -> f64 + Send + Sync>;

/// How edges are weighted during pathfinding
#[derive(Clone, Default)]
pub enum PathWeight {
    /// The edge's own weight
    #[default]
    Stored,
    /// Every edge costs 1 (fewest hops)
    Uniform,
    /// Computed per edge; never cached
    Custom(WeightFn),
}

impl PathWeight {
    pub fn custom(f: impl Fn(&Edge) -> f64 + Send + Sync + 'static) -> Self {
        PathWeight::Custom(Arc::new(f))
    }

    fn cost(&self, edge: &Edge) -> f64 {
        match self {
            PathWeight::Stored => edge.weight(),
            PathWeight::Uniform => 1.0,
            PathWeight::Custom(f) => f(edge),
        }
    }

    fn cache_label(&self) -> Option<&'static str> {
        match self {
            PathWeight::Stored => Some("stored"),
            PathWeight::Uniform => Some("uniform"),
            PathWeight::Custom(_) => None,
        }
    }
}

impl fmt::Debug for PathWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathWeight::Stored => f.write_str("Stored"),
            PathWeight::Uniform => f.write_str("Uniform"),
            PathWeight::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Options for [`SchemaGraph::find_path`]
#[derive(Debug, Clone, Default)]
pub struct PathOptions {
    pub weight: PathWeight,
    /// Only these edge types are traversable (all when `None`)
    pub edge_types: Option<Vec<EdgeType>>,
    /// Only these node types may be passed through. The endpoints are
    /// always allowed.
    pub node_types: Option<Vec<NodeType>>,
    /// Maximum number of hops
    pub max_depth: Option<usize>,
    /// Follow directional edges (foreign keys, view dependencies, ...) only
    /// from source to target. Symmetric edges are always bidirectional.
    pub respect_direction: bool,
}

impl PathOptions {
    pub fn with_weight(mut self, weight: PathWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_edge_types(mut self, edge_types: impl IntoIterator<Item = EdgeType>) -> Self {
        self.edge_types = Some(edge_types.into_iter().collect());
        self
    }

    pub fn with_node_types(mut self, node_types: impl IntoIterator<Item = NodeType>) -> Self {
        self.node_types = Some(node_types.into_iter().collect());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn respecting_direction(mut self) -> Self {
        self.respect_direction = true;
        self
    }

    /// Key of the projected view these options produce, or `None` when
    /// custom weights make it uncacheable
    pub(crate) fn projection_key(&self) -> Option<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct KeyOptions<'a> {
            weight: &'a str,
            edge_types: Option<Vec<EdgeType>>,
            node_types: Option<Vec<NodeType>>,
            respect_direction: bool,
        }

        let options = KeyOptions {
            weight: self.weight.cache_label()?,
            edge_types: normalized(&self.edge_types),
            node_types: normalized(&self.node_types),
            respect_direction: self.respect_direction,
        };
        serde_json::to_string(&options).ok()
    }

    /// Composite cache key, or `None` when the options cannot be cached
    pub(crate) fn cache_key(&self, source: &NodeId, target: &NodeId) -> Option<PathKey> {
        Some(PathKey {
            source: source.clone(),
            target: target.clone(),
            projection: self.projection_key()?,
            max_depth: self.max_depth,
        })
    }

    fn allows_edge(&self, edge_type: EdgeType) -> bool {
        self.edge_types
            .as_ref()
            .map_or(true, |types| types.contains(&edge_type))
    }

    fn allows_node(&self, node_type: NodeType) -> bool {
        self.node_types
            .as_ref()
            .map_or(true, |types| types.contains(&node_type))
    }
}

/// Sorted, deduplicated copy of a type filter
fn normalized<T: Ord + Clone>(types: &Option<Vec<T>>) -> Option<Vec<T>> {
    types.as_ref().map(|types| {
        let mut types = types.clone();
        types.sort_unstable();
        types.dedup();
        types
    })
}

/// A route between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPath {
    /// Source to target inclusive
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    pub total_weight: f64,
    /// Type of each edge, in path order
    pub relationship_types: Vec<EdgeType>,
}

impl GraphPath {
    pub fn hops(&self) -> usize {
        self.edges.len()
    }

    pub fn source(&self) -> Option<&NodeId> {
        self.nodes.first()
    }

    pub fn target(&self) -> Option<&NodeId> {
        self.nodes.last()
    }
}

/// Cache key for one `find_path` question. The endpoints stay separate
/// fields so ids containing separators cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PathKey {
    source: NodeId,
    target: NodeId,
    projection: String,
    max_depth: Option<usize>,
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} -> {:?} {}", self.source.as_str(), self.target.as_str(), self.projection)?;
        if let Some(depth) = self.max_depth {
            write!(f, " within {} hops", depth)?;
        }
        Ok(())
    }
}

/// LRU memo of `find_path` answers (including "no path") with hit/miss
/// counters, plus the most recent projection. Cleared wholesale on every
/// mutation.
pub(crate) struct PathCache {
    entries: Option<LruCache<PathKey, Option<GraphPath>>>,
    projection: Option<(String, Arc<GraphView<NodeId>>)>,
    hits: u64,
    misses: u64,
}

impl PathCache {
    pub(crate) fn new(config: &GraphConfig) -> Self {
        let entries = if config.enable_path_caching {
            NonZeroUsize::new(config.path_cache_capacity).map(LruCache::new)
        } else {
            None
        };
        PathCache {
            entries,
            projection: None,
            hits: 0,
            misses: 0,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    pub(crate) fn get(&mut self, key: &PathKey) -> Option<Option<GraphPath>> {
        let entries = self.entries.as_mut()?;
        match entries.get(key) {
            Some(path) => {
                self.hits += 1;
                Some(path.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub(crate) fn put(&mut self, key: PathKey, path: Option<GraphPath>) {
        if let Some(entries) = self.entries.as_mut() {
            entries.put(key, path);
        }
    }

    pub(crate) fn invalidate(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
        }
        self.projection = None;
    }

    fn projection(&self, key: &str) -> Option<Arc<GraphView<NodeId>>> {
        match &self.projection {
            Some((cached, view)) if cached == key => Some(Arc::clone(view)),
            _ => None,
        }
    }

    fn put_projection(&mut self, key: String, view: Arc<GraphView<NodeId>>) {
        self.projection = Some((key, view));
    }

    /// Clear entries and counters
    pub(crate) fn reset(&mut self) {
        self.invalidate();
        self.hits = 0;
        self.misses = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits
    }

    pub(crate) fn misses(&self) -> u64 {
        self.misses
    }

    pub(crate) fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Debug for PathCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCache")
            .field("enabled", &self.is_enabled())
            .field("len", &self.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}

impl SchemaGraph {
    /// Shortest path from `source` to `target`.
    ///
    /// Yields `None` when no route satisfies the filters and hop cap, or when
    /// either endpoint is missing. Uniform weighting runs a breadth-first
    /// search; every other mode runs Dijkstra.
    pub fn find_path(
        &self,
        source: &NodeId,
        target: &NodeId,
        options: &PathOptions,
    ) -> OpResult<Option<GraphPath>> {
        timed(|meta| {
            if !self.has_node(source) || !self.has_node(target) {
                return Ok(None);
            }

            let key = options.cache_key(source, target);
            if let Some(key) = &key {
                if let Some(cached) = self.cache().get(key) {
                    debug!("Path cache hit for {}", key);
                    return Ok(cached);
                }
            }

            let result = self.shortest_path(source, target, options);
            let path = match result {
                Some(found) => {
                    meta.nodes_visited = found.nodes_visited;
                    meta.edges_traversed = found.edges_traversed;
                    Some(self.to_graph_path(found))
                }
                None => None,
            };

            if let Some(key) = key {
                self.cache().put(key, path.clone());
            }
            Ok(path)
        })
    }

    /// Number of memoized paths
    pub fn cached_path_count(&self) -> usize {
        self.cache().len()
    }

    /// Drop every memoized path, keeping the hit/miss counters
    pub fn clear_path_cache(&mut self) {
        self.cache_mut().invalidate();
    }

    fn shortest_path(
        &self,
        source: &NodeId,
        target: &NodeId,
        options: &PathOptions,
    ) -> Option<PathResult<NodeId>> {
        let key = options.projection_key();
        let cached = key.as_deref().and_then(|key| self.cache().projection(key));
        let view = match cached {
            Some(view) => view,
            None => {
                let view = Arc::new(self.project(options));
                if let Some(key) = key {
                    self.cache().put_projection(key, Arc::clone(&view));
                }
                view
            }
        };

        match options.weight {
            PathWeight::Uniform => bfs(&view, source, target, options.max_depth),
            _ => dijkstra(&view, source, target, options.max_depth),
        }
    }

    /// Dense view of the traversable graph. Nodes excluded by the node-type
    /// filter are kept as stops so they can still be endpoints.
    fn project(&self, options: &PathOptions) -> GraphView<NodeId> {
        let mut builder = GraphViewBuilder::with_capacity(self.node_count());
        for node in self.nodes() {
            if options.allows_node(node.node_type()) {
                builder.add_node(node.id().clone());
            } else {
                builder.add_stop(node.id().clone());
            }
        }

        for (slot, edge) in self.edges.iter().enumerate() {
            let Some(edge) = edge else { continue };
            if !options.allows_edge(edge.edge_type()) {
                continue;
            }
            let cost = options.weight.cost(edge);
            builder.add_arc(edge.source(), edge.target(), slot, cost);
            if !(options.respect_direction && edge.is_directional()) && edge.source() != edge.target()
            {
                builder.add_arc(edge.target(), edge.source(), slot, cost);
            }
        }

        builder.build()
    }

    fn to_graph_path(&self, found: PathResult<NodeId>) -> GraphPath {
        let mut edges = Vec::with_capacity(found.edges.len());
        let mut relationship_types = Vec::with_capacity(found.edges.len());
        for &slot in &found.edges {
            if let Some(edge) = self.edges.get(slot).and_then(Option::as_ref) {
                edges.push(edge.id().clone());
                relationship_types.push(edge.edge_type());
            }
        }
        GraphPath {
            nodes: found.path,
            edges,
            total_weight: found.cost,
            relationship_types,
        }
    }
}

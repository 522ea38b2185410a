//! Graph algorithms for schemagraph
//!
//! Algorithms here know nothing about schemas: they run over a [`GraphView`],
//! a dense integer-indexed projection that the caller builds from its own
//! store after applying whatever node/edge filters it needs.

pub mod common;
pub mod pathfinding;

pub use common::{EdgeRef, GraphView, GraphViewBuilder};
pub use pathfinding::{bfs, dijkstra, PathResult};

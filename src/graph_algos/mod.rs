pub mod dijkstra;
mod shortest_path;

use shortest_path::shortest_path;

pub use dijkstra::{traced_dijkstra, RelaxationStep, TracedPath};

use crate::collections::FxIndexMap;

/// Type alias for the node map used in path planning algorithms
/// N: Node - space on a graph
/// C: Cost of reaching the node from the start
/// The tuple contains (parent_index, cost) where:
/// - parent_index is the index of the parent node in the map, None for the start node
/// - cost is the best known cost to reach this node from the start
pub type GraphNodeMap<N, C> = FxIndexMap<N, (Option<usize>, C)>;

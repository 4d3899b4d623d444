use crate::errors::PathPlannerError;
use super::{shortest_path, GraphNodeMap};

use std::{collections::BinaryHeap, hash::Hash, cmp::Ordering, fmt::Debug};
use num_traits::Zero;
use indexmap::map::Entry::{Occupied, Vacant};


/// One edge examined that improved a tentative distance
#[derive(Clone, Debug, PartialEq)]
pub struct RelaxationStep<N, C> {
    pub from: N,
    pub to: N,
    pub weight: C, // weight of the edge itself, not the new tentative distance
}

/// Result of a traced search
/// `total_cost` is None when the goal was never reached, `path` is then empty
#[derive(Clone, Debug, PartialEq)]
pub struct TracedPath<N, C> {
    pub path: Vec<N>,
    pub total_cost: Option<C>,
    pub trace: Vec<RelaxationStep<N, C>>,
}

impl<N, C> TracedPath<N, C> {

    pub fn is_reachable(&self) -> bool {
        self.total_cost.is_some()
    }

    /// Consecutive pairs of the path, in travel order
    pub fn segments(&self) -> impl Iterator<Item = (&N, &N)> {
        self.path.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}


/// Dijkstra's algorithm that also records every successful relaxation
/// https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm
/// From start Node, traverse the graph until a node meets the goal criteria.
/// The search stops as soon as the goal is popped from the frontier; the trace
/// keeps every relaxation performed up to that point, on the final path or not.
pub fn traced_dijkstra<N, C, IT, NN, G>(start: N, neighbors: NN, goal: G) -> Result<TracedPath<N, C>, PathPlannerError>
where
    N: Eq + Hash + Clone + Debug,
    NN: Fn(&N) -> IT, // returns iterator of neighbors + costs
    IT: IntoIterator<Item = (N, C)>, // Iterator of neighbors + edge cost to neighbor node
    C: Zero + Ord + Copy + Debug,
    G: Fn(&N) -> bool, // node qualifier for goal
    {

    let (node_map, goal_index, trace) = build_traced_graph(start, neighbors, goal);

    match goal_index {
        Some(goal_index) => {
            let path = shortest_path(&node_map, goal_index)?;
            let total_cost = node_map.get_index(goal_index).map(|(_, &(_, cost))| cost);
            Ok(TracedPath { path, total_cost, trace })
        }
        None => Ok(TracedPath { path: Vec::new(), total_cost: None, trace }),
    }
}


/// Traverses the graph using Dijkstra's algorithm
/// Returns the node map with best known costs, the index of the goal node if reached,
/// and the relaxations in the order they happened
fn build_traced_graph<N, C, IT, NN, G>(start: N, neighbors: NN, goal_fn: G) -> (GraphNodeMap<N, C>, Option<usize>, Vec<RelaxationStep<N, C>>)
where
    N: Eq + Hash + Clone + Debug,
    NN: Fn(&N) -> IT,
    IT: IntoIterator<Item = (N, C)>,
    C: Zero + Ord + Copy + Debug,
    G: Fn(&N) -> bool
    {

    // Frontier - BinaryHeap pops the biggest, NodeId orders reversed so cheapest comes first
    let mut frontier: BinaryHeap<NodeId<C>> = BinaryHeap::new();
    let mut pushed: u64 = 0;

    // A node is absent from the map until its first relaxation, absent means infinitely far
    let mut nodes_map: GraphNodeMap<N, C> = GraphNodeMap::default();
    let mut trace = Vec::new();

    let start_index = nodes_map.insert_full(start, (None, Zero::zero())).0;
    frontier.push(NodeId { index: start_index, cost: Zero::zero(), seq: pushed });

    while let Some(NodeId { index, cost, .. }) = frontier.pop() {

        let Some((node, &(_, best))) = nodes_map.get_index(index) else {
            continue;
        };

        // stale entry, a cheaper route to this node was already expanded
        if cost > best {
            continue;
        }

        if goal_fn(node) {
            return (nodes_map, Some(index), trace);
        }

        let current = node.clone();

        for (neighbor, edge_cost) in neighbors(&current) {

            let new_cost = best + edge_cost;

            let neighbor_index = match nodes_map.entry(neighbor.clone()) {
                Vacant(e) => {
                    let neighbor_index = e.index();
                    e.insert((Some(index), new_cost));
                    neighbor_index
                }
                Occupied(mut e) => {
                    if e.get().1 > new_cost {
                        e.insert((Some(index), new_cost));
                        e.index()
                    } else {
                        continue;
                    }
                }
            };

            trace.push(RelaxationStep {
                from: current.clone(),
                to: neighbor,
                weight: edge_cost,
            });

            pushed += 1;
            frontier.push(NodeId { index: neighbor_index, cost: new_cost, seq: pushed });
        }
    }

    (nodes_map, None, trace)
}


/// Frontier entry
/// - ordered by cost, then by push order so equal costs pop first-in first-out
#[derive(Debug)]
struct NodeId<T> {
    index: usize,
    cost: T,
    seq: u64,
}

impl<T: Ord> Ord for NodeId<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost).then_with(|| other.seq.cmp(&self.seq))
    }
}
impl<T: Ord> PartialOrd for NodeId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: Ord> PartialEq for NodeId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T: Ord> Eq for NodeId<T> {}

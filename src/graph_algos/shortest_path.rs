use crate::errors::PathPlannerError;
use super::GraphNodeMap;

/// Walk parent links from the goal back to the start
/// Returns the ordered path as a vector of nodes from start to goal
/// A missing parent or a chain longer than the map itself means the map is corrupt
pub(crate) fn shortest_path<N, C>(node_map: &GraphNodeMap<N, C>, goal_index: usize) -> Result<Vec<N>, PathPlannerError>
where
    N: Clone,
{

    let mut path = Vec::new();
    let mut cursor = Some(goal_index);

    while let Some(index) = cursor {
        let Some((node, &(parent, _))) = node_map.get_index(index) else {
            return Err(PathPlannerError::BrokenParentChain(index));
        };
        if path.len() == node_map.len() {
            return Err(PathPlannerError::BrokenParentChain(index));
        }
        path.push(node.clone());
        cursor = parent;
    }

    path.reverse();
    Ok(path)
}

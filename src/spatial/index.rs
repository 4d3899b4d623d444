use kdtree::KdTree;
use kdtree::distance::squared_euclidean;

use crate::errors::PathPlannerError;
use crate::geometry::Point;
use super::{City, SpatialGraph};


/// k-d tree over placed cities, same contract as `SpatialGraph::find_city_near`
/// Worth building once city counts make the linear scan noticeable.
/// Which of two equidistant cities wins is unspecified here.
pub struct CityIndex {
    tree: KdTree<f64, usize, [f64; 2]>, // stores point -> index of the city in the graph
}

impl CityIndex {

    pub fn build(graph: &SpatialGraph) -> Result<Self, PathPlannerError> {
        let mut tree = KdTree::new(2);
        for (index, city) in graph.cities().enumerate() {
            if let Some(position) = city.position {
                tree.add([position.x, position.y], index)?;
            }
        }
        Ok(Self { tree })
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Closest city to `point` if it lies within `tolerance`
    /// `graph` must be the one the index was built from
    pub fn find_city_near<'g>(&self, graph: &'g SpatialGraph, point: &Point, tolerance: f64) -> Result<Option<&'g City>, PathPlannerError> {
        if self.is_empty() {
            return Ok(None);
        }

        let nearest: Vec<(f64, &usize)> = self.tree.nearest(&[point.x, point.y], 1, &squared_euclidean)?;
        let Some(&(_, &index)) = nearest.first() else {
            return Ok(None);
        };

        // compare real distances, the tree reports squared ones
        let city = graph.city_at(index)
            .filter(|city| city.position.is_some_and(|p| p.distance_to(point) <= tolerance));
        Ok(city)
    }
}

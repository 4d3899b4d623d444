mod index;

pub use index::CityIndex;

use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::collections::{FxHashMap, FxIndexMap};
use crate::errors::PathPlannerError;
use crate::geometry::{Distance, Point};
use crate::graph_algos::{traced_dijkstra, RelaxationStep, TracedPath};


/// Stable identity of a city in the data store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub i64);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// City as stored by the data store, geographic coordinates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityRow {
    pub id: CityId,
    pub label: String,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

/// Connection as stored by the data store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRow {
    pub a: CityId,
    pub b: CityId,
    pub weight: f64,
}

/// City placed on the map, position is in projected units
/// A city without a position is still a vertex but can't be clicked or connected
#[derive(Clone, Debug, PartialEq)]
pub struct City {
    pub id: CityId,
    pub label: String,
    pub position: Option<Point>,
}


#[derive(Clone, Debug, Default)]
pub struct SpatialGraph {
    cities: FxIndexMap<String, City>,
    ids: FxHashMap<CityId, usize>,
    adjacency: Vec<FxIndexMap<usize, Distance>>, // aligned with `cities`
    dropped_rows: usize,
}

impl SpatialGraph {

    /// Build the graph from placed cities and raw connection rows
    /// Rows that can't be honoured are logged and skipped, never fatal:
    /// duplicate ids or labels, connections to unknown or unplaced cities,
    /// negative or non-finite weights, and self loops.
    /// Parallel connections keep the lightest weight.
    pub fn build<CI, RI>(cities: CI, connections: RI) -> Self
    where
        CI: IntoIterator<Item = City>,
        RI: IntoIterator<Item = ConnectionRow>,
    {
        let mut graph = SpatialGraph::default();

        for mut city in cities {
            if graph.ids.contains_key(&city.id) {
                warn!("dropping city {} ({}): duplicate id", city.label, city.id);
                graph.dropped_rows += 1;
                continue;
            }
            if graph.cities.contains_key(&city.label) {
                warn!("dropping city {} ({}): duplicate label", city.label, city.id);
                graph.dropped_rows += 1;
                continue;
            }
            if city.position.is_some_and(|p| !p.is_finite()) {
                warn!("city {} ({}) has non-finite coordinates, treating it as unplaced", city.label, city.id);
                city.position = None;
            }
            let (index, _) = graph.cities.insert_full(city.label.clone(), city.clone());
            graph.ids.insert(city.id, index);
            graph.adjacency.push(FxIndexMap::default());
        }

        for row in connections {
            match graph.resolve_connection(&row) {
                Ok((a, b, weight)) => graph.connect(a, b, weight),
                Err(reason) => {
                    warn!("dropping connection {} - {}: {reason}", row.a, row.b);
                    graph.dropped_rows += 1;
                }
            }
        }

        info!(
            "built graph with {} cities and {} connections ({} rows dropped)",
            graph.len(), graph.edge_count(), graph.dropped_rows
        );
        graph
    }

    fn resolve_connection(&self, row: &ConnectionRow) -> Result<(usize, usize, Distance), String> {
        let a = self.placed_index(row.a)?;
        let b = self.placed_index(row.b)?;
        if a == b {
            return Err("self loop".to_string());
        }
        let weight = Distance::new(row.weight).map_err(|e| e.to_string())?;
        Ok((a, b, weight))
    }

    fn placed_index(&self, id: CityId) -> Result<usize, String> {
        let &index = self.ids.get(&id).ok_or_else(|| format!("unknown city {id}"))?;
        match self.cities.get_index(index) {
            Some((_, city)) if city.position.is_some() => Ok(index),
            Some((label, _)) => Err(format!("city {label} has no coordinates")),
            None => Err(format!("unknown city {id}")),
        }
    }

    /// Insert both directions so the graph stays symmetric
    fn connect(&mut self, a: usize, b: usize, weight: Distance) {
        let lighter = self.adjacency[a].get(&b).is_none_or(|&existing| weight < existing);
        if lighter {
            self.adjacency[a].insert(b, weight);
            self.adjacency[b].insert(a, weight);
        } else {
            debug!("keeping lighter parallel connection between {} and {}", self.label(a), self.label(b));
        }
    }

    /// Closest placed city within `tolerance` of `point`
    /// Linear scan, on exact ties the city stored first wins
    pub fn find_city_near(&self, point: &Point, tolerance: f64) -> Option<&City> {
        // a NaN distance would pass the tolerance check
        if !point.is_finite() || tolerance.is_nan() {
            return None;
        }

        let mut closest: Option<(f64, &City)> = None;

        for city in self.cities.values() {
            let Some(position) = city.position else {
                continue;
            };
            let distance = position.distance_to(point);
            if distance > tolerance {
                continue;
            }
            if closest.is_none_or(|(best, _)| distance < best) {
                closest = Some((distance, city));
            }
        }

        closest.map(|(_, city)| city)
    }

    /// Drop every city and connection
    pub fn clear(&mut self) {
        *self = SpatialGraph::default();
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Number of undirected connections
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(|neighbors| neighbors.len()).sum::<usize>() / 2
    }

    /// Rows skipped while building
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    pub fn contains(&self, label: &str) -> bool {
        self.cities.contains_key(label)
    }

    pub fn city(&self, label: &str) -> Option<&City> {
        self.cities.get(label)
    }

    pub fn city_by_id(&self, id: CityId) -> Option<&City> {
        self.ids.get(&id).and_then(|&index| self.city_at(index))
    }

    pub(crate) fn city_at(&self, index: usize) -> Option<&City> {
        self.cities.get_index(index).map(|(_, city)| city)
    }

    /// Cities in load order
    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// Neighbors of a city with the connecting weight, empty for unknown labels
    pub fn neighbors(&self, label: &str) -> impl Iterator<Item = (&str, Distance)> {
        self.cities.get_index_of(label)
            .and_then(|index| self.adjacency.get(index))
            .into_iter()
            .flat_map(move |neighbors| neighbors.iter().map(move |(&to, &weight)| (self.label(to), weight)))
    }

    /// Weight of the connection between two cities
    pub fn weight(&self, a: &str, b: &str) -> Option<Distance> {
        let a = self.cities.get_index_of(a)?;
        let b = self.cities.get_index_of(b)?;
        self.adjacency.get(a)?.get(&b).copied()
    }

    /// Every undirected connection once, as (city, city, weight)
    pub fn edges(&self) -> impl Iterator<Item = (&City, &City, Distance)> {
        self.adjacency.iter().enumerate().flat_map(move |(a, neighbors)| {
            neighbors.iter()
                .filter(move |&(&b, _)| a < b)
                .filter_map(move |(&b, &weight)| Some((self.city_at(a)?, self.city_at(b)?, weight)))
        })
    }

    fn label(&self, index: usize) -> &str {
        self.cities.get_index(index).map_or("", |(label, _)| label.as_str())
    }

    /// Traced shortest path between two cities
    /// An `end` that is not in the graph is simply unreachable
    pub fn shortest_path(&self, start: &str, end: &str) -> Result<TracedPath<String, Distance>, PathPlannerError> {
        let start_index = self.cities.get_index_of(start)
            .ok_or_else(|| PathPlannerError::UnknownNode(start.to_string()))?;
        let end_index = self.cities.get_index_of(end);

        let indexed = traced_dijkstra(
            start_index,
            move |&index: &usize| {
                self.adjacency.get(index)
                    .into_iter()
                    .flat_map(|neighbors| neighbors.iter().map(|(&to, &weight)| (to, weight)))
            },
            |&index| Some(index) == end_index,
        )?;

        Ok(TracedPath {
            path: indexed.path.iter().map(|&index| self.label(index).to_string()).collect(),
            total_cost: indexed.total_cost,
            trace: indexed.trace.iter()
                .map(|step| RelaxationStep {
                    from: self.label(step.from).to_string(),
                    to: self.label(step.to).to_string(),
                    weight: step.weight,
                })
                .collect(),
        })
    }
}

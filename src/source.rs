use std::{fs::File, io::{BufReader, Read}, path::Path};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::LoadFailure;
use crate::geometry::Point;
use crate::spatial::{City, CityRow, ConnectionRow, SpatialGraph};


/// Reprojects geographic coordinates into the map's coordinate reference system
pub trait Projector {
    fn reproject(&self, lat: f64, lon: f64) -> Result<Point, LoadFailure>;
}

/// No projection, x is longitude and y is latitude
#[derive(Clone, Copy, Debug, Default)]
pub struct Geographic;

impl Projector for Geographic {
    fn reproject(&self, lat: f64, lon: f64) -> Result<Point, LoadFailure> {
        Ok(Point::new(lon, lat))
    }
}

impl<F> Projector for F
where
    F: Fn(f64, f64) -> Result<Point, LoadFailure>,
{
    fn reproject(&self, lat: f64, lon: f64) -> Result<Point, LoadFailure> {
        self(lat, lon)
    }
}


/// Read-only access to the city dataset
pub trait CityStore {
    fn list_cities(&self) -> Result<Vec<CityRow>, LoadFailure>;
    fn list_connections(&self) -> Result<Vec<ConnectionRow>, LoadFailure>;
}

/// Whole dataset held in memory, loadable from JSON
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub cities: Vec<CityRow>,
    #[serde(default)]
    pub connections: Vec<ConnectionRow>,
}

impl Snapshot {

    pub fn from_json(json: &str) -> Result<Self, LoadFailure> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadFailure> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LoadFailure> {
        let path = path.as_ref();
        info!("reading dataset {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl CityStore for Snapshot {
    fn list_cities(&self) -> Result<Vec<CityRow>, LoadFailure> {
        Ok(self.cities.clone())
    }

    fn list_connections(&self) -> Result<Vec<ConnectionRow>, LoadFailure> {
        Ok(self.connections.clone())
    }
}


/// Read the store once, project every city and build the graph
/// Cities missing a coordinate are kept unplaced, their connections get dropped by the build
pub fn load_graph<S, P>(store: &S, projector: &P) -> Result<SpatialGraph, LoadFailure>
where
    S: CityStore + ?Sized,
    P: Projector + ?Sized,
{
    let rows = store.list_cities()?;
    let connections = store.list_connections()?;

    let mut cities = Vec::with_capacity(rows.len());
    for row in rows {
        let position = match (row.lat, row.lon) {
            (Some(lat), Some(lon)) => Some(projector.reproject(lat, lon)?),
            _ => {
                warn!("city {} ({}) has no coordinates", row.label, row.id);
                None
            }
        };
        cities.push(City { id: row.id, label: row.label, position });
    }

    let graph = SpatialGraph::build(cities, connections);
    if graph.cities().all(|city| city.position.is_none()) {
        return Err(LoadFailure::NoCities);
    }
    Ok(graph)
}

use std::fmt;

use crate::geometry::Point;


#[derive(Debug, Clone, PartialEq)]
pub enum PathPlannerError {
    UnknownNode(String), // Start node is not a vertex of the graph
    BrokenParentChain(usize), // Parent index missing or looping while walking back from the goal
    KdTreeError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    InvalidDistance(f64) // Negative, NaN or infinite length
}

/// Map or data store could not be read
#[derive(Debug, Clone, PartialEq)]
pub enum LoadFailure {
    UnknownRegion(String),
    SourceUnavailable(String),
    Malformed(String),
    Projection(String),
    NoCities, // Nothing usable survived the build
}

/// A click could not be turned into a city selection
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionError {
    NoCityNear(Point),
    AlreadyStart(String),
    SelectionComplete, // Both endpoints are chosen, reset to pick again
}

/// An action was attempted before the state it needs exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardViolation {
    MapNotLoaded,
    EndpointsNotChosen,
    AlgorithmNotRun,
}

/// Everything the explorer can report back to the user
#[derive(Debug, Clone, PartialEq)]
pub enum ExploreError {
    Load(LoadFailure),
    Selection(SelectionError),
    Guard(GuardViolation),
    Planner(PathPlannerError),
}


impl fmt::Display for PathPlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPlannerError::UnknownNode(node) => write!(f, "node {node} is not part of the graph"),
            PathPlannerError::BrokenParentChain(index) => write!(f, "parent chain broken at node index {index}"),
            PathPlannerError::KdTreeError(e) => write!(f, "spatial index error: {e}"),
        }
    }
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::InvalidDistance(value) => write!(f, "invalid distance {value}"),
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailure::UnknownRegion(key) => write!(f, "unknown region {key:?}"),
            LoadFailure::SourceUnavailable(e) => write!(f, "data source unavailable: {e}"),
            LoadFailure::Malformed(e) => write!(f, "malformed data: {e}"),
            LoadFailure::Projection(e) => write!(f, "coordinate projection failed: {e}"),
            LoadFailure::NoCities => write!(f, "the dataset contains no usable cities"),
        }
    }
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::NoCityNear(point) => {
                write!(f, "no city near ({:.1}, {:.1}), click directly on a city marker", point.x, point.y)
            }
            SelectionError::AlreadyStart(city) => {
                write!(f, "{city} is already the start city, pick a different end city")
            }
            SelectionError::SelectionComplete => {
                write!(f, "both cities are already chosen, reset to choose again")
            }
        }
    }
}

impl fmt::Display for GuardViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardViolation::MapNotLoaded => write!(f, "load a map first"),
            GuardViolation::EndpointsNotChosen => write!(f, "choose a start and an end city first"),
            GuardViolation::AlgorithmNotRun => write!(f, "run the algorithm before stepping"),
        }
    }
}

impl fmt::Display for ExploreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExploreError::Load(e) => write!(f, "{e}"),
            ExploreError::Selection(e) => write!(f, "{e}"),
            ExploreError::Guard(e) => write!(f, "{e}"),
            ExploreError::Planner(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PathPlannerError {}
impl std::error::Error for GeometryError {}
impl std::error::Error for LoadFailure {}
impl std::error::Error for SelectionError {}
impl std::error::Error for GuardViolation {}
impl std::error::Error for ExploreError {}


impl From<kdtree::ErrorKind> for PathPlannerError {
    fn from(error: kdtree::ErrorKind) -> Self {
        PathPlannerError::KdTreeError(error.to_string())
    }
}

impl From<serde_json::Error> for LoadFailure {
    fn from(error: serde_json::Error) -> Self {
        LoadFailure::Malformed(error.to_string())
    }
}

impl From<std::io::Error> for LoadFailure {
    fn from(error: std::io::Error) -> Self {
        LoadFailure::SourceUnavailable(error.to_string())
    }
}

impl From<LoadFailure> for ExploreError {
    fn from(error: LoadFailure) -> Self {
        ExploreError::Load(error)
    }
}

impl From<SelectionError> for ExploreError {
    fn from(error: SelectionError) -> Self {
        ExploreError::Selection(error)
    }
}

impl From<GuardViolation> for ExploreError {
    fn from(error: GuardViolation) -> Self {
        ExploreError::Guard(error)
    }
}

impl From<PathPlannerError> for ExploreError {
    fn from(error: PathPlannerError) -> Self {
        ExploreError::Planner(error)
    }
}

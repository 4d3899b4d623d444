mod collections;
pub mod errors;
pub mod explorer;
pub mod geometry;
pub mod graph_algos;
pub mod region;
pub mod render;
pub mod source;
pub mod spatial;

pub use errors::{ExploreError, GuardViolation, LoadFailure, PathPlannerError, SelectionError};
pub use explorer::{ClickOutcome, ExplorationState, Explorer, ExplorerConfig, PathSummary, Phase, StepOutcome};
pub use geometry::{Distance, Point};
pub use graph_algos::{traced_dijkstra, RelaxationStep, TracedPath};
pub use region::RegionSettings;
pub use render::{Color, Layer, Primitive, RecordingRenderer, Renderer};
pub use source::{load_graph, CityStore, Geographic, Projector, Snapshot};
pub use spatial::{City, CityId, CityIndex, CityRow, ConnectionRow, SpatialGraph};

mod config;
mod state;

pub use config::{ExplorerConfig, Palette};
pub use state::{ClickOutcome, ExplorationState, PathSummary, Phase, Step, StepOutcome};

use log::{debug, info, warn};

use crate::errors::{ExploreError, GuardViolation, LoadFailure, SelectionError};
use crate::geometry::Point;
use crate::region::RegionSettings;
use crate::render::{Color, Layer, Primitive, Renderer};
use crate::source::{load_graph, CityStore, Projector, Snapshot};
use crate::spatial::{CityIndex, SpatialGraph};

const CITY_SIZE: f64 = 5.0;
const HIGHLIGHT_SIZE: f64 = 10.0;
const LABEL_SIZE: f64 = 8.0;
const CONNECTION_WIDTH: f64 = 1.0;
const HIGHLIGHT_WIDTH: f64 = 2.0;


pub struct Explorer<R: Renderer> {
    graph: SpatialGraph,
    index: Option<CityIndex>,
    region: Option<RegionSettings>,
    state: ExplorationState,
    config: ExplorerConfig,
    renderer: R,
}

impl<R: Renderer> Explorer<R> {

    pub fn new(config: ExplorerConfig, renderer: R) -> Self {
        Self {
            graph: SpatialGraph::default(),
            index: None,
            region: None,
            state: ExplorationState::default(),
            config,
            renderer,
        }
    }

    pub fn phase(&self) -> Phase {
        let state = &self.state;
        if self.graph.is_empty() {
            Phase::Empty
        } else if state.start.is_none() {
            Phase::SelectingStart
        } else if state.end.is_none() {
            Phase::SelectingEnd
        } else if state.search.is_none() {
            Phase::ReadyToRun
        } else if !state.revealed {
            Phase::Stepping
        } else {
            Phase::PathRevealed
        }
    }

    pub fn state(&self) -> &ExplorationState {
        &self.state
    }

    pub fn graph(&self) -> &SpatialGraph {
        &self.graph
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Settings of the region the current map came from, None for maps loaded directly
    pub fn region(&self) -> Option<&RegionSettings> {
        self.region.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Read a dataset, project it and make it the current map
    /// On failure the previously loaded map and exploration stay as they were
    pub fn load<S, P>(&mut self, store: &S, projector: &P) -> Result<(), ExploreError>
    where
        S: CityStore + ?Sized,
        P: Projector + ?Sized,
    {
        let graph = load_graph(store, projector)
            .inspect_err(|e| warn!("map load failed: {e}"))?;
        self.install(graph)?;
        self.region = None;
        Ok(())
    }

    /// Resolve a region by key, read its dataset and adopt its click tolerance
    pub fn load_region<P>(&mut self, key: &str, projector: &P) -> Result<(), ExploreError>
    where
        P: Projector + ?Sized,
    {
        let region = RegionSettings::lookup(key)
            .inspect_err(|e| warn!("map load failed: {e}"))?;
        self.load_settings(region, projector)
    }

    fn load_settings<P>(&mut self, region: &RegionSettings, projector: &P) -> Result<(), ExploreError>
    where
        P: Projector + ?Sized,
    {
        let dataset = Snapshot::open(region.dataset_path)
            .inspect_err(|e| warn!("map load failed: {e}"))?;
        let graph = load_graph(&dataset, projector)
            .inspect_err(|e| warn!("map load failed: {e}"))?;
        self.install(graph)?;

        info!("region {}: {} ({}, zoom {})", region.key, region.description, region.crs, region.default_zoom);
        self.config.click_tolerance = region.click_tolerance;
        self.region = Some(region.clone());
        Ok(())
    }

    /// Make an already built graph the current map
    /// A graph without a single placed city is rejected and nothing changes
    pub fn install(&mut self, graph: SpatialGraph) -> Result<(), ExploreError> {
        if graph.cities().all(|city| city.position.is_none()) {
            warn!("map load failed: {}", LoadFailure::NoCities);
            return Err(LoadFailure::NoCities.into());
        }

        let index = if graph.len() >= self.config.spatial_index_threshold {
            Some(CityIndex::build(&graph).inspect_err(|e| warn!("map load failed: {e}"))?)
        } else {
            None
        };

        self.graph = graph;
        self.index = index;
        self.state = ExplorationState::default();

        self.renderer.clear(Layer::Annotation);
        self.renderer.clear(Layer::Base);
        self.draw_base_map();

        info!("map loaded: {} cities, {} connections", self.graph.len(), self.graph.edge_count());
        Ok(())
    }

    /// Drop the map and the exploration, back to `Empty`
    pub fn unload(&mut self) {
        self.graph.clear();
        self.index = None;
        self.region = None;
        self.state = ExplorationState::default();
        self.renderer.clear(Layer::Annotation);
        self.renderer.clear(Layer::Base);
        info!("map unloaded");
    }

    /// Clear the exploration, keep the map
    pub fn reset(&mut self) {
        self.state = ExplorationState::default();
        self.renderer.clear(Layer::Annotation);
        info!("exploration reset");
    }

    /// Pick the start city, then the end city
    pub fn pointer_click(&mut self, point: Point) -> Result<ClickOutcome, ExploreError> {
        self.select_at(point).inspect_err(|e| warn!("{e}"))
    }

    fn select_at(&mut self, point: Point) -> Result<ClickOutcome, ExploreError> {
        if self.graph.is_empty() {
            return Err(GuardViolation::MapNotLoaded.into());
        }
        if self.state.start.is_some() && self.state.end.is_some() {
            return Err(SelectionError::SelectionComplete.into());
        }
        if !point.is_finite() {
            return Err(SelectionError::NoCityNear(point).into());
        }

        let (label, position) = self.locate(&point)?
            .ok_or(SelectionError::NoCityNear(point))?;

        if self.state.start.is_none() {
            self.highlight_city(position, self.config.palette.start);
            info!("start city: {label}");
            self.state.start = Some(label.clone());
            return Ok(ClickOutcome::StartSelected(label));
        }
        if self.state.start.as_deref() == Some(label.as_str()) {
            return Err(SelectionError::AlreadyStart(label).into());
        }

        self.highlight_city(position, self.config.palette.end);
        info!("end city: {label}");
        self.state.end = Some(label.clone());
        Ok(ClickOutcome::EndSelected(label))
    }

    /// Label and position of the city under the pointer
    fn locate(&self, point: &Point) -> Result<Option<(String, Point)>, ExploreError> {
        let tolerance = self.config.click_tolerance;
        let city = match &self.index {
            Some(index) => index.find_city_near(&self.graph, point, tolerance)?,
            None => self.graph.find_city_near(point, tolerance),
        };
        Ok(city.and_then(|city| Some((city.label.clone(), city.position?))))
    }

    /// Compute the path and its trace, playback starts from the first relaxation
    /// Running again recomputes from scratch and rewinds playback
    pub fn run_algorithm(&mut self) -> Result<usize, ExploreError> {
        self.run().inspect_err(|e| warn!("{e}"))
    }

    fn run(&mut self) -> Result<usize, ExploreError> {
        if self.graph.is_empty() {
            return Err(GuardViolation::MapNotLoaded.into());
        }
        let (Some(start), Some(end)) = (&self.state.start, &self.state.end) else {
            return Err(GuardViolation::EndpointsNotChosen.into());
        };

        let search = self.graph.shortest_path(start, end)?;
        let steps = search.trace.len();
        match search.total_cost {
            Some(cost) => info!("shortest path {start} -> {end}: {steps} relaxations, cost {cost:.2}"),
            None => info!("shortest path {start} -> {end}: {steps} relaxations, unreachable"),
        }

        if self.state.search.is_some() {
            self.renderer.clear(Layer::Annotation);
            self.highlight_endpoints();
        }

        self.state.search = Some(search);
        self.state.cursor = 0;
        self.state.revealed = false;
        Ok(steps)
    }

    /// Play the next relaxation, or reveal the path once the trace is exhausted
    pub fn advance_step(&mut self) -> Result<StepOutcome, ExploreError> {
        self.advance().inspect_err(|e| warn!("{e}"))
    }

    fn advance(&mut self) -> Result<StepOutcome, ExploreError> {
        if self.graph.is_empty() {
            return Err(GuardViolation::MapNotLoaded.into());
        }
        if self.state.start.is_none() || self.state.end.is_none() {
            return Err(GuardViolation::EndpointsNotChosen.into());
        }
        let Some(summary) = self.state.summary() else {
            return Err(GuardViolation::AlgorithmNotRun.into());
        };

        if self.state.revealed {
            return Ok(StepOutcome::AlreadyRevealed(summary));
        }

        if let Some(step) = self.state.trace().get(self.state.cursor).cloned() {
            self.highlight_edge(&step.from, &step.to, self.config.palette.relaxation);
            self.state.cursor += 1;
            let outcome = StepOutcome::Relaxed { number: self.state.cursor, step };
            debug!("{outcome}");
            return Ok(outcome);
        }

        self.reveal(&summary);
        self.state.revealed = true;
        if self.state.is_reachable() {
            info!("{summary}");
        } else {
            warn!("{summary}");
        }
        Ok(StepOutcome::Revealed(summary))
    }

    fn reveal(&mut self, summary: &PathSummary) {
        let segments: Vec<(String, String)> = self.state.search.iter()
            .flat_map(|search| search.segments())
            .map(|(from, to)| (from.clone(), to.clone()))
            .collect();

        let color = self.config.palette.path;
        for (from, to) in &segments {
            self.highlight_edge(from, to, color);
        }

        if let Some(at) = self.graph.city(&summary.end).and_then(|city| city.position) {
            self.renderer.draw(Layer::Annotation, Primitive::Text {
                at,
                text: summary.to_string(),
                color: self.config.palette.label,
                size: LABEL_SIZE,
            });
        }
    }

    fn draw_base_map(&mut self) {
        let palette = &self.config.palette;

        for (a, b, _) in self.graph.edges() {
            if let (Some(from), Some(to)) = (a.position, b.position) {
                self.renderer.draw(Layer::Base, Primitive::Segment {
                    from,
                    to,
                    color: palette.connection,
                    width: CONNECTION_WIDTH,
                });
            }
        }

        for city in self.graph.cities() {
            let Some(at) = city.position else {
                continue;
            };
            self.renderer.draw(Layer::Base, Primitive::Point { at, color: palette.city, size: CITY_SIZE });
            self.renderer.draw(Layer::Base, Primitive::Text {
                at,
                text: city.label.clone(),
                color: palette.label,
                size: LABEL_SIZE,
            });
        }
    }

    fn highlight_endpoints(&mut self) {
        let endpoints = [
            (self.state.start.as_deref(), self.config.palette.start),
            (self.state.end.as_deref(), self.config.palette.end),
        ];
        for (label, color) in endpoints {
            if let Some(at) = label.and_then(|label| self.graph.city(label)).and_then(|city| city.position) {
                self.renderer.draw(Layer::Annotation, Primitive::Point { at, color, size: HIGHLIGHT_SIZE });
            }
        }
    }

    fn highlight_city(&mut self, at: Point, color: Color) {
        self.renderer.draw(Layer::Annotation, Primitive::Point { at, color, size: HIGHLIGHT_SIZE });
    }

    fn highlight_edge(&mut self, from: &str, to: &str, color: Color) {
        let from = self.graph.city(from).and_then(|city| city.position);
        let to = self.graph.city(to).and_then(|city| city.position);
        if let (Some(from), Some(to)) = (from, to) {
            self.renderer.draw(Layer::Annotation, Primitive::Segment { from, to, color, width: HIGHLIGHT_WIDTH });
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LoadFailure;
    use crate::geometry::Distance;
    use crate::render::RecordingRenderer;
    use crate::source::{Geographic, Snapshot};
    use crate::spatial::{City, CityId, ConnectionRow, CityRow};

    // A-B(1) B-C(2) A-C(4) C-D(1), E isolated; cities 100 units apart
    fn sample_snapshot() -> Snapshot {
        let row = |id: i64, label: &str, lon: f64, lat: f64| CityRow {
            id: CityId(id),
            label: label.to_string(),
            lon: Some(lon),
            lat: Some(lat),
        };
        let link = |a: i64, b: i64, weight: f64| ConnectionRow { a: CityId(a), b: CityId(b), weight };

        Snapshot {
            cities: vec![
                row(1, "A", 0.0, 0.0),
                row(2, "B", 100.0, 0.0),
                row(3, "C", 200.0, 0.0),
                row(4, "D", 300.0, 0.0),
                row(5, "E", 0.0, 300.0),
            ],
            connections: vec![link(1, 2, 1.0), link(2, 3, 2.0), link(1, 3, 4.0), link(3, 4, 1.0)],
        }
    }

    fn config() -> ExplorerConfig {
        ExplorerConfig { click_tolerance: 10.0, ..ExplorerConfig::default() }
    }

    fn loaded() -> Explorer<RecordingRenderer> {
        let mut explorer = Explorer::new(config(), RecordingRenderer::new());
        explorer.load(&sample_snapshot(), &Geographic).unwrap();
        explorer
    }

    fn position(explorer: &Explorer<RecordingRenderer>, label: &str) -> Point {
        explorer.graph().city(label).and_then(|city| city.position).unwrap()
    }

    fn click(explorer: &mut Explorer<RecordingRenderer>, label: &str) -> Result<ClickOutcome, ExploreError> {
        let at = position(explorer, label);
        explorer.pointer_click(Point::new(at.x + 3.0, at.y - 2.0))
    }

    fn ready(start: &str, end: &str) -> Explorer<RecordingRenderer> {
        let mut explorer = loaded();
        click(&mut explorer, start).unwrap();
        click(&mut explorer, end).unwrap();
        explorer
    }

    fn w(value: f64) -> Distance {
        Distance::new(value).unwrap()
    }

    #[test]
    fn test_new_explorer_is_empty() {
        let explorer = Explorer::new(config(), RecordingRenderer::new());
        assert_eq!(explorer.phase(), Phase::Empty);
    }

    #[test]
    fn test_load_draws_base_map() {
        let explorer = loaded();

        assert_eq!(explorer.phase(), Phase::SelectingStart);
        let renderer = explorer.renderer();
        assert_eq!(renderer.segments(Layer::Base, Color::Green).len(), 4);
        let mut labels = renderer.texts(Layer::Base);
        labels.sort();
        assert_eq!(labels, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_failed_first_load_stays_empty() {
        let mut explorer = Explorer::new(config(), RecordingRenderer::new());
        let result = explorer.load(&Snapshot::default(), &Geographic);

        assert_eq!(result, Err(ExploreError::Load(LoadFailure::NoCities)));
        assert_eq!(explorer.phase(), Phase::Empty);
    }

    #[test]
    fn test_failed_reload_keeps_previous_state() {
        let mut explorer = ready("A", "D");
        let before = explorer.state().clone();

        let failing = |_: f64, _: f64| -> Result<Point, LoadFailure> {
            Err(LoadFailure::Projection("bad CRS".to_string()))
        };
        assert!(explorer.load(&sample_snapshot(), &failing).is_err());

        assert_eq!(explorer.state(), &before);
        assert_eq!(explorer.graph().len(), 5);
        assert_eq!(explorer.phase(), Phase::ReadyToRun);
    }

    #[test]
    fn test_click_selects_start_then_end() {
        let mut explorer = loaded();

        assert_eq!(click(&mut explorer, "A"), Ok(ClickOutcome::StartSelected("A".to_string())));
        assert_eq!(explorer.phase(), Phase::SelectingEnd);
        assert_eq!(click(&mut explorer, "D"), Ok(ClickOutcome::EndSelected("D".to_string())));
        assert_eq!(explorer.phase(), Phase::ReadyToRun);

        let highlights: Vec<_> = explorer.renderer().visible(Layer::Annotation).into_iter().cloned().collect();
        assert_eq!(highlights, vec![
            Primitive::Point { at: position(&explorer, "A"), color: Color::Red, size: HIGHLIGHT_SIZE },
            Primitive::Point { at: position(&explorer, "D"), color: Color::Green, size: HIGHLIGHT_SIZE },
        ]);
    }

    #[test]
    fn test_click_on_same_city_twice_is_rejected() {
        let mut explorer = loaded();
        click(&mut explorer, "B").unwrap();
        let before = explorer.state().clone();

        assert_eq!(
            click(&mut explorer, "B"),
            Err(ExploreError::Selection(SelectionError::AlreadyStart("B".to_string())))
        );
        assert_eq!(explorer.phase(), Phase::SelectingEnd);
        assert_eq!(explorer.state(), &before);
    }

    #[test]
    fn test_click_on_empty_spot_is_rejected() {
        let mut explorer = loaded();
        let spot = Point::new(50.0, 50.0);

        assert_eq!(
            explorer.pointer_click(spot),
            Err(ExploreError::Selection(SelectionError::NoCityNear(spot)))
        );
        assert_eq!(explorer.phase(), Phase::SelectingStart);
    }

    #[test]
    fn test_click_at_non_finite_point_is_rejected() {
        let mut explorer = loaded();

        for spot in [Point::new(f64::NAN, 5000.0), Point::new(0.0, f64::INFINITY)] {
            let result = explorer.pointer_click(spot);
            assert!(matches!(result, Err(ExploreError::Selection(SelectionError::NoCityNear(_)))));
        }
        assert_eq!(explorer.state(), &ExplorationState::default());
        assert_eq!(explorer.phase(), Phase::SelectingStart);
        assert!(explorer.renderer().visible(Layer::Annotation).is_empty());
    }

    #[test]
    fn test_install_without_placed_cities_keeps_previous_state() {
        let mut explorer = ready("A", "D");
        let before = explorer.state().clone();
        let base = explorer.renderer().visible(Layer::Base).len();

        let unplaced = SpatialGraph::build(
            vec![City { id: CityId(9), label: "Z".to_string(), position: None }],
            Vec::new(),
        );
        for graph in [SpatialGraph::default(), unplaced] {
            assert_eq!(explorer.install(graph), Err(ExploreError::Load(LoadFailure::NoCities)));
        }

        assert_eq!(explorer.state(), &before);
        assert_eq!(explorer.graph().len(), 5);
        assert_eq!(explorer.phase(), Phase::ReadyToRun);
        assert_eq!(explorer.renderer().visible(Layer::Base).len(), base);
    }

    #[test]
    fn test_load_region_adopts_settings() {
        let path = std::env::temp_dir().join(format!("route_explorer_region_{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&sample_snapshot()).unwrap()).unwrap();
        let region = RegionSettings {
            key: "Line",
            crs: "EPSG:4326",
            default_zoom: 5,
            description: "Line - test",
            map_path: "maps/line.shp",
            dataset_path: Box::leak(path.to_string_lossy().into_owned().into_boxed_str()),
            click_tolerance: 40.0,
        };

        let mut explorer = Explorer::new(config(), RecordingRenderer::new());
        explorer.load_settings(&region, &Geographic).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(explorer.region(), Some(&region));
        assert_eq!(explorer.config().click_tolerance, 40.0);
        assert_eq!(explorer.phase(), Phase::SelectingStart);

        // 30 units off is outside the default test tolerance, inside the region's
        assert_eq!(
            explorer.pointer_click(Point::new(130.0, 0.0)),
            Ok(ClickOutcome::StartSelected("B".to_string()))
        );

        explorer.load(&sample_snapshot(), &Geographic).unwrap();
        assert_eq!(explorer.region(), None);
    }

    #[test]
    fn test_load_region_failures_keep_previous_state() {
        let mut explorer = ready("A", "D");
        let before = explorer.state().clone();

        assert_eq!(
            explorer.load_region("Atlantis", &Geographic),
            Err(ExploreError::Load(LoadFailure::UnknownRegion("Atlantis".to_string())))
        );

        let missing = RegionSettings {
            dataset_path: "no/such/dataset.json",
            ..RegionSettings::lookup("Polska").unwrap().clone()
        };
        let result = explorer.load_settings(&missing, &Geographic);
        assert!(matches!(result, Err(ExploreError::Load(LoadFailure::SourceUnavailable(_)))));

        assert_eq!(explorer.state(), &before);
        assert_eq!(explorer.config().click_tolerance, 10.0);
        assert_eq!(explorer.region(), None);
    }

    #[test]
    fn test_click_after_both_chosen_is_rejected() {
        let mut explorer = ready("A", "D");

        assert_eq!(click(&mut explorer, "B"), Err(ExploreError::Selection(SelectionError::SelectionComplete)));
        assert_eq!(explorer.state().end(), Some("D"));
    }

    #[test]
    fn test_click_without_map() {
        let mut explorer = Explorer::new(config(), RecordingRenderer::new());

        assert_eq!(
            explorer.pointer_click(Point::new(0.0, 0.0)),
            Err(ExploreError::Guard(GuardViolation::MapNotLoaded))
        );
    }

    #[test]
    fn test_guards_before_run_and_advance() {
        let mut empty = Explorer::new(config(), RecordingRenderer::new());
        assert_eq!(empty.run_algorithm(), Err(ExploreError::Guard(GuardViolation::MapNotLoaded)));
        assert_eq!(empty.advance_step(), Err(ExploreError::Guard(GuardViolation::MapNotLoaded)));

        let mut explorer = loaded();
        click(&mut explorer, "A").unwrap();
        let before = explorer.state().clone();

        assert_eq!(explorer.run_algorithm(), Err(ExploreError::Guard(GuardViolation::EndpointsNotChosen)));
        assert_eq!(explorer.advance_step(), Err(ExploreError::Guard(GuardViolation::EndpointsNotChosen)));
        assert_eq!(explorer.phase(), Phase::SelectingEnd);
        assert_eq!(explorer.state(), &before);

        click(&mut explorer, "D").unwrap();
        assert_eq!(explorer.advance_step(), Err(ExploreError::Guard(GuardViolation::AlgorithmNotRun)));
        assert_eq!(explorer.phase(), Phase::ReadyToRun);
    }

    #[test]
    fn test_full_playback() {
        let mut explorer = ready("A", "D");

        assert_eq!(explorer.run_algorithm(), Ok(4));
        assert_eq!(explorer.phase(), Phase::Stepping);
        assert_eq!(explorer.state().cursor(), 0);

        let mut played = Vec::new();
        loop {
            match explorer.advance_step().unwrap() {
                StepOutcome::Relaxed { number, step } => {
                    assert_eq!(number, played.len() + 1);
                    played.push(step);
                }
                StepOutcome::Revealed(summary) => {
                    assert_eq!(summary.path, vec!["A", "B", "C", "D"]);
                    assert_eq!(summary.total_cost, Some(w(4.0)));
                    break;
                }
                StepOutcome::AlreadyRevealed(_) => panic!("revealed twice"),
            }
        }

        assert_eq!(played.as_slice(), explorer.state().trace());
        assert_eq!(explorer.state().cursor(), 4);
        assert_eq!(explorer.phase(), Phase::PathRevealed);

        let renderer = explorer.renderer();
        let a = position(&explorer, "A");
        let b = position(&explorer, "B");
        let c = position(&explorer, "C");
        let d = position(&explorer, "D");
        assert_eq!(renderer.segments(Layer::Annotation, Color::Red), vec![(a, b), (a, c), (b, c), (c, d)]);
        assert_eq!(renderer.segments(Layer::Annotation, Color::Blue), vec![(a, b), (b, c), (c, d)]);
        assert_eq!(renderer.texts(Layer::Annotation), vec!["A -> B -> C -> D (cost 4.00)"]);
    }

    #[test]
    fn test_advance_after_reveal_is_idempotent() {
        let mut explorer = ready("A", "D");
        explorer.run_algorithm().unwrap();
        while !matches!(explorer.advance_step().unwrap(), StepOutcome::Revealed(_)) {}

        let state = explorer.state().clone();
        let calls = explorer.renderer().calls.len();

        for _ in 0..3 {
            let outcome = explorer.advance_step().unwrap();
            assert!(matches!(outcome, StepOutcome::AlreadyRevealed(_)));
            assert_eq!(outcome.to_string(), "A -> B -> C -> D (cost 4.00)");
        }
        assert_eq!(explorer.state(), &state);
        assert_eq!(explorer.renderer().calls.len(), calls);
    }

    #[test]
    fn test_unreachable_end_still_plays_trace() {
        let mut explorer = ready("A", "E");

        let steps = explorer.run_algorithm().unwrap();
        assert_eq!(steps, 4);
        assert_eq!(explorer.state().total_cost(), None);

        for _ in 0..steps {
            assert!(matches!(explorer.advance_step(), Ok(StepOutcome::Relaxed { .. })));
        }
        let outcome = explorer.advance_step().unwrap();
        assert_eq!(outcome.to_string(), "no path from A to E");
        assert!(explorer.renderer().segments(Layer::Annotation, Color::Blue).is_empty());
        assert_eq!(explorer.phase(), Phase::PathRevealed);
    }

    #[test]
    fn test_rerun_rewinds_playback() {
        let mut explorer = ready("A", "D");
        explorer.run_algorithm().unwrap();
        explorer.advance_step().unwrap();
        explorer.advance_step().unwrap();

        assert_eq!(explorer.run_algorithm(), Ok(4));
        assert_eq!(explorer.state().cursor(), 0);
        assert_eq!(explorer.phase(), Phase::Stepping);

        // relaxation highlights are gone, endpoints are back
        let renderer = explorer.renderer();
        assert!(renderer.segments(Layer::Annotation, Color::Red).is_empty());
        assert_eq!(renderer.visible(Layer::Annotation).len(), 2);
    }

    #[test]
    fn test_reset_keeps_map_and_clears_annotations() {
        let mut explorer = ready("A", "D");
        explorer.run_algorithm().unwrap();
        explorer.advance_step().unwrap();

        explorer.reset();

        assert_eq!(explorer.state(), &ExplorationState::default());
        assert_eq!(explorer.phase(), Phase::SelectingStart);
        assert_eq!(explorer.graph().len(), 5);
        assert!(explorer.renderer().visible(Layer::Annotation).is_empty());
        assert!(!explorer.renderer().visible(Layer::Base).is_empty());

        // a fresh selection works right away
        assert_eq!(click(&mut explorer, "C"), Ok(ClickOutcome::StartSelected("C".to_string())));
    }

    #[test]
    fn test_unload_returns_to_empty() {
        let mut explorer = ready("A", "D");
        explorer.unload();

        assert_eq!(explorer.phase(), Phase::Empty);
        assert!(explorer.renderer().visible(Layer::Base).is_empty());
        assert_eq!(explorer.advance_step(), Err(ExploreError::Guard(GuardViolation::MapNotLoaded)));
    }

    #[test]
    fn test_large_map_resolves_clicks_through_index() {
        let cities = (0..400).map(|i| City {
            id: CityId(i),
            label: format!("city-{i}"),
            position: Some(Point::new((i % 20) as f64 * 100.0, (i / 20) as f64 * 100.0)),
        });
        let connections: Vec<_> = (0..399)
            .map(|i| ConnectionRow { a: CityId(i), b: CityId(i + 1), weight: 1.0 })
            .collect();

        let mut explorer = Explorer::new(config(), RecordingRenderer::new());
        explorer.install(SpatialGraph::build(cities, connections)).unwrap();
        assert!(explorer.index.is_some());

        let result = explorer.pointer_click(Point::new(f64::NAN, 100.0));
        assert!(matches!(result, Err(ExploreError::Selection(SelectionError::NoCityNear(_)))));
        assert_eq!(explorer.state(), &ExplorationState::default());

        assert_eq!(
            explorer.pointer_click(Point::new(102.0, 98.0)),
            Ok(ClickOutcome::StartSelected("city-21".to_string()))
        );
        assert_eq!(
            explorer.pointer_click(Point::new(300.0, 0.0)),
            Ok(ClickOutcome::EndSelected("city-3".to_string()))
        );
        // both directions along the chain are explored up to distance 18
        assert_eq!(explorer.run_algorithm(), Ok(36));
        assert_eq!(explorer.state().total_cost(), Some(w(18.0)));
    }
}

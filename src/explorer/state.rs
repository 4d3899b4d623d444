use std::fmt;

use crate::geometry::Distance;
use crate::graph_algos::{RelaxationStep, TracedPath};


pub type Step = RelaxationStep<String, Distance>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Empty,
    SelectingStart,
    SelectingEnd,
    ReadyToRun,
    Stepping,
    PathRevealed,
}

/// Everything one exploration owns, cleared as a whole on reset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExplorationState {
    pub(super) start: Option<String>,
    pub(super) end: Option<String>,
    pub(super) search: Option<TracedPath<String, Distance>>,
    pub(super) cursor: usize, // next trace entry to play, 0..=trace.len()
    pub(super) revealed: bool,
}

impl ExplorationState {

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    pub fn has_run(&self) -> bool {
        self.search.is_some()
    }

    /// Computed path, empty before a run and when the end is unreachable
    pub fn path(&self) -> &[String] {
        match &self.search {
            Some(search) => &search.path,
            None => &[],
        }
    }

    /// False before a run and when the end is unreachable
    pub fn is_reachable(&self) -> bool {
        self.search.as_ref().is_some_and(TracedPath::is_reachable)
    }

    /// None before a run and when the end is unreachable
    pub fn total_cost(&self) -> Option<Distance> {
        self.search.as_ref().and_then(|search| search.total_cost)
    }

    pub fn trace(&self) -> &[Step] {
        match &self.search {
            Some(search) => &search.trace,
            None => &[],
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub(super) fn summary(&self) -> Option<PathSummary> {
        let search = self.search.as_ref()?;
        Some(PathSummary {
            start: self.start.clone()?,
            end: self.end.clone()?,
            path: search.path.clone(),
            total_cost: search.total_cost,
        })
    }
}


#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    StartSelected(String),
    EndSelected(String),
}

impl fmt::Display for ClickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickOutcome::StartSelected(city) => write!(f, "start city: {city}"),
            ClickOutcome::EndSelected(city) => write!(f, "end city: {city}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// One relaxation was played, `number` counts from 1
    Relaxed { number: usize, step: Step },
    Revealed(PathSummary),
    /// Path was already on screen, nothing changed
    AlreadyRevealed(PathSummary),
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Relaxed { number, step } => {
                write!(f, "Step {number}: relaxing edge {} -> {} (weight {})", step.from, step.to, step.weight)
            }
            StepOutcome::Revealed(summary) | StepOutcome::AlreadyRevealed(summary) => {
                write!(f, "{summary}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathSummary {
    pub start: String,
    pub end: String,
    pub path: Vec<String>,
    pub total_cost: Option<Distance>,
}

impl fmt::Display for PathSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_cost {
            Some(cost) => write!(f, "{} (cost {cost:.2})", self.path.join(" -> ")),
            None => write!(f, "no path from {} to {}", self.start, self.end),
        }
    }
}

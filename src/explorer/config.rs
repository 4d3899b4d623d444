use serde::{Deserialize, Serialize};

use crate::errors::LoadFailure;
use crate::render::Color;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// How far from a city marker a click still selects it, in CRS units
    pub click_tolerance: f64,

    /// Resolve clicks through a k-d tree once the map has this many cities
    pub spatial_index_threshold: usize,

    pub palette: Palette,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub city: Color,
    pub connection: Color,
    pub label: Color,
    pub start: Color,
    pub end: Color,
    pub relaxation: Color,
    pub path: Color,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            click_tolerance: 20_000.0,
            spatial_index_threshold: 256,
            palette: Palette::default(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            city: Color::Blue,
            connection: Color::Green,
            label: Color::Black,
            start: Color::Red,
            end: Color::Green,
            relaxation: Color::Red,
            path: Color::Blue,
        }
    }
}

impl ExplorerConfig {

    pub fn from_json(json: &str) -> Result<Self, LoadFailure> {
        Ok(serde_json::from_str(json)?)
    }
}

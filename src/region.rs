use crate::errors::LoadFailure;


/// Fixed per-region settings, resolved once when a map is loaded
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSettings {
    pub key: &'static str,
    pub crs: &'static str, // projected CRS the map is drawn in
    pub default_zoom: u8,
    pub description: &'static str,
    pub map_path: &'static str,
    pub dataset_path: &'static str,
    pub click_tolerance: f64, // in CRS units
}

static REGIONS: &[RegionSettings] = &[
    RegionSettings {
        key: "Polska",
        crs: "EPSG:2180",
        default_zoom: 8,
        description: "Polska - Województwa",
        map_path: "maps/wojewodztwa.shp",
        dataset_path: "data/polska.json",
        click_tolerance: 20_000.0,
    },
];

impl RegionSettings {

    pub fn lookup(key: &str) -> Result<&'static RegionSettings, LoadFailure> {
        REGIONS.iter()
            .find(|region| region.key == key)
            .ok_or_else(|| LoadFailure::UnknownRegion(key.to_string()))
    }

    /// Every known region, in menu order
    pub fn all() -> &'static [RegionSettings] {
        REGIONS
    }
}

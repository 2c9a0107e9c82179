pub mod export;
pub mod inspect;
pub mod locate;
pub mod run;

use std::path::Path;

use dusk_core::{MapData, MapIndex, RowMapBuilder};
use dusk_sim::SimConfig;
use tracing::info;

/// Name given to the built-in level.
const DEMO_NAME: &str = "DEMO";

/// Load and index a map JSON file, or the built-in demo level when no path
/// is given.
fn load_map(path: Option<&Path>) -> Result<MapIndex, String> {
    let Some(path) = path else {
        info!("using built-in demo level");
        return RowMapBuilder::demo()
            .build(DEMO_NAME)
            .map_err(|e| format!("demo level: {e}"));
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let data = MapData::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    info!(map = %data.name, path = %path.display(), "map loaded");
    MapIndex::new(data).map_err(|e| format!("{}: {e}", path.display()))
}

/// Read a simulation config file, falling back to defaults.
fn load_config(path: Option<&Path>) -> Result<SimConfig, String> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    SimConfig::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Format an optional sector index for a table cell.
fn sector_cell(sector: Option<usize>) -> String {
    sector.map_or_else(|| "--".to_string(), |s| s.to_string())
}

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::info;

use crate::Error;
use crate::model::StationGroups;

/// Loads alias groups from a JSON list of code lists,
/// e.g. `[["NDLS", "DLI", "NZM", "ANVT"], ["CSMT", "LTT", "DR"]]`.
///
/// # Errors
///
/// I/O or JSON errors.
pub fn load_station_groups(path: &Path) -> Result<StationGroups, Error> {
    let reader = BufReader::new(File::open(path)?);
    let groups: Vec<Vec<String>> = serde_json::from_reader(reader)?;
    let groups = StationGroups::from_groups(groups);
    info!("Loaded {} station groups from {}", groups.len(), path.display());
    Ok(groups)
}

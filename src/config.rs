//! `railhop.toml`
//!
//! ```toml
//! [search]
//! min_connection_minutes = 30
//! max_workers = 5
//! late_arrival_cutoff = "23:30:00"
//!
//! [urgent]
//! lookahead_hours = 6
//!
//! [data]
//! snapshot_dir = "snapshot"
//! stops_cache = "train_stops.json"
//! station_groups = "station_groups.json"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use railhop_core::{SearchConfig, UrgentConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory read by [`crate::SnapshotProvider`]
    pub snapshot_dir: PathBuf,
    /// In-memory cache when unset
    pub stops_cache: Option<PathBuf>,
    pub station_groups: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("snapshot"),
            stops_cache: Some(PathBuf::from("train_stops.json")),
            station_groups: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub urgent: UrgentConfig,
    pub data: DataConfig,
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// The file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// # Errors
    ///
    /// Invalid TOML or values of the wrong type.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

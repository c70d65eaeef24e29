//! Command-line surface over `railhop_core`: configuration file, logging,
//! file-backed data providers and result rendering.

pub mod config;
pub mod logger;
pub mod render;
pub mod snapshot;

pub use config::{AppConfig, DataConfig};
pub use snapshot::SnapshotProvider;

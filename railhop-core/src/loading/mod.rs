//! Persistent and file-backed inputs: the stops cache, seat-chart CSV files
//! and the station alias table.

pub mod seat_chart;
mod station_groups;
mod stops_store;

pub use seat_chart::read_seat_chart;
pub use station_groups::load_station_groups;
pub use stops_store::{CacheStats, StopsCache, normalize_train_number};

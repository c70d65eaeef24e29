//! Tunables for the route engine and urgent mode.
//!
//! Defaults reproduce the fixed constants of the search; a TOML or JSON
//! document may override any subset of them.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{CANDIDATE_LOOKAHEAD_HOURS, MAX_ROUTE_WORKERS, MIN_CONNECTION_MINUTES, Minutes};

/// Configuration of [`crate::RouteSearchEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Shortest acceptable gap between the two legs of an itinerary.
    pub min_connection_minutes: Minutes,
    /// Upper bound on transfer-search workers; the pool never exceeds the
    /// number of first-leg trains.
    pub max_workers: usize,
    /// A train reaching the transfer station at or after this time gets its
    /// second leg searched from the next day.
    pub late_arrival_cutoff: NaiveTime,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_connection_minutes: MIN_CONNECTION_MINUTES,
            max_workers: MAX_ROUTE_WORKERS,
            late_arrival_cutoff: NaiveTime::from_hms_opt(23, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl SearchConfig {
    pub fn min_connection(&self) -> Duration {
        Duration::minutes(self.min_connection_minutes)
    }

    /// Worker count for a pool of `pool_size` first-leg trains
    pub fn worker_count(&self, pool_size: usize) -> usize {
        self.max_workers.min(pool_size).max(1)
    }
}

/// Configuration of candidate selection in urgent mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgentConfig {
    /// Trains must leave their true origin within this many hours from now.
    pub lookahead_hours: i64,
}

impl Default for UrgentConfig {
    fn default() -> Self {
        Self {
            lookahead_hours: CANDIDATE_LOOKAHEAD_HOURS,
        }
    }
}

impl UrgentConfig {
    pub fn lookahead(&self) -> Duration {
        Duration::hours(self.lookahead_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let search = SearchConfig::default();
        assert_eq!(search.min_connection_minutes, 30);
        assert_eq!(search.max_workers, 5);
        assert_eq!(search.late_arrival_cutoff, NaiveTime::from_hms_opt(23, 30, 0).unwrap());
        assert_eq!(UrgentConfig::default().lookahead_hours, 6);
    }

    #[test]
    fn worker_count_is_bounded_by_pool() {
        let search = SearchConfig::default();
        assert_eq!(search.worker_count(2), 2);
        assert_eq!(search.worker_count(40), 5);
        assert_eq!(search.worker_count(0), 1);
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let search: SearchConfig =
            serde_json::from_str(r#"{"min_connection_minutes": 45}"#).unwrap();
        assert_eq!(search.min_connection_minutes, 45);
        assert_eq!(search.max_workers, 5);
    }
}

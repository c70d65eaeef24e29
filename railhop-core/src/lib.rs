//! Seat-aware train journey search.
//!
//! Two entry points sit on top of a small data model:
//!
//! - [`find_routes`] looks for direct trains with bookable seats and, when
//!   there are not enough, for itineraries with one transfer station.
//! - [`UrgentAnalysisOrchestrator`] walks near-term trains in departure order,
//!   plans seats over each train's seat chart and reports the trains whose
//!   standing time fits a budget.
//!
//! Fetching train lists, stop sequences and seat charts is left to the caller
//! through the traits in [`providers`].

pub mod algo;
pub mod config;
mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod providers;
pub mod routing;
pub mod time;
pub mod urgent;

pub use algo::seat_coverage::{SeatCoverageOptimizer, optimize};
pub use config::{SearchConfig, UrgentConfig};
pub use error::Error;
pub use loading::{CacheStats, StopsCache};
pub use model::{
    Itinerary, Leg, SeatAssignmentPlan, SeatSegmentRecord, StationGroups, StationId, Stop,
    TrainAvailability, TrainRoute,
};
pub use routing::{RouteSearchEngine, find_routes};
pub use urgent::{
    AnalysisRequest, AnalysisResult, CandidateSelector, TrainCandidate,
    UrgentAnalysisOrchestrator,
};

/// Minutes between the first leg's arrival and the second leg's departure
pub const MIN_CONNECTION_MINUTES: i64 = 30;
/// Upper bound on concurrent transfer-search workers
pub const MAX_ROUTE_WORKERS: usize = 5;
/// How far ahead urgent mode looks for trains leaving their origin
pub const CANDIDATE_LOOKAHEAD_HOURS: i64 = 6;

/// Wall-clock minutes
pub type Minutes = i64;

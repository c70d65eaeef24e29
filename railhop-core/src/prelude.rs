pub use crate::{CANDIDATE_LOOKAHEAD_HOURS, MAX_ROUTE_WORKERS, MIN_CONNECTION_MINUTES};

// Entry points
pub use crate::routing::{RouteSearchEngine, find_routes};
pub use crate::urgent::{
    AnalysisRequest, AnalysisResult, AnalysisStatus, CandidateSelector, FailedTrain,
    FailureReason, FallbackReason, TrainCandidate, TrainResult, UrgentAnalysisOrchestrator,
};
pub use crate::algo::seat_coverage::{SeatCoverageOptimizer, optimize};

// Collaborators
pub use crate::providers::{AvailabilityProvider, RouteProvider, SeatChartProvider};
pub use crate::loading::{CacheStats, StopsCache};
pub use crate::time::{Clock, FixedClock, SystemClock};

// Data model
pub use crate::model::{
    BerthType, ChartDay, ClassAvailability, Itinerary, Leg, SeatAssignmentPlan, SeatClass,
    SeatSegmentRecord, SeatedSegment, StandingSegment, StationGroups, StationId, Stop,
    TrainAvailability, TrainRoute,
};
pub use crate::{Error, Minutes, SearchConfig, UrgentConfig};

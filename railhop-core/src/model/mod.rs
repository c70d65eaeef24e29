//! Data model for seat-aware train journeys
//!
//! Contains the types shared by the route engine and urgent mode.

pub mod availability;
pub mod itinerary;
pub mod plan;
pub mod route;
pub mod seat;
pub mod station;

pub use availability::{ClassAvailability, TrainAvailability};
pub use itinerary::{Itinerary, Leg, TransferKey};
pub use plan::{SeatAssignmentPlan, SeatedSegment, StandingSegment, StandingStatus};
pub use route::{RouteTimeline, Stop, TrainRoute};
pub use seat::{BerthType, ChartDay, SeatClass, SeatSegmentRecord};
pub use station::{StationGroups, StationId};

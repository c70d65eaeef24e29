//! Urgent mode: near-term trains ranked by standing time.
//!
//! [`CandidateSelector`] lists trains leaving their true origin soon,
//! [`UrgentAnalysisOrchestrator`] plans seats on each of them in turn until
//! enough fit the caller's standing budget.

mod candidates;
mod orchestrator;
pub mod stations;

pub use candidates::{CandidateSelector, FallbackReason, TrainCandidate};
pub use orchestrator::{
    AnalysisRequest, AnalysisResult, AnalysisStatus, FailedTrain, FailureReason, TrainResult,
    UrgentAnalysisOrchestrator,
};

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::candidates::{CandidateSelector, TrainCandidate};
use super::stations::resolve_station_codes;
use crate::Error;
use crate::algo::seat_coverage::SeatCoverageOptimizer;
use crate::config::UrgentConfig;
use crate::loading::StopsCache;
use crate::model::{ChartDay, SeatAssignmentPlan, StationGroups, StationId, TrainRoute};
use crate::providers::{AvailabilityProvider, RouteProvider, SeatChartProvider};
use crate::time::{Clock, next_day, parse_journey_date};

/// Parameters of one urgent analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub origin: String,
    pub destination: String,
    /// `YYYYMMDD`
    pub journey_date: String,
    pub min_valid_routes: usize,
    pub max_standing_time_hours: f64,
    pub max_iterations: usize,
    pub max_candidates_per_iteration: usize,
}

impl AnalysisRequest {
    pub fn new(origin: &str, destination: &str, journey_date: &str) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            journey_date: journey_date.to_string(),
            min_valid_routes: 1,
            max_standing_time_hours: 2.0,
            max_iterations: 5,
            max_candidates_per_iteration: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Success,
    Exhausted,
    Error,
}

/// An accepted train with its plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResult {
    pub train_number: String,
    pub train_name: String,
    pub iteration: usize,
    pub boarding_departure: String,
    pub true_origin_departure: Option<NaiveDateTime>,
    pub origin_code: String,
    pub destination_code: String,
    pub standing_hours: f64,
    pub is_fallback: bool,
    pub warning: Option<String>,
    pub plan: SeatAssignmentPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum FailureReason {
    ScrapingFailed {
        details: String,
    },
    EmptySeatChart,
    RouteUnavailable,
    NoSeatCombinations {
        tried_destinations: Vec<String>,
        origin_used: String,
    },
    ExceedsStandingLimit {
        standing_hours: f64,
        standing_minutes: i64,
        limit_hours: f64,
    },
    ProcessingError {
        details: String,
    },
}

/// A rejected train and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTrain {
    pub train_number: String,
    pub departure_time: String,
    pub iteration: usize,
    #[serde(flatten)]
    pub reason: FailureReason,
}

/// Everything fixed for the duration of one run
struct Run<'a> {
    selector: CandidateSelector,
    origin: &'a StationId,
    destination: &'a StationId,
    journey_date: NaiveDate,
    day: ChartDay,
    limit_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub status: AnalysisStatus,
    pub success: bool,
    pub message: String,
    pub valid_results: Vec<TrainResult>,
    pub failed_trains: Vec<FailedTrain>,
    pub iterations: usize,
    pub candidates_examined: usize,
    /// Every train number handed out by the selector, in any iteration
    pub processed_train_numbers: BTreeSet<String>,
}

impl AnalysisResult {
    fn running() -> Self {
        Self {
            status: AnalysisStatus::Exhausted,
            success: false,
            message: String::new(),
            valid_results: Vec::new(),
            failed_trains: Vec::new(),
            iterations: 0,
            candidates_examined: 0,
            processed_train_numbers: BTreeSet::new(),
        }
    }

    fn error(message: String) -> Self {
        Self {
            status: AnalysisStatus::Error,
            message,
            ..Self::running()
        }
    }

    fn finish(mut self, status: AnalysisStatus, message: String) -> Self {
        self.success = status == AnalysisStatus::Success;
        self.status = status;
        self.message = message;
        self
    }
}

/// Drives candidate selection and seat planning until enough trains fit the
/// standing budget.
///
/// Candidates are analysed one after another; nothing here runs in parallel.
pub struct UrgentAnalysisOrchestrator {
    availability: Arc<dyn AvailabilityProvider>,
    routes: Arc<dyn RouteProvider>,
    charts: Arc<dyn SeatChartProvider>,
    cache: Arc<StopsCache>,
    groups: Arc<StationGroups>,
    clock: Arc<dyn Clock>,
    config: UrgentConfig,
}

impl UrgentAnalysisOrchestrator {
    pub fn new(
        availability: Arc<dyn AvailabilityProvider>,
        routes: Arc<dyn RouteProvider>,
        charts: Arc<dyn SeatChartProvider>,
        cache: Arc<StopsCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            availability,
            routes,
            charts,
            cache,
            groups: Arc::new(StationGroups::default()),
            clock,
            config: UrgentConfig::default(),
        }
    }

    #[must_use]
    pub fn with_groups(mut self, groups: Arc<StationGroups>) -> Self {
        self.groups = groups;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: UrgentConfig) -> Self {
        self.config = config;
        self
    }

    fn selector(&self) -> CandidateSelector {
        CandidateSelector::new(
            Arc::clone(&self.availability),
            Arc::clone(&self.routes),
            Arc::clone(&self.cache),
            Arc::clone(&self.clock),
        )
        .with_groups(Arc::clone(&self.groups))
        .with_config(self.config)
    }

    /// Which prepared chart covers `journey_date`
    pub fn chart_day(&self, journey_date: NaiveDate) -> ChartDay {
        if journey_date == next_day(self.clock.today()) {
            ChartDay::Tomorrow
        } else {
            ChartDay::Today
        }
    }

    /// Runs the analysis. Never fails: problems end up in the result.
    pub fn run_analysis(&self, request: &AnalysisRequest) -> AnalysisResult {
        let journey_date = match parse_journey_date(&request.journey_date) {
            Ok(date) => date,
            Err(e) => {
                warn!("Urgent analysis rejected: {e}");
                return AnalysisResult::error(format!("Analysis failed with error: {e}"));
            }
        };
        let origin = StationId::parse(&request.origin);
        let destination = StationId::parse(&request.destination);
        let limit = request.max_standing_time_hours;
        let run = Run {
            selector: self.selector(),
            origin: &origin,
            destination: &destination,
            journey_date,
            day: self.chart_day(journey_date),
            limit_hours: limit,
        };

        let mut result = AnalysisResult::running();
        if request.min_valid_routes == 0 {
            return result.finish(AnalysisStatus::Success, "No valid routes requested".into());
        }

        for iteration in 1..=request.max_iterations {
            result.iterations = iteration;
            info!("Iteration {iteration}/{}", request.max_iterations);

            let candidates = run.selector.get_candidates(
                &origin,
                &destination,
                journey_date,
                &result.processed_train_numbers,
                request.max_candidates_per_iteration,
            );
            if candidates.is_empty() {
                info!(
                    "No more candidate trains in iteration {iteration}, already processed: {:?}",
                    result.processed_train_numbers
                );
                break;
            }

            info!("Found {} new candidates in iteration {iteration}", candidates.len());
            for candidate in &candidates {
                result.processed_train_numbers.insert(candidate.number.clone());
            }

            for candidate in &candidates {
                result.candidates_examined += 1;
                match self.analyze(&run, candidate) {
                    Ok((origin_code, destination_code, plan)) => {
                        info!(
                            "Train {} accepted: {:.2}h standing",
                            candidate.number,
                            plan.standing_hours()
                        );
                        result.valid_results.push(TrainResult {
                            train_number: candidate.number.clone(),
                            train_name: candidate.name.clone(),
                            iteration,
                            boarding_departure: candidate.boarding_departure_raw.clone(),
                            true_origin_departure: candidate.true_origin_departure,
                            origin_code,
                            destination_code,
                            standing_hours: plan.standing_hours(),
                            is_fallback: candidate.is_fallback,
                            warning: candidate.warning.clone(),
                            plan,
                        });
                        if result.valid_results.len() >= request.min_valid_routes {
                            let message = format!(
                                "Found {} trains within {limit} hours of standing",
                                result.valid_results.len()
                            );
                            return result.finish(AnalysisStatus::Success, message);
                        }
                    }
                    Err(reason) => {
                        info!("Train {} rejected: {reason:?}", candidate.number);
                        result.failed_trains.push(FailedTrain {
                            train_number: candidate.number.clone(),
                            departure_time: candidate.boarding_departure_raw.clone(),
                            iteration,
                            reason,
                        });
                    }
                }
            }
        }

        let message = format!(
            "Found {}/{} trains within {limit} hours of standing after {} iterations",
            result.valid_results.len(),
            request.min_valid_routes,
            result.iterations
        );
        result.finish(AnalysisStatus::Exhausted, message)
    }

    /// Boarding code, destination code and plan of an accepted train
    fn analyze(
        &self,
        run: &Run<'_>,
        candidate: &TrainCandidate,
    ) -> Result<(String, String, SeatAssignmentPlan), FailureReason> {
        let route = self
            .cache
            .get_any(&candidate.number)
            .map(|stops| TrainRoute::new(candidate.number.clone(), stops))
            .or_else(|| {
                run.selector.resolve_route(
                    run.origin,
                    run.destination,
                    run.journey_date,
                    &candidate.number,
                    &candidate.original_number,
                )
            })
            .ok_or(FailureReason::RouteUnavailable)?;

        let (origin_code, destinations) = resolve_station_codes(
            &route,
            run.origin,
            run.destination,
            &candidate.boarding_departure_raw,
            &self.groups,
        );
        debug!("Train {}: origin {origin_code}, destinations {destinations:?}", candidate.number);

        let chart = self
            .charts
            .seat_chart(&candidate.number, run.day)
            .map_err(|e| match e {
                Error::ProviderUnavailable(details) => FailureReason::ScrapingFailed { details },
                other => FailureReason::ProcessingError {
                    details: other.to_string(),
                },
            })?;
        if chart.is_empty() {
            return Err(FailureReason::EmptySeatChart);
        }

        let optimizer = SeatCoverageOptimizer::new(&route);
        let (destination_code, plan) = destinations
            .iter()
            .find_map(|code| match optimizer.plan(&chart, &origin_code, code) {
                Ok(plan) if !plan.is_empty() => Some((code.clone(), plan)),
                Ok(_) => None,
                Err(e) => {
                    debug!("Train {}: destination {code} unusable: {e}", candidate.number);
                    None
                }
            })
            .ok_or_else(|| FailureReason::NoSeatCombinations {
                tried_destinations: destinations.clone(),
                origin_used: origin_code.clone(),
            })?;

        if plan.standing_hours() > run.limit_hours {
            return Err(FailureReason::ExceedsStandingLimit {
                standing_hours: plan.standing_hours(),
                standing_minutes: plan.standing_minutes,
                limit_hours: run.limit_hours,
            });
        }
        Ok((origin_code, destination_code, plan))
    }
}

//! Plain-text output for the terminal

use std::fmt::Write;
use std::path::PathBuf;

use railhop_core::prelude::*;
use railhop_core::time::format_minutes;
use serde::Serialize;

const DATETIME: &str = "%d %b %H:%M";

/// Output of the `cache-stats` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub path: Option<PathBuf>,
    pub total_trains: usize,
}

impl CacheSummary {
    pub fn of(cache: &StopsCache) -> Self {
        Self {
            path: cache.path().map(PathBuf::from),
            total_trains: cache.len(),
        }
    }
}

pub fn itineraries(found: &[Itinerary]) -> String {
    if found.is_empty() {
        return "No routes found\n".to_string();
    }
    let mut out = String::new();
    for (n, itinerary) in found.iter().enumerate() {
        let kind = match itinerary.transfer_station() {
            None => "direct".to_string(),
            Some(via) => format!("via {}", via.code()),
        };
        let _ = writeln!(out, "Route {} ({kind})", n + 1);
        for leg in &itinerary.legs {
            let _ = writeln!(
                out,
                "  {:>6}  {} {} -> {} {}  [{}]",
                leg.train_number,
                leg.from_station.code(),
                leg.departure.format(DATETIME),
                leg.to_station.code(),
                leg.arrival.format(DATETIME),
                format_minutes(leg.duration_minutes()),
            );
        }
        if let Some(wait) = itinerary.connection_minutes() {
            let _ = writeln!(out, "  connection: {}", format_minutes(wait));
        }
    }
    out
}

pub fn plan(plan: &SeatAssignmentPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} -> {}: {} total, {} seated, {} standing ({:.1}%)",
        plan.train_number,
        plan.origin,
        plan.destination,
        format_minutes(plan.total_minutes),
        format_minutes(plan.seated_minutes),
        format_minutes(plan.standing_minutes),
        plan.standing_percentage,
    );

    let seated = plan.seated_segments.iter().map(|s| {
        (
            s.from_index,
            format!(
                "    {} -> {}  {} {}/{} {}  [{}]",
                s.from_station,
                s.to_station,
                s.seat.category,
                s.seat.coach,
                s.seat.berth_no,
                s.seat.berth_type,
                format_minutes(s.minutes),
            ),
        )
    });
    let standing = plan.standing_segments.iter().map(|s| {
        (
            s.from_index,
            format!(
                "    {} -> {}  standing  [{}]",
                s.from_station,
                s.to_station,
                format_minutes(s.minutes),
            ),
        )
    });
    let mut lines: Vec<_> = seated.chain(standing).collect();
    lines.sort_by_key(|(from, _)| *from);
    for (_, line) in lines {
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn failure(reason: &FailureReason) -> String {
    match reason {
        FailureReason::ScrapingFailed { details } => format!("seat chart unavailable: {details}"),
        FailureReason::EmptySeatChart => "seat chart is empty".to_string(),
        FailureReason::RouteUnavailable => "route unavailable".to_string(),
        FailureReason::NoSeatCombinations {
            tried_destinations,
            origin_used,
        } => format!(
            "no seat combination from {origin_used} to any of {}",
            tried_destinations.join(", ")
        ),
        FailureReason::ExceedsStandingLimit {
            standing_hours,
            limit_hours,
            ..
        } => format!("standing {standing_hours:.2}h exceeds {limit_hours:.2}h"),
        FailureReason::ProcessingError { details } => format!("error: {details}"),
    }
}

pub fn analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let status = match result.status {
        AnalysisStatus::Success => "SUCCESS",
        AnalysisStatus::Exhausted => "EXHAUSTED",
        AnalysisStatus::Error => "ERROR",
    };
    let _ = writeln!(out, "{status}: {}", result.message);
    let _ = writeln!(
        out,
        "{} iteration(s), {} candidate(s) examined",
        result.iterations, result.candidates_examined
    );

    for train in &result.valid_results {
        let _ = write!(out, "\n[{}] {} {}", train.iteration, train.train_number, train.train_name);
        if let Some(departure) = train.true_origin_departure {
            let _ = write!(out, "  leaves origin {}", departure.format(DATETIME));
        }
        let _ = writeln!(out, "  boards {}", train.boarding_departure);
        if let Some(warning) = &train.warning {
            let _ = writeln!(out, "  warning: {warning}");
        }
        out.push_str(&plan(&train.plan));
    }

    if !result.failed_trains.is_empty() {
        let _ = writeln!(out, "\nRejected:");
        for failed in &result.failed_trains {
            let _ = writeln!(
                out,
                "  [{}] {} ({}): {}",
                failed.iteration,
                failed.train_number,
                failed.departure_time,
                failure(&failed.reason)
            );
        }
    }
    out
}

/// Hit and miss counters live only as long as the process, so a standalone
/// command reports what is on disk.
pub fn cache_summary(summary: &CacheSummary) -> String {
    let location = summary
        .path
        .as_deref()
        .map_or_else(|| "in memory".to_string(), |path| path.display().to_string());
    format!("stops cache: {location}\ntrains cached: {}\n", summary.total_trains)
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use railhop::{AppConfig, SnapshotProvider, logger, render};
use railhop_core::loading::load_station_groups;
use railhop_core::prelude::*;
use railhop_core::time::{format_journey_date, parse_journey_date};

#[derive(Parser, Debug)]
#[command(version, about = "Seat-aware train journey search")]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        default_value = "railhop.toml",
        help = "TOML configuration file"
    )]
    config: PathBuf,

    #[arg(short, long, global = true, help = "Log at debug level")]
    verbose: bool,

    #[arg(long, global = true, help = "Print JSON instead of text")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Direct and one-transfer itineraries with bookable seats
    Routes {
        #[arg(help = "Origin station, e.g. NDLS or \"New Delhi (NDLS)\"")]
        origin: String,
        #[arg(help = "Destination station")]
        destination: String,
        #[arg(short, long, help = "Journey date as YYYYMMDD, today by default")]
        date: Option<String>,
        #[arg(short = 'n', long, default_value_t = 1, help = "Number of itineraries wanted")]
        max_routes: usize,
        #[arg(long, help = "Override the minimum connection time in minutes")]
        min_connection: Option<i64>,
    },
    /// Near-term trains whose standing time fits a budget
    Urgent {
        origin: String,
        destination: String,
        #[arg(short, long, help = "Journey date as YYYYMMDD, today by default")]
        date: Option<String>,
        #[arg(long, default_value_t = 1)]
        min_valid_routes: usize,
        #[arg(long, default_value_t = 2.0)]
        max_standing_hours: f64,
        #[arg(long, default_value_t = 5)]
        max_iterations: usize,
        #[arg(long, default_value_t = 5)]
        max_candidates: usize,
        #[arg(long, help = "Override how many hours ahead trains may leave their origin")]
        lookahead_hours: Option<i64>,
    },
    /// Number of trains in the stops cache file
    CacheStats,
}

fn journey_date(raw: Option<String>, clock: &dyn Clock) -> String {
    raw.unwrap_or_else(|| format_journey_date(clock.today()))
}

fn print<T: serde::Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce() -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    let mut config = AppConfig::load(&cli.config)?;
    let snapshot = Arc::new(SnapshotProvider::new(&config.data.snapshot_dir));
    let cache = Arc::new(match &config.data.stops_cache {
        Some(path) => StopsCache::open(path),
        None => StopsCache::in_memory(),
    });
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match cli.command {
        Command::Routes {
            origin,
            destination,
            date,
            max_routes,
            min_connection,
        } => {
            if let Some(minutes) = min_connection {
                config.search.min_connection_minutes = minutes;
            }
            let date = parse_journey_date(&journey_date(date, clock.as_ref()))
                .context("journey date must be YYYYMMDD")?;
            let engine = RouteSearchEngine::new(snapshot.clone(), snapshot, cache)
                .with_config(config.search);
            tracing::info!("Searching {origin} -> {destination} on {date}");
            let found = engine.find_routes(
                &StationId::parse(&origin),
                &StationId::parse(&destination),
                date,
                max_routes,
            );
            print(cli.json, &found, || render::itineraries(&found))
        }
        Command::Urgent {
            origin,
            destination,
            date,
            min_valid_routes,
            max_standing_hours,
            max_iterations,
            max_candidates,
            lookahead_hours,
        } => {
            if let Some(hours) = lookahead_hours {
                config.urgent.lookahead_hours = hours;
            }
            let groups = match &config.data.station_groups {
                Some(path) => load_station_groups(path)
                    .with_context(|| format!("reading station groups {}", path.display()))?,
                None => StationGroups::default(),
            };
            let orchestrator = UrgentAnalysisOrchestrator::new(
                snapshot.clone(),
                snapshot.clone(),
                snapshot,
                cache,
                clock.clone(),
            )
            .with_groups(Arc::new(groups))
            .with_config(config.urgent);

            let request = AnalysisRequest {
                min_valid_routes,
                max_standing_time_hours: max_standing_hours,
                max_iterations,
                max_candidates_per_iteration: max_candidates,
                ..AnalysisRequest::new(&origin, &destination, &journey_date(date, clock.as_ref()))
            };
            let result = orchestrator.run_analysis(&request);
            print(cli.json, &result, || render::analysis(&result))
        }
        Command::CacheStats => {
            let summary = render::CacheSummary::of(&cache);
            print(cli.json, &summary, || render::cache_summary(&summary))
        }
    }
}

use std::sync::{Arc, Mutex, mpsc};

use chrono::NaiveDate;
use log::{error, info};
use rayon::ThreadPoolBuilder;

use super::state::{CancellationToken, FoundRoutes};
use super::worker::{TransferSearch, bookable_legs, query};
use crate::config::SearchConfig;
use crate::loading::StopsCache;
use crate::model::{Itinerary, StationId, TrainAvailability};
use crate::providers::{AvailabilityProvider, RouteProvider};

/// Itinerary search over an availability source and a route source.
///
/// The stops cache is shared with whoever else holds the `Arc`, typically the
/// urgent-mode candidate selector.
#[derive(Clone)]
pub struct RouteSearchEngine {
    availability: Arc<dyn AvailabilityProvider>,
    routes: Arc<dyn RouteProvider>,
    cache: Arc<StopsCache>,
    config: SearchConfig,
}

impl RouteSearchEngine {
    pub fn new(
        availability: Arc<dyn AvailabilityProvider>,
        routes: Arc<dyn RouteProvider>,
        cache: Arc<StopsCache>,
    ) -> Self {
        Self {
            availability,
            routes,
            cache,
            config: SearchConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<StopsCache> {
        &self.cache
    }

    /// Up to `max_routes` itineraries, direct ones first.
    ///
    /// Provider failures and unusable timestamps are logged and skipped; when
    /// nothing is found the result is empty.
    pub fn find_routes(
        &self,
        origin: &StationId,
        destination: &StationId,
        date: NaiveDate,
        max_routes: usize,
    ) -> Vec<Itinerary> {
        if max_routes == 0 {
            return Vec::new();
        }

        info!("Checking direct trains {origin} -> {destination} on {date}");
        let direct_pool = query(self.availability.as_ref(), origin, destination, date);
        if direct_pool.is_empty() {
            info!("No trains found from {origin} to {destination}");
            return Vec::new();
        }

        let mut results = Vec::new();
        for leg in bookable_legs(&direct_pool, origin, destination, date) {
            info!("Found direct route with train {}", leg.train_number);
            results.push(Itinerary::direct(leg));
            if results.len() >= max_routes {
                info!("Found required number of direct routes");
                return results;
            }
        }

        info!("Checking routes with one transfer");
        let pool = query(self.availability.as_ref(), origin, destination, date);
        if pool.is_empty() {
            return results;
        }
        let quota = max_routes - results.len();
        results.extend(self.search_transfers(origin, destination, date, pool, quota));
        results
    }

    fn search_transfers(
        &self,
        origin: &StationId,
        destination: &StationId,
        date: NaiveDate,
        pool: Vec<TrainAvailability>,
        quota: usize,
    ) -> Vec<Itinerary> {
        let workers = self.config.worker_count(pool.len());
        let thread_pool = match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("route-worker-{i}"))
            .build()
        {
            Ok(thread_pool) => thread_pool,
            Err(e) => {
                error!("Failed to start route workers: {e}");
                return Vec::new();
            }
        };
        info!("Starting {workers} workers for {} trains", pool.len());

        let search = Arc::new(TransferSearch {
            availability: Arc::clone(&self.availability),
            routes: Arc::clone(&self.routes),
            cache: Arc::clone(&self.cache),
            config: self.config,
            origin: origin.clone(),
            destination: destination.clone(),
            date,
            found: Mutex::new(FoundRoutes::new(quota)),
            cancel: CancellationToken::new(),
        });

        let (tx, rx) = mpsc::channel();
        for train in pool {
            let search = Arc::clone(&search);
            let tx = tx.clone();
            thread_pool.spawn(move || {
                if let Some(itinerary) = search.run(&train) {
                    // The receiver is gone once the quota is met.
                    tx.send(itinerary).ok();
                }
            });
        }
        drop(tx);

        let mut found = Vec::with_capacity(quota);
        for itinerary in rx {
            info!("Found route {}/{quota} via transfer", found.len() + 1);
            found.push(itinerary);
            if found.len() >= quota {
                info!("Required number of routes found, cancelling remaining workers");
                search.cancel.cancel();
                break;
            }
        }
        found
    }
}

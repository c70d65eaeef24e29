//! Contracts of the external data sources.
//!
//! Implementations wrap network scrapers, snapshot files or test stubs. The
//! engine treats every call as slow and unreliable: an `Err` or an empty list
//! both mean "no data" and are logged at the call site.

use chrono::NaiveDate;

use crate::Error;
use crate::model::{ChartDay, SeatSegmentRecord, StationId, TrainAvailability, TrainRoute};

/// Trains between two stations on a date, with per-class availability
pub trait AvailabilityProvider: Send + Sync {
    /// # Errors
    ///
    /// [`Error::ProviderUnavailable`] or any transport error of the
    /// implementation.
    fn search(
        &self,
        origin: &StationId,
        destination: &StationId,
        date: NaiveDate,
    ) -> Result<Vec<TrainAvailability>, Error>;
}

/// Full stop sequences of trains
pub trait RouteProvider: Send + Sync {
    /// Routes of the trains running `origin -> destination` on `date`,
    /// restricted to `target_train` when given.
    ///
    /// # Errors
    ///
    /// [`Error::ProviderUnavailable`] or any transport error of the
    /// implementation.
    fn routes(
        &self,
        origin: &StationId,
        destination: &StationId,
        date: NaiveDate,
        target_train: Option<&str>,
    ) -> Result<Vec<TrainRoute>, Error>;
}

/// Seat-chart rows of one train for the chart prepared today or tomorrow
pub trait SeatChartProvider: Send + Sync {
    /// # Errors
    ///
    /// [`Error::ProviderUnavailable`] when the chart cannot be fetched.
    fn seat_chart(&self, train_number: &str, day: ChartDay)
    -> Result<Vec<SeatSegmentRecord>, Error>;
}

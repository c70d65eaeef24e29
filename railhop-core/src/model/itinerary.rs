//! Legs and itineraries produced by the route engine

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::availability::TrainAvailability;
use super::station::StationId;
use crate::time::{minutes_between, parse_span};
use crate::{Error, Minutes};

/// One continuous ride on a single train
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub train_number: String,
    pub from_station: StationId,
    pub to_station: StationId,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
}

impl Leg {
    /// Builds a leg from a search result. An arrival earlier than the
    /// departure is moved to the next day.
    ///
    /// # Errors
    ///
    /// [`Error::UnparseableTime`] if either timestamp is unusable.
    pub fn from_availability(
        train: &TrainAvailability,
        from_station: &StationId,
        to_station: &StationId,
        date: NaiveDate,
    ) -> Result<Self, Error> {
        let (departure, arrival) = parse_span(&train.departure_time, &train.arrival_time, date)?;
        Ok(Self {
            train_number: train.number.trim().to_string(),
            from_station: from_station.clone(),
            to_station: to_station.clone(),
            departure,
            arrival,
        })
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure.date()
    }

    pub fn arrival_date(&self) -> NaiveDate {
        self.arrival.date()
    }

    pub fn duration_minutes(&self) -> Minutes {
        minutes_between(self.departure, self.arrival)
    }
}

/// Identity of a two-leg itinerary: `(first train, transfer station, second train)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferKey {
    pub first_train: String,
    pub transfer_station: String,
    pub second_train: String,
}

/// A complete journey of one or two legs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    pub legs: Vec<Leg>,
}

impl Itinerary {
    pub fn direct(leg: Leg) -> Self {
        Self { legs: vec![leg] }
    }

    pub fn with_transfer(first: Leg, second: Leg) -> Self {
        Self {
            legs: vec![first, second],
        }
    }

    pub fn is_direct(&self) -> bool {
        self.legs.len() == 1
    }

    pub fn transfer_station(&self) -> Option<&StationId> {
        match self.legs.as_slice() {
            [first, _second] => Some(&first.to_station),
            _ => None,
        }
    }

    /// Layover between the legs
    pub fn connection_minutes(&self) -> Option<Minutes> {
        match self.legs.as_slice() {
            [first, second] => Some(minutes_between(first.arrival, second.departure)),
            _ => None,
        }
    }

    /// Direct itineraries are always valid; two-leg ones need matching
    /// transfer stations and at least `min_connection_minutes` between them.
    pub fn is_valid(&self, min_connection_minutes: Minutes) -> bool {
        match self.legs.as_slice() {
            [_] => true,
            [first, second] => {
                first.to_station == second.from_station
                    && minutes_between(first.arrival, second.departure) >= min_connection_minutes
            }
            _ => false,
        }
    }

    pub fn key(&self) -> Option<TransferKey> {
        match self.legs.as_slice() {
            [first, second] => Some(TransferKey {
                first_train: first.train_number.clone(),
                transfer_station: first.to_station.code().to_string(),
                second_train: second.train_number.clone(),
            }),
            _ => None,
        }
    }

    pub fn departure(&self) -> Option<NaiveDateTime> {
        self.legs.first().map(|leg| leg.departure)
    }

    pub fn arrival(&self) -> Option<NaiveDateTime> {
        self.legs.last().map(|leg| leg.arrival)
    }
}

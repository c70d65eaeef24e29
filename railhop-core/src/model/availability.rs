//! Seat availability as returned by a train search

use serde::{Deserialize, Serialize};

/// Availability of one class on one train, e.g. `("3A", "AVL 12")`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClassAvailability {
    #[serde(rename = "type", alias = "class")]
    pub class: String,
    pub availability: String,
    pub price: Option<String>,
}

impl ClassAvailability {
    pub fn new(class: &str, availability: &str) -> Self {
        Self {
            class: class.to_string(),
            availability: availability.to_string(),
            price: None,
        }
    }

    /// Confirmed (`AVL`) or RAC seats can be booked
    pub fn is_bookable(&self) -> bool {
        let status = self.availability.to_ascii_uppercase();
        status.contains("AVL") || status.contains("RAC")
    }
}

/// One train from an origin/destination/date search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrainAvailability {
    pub number: String,
    pub name: String,
    /// Departure at the searched origin, raw
    pub departure_time: String,
    /// Arrival at the searched destination, raw
    pub arrival_time: String,
    #[serde(alias = "classes_and_availability")]
    pub classes: Vec<ClassAvailability>,
    pub from_station: String,
    pub to_station: String,
}

impl TrainAvailability {
    pub fn new(number: &str, departure_time: &str, arrival_time: &str) -> Self {
        Self {
            number: number.to_string(),
            departure_time: departure_time.to_string(),
            arrival_time: arrival_time.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_class(mut self, class: &str, availability: &str) -> Self {
        self.classes.push(ClassAvailability::new(class, availability));
        self
    }

    pub fn has_seats(&self) -> bool {
        self.classes.iter().any(ClassAvailability::is_bookable)
    }
}

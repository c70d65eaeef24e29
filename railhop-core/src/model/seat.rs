//! Seat chart rows and their classification

use std::fmt;

use serde::{Deserialize, Serialize};

use super::station::StationId;

/// One seat-chart row: a berth that is free between two stations.
///
/// Column names follow the chart CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SeatSegmentRecord {
    /// Class label, e.g. `SLEEPER` or `THIRD AC (3A)`
    pub category: String,
    pub page_number: String,
    /// `NAME (CODE)` or a bare code
    pub from_station: String,
    pub to_station: String,
    pub coach: String,
    pub berth_no: String,
    pub berth_type: String,
    pub cabin: String,
    pub cabin_no: String,
}

impl SeatSegmentRecord {
    pub fn new(category: &str, coach: &str, berth_no: &str, from: &str, to: &str) -> Self {
        Self {
            category: category.to_string(),
            coach: coach.to_string(),
            berth_no: berth_no.to_string(),
            from_station: from.to_string(),
            to_station: to.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_berth_type(mut self, berth_type: &str) -> Self {
        self.berth_type = berth_type.to_string();
        self
    }

    /// Identity of the physical berth, independent of the segment
    pub fn seat_id(&self) -> String {
        format!("{}_{}_{}", self.category, self.coach, self.berth_no)
    }

    pub fn from_code(&self) -> String {
        StationId::parse(&self.from_station).code().to_string()
    }

    pub fn to_code(&self) -> String {
        StationId::parse(&self.to_station).code().to_string()
    }

    pub fn seat_class(&self) -> SeatClass {
        SeatClass::from_label(&self.category)
    }

    pub fn berth(&self) -> BerthType {
        BerthType::from_label(&self.berth_type)
    }

    pub fn berth_number(&self) -> Option<i64> {
        self.berth_no.trim().parse().ok()
    }
}

/// Travel classes in ascending order of comfort
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeatClass {
    Sleeper,
    ThirdEconomy,
    ThirdAc,
    SecondAc,
    FirstAc,
    Other,
}

impl SeatClass {
    /// Reads labels such as `SLEEPER`, `SL`, `THIRD AC (3E)` or `2A`
    pub fn from_label(label: &str) -> Self {
        let upper = label.to_ascii_uppercase();
        let code = upper
            .rfind('(')
            .and_then(|open| upper[open + 1..].split(')').next())
            .map_or_else(|| upper.trim().to_string(), |inner| inner.trim().to_string());

        match code.as_str() {
            "SL" | "SLEEPER" => Self::Sleeper,
            "3E" => Self::ThirdEconomy,
            "3A" => Self::ThirdAc,
            "2A" => Self::SecondAc,
            "1A" => Self::FirstAc,
            _ if upper.contains("SLEEPER") => Self::Sleeper,
            _ => Self::Other,
        }
    }

    /// 1 for sleeper up to 5 for first AC
    pub fn rank(self) -> Option<i64> {
        match self {
            Self::Sleeper => Some(1),
            Self::ThirdEconomy => Some(2),
            Self::ThirdAc => Some(3),
            Self::SecondAc => Some(4),
            Self::FirstAc => Some(5),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BerthType {
    Lower,
    SideLower,
    Middle,
    SideUpper,
    Upper,
    Other,
}

impl BerthType {
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_ascii_lowercase();
        if lower.contains("side lower") {
            Self::SideLower
        } else if lower.contains("side upper") {
            Self::SideUpper
        } else if lower.contains("lower") {
            Self::Lower
        } else if lower.contains("middle") {
            Self::Middle
        } else if lower.contains("upper") {
            Self::Upper
        } else {
            Self::Other
        }
    }

    /// Comfort bonus used when choosing between equivalent seats
    pub fn bonus(self) -> i64 {
        match self {
            Self::Lower => 20,
            Self::SideLower => 15,
            Self::Middle => 10,
            Self::SideUpper => 8,
            Self::Upper => 5,
            Self::Other => 0,
        }
    }
}

/// Which chart the seat-chart collaborator should open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartDay {
    Today,
    Tomorrow,
}

impl ChartDay {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
        }
    }
}

impl fmt::Display for ChartDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_labels() {
        assert_eq!(SeatClass::from_label("SLEEPER"), SeatClass::Sleeper);
        assert_eq!(SeatClass::from_label("THIRD AC (3E)"), SeatClass::ThirdEconomy);
        assert_eq!(SeatClass::from_label("THIRD AC (3A)"), SeatClass::ThirdAc);
        assert_eq!(SeatClass::from_label("second ac (2a)"), SeatClass::SecondAc);
        assert_eq!(SeatClass::from_label("1A"), SeatClass::FirstAc);
        assert_eq!(SeatClass::from_label("CHAIR CAR (CC)"), SeatClass::Other);
        assert!(SeatClass::Sleeper < SeatClass::FirstAc);
        assert_eq!(SeatClass::Other.rank(), None);
    }

    #[test]
    fn berth_labels_prefer_side_variants() {
        assert_eq!(BerthType::from_label("Side Lower"), BerthType::SideLower);
        assert_eq!(BerthType::from_label("SIDE UPPER"), BerthType::SideUpper);
        assert_eq!(BerthType::from_label("Lower"), BerthType::Lower);
        assert_eq!(BerthType::from_label("Middle"), BerthType::Middle);
        assert_eq!(BerthType::from_label("Upper"), BerthType::Upper);
        assert!(BerthType::Lower.bonus() > BerthType::SideLower.bonus());
        assert!(BerthType::SideLower.bonus() > BerthType::Middle.bonus());
        assert!(BerthType::Middle.bonus() > BerthType::SideUpper.bonus());
        assert!(BerthType::SideUpper.bonus() > BerthType::Upper.bonus());
    }

    #[test]
    fn record_codes_and_identity() {
        let record = SeatSegmentRecord::new("SLEEPER", "S4", "17", "JAISALMER (JSM)", "JU");
        assert_eq!(record.from_code(), "JSM");
        assert_eq!(record.to_code(), "JU");
        assert_eq!(record.seat_id(), "SLEEPER_S4_17");
        assert_eq!(record.berth_number(), Some(17));
    }
}

//! Timestamp normalization for the heterogeneous strings travel sites emit.
//!
//! Recognized shapes, tried in order:
//!
//! | input            | meaning                                   |
//! |------------------|-------------------------------------------|
//! | `Start`          | base date, 00:00                          |
//! | `Finish`         | base date, 23:59                          |
//! | `15 Nov, 13:15`  | given day and month, year of the base date |
//! | `13:15`          | base date at that clock time              |
//! | `13:15 15 Nov 25`| fully qualified, two-digit year = 20YY    |

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Minutes};

/// Timezone in which journey dates and departure windows are interpreted
pub const JOURNEY_TZ: Tz = chrono_tz::Asia::Kolkata;

pub const START_SENTINEL: &str = "Start";
pub const FINISH_SENTINEL: &str = "Finish";

static DAY_MONTH_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3}),\s*(\d{1,2}):(\d{2})$")
        .expect("failed to compile day-month-time regex")
});
static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("failed to compile clock regex"));
static EXTENDED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})\s+(\d{1,2})\s+([A-Za-z]{3})\s+(\d{2})$")
        .expect("failed to compile extended time regex")
});

fn month_number(abbrev: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = abbrev.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

fn hm(hour: &str, minute: &str) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// Parses a raw train timestamp relative to `base`.
///
/// # Errors
///
/// [`Error::UnparseableTime`] when no pattern matches or the components do not
/// form a real date.
pub fn parse_train_time(raw: &str, base: NaiveDate) -> Result<NaiveDateTime, Error> {
    let s = raw.trim();
    let unparseable = || {
        debug!("Could not parse time {s:?} against base date {base}");
        Error::UnparseableTime(s.to_string())
    };

    if s == START_SENTINEL {
        return Ok(base.and_time(NaiveTime::MIN));
    }
    if s == FINISH_SENTINEL {
        return NaiveTime::from_hms_opt(23, 59, 0)
            .map(|t| base.and_time(t))
            .ok_or_else(unparseable);
    }

    if let Some(caps) = DAY_MONTH_TIME_RE.captures(s) {
        let day: u32 = caps[1].parse().map_err(|_| unparseable())?;
        let month = month_number(&caps[2]).ok_or_else(unparseable)?;
        let time = hm(&caps[3], &caps[4]).ok_or_else(unparseable)?;
        return NaiveDate::from_ymd_opt(base.year(), month, day)
            .map(|d| d.and_time(time))
            .ok_or_else(unparseable);
    }

    if let Some(caps) = CLOCK_RE.captures(s) {
        return hm(&caps[1], &caps[2])
            .map(|t| base.and_time(t))
            .ok_or_else(unparseable);
    }

    if let Some(caps) = EXTENDED_RE.captures(s) {
        let time = hm(&caps[1], &caps[2]).ok_or_else(unparseable)?;
        let day: u32 = caps[3].parse().map_err(|_| unparseable())?;
        let month = month_number(&caps[4]).ok_or_else(unparseable)?;
        let year: i32 = caps[5].parse().map_err(|_| unparseable())?;
        return NaiveDate::from_ymd_opt(2000 + year, month, day)
            .map(|d| d.and_time(time))
            .ok_or_else(unparseable);
    }

    Err(unparseable())
}

/// Parses a departure/arrival pair on the same base date.
///
/// An arrival whose clock time falls before the departure is taken to cross
/// midnight and is re-parsed against the following day.
///
/// # Errors
///
/// [`Error::UnparseableTime`] if either side fails to parse.
pub fn parse_span(
    departure_raw: &str,
    arrival_raw: &str,
    base: NaiveDate,
) -> Result<(NaiveDateTime, NaiveDateTime), Error> {
    let departure = parse_train_time(departure_raw, base)?;
    let mut arrival = parse_train_time(arrival_raw, base)?;
    if arrival < departure {
        arrival = parse_train_time(arrival_raw, next_day(base))?;
    }
    Ok((departure, arrival))
}

/// Clock component of any non-sentinel timestamp
pub fn clock_time(raw: &str) -> Option<NaiveTime> {
    let s = raw.trim();
    if s == START_SENTINEL || s == FINISH_SENTINEL {
        return None;
    }
    // The base date only matters for the date part, which is discarded.
    parse_train_time(s, NaiveDate::from_ymd_opt(2000, 1, 1)?)
        .ok()
        .map(|dt| dt.time())
}

/// `HH:MM` rendering of a timestamp's clock component, for equality checks
/// between differently formatted strings (`9:05` vs `09:05` vs `1 Jun, 09:05`).
pub fn normalize_clock(raw: &str) -> Option<String> {
    clock_time(raw).map(|t| t.format("%H:%M").to_string())
}

pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}

/// Parses an 8-digit `YYYYMMDD` journey date.
///
/// # Errors
///
/// [`Error::InvalidDate`] for anything else.
pub fn parse_journey_date(raw: &str) -> Result<NaiveDate, Error> {
    let s = raw.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

pub fn format_journey_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> Minutes {
    (to - from).num_minutes()
}

/// `2h 30m` style rendering
pub fn format_minutes(minutes: Minutes) -> String {
    let minutes = minutes.max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Source of "now" for window checks
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&JOURNEY_TZ)
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Tz>);

impl FixedClock {
    /// Freezes the clock at a wall-clock time in [`JOURNEY_TZ`]
    pub fn local(naive: NaiveDateTime) -> Self {
        let instant = JOURNEY_TZ
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| JOURNEY_TZ.from_utc_datetime(&naive));
        Self(instant)
    }

    #[must_use]
    pub fn advanced(self, by: Duration) -> Self {
        Self(self.0 + by)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.0
    }
}

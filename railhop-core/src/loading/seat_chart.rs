//! Seat-chart CSV files as produced by the chart scraper

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use crate::Error;
use crate::model::SeatSegmentRecord;

/// Placeholder station the scraper emits for its filter widget rows
pub const FILTER_PLACEHOLDER: &str = "filter_list";

/// Reads a seat chart from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn read_seat_chart(path: &Path) -> Result<Vec<SeatSegmentRecord>, Error> {
    let file = File::open(path)?;
    let records = parse_seat_chart(file);
    debug!("Read {} seat segments from {}", records.len(), path.display());
    Ok(records)
}

/// Parses seat-chart rows, skipping malformed and placeholder rows
pub fn parse_seat_chart<R: Read>(reader: R) -> Vec<SeatSegmentRecord> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize::<SeatSegmentRecord>()
        .filter_map(|row| match row {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed seat chart row: {e}");
                None
            }
        })
        .filter(|record| record.from_station != FILTER_PLACEHOLDER)
        .collect()
}

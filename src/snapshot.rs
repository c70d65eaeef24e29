//! Providers backed by a directory of previously scraped data:
//!
//! ```text
//! <dir>/availability/<FROM>_<TO>_<YYYYMMDD>.json   [TrainAvailability]
//! <dir>/routes/<train number>.json                 TrainRoute
//! <dir>/charts/<today|tomorrow>/<train number>.csv seat chart
//! ```
//!
//! A missing availability or route file means "no trains"; a missing chart
//! is reported as an unavailable provider.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use railhop_core::loading::{normalize_train_number, read_seat_chart};
use railhop_core::prelude::*;
use railhop_core::time::format_journey_date;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    dir: PathBuf,
}

impl SnapshotProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn availability_path(&self, from: &StationId, to: &StationId, date: NaiveDate) -> PathBuf {
        self.dir.join("availability").join(format!(
            "{}_{}_{}.json",
            from.code(),
            to.code(),
            format_journey_date(date)
        ))
    }

    fn route_path(&self, number: &str) -> PathBuf {
        self.dir.join("routes").join(format!("{number}.json"))
    }

    fn chart_path(&self, number: &str, day: ChartDay) -> PathBuf {
        self.dir
            .join("charts")
            .join(day.as_str())
            .join(format!("{number}.csv"))
    }
}

/// `None` when the file does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, Error> {
    match File::open(path) {
        Ok(file) => Ok(Some(serde_json::from_reader(BufReader::new(file))?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No snapshot file {}", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

impl AvailabilityProvider for SnapshotProvider {
    fn search(
        &self,
        origin: &StationId,
        destination: &StationId,
        date: NaiveDate,
    ) -> Result<Vec<TrainAvailability>, Error> {
        let path = self.availability_path(origin, destination, date);
        Ok(read_json(&path)?.unwrap_or_default())
    }
}

impl RouteProvider for SnapshotProvider {
    fn routes(
        &self,
        _origin: &StationId,
        _destination: &StationId,
        _date: NaiveDate,
        target_train: Option<&str>,
    ) -> Result<Vec<TrainRoute>, Error> {
        if let Some(target) = target_train {
            let path = self.route_path(&normalize_train_number(target));
            return Ok(read_json::<TrainRoute>(&path)?.into_iter().collect());
        }

        let dir = self.dir.join("routes");
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut routes = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                routes.extend(read_json::<TrainRoute>(&path)?);
            }
        }
        Ok(routes)
    }
}

impl SeatChartProvider for SnapshotProvider {
    fn seat_chart(
        &self,
        train_number: &str,
        day: ChartDay,
    ) -> Result<Vec<SeatSegmentRecord>, Error> {
        let path = self.chart_path(&normalize_train_number(train_number), day);
        if !path.exists() {
            return Err(Error::ProviderUnavailable(format!(
                "no {day} seat chart for train {train_number}"
            )));
        }
        read_seat_chart(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("railhop-snapshot-{}-{name}", std::process::id()));
        fs::create_dir_all(dir.join("availability")).unwrap();
        fs::create_dir_all(dir.join("routes")).unwrap();
        fs::create_dir_all(dir.join("charts/today")).unwrap();
        dir
    }

    #[test]
    fn reads_all_three_sources() {
        let dir = scratch("all");
        fs::write(
            dir.join("availability/NDLS_BCT_20250601.json"),
            r#"[{"number": "12952", "departure_time": "16:55", "arrival_time": "08:35",
                "classes_and_availability": [{"type": "3A", "availability": "AVL 4"}]}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("routes/12952.json"),
            r#"{"number": "12952", "stops": [
                {"station_name": "New Delhi", "station_code": "NDLS",
                 "arrival_time": "Start", "departure_time": "16:55"},
                {"station_name": "Mumbai Central", "station_code": "BCT",
                 "arrival_time": "08:35", "departure_time": "Finish"}
            ]}"#,
        )
        .unwrap();
        fs::write(
            dir.join("charts/today/12952.csv"),
            "category,page_number,from_station,to_station,\
             coach,berth_no,berth_type,cabin,cabin_no\n\
             THIRD AC (3A),1,NEW DELHI (NDLS),MUMBAI CENTRAL (BCT),B1,7,Lower,C1,1\n",
        )
        .unwrap();

        let provider = SnapshotProvider::new(&dir);
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let ndls = StationId::parse("NDLS");
        let bct = StationId::parse("BCT");

        let trains = provider.search(&ndls, &bct, day).unwrap();
        assert_eq!(trains.len(), 1);
        assert!(trains[0].has_seats());
        assert!(provider.search(&bct, &ndls, day).unwrap().is_empty());

        let routes = provider.routes(&ndls, &bct, day, Some("(12952)")).unwrap();
        assert_eq!(routes[0].stops.len(), 2);
        assert_eq!(provider.routes(&ndls, &bct, day, None).unwrap().len(), 1);

        assert_eq!(provider.seat_chart("12952", ChartDay::Today).unwrap().len(), 1);
        assert!(matches!(
            provider.seat_chart("12952", ChartDay::Tomorrow),
            Err(Error::ProviderUnavailable(_))
        ));

        fs::remove_dir_all(&dir).ok();
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unrecognized time format: {0}")]
    UnparseableTime(String),
    #[error("Station {0} not found in train route")]
    StationNotFound(String),
    #[error("Origin {origin} must come before destination {destination} in train route")]
    InvalidRouteOrder { origin: String, destination: String },
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::model::Stop;

static TRAIN_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4,5}").expect("failed to compile train number regex"));

/// Numeric core of a decorated train identifier: `"(12951) Rajdhani"` gives
/// `"12951"`. Inputs without a 4-5 digit run come back trimmed.
pub fn normalize_train_number(raw: &str) -> String {
    let raw = raw.trim();
    TRAIN_NUMBER_RE
        .find(raw)
        .map_or_else(|| raw.to_string(), |m| m.as_str().to_string())
}

/// Key spellings found in cache files written by older scrapers
fn key_variants(raw: &str) -> Vec<String> {
    let number = normalize_train_number(raw);
    [
        number.clone(),
        raw.trim().to_string(),
        format!(" ({number}"),
        format!("({number}"),
        format!("{number})"),
        format!("({number})"),
        format!("\"{number}\""),
    ]
    .into_iter()
    .unique()
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub total_trains: usize,
}

/// Train number to stop sequence, optionally persisted as a JSON object.
///
/// Reads are concurrent. Writes go through a single writer lock and replace
/// the file atomically (temporary file, then rename), so concurrent searches
/// sharing one cache never interleave partial files.
#[derive(Debug)]
pub struct StopsCache {
    path: Option<PathBuf>,
    stops: RwLock<HashMap<String, Vec<Stop>>>,
    writer: Mutex<()>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for StopsCache {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StopsCache {
    pub fn in_memory() -> Self {
        Self::with_entries(None, HashMap::new())
    }

    /// Opens the cache file at `path`. A missing or unreadable file yields an
    /// empty cache that will be created on the first `put`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => {
                info!("Loaded {} train stop lists from {}", entries.len(), path.display());
                entries
            }
            Err(Error::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No stops cache at {}, starting empty", path.display());
                HashMap::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable stops cache {}: {e}", path.display());
                HashMap::new()
            }
        };
        Self::with_entries(Some(path), entries)
    }

    fn with_entries(path: Option<PathBuf>, entries: HashMap<String, Vec<Stop>>) -> Self {
        Self {
            path,
            stops: RwLock::new(entries),
            writer: Mutex::new(()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lookup(&self, key: &str) -> Option<Vec<Stop>> {
        let guard = self.stops.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.get(key).filter(|stops| !stops.is_empty()).cloned()
    }

    fn record(&self, key: &str, found: bool) {
        let (hits, misses) = if found {
            (self.hits.fetch_add(1, Ordering::Relaxed) + 1, self.misses.load(Ordering::Relaxed))
        } else {
            (self.hits.load(Ordering::Relaxed), self.misses.fetch_add(1, Ordering::Relaxed) + 1)
        };
        let verdict = if found { "hit" } else { "miss" };
        debug!("Stops cache {verdict} for train {key} (hits: {hits}, misses: {misses})");
    }

    /// Exact-key lookup. An empty stored list counts as a miss.
    pub fn get(&self, train_number: &str) -> Option<Vec<Stop>> {
        let found = self.lookup(train_number);
        self.record(train_number, found.is_some());
        found
    }

    /// Lookup tolerant of decorated keys. Counts as one hit or one miss.
    pub fn get_any(&self, train_number: &str) -> Option<Vec<Stop>> {
        let found = key_variants(train_number)
            .iter()
            .find_map(|key| self.lookup(key));
        self.record(train_number, found.is_some());
        found
    }

    pub fn contains(&self, train_number: &str) -> bool {
        let guard = self.stops.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.contains_key(train_number)
    }

    /// Stores `stops` under `train_number` and persists the cache.
    ///
    /// # Errors
    ///
    /// I/O or serialization errors while writing the file. The in-memory
    /// entry is kept either way.
    pub fn put(&self, train_number: &str, stops: Vec<Stop>) -> Result<(), Error> {
        let _writer = self.writer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let count = stops.len();
        {
            let mut guard = self.stops.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.insert(train_number.to_string(), stops);
        }
        debug!("Cached {count} stops for train {train_number}");
        self.persist()
    }

    /// # Errors
    ///
    /// I/O or serialization errors while writing the file.
    pub fn remove(&self, train_number: &str) -> Result<Option<Vec<Stop>>, Error> {
        let _writer = self.writer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let removed = self
            .stops
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(train_number);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// # Errors
    ///
    /// I/O or serialization errors while writing the file.
    pub fn clear(&self) -> Result<(), Error> {
        let _writer = self.writer.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.stops
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.stops
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            total_trains: self.len(),
        }
    }

    // Caller holds the writer lock.
    fn persist(&self) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = self
            .stops
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        let tmp = path.with_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        debug!("Saved {} train stop lists to {}", snapshot.len(), path.display());
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<HashMap<String, Vec<Stop>>, Error> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

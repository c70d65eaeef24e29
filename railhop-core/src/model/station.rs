//! Station identifiers and alias groups

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A station as `(code, display name)`.
///
/// Only the code takes part in comparisons; it is stored upper-cased so that
/// lookups are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationId {
    code: String,
    name: String,
}

impl StationId {
    pub fn new(code: impl AsRef<str>, name: impl Into<String>) -> Self {
        Self {
            code: code.as_ref().trim().to_ascii_uppercase(),
            name: name.into().trim().to_string(),
        }
    }

    /// Reads any of the spellings found in scraped data and user input:
    /// `NDLS_NewDelhi`, `New Delhi (NDLS)` or a bare `NDLS`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let (Some(open), Some(close)) = (raw.rfind('('), raw.rfind(')')) {
            if open < close {
                return Self::new(&raw[open + 1..close], &raw[..open]);
            }
        }
        if let Some((code, name)) = raw.split_once('_') {
            return Self::new(code, name);
        }
        Self::new(raw, String::new())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn matches_code(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }

    /// `CODE_Name` with the name's words joined, the form travel sites accept
    /// as a search parameter
    pub fn search_key(&self) -> String {
        if self.name.is_empty() {
            return self.code.clone();
        }
        let joined: String = self
            .name
            .split_whitespace()
            .map(|word| {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                })
            })
            .collect();
        format!("{}_{}", self.code, joined)
    }
}

impl PartialEq for StationId {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for StationId {}

impl Hash for StationId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.search_key())
    }
}

impl FromStr for StationId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Sets of station codes that serve one logical place (several Delhi
/// terminals, for example). Lookups are exact on the upper-cased code.
#[derive(Debug, Clone, Default)]
pub struct StationGroups {
    groups: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl StationGroups {
    pub fn from_groups(groups: Vec<Vec<String>>) -> Self {
        let groups: Vec<Vec<String>> = groups
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .map(|code| code.trim().to_ascii_uppercase())
                    .filter(|code| !code.is_empty())
                    .collect()
            })
            .collect();

        let mut index = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            for code in group {
                // First group wins when a code is listed twice.
                index.entry(code.clone()).or_insert(idx);
            }
        }
        Self { groups, index }
    }

    /// All codes in the group of `code`, or just `code` itself
    pub fn aliases(&self, code: &str) -> Vec<String> {
        let key = code.trim().to_ascii_uppercase();
        match self.index.get(&key) {
            Some(&idx) => self.groups[idx].clone(),
            None => vec![key],
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

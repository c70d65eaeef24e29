use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hashbrown::HashSet;

use crate::model::TransferKey;

/// Cooperative stop signal shared by the workers of one search
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of offering a transfer itinerary to the shared result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Claim {
    Accepted,
    Duplicate,
    QuotaReached,
}

/// Transfer itineraries accepted so far in one search.
///
/// Lives behind a single mutex; `quota` is what the direct phase left over.
#[derive(Debug)]
pub(crate) struct FoundRoutes {
    keys: HashSet<TransferKey>,
    count: usize,
    quota: usize,
}

impl FoundRoutes {
    pub(crate) fn new(quota: usize) -> Self {
        Self {
            keys: HashSet::new(),
            count: 0,
            quota,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.count >= self.quota
    }

    pub(crate) fn contains(&self, key: &TransferKey) -> bool {
        self.keys.contains(key)
    }

    pub(crate) fn claim(&mut self, key: TransferKey) -> Claim {
        if self.is_full() {
            return Claim::QuotaReached;
        }
        if !self.keys.insert(key) {
            return Claim::Duplicate;
        }
        self.count += 1;
        Claim::Accepted
    }
}

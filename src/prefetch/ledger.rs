//! Session-scoped record of warmed URLs

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

/// URLs already prefetched in this session.
///
/// Append-only with no expiry. Clones share the same set; create one per
/// session and hand it to every scheduler in that session. The lock is never
/// held across an await, so lookups are synchronous.
#[derive(Clone, Default)]
pub struct PrefetchLedger {
    warmed: Arc<RwLock<HashSet<String>>>,
}

impl PrefetchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.warmed.read().contains(url)
    }

    /// Record `url`; returns false if it was already there
    pub fn record(&self, url: impl Into<String>) -> bool {
        self.warmed.write().insert(url.into())
    }

    pub fn len(&self) -> usize {
        self.warmed.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Debounced prefetch scheduling

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::document::DocumentRef;

use super::fetcher::PrefetchFetcher;
use super::ledger::PrefetchLedger;

#[derive(Debug, Clone)]
pub struct PrefetchConfig {
    /// Hover time before a warm-up fires
    pub debounce: Duration,
    /// Viewer assets warmed alongside the first document
    pub assets: Vec<String>,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            assets: Vec::new(),
        }
    }
}

/// Last-hover-wins debouncer in front of a [`PrefetchFetcher`].
///
/// One best-effort attempt per debounce window: no retries, failures are
/// dropped, and only successful URLs enter the ledger.
pub struct PrefetchScheduler {
    fetcher: Arc<dyn PrefetchFetcher>,
    ledger: PrefetchLedger,
    config: PrefetchConfig,
    pending: Option<JoinHandle<()>>,
}

impl PrefetchScheduler {
    pub fn new(
        fetcher: Arc<dyn PrefetchFetcher>,
        ledger: PrefetchLedger,
        config: PrefetchConfig,
    ) -> Self {
        Self {
            fetcher,
            ledger,
            config,
            pending: None,
        }
    }

    pub fn ledger(&self) -> &PrefetchLedger {
        &self.ledger
    }

    /// Whether a debounce timer is currently running
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Restart the debounce timer for `document` (pointer-enter).
    ///
    /// A document already in the ledger leaves any pending timer untouched.
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, document: &DocumentRef) {
        let url = document.proxy_path();
        if self.ledger.contains(&url) {
            tracing::trace!(%url, "Already prefetched");
            return;
        }

        self.cancel();

        let mut targets = vec![url];
        targets.extend(self.config.assets.iter().cloned());

        let fetcher = self.fetcher.clone();
        let ledger = self.ledger.clone();
        let delay = self.config.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later hover cannot abort a request already on the wire
            tokio::spawn(warm_all(fetcher, ledger, targets));
        }));
    }

    /// Drop the pending timer, if any (pointer-leave)
    pub fn cancel(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}

impl Drop for PrefetchScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn warm_all(fetcher: Arc<dyn PrefetchFetcher>, ledger: PrefetchLedger, targets: Vec<String>) {
    let fresh: Vec<String> = targets
        .into_iter()
        .filter(|url| !ledger.contains(url))
        .collect();

    let attempts = fresh.iter().map(|url| {
        let fetcher = fetcher.clone();
        let ledger = ledger.clone();
        async move {
            match fetcher.warm(url).await {
                Ok(()) => {
                    ledger.record(url.as_str());
                    tracing::debug!(%url, "Prefetched");
                }
                Err(e) => tracing::debug!(%url, error = %e, "Prefetch failed"),
            }
        }
    });

    futures::future::join_all(attempts).await;
}

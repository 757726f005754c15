//! Hover prefetching
//!
//! Warms a manual in the HTTP cache while the pointer rests on its catalog
//! card, so opening it afterwards is served locally.

mod fetcher;
mod ledger;
mod scheduler;

pub use fetcher::{HttpPrefetcher, PrefetchError, PrefetchFetcher};
pub use ledger::PrefetchLedger;
pub use scheduler::{PrefetchConfig, PrefetchScheduler};

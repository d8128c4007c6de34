//! Debounced, recency-guarded search execution.
//!
//! Catalog search runs on every keystroke; a trailing debounce collapses the
//! burst into one request, and a generation counter makes sure a slow, older
//! response can never overwrite the result of a newer request. Superseded
//! calls resolve to `None`; the transport of an in-flight request is not
//! aborted, its result is simply discarded.

use crate::config::AdmissionConfig;
use crate::ports::{CatalogKind, CatalogSearch};
use hospadm_types::CatalogRef;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct DebouncedSearch {
    delay: Duration,
    generation: AtomicU64,
}

impl DebouncedSearch {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Run `request` after the debounce window, unless a newer call arrives
    /// first. Returns `None` when this call was superseded, either while
    /// waiting out the window or while the request was in flight.
    pub async fn run<F, Fut, T>(&self, request: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            return None;
        }

        let result = request().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            return None;
        }
        Some(result)
    }
}

/// One combo-box's search session against a flat catalog.
///
/// Debounces keystrokes with the configured window and treats a lookup
/// failure as "no results": a failed catalog search surfaces as an empty
/// list with an inline message at the UI, never as a blocking error.
pub struct CatalogSearchSession {
    catalog: Arc<dyn CatalogSearch>,
    kind: CatalogKind,
    debounce: DebouncedSearch,
}

impl CatalogSearchSession {
    pub fn new(cfg: &AdmissionConfig, catalog: Arc<dyn CatalogSearch>, kind: CatalogKind) -> Self {
        Self {
            catalog,
            kind,
            debounce: DebouncedSearch::new(cfg.search_debounce()),
        }
    }

    /// Feed the current input text. Returns `None` when superseded by newer
    /// input, `Some(entries)` otherwise.
    pub async fn input(&self, query: &str) -> Option<Vec<CatalogRef>> {
        self.debounce
            .run(|| async {
                match self.catalog.search(self.kind, query).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        tracing::warn!("catalog lookup failed, treating as no results: {e}");
                        Vec::new()
                    }
                }
            })
            .await
    }
}

//! The four caching strategies.
//!
//! Each strategy maps `(request, partition) -> response` with an explicit
//! fallback policy. Transport failures never escape this module as errors:
//! they turn into a cached copy when one exists, or a synthetic 503 when
//! none does. Only success-status responses are ever written to a
//! partition; redirects and errors pass through uncached.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::HashSet;
use outpost_store::{CachedResponse, PartitionStore};

use crate::fetch::{
    status_text_for, FetchOutcome, FetchSource, NetworkBackend, Request, Response,
};
use crate::routes::Strategy;

// ── Types ───────────────────────────────────────────────────

/// One deferred background revalidation.
#[derive(Debug, Clone)]
pub struct RevalidationTask {
    /// The original request, re-issued as-is.
    pub request: Request,
    /// Partition the refreshed entry is written to.
    pub partition: String,
}

/// Executes strategies and carries the revalidation backlog.
#[derive(Debug, Default)]
pub struct StrategyEngine {
    /// Tasks awaiting the next background pump.
    pending: Vec<RevalidationTask>,
    /// URLs already in the backlog, to avoid queueing duplicates.
    scheduled: HashSet<String>,
}

// ── Implementation ──────────────────────────────────────────

impl StrategyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the resolved strategy for a GET request.
    pub fn handle(
        &mut self,
        store: &mut PartitionStore,
        backend: &mut dyn NetworkBackend,
        request: &Request,
        strategy: Strategy,
    ) -> FetchOutcome {
        match strategy {
            Strategy::CacheFirst => self.cache_first(store, backend, request),
            Strategy::NetworkFirst => Self::network_first(store, backend, request),
            Strategy::CacheOnly => Self::cache_only(store, request),
            Strategy::NetworkOnly => Self::network_only(backend, request),
        }
    }

    /// Number of revalidations waiting for the next pump.
    pub fn pending_revalidations(&self) -> usize {
        self.pending.len()
    }

    /// Drain the revalidation backlog, fetching each task and overwriting
    /// its cache entry on success. Failures are logged and dropped; the
    /// stale entry stays authoritative until a later pump succeeds.
    ///
    /// A refresh landing here can overwrite an entry after the page already
    /// received the previous copy: the partition converges on the network's
    /// latest successful answer, not on what any one caller saw.
    pub fn run_pending(
        &mut self,
        store: &mut PartitionStore,
        backend: &mut dyn NetworkBackend,
    ) -> usize {
        let tasks = core::mem::take(&mut self.pending);
        let count = tasks.len();
        for task in tasks {
            self.scheduled.remove(&task.request.url);
            match backend.fetch(&task.request) {
                Ok(response) if response.ok() => {
                    store_response(store, &task.partition, &task.request.url, &response);
                }
                Ok(response) => {
                    log::debug!(
                        "revalidation of {} got status {}, keeping stale entry",
                        task.request.url,
                        response.status
                    );
                }
                Err(err) => {
                    log::debug!("revalidation of {} failed: {}", task.request.url, err);
                }
            }
        }
        count
    }

    fn cache_first(
        &mut self,
        store: &mut PartitionStore,
        backend: &mut dyn NetworkBackend,
        request: &Request,
    ) -> FetchOutcome {
        let partition = store.partition_name_for(request.path());
        let cached = store.lookup(&partition, &request.url).map(entry_to_response);
        if let Some(response) = cached {
            self.schedule_revalidation(request, &partition);
            return FetchOutcome::Respond {
                response,
                source: FetchSource::Cache,
            };
        }

        match backend.fetch(request) {
            Ok(response) => {
                if response.ok() {
                    store_response(store, &partition, &request.url, &response);
                }
                FetchOutcome::Respond {
                    response,
                    source: FetchSource::Network,
                }
            }
            Err(err) => {
                log::debug!("cache-first fetch of {} failed: {}", request.url, err);
                FetchOutcome::Respond {
                    response: Response::service_unavailable(),
                    source: FetchSource::Synthetic,
                }
            }
        }
    }

    fn network_first(
        store: &mut PartitionStore,
        backend: &mut dyn NetworkBackend,
        request: &Request,
    ) -> FetchOutcome {
        let partition = store.partition_name_for(request.path());
        match backend.fetch(request) {
            Ok(response) => {
                if response.ok() {
                    store_response(store, &partition, &request.url, &response);
                }
                FetchOutcome::Respond {
                    response,
                    source: FetchSource::Network,
                }
            }
            Err(err) => {
                log::debug!(
                    "network-first fetch of {} failed ({}), trying cache",
                    request.url,
                    err
                );
                match store.lookup(&partition, &request.url) {
                    Some(entry) => FetchOutcome::Respond {
                        response: entry_to_response(entry),
                        source: FetchSource::Cache,
                    },
                    None => FetchOutcome::Respond {
                        response: Response::service_unavailable(),
                        source: FetchSource::Synthetic,
                    },
                }
            }
        }
    }

    fn cache_only(store: &mut PartitionStore, request: &Request) -> FetchOutcome {
        let partition = store.partition_name_for(request.path());
        match store.lookup(&partition, &request.url) {
            Some(entry) => FetchOutcome::Respond {
                response: entry_to_response(entry),
                source: FetchSource::Cache,
            },
            None => FetchOutcome::Miss,
        }
    }

    fn network_only(backend: &mut dyn NetworkBackend, request: &Request) -> FetchOutcome {
        match backend.fetch(request) {
            Ok(response) => FetchOutcome::Respond {
                response,
                source: FetchSource::Network,
            },
            Err(err) => {
                log::debug!("network-only fetch of {} failed: {}", request.url, err);
                FetchOutcome::Respond {
                    response: Response::service_unavailable(),
                    source: FetchSource::Synthetic,
                }
            }
        }
    }

    fn schedule_revalidation(&mut self, request: &Request, partition: &str) {
        if self.scheduled.insert(request.url.clone()) {
            self.pending.push(RevalidationTask {
                request: request.clone(),
                partition: partition.to_string(),
            });
            log::debug!("scheduled revalidation of {}", request.url);
        }
    }
}

/// Project a stored entry back into a response.
fn entry_to_response(entry: &CachedResponse) -> Response {
    Response {
        url: entry.url.clone(),
        status: entry.status,
        status_text: status_text_for(entry.status).to_string(),
        headers: entry.headers.clone(),
        body: entry.body.clone(),
    }
}

/// Write a response into a partition; a refused write is a cache miss next
/// time, nothing more.
fn store_response(store: &mut PartitionStore, partition: &str, url: &str, response: &Response) {
    if let Err(err) = store.put(
        partition,
        url,
        response.status,
        response.headers.clone(),
        response.body.clone(),
    ) {
        log::debug!("cache write for {} refused: {}", url, err);
    }
}

// ── Tests ───────────────────────────────────────────────────

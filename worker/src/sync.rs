//! Background sync and outbox replay.
//!
//! While offline, user actions pile up in the outbox. When connectivity
//! returns, the host fires a sync event; the one tag this worker registers
//! replays the queue against the message endpoint, oldest entry first.

use alloc::vec::Vec;

use outpost_store::Outbox;

use crate::fetch::{NetworkBackend, Request};

// ── Constants ───────────────────────────────────────────────

/// The registration tag that triggers outbox replay.
pub const SYNC_TAG: &str = "sync-messages";

/// Endpoint every queued action is replayed against.
pub const REPLAY_ENDPOINT: &str = "/api/messages";

// ── Replay ──────────────────────────────────────────────────

/// What one replay pass accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Queue IDs delivered and removed.
    pub replayed: Vec<u64>,
    /// Queue IDs that failed and stay queued for the next pass.
    pub failed: Vec<u64>,
}

impl ReplayReport {
    /// True when nothing was left behind.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Handle a sync event. Tags other than [`SYNC_TAG`] are not ours and are
/// ignored.
pub fn handle_sync_event(
    tag: &str,
    outbox: &mut Outbox,
    backend: &mut dyn NetworkBackend,
) -> Option<ReplayReport> {
    if tag != SYNC_TAG {
        log::debug!("ignoring sync event with tag {}", tag);
        return None;
    }
    Some(replay(outbox, backend))
}

/// Replay every queued action in insertion order. Delivered entries leave
/// the queue; failed ones stay put with their attempt count bumped. A
/// failure never blocks the entries behind it.
pub fn replay(outbox: &mut Outbox, backend: &mut dyn NetworkBackend) -> ReplayReport {
    let mut report = ReplayReport::default();
    for id in outbox.ids() {
        let Some(record) = outbox.get(id) else {
            continue;
        };
        let request = Request::post(REPLAY_ENDPOINT, record.payload.clone())
            .with_header("content-type", "application/json");
        match backend.fetch(&request) {
            Ok(response) if response.ok() => {
                outbox.delete(id);
                report.replayed.push(id);
            }
            Ok(response) => {
                let attempts = outbox.record_attempt(id).unwrap_or(0);
                log::warn!(
                    "replay of action {} got status {} (attempt {})",
                    id,
                    response.status,
                    attempts
                );
                report.failed.push(id);
            }
            Err(err) => {
                let attempts = outbox.record_attempt(id).unwrap_or(0);
                log::warn!("replay of action {} failed: {} (attempt {})", id, err, attempts);
                report.failed.push(id);
            }
        }
    }
    if !report.replayed.is_empty() || !report.failed.is_empty() {
        log::info!(
            "replay pass: {} delivered, {} kept",
            report.replayed.len(),
            report.failed.len()
        );
    }
    report
}

// ── Tests ───────────────────────────────────────────────────

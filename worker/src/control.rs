//! The page-to-worker control channel.
//!
//! Pages post small JSON documents tagged with a `type` field. Anything
//! outside the known set is rejected with an error naming the offender,
//! never silently dropped.

use alloc::string::ToString;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::WorkerError;

// ── Messages ────────────────────────────────────────────────

/// A control message posted by a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Activate the waiting version immediately.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    /// Drop every cache partition, the current version's included.
    #[serde(rename = "CLEAR_CACHE")]
    ClearCache,
    /// Reply with the total cached body bytes.
    #[serde(rename = "GET_CACHE_SIZE")]
    GetCacheSize,
}

impl ControlMessage {
    /// Decode a posted message.
    pub fn parse(data: &[u8]) -> Result<Self, WorkerError> {
        serde_json::from_slice(data)
            .map_err(|err| WorkerError::UnrecognizedMessage(err.to_string()))
    }
}

/// Reply to a `GET_CACHE_SIZE` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSizeReply {
    /// Total cached body bytes across every partition.
    pub size: u64,
}

impl CacheSizeReply {
    /// Encode for posting back through a reply port.
    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

// ── Reply port ──────────────────────────────────────────────

/// Collects messages posted back to the querying page.
#[derive(Debug, Default)]
pub struct ReplyPort {
    sent: Vec<Vec<u8>>,
}

impl ReplyPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a reply to the page on the other end.
    pub fn post(&mut self, message: Vec<u8>) {
        self.sent.push(message);
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Drain everything posted so far.
    pub fn take(&mut self) -> Vec<Vec<u8>> {
        core::mem::take(&mut self.sent)
    }
}

// ── Tests ───────────────────────────────────────────────────

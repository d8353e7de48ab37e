//! Durable outbox of actions awaiting replay.
//!
//! One object store, keyed by auto-incrementing id. The page enqueues the
//! raw body of a write that failed while offline; the sync coordinator later
//! drains entries in id order and deletes the ones that replayed. Ids are
//! never reused, so insertion order and id order coincide.
//!
//! `snapshot`/`restore` give the host a persistence seam: the whole store
//! round-trips through a compact binary image.

use alloc::collections::BTreeMap;
use alloc::string::ToString;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

// ── Types ───────────────────────────────────────────────────

/// A queued action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxRecord {
    /// Opaque action body (JSON bytes as the page produced them).
    pub payload: Vec<u8>,
    /// Failed replay attempts so far. Informational only.
    pub attempts: u32,
}

impl OutboxRecord {
    /// Wrap a payload into a fresh record.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            attempts: 0,
        }
    }
}

/// The outbox store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outbox {
    /// id → record, iterated in ascending id order.
    entries: BTreeMap<u64, OutboxRecord>,
    /// Next id to assign. Starts at 1 and never goes backwards.
    next_id: u64,
}

/// Outbox error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Snapshot image would not encode or decode.
    Codec(alloc::string::String),
}

impl core::fmt::Display for QueueError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            QueueError::Codec(msg) => write!(f, "outbox codec failure: {}", msg),
        }
    }
}

// ── Implementation ──────────────────────────────────────────

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Append an action and return its assigned id.
    pub fn enqueue(&mut self, payload: Vec<u8>) -> u64 {
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, OutboxRecord::new(payload));
        id
    }

    /// Fetch a record by id.
    pub fn get(&self, id: u64) -> Option<&OutboxRecord> {
        self.entries.get(&id)
    }

    /// Remove a record by id. Returns whether it existed.
    pub fn delete(&mut self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Bump the attempt counter of a record. Returns the new count.
    pub fn record_attempt(&mut self, id: u64) -> Option<u32> {
        let record = self.entries.get_mut(&id)?;
        record.attempts += 1;
        Some(record.attempts)
    }

    /// All ids in insertion order.
    pub fn ids(&self) -> Vec<u64> {
        self.entries.keys().copied().collect()
    }

    /// All records in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (u64, &OutboxRecord)> {
        self.entries.iter().map(|(id, record)| (*id, record))
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every queued action. Ids keep counting from where they were.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Encode the whole store into a binary image.
    pub fn snapshot(&self) -> Result<Vec<u8>, QueueError> {
        postcard::to_allocvec(self).map_err(|e| QueueError::Codec(e.to_string()))
    }

    /// Rebuild a store from a binary image.
    pub fn restore(image: &[u8]) -> Result<Self, QueueError> {
        postcard::from_bytes(image).map_err(|e| QueueError::Codec(e.to_string()))
    }
}

// ── Tests ───────────────────────────────────────────────────

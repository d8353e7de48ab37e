//! Storage layer for Outpost.
//!
//! Two stores live here:
//! - versioned cache partitions holding GET responses (`cache`)
//! - the durable outbox of actions awaiting replay (`queue`)
//!
//! Both are owned by the worker context and mutated only through it; every
//! mutation is a single call, so no locking is layered on top.

#![no_std]

extern crate alloc;

pub mod cache;
pub mod queue;

pub use cache::{
    partition_name, CacheError, CachePartition, CachedResponse, PartitionKind, PartitionStore,
    DEFAULT_QUOTA,
};
pub use queue::{Outbox, OutboxRecord, QueueError};

//! Outpost worker engine.
//!
//! A browser-resident caching and offline-resilience layer sitting between a
//! single-page application and its network origin. Per request it decides
//! whether to serve from cache, fetch from network, or both; it queues
//! actions that failed while offline and replays them on reconnect; it turns
//! push payloads into notifications and routes clicks back to a page.
//!
//! The host environment owns the event loop. It constructs one
//! [`ServiceWorker`] at startup and feeds it lifecycle, fetch, sync, push,
//! and control events, passing its network transport as a
//! [`fetch::NetworkBackend`] to every event that may touch the network.

#![no_std]

extern crate alloc;

pub mod clients;
pub mod config;
pub mod control;
pub mod fetch;
pub mod lifecycle;
pub mod push;
pub mod routes;
pub mod strategy;
pub mod sync;
pub mod worker;

pub use clients::{Client, ClientRegistry};
pub use config::{NotificationDefaults, WorkerConfig};
pub use control::{CacheSizeReply, ControlMessage, ReplyPort};
pub use fetch::{FetchError, FetchOutcome, FetchSource, NetworkBackend, Request, Response};
pub use lifecycle::{Lifecycle, WorkerPhase};
pub use push::{ClickOutcome, NotificationCenter, NotificationIntent, PushPayload};
pub use routes::{RouteRule, RouteTable, Strategy};
pub use strategy::StrategyEngine;
pub use sync::{ReplayReport, SYNC_TAG};
pub use worker::ServiceWorker;

use alloc::string::String;

use lifecycle::WorkerPhase as Phase;

/// Worker engine error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// Lifecycle phase change not allowed.
    InvalidTransition { from: Phase, to: Phase },
    /// Pre-warming the app shell failed; the new version is discarded.
    InstallFailed(String),
    /// Worker configuration would not parse.
    InvalidConfig(String),
    /// Control message with an unknown or malformed kind.
    UnrecognizedMessage(String),
    /// Control message needs a reply port but none was provided.
    MissingReplyPort,
}

impl core::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WorkerError::InvalidTransition { from, to } => {
                write!(f, "invalid transition {} -> {}", from.as_str(), to.as_str())
            }
            WorkerError::InstallFailed(reason) => write!(f, "install failed: {}", reason),
            WorkerError::InvalidConfig(reason) => write!(f, "invalid config: {}", reason),
            WorkerError::UnrecognizedMessage(reason) => {
                write!(f, "unrecognized message: {}", reason)
            }
            WorkerError::MissingReplyPort => write!(f, "message requires a reply port"),
        }
    }
}

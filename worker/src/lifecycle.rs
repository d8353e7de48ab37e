//! Worker lifecycle phases and transitions.
//!
//! A worker version moves installing -> waiting -> active, and any phase can
//! collapse to redundant when the version is discarded or replaced. The
//! host drives the phase changes; this module only validates and records
//! them.

use crate::WorkerError;

// ── Phases ──────────────────────────────────────────────────

/// Where a worker version is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPhase {
    /// Pre-warming the app shell.
    Installing,
    /// Installed, parked until activation.
    Waiting,
    /// Serving fetches and background events.
    Active,
    /// Discarded; accepts no further events.
    Redundant,
}

impl WorkerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerPhase::Installing => "installing",
            WorkerPhase::Waiting => "waiting",
            WorkerPhase::Active => "active",
            WorkerPhase::Redundant => "redundant",
        }
    }
}

/// Check if a phase transition is allowed.
fn is_valid_transition(from: WorkerPhase, to: WorkerPhase) -> bool {
    use WorkerPhase::*;

    matches!(
        (from, to),
        // Normal lifecycle
        (Installing, Waiting) |
        (Installing, Redundant) |  // Install failed
        (Waiting, Active) |
        (Waiting, Redundant) |     // Superseded before activation
        (Active, Redundant) // Replaced by a newer version
    )
}

// ── Lifecycle ───────────────────────────────────────────────

/// Tracks the current phase and the pending takeover request.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: WorkerPhase,
    skip_requested: bool,
}

impl Lifecycle {
    /// A fresh worker version, about to install.
    pub fn new() -> Self {
        Self {
            phase: WorkerPhase::Installing,
            skip_requested: false,
        }
    }

    pub fn phase(&self) -> WorkerPhase {
        self.phase
    }

    /// Move to a new phase, rejecting anything the lifecycle graph forbids.
    pub fn transition(&mut self, to: WorkerPhase) -> Result<(), WorkerError> {
        let from = self.phase;
        if !is_valid_transition(from, to) {
            return Err(WorkerError::InvalidTransition { from, to });
        }
        self.phase = to;
        log::info!("worker phase {} -> {}", from.as_str(), to.as_str());
        Ok(())
    }

    /// Ask for immediate takeover once installation completes.
    pub fn request_skip(&mut self) {
        self.skip_requested = true;
    }

    pub fn skip_requested(&self) -> bool {
        self.skip_requested
    }

    /// True once the version is parked and takeover has been requested;
    /// the host should drive activation now instead of waiting for the
    /// previous version to wind down.
    pub fn ready_to_activate(&self) -> bool {
        self.phase == WorkerPhase::Waiting && self.skip_requested
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ───────────────────────────────────────────────────

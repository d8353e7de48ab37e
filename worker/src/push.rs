//! Push payloads, notifications, and click routing.
//!
//! A push event's bytes decode into a [`PushPayload`]; whatever is missing
//! or malformed is papered over with the configured defaults, so a push
//! always produces a presentable notification. Clicks prefer focusing an
//! already-open page over spawning another window.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use serde::Deserialize;

use crate::clients::{ClientId, ClientRegistry};
use crate::config::NotificationDefaults;

// ── Payload ─────────────────────────────────────────────────

/// The action identifier on the default open button.
pub const ACTION_OPEN: &str = "open";

/// Decoded push payload. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
    /// Opaque correlation value, forwarded untouched.
    pub girl_id: Option<serde_json::Value>,
}

impl PushPayload {
    /// Decode a push event's bytes. Absent or unparseable data is treated
    /// as an empty payload rather than an error.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            return Self::default();
        };
        match serde_json::from_slice(bytes) {
            Ok(payload) => payload,
            Err(err) => {
                log::debug!("push payload did not parse ({}), using defaults", err);
                Self::default()
            }
        }
    }
}

// ── Notification ────────────────────────────────────────────

/// One button on a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// A notification ready to display.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationIntent {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibration: Vec<u32>,
    pub actions: Vec<NotificationAction>,
    /// Page opened or focused when the notification is clicked.
    pub url: String,
    /// Correlation value carried over from the payload.
    pub correlation: Option<serde_json::Value>,
}

impl NotificationIntent {
    /// Merge a payload with the configured defaults.
    pub fn from_payload(payload: &PushPayload, defaults: &NotificationDefaults) -> Self {
        Self {
            title: payload
                .title
                .clone()
                .unwrap_or_else(|| defaults.title.clone()),
            body: payload.body.clone().unwrap_or_else(|| defaults.body.clone()),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            vibration: defaults.vibration.clone(),
            actions: vec![NotificationAction {
                action: String::from(ACTION_OPEN),
                title: String::from("Open"),
            }],
            url: payload.url.clone().unwrap_or_else(|| defaults.url.clone()),
            correlation: payload.girl_id.clone(),
        }
    }
}

/// Whether the user allows notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Granted,
    Denied,
}

/// Displays notifications and tracks the ones still on screen.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    permission: Permission,
    notifications: BTreeMap<u64, NotificationIntent>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            permission: Permission::Granted,
            notifications: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn set_permission(&mut self, permission: Permission) {
        self.permission = permission;
    }

    /// Display a notification. Returns None when permission is denied.
    pub fn show(&mut self, intent: NotificationIntent) -> Option<u64> {
        if self.permission == Permission::Denied {
            log::warn!("notification suppressed, permission denied");
            return None;
        }
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        log::info!("showing notification {} ({})", id, intent.title);
        self.notifications.insert(id, intent);
        Some(id)
    }

    /// Take a notification off screen, returning it if it was there.
    pub fn close(&mut self, id: u64) -> Option<NotificationIntent> {
        self.notifications.remove(&id)
    }

    pub fn get(&self, id: u64) -> Option<&NotificationIntent> {
        self.notifications.get(&id)
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

// ── Click routing ───────────────────────────────────────────

/// What a notification click ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Focus moved to an already-open page.
    FocusedExisting(ClientId),
    /// No open page matched; a new window was opened.
    OpenedWindow(ClientId),
    /// Dismissed without navigation.
    Dismissed,
}

/// Focus the first open page matching `url`, or open a new window on it.
pub fn route_click(clients: &mut ClientRegistry, url: &str) -> ClickOutcome {
    if let Some(id) = clients.find_matching(url) {
        clients.focus(id);
        log::debug!("notification click focused client {}", id);
        return ClickOutcome::FocusedExisting(id);
    }
    ClickOutcome::OpenedWindow(clients.open_window(url))
}

// ── Tests ───────────────────────────────────────────────────

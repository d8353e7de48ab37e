//! Worker configuration.
//!
//! The host ships a JSON document next to the worker script; everything the
//! engine needs to construct itself comes from it. Example:
//!
//! ```json
//! {
//!   "cache_version": "v3",
//!   "app_shell": ["/", "/app.js", "/styles.css", "/manifest.json"],
//!   "routes": [
//!     { "pattern": "/api/girls", "strategy": "cache-first" },
//!     { "pattern": "/api/", "strategy": "network-first" }
//!   ],
//!   "quota": 26214400,
//!   "notification": { "title": "Masha", "url": "/chat" }
//! }
//! ```
//!
//! Every field except `cache_version` has a default.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use serde::Deserialize;

use crate::routes::RouteRule;
use crate::WorkerError;

/// Fallback values for notification fields a push payload leaves out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationDefaults {
    /// Title when the payload has none.
    pub title: String,
    /// Body when the payload has none.
    pub body: String,
    /// Icon asset path.
    pub icon: String,
    /// Badge asset path.
    pub badge: String,
    /// Click target when the payload has none.
    pub url: String,
    /// Vibration pattern in milliseconds.
    pub vibration: Vec<u32>,
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            title: "New message".to_string(),
            body: "You have a new message".to_string(),
            icon: "/icons/icon-192.png".to_string(),
            badge: "/icons/badge-72.png".to_string(),
            url: "/".to_string(),
            vibration: vec![100, 50, 100],
        }
    }
}

/// Everything the worker is constructed from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkerConfig {
    /// Cache generation tag; partition names derive from it.
    pub cache_version: String,
    /// App shell assets pre-warmed at install.
    #[serde(default = "default_app_shell")]
    pub app_shell: Vec<String>,
    /// Ordered routing rules.
    #[serde(default)]
    pub routes: Vec<RouteRule>,
    /// Total cache quota in bytes.
    #[serde(default = "default_quota")]
    pub quota: usize,
    /// Notification fallbacks.
    #[serde(default)]
    pub notification: NotificationDefaults,
}

fn default_app_shell() -> Vec<String> {
    vec![
        "/".to_string(),
        "/index.html".to_string(),
        "/app.js".to_string(),
        "/styles.css".to_string(),
        "/manifest.json".to_string(),
    ]
}

fn default_quota() -> usize {
    outpost_store::DEFAULT_QUOTA
}

impl WorkerConfig {
    /// A config with the given version tag and defaults everywhere else.
    pub fn new(cache_version: impl Into<String>) -> Self {
        Self {
            cache_version: cache_version.into(),
            app_shell: default_app_shell(),
            routes: Vec::new(),
            quota: default_quota(),
            notification: NotificationDefaults::default(),
        }
    }

    /// Parse a config from its JSON document.
    pub fn from_json(json: &str) -> Result<Self, WorkerError> {
        serde_json::from_str(json).map_err(|e| WorkerError::InvalidConfig(e.to_string()))
    }
}

// ── Tests ───────────────────────────────────────────────────

//! Route resolution: request path → caching strategy.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

/// Caching strategy for a matched route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve from cache when present (revalidating in the background);
    /// otherwise fetch and cache.
    CacheFirst,
    /// Try network first; fall back to cache on transport failure.
    NetworkFirst,
    /// Only serve from cache; never go to network.
    CacheOnly,
    /// Only fetch from network; never touch the cache.
    NetworkOnly,
}

impl Strategy {
    /// Configuration name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::CacheOnly => "cache-only",
            Strategy::NetworkOnly => "network-only",
        }
    }
}

/// Strategy used when no rule matches.
pub const DEFAULT_STRATEGY: Strategy = Strategy::NetworkFirst;

/// One ordered routing rule: substring pattern → strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteRule {
    /// Substring the request path must contain.
    pub pattern: String,
    /// Strategy applied on match.
    pub strategy: Strategy,
}

impl RouteRule {
    pub fn new(pattern: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            pattern: pattern.into(),
            strategy,
        }
    }
}

/// The ordered routing table. Immutable once the worker is constructed.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Build a table from ordered rules.
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Resolve a request path to a strategy. First matching rule wins;
    /// paths matching no rule get [`DEFAULT_STRATEGY`]. Total over all
    /// strings.
    pub fn resolve(&self, path: &str) -> Strategy {
        self.rules
            .iter()
            .find(|rule| path.contains(rule.pattern.as_str()))
            .map(|rule| rule.strategy)
            .unwrap_or(DEFAULT_STRATEGY)
    }

    /// The rules, in match order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}

// ── Tests ───────────────────────────────────────────────────

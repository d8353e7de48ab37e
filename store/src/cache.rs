//! Versioned cache partitions.
//!
//! Responses are grouped into three partitions per cache generation: static
//! (app shell), dynamic (API responses), image (media). Partition names are
//! derived from the current version tag, so bumping the version starts a new
//! empty generation and leaves the old one behind for `evict_stale` to
//! delete at activation.
//!
//! Entries are keyed by request URL; only successful GET responses are ever
//! stored, so the URL is the whole identity.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

// ── Constants ───────────────────────────────────────────────

/// Default total-byte quota across all partitions (25 MiB).
pub const DEFAULT_QUOTA: usize = 25 * 1024 * 1024;

/// Path marker routing a request to the dynamic partition.
const API_PATH_MARKER: &str = "/api/";

/// Path markers routing a request to the image partition.
const IMAGE_PATH_MARKERS: [&str; 2] = ["/photos/", "/images/"];

// ── Types ───────────────────────────────────────────────────

/// Content class a partition holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    /// App shell assets (HTML, scripts, styles, manifest).
    Static,
    /// API responses.
    Dynamic,
    /// Media content.
    Image,
}

impl PartitionKind {
    /// Name suffix for this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            PartitionKind::Static => "static",
            PartitionKind::Dynamic => "dynamic",
            PartitionKind::Image => "image",
        }
    }

    /// Classify a request path into a partition kind.
    pub fn for_path(path: &str) -> Self {
        if IMAGE_PATH_MARKERS.iter().any(|m| path.contains(m)) {
            PartitionKind::Image
        } else if path.contains(API_PATH_MARKER) {
            PartitionKind::Dynamic
        } else {
            PartitionKind::Static
        }
    }
}

/// Full partition name for a version tag and kind, e.g. `"v3-dynamic"`.
pub fn partition_name(version: &str, kind: PartitionKind) -> String {
    let mut name = String::from(version);
    name.push('-');
    name.push_str(kind.suffix());
    name
}

/// A single cached response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// The request URL this response is keyed on.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers (name → value).
    pub headers: BTreeMap<String, String>,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Store sequence at which this entry was written.
    pub stored_seq: u64,
    /// Store sequence of the most recent hit (or write).
    pub last_used: u64,
}

impl CachedResponse {
    /// Body size in bytes; the unit of quota accounting.
    pub fn size(&self) -> usize {
        self.body.len()
    }
}

/// One named partition of request → response entries.
#[derive(Debug, Clone)]
pub struct CachePartition {
    /// Partition name (e.g. `"v3-static"`).
    pub name: String,
    /// URL → CachedResponse.
    entries: BTreeMap<String, CachedResponse>,
    /// Total body bytes of all entries.
    total_size: usize,
}

/// Cache storage error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Partition not found.
    PartitionNotFound(String),
    /// Entry alone exceeds the whole quota.
    EntryTooLarge { size: usize, quota: usize },
    /// Quota still exceeded after eviction.
    QuotaExceeded,
}

impl core::fmt::Display for CacheError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CacheError::PartitionNotFound(name) => write!(f, "no partition named {}", name),
            CacheError::EntryTooLarge { size, quota } => {
                write!(f, "entry of {} bytes exceeds quota of {} bytes", size, quota)
            }
            CacheError::QuotaExceeded => write!(f, "cache quota exceeded"),
        }
    }
}

// ── Partition Implementation ────────────────────────────────

impl CachePartition {
    /// Create a new empty partition.
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
            entries: BTreeMap::new(),
            total_size: 0,
        }
    }

    /// Store a response, replacing any entry for the same URL.
    fn put(&mut self, url: &str, response: CachedResponse) {
        self.delete(url);
        self.total_size += response.size();
        self.entries.insert(String::from(url), response);
    }

    /// Remove an entry, returning its body size.
    fn take(&mut self, url: &str) -> Option<usize> {
        let old = self.entries.remove(url)?;
        let freed = old.size();
        self.total_size = self.total_size.saturating_sub(freed);
        Some(freed)
    }

    /// Look up a cached response by URL.
    pub fn match_url(&self, url: &str) -> Option<&CachedResponse> {
        self.entries.get(url)
    }

    /// Delete an entry by URL.
    pub fn delete(&mut self, url: &str) -> bool {
        self.take(url).is_some()
    }

    /// List all cached URLs.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this partition is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total body bytes held by this partition.
    pub fn size(&self) -> usize {
        self.total_size
    }

    /// Sequence of the least recently used entry, if any.
    fn lru_seq(&self) -> Option<u64> {
        self.entries.values().map(|e| e.last_used).min()
    }

    /// Evict the least recently used entry. Returns (url, bytes freed).
    fn evict_lru(&mut self) -> Option<(String, usize)> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(url, e)| (url.clone(), e.size()))?;
        self.delete(&victim.0);
        Some(victim)
    }
}

// ── Store Implementation ────────────────────────────────────

/// All partitions of every generation, plus the current version tag.
#[derive(Debug, Clone)]
pub struct PartitionStore {
    /// Current cache version tag (e.g. `"v3"`).
    version: String,
    /// partition name → partition.
    partitions: BTreeMap<String, CachePartition>,
    /// Total body bytes across all partitions.
    total_size: usize,
    /// Total-byte quota.
    quota: usize,
    /// Monotonic sequence, bumped on every write and hit.
    access_seq: u64,
}

impl PartitionStore {
    /// Create a store for the given version tag with the default quota.
    pub fn new(version: &str) -> Self {
        Self::with_quota(version, DEFAULT_QUOTA)
    }

    /// Create a store with an explicit quota.
    pub fn with_quota(version: &str, quota: usize) -> Self {
        Self {
            version: String::from(version),
            partitions: BTreeMap::new(),
            total_size: 0,
            quota,
            access_seq: 0,
        }
    }

    /// Current version tag.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Point the store at a new current generation. Existing partitions
    /// keep their names and contents; the next [`evict_stale`] pass treats
    /// every partition of an older generation as stale.
    ///
    /// [`evict_stale`]: PartitionStore::evict_stale
    pub fn set_version(&mut self, version: &str) {
        if self.version != version {
            log::info!("cache generation {} -> {}", self.version, version);
            self.version = String::from(version);
        }
    }

    /// Name of the current generation's partition for a request path.
    pub fn partition_name_for(&self, path: &str) -> String {
        partition_name(&self.version, PartitionKind::for_path(path))
    }

    /// Open (or lazily create) the named partition.
    pub fn open(&mut self, name: &str) -> &mut CachePartition {
        self.partitions
            .entry(String::from(name))
            .or_insert_with(|| CachePartition::new(name))
    }

    /// Open the current generation's partition of the given kind.
    pub fn open_kind(&mut self, kind: PartitionKind) -> &mut CachePartition {
        let name = partition_name(&self.version, kind);
        self.open(&name)
    }

    /// Whether a named partition exists.
    pub fn has(&self, name: &str) -> bool {
        self.partitions.contains_key(name)
    }

    /// List all partition names, every generation included.
    pub fn partition_names(&self) -> Vec<&str> {
        self.partitions.keys().map(|s| s.as_str()).collect()
    }

    /// Store a response in the named partition, enforcing the quota.
    pub fn put(
        &mut self,
        name: &str,
        url: &str,
        status: u16,
        headers: BTreeMap<String, String>,
        body: Vec<u8>,
    ) -> Result<(), CacheError> {
        let entry_size = body.len();
        if entry_size > self.quota {
            return Err(CacheError::EntryTooLarge {
                size: entry_size,
                quota: self.quota,
            });
        }
        // An overwrite releases the old entry's bytes up front; eviction
        // only ever makes room for the net growth.
        if let Some(freed) = self.partitions.get_mut(name).and_then(|p| p.take(url)) {
            self.total_size = self.total_size.saturating_sub(freed);
        }
        if self.total_size + entry_size > self.quota {
            self.evict_to_fit(entry_size)?;
        }

        self.access_seq += 1;
        let response = CachedResponse {
            url: String::from(url),
            status,
            headers,
            body,
            stored_seq: self.access_seq,
            last_used: self.access_seq,
        };

        self.open(name).put(url, response);
        self.total_size += entry_size;
        Ok(())
    }

    /// Look up a URL in the named partition, bumping its recency.
    pub fn lookup(&mut self, name: &str, url: &str) -> Option<&CachedResponse> {
        self.access_seq += 1;
        let seq = self.access_seq;
        let entry = self.partitions.get_mut(name)?.entries.get_mut(url)?;
        entry.last_used = seq;
        Some(&*entry)
    }

    /// Look up a URL without touching recency.
    pub fn peek(&self, name: &str, url: &str) -> Option<&CachedResponse> {
        self.partitions.get(name)?.match_url(url)
    }

    /// Delete a named partition. Returns whether it existed.
    pub fn delete_partition(&mut self, name: &str) -> bool {
        match self.partitions.remove(name) {
            Some(partition) => {
                self.total_size = self.total_size.saturating_sub(partition.size());
                true
            }
            None => false,
        }
    }

    /// Delete every partition whose name does not start with the current
    /// version tag. Returns the deleted names.
    pub fn evict_stale(&mut self) -> Vec<String> {
        let stale: Vec<String> = self
            .partitions
            .keys()
            .filter(|name| !name.starts_with(self.version.as_str()))
            .cloned()
            .collect();
        for name in &stale {
            self.delete_partition(name);
            log::info!("evicted stale partition {}", name);
        }
        stale
    }

    /// Delete every partition regardless of version. Returns how many went.
    pub fn clear_all(&mut self) -> usize {
        let count = self.partitions.len();
        self.partitions.clear();
        self.total_size = 0;
        count
    }

    /// Sum of body bytes over every entry of every partition.
    pub fn total_body_bytes(&self) -> usize {
        self.partitions
            .values()
            .flat_map(|p| p.entries.values())
            .map(|e| e.size())
            .sum()
    }

    /// Maintained byte total (always equals `total_body_bytes`).
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Configured quota in bytes.
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Change the quota. An overage inherited from a larger quota is worked
    /// off by eviction on the next write.
    pub fn set_quota(&mut self, quota: usize) {
        self.quota = quota;
    }

    /// Evict least recently used entries until `needed` bytes fit.
    fn evict_to_fit(&mut self, needed: usize) -> Result<(), CacheError> {
        while self.total_size + needed > self.quota {
            let coldest = self
                .partitions
                .iter()
                .filter(|(_, p)| !p.is_empty())
                .min_by_key(|(_, p)| p.lru_seq().unwrap_or(u64::MAX))
                .map(|(name, _)| name.clone());

            let Some(name) = coldest else {
                return Err(CacheError::QuotaExceeded);
            };
            if let Some(partition) = self.partitions.get_mut(&name) {
                if let Some((url, freed)) = partition.evict_lru() {
                    self.total_size = self.total_size.saturating_sub(freed);
                    log::debug!("quota eviction dropped {} from {}", url, name);
                }
            }
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────

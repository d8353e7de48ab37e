//! Window clients under the worker's scope.
//!
//! Mirrors the pages the host currently has open: which one holds focus,
//! which ones this worker controls. Notification clicks route through
//! [`ClientRegistry::find_matching`] to reuse an open page before opening a
//! new one.

use alloc::string::String;
use alloc::vec::Vec;

// ── Types ───────────────────────────────────────────────────

/// Unique client identifier.
pub type ClientId = u64;

/// One open page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Unique ID assigned at registration.
    pub id: ClientId,
    /// The page's current URL.
    pub url: String,
    /// Whether the page holds window focus.
    pub focused: bool,
    /// Whether this worker controls the page's fetches.
    pub controlled: bool,
}

/// Tracks every page in scope.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Vec<Client>,
    next_id: ClientId,
}

// ── Implementation ──────────────────────────────────────────

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
            next_id: 1,
        }
    }

    /// Record a newly opened page. It starts unfocused and uncontrolled;
    /// control arrives with the next claim.
    pub fn register(&mut self, url: &str) -> ClientId {
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.clients.push(Client {
            id,
            url: String::from(url),
            focused: false,
            controlled: false,
        });
        id
    }

    /// Drop a closed page. Returns false when the ID is unknown.
    pub fn unregister(&mut self, id: ClientId) -> bool {
        let before = self.clients.len();
        self.clients.retain(|client| client.id != id);
        self.clients.len() != before
    }

    /// Give one page window focus, taking it from every other page.
    /// Returns false when the ID is unknown.
    pub fn focus(&mut self, id: ClientId) -> bool {
        if !self.clients.iter().any(|client| client.id == id) {
            return false;
        }
        for client in &mut self.clients {
            client.focused = client.id == id;
        }
        true
    }

    /// Open a fresh window on `url`. The new page arrives focused and
    /// already controlled.
    pub fn open_window(&mut self, url: &str) -> ClientId {
        let id = self.register(url);
        for client in &mut self.clients {
            client.focused = client.id == id;
            if client.id == id {
                client.controlled = true;
            }
        }
        log::info!("opened window {} for {}", id, url);
        id
    }

    /// Take control of every page in scope. Returns how many pages were
    /// not controlled before.
    pub fn claim(&mut self) -> usize {
        let mut claimed = 0;
        for client in &mut self.clients {
            if !client.controlled {
                client.controlled = true;
                claimed += 1;
            }
        }
        claimed
    }

    /// Release control of every page. Run when a newer worker version
    /// takes over; pages stay open but their fetches bypass the worker
    /// until the next claim.
    pub fn release_all(&mut self) {
        for client in &mut self.clients {
            client.controlled = false;
        }
    }

    /// First page whose URL contains `target`, in registration order.
    pub fn find_matching(&self, target: &str) -> Option<ClientId> {
        self.clients
            .iter()
            .find(|client| client.url.contains(target))
            .map(|client| client.id)
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == id)
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

// ── Tests ───────────────────────────────────────────────────

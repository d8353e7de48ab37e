//! The service worker facade.
//!
//! One [`ServiceWorker`] per installed version. The host owns the event
//! loop and the network transport: it feeds lifecycle, fetch, sync, push,
//! and control events into this type, lends its transport to every event
//! that may touch the network, and acts on the returned outcomes. Nothing
//! here spawns tasks or blocks; deferred work accumulates inside and is
//! drained by [`ServiceWorker::run_background_tasks`].

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use outpost_store::{partition_name, Outbox, PartitionKind, PartitionStore, QueueError};

use crate::clients::ClientRegistry;
use crate::config::WorkerConfig;
use crate::control::{CacheSizeReply, ControlMessage, ReplyPort};
use crate::fetch::{FetchOutcome, NetworkBackend, Request, RequestMethod};
use crate::lifecycle::{Lifecycle, WorkerPhase};
use crate::push::{self, ClickOutcome, NotificationCenter, NotificationIntent, PushPayload};
use crate::routes::RouteTable;
use crate::strategy::StrategyEngine;
use crate::sync::{self, ReplayReport};
use crate::WorkerError;

// ── Worker ──────────────────────────────────────────────────

/// One installed worker version and everything it owns.
pub struct ServiceWorker {
    config: WorkerConfig,
    lifecycle: Lifecycle,
    store: PartitionStore,
    outbox: Outbox,
    routes: RouteTable,
    engine: StrategyEngine,
    clients: ClientRegistry,
    notifications: NotificationCenter,
}

impl ServiceWorker {
    /// A fresh version with empty storage.
    pub fn new(config: WorkerConfig) -> Self {
        let store = PartitionStore::with_quota(&config.cache_version, config.quota);
        let routes = RouteTable::new(config.routes.clone());
        Self {
            config,
            lifecycle: Lifecycle::new(),
            store,
            outbox: Outbox::new(),
            routes,
            engine: StrategyEngine::new(),
            clients: ClientRegistry::new(),
            notifications: NotificationCenter::new(),
        }
    }

    /// Parse a configuration document and build a worker from it.
    pub fn from_json(json: &str) -> Result<Self, WorkerError> {
        Ok(Self::new(WorkerConfig::from_json(json)?))
    }

    /// The next version, inheriting its predecessor's storage, queue, open
    /// pages, and on-screen notifications. The predecessor is consumed;
    /// its pages lose their controller until this version claims them.
    pub fn upgrade_from(config: WorkerConfig, previous: ServiceWorker) -> Self {
        let ServiceWorker {
            mut store,
            outbox,
            mut clients,
            notifications,
            ..
        } = previous;
        store.set_version(&config.cache_version);
        store.set_quota(config.quota);
        clients.release_all();
        let routes = RouteTable::new(config.routes.clone());
        Self {
            config,
            lifecycle: Lifecycle::new(),
            store,
            outbox,
            routes,
            engine: StrategyEngine::new(),
            clients,
            notifications,
        }
    }

    // ── Lifecycle events ────────────────────────────────────

    /// Install this version: fetch every app shell asset and cache the set
    /// into the static partition. All assets must arrive with a success
    /// status; one failure discards the whole version. On success the
    /// worker parks in the waiting phase with takeover already requested.
    pub fn handle_install(&mut self, backend: &mut dyn NetworkBackend) -> Result<(), WorkerError> {
        if self.lifecycle.phase() != WorkerPhase::Installing {
            return Err(WorkerError::InvalidTransition {
                from: self.lifecycle.phase(),
                to: WorkerPhase::Waiting,
            });
        }
        match self.prewarm_shell(backend) {
            Ok(count) => {
                self.lifecycle.transition(WorkerPhase::Waiting)?;
                self.lifecycle.request_skip();
                log::info!(
                    "version {} installed, {} shell assets cached",
                    self.config.cache_version,
                    count
                );
                Ok(())
            }
            Err(reason) => {
                self.lifecycle.transition(WorkerPhase::Redundant)?;
                log::warn!("install of {} failed: {}", self.config.cache_version, reason);
                Err(WorkerError::InstallFailed(reason))
            }
        }
    }

    /// Activate this version: drop every partition of older generations,
    /// then take control of all open pages.
    pub fn handle_activate(&mut self) -> Result<(), WorkerError> {
        self.lifecycle.transition(WorkerPhase::Active)?;
        let dropped = self.store.evict_stale();
        let claimed = self.clients.claim();
        log::info!(
            "version {} active: {} stale partitions dropped, {} pages claimed",
            self.config.cache_version,
            dropped.len(),
            claimed
        );
        Ok(())
    }

    /// Take over now instead of waiting for the previous version to wind
    /// down. A parked version activates immediately; an installing one
    /// remembers the request and honors it when installation completes.
    pub fn skip_waiting(&mut self) -> Result<(), WorkerError> {
        match self.lifecycle.phase() {
            WorkerPhase::Waiting => self.handle_activate(),
            WorkerPhase::Installing => {
                self.lifecycle.request_skip();
                Ok(())
            }
            WorkerPhase::Active => Ok(()),
            WorkerPhase::Redundant => Err(WorkerError::InvalidTransition {
                from: WorkerPhase::Redundant,
                to: WorkerPhase::Active,
            }),
        }
    }

    /// Fetch the whole app shell, then cache it as one unit.
    fn prewarm_shell(&mut self, backend: &mut dyn NetworkBackend) -> Result<usize, String> {
        let mut fetched = Vec::with_capacity(self.config.app_shell.len());
        for asset in &self.config.app_shell {
            let request = Request::get(asset.as_str());
            match backend.fetch(&request) {
                Ok(response) if response.ok() => fetched.push(response),
                Ok(response) => {
                    return Err(format!(
                        "shell asset {} returned status {}",
                        asset, response.status
                    ));
                }
                Err(err) => return Err(format!("shell asset {} failed: {}", asset, err)),
            }
        }
        let name = partition_name(self.store.version(), PartitionKind::Static);
        let count = fetched.len();
        for (asset, response) in self.config.app_shell.iter().zip(fetched) {
            if let Err(err) =
                self.store
                    .put(&name, asset, response.status, response.headers, response.body)
            {
                return Err(format!("caching shell asset {} failed: {}", asset, err));
            }
        }
        Ok(count)
    }

    // ── Fetch events ────────────────────────────────────────

    /// Intercept one request. Only GETs are handled; everything else goes
    /// straight to the host's own transport. The host routes fetches here
    /// once the worker controls the page that issued them.
    pub fn handle_fetch(
        &mut self,
        backend: &mut dyn NetworkBackend,
        request: &Request,
    ) -> FetchOutcome {
        if request.method != RequestMethod::Get {
            return FetchOutcome::Passthrough;
        }
        let strategy = self.routes.resolve(request.path());
        self.engine.handle(&mut self.store, backend, request, strategy)
    }

    /// Drain deferred work (cache revalidations). Returns how many tasks
    /// ran. The host calls this between events, whenever it has slack.
    pub fn run_background_tasks(&mut self, backend: &mut dyn NetworkBackend) -> usize {
        self.engine.run_pending(&mut self.store, backend)
    }

    // ── Background sync ─────────────────────────────────────

    /// Queue a user action for later delivery.
    pub fn enqueue_action(&mut self, payload: Vec<u8>) -> u64 {
        let id = self.outbox.enqueue(payload);
        log::debug!("queued offline action {}", id);
        id
    }

    /// Handle a sync event; only the message replay tag is ours.
    pub fn handle_sync(
        &mut self,
        backend: &mut dyn NetworkBackend,
        tag: &str,
    ) -> Option<ReplayReport> {
        sync::handle_sync_event(tag, &mut self.outbox, backend)
    }

    /// Binary image of the action queue, for persisting across restarts.
    pub fn outbox_snapshot(&self) -> Result<Vec<u8>, QueueError> {
        self.outbox.snapshot()
    }

    /// Replace the action queue with a persisted image.
    pub fn restore_outbox(&mut self, image: &[u8]) -> Result<(), QueueError> {
        self.outbox = Outbox::restore(image)?;
        log::info!("restored action queue, {} entries", self.outbox.len());
        Ok(())
    }

    // ── Push and notifications ──────────────────────────────

    /// Turn a push event into a notification. Returns the notification ID,
    /// or None when display permission is denied.
    pub fn handle_push(&mut self, data: Option<&[u8]>) -> Option<u64> {
        let payload = PushPayload::parse(data);
        let intent = NotificationIntent::from_payload(&payload, &self.config.notification);
        self.notifications.show(intent)
    }

    /// Handle a click on a notification. The notification leaves the
    /// screen; the default action (or no action) focuses an open page on
    /// the notification's URL, opening a new window when none matches.
    pub fn handle_notification_click(&mut self, id: u64, action: Option<&str>) -> ClickOutcome {
        let Some(intent) = self.notifications.close(id) else {
            return ClickOutcome::Dismissed;
        };
        match action {
            None => push::route_click(&mut self.clients, &intent.url),
            Some(push::ACTION_OPEN) => push::route_click(&mut self.clients, &intent.url),
            Some(other) => {
                log::debug!("notification {} action {} dismissed", id, other);
                ClickOutcome::Dismissed
            }
        }
    }

    // ── Control channel ─────────────────────────────────────

    /// Handle a message posted by a page. Replies go out through `port`;
    /// a query that needs one fails without it. Returns the decoded
    /// message so the host can log or audit it.
    pub fn handle_message(
        &mut self,
        data: &[u8],
        port: Option<&mut ReplyPort>,
    ) -> Result<ControlMessage, WorkerError> {
        let message = ControlMessage::parse(data)?;
        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting()?;
            }
            ControlMessage::ClearCache => {
                let dropped = self.store.clear_all();
                log::info!("cleared caches on request, {} partitions dropped", dropped);
            }
            ControlMessage::GetCacheSize => {
                let Some(port) = port else {
                    return Err(WorkerError::MissingReplyPort);
                };
                let reply = CacheSizeReply {
                    size: self.store.total_body_bytes() as u64,
                };
                port.post(reply.to_bytes());
            }
        }
        Ok(message)
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn phase(&self) -> WorkerPhase {
        self.lifecycle.phase()
    }

    /// True once installed with takeover requested; the host should drive
    /// activation without waiting for the previous version.
    pub fn ready_to_activate(&self) -> bool {
        self.lifecycle.ready_to_activate()
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn store(&self) -> &PartitionStore {
        &self.store
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn clients(&self) -> &ClientRegistry {
        &self.clients
    }

    /// The page registry is host-maintained: pages open and close outside
    /// the worker's view, so the host mutates it directly.
    pub fn clients_mut(&mut self) -> &mut ClientRegistry {
        &mut self.clients
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    /// Revalidations waiting for the next background pump.
    pub fn pending_revalidations(&self) -> usize {
        self.engine.pending_revalidations()
    }
}

// ── Tests ───────────────────────────────────────────────────

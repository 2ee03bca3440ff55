//! The coordinator loop and its public handle.
//!
//! One tokio task owns every piece of mutable engine state and processes
//! a single message stream: commands from the [`Aggregator`] handle and
//! completions from spawned fetch tasks, in arrival order. Fetches run
//! concurrently (at most one per source key); everything else is
//! serialized here.

use crate::config::AggregatorConfig;
use crate::feed::{FeedEvent, FeedItem, FeedList};
use crate::fetch::{FetchError, Fetcher, RemoteItem};
use crate::listener::{FeedListener, ListenerSet};
use crate::orchestrator::{LoadGauge, PageTable};
use crate::source::{NullStore, Registry, Source, SourceKey, SourceStore, StoreError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{AbortHandle, JoinHandle};

// ============================================================================
// Messages
// ============================================================================

/// External commands accepted by the coordinator.
enum Command {
    LoadSource(SourceKey),
    LoadAll,
    SetActive { key: SourceKey, active: bool },
    AddSource(Source),
    RemoveSource(SourceKey),
    CancelAll,
    Refresh,
    Register(Arc<dyn FeedListener>),
    Unregister(Arc<dyn FeedListener>),
    Snapshot(oneshot::Sender<Vec<FeedItem>>),
    IsLoading(oneshot::Sender<bool>),
    Sources(oneshot::Sender<Vec<Source>>),
    Shutdown,
}

/// Everything the loop processes: commands and fetch completions share one
/// channel so registry-driven cancellations can never race a completion on
/// a second mutation path.
enum Msg {
    Command(Command),
    Completed {
        key: SourceKey,
        generation: u64,
        page: u32,
        result: Result<Vec<RemoteItem>, FetchError>,
    },
}

/// One outstanding fetch. The generation distinguishes a stale completion
/// from the request currently registered under the same key after a
/// deactivate/reactivate cycle.
struct InFlight {
    generation: u64,
    abort: AbortHandle,
}

// ============================================================================
// Coordinator
// ============================================================================

struct Coordinator {
    config: AggregatorConfig,
    registry: Registry,
    pages: PageTable,
    inflight: HashMap<SourceKey, InFlight>,
    gauge: LoadGauge,
    feed: FeedList,
    listeners: ListenerSet,
    fetcher: Arc<dyn Fetcher>,
    store: Box<dyn SourceStore>,
    tx: mpsc::UnboundedSender<Msg>,
    generation: u64,
}

impl Coordinator {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Msg>) {
        while let Some(msg) = rx.recv().await {
            if !self.handle(msg) {
                break;
            }
        }
        // Loop is ending (shutdown or every handle dropped): nothing will
        // process further completions, so stop the work feeding them.
        for (_, inflight) in self.inflight.drain() {
            inflight.abort.abort();
        }
    }

    /// Process one message. Returns false to stop the loop.
    fn handle(&mut self, msg: Msg) -> bool {
        match msg {
            Msg::Command(command) => self.handle_command(command),
            Msg::Completed {
                key,
                generation,
                page,
                result,
            } => {
                self.on_completed(key, generation, page, result);
                true
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::LoadSource(key) => {
                match self.registry.get(&key).cloned() {
                    Some(source) if source.active => self.dispatch(source),
                    Some(_) => tracing::debug!(key = %key, "Skipping load for inactive source"),
                    None => tracing::debug!(key = %key, "Skipping load for unknown source"),
                }
                true
            }
            Command::LoadAll => {
                self.load_all();
                true
            }
            Command::SetActive { key, active } => {
                self.set_active(&key, active);
                true
            }
            Command::AddSource(source) => {
                self.add_source(source);
                true
            }
            Command::RemoveSource(key) => {
                self.remove_source(&key);
                true
            }
            Command::CancelAll => {
                self.cancel_all();
                true
            }
            Command::Refresh => {
                self.refresh();
                true
            }
            Command::Register(listener) => {
                self.listeners.register(listener);
                true
            }
            Command::Unregister(listener) => {
                self.listeners.unregister(&listener);
                true
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.feed.items().to_vec());
                true
            }
            Command::IsLoading(reply) => {
                let _ = reply.send(self.gauge.is_loading());
                true
            }
            Command::Sources(reply) => {
                let _ = reply.send(self.registry.sources().to_vec());
                true
            }
            Command::Shutdown => false,
        }
    }

    /// Start one fetch for an active source. A request already in flight
    /// for the key wins: the duplicate is skipped before the gauge moves,
    /// so no spurious edge notifications fire.
    fn dispatch(&mut self, source: Source) {
        if self.inflight.contains_key(&source.key) {
            tracing::debug!(key = %source.key, "Request already in flight; skipping duplicate");
            return;
        }

        if self.gauge.raise() {
            self.listeners.notify_started();
        }

        let page = self.pages.next_page(&source.key);
        self.generation += 1;
        let generation = self.generation;

        tracing::debug!(key = %source.key, page = page, "Dispatching fetch");

        let fut = self
            .fetcher
            .fetch(&source.query, page, self.config.page_size, self.config.sort);
        let tx = self.tx.clone();
        let key = source.key.clone();
        let task = tokio::spawn(async move {
            let result = fut.await;
            let _ = tx.send(Msg::Completed {
                key,
                generation,
                page,
                result,
            });
        });

        self.inflight.insert(
            source.key,
            InFlight {
                generation,
                abort: task.abort_handle(),
            },
        );
    }

    fn load_all(&mut self) {
        let active: Vec<Source> = self
            .registry
            .sources()
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect();
        for source in active {
            self.dispatch(source);
        }
    }

    /// A fetch settled. The registration check makes cancellation and
    /// completion mutually exclusive: the cancel path removes the entry
    /// (and settles the gauge) first, so a completion that finds no entry
    /// — or an entry from a newer request — is stale and does nothing.
    fn on_completed(
        &mut self,
        key: SourceKey,
        generation: u64,
        page: u32,
        result: Result<Vec<RemoteItem>, FetchError>,
    ) {
        match self.inflight.get(&key) {
            Some(inflight) if inflight.generation == generation => {
                self.inflight.remove(&key);
            }
            _ => {
                tracing::debug!(key = %key, page = page, "Dropping stale completion");
                return;
            }
        }

        if self.gauge.lower() {
            self.listeners.notify_finished();
        }

        match result {
            Ok(items) => {
                // Deactivation race: the source may have been disabled after
                // this page was requested. A dead cursor means the result is
                // unwanted; drop it.
                if !self.pages.is_enabled(&key) {
                    tracing::debug!(key = %key, page = page, "Discarding page for disabled source");
                    return;
                }
                if items.is_empty() {
                    return;
                }
                let stamped = items
                    .into_iter()
                    .map(|item| FeedItem::stamped(item, key.clone(), page));
                for event in self.feed.merge(stamped) {
                    self.listeners.notify_feed(&event);
                }
            }
            Err(error) => {
                // Terminal for this request; the next explicit load retries.
                tracing::warn!(key = %key, page = page, error = %error, "Source fetch failed");
            }
        }
    }

    fn set_active(&mut self, key: &SourceKey, active: bool) {
        let Some(changed) = self.registry.set_active(key, active) else {
            tracing::debug!(key = %key, active = active, "Ignoring no-op active flip");
            return;
        };

        if let Err(error) = self.store.save_source(&changed) {
            tracing::warn!(key = %key, error = %error, "Failed to persist source flag");
        }

        if changed.active {
            // Reactivation is exactly a fresh load.
            self.dispatch(changed);
        } else {
            self.cancel_source(key);
            self.pages.reset(key);
        }
    }

    /// Cancel the in-flight request for one key, if any, settling the
    /// gauge exactly once. The removed registration is what makes a
    /// late completion for this request a no-op.
    fn cancel_source(&mut self, key: &str) {
        if let Some(inflight) = self.inflight.remove(key) {
            inflight.abort.abort();
            if self.gauge.lower() {
                self.listeners.notify_finished();
            }
            tracing::debug!(key = %key, "Cancelled in-flight request");
        }
    }

    fn add_source(&mut self, source: Source) {
        if !self.registry.add(source.clone()) {
            return;
        }
        if let Err(error) = self.store.save_source(&source) {
            tracing::warn!(key = %source.key, error = %error, "Failed to persist new source");
        }
        if source.active {
            self.dispatch(source);
        }
    }

    fn remove_source(&mut self, key: &str) {
        let Some(removed) = self.registry.remove(key) else {
            tracing::debug!(key = %key, "Ignoring removal of unknown source");
            return;
        };

        self.cancel_source(key);
        self.pages.forget(key);

        if let Err(error) = self.store.remove_source(key) {
            tracing::warn!(key = %key, error = %error, "Failed to remove persisted source");
        }

        if let Some(event) = self.feed.remove_by_source(&removed.key) {
            self.listeners.notify_feed(&event);
        }
    }

    /// Cancel every outstanding request. Cursors are deliberately left
    /// alone: a later resume continues from the same next page.
    fn cancel_all(&mut self) {
        for (key, inflight) in self.inflight.drain() {
            inflight.abort.abort();
            tracing::debug!(key = %key, "Cancelled in-flight request");
        }
        if self.gauge.clear() {
            self.listeners.notify_finished();
        }
    }

    /// Hard refresh: drop everything in flight, rewind every cursor, empty
    /// the feed, then reload all active sources from page 1.
    fn refresh(&mut self) {
        self.cancel_all();
        self.pages.reset_all();
        let event = self.feed.clear();
        self.listeners.notify_feed(&event);
        self.load_all();
    }
}

// ============================================================================
// Aggregator handle
// ============================================================================

/// Handle to a running aggregation engine.
///
/// All methods enqueue work for the coordinator task and return
/// immediately; queries round-trip through the same queue, so a query
/// observes the effect of every call made before it on this handle.
pub struct Aggregator {
    tx: mpsc::UnboundedSender<Msg>,
    join: JoinHandle<()>,
}

impl Aggregator {
    /// Start an engine from persisted sources. Must be called inside a
    /// tokio runtime.
    pub fn spawn(
        config: AggregatorConfig,
        fetcher: Arc<dyn Fetcher>,
        store: Box<dyn SourceStore>,
    ) -> Result<Self, StoreError> {
        let sources = store.load_sources()?;
        Ok(Self::start(config, sources, fetcher, store))
    }

    /// Start an engine with an explicit source list and no persistence.
    pub fn with_sources(
        config: AggregatorConfig,
        sources: Vec<Source>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self::start(config, sources, fetcher, Box::new(NullStore))
    }

    fn start(
        config: AggregatorConfig,
        sources: Vec<Source>,
        fetcher: Arc<dyn Fetcher>,
        store: Box<dyn SourceStore>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Coordinator {
            config,
            registry: Registry::new(sources),
            pages: PageTable::new(),
            inflight: HashMap::new(),
            gauge: LoadGauge::default(),
            feed: FeedList::new(),
            listeners: ListenerSet::default(),
            fetcher,
            store,
            tx: tx.clone(),
            generation: 0,
        };
        let join = tokio::spawn(coordinator.run(rx));
        Self { tx, join }
    }

    fn send(&self, command: Command) {
        if self.tx.send(Msg::Command(command)).is_err() {
            tracing::warn!("Aggregator loop has stopped; command dropped");
        }
    }

    /// Load the next page of every currently-active source. The bulk
    /// refresh / load-more entry point.
    pub fn load_all(&self) {
        self.send(Command::LoadAll);
    }

    /// Load the next page of one source. Unknown, inactive, and
    /// already-in-flight keys are skipped.
    pub fn load_source(&self, key: impl Into<SourceKey>) {
        self.send(Command::LoadSource(key.into()));
    }

    /// Flip a source's active flag. Deactivation cancels its in-flight
    /// request and rewinds its cursor; reactivation loads page 1.
    pub fn set_active(&self, key: impl Into<SourceKey>, active: bool) {
        self.send(Command::SetActive {
            key: key.into(),
            active,
        });
    }

    /// Add a source (no-op on duplicate key) and load it if active.
    pub fn add_source(&self, source: Source) {
        self.send(Command::AddSource(source));
    }

    /// Remove a source: cancels its request, drops its cursor, removes its
    /// items from the feed with one reset notification.
    pub fn remove_source(&self, key: impl Into<SourceKey>) {
        self.send(Command::RemoveSource(key.into()));
    }

    /// Cancel every outstanding request without touching cursors.
    pub fn cancel_all(&self) {
        self.send(Command::CancelAll);
    }

    /// Hard refresh: cancel everything, clear the feed, reload all active
    /// sources from page 1.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    /// Register a listener. Idempotent per `Arc` identity.
    pub fn register_listener(&self, listener: Arc<dyn FeedListener>) {
        self.send(Command::Register(listener));
    }

    /// Unregister a listener. Unregistering an unknown listener is a no-op.
    pub fn unregister_listener(&self, listener: Arc<dyn FeedListener>) {
        self.send(Command::Unregister(listener));
    }

    /// Current feed contents, in arrival order. Also acts as a barrier:
    /// the reply reflects every command sent before this call.
    pub async fn snapshot(&self) -> Vec<FeedItem> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply));
        rx.await.unwrap_or_default()
    }

    /// Whether any request is in flight.
    pub async fn is_loading(&self) -> bool {
        let (reply, rx) = oneshot::channel();
        self.send(Command::IsLoading(reply));
        rx.await.unwrap_or(false)
    }

    /// The configured sources, in registry order.
    pub async fn sources(&self) -> Vec<Source> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Sources(reply));
        rx.await.unwrap_or_default()
    }

    /// Stop the engine: aborts all in-flight work and waits for the
    /// coordinator task to exit.
    pub async fn shutdown(self) {
        self.send(Command::Shutdown);
        let _ = self.join.await;
    }
}

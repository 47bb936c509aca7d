//! Single-entry detail state.

use crate::api::ApiError;
use crate::catalog::{Catalog, Item};
use crate::list::describe_failure;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Shown when a detail failure carries no description of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailSnapshot {
    /// Name most recently requested.
    pub name: String,
    pub item: Option<Item>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct DetailEvent {
    pub generation: u64,
    pub result: Result<Item, ApiError>,
}

/// Fetch-by-name wrapped in loading and error flags.
///
/// Same completion model as [`crate::list::ListController`]: the fetch runs on
/// a spawned task and comes back through [`DetailController::apply`]. A newer
/// [`DetailController::load`] supersedes an older one.
pub struct DetailController {
    catalog: Arc<dyn Catalog>,
    events: mpsc::Sender<DetailEvent>,
    publisher: watch::Sender<DetailSnapshot>,
    state: DetailSnapshot,
    generation: u64,
    handle: Option<JoinHandle<()>>,
    closed: bool,
}

impl DetailController {
    pub fn new(catalog: Arc<dyn Catalog>, events: mpsc::Sender<DetailEvent>) -> Self {
        let state = DetailSnapshot::default();
        let (publisher, _) = watch::channel(state.clone());
        Self {
            catalog,
            events,
            publisher,
            state,
            generation: 0,
            handle: None,
            closed: false,
        }
    }

    pub fn snapshot(&self) -> &DetailSnapshot {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailSnapshot> {
        self.publisher.subscribe()
    }

    /// Begin fetching `name`. A previously loaded item stays visible until
    /// the new one arrives.
    pub fn load(&mut self, name: &str) {
        if self.closed {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;

        self.state.name = name.to_string();
        self.state.is_loading = true;
        self.state.error = None;
        self.publish();

        let catalog = Arc::clone(&self.catalog);
        let tx = self.events.clone();
        let name = name.to_string();
        tracing::debug!(name = %name, generation, "Loading detail");

        self.handle = Some(tokio::spawn(async move {
            let result = catalog.fetch_detail(&name).await;
            if tx.send(DetailEvent { generation, result }).await.is_err() {
                tracing::debug!(generation, "Detail event receiver dropped");
            }
        }));
    }

    /// Returns `true` if the event was current and a new snapshot was published.
    pub fn apply(&mut self, event: DetailEvent) -> bool {
        if self.closed || event.generation != self.generation || !self.state.is_loading {
            tracing::debug!(
                generation = event.generation,
                expected = self.generation,
                "Discarding stale detail result"
            );
            return false;
        }
        self.handle = None;

        match event.result {
            Ok(item) => self.state.item = Some(item),
            Err(e) => {
                tracing::warn!(name = %self.state.name, error = %e, "Detail fetch failed");
                self.state.error = Some(describe_failure(&e, UNKNOWN_ERROR_MESSAGE));
            }
        }
        self.state.is_loading = false;
        self.publish();
        true
    }

    pub fn close(&mut self) {
        self.closed = true;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

impl Drop for DetailController {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

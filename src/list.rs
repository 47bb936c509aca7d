//! Paginated list state with an exact-name search override.
//!
//! [`ListController`] owns the accumulated pages and the single search
//! result, and publishes a [`ListSnapshot`] after every mutation. Fetches run
//! on spawned tasks; their completions come back as [`ListEvent`]s that the
//! owner feeds to [`ListController::apply`], so all state changes happen on the
//! owner's task in arrival order.

use crate::api::{fetch_page_with_details, ApiError};
use crate::catalog::{Catalog, DetailedPage, Item};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Entries requested per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Shown when a page failure carries no description of its own.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load Pokémon. Please try again.";

// ============================================================================
// Snapshot & Events
// ============================================================================

/// Renderer-facing view of the list state.
///
/// `items` is shared, never mutated in place: each change publishes a new
/// `Arc`, so a renderer holding an older snapshot keeps a consistent view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Accumulated pages in fetch order, or the single search result.
    pub items: Arc<Vec<Item>>,
    /// Initial page load or search in flight.
    pub is_loading: bool,
    /// Follow-up page load in flight.
    pub is_loading_more: bool,
    pub error: Option<String>,
    /// Raw search field contents; may be non-empty before a search is confirmed.
    pub search_query: String,
    pub search_active: bool,
    pub can_load_more: bool,
}

impl Default for ListSnapshot {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            is_loading: false,
            is_loading_more: false,
            error: None,
            search_query: String::new(),
            search_active: false,
            can_load_more: true,
        }
    }
}

/// Which phase a page fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// First page; replaces the accumulated collection.
    Initial,
    /// Follow-up page; appended to the accumulated collection.
    More,
}

/// Completion of a fetch spawned by [`ListController`].
///
/// Events carry the generation they were spawned under; the controller
/// ignores any event whose generation has since been superseded.
#[derive(Debug)]
pub enum ListEvent {
    PageLoaded {
        kind: PageKind,
        generation: u64,
        result: Result<DetailedPage, ApiError>,
    },
    SearchCompleted {
        query: String,
        generation: u64,
        result: Result<Item, ApiError>,
    },
}

// ============================================================================
// Controller
// ============================================================================

/// Session-scoped owner of the list state.
///
/// Created with [`ListController::start`], which immediately begins the
/// initial page load. After [`ListController::close`] (or drop) outstanding
/// fetches are aborted and late completions are ignored.
pub struct ListController {
    catalog: Arc<dyn Catalog>,
    events: mpsc::Sender<ListEvent>,
    publisher: watch::Sender<ListSnapshot>,
    state: ListSnapshot,

    accumulated: Arc<Vec<Item>>,
    offset: usize,
    page_size: usize,
    /// Continuation flag from the last completed page, restored when a search is cleared.
    last_known_can_load_more: bool,

    page_in_flight: Option<PageKind>,
    page_generation: u64,
    page_handle: Option<JoinHandle<()>>,

    search_in_flight: bool,
    search_generation: u64,
    search_handle: Option<JoinHandle<()>>,

    closed: bool,
}

impl ListController {
    /// Create the controller and begin loading the first page.
    ///
    /// Must be called inside a tokio runtime. `page_size` is clamped to at
    /// least 1. Completions are delivered on `events`.
    pub fn start(
        catalog: Arc<dyn Catalog>,
        page_size: usize,
        events: mpsc::Sender<ListEvent>,
    ) -> Self {
        let state = ListSnapshot::default();
        let (publisher, _) = watch::channel(state.clone());

        let mut controller = Self {
            catalog,
            events,
            publisher,
            state,
            accumulated: Arc::new(Vec::new()),
            offset: 0,
            page_size: page_size.max(1),
            last_known_can_load_more: true,
            page_in_flight: None,
            page_generation: 0,
            page_handle: None,
            search_in_flight: false,
            search_generation: 0,
            search_handle: None,
            closed: false,
        };
        controller.load_initial();
        controller
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &ListSnapshot {
        &self.state
    }

    /// Receiver that observes the latest snapshot and every later change.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.publisher.subscribe()
    }

    /// Number of paginated entries fetched so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Reset pagination and fetch the first page.
    ///
    /// A no-op once pages have been loaded and nothing is in flight. A page
    /// fetch already in flight is superseded.
    pub fn load_initial(&mut self) {
        if self.closed {
            return;
        }
        if self.begin_initial_load() {
            self.publish();
        }
    }

    /// Fetch the next page.
    ///
    /// Silently ignored while any fetch is in flight, when the upstream
    /// reported no continuation, or while a search result is displayed.
    pub fn load_more(&mut self) {
        if self.closed {
            return;
        }
        let searching = self.state.search_active && !is_blank(&self.state.search_query);
        if self.fetch_in_progress()
            || self.state.is_loading
            || self.state.is_loading_more
            || !self.state.can_load_more
            || searching
        {
            tracing::trace!(
                offset = self.offset,
                can_load_more = self.state.can_load_more,
                "load_more ignored"
            );
            return;
        }

        self.fetch_page(PageKind::More);
        self.publish();
    }

    /// Record the search field contents.
    ///
    /// Clearing the field while a search is active restores the paginated
    /// list without refetching.
    pub fn on_search_query_changed(&mut self, query: impl Into<String>) {
        if self.closed {
            return;
        }
        self.state.search_query = query.into();
        if is_blank(&self.state.search_query) && self.state.search_active {
            self.restore_paginated();
        }
        self.publish();
    }

    /// Run an exact-name search for the current query.
    ///
    /// A blank query clears an active search and does nothing otherwise.
    pub fn confirm_search(&mut self) {
        if self.closed {
            return;
        }
        let query = self.state.search_query.trim().to_string();
        if query.is_empty() {
            if self.state.search_active {
                self.restore_paginated();
                self.publish();
            }
            return;
        }

        self.state.search_active = true;
        self.search_by_name(&query);
        self.publish();
    }

    /// Tear down the session: abort outstanding fetches and ignore any
    /// completion that still arrives.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.abort_page();
        self.abort_search();
        tracing::debug!(offset = self.offset, "List controller closed");
    }

    /// Feed a fetch completion back into the controller.
    ///
    /// Returns `true` if the event was accepted and a new snapshot published;
    /// `false` if it was stale or the controller is closed.
    pub fn apply(&mut self, event: ListEvent) -> bool {
        if self.closed {
            tracing::debug!("Ignoring completion for closed list controller");
            return false;
        }

        match event {
            ListEvent::PageLoaded {
                kind,
                generation,
                result,
            } => {
                if generation != self.page_generation || self.page_in_flight != Some(kind) {
                    tracing::debug!(
                        ?kind,
                        generation,
                        expected = self.page_generation,
                        "Discarding stale page result"
                    );
                    return false;
                }
                self.page_in_flight = None;
                self.page_handle = None;
                self.finish_page(kind, result);
            }
            ListEvent::SearchCompleted {
                query,
                generation,
                result,
            } => {
                if generation != self.search_generation || !self.search_in_flight {
                    tracing::debug!(
                        query = %query,
                        generation,
                        expected = self.search_generation,
                        "Discarding stale search result"
                    );
                    return false;
                }
                self.search_in_flight = false;
                self.search_handle = None;
                self.finish_search(&query, result);
            }
        }

        self.sync_loading_flags();
        self.publish();
        true
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Returns `false` when the idempotence guard short-circuits.
    fn begin_initial_load(&mut self) -> bool {
        if !self.accumulated.is_empty() && self.offset > 0 && !self.fetch_in_progress() {
            tracing::trace!(offset = self.offset, "Initial page already loaded");
            return false;
        }

        self.offset = 0;
        self.accumulated = Arc::new(Vec::new());
        if self.state.search_active {
            self.abort_search();
            self.state.search_active = false;
        }
        self.fetch_page(PageKind::Initial);
        true
    }

    fn fetch_page(&mut self, kind: PageKind) {
        if self.state.search_active {
            return;
        }

        self.abort_page();
        self.page_generation = self.page_generation.wrapping_add(1);
        let generation = self.page_generation;
        self.page_in_flight = Some(kind);

        if kind == PageKind::Initial && self.accumulated.is_empty() {
            self.state.items = Arc::new(Vec::new());
        }
        self.state.error = None;
        self.sync_loading_flags();

        let catalog = Arc::clone(&self.catalog);
        let tx = self.events.clone();
        let (limit, offset) = (self.page_size, self.offset);
        tracing::debug!(?kind, limit, offset, generation, "Fetching page");

        self.page_handle = Some(tokio::spawn(async move {
            let result = fetch_page_with_details(catalog.as_ref(), limit, offset).await;
            let event = ListEvent::PageLoaded {
                kind,
                generation,
                result,
            };
            if tx.send(event).await.is_err() {
                tracing::debug!(generation, "List event receiver dropped before page completed");
            }
        }));
    }

    fn finish_page(&mut self, kind: PageKind, result: Result<DetailedPage, ApiError>) {
        // A page that lands while a search result is shown still extends the
        // accumulated collection, but the displayed fields stay on the search.
        let displayed = !self.state.search_active;

        match result {
            Ok(page) => {
                let received = page.items.len();
                if received > 0 {
                    if kind == PageKind::Initial {
                        self.accumulated = Arc::new(page.items);
                    } else {
                        // A dropped entry leaves the offset short, so the next
                        // page can overlap entries already held.
                        let held: HashSet<u32> = self.accumulated.iter().map(|i| i.id).collect();
                        let fresh: Vec<Item> = page
                            .items
                            .into_iter()
                            .filter(|item| !held.contains(&item.id))
                            .collect();
                        if fresh.len() < received {
                            tracing::debug!(
                                skipped = received - fresh.len(),
                                "Skipped entries already in the list"
                            );
                        }
                        Arc::make_mut(&mut self.accumulated).extend(fresh);
                    }
                    self.offset += received;
                    if displayed {
                        self.state.items = Arc::clone(&self.accumulated);
                    }
                } else if kind == PageKind::Initial && displayed {
                    self.state.items = Arc::new(Vec::new());
                }

                let can_load_more = page.has_more && received > 0;
                self.last_known_can_load_more = can_load_more;
                if displayed {
                    self.state.can_load_more = can_load_more;
                }
                tracing::debug!(
                    ?kind,
                    received,
                    offset = self.offset,
                    can_load_more,
                    "Page applied"
                );
            }
            Err(e) => {
                tracing::warn!(?kind, offset = self.offset, error = %e, "Page fetch failed");
                if kind == PageKind::Initial {
                    self.accumulated = Arc::new(Vec::new());
                    if displayed {
                        self.state.items = Arc::new(Vec::new());
                    }
                }
                self.last_known_can_load_more = false;
                if displayed {
                    self.state.error = Some(describe_failure(&e, LOAD_FAILED_MESSAGE));
                    self.state.can_load_more = false;
                }
            }
        }
    }

    fn search_by_name(&mut self, name: &str) {
        let name = name.trim().to_string();

        self.abort_search();
        self.search_generation = self.search_generation.wrapping_add(1);
        let generation = self.search_generation;
        self.search_in_flight = true;

        self.state.items = Arc::new(Vec::new());
        self.state.error = None;
        self.state.can_load_more = false;
        self.sync_loading_flags();

        let catalog = Arc::clone(&self.catalog);
        let tx = self.events.clone();
        tracing::debug!(query = %name, generation, "Searching by name");

        self.search_handle = Some(tokio::spawn(async move {
            let result = catalog.fetch_detail(&name).await;
            let event = ListEvent::SearchCompleted {
                query: name,
                generation,
                result,
            };
            if tx.send(event).await.is_err() {
                tracing::debug!(generation, "List event receiver dropped before search completed");
            }
        }));
    }

    fn finish_search(&mut self, query: &str, result: Result<Item, ApiError>) {
        match result {
            Ok(item) => {
                tracing::debug!(query = %query, id = item.id, "Search matched");
                self.state.items = Arc::new(vec![item]);
            }
            Err(e) if e.is_not_found() => {
                self.state.items = Arc::new(Vec::new());
                self.state.error = Some(format!("'{query}' not found."));
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Search failed");
                self.state.items = Arc::new(Vec::new());
                self.state.error = Some(format!(
                    "Failed to search for '{query}'. The service may be unavailable."
                ));
            }
        }
    }

    /// Leave search mode and show the accumulated pages again.
    fn restore_paginated(&mut self) {
        self.abort_search();
        self.state.search_active = false;
        self.state.items = Arc::clone(&self.accumulated);
        self.state.error = None;
        self.state.can_load_more = self.last_known_can_load_more;

        if self.accumulated.is_empty() && self.last_known_can_load_more {
            tracing::debug!("Nothing accumulated after clearing search; reloading first page");
            self.begin_initial_load();
        } else {
            self.sync_loading_flags();
        }
    }

    fn fetch_in_progress(&self) -> bool {
        self.page_in_flight.is_some() || self.search_in_flight
    }

    /// Derive the two loading flags from what is in flight. A page fetch that
    /// runs underneath an active search is not reported.
    fn sync_loading_flags(&mut self) {
        let paging = !self.state.search_active;
        self.state.is_loading =
            self.search_in_flight || (paging && self.page_in_flight == Some(PageKind::Initial));
        self.state.is_loading_more = paging && self.page_in_flight == Some(PageKind::More);
    }

    fn abort_page(&mut self) {
        if let Some(handle) = self.page_handle.take() {
            handle.abort();
            tracing::trace!(generation = self.page_generation, "Aborted page fetch");
        }
        if self.page_in_flight.take().is_some() {
            self.page_generation = self.page_generation.wrapping_add(1);
        }
    }

    fn abort_search(&mut self) {
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
            tracing::trace!(generation = self.search_generation, "Aborted search");
        }
        if self.search_in_flight {
            self.search_in_flight = false;
            self.search_generation = self.search_generation.wrapping_add(1);
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}

impl Drop for ListController {
    fn drop(&mut self) {
        if let Some(handle) = self.page_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.search_handle.take() {
            handle.abort();
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Error text for the snapshot, falling back when the error has nothing to say.
pub(crate) fn describe_failure(err: &ApiError, fallback: &str) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

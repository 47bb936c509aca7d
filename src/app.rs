use pokedex::catalog::{Catalog, Item};
use pokedex::detail::{DetailController, DetailEvent};
use pokedex::list::{ListController, ListEvent};
use ratatui::widgets::ListState;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Rows from the end of the list at which the next page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

/// Loading spinner animation frames.
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

// ============================================================================
// View
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,   // Search bar + paginated list
    Detail, // Full-screen entry detail
}

// ============================================================================
// App State
// ============================================================================

/// Terminal session state.
///
/// Owns both controllers; everything it renders comes from their snapshots.
pub struct App {
    pub view: View,
    pub list: ListController,
    pub detail: DetailController,

    /// Index into the list snapshot's items.
    pub selected: usize,
    /// Id of the selected entry, so selection survives list replacement.
    selected_id: Option<u32>,
    /// Scroll state for the list widget, kept across frames.
    pub list_state: ListState,

    /// Keystrokes go to the search field.
    pub search_editing: bool,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    /// Create the session and start loading the first page.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        page_size: usize,
        list_tx: mpsc::Sender<ListEvent>,
        detail_tx: mpsc::Sender<DetailEvent>,
    ) -> Self {
        let list = ListController::start(Arc::clone(&catalog), page_size, list_tx);
        let detail = DetailController::new(catalog, detail_tx);

        Self {
            view: View::List,
            list,
            detail,
            selected: 0,
            selected_id: None,
            list_state: ListState::default(),
            search_editing: false,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.list.snapshot().items
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.items().get(self.selected)
    }

    /// Something the user is waiting on is in flight.
    pub fn is_busy(&self) -> bool {
        let list = self.list.snapshot();
        match self.view {
            View::List => list.is_loading || list.is_loading_more,
            View::Detail => self.detail.snapshot().is_loading,
        }
    }

    pub fn spinner(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn advance_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn nav_up(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn nav_down(&mut self) {
        let len = self.items().len();
        if len == 0 {
            return;
        }
        self.select(self.selected.saturating_add(1).min(len - 1));
        self.maybe_load_more();
    }

    pub fn nav_top(&mut self) {
        self.select(0);
    }

    pub fn nav_bottom(&mut self) {
        let len = self.items().len();
        self.select(len.saturating_sub(1));
        self.maybe_load_more();
    }

    fn select(&mut self, index: usize) {
        self.selected = index;
        self.selected_id = self.selected_item().map(|i| i.id);
    }

    /// Request the next page once the selection is near the end.
    pub fn maybe_load_more(&mut self) {
        let len = self.items().len();
        if len > 0 && len - 1 - self.selected.min(len - 1) < LOAD_MORE_THRESHOLD {
            self.list.load_more();
        }
    }

    /// Re-pin the selection after the list snapshot changed.
    ///
    /// Keeps the same entry selected when it is still present; otherwise
    /// clamps the index into range.
    pub fn sync_selection(&mut self) {
        let position = self
            .selected_id
            .and_then(|id| self.items().iter().position(|i| i.id == id));
        let len = self.items().len();

        self.selected = match position {
            Some(index) => index,
            None => self.selected.min(len.saturating_sub(1)),
        };
        self.selected_id = self.selected_item().map(|i| i.id);
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// Open the detail view for the selected entry.
    pub fn open_detail(&mut self) {
        let Some(name) = self.selected_item().map(|i| i.name.clone()) else {
            return;
        };
        self.view = View::Detail;
        self.detail.load(&name);
    }

    pub fn close_detail(&mut self) {
        self.view = View::List;
    }

    /// Entry to show in the detail view: the fetched one once it matches the
    /// requested name, otherwise the list copy while the fetch is running.
    pub fn detail_item(&self) -> Option<&Item> {
        let snapshot = self.detail.snapshot();
        snapshot
            .item
            .as_ref()
            .filter(|item| item.name == snapshot.name)
            .or_else(|| self.items().iter().find(|i| i.name == snapshot.name))
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (expires after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    /// Abort outstanding fetches; called once the event loop exits.
    pub fn shutdown(&mut self) {
        self.list.close();
        self.detail.close();
    }
}

// ============================================================================
// Tests
// ============================================================================

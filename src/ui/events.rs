//! Controller completion handling.
//!
//! Completions from spawned fetches are fed back into their controller here,
//! on the event loop's task, and the view state is re-synced.

use crate::app::App;
use pokedex::detail::DetailEvent;
use pokedex::list::ListEvent;

/// Apply a list completion. Returns true if a redraw is needed.
pub(super) fn handle_list_event(app: &mut App, event: ListEvent) -> bool {
    if !app.list.apply(event) {
        return false;
    }
    app.sync_selection();

    let snapshot = app.list.snapshot();
    tracing::trace!(
        items = snapshot.items.len(),
        search_active = snapshot.search_active,
        can_load_more = snapshot.can_load_more,
        "List snapshot updated"
    );

    // A short first page may not fill the screen; keep paging while the
    // selection is already near the end.
    if !snapshot.search_active && snapshot.error.is_none() {
        app.maybe_load_more();
    }
    true
}

/// Apply a detail completion. Returns true if a redraw is needed.
pub(super) fn handle_detail_event(app: &mut App, event: DetailEvent) -> bool {
    app.detail.apply(event)
}

//! Input handling for the TUI.
//!
//! Routes key presses by mode: search editing first, then the active view.

use crate::app::{App, View};
use crossterm::event::{KeyCode, KeyModifiers};
use pokedex::util::{validate_url_for_open, MAX_SEARCH_QUERY_LENGTH};

use super::loop_runner::Action;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if app.search_editing {
        handle_search_input(app, code);
        return Action::Continue;
    }

    match app.view {
        View::List => handle_list_input(app, code),
        View::Detail => handle_detail_input(app, code),
    }
}

/// Keys while the search field has focus.
///
/// Every edit is forwarded to the list controller; clearing the field while
/// a search is shown restores the paginated list immediately.
fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.search_editing = false;
        }
        KeyCode::Enter => {
            app.search_editing = false;
            app.list.confirm_search();
            app.sync_selection();
        }
        KeyCode::Backspace => {
            let mut query = app.list.snapshot().search_query.clone();
            query.pop();
            app.list.on_search_query_changed(query);
            app.sync_selection();
        }
        KeyCode::Char(c) => {
            let query = &app.list.snapshot().search_query;
            if query.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
                app.set_status(format!(
                    "Search query at max length ({} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
                return;
            }
            let mut query = query.clone();
            query.push(c);
            app.list.on_search_query_changed(query);
        }
        _ => {}
    }
}

fn handle_list_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('/') => app.search_editing = true,
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char('g') | KeyCode::Home => app.nav_top(),
        KeyCode::Char('G') | KeyCode::End => app.nav_bottom(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('r') => {
            app.list.load_initial();
            app.sync_selection();
        }
        KeyCode::Esc => {
            // Leave an active search without re-entering the field
            if app.list.snapshot().search_active {
                app.list.on_search_query_changed(String::new());
                app.sync_selection();
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_detail_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('b') | KeyCode::Esc | KeyCode::Backspace => app.close_detail(),
        KeyCode::Char('o') => open_artwork(app),
        KeyCode::Char('r') => {
            let name = app.detail.snapshot().name.clone();
            if !name.is_empty() {
                app.detail.load(&name);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Hand the preferred image of the shown entry to the system opener.
fn open_artwork(app: &mut App) {
    let Some(url) = app.detail_item().and_then(|i| i.image_url()).map(str::to_owned) else {
        app.set_status("No artwork for this entry");
        return;
    };

    // Validate before open::that() so only public http(s) links reach the opener
    if let Err(e) = validate_url_for_open(&url) {
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
    } else {
        app.set_status("Opening artwork...");
    }
}

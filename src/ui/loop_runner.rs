//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, controller completions and a periodic tick.

use crate::app::App;
use anyhow::Result;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use pokedex::detail::DetailEvent;
use pokedex::list::ListEvent;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::{handle_detail_event, handle_list_event};
use super::input::handle_input;
use super::render::render;

/// Result of handling a key press.
pub(super) enum Action {
    Continue,
    Quit,
}

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// Uses `tokio::select!` over, in priority order:
/// - **Signals**: SIGTERM / SIGINT end the session
/// - **Terminal input**: crossterm's async event stream
/// - **List completions**: page and search results from [`pokedex::list::ListController`]
/// - **Detail completions**: results from [`pokedex::detail::DetailController`]
/// - **Tick**: 250ms timer for status expiry and the spinner
///
/// A panic hook restores the terminal before unwinding.
pub async fn run(
    app: &mut App,
    mut list_rx: mpsc::Receiver<ListEvent>,
    mut detail_rx: mpsc::Receiver<DetailEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    let outcome: Result<()> = loop {
        if app.needs_redraw {
            if let Err(e) = terminal.draw(|f| render(f, app)) {
                break Err(e.into());
            }
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain completions before waiting on input so results are not
        // starved by fast typing.
        while let Ok(event) = list_rx.try_recv() {
            app.needs_redraw |= handle_list_event(app, event);
        }
        while let Ok(event) = detail_rx.try_recv() {
            app.needs_redraw |= handle_detail_event(app, event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down");
                break Ok(());
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down");
                break Ok(());
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        if let Action::Quit = handle_input(app, key.code, key.modifiers) {
                            break Ok(());
                        }
                    }
                    Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                }
            }

            Some(event) = list_rx.recv() => {
                app.needs_redraw |= handle_list_event(app, event);
            }

            Some(event) = detail_rx.recv() => {
                app.needs_redraw |= handle_detail_event(app, event);
            }

            _ = tick_interval.tick() => {
                if app.is_busy() {
                    app.advance_spinner();
                    app.needs_redraw = true;
                }
            }
        }
    };

    app.shutdown();
    restore_terminal(terminal)?;
    outcome
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

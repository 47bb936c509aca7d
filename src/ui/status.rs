use crate::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        match app.view {
            View::List if app.search_editing => {
                Cow::Borrowed("Type a name | ENTER search | ESC done")
            }
            View::List => {
                let snapshot = app.list.snapshot();
                let hints = "[/]search [j/k]move [Enter]details [r]eload [q]uit";
                if snapshot.search_active {
                    Cow::Owned(format!("{hints} [Esc]clear search"))
                } else if snapshot.can_load_more {
                    Cow::Owned(format!("{hints} | {} loaded", app.list.offset()))
                } else {
                    Cow::Owned(format!("{hints} | {} loaded, end of list", app.list.offset()))
                }
            }
            View::Detail => Cow::Borrowed("[b]ack [o]pen artwork [r]eload [q]uit"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}

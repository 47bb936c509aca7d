use crate::app::App;
use pokedex::catalog::Item;
use pokedex::util::{pad_to_width, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Shown when there is nothing to list and nothing went wrong.
pub const EMPTY_STATE_MESSAGE: &str = "No Pokémon found.";

/// Width of the name column in list rows.
const NAME_COLUMN: usize = 18;

/// Render the search field.
pub fn render_search_bar(f: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.list.snapshot();

    let (border_style, cursor) = if app.search_editing {
        (Style::default().fg(Color::Cyan), "_")
    } else {
        (Style::default(), "")
    };
    let title = if snapshot.search_active {
        "Search (Esc clears)"
    } else {
        "Search"
    };

    let query = strip_control_chars(&snapshot.search_query);
    let paragraph = Paragraph::new(format!("{}{}", query, cursor)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);
}

/// Render the list panel.
///
/// Precedence: spinner while the first results load, then the error, then
/// the entries, then the empty-state message. A failed follow-up page keeps
/// the entries visible with the error underneath.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let snapshot = app.list.snapshot();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Pokédex ({})", snapshot.items.len()));

    if snapshot.is_loading && snapshot.items.is_empty() {
        let text = format!("{} Loading...", app.spinner());
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    if snapshot.items.is_empty() {
        let paragraph = match &snapshot.error {
            Some(error) => Paragraph::new(strip_control_chars(error).into_owned())
                .style(Style::default().fg(Color::Red)),
            None => Paragraph::new(EMPTY_STATE_MESSAGE).style(Style::default().fg(Color::Gray)),
        };
        f.render_widget(
            paragraph
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let footer: Option<Line> = if let Some(error) = &snapshot.error {
        Some(Line::from(Span::styled(
            strip_control_chars(error).into_owned(),
            Style::default().fg(Color::Red),
        )))
    } else if snapshot.is_loading_more {
        Some(Line::from(Span::styled(
            format!("{} Loading more...", app.spinner()),
            Style::default().fg(Color::DarkGray),
        )))
    } else {
        None
    };

    let (list_area, footer_area) = if footer.is_some() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let row_width = list_area.width.saturating_sub(2) as usize;
    let rows: Vec<ListItem> = snapshot
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(row_text(item, row_width), style)))
        })
        .collect();

    app.list_state.select(Some(app.selected));
    f.render_stateful_widget(List::new(rows).block(block), list_area, &mut app.list_state);

    if let (Some(line), Some(footer_area)) = (footer, footer_area) {
        let inner = Rect {
            x: footer_area.x.saturating_add(1),
            width: footer_area.width.saturating_sub(2),
            ..footer_area
        };
        f.render_widget(Paragraph::new(line), inner);
    }
}

/// `#025  Pikachu            Electric`, cut to `width` columns.
fn row_text(item: &Item, width: usize) -> String {
    let name = strip_control_chars(&item.display_name()).into_owned();
    let name = pad_to_width(&truncate_to_width(&name, NAME_COLUMN), NAME_COLUMN);
    let line = format!("#{:03}  {}  {}", item.id, name, item.type_names().join("/"));
    truncate_to_width(&line, width).into_owned()
}

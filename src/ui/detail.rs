use crate::app::App;
use pokedex::catalog::{capitalize, Item, StatEntry};
use pokedex::util::strip_control_chars;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Highest base stat in the catalog; bars are scaled against it.
const MAX_BASE_STAT: u32 = 255;
const STAT_LABEL_WIDTH: usize = 16;
const STAT_BAR_WIDTH: usize = 30;

/// Render the detail view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let snapshot = app.detail.snapshot();
    let title = capitalize(&strip_control_chars(&snapshot.name));
    let block = Block::default().borders(Borders::ALL).title(title);

    let Some(item) = app.detail_item() else {
        let paragraph = match &snapshot.error {
            Some(error) => Paragraph::new(strip_control_chars(error).into_owned())
                .style(Style::default().fg(Color::Red)),
            None => Paragraph::new(format!("{} Loading...", app.spinner())),
        };
        f.render_widget(paragraph.block(block).alignment(Alignment::Center), area);
        return;
    };

    let mut lines = detail_lines(item);
    if snapshot.is_loading {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} Refreshing...", app.spinner()),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if let Some(error) = &snapshot.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            strip_control_chars(error).into_owned(),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn detail_lines(item: &Item) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let name = strip_control_chars(&item.display_name()).into_owned();

    let mut lines = vec![
        Line::from(Span::styled(
            format!("#{:03} {}", item.id, name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Height  ", label),
            Span::raw(format!("{:.1} m", item.height_m())),
        ]),
        Line::from(vec![
            Span::styled("Weight  ", label),
            Span::raw(format!("{:.1} kg", item.weight_kg())),
        ]),
        Line::from(vec![
            Span::styled("Types   ", label),
            Span::raw(item.type_names().join(", ")),
        ]),
    ];

    if !item.stats.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Base stats",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(item.stats.iter().map(stat_line));
    }

    lines.push(Line::from(""));
    match item.image_url() {
        Some(url) => lines.push(Line::from(vec![
            Span::styled("Artwork ", label),
            Span::raw(strip_control_chars(url).into_owned()),
            Span::styled("  [o]pen", label),
        ])),
        None => lines.push(Line::from(Span::styled("No artwork", label))),
    }
    lines
}

fn stat_line(stat: &StatEntry) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!(
            "{:<width$} {:>3} ",
            stat_label(&stat.name),
            stat.base_stat,
            width = STAT_LABEL_WIDTH
        )),
        Span::styled(stat_bar(stat.base_stat), Style::default().fg(Color::Green)),
    ])
}

/// "special-attack" → "Special attack"
fn stat_label(name: &str) -> String {
    capitalize(&strip_control_chars(name).replace('-', " "))
}

fn stat_bar(base: u32) -> String {
    let filled = (base.min(MAX_BASE_STAT) as usize * STAT_BAR_WIDTH).div_ceil(MAX_BASE_STAT as usize);
    "█".repeat(filled)
}

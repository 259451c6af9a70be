//! Layout rendering (top bar, surah navbar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, NavbarInfo, UiState};
use super::utils::{language_name, verse_count_label};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(16), // Language
        ])
        .split(area);

    let is_focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Type / to search surahs..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if is_focused {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    render_language(frame, chunks[1], ui_state);
}

/// Surah header with the back action, shown above the verse list
pub fn render_navbar(frame: &mut Frame, area: Rect, navbar: &NavbarInfo, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(16)])
        .split(area);

    let mut spans = vec![
        Span::styled("← Back (Esc)", Style::default().fg(Color::DarkGray)),
        Span::raw("   "),
        Span::styled(
            navbar.title(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(revelation) = &navbar.revelation {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(revelation.clone(), Style::default().fg(Color::Cyan)));
    }
    if let Some(count) = navbar.verse_count {
        spans.push(Span::styled(
            format!(" · {}", verse_count_label(count, ui_state.language)),
            Style::default().fg(Color::Cyan),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Surah ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(header, chunks[0]);

    render_language(frame, chunks[1], ui_state);
}

fn render_language(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let language = Paragraph::new(language_name(ui_state.language))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Lang (i) "));
    frame.render_widget(language, area);
}

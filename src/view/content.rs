//! Main content area rendering (surah list, verse list, status views)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{
    ayah_items, ActiveSection, AyahItem, ContentState, ContentView, PlaybackInfo, PlaybackState,
    SurahDetail, SurahItem, SurahSummary, UiState,
};
use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    playback: &PlaybackInfo,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    match &content_state.view {
        ContentView::Loading => {
            render_message(frame, area, "Loading...", Color::Yellow, border_style);
        }
        ContentView::NotFound => {
            render_message(
                frame,
                area,
                "Surah not found. Surah numbers go from 1 to 114.\n\nPress Esc to go back to the list",
                Color::Yellow,
                border_style,
            );
        }
        ContentView::Failed => {
            render_message(
                frame,
                area,
                "Something went wrong while loading.\n\nPress Esc to go back to the list",
                Color::Red,
                border_style,
            );
        }
        ContentView::SurahList { surahs, visible, selected_index } => {
            render_surah_list(frame, area, ui_state, surahs, visible, *selected_index, is_focused);
        }
        ContentView::SurahDetail { detail, selected_index } => {
            render_surah_detail(frame, area, ui_state, detail, *selected_index, playback);
        }
    }
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, color: Color, border_style: Style) {
    let message = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Content ")
                .padding(Padding::horizontal(1))
                .border_style(border_style),
        );
    frame.render_widget(message, area);
}

fn render_surah_list(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    surahs: &[SurahSummary],
    visible: &[usize],
    selected_index: usize,
    is_focused: bool,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Surahs ({}) ", visible.len()))
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    if visible.is_empty() {
        let empty = Paragraph::new(format!("  No surah matches \"{}\"", ui_state.search_query))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(surahs.len());
    let revelation_width = 11;
    let badge_width = 7;
    let fixed_width = 1 + num_width + 3 + 3 + 3 + revelation_width + 3 + badge_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let name_width = (remaining_width * 50) / 100;
    let translation_width = remaining_width.saturating_sub(name_width);

    let mut items = vec![ListItem::new(format!(
        " {:<num_width$}   {:<name_width$}   {:<translation_width$}   {:<revelation_width$}   {}",
        "#", "Surah", "Meaning", "Type", "Verses",
    ))
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))];

    items.extend(
        visible
            .iter()
            .filter_map(|&i| surahs.get(i))
            .enumerate()
            .map(|(row, surah)| {
                let item = SurahItem::from_summary(surah, ui_state.language);
                let style = if row == selected_index && is_focused {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else if row == selected_index {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(format!(
                    " {:<num_width$}   {}   {}   {}   {}",
                    item.number,
                    truncate_string(&item.name, name_width),
                    truncate_string(&item.translation, translation_width),
                    truncate_string(&item.revelation, revelation_width),
                    item.badge,
                ))
                .style(style)
            }),
    );

    // +1 for header row
    render_scrollable_list(frame, area, items, selected_index + 1, block);
}

fn render_surah_detail(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    detail: &SurahDetail,
    selected_index: usize,
    playback: &PlaybackInfo,
) {
    let play_control = ui_state.display.play_control;

    let items: Vec<ListItem> = ayah_items(detail, ui_state.language)
        .into_iter()
        .enumerate()
        .map(|(row, item)| {
            let is_selected = row == selected_index;
            match item {
                AyahItem::Preamble { arabic, read, translation } => {
                    let style = if is_selected {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(vec![
                        Line::from(arabic).right_aligned(),
                        Line::from(Span::styled(read, Style::default().fg(Color::DarkGray))),
                        Line::from(translation),
                        Line::default(),
                    ])
                    .style(style)
                }
                AyahItem::Verse { position, badge, arabic, read, translation } => {
                    let is_active = playback.active_verse == Some(position);
                    let playing = playback.state == PlaybackState::Playing(position);
                    let style = if is_active {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else if is_selected {
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let marker = if is_selected { "›" } else { " " };
                    ListItem::new(vec![
                        Line::from(vec![
                            Span::raw(format!("{} ", marker)),
                            Span::styled(
                                format!("{} ", play_control.label(playing)),
                                Style::default().fg(Color::Green),
                            ),
                            Span::styled(badge, Style::default().fg(Color::Yellow)),
                        ]),
                        Line::from(arabic).right_aligned(),
                        Line::from(Span::styled(read, Style::default().fg(Color::DarkGray))),
                        Line::from(translation),
                        Line::default(),
                    ])
                    .style(style)
                }
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", detail.asma.long(ui_state.language)))
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green));

    render_scrollable_list(frame, area, items, selected_index, block);
}

//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, surah navbar)
//! - `content`: Main content area rendering
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{ContentState, ContentView, NavbarInfo, PlaybackInfo, UiState};

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, content_state: &ContentState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar or surah navbar
                Constraint::Min(0),    // Main content
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        // Top: navbar for an opened surah, search everywhere else
        match &content_state.view {
            ContentView::SurahDetail { detail, .. } => {
                let navbar = NavbarInfo::from_detail(detail, ui_state.language, ui_state.display.navbar);
                layout::render_navbar(frame, chunks[0], &navbar, ui_state);
            }
            _ => layout::render_top_bar(frame, chunks[0], ui_state),
        }

        content::render_main_content(frame, chunks[1], ui_state, content_state, playback);

        // Bottom: Progress bar with verse info and volume
        progress::render_progress_bar(frame, chunks[2], playback);

        // Error notification overlay (if there's an error)
        if ui_state.error_message.is_some() {
            overlays::render_error_notification(frame, ui_state);
        }

        // Help popup overlay (if open)
        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}

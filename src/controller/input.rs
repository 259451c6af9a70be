//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, ContentView};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error().await;
            }
            return Ok(());
        }

        if model.is_help_popup_open().await {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                model.hide_help_popup().await;
            }
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;
        let is_list = matches!(model.get_content_state().await.view, ContentView::SurahList { .. });
        let is_detail = model.is_detail_view().await;

        // Search input on the list view
        if is_list && ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab | KeyCode::BackTab => {
                    model.cycle_section().await;
                    return Ok(());
                }
                KeyCode::Enter | KeyCode::Down => {
                    model.set_active_section(ActiveSection::MainContent).await;
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.update_search_query(String::new()).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Up => {
                model.content_move_up().await;
                return Ok(());
            }
            KeyCode::Down => {
                model.content_move_down().await;
                return Ok(());
            }
            KeyCode::Tab | KeyCode::BackTab if is_list => {
                model.cycle_section().await;
                return Ok(());
            }
            KeyCode::Char('/') | KeyCode::Char('g') | KeyCode::Char('G') if is_list => {
                model.set_active_section(ActiveSection::Search).await;
                return Ok(());
            }
            KeyCode::Enter if is_list => {
                drop(model);
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.open_selected_surah().await;
                });
                return Ok(());
            }
            KeyCode::Enter if is_detail => {
                drop(model);
                self.play_selected_verse().await;
                return Ok(());
            }
            KeyCode::Char(' ') if is_detail => {
                drop(model);
                self.toggle_playback().await;
                return Ok(());
            }
            KeyCode::Backspace | KeyCode::Esc if !is_list => {
                drop(model);
                let controller = self.clone();
                tokio::spawn(async move {
                    controller.navigate_back().await;
                });
                return Ok(());
            }
            _ => {}
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                match model.toggle_language().await {
                    Ok(language) => tracing::info!(language = language.code(), "Language changed"),
                    Err(e) => {
                        tracing::error!(error = %e, "Could not save language preference");
                        model.set_error(e.user_message()).await;
                    }
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(model);
                self.volume_up().await;
            }
            KeyCode::Char('-') => {
                drop(model);
                self.volume_down().await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}

//! Main application model with state management

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::audio::{LoadId, PlayerEvent};
use crate::config::DisplayConfig;
use crate::error::{AppError, AppResult};
use super::content::{filter_surahs, verse_at_row, verse_row, ContentState, ContentView};
use super::playback::{AudioCommand, AudioSource, PlaybackInfo, PlaybackState, PlaybackTiming, PlaybackTracker};
use super::preferences::{Language, Preferences};
use super::quran::{SurahDetail, SurahSummary};
use super::quran_client::QuranClient;
use super::types::{ActiveSection, UiState};

const VOLUME_STEP: u8 = 5;

/// Main application model containing all state
pub struct AppModel {
    pub client: Option<QuranClient>,
    preferences: Option<Preferences>,
    tracker: Arc<Mutex<Option<PlaybackTracker>>>,
    playback_timing: Arc<Mutex<PlaybackTiming>>,
    volume: Arc<Mutex<u8>>,
    pub ui_state: Arc<Mutex<UiState>>,
    pub content_state: Arc<Mutex<ContentState>>,
    pub should_quit: Arc<Mutex<bool>>,
}

impl AppModel {
    pub fn new(display: DisplayConfig, language: Language) -> Self {
        let ui_state = UiState {
            display,
            language,
            ..UiState::default()
        };
        Self {
            client: None,
            preferences: None,
            tracker: Arc::new(Mutex::new(None)),
            playback_timing: Arc::new(Mutex::new(PlaybackTiming::default())),
            volume: Arc::new(Mutex::new(PlaybackInfo::default().volume)),
            ui_state: Arc::new(Mutex::new(ui_state)),
            content_state: Arc::new(Mutex::new(ContentState::default())),
            should_quit: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_client(&mut self, client: QuranClient) {
        self.client = Some(client);
    }

    pub async fn get_client(&self) -> Option<QuranClient> {
        self.client.clone()
    }

    pub fn set_preferences(&mut self, preferences: Preferences) {
        self.preferences = Some(preferences);
    }

    pub async fn should_quit(&self) -> bool {
        *self.should_quit.lock().await
    }

    pub async fn set_should_quit(&self, quit: bool) {
        *self.should_quit.lock().await = quit;
    }

    // ========================================================================
    // UI state
    // ========================================================================

    pub async fn get_ui_state(&self) -> UiState {
        self.ui_state.lock().await.clone()
    }

    pub async fn cycle_section(&self) {
        let mut state = self.ui_state.lock().await;
        state.active_section = state.active_section.next();
    }

    pub async fn set_active_section(&self, section: ActiveSection) {
        self.ui_state.lock().await.active_section = section;
    }

    pub async fn language(&self) -> Language {
        self.ui_state.lock().await.language
    }

    /// Switch language, re-filter the list and persist the choice
    pub async fn toggle_language(&self) -> AppResult<Language> {
        let (language, query) = {
            let mut state = self.ui_state.lock().await;
            state.language = state.language.toggle();
            (state.language, state.search_query.clone())
        };
        self.content_state.lock().await.view.refilter(&query, language);
        if let Some(prefs) = &self.preferences {
            prefs.set_language(language).await?;
        }
        Ok(language)
    }

    pub async fn update_search_query(&self, query: String) {
        let language = {
            let mut state = self.ui_state.lock().await;
            state.search_query = query.clone();
            state.language
        };
        self.content_state.lock().await.view.refilter(&query, language);
    }

    pub async fn append_to_search(&self, c: char) {
        let mut query = self.ui_state.lock().await.search_query.clone();
        query.push(c);
        self.update_search_query(query).await;
    }

    pub async fn backspace_search(&self) {
        let mut query = self.ui_state.lock().await.search_query.clone();
        query.pop();
        self.update_search_query(query).await;
    }

    pub async fn set_error(&self, message: String) {
        let mut state = self.ui_state.lock().await;
        state.error_message = Some(message);
        state.error_timestamp = Some(Instant::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.ui_state.lock().await;
        state.error_message = None;
        state.error_timestamp = None;
    }

    pub async fn has_error(&self) -> bool {
        self.ui_state.lock().await.error_message.is_some()
    }

    pub async fn auto_clear_old_errors(&self) {
        let mut state = self.ui_state.lock().await;
        if let Some(timestamp) = state.error_timestamp {
            if timestamp.elapsed().as_secs() > 5 {
                state.error_message = None;
                state.error_timestamp = None;
            }
        }
    }

    pub async fn show_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = true;
    }

    pub async fn hide_help_popup(&self) {
        self.ui_state.lock().await.show_help_popup = false;
    }

    pub async fn is_help_popup_open(&self) -> bool {
        self.ui_state.lock().await.show_help_popup
    }

    // ========================================================================
    // Content & routing
    // ========================================================================

    pub async fn get_content_state(&self) -> ContentState {
        self.content_state.lock().await.clone()
    }

    pub async fn is_detail_view(&self) -> bool {
        matches!(self.content_state.lock().await.view, ContentView::SurahDetail { .. })
    }

    /// Start a navigation: show the loading state and return the route token that
    /// the fetch result must present. The list view is kept for going back.
    pub async fn begin_route(&self) -> u64 {
        let mut state = self.content_state.lock().await;
        if matches!(state.view, ContentView::SurahList { .. }) {
            let previous = std::mem::replace(&mut state.view, ContentView::Loading);
            state.navigation_stack.push(previous);
        } else {
            state.view = ContentView::Loading;
        }
        state.route += 1;
        state.route
    }

    /// Replace the loading state with a result, unless the user navigated elsewhere meanwhile
    async fn finish_route(&self, route: u64, view: ContentView) -> bool {
        let mut state = self.content_state.lock().await;
        if state.route != route {
            tracing::debug!(route, current = state.route, "Dropping result for an abandoned route");
            return false;
        }
        state.view = view;
        true
    }

    pub async fn set_surah_list(&self, route: u64, surahs: Vec<SurahSummary>) -> bool {
        let (query, language) = {
            let state = self.ui_state.lock().await;
            (state.search_query.clone(), state.language)
        };
        self.finish_route(route, ContentView::surah_list(surahs, &query, language)).await
    }

    /// Show a surah and give it a fresh playback tracker
    pub async fn set_surah_detail(&self, route: u64, detail: SurahDetail) -> bool {
        let number = detail.number;
        let applied = self
            .finish_route(route, ContentView::SurahDetail { detail, selected_index: 0 })
            .await;
        if applied {
            *self.tracker.lock().await = Some(PlaybackTracker::new(number));
            self.playback_timing.lock().await.reset(0);
            self.set_active_section(ActiveSection::MainContent).await;
        }
        applied
    }

    pub async fn set_not_found(&self, route: u64) -> bool {
        self.finish_route(route, ContentView::NotFound).await
    }

    pub async fn set_failed(&self, route: u64) -> bool {
        self.finish_route(route, ContentView::Failed).await
    }

    /// Leave the current view. Returns the commands that silence playback and whether the
    /// list has to be fetched because there is nothing to go back to.
    pub async fn navigate_back(&self) -> (Vec<AudioCommand>, bool) {
        let commands = self.stop_playback().await;
        let mut state = self.content_state.lock().await;
        state.route += 1;
        let needs_list = match state.navigation_stack.pop() {
            Some(previous) => {
                state.view = previous;
                false
            }
            None => {
                state.view = ContentView::Loading;
                true
            }
        };
        drop(state);

        // The language may have changed while the detail was open
        let (query, language) = {
            let ui = self.ui_state.lock().await;
            (ui.search_query.clone(), ui.language)
        };
        let mut state = self.content_state.lock().await;
        if let ContentView::SurahList { surahs, visible, .. } = &mut state.view {
            *visible = filter_surahs(surahs, &query, language);
        }
        (commands, needs_list)
    }

    pub async fn content_move_up(&self) {
        self.content_state.lock().await.view.move_up();
    }

    pub async fn content_move_down(&self) {
        self.content_state.lock().await.view.move_down();
    }

    pub async fn get_selected_surah_number(&self) -> Option<u32> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::SurahList { surahs, visible, selected_index } => visible
                .get(*selected_index)
                .and_then(|&i| surahs.get(i))
                .map(|s| s.number),
            _ => None,
        }
    }

    pub async fn get_selected_verse(&self) -> Option<u32> {
        let state = self.content_state.lock().await;
        match &state.view {
            ContentView::SurahDetail { detail, selected_index } => verse_at_row(detail, *selected_index),
            _ => None,
        }
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Run a tracker transition against the opened surah
    async fn with_tracker<T>(
        &self,
        f: impl FnOnce(&mut PlaybackTracker, &SurahDetail) -> T,
    ) -> AppResult<T> {
        let mut content = self.content_state.lock().await;
        let mut tracker = self.tracker.lock().await;
        let (ContentView::SurahDetail { detail, selected_index }, Some(tracker)) =
            (&mut content.view, tracker.as_mut())
        else {
            return Err(AppError::MissingElement("surah detail"));
        };
        let result = f(tracker, detail);
        if let Some(position) = tracker.take_scroll_request() {
            if let Some(row) = verse_row(detail, position) {
                *selected_index = row;
            }
        }
        Ok(result)
    }

    /// The play control of verse `position` was pressed
    pub async fn click_verse(&self, position: u32) -> AppResult<Vec<AudioCommand>> {
        let commands = self.with_tracker(|t, d| t.click(position, d)).await??;
        self.sync_timing_with_commands(&commands).await;
        Ok(commands)
    }

    pub async fn toggle_playback(&self) -> AppResult<Vec<AudioCommand>> {
        let commands = self.with_tracker(|t, d| t.toggle(d)).await??;
        self.sync_timing_with_commands(&commands).await;
        Ok(commands)
    }

    pub async fn apply_player_event(&self, event: &PlayerEvent) -> Vec<AudioCommand> {
        let result = self
            .with_tracker(|t, d| {
                let relevant = t.pending_autoplay(event.load_id()).is_some();
                (relevant, t.on_event(event, d))
            })
            .await;
        let Ok((relevant, commands)) = result else {
            return Vec::new();
        };
        if relevant {
            let mut timing = self.playback_timing.lock().await;
            match event {
                PlayerEvent::Playing { position_ms, duration_ms, .. } => {
                    timing.duration_ms = *duration_ms;
                    timing.update_position(*position_ms, true);
                }
                PlayerEvent::Paused { position_ms, .. } => timing.update_position(*position_ms, false),
                PlayerEvent::PositionChanged { position_ms, .. } => timing.update_position(*position_ms, true),
                PlayerEvent::Ended { .. } | PlayerEvent::Failed { .. } => timing.reset(0),
                PlayerEvent::Loading { .. } => {}
            }
        }
        self.sync_timing_with_commands(&commands).await;
        commands
    }

    async fn sync_timing_with_commands(&self, commands: &[AudioCommand]) {
        if commands.iter().any(|c| matches!(c, AudioCommand::Load { .. })) {
            self.playback_timing.lock().await.reset(0);
        }
    }

    /// Drop the tracker of the opened surah, returning what silences the backend
    pub async fn stop_playback(&self) -> Vec<AudioCommand> {
        match self.tracker.lock().await.take() {
            Some(mut tracker) => tracker.stop(),
            None => Vec::new(),
        }
    }

    /// `Some(autoplay)` if the download for `id` is still wanted
    pub async fn pending_autoplay(&self, id: LoadId) -> Option<bool> {
        self.tracker.lock().await.as_ref().and_then(|t| t.pending_autoplay(id))
    }

    pub async fn get_playback_state(&self) -> PlaybackState {
        self.tracker
            .lock()
            .await
            .as_ref()
            .map(|t| t.state())
            .unwrap_or_default()
    }

    pub async fn get_active_marker(&self) -> Option<u32> {
        self.tracker.lock().await.as_ref().and_then(|t| t.active_marker())
    }

    pub async fn get_volume(&self) -> u8 {
        *self.volume.lock().await
    }

    pub async fn volume_up(&self) -> u8 {
        let mut volume = self.volume.lock().await;
        *volume = volume.saturating_add(VOLUME_STEP).min(100);
        *volume
    }

    pub async fn volume_down(&self) -> u8 {
        let mut volume = self.volume.lock().await;
        *volume = volume.saturating_sub(VOLUME_STEP);
        *volume
    }

    pub async fn get_playback_info(&self) -> PlaybackInfo {
        let volume = *self.volume.lock().await;
        let language = self.language().await;
        let content = self.content_state.lock().await;
        let tracker = self.tracker.lock().await;
        let timing = self.playback_timing.lock().await;

        let (Some(tracker), ContentView::SurahDetail { detail, .. }) = (tracker.as_ref(), &content.view) else {
            return PlaybackInfo {
                volume,
                ..PlaybackInfo::default()
            };
        };

        let name = detail.asma.short(language);
        let title = match (tracker.state().current_verse(), tracker.source()) {
            (Some(v), _) => detail
                .verse(v)
                .map(|verse| format!("{} {}", name, verse.badge()))
                .unwrap_or_else(|| name.to_string()),
            (None, AudioSource::FullSurah) if tracker.is_full_surah_playing() || timing.duration_ms > 0 => {
                format!("{} · Full recitation", name)
            }
            _ => String::new(),
        };

        PlaybackInfo {
            title,
            state: tracker.state(),
            active_verse: tracker.active_marker(),
            is_playing: tracker.is_audible(),
            progress_ms: timing.current_position_ms(),
            duration_ms: timing.duration_ms,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quran::fixtures::{al_fatihah, surah_list};

    fn model() -> AppModel {
        AppModel::new(DisplayConfig::default(), Language::Indonesian)
    }

    fn load_id(commands: &[AudioCommand]) -> LoadId {
        match commands {
            [AudioCommand::Load { id, .. }] | [AudioCommand::Stop, AudioCommand::Load { id, .. }] => *id,
            other => panic!("expected a load, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn al_fatihah_end_to_end() {
        let model = model();
        let route = model.begin_route().await;
        assert!(model.set_surah_detail(route, al_fatihah()).await);

        let content = model.get_content_state().await;
        assert_eq!(content.view.item_count(), 7);

        for _ in 0..6 {
            model.content_move_down().await;
        }
        assert_eq!(model.get_selected_verse().await, Some(7));

        let commands = model.click_verse(7).await.unwrap();
        let id = load_id(&commands);
        assert_eq!(model.get_playback_state().await, PlaybackState::Playing(7));

        model
            .apply_player_event(&PlayerEvent::Playing { id, position_ms: 0, duration_ms: 3000 })
            .await;
        assert_eq!(model.get_active_marker().await, Some(7));

        let commands = model.apply_player_event(&PlayerEvent::Ended { id }).await;
        assert!(commands.is_empty());
        assert_eq!(model.get_playback_state().await, PlaybackState::Idle);
        assert_eq!(model.get_active_marker().await, None);
    }

    #[tokio::test]
    async fn auto_advance_then_toggle_same_verse() {
        let model = model();
        let route = model.begin_route().await;
        model.set_surah_detail(route, al_fatihah()).await;

        let id = load_id(&model.click_verse(1).await.unwrap());
        model.apply_player_event(&PlayerEvent::Ended { id }).await;
        let next = model.get_playback_state().await;
        assert_eq!(next, PlaybackState::Playing(2));

        let commands = model.click_verse(2).await.unwrap();
        assert_eq!(commands, vec![AudioCommand::Pause]);
        let commands = model.click_verse(2).await.unwrap();
        assert_eq!(commands, vec![AudioCommand::Play]);

        let info = model.get_playback_info().await;
        assert_eq!(info.title, "Al-Fatihah 1:2");
        assert_eq!(info.active_verse, Some(2));
    }

    #[tokio::test]
    async fn scroll_follows_auto_advance() {
        let model = model();
        let route = model.begin_route().await;
        model.set_surah_detail(route, al_fatihah()).await;

        let first = load_id(&model.click_verse(3).await.unwrap());
        let second = load_id(&model.apply_player_event(&PlayerEvent::Ended { id: first }).await);
        model
            .apply_player_event(&PlayerEvent::Playing { id: second, position_ms: 0, duration_ms: 0 })
            .await;
        assert_eq!(model.get_selected_verse().await, Some(4));
    }

    #[tokio::test]
    async fn playback_without_detail_is_missing_element() {
        let model = model();
        let err = model.click_verse(1).await.unwrap_err();
        assert!(matches!(err, AppError::MissingElement(_)));
        assert!(model.apply_player_event(&PlayerEvent::Ended { id: LoadId::next() }).await.is_empty());
    }

    #[tokio::test]
    async fn late_results_for_abandoned_routes_are_dropped() {
        let model = model();
        let first = model.begin_route().await;
        let second = model.begin_route().await;
        assert!(!model.set_surah_detail(first, al_fatihah()).await);
        assert!(model.set_not_found(second).await);
        assert!(matches!(model.get_content_state().await.view, ContentView::NotFound));
    }

    #[tokio::test]
    async fn back_from_detail_restores_list_and_stops_audio() {
        let model = model();
        let route = model.begin_route().await;
        model.set_surah_list(route, surah_list()).await;

        let route = model.begin_route().await;
        model.set_surah_detail(route, al_fatihah()).await;
        model.click_verse(2).await.unwrap();

        let (commands, needs_list) = model.navigate_back().await;
        assert_eq!(commands, vec![AudioCommand::Stop]);
        assert!(!needs_list);
        assert!(matches!(model.get_content_state().await.view, ContentView::SurahList { .. }));
        assert_eq!(model.get_playback_state().await, PlaybackState::Idle);
    }

    #[tokio::test]
    async fn back_without_list_requests_one() {
        let model = model();
        let route = model.begin_route().await;
        model.set_not_found(route).await;
        let (commands, needs_list) = model.navigate_back().await;
        assert!(commands.is_empty());
        assert!(needs_list);
    }

    #[tokio::test]
    async fn search_filters_live() {
        let model = model();
        let route = model.begin_route().await;
        model.set_surah_list(route, surah_list()).await;

        for c in "ikhlas".chars() {
            model.append_to_search(c).await;
        }
        assert_eq!(model.get_selected_surah_number().await, Some(112));

        model.update_search_query("nothing like this".to_string()).await;
        assert_eq!(model.get_selected_surah_number().await, None);

        model.update_search_query(String::new()).await;
        assert_eq!(model.get_content_state().await.view.item_count(), 4);
    }

    #[tokio::test]
    async fn language_toggle_refilters_without_preferences() {
        let model = model();
        let route = model.begin_route().await;
        model.set_surah_list(route, surah_list()).await;
        model.update_search_query("faatiha".to_string()).await;
        assert_eq!(model.get_content_state().await.view.item_count(), 0);

        assert_eq!(model.toggle_language().await.unwrap(), Language::English);
        assert_eq!(model.get_selected_surah_number().await, Some(1));
    }

    #[tokio::test]
    async fn volume_is_bounded() {
        let model = model();
        for _ in 0..30 {
            model.volume_up().await;
        }
        assert_eq!(model.get_volume().await, 100);
        for _ in 0..30 {
            model.volume_down().await;
        }
        assert_eq!(model.get_volume().await, 0);
    }
}

//! Verse playback state and the transitions driven by clicks and player events

use std::time::Instant;

use crate::audio::{LoadId, PlayerEvent, DEFAULT_VOLUME_PERCENT};
use crate::error::{AppError, AppResult};
use super::quran::SurahDetail;

/// Which verse is selected and whether it is audible
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing(u32),
    Paused(u32),
}

impl PlaybackState {
    pub fn current_verse(self) -> Option<u32> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Playing(v) | PlaybackState::Paused(v) => Some(v),
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, PlaybackState::Playing(_))
    }
}

/// What the audio backend currently holds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioSource {
    FullSurah,
    Verse(u32),
}

/// Instructions for the audio backend; the tracker never touches the device itself
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioCommand {
    Load { id: LoadId, url: String, autoplay: bool },
    Play,
    Pause,
    Stop,
}

/// Owns the playback state of one opened surah.
///
/// Every transition updates the active marker before returning, so the marker is
/// `Some(v)` exactly when the state is `Playing(v)`.
#[derive(Clone, Debug)]
pub struct PlaybackTracker {
    surah: u32,
    state: PlaybackState,
    source: AudioSource,
    load_id: Option<LoadId>,
    full_playing: bool,
    active: Option<u32>,
    scroll_to: Option<u32>,
}

impl PlaybackTracker {
    /// The full-surah recitation is the default source until a verse is chosen
    pub fn new(surah: u32) -> Self {
        Self {
            surah,
            state: PlaybackState::Idle,
            source: AudioSource::FullSurah,
            load_id: None,
            full_playing: false,
            active: None,
            scroll_to: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn source(&self) -> AudioSource {
        self.source
    }

    pub fn active_marker(&self) -> Option<u32> {
        self.active
    }

    pub fn is_full_surah_playing(&self) -> bool {
        self.full_playing
    }

    /// Whether anything is audible right now
    pub fn is_audible(&self) -> bool {
        self.state.is_playing() || self.full_playing
    }

    /// Verse to scroll into view, set when playback of a verse is confirmed
    pub fn take_scroll_request(&mut self) -> Option<u32> {
        self.scroll_to.take()
    }

    /// The user pressed the play control of verse `position`
    pub fn click(&mut self, position: u32, detail: &SurahDetail) -> AppResult<Vec<AudioCommand>> {
        match self.state {
            PlaybackState::Playing(v) if v == position => {
                self.state = PlaybackState::Paused(v);
                self.active = None;
                Ok(vec![AudioCommand::Pause])
            }
            PlaybackState::Paused(v) if v == position => {
                self.state = PlaybackState::Playing(v);
                self.active = Some(v);
                Ok(vec![AudioCommand::Play])
            }
            _ => {
                let verse = detail
                    .verse(position)
                    .ok_or(AppError::MissingElement("verse"))?;
                let mut commands = self.silence_previous();
                commands.push(self.load_verse(position, verse.audio.url.clone()));
                Ok(commands)
            }
        }
    }

    /// Play/pause without pointing at a verse: toggles the current verse if there is one,
    /// otherwise the full-surah recitation
    pub fn toggle(&mut self, detail: &SurahDetail) -> AppResult<Vec<AudioCommand>> {
        if let Some(v) = self.state.current_verse() {
            return self.click(v, detail);
        }

        if self.source == AudioSource::FullSurah && self.load_id.is_some() {
            self.full_playing = !self.full_playing;
            return Ok(vec![if self.full_playing {
                AudioCommand::Play
            } else {
                AudioCommand::Pause
            }]);
        }

        if detail.recitation.full.is_empty() {
            return Err(AppError::MissingElement("full recitation"));
        }
        let mut commands = self.silence_previous();
        let id = LoadId::next();
        self.source = AudioSource::FullSurah;
        self.load_id = Some(id);
        self.full_playing = true;
        self.active = None;
        commands.push(AudioCommand::Load {
            id,
            url: detail.recitation.full.clone(),
            autoplay: true,
        });
        Ok(commands)
    }

    /// React to an event from the audio backend. Events about an older load are ignored.
    pub fn on_event(&mut self, event: &PlayerEvent, detail: &SurahDetail) -> Vec<AudioCommand> {
        if self.load_id != Some(event.load_id()) {
            tracing::trace!(?event, "Ignoring event for a stale load");
            return Vec::new();
        }

        match event {
            PlayerEvent::Loading { .. } | PlayerEvent::PositionChanged { .. } => Vec::new(),
            PlayerEvent::Playing { .. } => {
                match self.source {
                    AudioSource::Verse(v) => {
                        self.state = PlaybackState::Playing(v);
                        self.active = Some(v);
                        self.scroll_to = Some(v);
                    }
                    AudioSource::FullSurah => {
                        self.full_playing = true;
                        self.active = None;
                    }
                }
                Vec::new()
            }
            PlayerEvent::Paused { .. } => {
                match self.source {
                    AudioSource::Verse(v) => {
                        if self.state == PlaybackState::Playing(v) {
                            self.state = PlaybackState::Paused(v);
                        }
                    }
                    AudioSource::FullSurah => self.full_playing = false,
                }
                self.active = None;
                Vec::new()
            }
            PlayerEvent::Ended { .. } => match self.source {
                AudioSource::Verse(v) => match detail.next_verse(v) {
                    Some(next) => {
                        tracing::debug!(surah = self.surah, from = v, to = next.position(), "Auto-advancing");
                        vec![self.load_verse(next.position(), next.audio.url.clone())]
                    }
                    None => {
                        tracing::debug!(surah = self.surah, verse = v, "Last verse finished");
                        self.go_idle();
                        Vec::new()
                    }
                },
                AudioSource::FullSurah => {
                    // The backend drops a finished track, so the next toggle reloads it
                    self.go_idle();
                    self.load_id = None;
                    Vec::new()
                }
            },
            PlayerEvent::Failed { reason, .. } => {
                tracing::warn!(reason = %reason, "Playback failed, returning to idle");
                self.go_idle();
                self.load_id = None;
                Vec::new()
            }
        }
    }

    /// Whether a finished download for `id` should still be loaded, and if so
    /// whether it should start playing
    pub fn pending_autoplay(&self, id: LoadId) -> Option<bool> {
        (self.load_id == Some(id)).then(|| self.is_audible())
    }

    /// Leaving the surah: silence the backend and forget everything
    pub fn stop(&mut self) -> Vec<AudioCommand> {
        let had_load = self.load_id.take().is_some();
        self.go_idle();
        self.source = AudioSource::FullSurah;
        if had_load {
            vec![AudioCommand::Stop]
        } else {
            Vec::new()
        }
    }

    /// The backend keeps the old track until the new download lands, so a user
    /// switching sources must stop it first
    fn silence_previous(&self) -> Vec<AudioCommand> {
        if self.load_id.is_some() {
            vec![AudioCommand::Stop]
        } else {
            Vec::new()
        }
    }

    fn load_verse(&mut self, position: u32, url: String) -> AudioCommand {
        let id = LoadId::next();
        self.source = AudioSource::Verse(position);
        self.load_id = Some(id);
        self.state = PlaybackState::Playing(position);
        self.full_playing = false;
        self.active = Some(position);
        AudioCommand::Load {
            id,
            url,
            autoplay: true,
        }
    }

    fn go_idle(&mut self) {
        self.state = PlaybackState::Idle;
        self.full_playing = false;
        self.active = None;
    }
}

/// Internal timing state for smooth progress bar updates
#[derive(Clone)]
pub struct PlaybackTiming {
    pub position_ms: u32,
    pub last_update: Instant,
    pub is_playing: bool,
    pub duration_ms: u32,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position_ms: 0,
            last_update: Instant::now(),
            is_playing: false,
            duration_ms: 0,
        }
    }
}

impl PlaybackTiming {
    pub fn current_position_ms(&self) -> u32 {
        let position = if self.is_playing {
            let elapsed = self.last_update.elapsed().as_millis() as u32;
            self.position_ms.saturating_add(elapsed)
        } else {
            self.position_ms
        };
        if self.duration_ms > 0 {
            position.min(self.duration_ms)
        } else {
            position
        }
    }

    pub fn update_position(&mut self, position_ms: u32, is_playing: bool) {
        self.position_ms = position_ms;
        self.last_update = Instant::now();
        self.is_playing = is_playing;
    }

    pub fn reset(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
        self.update_position(0, false);
    }
}

/// Complete playback information for rendering the UI
#[derive(Clone, Debug)]
pub struct PlaybackInfo {
    pub title: String,
    pub state: PlaybackState,
    pub active_verse: Option<u32>,
    pub is_playing: bool,
    pub progress_ms: u32,
    pub duration_ms: u32,
    pub volume: u8,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            state: PlaybackState::Idle,
            active_verse: None,
            is_playing: false,
            progress_ms: 0,
            duration_ms: 0,
            volume: DEFAULT_VOLUME_PERCENT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::quran::fixtures::{al_fatihah, with_gap_and_preamble};

    fn loaded_id(commands: &[AudioCommand]) -> LoadId {
        match commands {
            [AudioCommand::Load { id, .. }] | [AudioCommand::Stop, AudioCommand::Load { id, .. }] => *id,
            other => panic!("expected a load, got {:?}", other),
        }
    }

    fn assert_marker_matches(tracker: &PlaybackTracker) {
        let expected = match tracker.state() {
            PlaybackState::Playing(v) => Some(v),
            _ => None,
        };
        assert_eq!(tracker.active_marker(), expected, "state {:?}", tracker.state());
    }

    #[test]
    fn click_cycle_play_pause_resume() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        assert_eq!(tracker.state(), PlaybackState::Idle);

        let commands = tracker.click(3, &detail).unwrap();
        assert_eq!(
            commands,
            vec![AudioCommand::Load {
                id: loaded_id(&commands),
                url: "https://cdn.example/7/3.mp3".to_string(),
                autoplay: true,
            }]
        );
        assert_eq!(tracker.state(), PlaybackState::Playing(3));
        assert_marker_matches(&tracker);

        assert_eq!(tracker.click(3, &detail).unwrap(), vec![AudioCommand::Pause]);
        assert_eq!(tracker.state(), PlaybackState::Paused(3));
        assert_marker_matches(&tracker);

        assert_eq!(tracker.click(3, &detail).unwrap(), vec![AudioCommand::Play]);
        assert_eq!(tracker.state(), PlaybackState::Playing(3));
        assert_marker_matches(&tracker);
    }

    #[test]
    fn clicking_another_verse_switches_source() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let first = loaded_id(&tracker.click(2, &detail).unwrap());
        tracker.click(2, &detail).unwrap();
        assert_eq!(tracker.state(), PlaybackState::Paused(2));

        let second = loaded_id(&tracker.click(5, &detail).unwrap());
        assert_ne!(first, second);
        assert_eq!(tracker.state(), PlaybackState::Playing(5));
        assert_eq!(tracker.source(), AudioSource::Verse(5));
        assert_marker_matches(&tracker);
    }

    #[test]
    fn switching_verse_stops_the_old_track_before_loading() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let first = loaded_id(&tracker.click(2, &detail).unwrap());
        tracker.on_event(&PlayerEvent::Playing { id: first, position_ms: 0, duration_ms: 0 }, &detail);

        let commands = tracker.click(5, &detail).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0], AudioCommand::Stop);
        assert!(matches!(&commands[1], AudioCommand::Load { url, .. } if url.ends_with("/5.mp3")));

        // Pause and resume during the download only touch the pending load
        let second = loaded_id(&commands);
        assert_eq!(tracker.click(5, &detail).unwrap(), vec![AudioCommand::Pause]);
        assert_eq!(tracker.pending_autoplay(second), Some(false));
        assert_eq!(tracker.click(5, &detail).unwrap(), vec![AudioCommand::Play]);
        assert_eq!(tracker.pending_autoplay(second), Some(true));
        assert_eq!(tracker.pending_autoplay(first), None);
    }

    #[test]
    fn full_recitation_is_stopped_when_a_verse_is_picked() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        loaded_id(&tracker.toggle(&detail).unwrap());

        let commands = tracker.click(3, &detail).unwrap();
        assert_eq!(commands[0], AudioCommand::Stop);
        assert!(!tracker.is_full_surah_playing());
        assert_eq!(tracker.state(), PlaybackState::Playing(3));
    }

    #[test]
    fn auto_advance_does_not_stop_the_finished_track() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(1, &detail).unwrap());
        let commands = tracker.on_event(&PlayerEvent::Ended { id }, &detail);
        assert!(matches!(commands.as_slice(), [AudioCommand::Load { .. }]));
    }

    #[test]
    fn ended_advances_to_next_verse() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(1, &detail).unwrap());
        tracker.on_event(&PlayerEvent::Playing { id, position_ms: 0, duration_ms: 4000 }, &detail);
        assert_eq!(tracker.take_scroll_request(), Some(1));

        let commands = tracker.on_event(&PlayerEvent::Ended { id }, &detail);
        let next = loaded_id(&commands);
        assert!(matches!(&commands[0], AudioCommand::Load { url, .. } if url.ends_with("/2.mp3")));
        assert_eq!(tracker.state(), PlaybackState::Playing(2));
        assert_marker_matches(&tracker);

        tracker.on_event(&PlayerEvent::Playing { id: next, position_ms: 0, duration_ms: 0 }, &detail);
        assert_eq!(tracker.take_scroll_request(), Some(2));
    }

    #[test]
    fn ended_on_last_verse_goes_idle() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(7, &detail).unwrap());
        tracker.on_event(&PlayerEvent::Playing { id, position_ms: 0, duration_ms: 0 }, &detail);

        assert!(tracker.on_event(&PlayerEvent::Ended { id }, &detail).is_empty());
        assert_eq!(tracker.state(), PlaybackState::Idle);
        assert_eq!(tracker.active_marker(), None);
        assert!(!tracker.is_audible());
    }

    #[test]
    fn gap_in_positions_fails_closed() {
        let detail = with_gap_and_preamble();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(3, &detail).unwrap());

        assert!(tracker.on_event(&PlayerEvent::Ended { id }, &detail).is_empty());
        assert_eq!(tracker.state(), PlaybackState::Idle);
    }

    #[test]
    fn unknown_verse_is_missing_element() {
        let detail = with_gap_and_preamble();
        let mut tracker = PlaybackTracker::new(1);
        let err = tracker.click(4, &detail).unwrap_err();
        assert!(matches!(err, AppError::MissingElement(_)));
        assert_eq!(tracker.state(), PlaybackState::Idle);
    }

    #[test]
    fn paused_event_clears_marker() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(4, &detail).unwrap());
        tracker.on_event(&PlayerEvent::Playing { id, position_ms: 0, duration_ms: 0 }, &detail);

        tracker.on_event(&PlayerEvent::Paused { id, position_ms: 1200 }, &detail);
        assert_eq!(tracker.state(), PlaybackState::Paused(4));
        assert_marker_matches(&tracker);
    }

    #[test]
    fn stale_events_are_ignored() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let old = loaded_id(&tracker.click(1, &detail).unwrap());
        let current = loaded_id(&tracker.click(6, &detail).unwrap());
        assert_ne!(old, current);

        assert!(tracker.on_event(&PlayerEvent::Ended { id: old }, &detail).is_empty());
        assert_eq!(tracker.state(), PlaybackState::Playing(6));
        assert_eq!(tracker.pending_autoplay(old), None);
        assert_eq!(tracker.pending_autoplay(current), Some(true));
    }

    #[test]
    fn pause_before_download_finishes_loads_silently() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(2, &detail).unwrap());
        tracker.click(2, &detail).unwrap();
        assert_eq!(tracker.pending_autoplay(id), Some(false));
    }

    #[test]
    fn failed_load_returns_to_idle() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(2, &detail).unwrap());
        tracker.on_event(&PlayerEvent::Failed { id, reason: "bad mp3".into() }, &detail);
        assert_eq!(tracker.state(), PlaybackState::Idle);
        assert_eq!(tracker.pending_autoplay(id), None);
    }

    #[test]
    fn toggle_without_verse_drives_full_recitation() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);

        let commands = tracker.toggle(&detail).unwrap();
        let id = loaded_id(&commands);
        assert!(matches!(&commands[0], AudioCommand::Load { url, .. } if url.ends_with("full/001.mp3")));
        assert!(tracker.is_full_surah_playing());
        assert_eq!(tracker.state(), PlaybackState::Idle);

        tracker.on_event(&PlayerEvent::Playing { id, position_ms: 0, duration_ms: 0 }, &detail);
        assert_eq!(tracker.active_marker(), None);
        assert_eq!(tracker.take_scroll_request(), None);

        assert_eq!(tracker.toggle(&detail).unwrap(), vec![AudioCommand::Pause]);
        assert!(!tracker.is_full_surah_playing());
        assert_eq!(tracker.toggle(&detail).unwrap(), vec![AudioCommand::Play]);

        tracker.on_event(&PlayerEvent::Ended { id }, &detail);
        assert!(!tracker.is_audible());

        let reload = tracker.toggle(&detail).unwrap();
        assert_ne!(loaded_id(&reload), id);
    }

    #[test]
    fn toggle_with_verse_acts_like_click() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        tracker.click(5, &detail).unwrap();
        assert_eq!(tracker.toggle(&detail).unwrap(), vec![AudioCommand::Pause]);
        assert_eq!(tracker.state(), PlaybackState::Paused(5));
    }

    #[test]
    fn stop_forgets_everything() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let id = loaded_id(&tracker.click(5, &detail).unwrap());
        assert_eq!(tracker.stop(), vec![AudioCommand::Stop]);
        assert_eq!(tracker.state(), PlaybackState::Idle);
        assert_eq!(tracker.pending_autoplay(id), None);
        assert!(tracker.stop().is_empty());
    }

    #[test]
    fn marker_never_desyncs_over_a_session() {
        let detail = al_fatihah();
        let mut tracker = PlaybackTracker::new(1);
        let mut id = loaded_id(&tracker.click(5, &detail).unwrap());
        assert_marker_matches(&tracker);

        let script: Vec<Box<dyn Fn(LoadId) -> PlayerEvent>> = vec![
            Box::new(|id| PlayerEvent::Playing { id, position_ms: 0, duration_ms: 0 }),
            Box::new(|id| PlayerEvent::Paused { id, position_ms: 10 }),
            Box::new(|id| PlayerEvent::Playing { id, position_ms: 10, duration_ms: 0 }),
            Box::new(|id| PlayerEvent::Ended { id }),
        ];
        for _ in 0..3 {
            for make in &script {
                let commands = tracker.on_event(&make(id), &detail);
                if let Some(AudioCommand::Load { id: next, .. }) = commands.first() {
                    id = *next;
                }
                assert_marker_matches(&tracker);
            }
        }
        assert_eq!(tracker.state(), PlaybackState::Idle);
    }

    #[test]
    fn timing_clamps_to_duration() {
        let mut timing = PlaybackTiming::default();
        timing.reset(1000);
        timing.update_position(5000, false);
        assert_eq!(timing.current_position_ms(), 1000);
    }
}

//! Playback control methods

use crate::audio::{AudioBackend, LoadId, PlayerEvent};
use crate::error::AppError;
use crate::model::AudioCommand;

use super::AppController;

impl AppController {
    /// Press the play control of the selected verse
    pub async fn play_selected_verse(&self) {
        let model = self.model.lock().await;
        let Some(position) = model.get_selected_verse().await else {
            // The preamble row has no play control
            return;
        };
        let result = model.click_verse(position).await;
        let state = model.get_playback_state().await;
        let marker = model.get_active_marker().await;
        drop(model);

        match result {
            Ok(commands) => {
                tracing::debug!(position, ?state, ?marker, ?commands, "Verse play control pressed");
                self.dispatch(commands).await;
            }
            Err(e) => self.report_error("play verse", &e).await,
        }
    }

    pub async fn toggle_playback(&self) {
        let result = self.model.lock().await.toggle_playback().await;
        match result {
            Ok(commands) => self.dispatch(commands).await,
            Err(e) => self.report_error("toggle playback", &e).await,
        }
    }

    pub async fn volume_up(&self) {
        let volume = self.model.lock().await.volume_up().await;
        self.apply_volume(volume).await;
    }

    pub async fn volume_down(&self) {
        let volume = self.model.lock().await.volume_down().await;
        self.apply_volume(volume).await;
    }

    async fn apply_volume(&self, volume: u8) {
        tracing::debug!(volume, "Volume changed");
        if let Some(backend) = self.audio_backend.lock().await.as_ref() {
            if let Err(e) = backend.set_volume(volume) {
                tracing::warn!(error = %e, "Could not change volume");
            }
        }
    }

    /// Execute tracker commands against the audio backend. The controller is the
    /// only writer of the backend's source and play state.
    pub(crate) async fn dispatch(&self, commands: Vec<AudioCommand>) {
        for command in commands {
            match command {
                AudioCommand::Load { id, url, .. } => {
                    let controller = self.clone();
                    tokio::spawn(async move {
                        controller.download_and_load(id, url).await;
                    });
                }
                AudioCommand::Play => self.with_backend(|b| b.play()).await,
                AudioCommand::Pause => self.with_backend(|b| b.pause()).await,
                AudioCommand::Stop => self.with_backend(|b| b.stop()).await,
            }
        }
    }

    async fn with_backend(&self, op: impl FnOnce(&AudioBackend) -> anyhow::Result<()>) {
        let backend = self.audio_backend.lock().await;
        match backend.as_ref() {
            Some(backend) => {
                if let Err(e) = op(backend) {
                    tracing::error!(error = %e, "Audio command failed");
                }
            }
            None => tracing::debug!("Audio backend not ready, command skipped"),
        }
    }

    async fn download_and_load(&self, id: LoadId, url: String) {
        let client = self.model.lock().await.get_client().await;
        let Some(client) = client else {
            return;
        };

        let bytes = match client.fetch_audio(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.fail_load(id, &e).await;
                return;
            }
        };

        // The user may have picked another verse or left the surah while downloading
        let Some(autoplay) = self.model.lock().await.pending_autoplay(id).await else {
            tracing::debug!(?id, "Discarding audio for a superseded load");
            return;
        };

        let backend = self.audio_backend.lock().await;
        let result = match backend.as_ref() {
            Some(backend) => backend
                .load(id, bytes, autoplay)
                .map_err(|e| AppError::Audio(e.to_string())),
            None => Err(AppError::Audio("no audio output available".to_string())),
        };
        drop(backend);

        if let Err(e) = result {
            self.fail_load(id, &e).await;
        }
    }

    async fn fail_load(&self, id: LoadId, error: &AppError) {
        let model = self.model.lock().await;
        if model.pending_autoplay(id).await.is_none() {
            return;
        }
        model
            .apply_player_event(&PlayerEvent::Failed {
                id,
                reason: error.to_string(),
            })
            .await;
        drop(model);
        self.report_error("load audio", error).await;
    }
}

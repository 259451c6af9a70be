//! Player event listener for audio backend events

use crate::audio::{PlayerEvent, PlayerEventChannel};
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut event_channel: PlayerEventChannel) {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = event_channel.recv().await {
                let model_guard = controller.model.lock().await;

                if model_guard.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                match &event {
                    PlayerEvent::PositionChanged { position_ms, .. } => {
                        tracing::trace!(position_ms, "PlayerEvent::PositionChanged");
                    }
                    PlayerEvent::Failed { id, reason } => {
                        tracing::error!(reason = %reason, "PlayerEvent::Failed");
                        if model_guard.pending_autoplay(*id).await.is_some() {
                            model_guard.set_error(format!("Audio playback failed: {}", reason)).await;
                        }
                    }
                    other => tracing::debug!(event = ?other, "PlayerEvent"),
                }

                let commands = model_guard.apply_player_event(&event).await;
                drop(model_guard);

                controller.dispatch(commands).await;
            }
        });
    }
}

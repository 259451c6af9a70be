//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the audio backend.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `navigation`: Surah list / surah detail routing and fetching
//! - `playback`: Verse playback actions and audio command dispatch
//! - `player_events`: Audio backend event listener

mod input;
mod navigation;
mod playback;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::audio::AudioBackend;
use crate::error::AppError;
use crate::model::AppModel;

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) audio_backend: Arc<Mutex<Option<AudioBackend>>>,
}

impl AppController {
    pub fn new(model: Arc<Mutex<AppModel>>, audio_backend: Arc<Mutex<Option<AudioBackend>>>) -> Self {
        Self {
            model,
            audio_backend,
        }
    }

    /// Log an error and surface it as a notification
    pub(crate) async fn report_error(&self, context: &'static str, error: &AppError) {
        tracing::error!(context, error = %error, "Operation failed");
        let model = self.model.lock().await;
        model.set_error(error.user_message()).await;
    }
}

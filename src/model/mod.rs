//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (sections, UI state)
//! - `quran`: API payloads (surah summaries, surah detail, verses)
//! - `quran_client`: Quran API client
//! - `content`: Content views and the list/verse/navbar view models
//! - `playback`: Verse playback state machine and progress timing
//! - `preferences`: Persisted language preference
//! - `app_model`: Main application model with state management methods

mod types;
mod quran;
mod quran_client;
mod content;
mod playback;
mod preferences;
mod app_model;

pub use types::{ActiveSection, UiState};

pub use quran::{parse_surah_number, SurahDetail, SurahSummary};
#[cfg(test)]
pub(crate) use quran::fixtures;

pub use quran_client::QuranClient;

pub use content::{
    ayah_items, AyahItem, ContentState, ContentView, NavbarInfo, SurahItem,
};

pub use playback::{AudioCommand, PlaybackInfo, PlaybackState};

pub use preferences::{Language, Preferences};

pub use app_model::AppModel;

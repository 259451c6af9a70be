//! Persisted user preferences (currently only the display language)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::AppResult;

const PREFERENCES_FILE: &str = "preferences.json";

/// Language used for names and translations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "id")]
    Indonesian,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Language::Indonesian => Language::English,
            Language::English => Language::Indonesian,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Indonesian => "id",
            Language::English => "en",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default)]
    language: Language,
}

/// Preferences backed by a JSON file in the data directory
#[derive(Clone)]
pub struct Preferences {
    path: PathBuf,
    stored: Arc<RwLock<StoredPreferences>>,
}

impl Preferences {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PREFERENCES_FILE),
            stored: Arc::new(RwLock::new(StoredPreferences::default())),
        }
    }

    /// Load from disk; a missing or unreadable file keeps the defaults
    pub async fn load_from_disk(&self) {
        if !self.path.exists() {
            return;
        }
        let loaded = fs::read_to_string(&self.path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Ok(serde_json::from_str::<StoredPreferences>(&content)?));
        match loaded {
            Ok(prefs) => {
                tracing::debug!(language = prefs.language.code(), "Preferences loaded");
                *self.stored.write().await = prefs;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable preferences");
            }
        }
    }

    pub async fn save_to_disk(&self) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let stored = self.stored.read().await;
        let content = serde_json::to_string_pretty(&*stored)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub async fn get_language(&self) -> Language {
        self.stored.read().await.language
    }

    /// Update the language and persist it
    pub async fn set_language(&self, language: Language) -> AppResult<()> {
        self.stored.write().await.language = language;
        self.save_to_disk().await
    }
}

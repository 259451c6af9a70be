//! Runtime configuration from command-line flags and environment variables

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub const DEFAULT_API_URL: &str = "https://quran-endpoint.vercel.app";
pub const DEFAULT_IMAM_ID: u32 = 7;

#[derive(Parser, Debug, Clone)]
#[command(name = "quran-tui", version, about = "Read and listen to the Quran in your terminal")]
pub struct AppConfig {
    /// Open a surah directly (1-114)
    #[arg(long, env = "QURAN_SURAH", value_name = "N")]
    pub surah: Option<String>,

    /// Base URL of the Quran API
    #[arg(long, env = "QURAN_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Reciter used for verse and surah audio
    #[arg(long, env = "QURAN_IMAM_ID", default_value_t = DEFAULT_IMAM_ID)]
    pub imam_id: u32,

    /// Directory holding preferences.json
    #[arg(long, env = "QURAN_DATA_DIR", default_value = ".cache")]
    pub data_dir: PathBuf,

    /// Render play controls as text instead of icons
    #[arg(long)]
    pub text_buttons: bool,

    /// Only show the surah number and name in the navbar
    #[arg(long)]
    pub compact_navbar: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 15)]
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn display(&self) -> DisplayConfig {
        DisplayConfig {
            play_control: if self.text_buttons {
                PlayControlStyle::Text
            } else {
                PlayControlStyle::Icon
            },
            navbar: if self.compact_navbar {
                NavbarFields::NameOnly
            } else {
                NavbarFields::Full
            },
        }
    }
}

/// How verse play controls are drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayControlStyle {
    #[default]
    Icon,
    Text,
}

impl PlayControlStyle {
    pub fn label(self, playing: bool) -> &'static str {
        match (self, playing) {
            (PlayControlStyle::Icon, false) => "▶",
            (PlayControlStyle::Icon, true) => "⏸",
            (PlayControlStyle::Text, false) => "[play]",
            (PlayControlStyle::Text, true) => "[pause]",
        }
    }
}

/// Which surah fields the navbar shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NavbarFields {
    NameOnly,
    #[default]
    Full,
}

/// Presentation switches passed down to the view layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayConfig {
    pub play_control: PlayControlStyle,
    pub navbar: NavbarFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_endpoint() {
        let config = AppConfig::try_parse_from(["quran-tui"]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.imam_id, 7);
        assert!(config.surah.is_none());
        assert_eq!(config.display(), DisplayConfig::default());
    }

    #[test]
    fn surah_is_kept_raw_for_validation() {
        let config = AppConfig::try_parse_from(["quran-tui", "--surah", "abc"]).unwrap();
        assert_eq!(config.surah.as_deref(), Some("abc"));
    }

    #[test]
    fn display_flags_switch_variants() {
        let config =
            AppConfig::try_parse_from(["quran-tui", "--text-buttons", "--compact-navbar"]).unwrap();
        let display = config.display();
        assert_eq!(display.play_control, PlayControlStyle::Text);
        assert_eq!(display.navbar, NavbarFields::NameOnly);
        assert_eq!(display.play_control.label(true), "[pause]");
    }
}

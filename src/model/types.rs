//! Core type definitions for the application

use std::time::Instant;

use crate::config::DisplayConfig;
use super::preferences::Language;

/// Which part of the UI receives typed characters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveSection {
    Search,
    MainContent,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::MainContent,
            ActiveSection::MainContent => ActiveSection::Search,
        }
    }
}

/// UI state for the application
#[derive(Clone)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_query: String,
    pub language: Language,
    pub display: DisplayConfig,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
    pub show_help_popup: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_section: ActiveSection::MainContent,
            search_query: String::new(),
            language: Language::default(),
            display: DisplayConfig::default(),
            error_message: None,
            error_timestamp: None,
            show_help_popup: false,
        }
    }
}

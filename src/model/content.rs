//! Content views and the view models rendered from API data

use crate::config::NavbarFields;
use super::preferences::Language;
use super::quran::{SurahDetail, SurahSummary};

/// One row of the surah list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurahItem {
    pub number: u32,
    pub name: String,
    pub translation: String,
    pub revelation: String,
    /// `number:ayahCount`
    pub badge: String,
}

impl SurahItem {
    pub fn from_summary(surah: &SurahSummary, language: Language) -> Self {
        Self {
            number: surah.number,
            name: surah.asma.long(language).to_string(),
            translation: surah.asma.translation.get(language).to_string(),
            revelation: surah.revelation.get(language).to_string(),
            badge: format!("{}:{}", surah.number, surah.ayah_count),
        }
    }
}

/// Lowercase and drop apostrophes, applied to both sides of a search
pub fn normalize_name(s: &str) -> String {
    s.to_lowercase().replace('\'', "")
}

/// Indices of the surahs whose long name contains `query`, in original order
pub fn filter_surahs(surahs: &[SurahSummary], query: &str, language: Language) -> Vec<usize> {
    let needle = normalize_name(query);
    surahs
        .iter()
        .enumerate()
        .filter(|(_, s)| needle.is_empty() || normalize_name(s.asma.long(language)).contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// One row of the verse list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AyahItem {
    /// The invocation before verse 1: no badge and no play control
    Preamble {
        arabic: String,
        read: String,
        translation: String,
    },
    Verse {
        position: u32,
        badge: String,
        arabic: String,
        read: String,
        translation: String,
    },
}

impl AyahItem {
    pub fn position(&self) -> Option<u32> {
        match self {
            AyahItem::Preamble { .. } => None,
            AyahItem::Verse { position, .. } => Some(*position),
        }
    }
}

pub fn ayah_items(detail: &SurahDetail, language: Language) -> Vec<AyahItem> {
    let preamble = detail.pre_bismillah.iter().map(|p| AyahItem::Preamble {
        arabic: p.text.ar.clone(),
        read: p.text.read.clone(),
        translation: p.translation.get(language).to_string(),
    });
    let verses = detail.ayahs.iter().map(|v| AyahItem::Verse {
        position: v.position(),
        badge: v.badge(),
        arabic: v.text.ar.clone(),
        read: v.text.read.clone(),
        translation: v.translation.get(language).to_string(),
    });
    preamble.chain(verses).collect()
}

/// Row index of a verse in the rendered list, accounting for the preamble
pub fn verse_row(detail: &SurahDetail, position: u32) -> Option<usize> {
    let offset = usize::from(detail.pre_bismillah.is_some());
    detail
        .ayahs
        .iter()
        .position(|v| v.position() == position)
        .map(|i| i + offset)
}

/// Verse position at a row of the rendered list, `None` for the preamble
pub fn verse_at_row(detail: &SurahDetail, row: usize) -> Option<u32> {
    let offset = usize::from(detail.pre_bismillah.is_some());
    row.checked_sub(offset)
        .and_then(|i| detail.ayahs.get(i))
        .map(|v| v.position())
}

/// What the navbar shows for an opened surah
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavbarInfo {
    pub number: u32,
    pub name: String,
    pub revelation: Option<String>,
    pub verse_count: Option<u32>,
}

impl NavbarInfo {
    pub fn from_detail(detail: &SurahDetail, language: Language, fields: NavbarFields) -> Self {
        let full = fields == NavbarFields::Full;
        Self {
            number: detail.number,
            name: detail.asma.short(language).to_string(),
            revelation: full.then(|| detail.revelation.get(language).to_string()),
            verse_count: full.then_some(detail.ayah_count),
        }
    }

    pub fn title(&self) -> String {
        format!("{}. {}", self.number, self.name)
    }
}

/// Current content view
#[derive(Clone, Debug)]
pub enum ContentView {
    Loading,
    SurahList {
        surahs: Vec<SurahSummary>,
        visible: Vec<usize>,
        selected_index: usize,
    },
    SurahDetail {
        detail: SurahDetail,
        selected_index: usize,
    },
    NotFound,
    /// Any other load failure; the details only go to the log
    Failed,
}

impl ContentView {
    pub fn surah_list(surahs: Vec<SurahSummary>, query: &str, language: Language) -> Self {
        let visible = filter_surahs(&surahs, query, language);
        ContentView::SurahList {
            surahs,
            visible,
            selected_index: 0,
        }
    }

    pub fn item_count(&self) -> usize {
        match self {
            ContentView::SurahList { visible, .. } => visible.len(),
            ContentView::SurahDetail { detail, .. } => {
                detail.ayahs.len() + usize::from(detail.pre_bismillah.is_some())
            }
            _ => 0,
        }
    }

    fn selected_index_mut(&mut self) -> Option<&mut usize> {
        match self {
            ContentView::SurahList { selected_index, .. }
            | ContentView::SurahDetail { selected_index, .. } => Some(selected_index),
            _ => None,
        }
    }

    pub fn move_up(&mut self) {
        if let Some(index) = self.selected_index_mut() {
            *index = index.saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        let last = self.item_count().saturating_sub(1);
        if let Some(index) = self.selected_index_mut() {
            if *index < last {
                *index += 1;
            }
        }
    }

    /// Re-run the search filter after the query or language changed
    pub fn refilter(&mut self, query: &str, language: Language) {
        if let ContentView::SurahList { surahs, visible, selected_index } = self {
            *visible = filter_surahs(surahs, query, language);
            *selected_index = 0;
        }
    }
}

/// Content area state: the current view plus the views to go back to
#[derive(Clone, Debug)]
pub struct ContentState {
    pub view: ContentView,
    pub navigation_stack: Vec<ContentView>,
    /// Bumped on every navigation; fetches started for an older route are discarded
    pub route: u64,
}

impl Default for ContentState {
    fn default() -> Self {
        Self {
            view: ContentView::Loading,
            navigation_stack: Vec::new(),
            route: 0,
        }
    }
}

//! Quran API payloads, deserialized as the API returns them

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use super::preferences::Language;

pub const SURAH_COUNT: u32 = 114;

/// Every response is wrapped as `{ "data": ... }`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// A string the API provides in Indonesian and (usually) English
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Localized {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub en: String,
}

impl Localized {
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English if !self.en.is_empty() => &self.en,
            _ => &self.id,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SurahName {
    #[serde(default)]
    pub short: String,
    #[serde(default)]
    pub long: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Asma {
    #[serde(default)]
    pub ar: SurahName,
    #[serde(default)]
    pub id: SurahName,
    #[serde(default)]
    pub en: SurahName,
    #[serde(default)]
    pub translation: Localized,
}

impl Asma {
    fn name(&self, language: Language) -> &SurahName {
        match language {
            Language::English if !self.en.long.is_empty() => &self.en,
            _ => &self.id,
        }
    }

    pub fn short(&self, language: Language) -> &str {
        &self.name(language).short
    }

    pub fn long(&self, language: Language) -> &str {
        &self.name(language).long
    }
}

/// One entry of the collection endpoint
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SurahSummary {
    pub number: u32,
    pub ayah_count: u32,
    pub asma: Asma,
    #[serde(rename = "type")]
    pub revelation: Localized,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct VerseText {
    #[serde(default)]
    pub ar: String,
    #[serde(default)]
    pub read: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Preamble {
    pub text: VerseText,
    #[serde(default)]
    pub translation: Localized,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct VerseNumber {
    #[serde(default)]
    pub inquran: u32,
    pub insurah: u32,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct VerseAudio {
    pub url: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Verse {
    pub number: VerseNumber,
    #[serde(default)]
    pub juz: u32,
    pub text: VerseText,
    #[serde(default)]
    pub translation: Localized,
    pub audio: VerseAudio,
}

impl Verse {
    pub fn position(&self) -> u32 {
        self.number.insurah
    }

    /// `juz:position`, the badge shown next to each verse
    pub fn badge(&self) -> String {
        format!("{}:{}", self.juz, self.number.insurah)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Recitation {
    #[serde(default)]
    pub full: String,
}

/// Payload of the detail endpoint
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SurahDetail {
    pub number: u32,
    pub ayah_count: u32,
    pub asma: Asma,
    #[serde(rename = "type")]
    pub revelation: Localized,
    #[serde(default)]
    pub pre_bismillah: Option<Preamble>,
    pub ayahs: Vec<Verse>,
    #[serde(default)]
    pub recitation: Recitation,
}

impl SurahDetail {
    /// Lookup by the surah-local position, never by array index
    pub fn verse(&self, position: u32) -> Option<&Verse> {
        self.ayahs.iter().find(|v| v.position() == position)
    }

    pub fn next_verse(&self, position: u32) -> Option<&Verse> {
        position.checked_add(1).and_then(|next| self.verse(next))
    }
}

/// Validate a raw surah number the way the detail route receives it
pub fn parse_surah_number(raw: Option<&str>) -> AppResult<u32> {
    let raw = raw.map(str::trim).unwrap_or_default();
    match raw.parse::<u32>() {
        Ok(n) if (1..=SURAH_COUNT).contains(&n) => Ok(n),
        _ => Err(AppError::InvalidSurahNumber(raw.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Al-Fatihah as served by the detail endpoint (verses trimmed to what the app reads)
    pub const AL_FATIHAH_JSON: &str = r#"{
        "data": {
            "number": 1,
            "ayahCount": 7,
            "sequence": 5,
            "asma": {
                "ar": { "short": "الفاتحة", "long": "سُورَةُ ٱلْفَاتِحَةِ" },
                "en": { "short": "Al-Faatiha", "long": "Surah Al-Faatiha" },
                "id": { "short": "Al-Fatihah", "long": "Surah Al-Fatihah" },
                "translation": { "en": "The Opening", "id": "Pembukaan" }
            },
            "type": { "ar": "مكة", "id": "Makkiyyah", "en": "Meccan" },
            "preBismillah": null,
            "ayahs": [
                { "number": { "inquran": 1, "insurah": 1 }, "juz": 1, "text": { "ar": "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ", "read": "Bismillāhir-raḥmānir-raḥīm" }, "translation": { "en": "In the name of Allah, the Entirely Merciful, the Especially Merciful.", "id": "Dengan nama Allah Yang Maha Pengasih, Maha Penyayang." }, "audio": { "url": "https://cdn.example/7/1.mp3" } },
                { "number": { "inquran": 2, "insurah": 2 }, "juz": 1, "text": { "ar": "ٱلْحَمْدُ لِلَّهِ رَبِّ ٱلْعَٰلَمِينَ", "read": "Al-ḥamdu lillāhi rabbil-'ālamīn" }, "translation": { "en": "All praise is due to Allah, Lord of the worlds.", "id": "Segala puji bagi Allah, Tuhan seluruh alam," }, "audio": { "url": "https://cdn.example/7/2.mp3" } },
                { "number": { "inquran": 3, "insurah": 3 }, "juz": 1, "text": { "ar": "ٱلرَّحْمَٰنِ ٱلرَّحِيمِ", "read": "Ar-raḥmānir-raḥīm" }, "translation": { "en": "The Entirely Merciful, the Especially Merciful,", "id": "Yang Maha Pengasih, Maha Penyayang," }, "audio": { "url": "https://cdn.example/7/3.mp3" } },
                { "number": { "inquran": 4, "insurah": 4 }, "juz": 1, "text": { "ar": "مَٰلِكِ يَوْمِ ٱلدِّينِ", "read": "Māliki yaumid-dīn" }, "translation": { "en": "Sovereign of the Day of Recompense.", "id": "Pemilik hari pembalasan." }, "audio": { "url": "https://cdn.example/7/4.mp3" } },
                { "number": { "inquran": 5, "insurah": 5 }, "juz": 1, "text": { "ar": "إِيَّاكَ نَعْبُدُ وَإِيَّاكَ نَسْتَعِينُ", "read": "Iyyāka na'budu wa iyyāka nasta'īn" }, "translation": { "en": "It is You we worship and You we ask for help.", "id": "Hanya kepada Engkaulah kami menyembah dan hanya kepada Engkaulah kami mohon pertolongan." }, "audio": { "url": "https://cdn.example/7/5.mp3" } },
                { "number": { "inquran": 6, "insurah": 6 }, "juz": 1, "text": { "ar": "ٱهْدِنَا ٱلصِّرَٰطَ ٱلْمُسْتَقِيمَ", "read": "Ihdinaṣ-ṣirāṭal-mustaqīm" }, "translation": { "en": "Guide us to the straight path -", "id": "Tunjukilah kami jalan yang lurus," }, "audio": { "url": "https://cdn.example/7/6.mp3" } },
                { "number": { "inquran": 7, "insurah": 7 }, "juz": 1, "text": { "ar": "صِرَٰطَ ٱلَّذِينَ أَنْعَمْتَ عَلَيْهِمْ", "read": "Ṣirāṭallażīna an'amta 'alaihim" }, "translation": { "en": "The path of those upon whom You have bestowed favor.", "id": "(yaitu) jalan orang-orang yang telah Engkau beri nikmat." }, "audio": { "url": "https://cdn.example/7/7.mp3" } }
            ],
            "recitation": { "beautifyName": "Mishary Rashid Alafasy", "full": "https://cdn.example/7/full/001.mp3" }
        }
    }"#;

    pub const SURAH_LIST_JSON: &str = r#"{
        "data": [
            { "number": 1, "ayahCount": 7, "asma": { "id": { "short": "Al-Fatihah", "long": "Surah Al-Fatihah" }, "en": { "short": "Al-Faatiha", "long": "Surah Al-Faatiha" }, "translation": { "id": "Pembukaan", "en": "The Opening" } }, "type": { "id": "Makkiyyah", "en": "Meccan" } },
            { "number": 2, "ayahCount": 286, "asma": { "id": { "short": "Al-Baqarah", "long": "Surah Al-Baqarah" }, "en": { "short": "Al-Baqara", "long": "Surah Al-Baqara" }, "translation": { "id": "Sapi", "en": "The Cow" } }, "type": { "id": "Madaniyyah", "en": "Medinan" } },
            { "number": 6, "ayahCount": 165, "asma": { "id": { "short": "Al-An'am", "long": "Surah Al-An'am" }, "en": { "short": "Al-An'aam", "long": "Surah Al-An'aam" }, "translation": { "id": "Binatang Ternak", "en": "The Cattle" } }, "type": { "id": "Makkiyyah", "en": "Meccan" } },
            { "number": 112, "ayahCount": 4, "asma": { "id": { "short": "Al-Ikhlas", "long": "Surah Al-Ikhlas" }, "translation": { "id": "Ikhlas" } }, "type": { "id": "Makkiyyah" } }
        ]
    }"#;

    pub fn al_fatihah() -> SurahDetail {
        serde_json::from_str::<Envelope<SurahDetail>>(AL_FATIHAH_JSON)
            .expect("fixture parses")
            .data
    }

    pub fn surah_list() -> Vec<SurahSummary> {
        serde_json::from_str::<Envelope<Vec<SurahSummary>>>(SURAH_LIST_JSON)
            .expect("fixture parses")
            .data
    }

    /// Al-Fatihah with a preamble attached and verse 4 missing, for gap handling
    pub fn with_gap_and_preamble() -> SurahDetail {
        let mut detail = al_fatihah();
        detail.ayahs.retain(|v| v.position() != 4);
        detail.pre_bismillah = Some(Preamble {
            text: VerseText {
                ar: "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ".to_string(),
                read: "Bismillāhir-raḥmānir-raḥīm".to_string(),
            },
            translation: Localized {
                id: "Dengan nama Allah Yang Maha Pengasih, Maha Penyayang.".to_string(),
                en: String::new(),
            },
        });
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn detail_envelope_decodes() {
        let detail = al_fatihah();
        assert_eq!(detail.number, 1);
        assert_eq!(detail.ayah_count, 7);
        assert_eq!(detail.ayahs.len(), 7);
        assert!(detail.pre_bismillah.is_none());
        assert_eq!(detail.asma.short(Language::Indonesian), "Al-Fatihah");
        assert_eq!(detail.revelation.get(Language::English), "Meccan");
        assert_eq!(detail.recitation.full, "https://cdn.example/7/full/001.mp3");
        assert_eq!(detail.ayahs[6].badge(), "1:7");
    }

    #[test]
    fn list_envelope_decodes_and_falls_back_to_indonesian() {
        let list = surah_list();
        assert_eq!(list.len(), 4);
        let ikhlas = &list[3];
        assert_eq!(ikhlas.asma.long(Language::English), "Surah Al-Ikhlas");
        assert_eq!(ikhlas.asma.translation.get(Language::English), "Ikhlas");
    }

    #[test]
    fn verse_lookup_is_by_position_not_index() {
        let detail = with_gap_and_preamble();
        assert_eq!(detail.verse(5).map(Verse::position), Some(5));
        assert!(detail.verse(4).is_none());
        assert!(detail.next_verse(3).is_none());
        assert!(detail.next_verse(7).is_none());
        assert_eq!(detail.next_verse(5).map(Verse::position), Some(6));
    }

    #[test]
    fn surah_number_validation() {
        assert_eq!(parse_surah_number(Some("1")).unwrap(), 1);
        assert_eq!(parse_surah_number(Some(" 114 ")).unwrap(), 114);
        for raw in [None, Some(""), Some("0"), Some("115"), Some("200"), Some("-3"), Some("abc")] {
            let err = parse_surah_number(raw).unwrap_err();
            assert!(err.is_not_found(), "{:?} should be rejected", raw);
        }
    }
}

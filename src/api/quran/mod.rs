// Typed client for the alquran.cloud content service.
use super::{fetch_envelope, query_string, ApiError};
use crate::api::models::*;
use crate::config::QURAN_API_URL;
use futures_util::future::try_join;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which verse set a reading session shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    Page(u16),
    Surah(u16),
}

impl Locator {
    fn path_segment(self) -> String {
        match self {
            Self::Page(page) => format!("page/{page}"),
            Self::Surah(surah) => format!("surah/{surah}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseSetRequest {
    pub locator: Locator,
    pub reciter: String,
    pub translation: Option<String>,
}

/// Anything that can produce the ordered verse list for a request.
#[allow(async_fn_in_trait)]
pub trait QuranSource {
    async fn fetch_verses(&self, request: &VerseSetRequest) -> Result<Vec<Verse>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct QuranClient {
    base_url: String,
}

impl Default for QuranClient {
    fn default() -> Self {
        Self::new(QURAN_API_URL)
    }
}

impl QuranClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn fetch_page(
        &self,
        page: u16,
        reciter: &str,
        translation: Option<&str>,
    ) -> Result<Vec<Verse>, ApiError> {
        let audio_url = self.url(&format!("page/{page}/{reciter}"));
        let (audio, translated) = match translation {
            Some(edition) => {
                let translation_url = self.url(&format!("page/{page}/{edition}"));
                let (audio, translated) = try_join(
                    fetch_envelope::<WirePage>(&audio_url),
                    fetch_envelope::<WirePage>(&translation_url),
                )
                .await?;
                (audio, Some(translated.ayahs))
            }
            None => (fetch_envelope::<WirePage>(&audio_url).await?, None),
        };

        Ok(build_verses(
            audio.ayahs,
            None,
            translated.map(translation_texts).unwrap_or_default(),
            Locator::Page(page),
        ))
    }

    pub async fn fetch_surah(
        &self,
        surah: u16,
        reciter: &str,
        translation: Option<&str>,
    ) -> Result<Vec<Verse>, ApiError> {
        let audio_url = self.url(&format!("surah/{surah}/{reciter}"));
        let (audio, translated) = match translation {
            Some(edition) => {
                let translation_url = self.url(&format!("surah/{surah}/{edition}"));
                let (audio, translated) = try_join(
                    fetch_envelope::<WireSurah>(&audio_url),
                    fetch_envelope::<WireSurah>(&translation_url),
                )
                .await?;
                (audio, Some(translated.ayahs))
            }
            None => (fetch_envelope::<WireSurah>(&audio_url).await?, None),
        };

        Ok(build_verses(
            audio.ayahs,
            Some(&audio.summary),
            translated.map(translation_texts).unwrap_or_default(),
            Locator::Surah(surah),
        ))
    }

    pub async fn surah_list(&self) -> Result<Vec<SurahSummary>, ApiError> {
        fetch_envelope(&self.url("surah")).await
    }

    pub async fn translation_editions(&self) -> Result<Vec<Edition>, ApiError> {
        self.editions("text", "translation").await
    }

    /// Verse-by-verse recitations usable as a reciter id.
    pub async fn audio_editions(&self) -> Result<Vec<Edition>, ApiError> {
        self.editions("audio", "versebyverse").await
    }

    async fn editions(&self, format: &str, kind: &str) -> Result<Vec<Edition>, ApiError> {
        let query = query_string(&[("format", format.to_string()), ("type", kind.to_string())]);
        fetch_envelope(&self.url(&format!("edition?{query}"))).await
    }
}

impl QuranSource for QuranClient {
    async fn fetch_verses(&self, request: &VerseSetRequest) -> Result<Vec<Verse>, ApiError> {
        let started = chrono::Utc::now();
        let translation = request.translation.as_deref();
        let result = match request.locator {
            Locator::Page(page) => self.fetch_page(page, &request.reciter, translation).await,
            Locator::Surah(surah) => self.fetch_surah(surah, &request.reciter, translation).await,
        };
        crate::diagnostics::log_perf(
            "quran.fetch_verses",
            started,
            &format!("{} reciter={}", request.locator.path_segment(), request.reciter),
        );
        result
    }
}

fn translation_texts(ayahs: Vec<WireAyah>) -> HashMap<u32, String> {
    ayahs
        .into_iter()
        .map(|ayah| (ayah.number, ayah.text))
        .collect()
}

/// Maps service ayahs to verses. `surah` is the envelope-level metadata of a
/// surah response; page responses carry it per ayah instead.
fn build_verses(
    ayahs: Vec<WireAyah>,
    surah: Option<&SurahSummary>,
    mut translations: HashMap<u32, String>,
    locator: Locator,
) -> Vec<Verse> {
    let fallback = match locator {
        Locator::Surah(number) => SurahSummary::placeholder(number),
        Locator::Page(_) => SurahSummary::placeholder(0),
    };

    ayahs
        .into_iter()
        .map(|ayah| {
            let owner = ayah
                .surah
                .or_else(|| surah.cloned())
                .unwrap_or_else(|| fallback.clone());
            Verse {
                number: ayah.number,
                translation: translations.remove(&ayah.number),
                text: ayah.text,
                number_in_surah: ayah.number_in_surah,
                audio_url: ayah.audio.filter(|url| !url.trim().is_empty()),
                surah: owner,
                page: ayah.page,
                juz: ayah.juz,
            }
        })
        .collect()
}

include!("response_models.rs");

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_ONE: &str = r#"{
        "number": 1,
        "ayahs": [
            {"number":1,"text":"بِسْمِ ٱللَّهِ","numberInSurah":1,"juz":1,"page":1,
             "audio":"https://cdn.islamic.network/quran/audio/128/ar.alafasy/1.mp3",
             "surah":{"number":1,"name":"سُورَةُ ٱلْفَاتِحَةِ","englishName":"Al-Faatiha",
                      "englishNameTranslation":"The Opening","revelationType":"Meccan","numberOfAyahs":7}},
            {"number":2,"text":"ٱلْحَمْدُ لِلَّهِ","numberInSurah":2,"juz":1,"page":1,
             "audio":"https://cdn.islamic.network/quran/audio/128/ar.alafasy/2.mp3",
             "surah":{"number":1,"name":"سُورَةُ ٱلْفَاتِحَةِ","englishName":"Al-Faatiha",
                      "englishNameTranslation":"The Opening","revelationType":"Meccan","numberOfAyahs":7}}
        ]
    }"#;

    #[test]
    fn page_ayahs_keep_their_own_surah() {
        let page: WirePage = serde_json::from_str(PAGE_ONE).unwrap();
        let verses = build_verses(page.ayahs, None, HashMap::new(), Locator::Page(1));

        assert_eq!(verses.len(), 2);
        assert!(verses.iter().all(|v| v.surah.number == 1));
        assert_eq!(verses[1].verse_id().to_string(), "1:2");
        assert_eq!(verses[0].page, Some(1));
        assert!(verses[0].translation.is_none());
    }

    #[test]
    fn surah_metadata_is_attached_from_envelope() {
        let surah: WireSurah = serde_json::from_str(
            r#"{"number":112,"name":"سُورَةُ الإِخۡلَاصِ","englishName":"Al-Ikhlaas",
                "englishNameTranslation":"Sincerity","revelationType":"Meccan","numberOfAyahs":4,
                "ayahs":[{"number":6222,"text":"قُلْ هُوَ ٱللَّهُ أَحَدٌ","numberInSurah":1,
                          "audio":"https://cdn.islamic.network/quran/audio/128/ar.alafasy/6222.mp3"}]}"#,
        )
        .unwrap();
        let translations = HashMap::from([(6222, "Say, He is Allah, One".to_string())]);
        let verses = build_verses(
            surah.ayahs,
            Some(&surah.summary),
            translations,
            Locator::Surah(112),
        );

        assert_eq!(verses[0].surah.english_name, "Al-Ikhlaas");
        assert_eq!(verses[0].surah.ayah_count, 4);
        assert_eq!(verses[0].translation.as_deref(), Some("Say, He is Allah, One"));
    }

    #[test]
    fn missing_metadata_gets_a_placeholder() {
        let page: WirePage = serde_json::from_str(
            r#"{"number":3,"ayahs":[{"number":30,"text":"...","numberInSurah":23,"audio":""}]}"#,
        )
        .unwrap();
        let verses = build_verses(page.ayahs, None, HashMap::new(), Locator::Surah(2));

        assert_eq!(verses[0].surah, SurahSummary::placeholder(2));
        assert_eq!(verses[0].audio_url, None);
    }

    #[test]
    fn edition_catalog_parses() {
        let editions: Vec<Edition> = serde_json::from_str(
            r#"[{"identifier":"en.sahih","language":"en","name":"Saheeh International",
                 "englishName":"Saheeh International","format":"text","type":"translation"}]"#,
        )
        .unwrap();
        assert_eq!(editions[0].identifier, "en.sahih");
        assert_eq!(editions[0].kind.as_deref(), Some("translation"));
    }
}

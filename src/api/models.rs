use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SurahSummary {
    pub number: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "englishName")]
    pub english_name: String,
    #[serde(default, alias = "englishNameTranslation")]
    pub english_name_translation: String,
    #[serde(default, alias = "numberOfAyahs")]
    pub ayah_count: u16,
    #[serde(default, alias = "revelationType")]
    pub revelation_type: String,
}

impl SurahSummary {
    /// Stand-in for verse sets that arrive without surah metadata.
    pub fn placeholder(number: u16) -> Self {
        Self {
            number,
            name: format!("Surah {number}"),
            english_name: format!("Surah {number}"),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Global index across the whole mushaf, 1-based.
    pub number: u32,
    pub text: String,
    pub number_in_surah: u16,
    pub audio_url: Option<String>,
    pub surah: SurahSummary,
    pub translation: Option<String>,
    pub page: Option<u16>,
    pub juz: Option<u16>,
}

impl Verse {
    pub fn verse_id(&self) -> VerseId {
        VerseId::new(self.surah.number, self.number_in_surah)
    }
}

/// Composite `"<surah>:<position in surah>"` verse identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseId {
    pub surah: u16,
    pub position: u16,
}

impl VerseId {
    pub fn new(surah: u16, position: u16) -> Self {
        Self { surah, position }
    }
}

impl std::fmt::Display for VerseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.surah, self.position)
    }
}

impl std::str::FromStr for VerseId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (surah, position) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| format!("invalid verse id `{s}`"))?;
        let surah = surah
            .parse::<u16>()
            .map_err(|_| format!("invalid surah in verse id `{s}`"))?;
        let position = position
            .parse::<u16>()
            .map_err(|_| format!("invalid position in verse id `{s}`"))?;
        if surah == 0 || position == 0 {
            return Err(format!("verse id `{s}` is not 1-based"));
        }
        Ok(Self { surah, position })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Edition {
    pub identifier: String,
    #[serde(default, alias = "englishName")]
    pub english_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Named prayer times for a single day, as `HH:MM` strings possibly
/// followed by a timezone suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PrayerTimings {
    #[serde(rename = "Fajr")]
    pub fajr: String,
    #[serde(rename = "Sunrise")]
    pub sunrise: String,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    #[serde(default, rename = "Sunset")]
    pub sunset: String,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    #[serde(rename = "Isha")]
    pub isha: String,
    #[serde(default, rename = "Imsak")]
    pub imsak: String,
    #[serde(default, rename = "Midnight")]
    pub midnight: String,
}

impl PrayerTimings {
    /// The five daily prayers plus sunrise, in the order they occur.
    pub fn daily(&self) -> [(&'static str, &str); 6] {
        [
            ("Fajr", self.fajr.as_str()),
            ("Sunrise", self.sunrise.as_str()),
            ("Dhuhr", self.dhuhr.as_str()),
            ("Asr", self.asr.as_str()),
            ("Maghrib", self.maghrib.as_str()),
            ("Isha", self.isha.as_str()),
        ]
    }

    /// End of suhoor: Imsak when the service reports it, Fajr otherwise.
    pub fn suhoor(&self) -> &str {
        if self.imsak.trim().is_empty() {
            &self.fajr
        } else {
            &self.imsak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerDay {
    pub timings: PrayerTimings,
    pub readable_date: String,
    pub gregorian_date: String,
    pub hijri_date: String,
    pub hijri_day: u8,
    pub hijri_month: String,
    pub hijri_month_number: u8,
    pub hijri_year: String,
    pub weekday: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextPrayer {
    pub name: &'static str,
    pub time: String,
    pub remaining: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RamadanDay {
    pub day: u8,
    pub date: String,
    pub weekday: String,
    pub suhoor: String,
    pub dhuhr: String,
    pub asr: String,
    pub iftar: String,
    pub isha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_id_parses_and_displays() {
        let id: VerseId = "2:255".parse().unwrap();
        assert_eq!(id, VerseId::new(2, 255));
        assert_eq!(id.to_string(), "2:255");
    }

    #[test]
    fn verse_id_rejects_garbage() {
        assert!("2-255".parse::<VerseId>().is_err());
        assert!("x:1".parse::<VerseId>().is_err());
        assert!("0:1".parse::<VerseId>().is_err());
    }

    #[test]
    fn surah_summary_reads_service_field_names() {
        let summary: SurahSummary = serde_json::from_str(
            r#"{"number":1,"name":"سُورَةُ ٱلْفَاتِحَةِ","englishName":"Al-Faatiha",
                "englishNameTranslation":"The Opening","numberOfAyahs":7,
                "revelationType":"Meccan"}"#,
        )
        .unwrap();
        assert_eq!(summary.english_name, "Al-Faatiha");
        assert_eq!(summary.ayah_count, 7);
        assert_eq!(summary.revelation_type, "Meccan");
    }

    #[test]
    fn suhoor_prefers_imsak_over_fajr() {
        let mut timings = PrayerTimings {
            fajr: "05:14 (GMT)".to_string(),
            imsak: "05:04 (GMT)".to_string(),
            ..PrayerTimings::default()
        };
        assert_eq!(timings.suhoor(), "05:04 (GMT)");

        timings.imsak = " ".to_string();
        assert_eq!(timings.suhoor(), "05:14 (GMT)");
    }
}

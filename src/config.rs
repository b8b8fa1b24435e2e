//! Endpoint locations, preference keys and the defaults used when a stored
//! preference is absent or unreadable.

pub const QURAN_API_URL: &str = "https://api.alquran.cloud/v1";
pub const PRAYER_API_URL: &str = "https://api.aladhan.com/v1";
pub const GEOCODE_API_URL: &str = "https://nominatim.openstreetmap.org";

pub const FIRST_PAGE: u16 = 1;
pub const LAST_PAGE: u16 = 604;
pub const FIRST_SURAH: u16 = 1;
pub const LAST_SURAH: u16 = 114;

pub const DEFAULT_RECITER: &str = "ar.alafasy";
pub const DEFAULT_VERSE_REPEAT_COUNT: u32 = 2;
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Muslim World League.
pub const DEFAULT_PRAYER_METHOD: u8 = 3;
pub const DEFAULT_LOCATION: &str = "London, UK";

/// Lifetime of every stored preference, in days.
pub const PREFERENCE_TTL_DAYS: u32 = 360;

pub mod keys {
    pub const RECITER: &str = "quranReciter";
    pub const TRANSLATION: &str = "quranTranslation";
    pub const BOOKMARKS: &str = "quranBookmarks";
    pub const PROGRESS: &str = "quranProgress";
    pub const PRAYER_LOCATION: &str = "prayerLocation";
    pub const PRAYER_METHOD: &str = "prayerMethod";
}

use super::{KeyValueStore, StorageError};
use crate::api::{Locator, VerseId};
use crate::config::{
    keys, DEFAULT_LOCATION, DEFAULT_PRAYER_METHOD, DEFAULT_RECITER, PREFERENCE_TTL_DAYS,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where the reader last stopped, written only when the user asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMarker {
    pub locator: Locator,
    /// Position of the cursor verse within its surah.
    pub verse_position: Option<u16>,
    /// Surah owning that verse; needed to pick it out of a page spanning two
    /// surahs.
    #[serde(default)]
    pub verse_surah: Option<u16>,
}

fn read_trimmed(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    store
        .get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn load_reciter(store: &dyn KeyValueStore) -> String {
    read_trimmed(store, keys::RECITER).unwrap_or_else(|| DEFAULT_RECITER.to_string())
}

pub fn save_reciter(store: &dyn KeyValueStore, reciter: &str) -> Result<(), StorageError> {
    store.set(keys::RECITER, reciter, PREFERENCE_TTL_DAYS)
}

pub fn load_translation(store: &dyn KeyValueStore) -> Option<String> {
    read_trimmed(store, keys::TRANSLATION)
}

pub fn save_translation(
    store: &dyn KeyValueStore,
    translation: Option<&str>,
) -> Result<(), StorageError> {
    match translation {
        Some(edition) => store.set(keys::TRANSLATION, edition, PREFERENCE_TTL_DAYS),
        None => store.remove(keys::TRANSLATION),
    }
}

/// Unreadable payloads give an empty set; unreadable entries are skipped.
pub fn load_bookmarks(store: &dyn KeyValueStore) -> BTreeSet<VerseId> {
    let Some(raw) = store.get(keys::BOOKMARKS) else {
        return BTreeSet::new();
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => ids.iter().filter_map(|id| id.parse().ok()).collect(),
        Err(err) => {
            tracing::warn!("ignoring unreadable bookmarks: {err}");
            BTreeSet::new()
        }
    }
}

pub fn save_bookmarks(
    store: &dyn KeyValueStore,
    bookmarks: &BTreeSet<VerseId>,
) -> Result<(), StorageError> {
    let ids: Vec<String> = bookmarks.iter().map(VerseId::to_string).collect();
    let json = serde_json::to_string(&ids).map_err(|e| StorageError::Encode(e.to_string()))?;
    store.set(keys::BOOKMARKS, &json, PREFERENCE_TTL_DAYS)
}

pub fn load_progress(store: &dyn KeyValueStore) -> Option<ProgressMarker> {
    let raw = store.get(keys::PROGRESS)?;
    serde_json::from_str(&raw).ok()
}

pub fn save_progress(store: &dyn KeyValueStore, marker: &ProgressMarker) -> Result<(), StorageError> {
    let json = serde_json::to_string(marker).map_err(|e| StorageError::Encode(e.to_string()))?;
    store.set(keys::PROGRESS, &json, PREFERENCE_TTL_DAYS)
}

pub fn load_prayer_location(store: &dyn KeyValueStore) -> String {
    read_trimmed(store, keys::PRAYER_LOCATION).unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

pub fn save_prayer_location(store: &dyn KeyValueStore, location: &str) -> Result<(), StorageError> {
    store.set(keys::PRAYER_LOCATION, location, PREFERENCE_TTL_DAYS)
}

pub fn load_prayer_method(store: &dyn KeyValueStore) -> u8 {
    read_trimmed(store, keys::PRAYER_METHOD)
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PRAYER_METHOD)
}

pub fn save_prayer_method(store: &dyn KeyValueStore, method: u8) -> Result<(), StorageError> {
    store.set(keys::PRAYER_METHOD, &method.to_string(), PREFERENCE_TTL_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn defaults_apply_to_an_empty_store() {
        let store = MemoryStore::new();
        assert_eq!(load_reciter(&store), "ar.alafasy");
        assert_eq!(load_translation(&store), None);
        assert!(load_bookmarks(&store).is_empty());
        assert_eq!(load_progress(&store), None);
        assert_eq!(load_prayer_location(&store), "London, UK");
        assert_eq!(load_prayer_method(&store), 3);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let store = MemoryStore::new();
        store.set(keys::BOOKMARKS, "{not json", 360).unwrap();
        store.set(keys::PRAYER_METHOD, "many", 360).unwrap();
        store.set(keys::PROGRESS, "[1,2]", 360).unwrap();
        store.set(keys::RECITER, "   ", 360).unwrap();

        assert!(load_bookmarks(&store).is_empty());
        assert_eq!(load_prayer_method(&store), 3);
        assert_eq!(load_progress(&store), None);
        assert_eq!(load_reciter(&store), "ar.alafasy");
    }

    #[test]
    fn bookmarks_skip_unreadable_entries() {
        let store = MemoryStore::new();
        store
            .set(keys::BOOKMARKS, r#"["2:255","bogus","36:1"]"#, 360)
            .unwrap();
        let bookmarks = load_bookmarks(&store);
        assert_eq!(bookmarks.len(), 2);
        assert!(bookmarks.contains(&VerseId::new(36, 1)));
    }

    #[test]
    fn bookmarks_are_stored_as_a_json_array() {
        let store = MemoryStore::new();
        let bookmarks = BTreeSet::from([VerseId::new(1, 1), VerseId::new(2, 255)]);
        save_bookmarks(&store, &bookmarks).unwrap();
        assert_eq!(
            store.get(keys::BOOKMARKS).as_deref(),
            Some(r#"["1:1","2:255"]"#)
        );
        assert_eq!(load_bookmarks(&store), bookmarks);
    }

    #[test]
    fn clearing_the_translation_removes_it() {
        let store = MemoryStore::new();
        save_translation(&store, Some("en.sahih")).unwrap();
        assert_eq!(load_translation(&store).as_deref(), Some("en.sahih"));
        save_translation(&store, None).unwrap();
        assert_eq!(load_translation(&store), None);
    }

    #[test]
    fn progress_survives_a_round_trip() {
        let store = MemoryStore::new();
        let marker = ProgressMarker {
            locator: Locator::Page(42),
            verse_position: Some(7),
            verse_surah: Some(2),
        };
        save_progress(&store, &marker).unwrap();
        assert_eq!(load_progress(&store), Some(marker));
    }
}

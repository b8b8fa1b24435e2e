use super::{AudioEvents, AudioSink, ReaderError};
use crate::api::{ApiError, Locator, QuranSource, SurahSummary, Verse, VerseId, VerseSetRequest};
use crate::config::{
    DEFAULT_VERSE_REPEAT_COUNT, DEFAULT_VOLUME, FIRST_PAGE, FIRST_SURAH, LAST_PAGE, LAST_SURAH,
};
use crate::db::{self, KeyValueStore, ProgressMarker};
use std::collections::BTreeSet;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    #[default]
    None,
    /// Play the cursor verse `verse_repeat_count` times, then stop on it.
    Verse,
    /// Loop the whole loaded set.
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// What `on_audio_ended` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndedTransition {
    Repeat(usize),
    Advance(usize),
    Wrap,
    Stop,
    Ignored,
}

/// Read-only view of a reading session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub locator: Option<Locator>,
    pub verses: Vec<Verse>,
    pub surah: Option<SurahSummary>,
    /// Always a valid index into `verses` when set.
    pub cursor: Option<usize>,
    pub status: PlaybackStatus,
    pub loading: bool,
    pub error: Option<String>,
    pub repeat_mode: RepeatMode,
    pub verse_repeat_count: u32,
    /// Completed plays of the cursor verse under `RepeatMode::Verse`.
    pub repeat_counter: u32,
    pub reciter: String,
    pub translation: Option<String>,
    pub volume: f64,
}

impl SessionState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn current_verse(&self) -> Option<&Verse> {
        self.cursor.and_then(|index| self.verses.get(index))
    }

    pub fn page(&self) -> Option<u16> {
        match self.locator {
            Some(Locator::Page(page)) => Some(page),
            _ => None,
        }
    }
}

/// A fetch the caller must perform and hand back through `apply_load`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub request: VerseSetRequest,
}

/// Cursor to re-establish once the next verse set arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CursorAnchor {
    verse: Option<VerseId>,
    index: usize,
}

impl CursorAnchor {
    /// Same verse when present, otherwise the old index clamped to the new
    /// bounds.
    fn resolve(self, verses: &[Verse]) -> Option<usize> {
        if verses.is_empty() {
            return None;
        }
        if let Some(id) = self.verse {
            if let Some(found) = verses.iter().position(|verse| verse.verse_id() == id) {
                return Some(found);
            }
        }
        Some(self.index.min(verses.len() - 1))
    }
}

pub struct ReadingSession {
    state: SessionState,
    audio: Box<dyn AudioSink>,
    store: Rc<dyn KeyValueStore>,
    bookmarks: BTreeSet<VerseId>,
    load_generation: u64,
    playback_token: u64,
    restore: Option<CursorAnchor>,
}

impl ReadingSession {
    /// Starts an empty session with reciter, translation and bookmarks read
    /// from `store`.
    pub fn new(audio: Box<dyn AudioSink>, store: Rc<dyn KeyValueStore>) -> Self {
        let state = SessionState {
            locator: None,
            verses: Vec::new(),
            surah: None,
            cursor: None,
            status: PlaybackStatus::Idle,
            loading: false,
            error: None,
            repeat_mode: RepeatMode::None,
            verse_repeat_count: DEFAULT_VERSE_REPEAT_COUNT,
            repeat_counter: 0,
            reciter: db::load_reciter(store.as_ref()),
            translation: db::load_translation(store.as_ref()),
            volume: DEFAULT_VOLUME,
        };
        let bookmarks = db::load_bookmarks(store.as_ref());
        Self {
            state,
            audio,
            store,
            bookmarks,
            load_generation: 0,
            playback_token: 0,
            restore: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn playback_token(&self) -> u64 {
        self.playback_token
    }

    // ---- loading ---------------------------------------------------------

    pub fn begin_load_page(&mut self, page: u16, reciter: &str) -> Result<LoadTicket, ReaderError> {
        if !(FIRST_PAGE..=LAST_PAGE).contains(&page) {
            return Err(ReaderError::PageOutOfRange(page));
        }
        self.set_reciter_for_load(reciter);
        Ok(self.start_load(Locator::Page(page), None))
    }

    pub fn begin_load_surah(
        &mut self,
        surah: u16,
        reciter: &str,
    ) -> Result<LoadTicket, ReaderError> {
        if !(FIRST_SURAH..=LAST_SURAH).contains(&surah) {
            return Err(ReaderError::SurahOutOfRange(surah));
        }
        self.set_reciter_for_load(reciter);
        Ok(self.start_load(Locator::Surah(surah), None))
    }

    fn set_reciter_for_load(&mut self, reciter: &str) {
        let reciter = reciter.trim();
        if !reciter.is_empty() {
            self.state.reciter = reciter.to_string();
        }
    }

    /// Supersedes any in-flight load and detaches the current audio source.
    fn start_load(&mut self, locator: Locator, restore: Option<CursorAnchor>) -> LoadTicket {
        self.audio.stop();
        self.playback_token += 1;
        self.load_generation += 1;
        self.restore = restore;

        let state = &mut self.state;
        state.locator = Some(locator);
        state.cursor = None;
        state.status = PlaybackStatus::Idle;
        state.repeat_counter = 0;
        state.loading = true;
        state.error = None;

        info!(
            ?locator,
            reciter = %state.reciter,
            translation = ?state.translation,
            generation = self.load_generation,
            "Loading verse set"
        );

        LoadTicket {
            generation: self.load_generation,
            request: VerseSetRequest {
                locator,
                reciter: state.reciter.clone(),
                translation: state.translation.clone(),
            },
        }
    }

    /// Applies a fetch result. Returns `false`, leaving state untouched, when
    /// `generation` has been superseded by a later load.
    pub fn apply_load(&mut self, generation: u64, result: Result<Vec<Verse>, ApiError>) -> bool {
        if generation != self.load_generation || !self.state.loading {
            debug!(
                generation,
                current = self.load_generation,
                "Ignoring stale verse set"
            );
            return false;
        }

        let restore = self.restore.take();
        let state = &mut self.state;
        state.loading = false;
        match result {
            Ok(verses) => {
                state.surah = derive_summary(&verses, state.locator);
                state.cursor = restore.and_then(|anchor| anchor.resolve(&verses));
                state.verses = verses;
                state.error = None;
                info!(
                    verses = state.verses.len(),
                    cursor = ?state.cursor,
                    "Verse set loaded"
                );
            }
            Err(err) => {
                warn!(locator = ?state.locator, "Verse set failed to load: {err}");
                state.verses.clear();
                state.surah = None;
                state.cursor = None;
                state.error = Some(err.to_string());
            }
        }
        true
    }

    /// Fetches `ticket` from `source` and applies the result. A fetch failure
    /// is recorded in the session state and also returned.
    pub async fn fetch_and_apply<Q: QuranSource>(
        &mut self,
        source: &Q,
        ticket: LoadTicket,
    ) -> Result<(), ReaderError> {
        let result = source.fetch_verses(&ticket.request).await;
        let failure = result.as_ref().err().cloned();
        self.apply_load(ticket.generation, result);
        match failure {
            Some(err) => Err(ReaderError::Content(err)),
            None => Ok(()),
        }
    }

    pub async fn load_page<Q: QuranSource>(
        &mut self,
        source: &Q,
        page: u16,
        reciter: &str,
    ) -> Result<(), ReaderError> {
        let ticket = self.begin_load_page(page, reciter)?;
        self.fetch_and_apply(source, ticket).await
    }

    pub async fn load_surah<Q: QuranSource>(
        &mut self,
        source: &Q,
        surah: u16,
        reciter: &str,
    ) -> Result<(), ReaderError> {
        let ticket = self.begin_load_surah(surah, reciter)?;
        self.fetch_and_apply(source, ticket).await
    }

    // ---- playback --------------------------------------------------------

    pub fn play_verse(&mut self, index: usize) -> Result<(), ReaderError> {
        if self.state.loading {
            return Err(ReaderError::LoadInProgress);
        }
        let len = self.state.verses.len();
        if index >= len {
            return Err(ReaderError::VerseOutOfRange { index, len });
        }
        self.state.repeat_counter = 0;
        self.start_playback(index);
        Ok(())
    }

    fn start_playback(&mut self, index: usize) {
        self.state.cursor = Some(index);
        self.playback_token += 1;

        let Some(url) = self.state.verses[index].audio_url.clone() else {
            warn!(index, "Verse has no audio for the selected reciter");
            self.audio.stop();
            self.state.status = PlaybackStatus::Idle;
            return;
        };

        match self
            .audio
            .play_source(&url, self.state.volume, self.playback_token)
        {
            Ok(()) => {
                debug!(index, token = self.playback_token, "Playing verse");
                self.state.status = PlaybackStatus::Playing;
            }
            Err(err) => {
                warn!(index, "Verse playback did not start: {err}");
                self.state.status = PlaybackStatus::Paused;
            }
        }
    }

    /// Reported by the audio backend when playback of `token`'s source fails
    /// after the fact. Failures for superseded sources are ignored.
    pub fn on_playback_failed(&mut self, token: u64) -> bool {
        if token != self.playback_token || self.state.status != PlaybackStatus::Playing {
            return false;
        }
        warn!(token, "Playback failed; pausing");
        self.state.status = PlaybackStatus::Paused;
        true
    }

    pub fn toggle_play_pause(&mut self) {
        if self.state.loading {
            return;
        }
        let Some(cursor) = self.state.cursor else {
            return;
        };
        match self.state.status {
            PlaybackStatus::Playing => {
                self.audio.pause();
                self.state.status = PlaybackStatus::Paused;
            }
            PlaybackStatus::Paused => match self.audio.resume(self.playback_token) {
                Ok(()) => self.state.status = PlaybackStatus::Playing,
                Err(err) => warn!("Resume failed: {err}"),
            },
            PlaybackStatus::Idle => self.start_playback(cursor),
        }
    }

    /// Completion event of the audio resource.
    pub fn on_audio_ended(&mut self) -> EndedTransition {
        if self.state.loading || self.state.status != PlaybackStatus::Playing {
            return EndedTransition::Ignored;
        }
        let len = self.state.verses.len();
        let Some(cursor) = self.state.cursor.filter(|&cursor| cursor < len) else {
            self.state.status = PlaybackStatus::Idle;
            return EndedTransition::Stop;
        };

        if self.state.repeat_mode == RepeatMode::Verse
            && self.state.repeat_counter + 1 < self.state.verse_repeat_count
        {
            self.state.repeat_counter += 1;
            self.start_playback(cursor);
            return EndedTransition::Repeat(cursor);
        }

        self.state.repeat_counter = 0;
        if self.state.repeat_mode == RepeatMode::Verse {
            debug!(cursor, "Verse repeats finished");
            self.state.status = PlaybackStatus::Idle;
            return EndedTransition::Stop;
        }
        if cursor + 1 < len {
            self.start_playback(cursor + 1);
            EndedTransition::Advance(cursor + 1)
        } else if self.state.repeat_mode == RepeatMode::Set {
            self.start_playback(0);
            EndedTransition::Wrap
        } else {
            debug!("Reached the end of the verse set");
            self.state.status = PlaybackStatus::Idle;
            EndedTransition::Stop
        }
    }

    /// Routes polled backend events into the state machine. Events tagged
    /// with a superseded token are dropped.
    pub fn apply_audio_events(&mut self, events: AudioEvents) -> Option<EndedTransition> {
        if let Some(token) = events.failed_token {
            self.on_playback_failed(token);
        }
        match events.ended_token {
            Some(token) if token == self.playback_token => Some(self.on_audio_ended()),
            Some(token) => {
                debug!(token, current = self.playback_token, "Ignoring stale ended event");
                None
            }
            None => None,
        }
    }

    // ---- configuration ---------------------------------------------------

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.state.repeat_mode = mode;
        self.state.repeat_counter = 0;
    }

    pub fn set_verse_repeat_count(&mut self, count: u32) {
        self.state.verse_repeat_count = count.max(1);
        self.state.repeat_counter = 0;
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            DEFAULT_VOLUME
        };
        self.state.volume = volume;
        self.audio.set_volume(volume);
    }

    /// Switches reciter and, when something is loaded, returns the reload.
    pub fn change_reciter(&mut self, reciter: &str) -> Option<LoadTicket> {
        let reciter = reciter.trim();
        if reciter.is_empty() || reciter == self.state.reciter {
            return None;
        }
        self.state.reciter = reciter.to_string();
        if let Err(err) = db::save_reciter(self.store.as_ref(), reciter) {
            warn!("Could not persist reciter: {err}");
        }
        self.reload_preserving_cursor()
    }

    /// Switches (or with `None` clears) the translation edition and, when
    /// something is loaded, returns the reload.
    pub fn change_translation(&mut self, translation: Option<&str>) -> Option<LoadTicket> {
        let translation = translation
            .map(str::trim)
            .filter(|edition| !edition.is_empty())
            .map(str::to_string);
        if translation == self.state.translation {
            return None;
        }
        self.state.translation = translation;
        if let Err(err) = db::save_translation(self.store.as_ref(), self.state.translation.as_deref())
        {
            warn!("Could not persist translation: {err}");
        }
        self.reload_preserving_cursor()
    }

    fn reload_preserving_cursor(&mut self) -> Option<LoadTicket> {
        let locator = self.state.locator?;
        let anchor = self.current_anchor().or(self.restore);
        Some(self.start_load(locator, anchor))
    }

    fn current_anchor(&self) -> Option<CursorAnchor> {
        let index = self.state.cursor?;
        let verse = self.state.verses.get(index)?;
        Some(CursorAnchor {
            verse: Some(verse.verse_id()),
            index,
        })
    }

    // ---- bookmarks and progress -----------------------------------------

    /// Adds or removes `id`; returns whether it is bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, id: VerseId) -> Result<bool, ReaderError> {
        let bookmarked = if self.bookmarks.remove(&id) {
            false
        } else {
            self.bookmarks.insert(id);
            true
        };
        db::save_bookmarks(self.store.as_ref(), &self.bookmarks)?;
        Ok(bookmarked)
    }

    pub fn is_bookmarked(&self, id: VerseId) -> bool {
        self.bookmarks.contains(&id)
    }

    pub fn bookmarks(&self) -> &BTreeSet<VerseId> {
        &self.bookmarks
    }

    pub fn save_progress(&self) -> Result<(), ReaderError> {
        let locator = self.state.locator.ok_or(ReaderError::NothingLoaded)?;
        let verse = self.state.current_verse();
        let marker = ProgressMarker {
            locator,
            verse_position: verse.map(|verse| verse.number_in_surah),
            verse_surah: verse.map(|verse| verse.surah.number),
        };
        db::save_progress(self.store.as_ref(), &marker)?;
        info!(?locator, verse = ?marker.verse_position, "Saved reading progress");
        Ok(())
    }

    /// Reload of the saved progress marker, restoring its verse as cursor.
    pub fn resume_progress(&mut self) -> Option<LoadTicket> {
        let marker = db::load_progress(self.store.as_ref())?;
        let valid = match marker.locator {
            Locator::Page(page) => (FIRST_PAGE..=LAST_PAGE).contains(&page),
            Locator::Surah(surah) => (FIRST_SURAH..=LAST_SURAH).contains(&surah),
        };
        if !valid {
            warn!(locator = ?marker.locator, "Ignoring out-of-range saved progress");
            return None;
        }

        let surah = marker.verse_surah.or(match marker.locator {
            Locator::Surah(surah) => Some(surah),
            Locator::Page(_) => None,
        });
        let anchor = marker.verse_position.map(|position| CursorAnchor {
            verse: surah.map(|surah| VerseId::new(surah, position)),
            index: usize::from(position.saturating_sub(1)),
        });
        Some(self.start_load(marker.locator, anchor))
    }

    // ---- navigation ------------------------------------------------------

    pub fn next_page(&mut self) -> Result<Option<LoadTicket>, ReaderError> {
        self.step_page(1)
    }

    pub fn prev_page(&mut self) -> Result<Option<LoadTicket>, ReaderError> {
        self.step_page(-1)
    }

    fn step_page(&mut self, delta: i32) -> Result<Option<LoadTicket>, ReaderError> {
        let page = self.state.page().ok_or(ReaderError::NotInPageMode)?;
        let target = (i32::from(page) + delta).clamp(i32::from(FIRST_PAGE), i32::from(LAST_PAGE));
        let target = u16::try_from(target).unwrap_or(page);
        if target == page {
            return Ok(None);
        }
        Ok(Some(self.start_load(Locator::Page(target), None)))
    }

    /// Stops audio and drops any in-flight load; used when the reading view
    /// goes away.
    pub fn detach(&mut self) {
        self.audio.stop();
        self.playback_token += 1;
        self.load_generation += 1;
        self.state.loading = false;
        self.state.status = PlaybackStatus::Idle;
    }
}

impl Drop for ReadingSession {
    fn drop(&mut self) {
        self.audio.stop();
    }
}

fn derive_summary(verses: &[Verse], locator: Option<Locator>) -> Option<SurahSummary> {
    let first = verses.first()?;
    if first.surah.number != 0 && !first.surah.name.trim().is_empty() {
        return Some(first.surah.clone());
    }
    let number = match locator {
        Some(Locator::Surah(surah)) => surah,
        _ => first.surah.number,
    };
    Some(SurahSummary::placeholder(number))
}

#[cfg(test)]
mod tests {
    use super::super::audio::recording::{AudioCall, RecordingSink};
    use super::*;
    use crate::db::MemoryStore;
    use std::cell::RefCell;

    fn surah_summary(number: u16, ayahs: u16) -> SurahSummary {
        SurahSummary {
            number,
            name: format!("سورة {number}"),
            english_name: format!("Surah-{number}"),
            english_name_translation: String::new(),
            ayah_count: ayahs,
            revelation_type: "Meccan".to_string(),
        }
    }

    fn verse(surah: u16, position: u16, global: u32, reciter: &str) -> Verse {
        Verse {
            number: global,
            text: format!("verse {surah}:{position}"),
            number_in_surah: position,
            audio_url: Some(format!(
                "https://cdn.islamic.network/quran/audio/128/{reciter}/{global}.mp3"
            )),
            surah: surah_summary(surah, 7),
            translation: None,
            page: Some(1),
            juz: Some(1),
        }
    }

    fn surah_verses(surah: u16, count: u16, first_global: u32, reciter: &str) -> Vec<Verse> {
        (1..=count)
            .map(|position| verse(surah, position, first_global + u32::from(position) - 1, reciter))
            .collect()
    }

    /// Serves whatever verse list is queued next and records requests.
    #[derive(Default)]
    struct FakeSource {
        responses: RefCell<Vec<Result<Vec<Verse>, ApiError>>>,
        requests: RefCell<Vec<VerseSetRequest>>,
    }

    impl FakeSource {
        fn serving(responses: Vec<Result<Vec<Verse>, ApiError>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl QuranSource for FakeSource {
        async fn fetch_verses(&self, request: &VerseSetRequest) -> Result<Vec<Verse>, ApiError> {
            self.requests.borrow_mut().push(request.clone());
            self.responses.borrow_mut().remove(0)
        }
    }

    fn session() -> (ReadingSession, RecordingSink, MemoryStore) {
        let sink = RecordingSink::default();
        let store = MemoryStore::new();
        let session = ReadingSession::new(Box::new(sink.clone()), Rc::new(store.clone()));
        (session, sink, store)
    }

    fn loaded(count: u16) -> (ReadingSession, RecordingSink, MemoryStore) {
        let (mut session, sink, store) = session();
        let ticket = session.begin_load_surah(1, "ar.alafasy").unwrap();
        assert!(session.apply_load(ticket.generation, Ok(surah_verses(1, count, 1, "ar.alafasy"))));
        (session, sink, store)
    }

    #[tokio::test]
    async fn fatihah_advances_after_first_verse() {
        let (mut session, sink, _) = session();
        let source = FakeSource::serving(vec![Ok(surah_verses(1, 7, 1, "ar.alafasy"))]);
        session.load_surah(&source, 1, "ar.alafasy").await.unwrap();

        assert_eq!(session.state().verses.len(), 7);
        assert_eq!(session.state().surah.as_ref().map(|s| s.number), Some(1));
        assert_eq!(
            source.requests.borrow()[0],
            VerseSetRequest {
                locator: Locator::Surah(1),
                reciter: "ar.alafasy".to_string(),
                translation: None,
            }
        );

        session.play_verse(0).unwrap();
        assert_eq!(session.on_audio_ended(), EndedTransition::Advance(1));
        assert_eq!(session.state().cursor, Some(1));
        assert!(session.state().is_playing());
        assert_eq!(
            sink.played_urls().last().map(String::as_str),
            Some("https://cdn.islamic.network/quran/audio/128/ar.alafasy/2.mp3")
        );
    }

    #[test]
    fn whole_set_repeat_wraps_to_start() {
        let (mut session, _, _) = loaded(5);
        session.set_repeat_mode(RepeatMode::Set);
        session.play_verse(4).unwrap();

        assert_eq!(session.on_audio_ended(), EndedTransition::Wrap);
        assert_eq!(session.state().cursor, Some(0));
        assert!(session.state().is_playing());
    }

    #[test]
    fn no_repeat_stops_after_last_verse() {
        let (mut session, sink, _) = loaded(3);
        session.play_verse(2).unwrap();
        let plays = sink.played_urls().len();

        assert_eq!(session.on_audio_ended(), EndedTransition::Stop);
        assert_eq!(session.state().status, PlaybackStatus::Idle);
        assert_eq!(session.state().cursor, Some(2));
        assert_eq!(sink.played_urls().len(), plays);
    }

    #[test]
    fn verse_repeat_plays_count_times_then_stops_on_the_verse() {
        let (mut session, sink, _) = loaded(4);
        session.set_repeat_mode(RepeatMode::Verse);
        session.set_verse_repeat_count(3);
        session.play_verse(0).unwrap();

        assert_eq!(session.on_audio_ended(), EndedTransition::Repeat(0));
        assert_eq!(session.on_audio_ended(), EndedTransition::Repeat(0));
        assert_eq!(session.state().cursor, Some(0));
        let plays = sink.played_urls().len();

        assert_eq!(session.on_audio_ended(), EndedTransition::Stop);
        assert_eq!(session.state().cursor, Some(0));
        assert_eq!(session.state().status, PlaybackStatus::Idle);
        assert_eq!(session.state().repeat_counter, 0);
        assert_eq!(sink.played_urls().len(), plays);
    }

    #[test]
    fn verse_repeat_of_two_does_not_advance() {
        let (mut session, _, _) = loaded(4);
        session.set_repeat_mode(RepeatMode::Verse);
        session.set_verse_repeat_count(2);
        session.play_verse(0).unwrap();

        assert_eq!(session.on_audio_ended(), EndedTransition::Repeat(0));
        assert_eq!(session.on_audio_ended(), EndedTransition::Stop);
        assert_eq!(session.state().cursor, Some(0));
        assert!(!session.state().is_playing());
    }

    #[test]
    fn verse_repeat_stops_at_the_end_of_the_set() {
        let (mut session, _, _) = loaded(2);
        session.set_repeat_mode(RepeatMode::Verse);
        session.set_verse_repeat_count(2);
        session.play_verse(1).unwrap();

        assert_eq!(session.on_audio_ended(), EndedTransition::Repeat(1));
        assert_eq!(session.on_audio_ended(), EndedTransition::Stop);
    }

    #[test]
    fn out_of_range_play_changes_nothing() {
        let (mut session, sink, _) = loaded(7);
        session.play_verse(2).unwrap();
        let before = session.state().clone();
        let calls = sink.calls.borrow().len();

        assert_eq!(
            session.play_verse(7),
            Err(ReaderError::VerseOutOfRange { index: 7, len: 7 })
        );
        assert_eq!(session.state(), &before);
        assert_eq!(sink.calls.borrow().len(), calls);
    }

    #[test]
    fn playback_is_refused_while_loading() {
        let (mut session, _, _) = loaded(7);
        session.begin_load_page(2, "ar.alafasy").unwrap();
        assert_eq!(session.play_verse(0), Err(ReaderError::LoadInProgress));
    }

    #[test]
    fn blocked_playback_degrades_to_paused() {
        let (mut session, sink, _) = loaded(3);
        *sink.fail_play.borrow_mut() = true;
        session.play_verse(1).unwrap();

        assert_eq!(session.state().status, PlaybackStatus::Paused);
        assert_eq!(session.state().cursor, Some(1));
        assert_eq!(session.state().verses.len(), 3);
    }

    #[test]
    fn late_failure_only_counts_for_the_current_source() {
        let (mut session, _, _) = loaded(3);
        session.play_verse(0).unwrap();
        let stale = session.playback_token();
        session.play_verse(1).unwrap();

        assert!(!session.on_playback_failed(stale));
        assert!(session.state().is_playing());
        assert!(session.on_playback_failed(session.playback_token()));
        assert_eq!(session.state().status, PlaybackStatus::Paused);
    }

    #[test]
    fn toggle_pauses_resumes_and_replays() {
        let (mut session, sink, _) = loaded(3);
        session.toggle_play_pause();
        assert!(sink.calls.borrow().iter().all(|c| *c == AudioCall::Stop));

        session.play_verse(0).unwrap();
        session.toggle_play_pause();
        assert_eq!(session.state().status, PlaybackStatus::Paused);
        assert_eq!(sink.last(), Some(AudioCall::Pause));

        session.toggle_play_pause();
        assert!(session.state().is_playing());
        assert!(matches!(sink.last(), Some(AudioCall::Resume { .. })));

        session.play_verse(2).unwrap();
        session.on_audio_ended();
        assert_eq!(session.state().status, PlaybackStatus::Idle);
        session.toggle_play_pause();
        assert!(session.state().is_playing());
        assert_eq!(session.state().cursor, Some(2));
    }

    #[test]
    fn stale_load_is_ignored() {
        let (mut session, _, _) = session();
        let first = session.begin_load_page(1, "ar.alafasy").unwrap();
        let second = session.begin_load_page(2, "ar.alafasy").unwrap();

        assert!(session.apply_load(second.generation, Ok(surah_verses(2, 5, 8, "ar.alafasy"))));
        let settled = session.state().clone();
        assert!(!session.apply_load(first.generation, Ok(surah_verses(1, 7, 1, "ar.alafasy"))));
        assert_eq!(session.state(), &settled);
        assert_eq!(session.state().locator, Some(Locator::Page(2)));
    }

    #[tokio::test]
    async fn failed_load_clears_the_set() {
        let (mut session, _, _) = loaded(7);
        let source = FakeSource::serving(vec![Err(ApiError::Status(503))]);

        let result = session.load_page(&source, 3, "ar.alafasy").await;
        assert_eq!(result, Err(ReaderError::Content(ApiError::Status(503))));

        let state = session.state();
        assert!(state.verses.is_empty());
        assert_eq!(state.cursor, None);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("service responded with status 503"));
    }

    #[test]
    fn invalid_locators_are_rejected_without_change() {
        let (mut session, _, _) = loaded(7);
        let before = session.state().clone();
        assert_eq!(
            session.begin_load_page(605, "ar.alafasy"),
            Err(ReaderError::PageOutOfRange(605))
        );
        assert_eq!(
            session.begin_load_surah(0, "ar.alafasy"),
            Err(ReaderError::SurahOutOfRange(0))
        );
        assert_eq!(session.state(), &before);
    }

    #[test]
    fn starting_a_load_stops_audio() {
        let (mut session, sink, _) = loaded(7);
        session.play_verse(3).unwrap();
        session.begin_load_page(10, "ar.alafasy").unwrap();

        assert_eq!(sink.last(), Some(AudioCall::Stop));
        assert_eq!(session.state().status, PlaybackStatus::Idle);
        assert!(session.state().loading);
    }

    #[test]
    fn reciter_change_keeps_the_verse_not_the_index() {
        let (mut session, _, store) = session();
        let ticket = session.begin_load_surah(3, "ar.alafasy").unwrap();
        session.apply_load(ticket.generation, Ok(surah_verses(3, 20, 294, "ar.alafasy")));
        session.play_verse(3).unwrap();

        let ticket = session.change_reciter("ar.sudais").unwrap();
        assert_eq!(ticket.request.reciter, "ar.sudais");
        assert_eq!(store.get("quranReciter").as_deref(), Some("ar.sudais"));

        let mut refetched = vec![verse(2, 285, 292, "ar.sudais"), verse(2, 286, 293, "ar.sudais")];
        refetched.extend(surah_verses(3, 20, 294, "ar.sudais"));
        session.apply_load(ticket.generation, Ok(refetched));

        let current = session.state().current_verse().unwrap();
        assert_eq!(session.state().cursor, Some(5));
        assert_eq!(current.verse_id(), VerseId::new(3, 4));
    }

    #[test]
    fn translation_change_clamps_when_the_verse_is_gone() {
        let (mut session, _, store) = loaded(7);
        session.play_verse(6).unwrap();

        let ticket = session.change_translation(Some("en.sahih")).unwrap();
        assert_eq!(ticket.request.translation.as_deref(), Some("en.sahih"));
        assert_eq!(store.get("quranTranslation").as_deref(), Some("en.sahih"));

        session.apply_load(ticket.generation, Ok(surah_verses(2, 4, 8, "ar.alafasy")));
        assert_eq!(session.state().cursor, Some(3));
    }

    #[test]
    fn unchanged_reciter_does_not_reload() {
        let (mut session, _, _) = loaded(7);
        assert_eq!(session.change_reciter("ar.alafasy"), None);
        assert_eq!(session.change_translation(None), None);
    }

    #[test]
    fn bookmark_toggle_round_trips_and_persists() {
        let (mut session, _, store) = loaded(7);
        let id = VerseId::new(1, 5);
        let original = session.bookmarks().clone();

        assert!(session.toggle_bookmark(id).unwrap());
        assert!(session.is_bookmarked(id));
        assert_eq!(store.get("quranBookmarks").as_deref(), Some(r#"["1:5"]"#));

        assert!(!session.toggle_bookmark(id).unwrap());
        assert_eq!(session.bookmarks(), &original);
        assert_eq!(store.get("quranBookmarks").as_deref(), Some("[]"));
    }

    #[test]
    fn bookmarks_are_restored_from_storage() {
        let store = MemoryStore::new();
        store.set("quranBookmarks", r#"["2:255"]"#, 360).unwrap();
        let session = ReadingSession::new(Box::new(RecordingSink::default()), Rc::new(store));
        assert!(session.is_bookmarked(VerseId::new(2, 255)));
    }

    #[test]
    fn progress_is_saved_and_resumed() {
        let (mut session, _, store) = session();
        let ticket = session.begin_load_page(50, "ar.alafasy").unwrap();
        session.apply_load(ticket.generation, Ok(surah_verses(2, 9, 300, "ar.alafasy")));
        session.play_verse(4).unwrap();
        session.save_progress().unwrap();
        assert!(session.state().is_playing());

        let mut resumed = ReadingSession::new(Box::new(RecordingSink::default()), Rc::new(store));
        let ticket = resumed.resume_progress().unwrap();
        assert_eq!(ticket.request.locator, Locator::Page(50));
        resumed.apply_load(ticket.generation, Ok(surah_verses(2, 9, 300, "ar.alafasy")));
        assert_eq!(resumed.state().cursor, Some(4));
    }

    #[test]
    fn saving_progress_needs_a_loaded_set() {
        let (session, _, _) = session();
        assert_eq!(session.save_progress(), Err(ReaderError::NothingLoaded));
    }

    #[test]
    fn page_navigation_clamps_and_requires_page_mode() {
        let (mut session, _, _) = loaded(7);
        assert_eq!(session.next_page(), Err(ReaderError::NotInPageMode));

        let ticket = session.begin_load_page(604, "ar.alafasy").unwrap();
        session.apply_load(ticket.generation, Ok(surah_verses(114, 6, 6231, "ar.alafasy")));
        assert_eq!(session.next_page(), Ok(None));

        let ticket = session.prev_page().unwrap().unwrap();
        assert_eq!(ticket.request.locator, Locator::Page(603));

        let ticket = session.begin_load_page(1, "ar.alafasy").unwrap();
        session.apply_load(ticket.generation, Ok(surah_verses(1, 7, 1, "ar.alafasy")));
        assert_eq!(session.prev_page(), Ok(None));
    }

    #[test]
    fn placeholder_summary_when_metadata_is_missing() {
        let (mut session, _, _) = session();
        let ticket = session.begin_load_surah(9, "ar.alafasy").unwrap();
        let mut verses = surah_verses(9, 3, 1236, "ar.alafasy");
        for verse in &mut verses {
            verse.surah = SurahSummary::placeholder(0);
            verse.surah.name.clear();
        }
        session.apply_load(ticket.generation, Ok(verses));
        assert_eq!(session.state().surah, Some(SurahSummary::placeholder(9)));
    }

    #[test]
    fn detach_stops_audio_and_drops_pending_loads() {
        let (mut session, sink, _) = loaded(7);
        session.play_verse(1).unwrap();
        let ticket = session.begin_load_page(5, "ar.alafasy").unwrap();
        session.detach();

        assert_eq!(sink.last(), Some(AudioCall::Stop));
        assert!(!session.apply_load(ticket.generation, Ok(surah_verses(2, 3, 30, "ar.alafasy"))));
        assert!(!session.state().loading);
    }

    #[test]
    fn volume_is_clamped_and_forwarded() {
        let (mut session, sink, _) = loaded(2);
        session.set_volume(1.7);
        assert_eq!(session.state().volume, 1.0);
        assert_eq!(sink.last(), Some(AudioCall::Volume(1.0)));

        session.set_volume(0.25);
        session.play_verse(0).unwrap();
        assert!(matches!(sink.last(), Some(AudioCall::Play { volume, .. }) if volume == 0.25));
    }

    #[test]
    fn polled_events_drive_the_current_source_only() {
        let (mut session, _, _) = loaded(3);
        session.play_verse(0).unwrap();
        let first = session.playback_token();

        let transition = session.apply_audio_events(AudioEvents {
            ended_token: Some(first),
            failed_token: None,
        });
        assert_eq!(transition, Some(EndedTransition::Advance(1)));

        let stale = session.apply_audio_events(AudioEvents {
            ended_token: Some(first),
            failed_token: Some(first),
        });
        assert_eq!(stale, None);
        assert!(session.state().is_playing());
        assert_eq!(session.state().cursor, Some(1));
    }

    #[test]
    fn saved_reciter_is_used_by_default() {
        let store = MemoryStore::new();
        store.set("quranReciter", "ar.husary", 360).unwrap();
        let session = ReadingSession::new(Box::new(RecordingSink::default()), Rc::new(store));
        assert_eq!(session.state().reciter, "ar.husary");
    }
}

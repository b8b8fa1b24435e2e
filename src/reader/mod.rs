//! Reading session controller: owns the loaded verse set and drives the single
//! audio resource through the playback/repeat state machine.

mod audio;
mod session;

pub use audio::{AudioError, AudioEvents, AudioSink};
pub use session::*;

use crate::api::ApiError;
use crate::db::StorageError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReaderError {
    #[error("page {0} is outside 1-604")]
    PageOutOfRange(u16),
    #[error("surah {0} is outside 1-114")]
    SurahOutOfRange(u16),
    #[error("verse index {index} is outside the {len} loaded verses")]
    VerseOutOfRange { index: usize, len: usize },
    #[error("verses are still loading")]
    LoadInProgress,
    #[error("page navigation is only available when reading by page")]
    NotInPageMode,
    #[error("no verses are loaded")]
    NothingLoaded,
    #[error("could not load verses: {0}")]
    Content(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure to start or resume playback: blocked autoplay, undecodable
/// source, missing audio element.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioError {
    #[error("playback was blocked: {0}")]
    Blocked(String),
    #[error("audio element unavailable")]
    Unavailable,
}

/// Events the audio backend observed since it was last polled, each tagged
/// with the playback token current when it happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
pub struct AudioEvents {
    #[serde(default)]
    pub ended_token: Option<u64>,
    #[serde(default)]
    pub failed_token: Option<u64>,
}

impl AudioEvents {
    pub fn is_empty(&self) -> bool {
        self.ended_token.is_none() && self.failed_token.is_none()
    }
}

/// The one audio resource a reading session plays through.
///
/// `token` tags the source so that failures the backend only learns about
/// later (a rejected play promise) can be matched against the source that is
/// current when they arrive.
pub trait AudioSink {
    fn play_source(&mut self, url: &str, volume: f64, token: u64) -> Result<(), AudioError>;
    fn resume(&mut self, token: u64) -> Result<(), AudioError>;
    fn pause(&mut self);
    /// Halts playback and detaches the current source.
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f64);
}

/// Sink that records every call, for driving the state machine in tests.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum AudioCall {
        Play { url: String, volume: f64, token: u64 },
        Resume { token: u64 },
        Pause,
        Stop,
        Volume(f64),
    }

    #[derive(Debug, Clone, Default)]
    pub struct RecordingSink {
        pub calls: Rc<RefCell<Vec<AudioCall>>>,
        pub fail_play: Rc<RefCell<bool>>,
    }

    impl RecordingSink {
        pub fn played_urls(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|call| match call {
                    AudioCall::Play { url, .. } => Some(url.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn last(&self) -> Option<AudioCall> {
            self.calls.borrow().last().cloned()
        }
    }

    impl AudioSink for RecordingSink {
        fn play_source(&mut self, url: &str, volume: f64, token: u64) -> Result<(), AudioError> {
            self.calls.borrow_mut().push(AudioCall::Play {
                url: url.to_string(),
                volume,
                token,
            });
            if *self.fail_play.borrow() {
                Err(AudioError::Blocked("NotAllowedError".to_string()))
            } else {
                Ok(())
            }
        }

        fn resume(&mut self, token: u64) -> Result<(), AudioError> {
            self.calls.borrow_mut().push(AudioCall::Resume { token });
            if *self.fail_play.borrow() {
                Err(AudioError::Blocked("NotAllowedError".to_string()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.calls.borrow_mut().push(AudioCall::Pause);
        }

        fn stop(&mut self) {
            self.calls.borrow_mut().push(AudioCall::Stop);
        }

        fn set_volume(&mut self, volume: f64) {
            self.calls.borrow_mut().push(AudioCall::Volume(volume));
        }
    }
}

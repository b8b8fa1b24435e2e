// Browser audio element backend. Element listeners record the token of the
// source they fired for; the controller collects them with `take_web_events`.
#[cfg(target_arch = "wasm32")]
thread_local! {
    static CURRENT_TOKEN: Cell<u64> = const { Cell::new(0) };
    static ENDED_TOKEN: Cell<Option<u64>> = const { Cell::new(None) };
    static FAILED_TOKEN: Cell<Option<u64>> = const { Cell::new(None) };
}

#[cfg(target_arch = "wasm32")]
const AUDIO_ELEMENT_ID: &str = "ramadan-companion-audio";

/// Initialize the global audio element once.
#[cfg(target_arch = "wasm32")]
fn get_or_create_audio_element() -> Option<HtmlAudioElement> {
    let document = window()?.document()?;

    if let Some(existing) = document.get_element_by_id(AUDIO_ELEMENT_ID) {
        return existing.dyn_into::<HtmlAudioElement>().ok();
    }

    let audio: HtmlAudioElement = document.create_element("audio").ok()?.dyn_into().ok()?;
    audio.set_id(AUDIO_ELEMENT_ID);
    audio.set_attribute("preload", "auto").ok()?;

    let ended_cb = Closure::wrap(Box::new(move || {
        ENDED_TOKEN.with(|ended| ended.set(Some(CURRENT_TOKEN.with(Cell::get))));
    }) as Box<dyn FnMut()>);
    let error_audio = audio.clone();
    let error_cb = Closure::wrap(Box::new(move || {
        // A stop clears `src`, which fires an error of its own.
        if error_audio.get_attribute("src").is_some() {
            FAILED_TOKEN.with(|failed| failed.set(Some(CURRENT_TOKEN.with(Cell::get))));
        }
    }) as Box<dyn FnMut()>);
    audio.set_onended(Some(ended_cb.as_ref().unchecked_ref()));
    audio.set_onerror(Some(error_cb.as_ref().unchecked_ref()));
    ended_cb.forget();
    error_cb.forget();

    document.body()?.append_child(&audio).ok()?;
    Some(audio)
}

/// Starts playback; a rejected play promise is reported as a failure of
/// `token` if that source is still current.
#[cfg(target_arch = "wasm32")]
fn web_try_play(audio: &HtmlAudioElement, token: u64) -> Result<(), AudioError> {
    let promise = audio
        .play()
        .map_err(|err| AudioError::Blocked(format!("{err:?}")))?;
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await {
            tracing::warn!(token, "play() rejected: {err:?}");
            if CURRENT_TOKEN.with(Cell::get) == token {
                FAILED_TOKEN.with(|failed| failed.set(Some(token)));
            }
        }
    });
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn take_web_events() -> AudioEvents {
    AudioEvents {
        ended_token: ENDED_TOKEN.with(Cell::take),
        failed_token: FAILED_TOKEN.with(Cell::take),
    }
}

#[cfg(target_arch = "wasm32")]
pub struct WebAudioSink;

#[cfg(target_arch = "wasm32")]
impl AudioSink for WebAudioSink {
    fn play_source(&mut self, url: &str, volume: f64, token: u64) -> Result<(), AudioError> {
        let audio = get_or_create_audio_element().ok_or(AudioError::Unavailable)?;
        CURRENT_TOKEN.with(|current| current.set(token));
        ENDED_TOKEN.with(|ended| ended.set(None));
        audio.set_src(url);
        audio.set_volume(volume);
        web_try_play(&audio, token)
    }

    fn resume(&mut self, token: u64) -> Result<(), AudioError> {
        let audio = get_or_create_audio_element().ok_or(AudioError::Unavailable)?;
        web_try_play(&audio, token)
    }

    fn pause(&mut self) {
        if let Some(audio) = get_or_create_audio_element() {
            let _ = audio.pause();
        }
    }

    fn stop(&mut self) {
        if let Some(audio) = get_or_create_audio_element() {
            let _ = audio.pause();
            let _ = audio.remove_attribute("src");
            audio.load();
        }
        ENDED_TOKEN.with(|ended| ended.set(None));
        FAILED_TOKEN.with(|failed| failed.set(None));
    }

    fn set_volume(&mut self, volume: f64) {
        if let Some(audio) = get_or_create_audio_element() {
            audio.set_volume(volume);
        }
    }
}

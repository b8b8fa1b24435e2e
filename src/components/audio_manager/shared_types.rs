// Shared imports and helpers used by both audio backends.
use crate::reader::{AudioError, AudioEvents, AudioSink, ReadingSession};
use dioxus::prelude::*;

#[cfg(target_arch = "wasm32")]
use std::cell::Cell;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast};
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

/// How often the controller asks the backend for ended/error events.
const AUDIO_POLL_MS: u32 = 200;

/// The audio sink for the current platform.
pub fn platform_sink() -> Box<dyn AudioSink> {
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(WebAudioSink)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(BridgeAudioSink)
    }
}

/// Sleeps without blocking the UI thread.
#[cfg(target_arch = "wasm32")]
pub async fn delay_ms(ms: u32) {
    gloo_timers::future::TimeoutFuture::new(ms).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn delay_ms(ms: u32) {
    tokio::time::sleep(std::time::Duration::from_millis(u64::from(ms))).await;
}

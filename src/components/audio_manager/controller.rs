async fn poll_audio_events() -> AudioEvents {
    #[cfg(target_arch = "wasm32")]
    {
        take_web_events()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        native_audio_events().await
    }
}

/// Polls the audio backend and applies its events to `session`. Renders
/// nothing; the polling task ends with the owning reader view.
#[component]
pub fn AudioController(session: Signal<ReadingSession>) -> Element {
    use_hook(move || {
        let mut session = session;
        spawn(async move {
            loop {
                delay_ms(AUDIO_POLL_MS).await;
                let events = poll_audio_events().await;
                if events.is_empty() {
                    continue;
                }
                if let Some(transition) = session.write().apply_audio_events(events) {
                    tracing::debug!(?transition, "Audio ended");
                }
            }
        });
    });

    rsx! {}
}

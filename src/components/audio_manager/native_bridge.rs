// Desktop-webview JavaScript bridge used by non-wasm targets. The webview
// owns the audio element; Rust sends commands and polls for events.
#[cfg(not(target_arch = "wasm32"))]
const NATIVE_AUDIO_BOOTSTRAP_JS: &str = r#"
(() => {
  if (window.__ramadanAudioBridge) {
    return true;
  }

  const audio = document.createElement("audio");
  audio.id = "ramadan-companion-audio-native";
  audio.preload = "auto";
  audio.style.display = "none";
  audio.setAttribute("playsinline", "true");
  document.body.appendChild(audio);

  let token = 0;
  let endedToken = null;
  let failedToken = null;

  audio.addEventListener("ended", () => {
    endedToken = token;
  });
  audio.addEventListener("error", () => {
    if (audio.getAttribute("src")) {
      failedToken = token;
    }
  });

  const safePlay = (forToken) => {
    audio.play().catch(() => {
      if (forToken === token) {
        failedToken = forToken;
      }
    });
  };

  window.__ramadanAudioBridge = {
    apply(cmd) {
      switch (cmd.type) {
        case "load":
          token = cmd.token;
          endedToken = null;
          audio.src = cmd.src;
          audio.volume = cmd.volume;
          safePlay(cmd.token);
          break;
        case "resume":
          safePlay(cmd.token);
          break;
        case "pause":
          audio.pause();
          break;
        case "stop":
          audio.pause();
          audio.removeAttribute("src");
          audio.load();
          endedToken = null;
          failedToken = null;
          break;
        case "volume":
          audio.volume = cmd.volume;
          break;
      }
    },
    take() {
      const events = { ended_token: endedToken, failed_token: failedToken };
      endedToken = null;
      failedToken = null;
      return events;
    },
  };
  return true;
})();
"#;

#[cfg(not(target_arch = "wasm32"))]
fn ensure_native_audio_bridge() {
    let _ = document::eval(NATIVE_AUDIO_BOOTSTRAP_JS);
}

#[cfg(not(target_arch = "wasm32"))]
fn native_audio_command(value: serde_json::Value) {
    ensure_native_audio_bridge();
    let payload = serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string());
    let script = format!(
        r#"(function () {{
            const bridge = window.__ramadanAudioBridge;
            if (!bridge) return false;
            bridge.apply({payload});
            return true;
        }})();"#
    );
    let _ = document::eval(&script);
}

#[cfg(not(target_arch = "wasm32"))]
async fn native_audio_events() -> AudioEvents {
    ensure_native_audio_bridge();
    let eval = document::eval(
        r#"return (function () {
            const bridge = window.__ramadanAudioBridge;
            return (bridge && typeof bridge.take === "function")
              ? bridge.take()
              : { ended_token: null, failed_token: null };
        })();"#,
    );
    eval.join::<AudioEvents>().await.unwrap_or_default()
}

/// Commands the webview audio element. Play failures arrive later through
/// the polled events, so starting playback never fails here.
#[cfg(not(target_arch = "wasm32"))]
pub struct BridgeAudioSink;

#[cfg(not(target_arch = "wasm32"))]
impl AudioSink for BridgeAudioSink {
    fn play_source(&mut self, url: &str, volume: f64, token: u64) -> Result<(), AudioError> {
        native_audio_command(serde_json::json!({
            "type": "load",
            "src": url,
            "volume": volume,
            "token": token,
        }));
        Ok(())
    }

    fn resume(&mut self, token: u64) -> Result<(), AudioError> {
        native_audio_command(serde_json::json!({ "type": "resume", "token": token }));
        Ok(())
    }

    fn pause(&mut self) {
        native_audio_command(serde_json::json!({ "type": "pause" }));
    }

    fn stop(&mut self) {
        native_audio_command(serde_json::json!({ "type": "stop" }));
    }

    fn set_volume(&mut self, volume: f64) {
        native_audio_command(serde_json::json!({ "type": "volume", "volume": volume }));
    }
}

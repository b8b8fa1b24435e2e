//! Audio Manager - drives the single verse audio element outside of the
//! component render cycle and feeds its events back into the reading session.

// Shared imports and the platform sink constructor.
include!("shared_types.rs");
// Browser (wasm) audio element backend.
include!("web_backend.rs");
// Desktop-webview JavaScript bridge for native (non-wasm) targets.
include!("native_bridge.rs");
// Polling controller component.
include!("controller.rs");

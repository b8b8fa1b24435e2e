//! Device position lookup through the browser Geolocation API.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not available on this device")]
    Unsupported,
    #[error("location request failed: {0}")]
    Denied(String),
}

/// Current `(latitude, longitude)` of the device.
#[cfg(target_arch = "wasm32")]
pub async fn current_position() -> Result<(f64, f64), GeolocationError> {
    let geolocation = web_sys::window()
        .and_then(|window| window.navigator().geolocation().ok())
        .ok_or(GeolocationError::Unsupported)?;

    let promise = js_sys::Promise::new(&mut |resolve: js_sys::Function, reject: js_sys::Function| {
        let on_success = Closure::once_into_js(move |position: JsValue| {
            let _ = resolve.call1(&JsValue::NULL, &position);
        });
        let on_error = Closure::once_into_js(move |error: JsValue| {
            let _ = reject.call1(&JsValue::NULL, &error);
        });
        if let Err(err) = geolocation.get_current_position_with_error_callback(
            on_success.unchecked_ref(),
            Some(on_error.unchecked_ref()),
        ) {
            tracing::warn!("getCurrentPosition threw: {err:?}");
        }
    });

    let position = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|err| GeolocationError::Denied(js_message(&err)))?;
    let coords = js_sys::Reflect::get(&position, &"coords".into())
        .map_err(|_| GeolocationError::Unsupported)?;
    let read = |field: &str| {
        js_sys::Reflect::get(&coords, &field.into())
            .ok()
            .and_then(|value| value.as_f64())
            .ok_or(GeolocationError::Unsupported)
    };
    Ok((read("latitude")?, read("longitude")?))
}

#[cfg(target_arch = "wasm32")]
fn js_message(value: &JsValue) -> String {
    js_sys::Reflect::get(value, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn current_position() -> Result<(f64, f64), GeolocationError> {
    Err(GeolocationError::Unsupported)
}

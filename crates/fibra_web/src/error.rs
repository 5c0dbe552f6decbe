//! Mapping JavaScript exceptions to host errors

use fibra_core::HostError;
use wasm_bindgen::JsValue;

/// Convert a JavaScript exception into a [`HostError`]
pub(crate) fn js_error(value: JsValue) -> HostError {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .map_or_else(|| HostError::Js(format!("{:?}", value)), HostError::Js)
}

//! Device-orientation permission (iOS 13+ style `requestPermission`)

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::sim::{PermissionApi, PermissionError, parse_permission_response};

#[wasm_bindgen(inline_js = "
    export function orientation_support() {
        if (typeof window === 'undefined' || typeof window.DeviceOrientationEvent === 'undefined') {
            return 'unsupported';
        }
        return typeof DeviceOrientationEvent.requestPermission === 'function'
            ? 'required'
            : 'implicit';
    }

    export function request_orientation_permission() {
        return DeviceOrientationEvent.requestPermission();
    }
")]
extern "C" {
    fn orientation_support() -> String;

    #[wasm_bindgen(catch)]
    fn request_orientation_permission() -> Result<js_sys::Promise, JsValue>;
}

pub fn detect_api() -> PermissionApi {
    match orientation_support().as_str() {
        "required" => PermissionApi::Required,
        "implicit" => PermissionApi::Implicit,
        _ => PermissionApi::Unsupported,
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// Ask the platform; every failure mode maps to a `PermissionError`
pub async fn request_permission() -> Result<(), PermissionError> {
    if detect_api() != PermissionApi::Required {
        return Err(PermissionError::Unsupported);
    }
    let promise =
        request_orientation_permission().map_err(|e| PermissionError::Failed(describe(&e)))?;
    let response = JsFuture::from(promise)
        .await
        .map_err(|e| PermissionError::Failed(describe(&e)))?;
    parse_permission_response(&response.as_string().unwrap_or_default())
}

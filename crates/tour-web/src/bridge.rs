//! Glue between the immersive view and the companion panorama viewer.
//!
//! The companion calls the exported `vrSwitchScene(id)`; requests are queued
//! and picked up by the next frame so JS never re-enters a borrowed session.
//! Scene changes the companion did not ask for are forwarded to
//! `window.switchSceneById(id)` when the page defines it.

use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys as web;

thread_local! {
    static REQUESTS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

#[wasm_bindgen(js_name = vrSwitchScene)]
pub fn vr_switch_scene(scene_id: String) {
    log::info!("[bridge] vrSwitchScene('{}')", scene_id);
    REQUESTS.with(|q| q.borrow_mut().push(scene_id));
}

pub fn take_requests() -> Vec<String> {
    REQUESTS.with(|q| std::mem::take(&mut *q.borrow_mut()))
}

pub fn notify_companion(scene_id: &str) {
    let Some(window) = web::window() else {
        return;
    };
    let callback = match js_sys::Reflect::get(&window, &JsValue::from_str("switchSceneById")) {
        Ok(f) if f.is_function() => f.unchecked_into::<js_sys::Function>(),
        _ => {
            log::debug!("[bridge] no companion viewer to notify");
            return;
        }
    };
    if let Err(e) = callback.call1(&window, &JsValue::from_str(scene_id)) {
        log::warn!("[bridge] switchSceneById('{}') threw: {:?}", scene_id, e);
    }
}

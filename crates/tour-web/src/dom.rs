use tour_core::{Catalogue, SessionConfig};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

const TOAST_ID: &str = "vr-toast";
const TOAST_MS: i32 = 6000;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// The page's canvas, or a full-window one appended to `<body>`.
pub fn ensure_canvas(
    document: &web::Document,
    id: &str,
) -> anyhow::Result<web::HtmlCanvasElement> {
    let el = match document.get_element_by_id(id) {
        Some(el) => el,
        None => {
            let el = document.create_element("canvas").map_err(js_err)?;
            el.set_id(id);
            el.set_attribute(
                "style",
                "position:fixed;inset:0;width:100vw;height:100vh;display:block;touch-action:none",
            )
            .map_err(js_err)?;
            append_to_body(document, &el)?;
            el
        }
    };
    el.dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("#{} is not a canvas: {:?}", id, e)))
}

pub fn ensure_enter_button(document: &web::Document, id: &str) -> anyhow::Result<()> {
    if document.get_element_by_id(id).is_some() {
        return Ok(());
    }
    let button = document.create_element("button").map_err(js_err)?;
    button.set_id(id);
    button.set_text_content(Some("Enter VR"));
    button
        .set_attribute(
            "style",
            "position:fixed;bottom:20px;left:50%;transform:translateX(-50%);padding:12px 24px;\
             border:1px solid #fff;border-radius:4px;background:rgba(0,0,0,0.4);color:#fff;\
             font:13px sans-serif;cursor:pointer;z-index:999",
        )
        .map_err(js_err)?;
    append_to_body(document, &button)
}

/// Show `message` (one diagnostic per line) and remove it after a while.
pub fn show_toast(message: &str) {
    let Some(document) = window_document() else {
        return;
    };
    if let Some(old) = document.get_element_by_id(TOAST_ID) {
        old.remove();
    }
    let Ok(toast) = document.create_element("div") else {
        return;
    };
    toast.set_id(TOAST_ID);
    toast.set_text_content(Some(message));
    let _ = toast.set_attribute(
        "style",
        "position:fixed;top:20px;left:50%;transform:translateX(-50%);max-width:80vw;\
         padding:10px 16px;background:rgba(160,20,20,0.9);color:#fff;font:13px sans-serif;\
         white-space:pre-line;border-radius:4px;z-index:1000",
    );
    if append_to_body(&document, &toast).is_err() {
        return;
    }
    if let Some(window) = web::window() {
        let closure = Closure::once(move || toast.remove());
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            TOAST_MS,
        );
        closure.forget();
    }
}

/// Catalogue published by the companion viewer as `window.APP_DATA`.
pub fn read_catalogue() -> anyhow::Result<Catalogue> {
    let json = read_global_json("APP_DATA")?
        .ok_or_else(|| anyhow::anyhow!("window.APP_DATA is not defined"))?;
    Catalogue::from_json(&json).map_err(|e| anyhow::anyhow!("APP_DATA: {}", e))
}

/// Optional `window.VR_CONFIG` overrides; anything unreadable falls back to defaults.
pub fn read_config() -> SessionConfig {
    let json = match read_global_json("VR_CONFIG") {
        Ok(Some(json)) => json,
        Ok(None) => return SessionConfig::default(),
        Err(e) => {
            log::warn!("[config] VR_CONFIG unreadable: {}", e);
            return SessionConfig::default();
        }
    };
    match serde_json::from_str::<SessionConfig>(&json) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("[config] VR_CONFIG ignored: {}", e);
            SessionConfig::default()
        }
    }
}

fn read_global_json(name: &str) -> anyhow::Result<Option<String>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(name)).map_err(js_err)?;
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let json = js_sys::JSON::stringify(&value).map_err(js_err)?;
    Ok(Some(String::from(json)))
}

fn append_to_body(document: &web::Document, el: &web::Element) -> anyhow::Result<()> {
    let body = document
        .body()
        .ok_or_else(|| anyhow::anyhow!("no document body"))?;
    body.append_child(el).map_err(js_err)?;
    Ok(())
}

fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!(format!("{:?}", e))
}

use std::cell::RefCell;
use std::rc::Rc;
use tour_core::{CubeImages, LoadRequest, TourError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

pub type Completion = (u64, Result<CubeImages, TourError>);

/// Fetch and decode the six faces of `req`, then queue the result for the
/// frame loop.
pub async fn load_cube(req: LoadRequest, done: Rc<RefCell<Vec<Completion>>>) {
    let mut encoded: [Result<Vec<u8>, String>; 6] =
        std::array::from_fn(|_| Err("not fetched".to_string()));
    for (slot, path) in encoded.iter_mut().zip(req.paths.iter()) {
        *slot = fetch_bytes(path).await;
    }
    let result = CubeImages::from_encoded(&req.scene_id, encoded);
    done.borrow_mut().push((req.seq, result));
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let window = web::window().ok_or("no window")?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(describe)?;
    let resp: web::Response = resp.dyn_into().map_err(describe)?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(describe)?)
        .await
        .map_err(describe)?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

fn describe(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;
use tour_core::{Camera, EchoFilter, TourError, TourSession, CAMERA_FOVY_DEGREES};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod bridge;
mod dom;
mod events;
mod frame;
mod input;
mod loader;
mod render;

pub use bridge::vr_switch_scene;

const CANVAS_ID: &str = "vr-canvas";
const ENTER_BUTTON_ID: &str = "vr-enter";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("tour-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let catalogue = dom::read_catalogue()?;
    let config = dom::read_config();
    let canvas = dom::ensure_canvas(&document, CANVAS_ID)?;
    dom::sync_canvas_backing_size(&canvas);

    let session = Rc::new(RefCell::new(TourSession::new(catalogue, config)));
    let gpu = frame::init_gpu(&canvas).await;
    if gpu.is_none() {
        session
            .borrow_mut()
            .record_failure(TourError::SessionInit("WebGPU unavailable".into()));
    }

    let aspect = canvas.width() as f32 / canvas.height().max(1) as f32;
    let camera = Rc::new(RefCell::new(Camera::new(
        aspect,
        CAMERA_FOVY_DEGREES.to_radians(),
    )));
    let pointer = Rc::new(RefCell::new(input::PointerState::default()));

    events::wire_pointer_handlers(events::PointerWiring {
        canvas: canvas.clone(),
        session: session.clone(),
        camera: camera.clone(),
        pointer: pointer.clone(),
    });
    events::wire_global_keydown(session.clone(), canvas.clone());
    events::wire_fullscreen_change(&document, session.clone());
    dom::ensure_enter_button(&document, ENTER_BUTTON_ID)?;
    {
        let session = session.clone();
        let canvas = canvas.clone();
        dom::add_click_listener(&document, ENTER_BUTTON_ID, move || {
            events::enter_immersive(&session, &canvas);
        });
    }

    session.borrow_mut().start(None);
    frame::start_loop(Rc::new(RefCell::new(frame::FrameContext {
        session,
        gpu,
        canvas,
        camera,
        pointer,
        completions: Rc::new(RefCell::new(Vec::new())),
        echoes: EchoFilter::default(),
    })));
    Ok(())
}

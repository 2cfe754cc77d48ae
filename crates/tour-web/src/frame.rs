use crate::input::PointerState;
use crate::loader::{self, Completion};
use crate::render::GpuState;
use crate::{bridge, dom};
use std::cell::RefCell;
use std::rc::Rc;
use tour_core::{Camera, EchoFilter, TourEvent, TourSession};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub struct FrameContext<'a> {
    pub session: Rc<RefCell<TourSession>>,
    pub gpu: Option<GpuState<'a>>,
    pub canvas: web::HtmlCanvasElement,
    pub camera: Rc<RefCell<Camera>>,
    pub pointer: Rc<RefCell<PointerState>>,
    /// Face loads resolved since the last frame.
    pub completions: Rc<RefCell<Vec<Completion>>>,
    pub echoes: EchoFilter,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        dom::sync_canvas_backing_size(&self.canvas);
        let (width, height) = (self.canvas.width(), self.canvas.height());
        if let Some(gpu) = self.gpu.as_mut() {
            if gpu.resize_if_needed(width, height) {
                self.camera.borrow_mut().aspect = width as f32 / height.max(1) as f32;
            }
        }

        let events = self.step_session();
        for event in events {
            self.handle_event(event);
        }

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        let mut session = self.session.borrow_mut();
        if let Some(images) = session.take_background_upload() {
            gpu.upload_background(&images);
        }
        let camera = self.camera.borrow();
        let hover_ray = self
            .pointer
            .borrow()
            .position
            .map(|p| camera.screen_ray(p.x, p.y, width as f32, height as f32));
        session.update_hover(hover_ray.as_ref());
        gpu.set_markers(&session.marker_instances());
        drop(session);
        match gpu.render(&camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(e) => log::warn!("[gpu] frame skipped: {:?}", e),
        }
    }

    /// Feed companion requests and finished loads into the session, start any
    /// loads it issued, and collect its notifications.
    fn step_session(&mut self) -> Vec<TourEvent> {
        let mut session = self.session.borrow_mut();
        for id in self.echoes.admit(bridge::take_requests()) {
            session.switch_to(&id);
        }
        let finished: Vec<Completion> = self.completions.borrow_mut().drain(..).collect();
        for (seq, result) in finished {
            session.complete_load(seq, result);
        }
        for req in session.drain_load_requests() {
            let done = self.completions.clone();
            spawn_local(loader::load_cube(req, done));
        }
        session.drain_events()
    }

    fn handle_event(&mut self, event: TourEvent) {
        if let Some(id) = event.companion_scene() {
            self.echoes.note_sent(id);
            bridge::notify_companion(id);
        }
        match event {
            TourEvent::SceneChanged { scene, .. } => {
                let session = self.session.borrow();
                if let Some(s) = session.catalogue().get(&scene) {
                    self.camera
                        .borrow_mut()
                        .apply_view(&s.initial_view_parameters);
                }
            }
            TourEvent::SessionEnded { toast: Some(toast) } => dom::show_toast(&toast),
            TourEvent::SessionEnded { toast: None } => {}
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    if let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

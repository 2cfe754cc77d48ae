use crate::input::{self, PointerState};
use std::cell::RefCell;
use std::rc::Rc;
use tour_core::{Camera, TourSession, SELECT_DRAG_THRESHOLD_PX};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub fn enter_immersive(session: &Rc<RefCell<TourSession>>, canvas: &web::HtmlCanvasElement) {
    session.borrow_mut().enter_immersive();
    if let Err(e) = canvas.request_fullscreen() {
        log::warn!("[session] fullscreen refused: {:?}", e);
    }
}

pub fn end_immersive(session: &Rc<RefCell<TourSession>>) {
    session.borrow_mut().end_immersive();
    if let Some(doc) = crate::dom::window_document() {
        if doc.fullscreen_element().is_some() {
            doc.exit_fullscreen();
        }
    }
}

pub fn wire_global_keydown(session: Rc<RefCell<TourSession>>, canvas: web::HtmlCanvasElement) {
    if let Some(window) = web::window() {
        let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
            match ev.key().as_str() {
                "Escape" => end_immersive(&session),
                "Enter" => {
                    if !session.borrow().is_immersive() {
                        enter_immersive(&session, &canvas);
                        ev.prevent_default();
                    }
                }
                _ => {}
            }
        }) as Box<dyn FnMut(_)>);
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Browsers swallow Escape while fullscreen; leaving fullscreen ends the session.
pub fn wire_fullscreen_change(document: &web::Document, session: Rc<RefCell<TourSession>>) {
    let doc = document.clone();
    let closure = Closure::wrap(Box::new(move || {
        if doc.fullscreen_element().is_none() && session.borrow().is_immersive() {
            session.borrow_mut().end_immersive();
        }
    }) as Box<dyn FnMut()>);
    let _ = document
        .add_event_listener_with_callback("fullscreenchange", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub struct PointerWiring {
    pub canvas: web::HtmlCanvasElement,
    pub session: Rc<RefCell<TourSession>>,
    pub camera: Rc<RefCell<Camera>>,
    pub pointer: Rc<RefCell<PointerState>>,
}

pub fn wire_pointer_handlers(w: PointerWiring) {
    // pointerdown
    {
        let canvas = w.canvas.clone();
        let session = w.session.clone();
        let pointer = w.pointer.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let pos = input::pointer_canvas_px(&ev, &canvas);
            {
                let mut p = pointer.borrow_mut();
                p.position = Some(pos);
                p.pressed_at = Some(pos);
                p.dragged = false;
            }
            let _ = canvas.set_pointer_capture(ev.pointer_id());
            session
                .borrow_mut()
                .select_start(input::controller_index(&ev));
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    // pointermove
    {
        let canvas = w.canvas.clone();
        let camera = w.camera.clone();
        let pointer = w.pointer.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let pos = input::pointer_canvas_px(&ev, &canvas);
            let mut p = pointer.borrow_mut();
            if let (Some(last), Some(origin)) = (p.position, p.pressed_at) {
                let d = pos - last;
                camera.borrow_mut().look_drag(d.x, d.y);
                if pos.distance(origin) > SELECT_DRAG_THRESHOLD_PX {
                    p.dragged = true;
                }
            }
            p.position = Some(pos);
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    // pointerup
    {
        let canvas = w.canvas.clone();
        let session = w.session.clone();
        let camera = w.camera.clone();
        let pointer = w.pointer.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            let pos = input::pointer_canvas_px(&ev, &canvas);
            let controller = input::controller_index(&ev);
            let tapped = {
                let mut p = pointer.borrow_mut();
                p.position = Some(pos);
                p.pressed_at.take().is_some() && !p.dragged
            };
            if tapped {
                let ray = camera.borrow().screen_ray(
                    pos.x,
                    pos.y,
                    canvas.width() as f32,
                    canvas.height() as f32,
                );
                session.borrow_mut().select_end(controller, &ray);
            } else {
                session.borrow_mut().select_cancel(controller);
            }
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    // pointerleave
    {
        let pointer = w.pointer.clone();
        let closure = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
            let mut p = pointer.borrow_mut();
            if p.pressed_at.is_none() {
                p.position = None;
            }
        }) as Box<dyn FnMut(_)>);
        let _ = w
            .canvas
            .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

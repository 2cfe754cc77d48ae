use glam::Vec2;
use web_sys as web;

/// Pointer standing in for a controller: drag to look, tap to select.
#[derive(Default, Clone, Copy)]
pub struct PointerState {
    pub position: Option<Vec2>,
    pub pressed_at: Option<Vec2>,
    pub dragged: bool,
}

#[inline]
pub fn pointer_canvas_px(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let sx = (x_css / rect.width() as f32) * canvas.width() as f32;
    let sy = (y_css / rect.height() as f32) * canvas.height() as f32;
    Vec2::new(sx, sy)
}

/// Primary pointer drives controller 0, any other (second touch, pen) controller 1.
#[inline]
pub fn controller_index(ev: &web::PointerEvent) -> usize {
    if ev.is_primary() {
        0
    } else {
        1
    }
}

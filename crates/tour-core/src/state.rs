//! Viewer-side camera and look state shared with the frontends.
//!
//! The viewer sits at the origin; scenes are seen from the inside of the cube.
//! Look direction is kept as yaw/pitch so it can be seeded from a scene's
//! initial view parameters and nudged by pointer drags.

use crate::catalogue::ViewParameters;
use crate::constants::{CAMERA_ZFAR, CAMERA_ZNEAR, LOOK_RADIANS_PER_PX, PITCH_LIMIT};
use crate::markers::Ray;
use crate::sphere::{direction, view_rotation};
use glam::{Mat4, Vec3, Vec4};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(aspect: f32, fovy_radians: f32) -> Self {
        Self {
            eye: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            aspect,
            fovy_radians,
            znear: CAMERA_ZNEAR,
            zfar: CAMERA_ZFAR,
        }
    }

    /// Aim at a scene's initial view. The catalogue stores a horizontal-ish
    /// field of view; it is used as the vertical one, clamped to sane bounds.
    pub fn apply_view(&mut self, view: &ViewParameters) {
        self.yaw = view.yaw;
        self.pitch = view.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.fovy_radians = view.fov.clamp(0.3, 2.5);
    }

    /// Grab-and-drag look: the panorama follows a pointer drag of `(dx, dy)` pixels.
    pub fn look_drag(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * LOOK_RADIANS_PER_PX;
        self.pitch = (self.pitch + dy * LOOK_RADIANS_PER_PX).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn forward(&self) -> Vec3 {
        direction(self.yaw, self.pitch)
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.eye, self.forward(), Vec3::Y)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Inverse of projection * rotation-only view; maps NDC to world directions
    /// for the skybox.
    pub fn inverse_sky_view_proj(&self) -> Mat4 {
        let rot_view = Mat4::look_to_rh(Vec3::ZERO, self.forward(), Vec3::Y);
        (self.projection_matrix() * rot_view).inverse()
    }

    /// World transform of a pointing device held at the eye and aimed along
    /// the view direction.
    pub fn pose(&self) -> Mat4 {
        Mat4::from_rotation_translation(view_rotation(self.yaw, self.pitch), self.eye)
    }

    /// World-space ray through a pixel of a `width` x `height` viewport.
    pub fn screen_ray(&self, sx: f32, sy: f32, width: f32, height: f32) -> Ray {
        let ndc_x = (2.0 * sx / width.max(1.0)) - 1.0;
        let ndc_y = 1.0 - (2.0 * sy / height.max(1.0));
        let inv = self.view_proj().inverse();
        let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let p1: Vec3 = p_far.truncate() / p_far.w;
        Ray::new(self.eye, p1 - self.eye)
    }
}

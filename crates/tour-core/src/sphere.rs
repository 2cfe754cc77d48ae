//! Yaw/pitch on the viewing sphere to and from world-space directions.
//!
//! Yaw 0, pitch 0 looks down -Z, the default forward axis of the camera and of
//! a controller's pointing ray. Yaw turns about +Y, pitch about the local +X.

use glam::{Quat, Vec3};

/// World-space position of a hotspot at `radius` from the viewer.
///
/// The poles (`pitch = ±π/2`) need no special casing: x and z collapse to 0.
#[inline]
pub fn hotspot_position(yaw: f32, pitch: f32, radius: f32) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    Vec3::new(
        -radius * sin_yaw * cos_pitch,
        radius * sin_pitch,
        -radius * cos_yaw * cos_pitch,
    )
}

/// Unit direction for a yaw/pitch pair.
#[inline]
pub fn direction(yaw: f32, pitch: f32) -> Vec3 {
    hotspot_position(yaw, pitch, 1.0)
}

/// Inverse of [`direction`]. A zero vector maps to (0, 0).
pub fn direction_to_yaw_pitch(dir: Vec3) -> (f32, f32) {
    let d = dir.normalize_or_zero();
    if d == Vec3::ZERO {
        return (0.0, 0.0);
    }
    let pitch = d.y.clamp(-1.0, 1.0).asin();
    let yaw = (-d.x).atan2(-d.z);
    (yaw, pitch)
}

/// Rotation that turns the default forward axis (-Z) toward `direction(yaw, pitch)`
/// while keeping the horizon level.
#[inline]
pub fn view_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch)
}

//! Live hotspot markers and controller-ray picking.

use crate::catalogue::Scene;
use crate::constants::{MARKER_COLOR, MARKER_HOVER_COLOR, MARKER_HOVER_SCALE};
use crate::sphere::hotspot_position;
use glam::{Mat4, Vec3};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub position: Vec3,
    pub radius: f32,
    pub target: String,
}

/// World-space ray with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from a controller's world transform: its translation, along its -Z axis.
    pub fn from_controller(world: Mat4) -> Self {
        let origin = world.w_axis.truncate();
        let direction = world.transform_vector3(Vec3::NEG_Z);
        Self::new(origin, direction)
    }
}

#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit<'a> {
    pub index: usize,
    pub distance: f32,
    pub target: &'a str,
}

/// Per-instance data for the marker draw call.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerInstance {
    pub pos: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
}

/// Markers of the active scene. At most one set is live at a time; it is
/// rebuilt from scratch on every scene switch.
#[derive(Clone, Debug, Default)]
pub struct MarkerSet {
    markers: SmallVec<[Marker; 8]>,
}

impl MarkerSet {
    pub fn for_scene(scene: &Scene, placement_radius: f32, marker_radius: f32) -> Self {
        let markers = scene
            .link_hotspots
            .iter()
            .map(|h| Marker {
                position: hotspot_position(h.yaw, h.pitch, placement_radius),
                radius: marker_radius,
                target: h.target.clone(),
            })
            .collect();
        Self { markers }
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|m| m.target.as_str())
    }

    /// Nearest marker hit by `ray`, if any.
    pub fn pick(&self, ray: &Ray) -> Option<Hit<'_>> {
        let mut best: Option<Hit<'_>> = None;
        for (i, m) in self.markers.iter().enumerate() {
            if let Some(t) = ray_sphere(ray.origin, ray.direction, m.position, m.radius) {
                match best {
                    Some(b) if t >= b.distance => {}
                    _ => {
                        best = Some(Hit {
                            index: i,
                            distance: t,
                            target: &m.target,
                        })
                    }
                }
            }
        }
        best
    }

    pub fn instances(&self, hovered: Option<usize>) -> Vec<MarkerInstance> {
        self.markers
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let hot = hovered == Some(i);
                MarkerInstance {
                    pos: m.position.to_array(),
                    scale: if hot {
                        m.radius * MARKER_HOVER_SCALE
                    } else {
                        m.radius
                    },
                    color: if hot { MARKER_HOVER_COLOR } else { MARKER_COLOR },
                }
            })
            .collect()
    }
}

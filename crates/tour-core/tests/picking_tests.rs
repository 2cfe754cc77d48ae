// Host-side tests for controller-ray picking against live markers.

use approx::assert_abs_diff_eq;
use glam::{Mat4, Quat, Vec3};
use tour_core::*;

fn scene_with(json_hotspots: &str) -> Catalogue {
    let json = format!(
        r#"{{"scenes":[{{"id":"here","linkHotspots":{json_hotspots}}},{{"id":"near"}},{{"id":"far"}}]}}"#
    );
    Catalogue::from_json(&json).unwrap()
}

#[test]
fn ray_sphere_hits_front_surface() {
    let t = ray_sphere(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -10.0), 0.5).unwrap();
    assert_abs_diff_eq!(t, 9.5, epsilon = 1e-5);
}

#[test]
fn ray_sphere_misses_sideways_and_behind() {
    let center = Vec3::new(0.0, 0.0, -10.0);
    assert!(ray_sphere(Vec3::ZERO, Vec3::X, center, 0.5).is_none());
    assert!(ray_sphere(Vec3::ZERO, Vec3::Z, center, 0.5).is_none());
}

#[test]
fn controller_ray_follows_its_negative_z_axis() {
    let world = Mat4::from_rotation_translation(
        Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        Vec3::new(0.0, 1.6, 0.0),
    );
    let ray = Ray::from_controller(world);
    assert_abs_diff_eq!(ray.origin.y, 1.6, epsilon = 1e-6);
    // Quarter turn left about +Y points -Z at -X.
    assert!(ray.direction.abs_diff_eq(Vec3::NEG_X, 1e-5));
}

#[test]
fn pick_returns_nearest_hit_and_ignores_misses() {
    let cat = scene_with(
        r#"[{"yaw":0,"pitch":0,"target":"far"},{"yaw":3.14159,"pitch":0,"target":"near"}]"#,
    );
    let set = MarkerSet::for_scene(cat.first(), PLACEMENT_RADIUS, MARKER_RADIUS);
    assert_eq!(set.len(), 2);

    let ahead = set.pick(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
    assert_eq!(ahead.target, "far");
    assert_eq!(ahead.index, 0);
    assert_abs_diff_eq!(ahead.distance, PLACEMENT_RADIUS - MARKER_RADIUS, epsilon = 1e-4);

    let behind = set.pick(&Ray::new(Vec3::ZERO, Vec3::Z)).unwrap();
    assert_eq!(behind.target, "near");

    assert!(set.pick(&Ray::new(Vec3::ZERO, Vec3::Y)).is_none());
}

#[test]
fn pick_prefers_closer_of_overlapping_markers() {
    // Two hotspots a hair apart: the ray grazes one and hits the other dead on.
    let cat = scene_with(
        r#"[{"yaw":0.04,"pitch":0,"target":"far"},{"yaw":0,"pitch":0,"target":"near"}]"#,
    );
    let set = MarkerSet::for_scene(cat.first(), PLACEMENT_RADIUS, MARKER_RADIUS);
    let hit = set.pick(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();
    assert_eq!(hit.target, "near");
    assert_eq!(hit.index, 1);
}

#[test]
fn cleared_set_picks_nothing() {
    let cat = scene_with(r#"[{"yaw":0,"pitch":0,"target":"far"}]"#);
    let mut set = MarkerSet::for_scene(cat.first(), PLACEMENT_RADIUS, MARKER_RADIUS);
    set.clear();
    assert!(set.is_empty());
    assert!(set.pick(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).is_none());
}

#[test]
fn hovered_marker_is_enlarged_and_tinted() {
    let cat = scene_with(r#"[{"yaw":0,"pitch":0,"target":"far"}]"#);
    let set = MarkerSet::for_scene(cat.first(), PLACEMENT_RADIUS, MARKER_RADIUS);
    let plain = set.instances(None);
    let hot = set.instances(Some(0));
    assert_eq!(plain[0].color, MARKER_COLOR);
    assert_eq!(hot[0].color, MARKER_HOVER_COLOR);
    assert_abs_diff_eq!(hot[0].scale, MARKER_RADIUS * MARKER_HOVER_SCALE, epsilon = 1e-6);
    assert_eq!(plain[0].pos, hot[0].pos);
}

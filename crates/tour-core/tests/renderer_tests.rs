// Host-side tests for the renderer surface the frontends build against.
#![cfg(feature = "gpu")]

use tour_core::{surface_view_format, TourRenderer};
use wgpu::TextureFormat;

#[test]
fn renderer_is_reachable_from_crate_root() {
    fn accepts(_: Option<&TourRenderer>) {}
    accepts(None);
    assert!(std::mem::size_of::<TourRenderer>() > 0);
}

#[test]
fn canvas_formats_render_through_srgb_views() {
    assert_eq!(
        surface_view_format(TextureFormat::Bgra8Unorm),
        TextureFormat::Bgra8UnormSrgb
    );
    assert_eq!(
        surface_view_format(TextureFormat::Rgba8Unorm),
        TextureFormat::Rgba8UnormSrgb
    );
}

#[test]
fn srgb_surfaces_are_left_alone() {
    assert_eq!(
        surface_view_format(TextureFormat::Bgra8UnormSrgb),
        TextureFormat::Bgra8UnormSrgb
    );
}

pub mod catalogue;
pub mod companion;
pub mod config;
pub mod constants;
pub mod cubemap;
pub mod diagnostics;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod markers;
pub mod session;
pub mod sphere;
pub mod state;

pub use catalogue::*;
pub use companion::*;
pub use config::*;
pub use constants::*;
pub use cubemap::*;
pub use diagnostics::*;
#[cfg(feature = "gpu")]
pub use gpu::{surface_view_format, TourRenderer};
pub use markers::*;
pub use session::*;
pub use sphere::*;
pub use state::*;

// Shaders bundled as string constants
pub static SKYBOX_WGSL: &str = include_str!("../shaders/skybox.wgsl");
pub static MARKERS_WGSL: &str = include_str!("../shaders/markers.wgsl");

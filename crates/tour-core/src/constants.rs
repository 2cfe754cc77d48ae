// Shared placement/interaction tuning constants used by both web and native frontends.

// Hotspot placement
pub const PLACEMENT_RADIUS: f32 = 10.0; // distance from the viewer at which markers sit
pub const MARKER_RADIUS: f32 = 0.5; // marker sphere radius, also the pick radius

// Marker palette
pub const MARKER_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const MARKER_HOVER_COLOR: [f32; 4] = [1.0, 0.55, 0.35, 1.0];
pub const MARKER_HOVER_SCALE: f32 = 1.25; // enlarges the marker under the controller ray

// Marker sphere tessellation
pub const MARKER_SEGMENTS: u32 = 32;
pub const MARKER_RINGS: u32 = 32;

// Camera
pub const CAMERA_FOVY_DEGREES: f32 = 70.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 1000.0;
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01; // keeps look-at away from the poles

// Pointer-driven look (desktop preview)
pub const LOOK_RADIANS_PER_PX: f32 = 0.005;
pub const SELECT_DRAG_THRESHOLD_PX: f32 = 6.0; // pointer travel beyond this is a look drag, not a select

// Controllers tracked for select start/end
pub const MAX_CONTROLLERS: usize = 2;

// Cube face imagery
pub const FACE_PATH_PATTERN: &str = "tiles/{scene}/{level}/{face}/0/0.jpg";
pub const DEFAULT_FACE_LEVEL: u32 = 1;
pub const PLACEHOLDER_FACE_RGBA: [u8; 4] = [24, 26, 32, 255]; // shown until the first scene resolves

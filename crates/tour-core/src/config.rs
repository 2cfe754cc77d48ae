use crate::constants::{DEFAULT_FACE_LEVEL, MARKER_RADIUS, PLACEMENT_RADIUS};
use crate::cubemap::FacePathPattern;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with a switch request that arrives while a load is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// The newest request wins; completions of superseded loads are dropped.
    #[default]
    LatestWins,
    /// Park the newest request and issue it once the in-flight load settles.
    Queue,
    /// Let every load apply in completion order.
    Race,
}

impl OverlapPolicy {
    pub const NAMES: [&'static str; 3] = ["latest-wins", "queue", "race"];

    pub fn name(self) -> &'static str {
        match self {
            OverlapPolicy::LatestWins => "latest-wins",
            OverlapPolicy::Queue => "queue",
            OverlapPolicy::Race => "race",
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest-wins" => Ok(OverlapPolicy::LatestWins),
            "queue" => Ok(OverlapPolicy::Queue),
            "race" => Ok(OverlapPolicy::Race),
            other => Err(format!(
                "unknown overlap policy '{}' (expected one of: {})",
                other,
                OverlapPolicy::NAMES.join(", ")
            )),
        }
    }
}

/// Runtime knobs for a tour session. Missing fields fall back to the shared
/// constants, so a partial JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub overlap_policy: OverlapPolicy,
    pub placement_radius: f32,
    pub marker_radius: f32,
    pub face_path_pattern: FacePathPattern,
    pub face_level: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::default(),
            placement_radius: PLACEMENT_RADIUS,
            marker_radius: MARKER_RADIUS,
            face_path_pattern: FacePathPattern::default(),
            face_level: DEFAULT_FACE_LEVEL,
        }
    }
}

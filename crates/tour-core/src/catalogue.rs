//! Static scene catalogue, read from the JSON the companion panorama viewer uses.

use crate::diagnostics::{CatalogueError, TourError};
use fnv::FnvHashMap;
use serde::Deserialize;

fn default_fov() -> f32 {
    std::f32::consts::FRAC_PI_2
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParameters {
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default = "default_fov")]
    pub fov: f32,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov: default_fov(),
        }
    }
}

/// Navigation hotspot. `rotation` is the in-plane marker rotation; placement ignores it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LinkHotspot {
    pub yaw: f32,
    pub pitch: f32,
    #[serde(default)]
    pub rotation: f32,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InfoHotspot {
    pub yaw: f32,
    pub pitch: f32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub tile_size: u32,
    pub size: u32,
    #[serde(default)]
    pub fallback_only: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub face_size: u32,
    #[serde(default)]
    pub initial_view_parameters: ViewParameters,
    #[serde(default)]
    pub link_hotspots: Vec<LinkHotspot>,
    #[serde(default)]
    pub info_hotspots: Vec<InfoHotspot>,
}

impl Scene {
    /// Resolution level to fetch faces from: `preferred`, clamped to the
    /// levels this scene actually has.
    pub fn face_level(&self, preferred: u32) -> u32 {
        match self.levels.len() {
            0 => preferred,
            n => preferred.min(n as u32 - 1),
        }
    }

    /// Reject scenes whose hotspot angles cannot be placed.
    pub fn validate(&self) -> Result<(), TourError> {
        let bad = self
            .link_hotspots
            .iter()
            .position(|h| !h.yaw.is_finite() || !h.pitch.is_finite());
        if let Some(i) = bad {
            return Err(TourError::MalformedScene {
                scene: self.id.clone(),
                reason: format!("link hotspot {} has a non-finite yaw or pitch", i),
            });
        }
        let view = &self.initial_view_parameters;
        if !(view.yaw.is_finite() && view.pitch.is_finite() && view.fov.is_finite()) {
            return Err(TourError::MalformedScene {
                scene: self.id.clone(),
                reason: "initial view parameters are not finite".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSettings {
    #[serde(default = "default_mouse_view_mode")]
    pub mouse_view_mode: String,
    #[serde(default)]
    pub autorotate_enabled: bool,
    #[serde(default)]
    pub fullscreen_button: bool,
    #[serde(default)]
    pub view_control_buttons: bool,
}

fn default_mouse_view_mode() -> String {
    "drag".to_string()
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            mouse_view_mode: default_mouse_view_mode(),
            autorotate_enabled: false,
            fullscreen_button: false,
            view_control_buttons: false,
        }
    }
}

#[derive(Deserialize)]
struct RawCatalogue {
    scenes: Vec<Scene>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    settings: TourSettings,
}

/// Immutable set of scenes indexed by id.
#[derive(Clone, Debug)]
pub struct Catalogue {
    name: String,
    settings: TourSettings,
    scenes: Vec<Scene>,
    index: FnvHashMap<String, usize>,
}

impl Catalogue {
    /// Parse catalogue JSON. A `var APP_DATA = { ... };` script wrapper is
    /// tolerated so the viewer's data file can be read as-is.
    pub fn from_json(source: &str) -> Result<Self, CatalogueError> {
        let json = strip_script_wrapper(source);
        let raw: RawCatalogue =
            serde_json::from_str(json).map_err(|e| CatalogueError::Parse(e.to_string()))?;
        Self::from_scenes(raw.name, raw.settings, raw.scenes)
    }

    pub fn from_scenes(
        name: String,
        settings: TourSettings,
        scenes: Vec<Scene>,
    ) -> Result<Self, CatalogueError> {
        if scenes.is_empty() {
            return Err(CatalogueError::Empty);
        }
        let mut index = FnvHashMap::default();
        for (i, scene) in scenes.iter().enumerate() {
            if index.insert(scene.id.clone(), i).is_some() {
                return Err(CatalogueError::DuplicateScene(scene.id.clone()));
            }
        }
        Ok(Self {
            name,
            settings,
            scenes,
            index,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Scene> {
        self.index.get(id).map(|&i| &self.scenes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn first(&self) -> &Scene {
        &self.scenes[0]
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &TourSettings {
        &self.settings
    }

    /// Link hotspots whose target is not in the catalogue. These do not stop
    /// the tour from loading; activating one records a diagnostic.
    pub fn dangling_links(&self) -> Vec<CatalogueError> {
        self.scenes
            .iter()
            .flat_map(|scene| {
                scene
                    .link_hotspots
                    .iter()
                    .filter(|h| !self.contains(&h.target))
                    .map(move |h| CatalogueError::DanglingLink {
                        scene: scene.id.clone(),
                        target: h.target.clone(),
                    })
            })
            .collect()
    }
}

fn strip_script_wrapper(source: &str) -> &str {
    let trimmed = source.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    }
}

//! Cube-map faces: labels, upload order, path resolution and decoding.

use crate::constants::{FACE_PATH_PATTERN, PLACEHOLDER_FACE_RGBA};
use crate::diagnostics::{FaceFailure, TourError};
use serde::{Deserialize, Serialize};

/// One face of a cube-mapped panorama.
///
/// Declaration order is the GPU layer order: +X, -X, +Y, -Y, +Z, -Z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Right,
    Left,
    Up,
    Down,
    Front,
    Back,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Right,
        CubeFace::Left,
        CubeFace::Up,
        CubeFace::Down,
        CubeFace::Front,
        CubeFace::Back,
    ];

    /// Short label used in tile paths.
    pub fn label(self) -> &'static str {
        match self {
            CubeFace::Right => "r",
            CubeFace::Left => "l",
            CubeFace::Up => "u",
            CubeFace::Down => "d",
            CubeFace::Front => "f",
            CubeFace::Back => "b",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        CubeFace::ALL.into_iter().find(|f| f.label() == label)
    }

    #[inline]
    pub fn layer(self) -> u32 {
        self as u32
    }
}

/// Path template for face images. `{scene}`, `{level}` and `{face}` are
/// substituted; anything else is copied through.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacePathPattern(String);

impl Default for FacePathPattern {
    fn default() -> Self {
        Self(FACE_PATH_PATTERN.to_string())
    }
}

impl FacePathPattern {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn resolve(&self, scene_id: &str, level: u32, face: CubeFace) -> String {
        self.0
            .replace("{scene}", scene_id)
            .replace("{level}", &level.to_string())
            .replace("{face}", face.label())
    }

    /// Paths for all six faces in layer order.
    pub fn resolve_all(&self, scene_id: &str, level: u32) -> [String; 6] {
        CubeFace::ALL.map(|face| self.resolve(scene_id, level, face))
    }
}

/// Decoded RGBA8 pixels of one face.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl FaceImage {
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let size = size.max(1);
        Self {
            width: size,
            height: size,
            rgba: rgba.repeat((size * size) as usize),
        }
    }
}

/// Six square faces of equal size, in layer order.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeImages {
    faces: [FaceImage; 6],
}

impl CubeImages {
    /// Dark 1x1 cube shown before any scene has resolved.
    pub fn placeholder() -> Self {
        Self {
            faces: std::array::from_fn(|_| FaceImage::solid(1, PLACEHOLDER_FACE_RGBA)),
        }
    }

    /// Decode the raw bytes fetched for each face. `encoded` is in layer
    /// order; an `Err` carries the fetch failure for that face.
    ///
    /// Any fetch, decode or size failure yields a single
    /// [`TourError::FaceLoad`] listing every face that failed.
    pub fn from_encoded(
        scene_id: &str,
        encoded: [Result<Vec<u8>, String>; 6],
    ) -> Result<Self, TourError> {
        let mut failures = Vec::new();
        let mut decoded: Vec<Option<FaceImage>> = Vec::with_capacity(6);
        for (face, bytes) in CubeFace::ALL.into_iter().zip(encoded) {
            let result = bytes.and_then(|b| FaceImage::decode(&b).map_err(|e| e.to_string()));
            match result {
                Ok(img) => decoded.push(Some(img)),
                Err(reason) => {
                    failures.push(FaceFailure { face, reason });
                    decoded.push(None);
                }
            }
        }
        if !failures.is_empty() {
            return Err(TourError::FaceLoad {
                scene: scene_id.to_string(),
                faces: failures,
            });
        }
        let faces: Vec<FaceImage> = decoded.into_iter().flatten().collect();
        let faces: [FaceImage; 6] = faces.try_into().map_err(|_| TourError::FaceLoad {
            scene: scene_id.to_string(),
            faces: Vec::new(),
        })?;
        Self::from_faces(scene_id, faces)
    }

    /// Check that every face is square and matches the front face's size.
    pub fn from_faces(scene_id: &str, faces: [FaceImage; 6]) -> Result<Self, TourError> {
        let reference = &faces[CubeFace::Front.layer() as usize];
        let (w, h) = (reference.width, reference.height);
        let failures: Vec<FaceFailure> = CubeFace::ALL
            .into_iter()
            .zip(faces.iter())
            .filter_map(|(face, img)| {
                if img.width != img.height {
                    Some(FaceFailure {
                        face,
                        reason: format!("not square ({}x{})", img.width, img.height),
                    })
                } else if (img.width, img.height) != (w, h) {
                    Some(FaceFailure {
                        face,
                        reason: format!("{}x{} differs from {}x{}", img.width, img.height, w, h),
                    })
                } else if img.rgba.len() != (img.width * img.height * 4) as usize {
                    Some(FaceFailure {
                        face,
                        reason: "pixel data length mismatch".to_string(),
                    })
                } else {
                    None
                }
            })
            .collect();
        if failures.is_empty() {
            Ok(Self { faces })
        } else {
            Err(TourError::FaceLoad {
                scene: scene_id.to_string(),
                faces: failures,
            })
        }
    }

    pub fn size(&self) -> u32 {
        self.faces[0].width
    }

    pub fn face(&self, face: CubeFace) -> &FaceImage {
        &self.faces[face.layer() as usize]
    }

    pub fn faces(&self) -> &[FaceImage; 6] {
        &self.faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(size: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(size, size, image::Rgba([10, 20, 30, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn labels_follow_layer_order() {
        let labels: Vec<&str> = CubeFace::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(labels, ["r", "l", "u", "d", "f", "b"]);
        assert_eq!(CubeFace::from_label("d"), Some(CubeFace::Down));
        assert_eq!(CubeFace::from_label("x"), None);
        assert_eq!(CubeFace::Back.layer(), 5);
    }

    #[test]
    fn default_pattern_matches_tile_layout() {
        let paths = FacePathPattern::default().resolve_all("0-first-f-view-1", 1);
        assert_eq!(paths[0], "tiles/0-first-f-view-1/1/r/0/0.jpg");
        assert_eq!(paths[5], "tiles/0-first-f-view-1/1/b/0/0.jpg");
    }

    #[test]
    fn decodes_six_png_faces() {
        let encoded = std::array::from_fn(|_| Ok(png_bytes(4)));
        let cube = CubeImages::from_encoded("s", encoded).unwrap();
        assert_eq!(cube.size(), 4);
        assert_eq!(&cube.face(CubeFace::Up).rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn one_missing_face_is_one_error() {
        let mut encoded: [Result<Vec<u8>, String>; 6] = std::array::from_fn(|_| Ok(png_bytes(4)));
        encoded[2] = Err("HTTP 404".into());
        match CubeImages::from_encoded("s", encoded) {
            Err(TourError::FaceLoad { scene, faces }) => {
                assert_eq!(scene, "s");
                assert_eq!(faces.len(), 1);
                assert_eq!(faces[0].face, CubeFace::Up);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn mismatched_face_size_is_rejected() {
        let mut faces: [FaceImage; 6] = std::array::from_fn(|_| FaceImage::solid(8, [0; 4]));
        faces[1] = FaceImage::solid(4, [0; 4]);
        let err = CubeImages::from_faces("s", faces).unwrap_err();
        assert!(err.to_string().contains("l (4x4 differs from 8x8)"));
    }
}

//! Error kinds for the tour and the batched diagnostic log.
//!
//! Nothing in the tour aborts the immersive session. Fallible steps return a
//! [`TourError`]; the session records it in [`Diagnostics`], and the joined log
//! is shown once, when the session ends.

use crate::cubemap::CubeFace;
use std::fmt;

/// Problems found while loading or validating the scene catalogue.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogueError {
    #[error("catalogue JSON is invalid: {0}")]
    Parse(String),
    #[error("catalogue contains no scenes")]
    Empty,
    #[error("scene id '{0}' appears more than once")]
    DuplicateScene(String),
    #[error("scene '{scene}' links to unknown scene '{target}'")]
    DanglingLink { scene: String, target: String },
}

/// One cube face that could not be fetched or decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceFailure {
    pub face: CubeFace,
    pub reason: String,
}

impl fmt::Display for FaceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.face.label(), self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TourError {
    #[error("immersive session failed to start: {0}")]
    SessionInit(String),
    #[error("no scene with id '{0}' in the catalogue")]
    UnknownScene(String),
    #[error("scene '{scene}' is malformed: {reason}")]
    MalformedScene { scene: String, reason: String },
    #[error("scene '{scene}': {} face(s) failed to load: {}", .faces.len(), join_failures(.faces))]
    FaceLoad {
        scene: String,
        faces: Vec<FaceFailure>,
    },
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

fn join_failures(faces: &[FaceFailure]) -> String {
    faces
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Accumulating log of user-facing diagnostic messages.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn record(&mut self, err: &TourError) {
        log::warn!("[diag] {}", err);
        self.messages.push(err.to_string());
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Empty the log, returning the messages joined one per line, or `None`
    /// when nothing was recorded.
    pub fn drain_joined(&mut self) -> Option<String> {
        if self.messages.is_empty() {
            return None;
        }
        let joined = self.messages.join("\n");
        self.messages.clear();
        Some(joined)
    }
}

//! Scene-switch sequencing.
//!
//! A [`TourSession`] owns everything the immersive view mutates: the displayed
//! scene, the live marker set and the pending background. Hosts drive it from
//! their frame loop:
//!
//! 1. a hotspot selection or external request calls [`TourSession::request_switch`];
//! 2. the host drains [`LoadRequest`]s and fetches the six faces however it can;
//! 3. the host hands each result back with its sequence number through
//!    [`TourSession::complete_load`].
//!
//! Sequence numbers decide whether a completing load is still wanted; what
//! happens to overlapping requests is governed by [`OverlapPolicy`].

use crate::catalogue::Catalogue;
use crate::companion::{SwitchOrigin, TourEvent};
use crate::config::{OverlapPolicy, SessionConfig};
use crate::constants::MAX_CONTROLLERS;
use crate::cubemap::CubeImages;
use crate::diagnostics::{Diagnostics, TourError};
use crate::markers::{MarkerInstance, MarkerSet, Ray};
use instant::Instant;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchState {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Six face paths to fetch for one switch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub seq: u64,
    pub scene_id: String,
    pub paths: [String; 6],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwitchResponse {
    /// A load was issued under this sequence number.
    Issued(u64),
    /// A load is in flight; the request waits for it to settle.
    Parked,
    /// Unknown or malformed target; a diagnostic was recorded.
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// Superseded or unknown sequence number; the result was dropped.
    Stale,
}

struct InFlight {
    seq: u64,
    scene_id: String,
    origin: SwitchOrigin,
    started: Instant,
}

pub struct TourSession {
    catalogue: Catalogue,
    config: SessionConfig,
    state: SwitchState,
    displayed: Option<String>,
    markers: MarkerSet,
    hovered: Option<usize>,
    pending_upload: Option<CubeImages>,
    last_seq: u64,
    in_flight: Vec<InFlight>,
    parked: Option<(String, SwitchOrigin)>,
    requests: VecDeque<LoadRequest>,
    events: Vec<TourEvent>,
    diagnostics: Diagnostics,
    immersive: bool,
    selecting: [bool; MAX_CONTROLLERS],
}

impl TourSession {
    pub fn new(catalogue: Catalogue, config: SessionConfig) -> Self {
        for warning in catalogue.dangling_links() {
            log::warn!("[catalogue] {}", warning);
        }
        log::info!(
            "[session] '{}' with {} scenes, overlap policy {}",
            catalogue.name(),
            catalogue.len(),
            config.overlap_policy
        );
        Self {
            catalogue,
            config,
            state: SwitchState::Idle,
            displayed: None,
            markers: MarkerSet::default(),
            hovered: None,
            pending_upload: None,
            last_seq: 0,
            in_flight: Vec::new(),
            parked: None,
            requests: VecDeque::new(),
            events: Vec::new(),
            diagnostics: Diagnostics::default(),
            immersive: false,
            selecting: [false; MAX_CONTROLLERS],
        }
    }

    /// Load the given scene, or the first one in the catalogue.
    pub fn start(&mut self, scene_id: Option<&str>) -> SwitchResponse {
        let id = scene_id
            .map(str::to_string)
            .unwrap_or_else(|| self.catalogue.first().id.clone());
        self.request_switch(&id, SwitchOrigin::Startup)
    }

    /// Entry point for callers outside the immersive view, such as the
    /// companion viewer.
    pub fn switch_to(&mut self, scene_id: &str) -> SwitchResponse {
        self.request_switch(scene_id, SwitchOrigin::Companion)
    }

    pub fn request_switch(&mut self, scene_id: &str, origin: SwitchOrigin) -> SwitchResponse {
        let Some(scene) = self.catalogue.get(scene_id) else {
            self.diagnostics
                .record(&TourError::UnknownScene(scene_id.to_string()));
            return SwitchResponse::Rejected;
        };
        if let Err(err) = scene.validate() {
            self.diagnostics.record(&err);
            return SwitchResponse::Rejected;
        }
        if self.state == SwitchState::Loading && self.config.overlap_policy == OverlapPolicy::Queue
        {
            log::info!("[switch] parking '{}' until the current load settles", scene_id);
            self.parked = Some((scene_id.to_string(), origin));
            return SwitchResponse::Parked;
        }
        SwitchResponse::Issued(self.issue(scene_id, origin))
    }

    fn issue(&mut self, scene_id: &str, origin: SwitchOrigin) -> u64 {
        let level = self
            .catalogue
            .get(scene_id)
            .map_or(self.config.face_level, |s| s.face_level(self.config.face_level));
        self.markers.clear();
        self.hovered = None;
        self.last_seq += 1;
        let seq = self.last_seq;
        if self.config.overlap_policy == OverlapPolicy::LatestWins {
            for old in self.in_flight.drain(..) {
                log::info!("[switch] #{} '{}' superseded by #{}", old.seq, old.scene_id, seq);
            }
        }
        self.in_flight.push(InFlight {
            seq,
            scene_id: scene_id.to_string(),
            origin,
            started: Instant::now(),
        });
        self.state = SwitchState::Loading;
        log::info!("[switch] #{} -> '{}' ({:?})", seq, scene_id, origin);
        self.requests.push_back(LoadRequest {
            seq,
            scene_id: scene_id.to_string(),
            paths: self.config.face_path_pattern.resolve_all(scene_id, level),
        });
        seq
    }

    /// Deliver the result of the load issued under `seq`.
    pub fn complete_load(
        &mut self,
        seq: u64,
        result: Result<CubeImages, TourError>,
    ) -> LoadOutcome {
        let Some(pos) = self.in_flight.iter().position(|f| f.seq == seq) else {
            log::info!("[load] dropping result of superseded load #{}", seq);
            return LoadOutcome::Stale;
        };
        let flight = self.in_flight.remove(pos);
        let outcome = match result {
            Ok(images) => self.apply(flight, images),
            Err(err) => {
                self.fail(err);
                LoadOutcome::Failed
            }
        };
        if self.in_flight.is_empty() {
            if let Some((id, origin)) = self.parked.take() {
                self.request_switch(&id, origin);
            }
        }
        outcome
    }

    fn apply(&mut self, flight: InFlight, images: CubeImages) -> LoadOutcome {
        let Some(scene) = self.catalogue.get(&flight.scene_id) else {
            self.fail(TourError::UnknownScene(flight.scene_id));
            return LoadOutcome::Failed;
        };
        self.markers = MarkerSet::for_scene(
            scene,
            self.config.placement_radius,
            self.config.marker_radius,
        );
        self.hovered = None;
        self.pending_upload = Some(images);
        self.state = if self.in_flight.is_empty() {
            SwitchState::Ready
        } else {
            SwitchState::Loading
        };
        log::info!(
            "[load] #{} '{}' ready in {:.0} ms, {} marker(s)",
            flight.seq,
            flight.scene_id,
            flight.started.elapsed().as_secs_f64() * 1000.0,
            self.markers.len()
        );
        self.events.push(TourEvent::SceneChanged {
            scene: flight.scene_id.clone(),
            origin: flight.origin,
        });
        self.displayed = Some(flight.scene_id);
        LoadOutcome::Applied
    }

    fn fail(&mut self, err: TourError) {
        self.diagnostics.record(&err);
        // The outgoing scene is still on screen; give it its markers back.
        self.markers = self
            .displayed
            .as_deref()
            .and_then(|id| self.catalogue.get(id))
            .map(|scene| {
                MarkerSet::for_scene(
                    scene,
                    self.config.placement_radius,
                    self.config.marker_radius,
                )
            })
            .unwrap_or_default();
        self.hovered = None;
        self.state = if self.in_flight.is_empty() {
            SwitchState::Error
        } else {
            SwitchState::Loading
        };
    }

    pub fn select_start(&mut self, controller: usize) {
        if let Some(s) = self.selecting.get_mut(controller) {
            *s = true;
        }
    }

    /// Select-end gesture: pick the nearest live marker along `ray` and
    /// switch to its target. A miss is a no-op and returns `None`.
    pub fn select_end(&mut self, controller: usize, ray: &Ray) -> Option<SwitchResponse> {
        if let Some(s) = self.selecting.get_mut(controller) {
            *s = false;
        }
        let target = self.markers.pick(ray)?.target.to_string();
        log::info!("[select] controller {} hit '{}'", controller, target);
        Some(self.request_switch(&target, SwitchOrigin::Hotspot))
    }

    /// Abandon a gesture without picking, e.g. when a press turned into a drag.
    pub fn select_cancel(&mut self, controller: usize) {
        if let Some(s) = self.selecting.get_mut(controller) {
            *s = false;
        }
    }

    pub fn is_selecting(&self, controller: usize) -> bool {
        self.selecting.get(controller).copied().unwrap_or(false)
    }

    pub fn update_hover(&mut self, ray: Option<&Ray>) {
        self.hovered = ray
            .and_then(|r| self.markers.pick(r))
            .map(|hit| hit.index);
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn marker_instances(&self) -> Vec<MarkerInstance> {
        self.markers.instances(self.hovered)
    }

    pub fn enter_immersive(&mut self) {
        if !self.immersive {
            log::info!("[session] immersive session started");
        }
        self.immersive = true;
    }

    /// End the immersive session and return the batched diagnostics, joined
    /// one per line, for a single toast.
    pub fn end_immersive(&mut self) -> Option<String> {
        if !self.immersive {
            return None;
        }
        self.immersive = false;
        let toast = self.diagnostics.drain_joined();
        log::info!(
            "[session] immersive session ended ({} diagnostic line(s))",
            toast.as_deref().map_or(0, |t| t.lines().count())
        );
        self.events.push(TourEvent::SessionEnded {
            toast: toast.clone(),
        });
        toast
    }

    pub fn is_immersive(&self) -> bool {
        self.immersive
    }

    /// Record a failure reported by the host, e.g. renderer or XR setup.
    pub fn record_failure(&mut self, err: TourError) {
        self.diagnostics.record(&err);
    }

    pub fn drain_load_requests(&mut self) -> Vec<LoadRequest> {
        self.requests.drain(..).collect()
    }

    pub fn drain_events(&mut self) -> Vec<TourEvent> {
        std::mem::take(&mut self.events)
    }

    /// Imagery of the most recently applied scene, once, for GPU upload.
    pub fn take_background_upload(&mut self) -> Option<CubeImages> {
        self.pending_upload.take()
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Scene whose imagery is currently shown.
    pub fn displayed_scene(&self) -> Option<&str> {
        self.displayed.as_deref()
    }

    pub fn loading_scenes(&self) -> impl Iterator<Item = &str> {
        self.in_flight.iter().map(|f| f.scene_id.as_str())
    }

    pub fn parked_scene(&self) -> Option<&str> {
        self.parked.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

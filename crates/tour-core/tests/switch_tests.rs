// Host-side tests for scene-switch sequencing.

use glam::Vec3;
use tour_core::*;

const DEMO_TOUR: &str = include_str!("../../../assets/tour.json");

const FIRST: &str = "0-first-f-view-1";
const UG1: &str = "1-ug-view-1";
const UG2: &str = "2-ug-view-2";

fn session_with(policy: OverlapPolicy) -> TourSession {
    let catalogue = Catalogue::from_json(DEMO_TOUR).expect("demo tour parses");
    let config = SessionConfig {
        overlap_policy: policy,
        ..SessionConfig::default()
    };
    TourSession::new(catalogue, config)
}

fn cube(shade: u8) -> CubeImages {
    let faces = std::array::from_fn(|_| FaceImage::solid(2, [shade, shade, shade, 255]));
    CubeImages::from_faces("test", faces).unwrap()
}

fn issued(resp: SwitchResponse) -> u64 {
    match resp {
        SwitchResponse::Issued(seq) => seq,
        other => panic!("expected an issued load, got {:?}", other),
    }
}

/// Start on `scene` and resolve its load.
fn ready_on(policy: OverlapPolicy, scene: &str) -> TourSession {
    let mut s = session_with(policy);
    let seq = issued(s.start(Some(scene)));
    assert_eq!(s.complete_load(seq, Ok(cube(1))), LoadOutcome::Applied);
    s.take_background_upload();
    s.drain_events();
    s.drain_load_requests();
    s
}

/// Result of a load where none of the six faces could be fetched.
fn unreachable_faces(scene: &str) -> Result<CubeImages, TourError> {
    CubeImages::from_encoded(scene, std::array::from_fn(|_| Err("HTTP 404".into())))
}

fn marker_targets(s: &TourSession) -> Vec<String> {
    s.markers().targets().map(str::to_string).collect()
}

fn ray_at(s: &TourSession, index: usize) -> Ray {
    let m = s.markers().iter().nth(index).expect("marker exists");
    Ray::new(Vec3::ZERO, m.position)
}

#[test]
fn start_issues_six_face_paths_for_first_scene() {
    let mut s = session_with(OverlapPolicy::LatestWins);
    assert_eq!(s.state(), SwitchState::Idle);
    let seq = issued(s.start(None));
    assert_eq!(s.state(), SwitchState::Loading);
    let reqs = s.drain_load_requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].seq, seq);
    assert_eq!(reqs[0].scene_id, FIRST);
    assert_eq!(reqs[0].paths[4], format!("tiles/{FIRST}/1/f/0/0.jpg"));
    assert!(s.markers().is_empty());
    assert_eq!(s.displayed_scene(), None);
}

#[test]
fn successful_load_installs_background_and_markers() {
    let mut s = session_with(OverlapPolicy::LatestWins);
    let seq = issued(s.start(Some(UG1)));
    assert_eq!(s.complete_load(seq, Ok(cube(9))), LoadOutcome::Applied);
    assert_eq!(s.state(), SwitchState::Ready);
    assert_eq!(s.displayed_scene(), Some(UG1));
    assert_eq!(marker_targets(&s), [UG2, FIRST]);
    for m in s.markers().iter() {
        assert!((m.position.length() - PLACEMENT_RADIUS).abs() < 1e-4);
        assert_eq!(m.radius, MARKER_RADIUS);
    }
    assert_eq!(s.take_background_upload(), Some(cube(9)));
    assert_eq!(s.take_background_upload(), None);
    assert_eq!(
        s.drain_events(),
        vec![TourEvent::SceneChanged {
            scene: UG1.into(),
            origin: SwitchOrigin::Startup
        }]
    );
}

#[test]
fn switch_tears_down_markers_before_loading() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    assert_eq!(s.markers().len(), 2);
    issued(s.request_switch(UG2, SwitchOrigin::Companion));
    assert!(s.markers().is_empty());
    assert_eq!(s.state(), SwitchState::Loading);
    // The outgoing imagery stays up until the new faces resolve.
    assert_eq!(s.displayed_scene(), Some(UG1));
}

#[test]
fn round_trip_restores_marker_targets() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    let original = marker_targets(&s);
    let original_positions: Vec<Vec3> = s.markers().iter().map(|m| m.position).collect();

    let seq = issued(s.request_switch(UG2, SwitchOrigin::Hotspot));
    s.complete_load(seq, Ok(cube(2)));
    assert_eq!(marker_targets(&s), [UG1]);

    let seq = issued(s.request_switch(UG1, SwitchOrigin::Hotspot));
    s.complete_load(seq, Ok(cube(1)));
    assert_eq!(marker_targets(&s), original);
    let positions: Vec<Vec3> = s.markers().iter().map(|m| m.position).collect();
    assert_eq!(positions, original_positions);
}

#[test]
fn unknown_target_records_one_diagnostic_and_changes_nothing() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    let before = marker_targets(&s);
    assert_eq!(
        s.request_switch("no-such-scene", SwitchOrigin::Companion),
        SwitchResponse::Rejected
    );
    assert_eq!(s.diagnostics().len(), 1);
    assert!(s.diagnostics().messages()[0].contains("no-such-scene"));
    assert_eq!(s.displayed_scene(), Some(UG1));
    assert_eq!(s.state(), SwitchState::Ready);
    assert_eq!(marker_targets(&s), before);
    assert!(s.drain_load_requests().is_empty());
}

#[test]
fn one_failed_face_keeps_previous_background() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    let seq = issued(s.request_switch(UG2, SwitchOrigin::Hotspot));

    let ok_face = {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    };
    let mut encoded: [Result<Vec<u8>, String>; 6] = std::array::from_fn(|_| Ok(ok_face.clone()));
    encoded[CubeFace::Down.layer() as usize] = Err("HTTP 404".into());
    let result = CubeImages::from_encoded(UG2, encoded);

    assert_eq!(s.complete_load(seq, result), LoadOutcome::Failed);
    assert_eq!(s.state(), SwitchState::Error);
    assert_eq!(s.diagnostics().len(), 1);
    assert!(s.diagnostics().messages()[0].contains("d (HTTP 404)"));
    assert_eq!(s.displayed_scene(), Some(UG1));
    assert_eq!(s.take_background_upload(), None);
    // The scene still on screen gets its markers back.
    assert_eq!(marker_targets(&s), [UG2, FIRST]);
    assert!(s.drain_events().is_empty());
}

#[test]
fn latest_wins_drops_stale_completion() {
    let mut s = ready_on(OverlapPolicy::LatestWins, FIRST);
    let first = issued(s.request_switch(UG1, SwitchOrigin::Hotspot));
    let second = issued(s.request_switch(UG2, SwitchOrigin::Companion));
    assert!(second > first);

    assert_eq!(s.complete_load(second, Ok(cube(2))), LoadOutcome::Applied);
    assert_eq!(s.complete_load(first, Ok(cube(1))), LoadOutcome::Stale);
    assert_eq!(s.displayed_scene(), Some(UG2));
    assert_eq!(marker_targets(&s), [UG1]);
    assert_eq!(s.take_background_upload(), Some(cube(2)));
    assert_eq!(s.state(), SwitchState::Ready);
    assert!(s.diagnostics().is_empty());
}

#[test]
fn latest_wins_drops_stale_completion_arriving_first() {
    let mut s = ready_on(OverlapPolicy::LatestWins, FIRST);
    let first = issued(s.request_switch(UG1, SwitchOrigin::Hotspot));
    let second = issued(s.request_switch(UG2, SwitchOrigin::Hotspot));
    assert_eq!(s.complete_load(first, Ok(cube(1))), LoadOutcome::Stale);
    assert_eq!(s.state(), SwitchState::Loading);
    assert_eq!(s.displayed_scene(), Some(FIRST));
    assert_eq!(s.complete_load(second, Ok(cube(2))), LoadOutcome::Applied);
    assert_eq!(s.displayed_scene(), Some(UG2));
}

#[test]
fn race_applies_in_completion_order() {
    let mut s = ready_on(OverlapPolicy::Race, FIRST);
    let first = issued(s.request_switch(UG1, SwitchOrigin::Hotspot));
    let second = issued(s.request_switch(UG2, SwitchOrigin::Hotspot));

    assert_eq!(s.complete_load(second, Ok(cube(2))), LoadOutcome::Applied);
    assert_eq!(s.state(), SwitchState::Loading);
    assert_eq!(s.complete_load(first, Ok(cube(1))), LoadOutcome::Applied);
    // The older load resolved last and overwrote the newer one.
    assert_eq!(s.displayed_scene(), Some(UG1));
    assert_eq!(s.take_background_upload(), Some(cube(1)));
    assert_eq!(s.state(), SwitchState::Ready);
}

#[test]
fn queue_parks_newest_request_until_load_settles() {
    let mut s = ready_on(OverlapPolicy::Queue, FIRST);
    let first = issued(s.request_switch(UG1, SwitchOrigin::Hotspot));
    s.drain_load_requests();
    assert_eq!(
        s.request_switch(FIRST, SwitchOrigin::Companion),
        SwitchResponse::Parked
    );
    assert_eq!(
        s.request_switch(UG2, SwitchOrigin::Companion),
        SwitchResponse::Parked
    );
    assert_eq!(s.parked_scene(), Some(UG2));
    assert!(s.drain_load_requests().is_empty());

    assert_eq!(s.complete_load(first, Ok(cube(1))), LoadOutcome::Applied);
    assert_eq!(s.displayed_scene(), Some(UG1));
    assert_eq!(s.parked_scene(), None);
    assert_eq!(s.state(), SwitchState::Loading);
    let reqs = s.drain_load_requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].scene_id, UG2);
    assert!(reqs[0].seq > first);
}

#[test]
fn queue_issues_parked_request_after_failed_load() {
    let mut s = ready_on(OverlapPolicy::Queue, FIRST);
    let first = issued(s.request_switch(UG1, SwitchOrigin::Hotspot));
    s.drain_load_requests();
    assert_eq!(
        s.request_switch(UG2, SwitchOrigin::Companion),
        SwitchResponse::Parked
    );

    assert_eq!(s.complete_load(first, unreachable_faces(UG1)), LoadOutcome::Failed);
    assert_eq!(s.diagnostics().len(), 1);
    assert_eq!(s.displayed_scene(), Some(FIRST));
    assert_eq!(s.parked_scene(), None);
    assert_eq!(s.state(), SwitchState::Loading);
    let reqs = s.drain_load_requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].scene_id, UG2);
    assert!(reqs[0].seq > first);
}

#[test]
fn race_older_failure_after_newer_applied_keeps_newer_scene() {
    let mut s = ready_on(OverlapPolicy::Race, FIRST);
    let first = issued(s.request_switch(UG1, SwitchOrigin::Hotspot));
    let second = issued(s.request_switch(UG2, SwitchOrigin::Hotspot));

    assert_eq!(s.complete_load(second, Ok(cube(2))), LoadOutcome::Applied);
    assert_eq!(s.complete_load(first, unreachable_faces(UG1)), LoadOutcome::Failed);
    assert_eq!(s.displayed_scene(), Some(UG2));
    assert_eq!(s.state(), SwitchState::Error);
    assert_eq!(s.diagnostics().len(), 1);
    assert_eq!(marker_targets(&s), [UG1]);
    assert_eq!(s.take_background_upload(), Some(cube(2)));
}

#[test]
fn select_end_switches_to_nearest_hit_target() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    s.select_start(0);
    assert!(s.is_selecting(0));
    let ray = ray_at(&s, 1);
    let resp = s.select_end(0, &ray);
    assert!(!s.is_selecting(0));
    assert!(matches!(resp, Some(SwitchResponse::Issued(_))));
    let reqs = s.drain_load_requests();
    assert_eq!(reqs[0].scene_id, FIRST);
}

#[test]
fn select_end_miss_is_a_no_op() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    let ray = Ray::new(Vec3::ZERO, Vec3::Y);
    assert_eq!(s.select_end(1, &ray), None);
    assert_eq!(s.state(), SwitchState::Ready);
    assert_eq!(s.markers().len(), 2);
    assert!(s.diagnostics().is_empty());
    // Unknown controller indices are tolerated.
    assert_eq!(s.select_end(7, &ray), None);
}

#[test]
fn hover_tracks_marker_under_ray() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    let ray = ray_at(&s, 0);
    s.update_hover(Some(&ray));
    assert_eq!(s.hovered(), Some(0));
    let inst = s.marker_instances();
    assert_eq!(inst[0].color, MARKER_HOVER_COLOR);
    assert_eq!(inst[1].color, MARKER_COLOR);
    s.update_hover(None);
    assert_eq!(s.hovered(), None);
}

#[test]
fn diagnostics_surface_only_when_session_ends() {
    let mut s = ready_on(OverlapPolicy::LatestWins, UG1);
    assert_eq!(s.end_immersive(), None, "not in a session yet");

    s.enter_immersive();
    s.request_switch("ghost-1", SwitchOrigin::Hotspot);
    s.record_failure(TourError::SessionInit("controller lost".into()));
    assert!(s.drain_events().is_empty());
    assert_eq!(s.diagnostics().len(), 2);

    let toast = s.end_immersive().expect("toast");
    assert_eq!(toast.lines().count(), 2);
    assert!(toast.contains("ghost-1"));
    assert!(s.diagnostics().is_empty());
    assert!(!s.is_immersive());
    assert_eq!(
        s.drain_events(),
        vec![TourEvent::SessionEnded { toast: Some(toast) }]
    );
}

#[test]
fn companion_is_not_echoed_its_own_switch() {
    let mut s = ready_on(OverlapPolicy::LatestWins, FIRST);
    let seq = issued(s.request_switch(UG1, SwitchOrigin::Companion));
    s.complete_load(seq, Ok(cube(1)));
    let seq = issued(s.request_switch(UG2, SwitchOrigin::Hotspot));
    s.complete_load(seq, Ok(cube(2)));
    let followed: Vec<String> = s
        .drain_events()
        .iter()
        .filter_map(|e| e.companion_scene().map(str::to_string))
        .collect();
    assert_eq!(followed, [UG2]);
}

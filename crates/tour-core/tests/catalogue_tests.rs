// Host-side tests for reading the scene catalogue.

use tour_core::{Catalogue, CatalogueError};

const DEMO_TOUR: &str = include_str!("../../../assets/tour.json");

#[test]
fn demo_tour_parses() {
    let cat = Catalogue::from_json(DEMO_TOUR).expect("demo tour parses");
    assert_eq!(cat.len(), 3);
    assert_eq!(cat.first().id, "0-first-f-view-1");
    assert_eq!(cat.name(), "Project Title");
    assert!(cat.settings().autorotate_enabled);

    let ug1 = cat.get("1-ug-view-1").unwrap();
    assert_eq!(ug1.name, "ug view 1");
    assert_eq!(ug1.levels.len(), 4);
    assert!(ug1.levels[0].fallback_only);
    assert_eq!(ug1.face_size, 2048);
    let targets: Vec<&str> = ug1.link_hotspots.iter().map(|h| h.target.as_str()).collect();
    assert_eq!(targets, ["2-ug-view-2", "0-first-f-view-1"]);
    assert!((ug1.initial_view_parameters.fov - 1.38217411905719).abs() < 1e-6);
    assert!(cat.dangling_links().is_empty());
}

#[test]
fn missing_view_parameters_default_to_quarter_turn_fov() {
    let cat = Catalogue::from_json(r#"{"scenes":[{"id":"solo"}]}"#).unwrap();
    let view = &cat.first().initial_view_parameters;
    assert_eq!((view.yaw, view.pitch), (0.0, 0.0));
    assert!((view.fov - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    assert!(cat.first().link_hotspots.is_empty());
}

#[test]
fn dangling_links_are_reported_but_not_fatal() {
    let json = r#"{"scenes":[
        {"id":"a","linkHotspots":[{"yaw":0,"pitch":0,"target":"b"},{"yaw":1,"pitch":0,"target":"ghost"}]},
        {"id":"b"}
    ]}"#;
    let cat = Catalogue::from_json(json).unwrap();
    assert_eq!(
        cat.dangling_links(),
        vec![CatalogueError::DanglingLink {
            scene: "a".into(),
            target: "ghost".into()
        }]
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = Catalogue::from_json(r#"{"scenes":[{"id":"a"},{"id":"a"}]}"#).unwrap_err();
    assert_eq!(err, CatalogueError::DuplicateScene("a".into()));
}

#[test]
fn empty_and_garbage_catalogues_are_rejected() {
    assert_eq!(
        Catalogue::from_json(r#"{"scenes":[]}"#).unwrap_err(),
        CatalogueError::Empty
    );
    assert!(matches!(
        Catalogue::from_json("not json at all").unwrap_err(),
        CatalogueError::Parse(_)
    ));
}

//! Project import/export against a realistic fixture document.

use veneer::{Engine, FrameIndex, HeuristicMeasure, OverlayKind, Project, VeneerError};

const TUTORIAL: &str = include_str!("data/tutorial.json");

#[test]
fn fixture_imports_with_every_field_intact() {
    let p = Project::from_json(TUTORIAL).unwrap();
    assert_eq!(p.fps, 30.0);
    assert_eq!((p.video_width, p.video_height), (1280, 720));
    assert_eq!(p.total_frames, 600);
    assert_eq!(p.overlays.len(), 5);
    assert_eq!(p.tracked_objects.len(), 1);
    assert_eq!(p.post.len(), 1);

    let caption = &p.overlays[0];
    assert_eq!(caption.id, "intro-caption");
    assert_eq!(caption.style.font_size, Some(32.0));

    match &p.overlays[1].kind {
        OverlayKind::Arrow(g) => {
            assert_eq!(g.start_point.x, 200.0);
            assert!(g.control_point.is_some());
        }
        other => panic!("expected arrow, got {other:?}"),
    }

    let tracked = &p.overlays[4];
    assert_eq!(tracked.track_id.as_deref(), Some("track-1"));
    assert!(!tracked.interactive);
    assert_eq!(tracked.track_offset.unwrap().x, -4.0);
}

#[test]
fn export_reimports_identically() {
    let p = Project::from_json(TUTORIAL).unwrap();
    let json = p.to_json().unwrap();
    let back = Project::from_json(&json).unwrap();
    assert_eq!(back, p);
}

#[test]
fn engine_normalizes_missing_ids_and_windows_on_import() {
    let p = Project::from_json(TUTORIAL).unwrap();
    let e = Engine::from_project(&p).unwrap();
    let exported = e.to_project();

    // every overlay now has an id and a concrete activation window
    for o in &exported.overlays {
        assert!(!o.id.is_empty());
        assert!(o.span().is_some());
    }
    // explicit ids survive untouched
    assert!(exported.overlays.iter().any(|o| o.id == "intro-caption"));

    // a normalized document reimports to the same engine state
    let again = Engine::from_project(&exported).unwrap().to_project();
    assert_eq!(again, exported);
}

#[test]
fn imported_scene_renders_expected_frames() {
    let p = Project::from_json(TUTORIAL).unwrap();
    let mut e = Engine::from_project(&p).unwrap();

    // frame 150: arrow's last frame, caption gone, tracked rect active
    e.seek(FrameIndex(150));
    let plan = e.render(0, &HeuristicMeasure);
    assert_eq!(plan.passes.len(), 3); // arrow + qte + tracked rect
    assert_eq!(plan.areas.len(), 1); // only the qte registers
    assert_eq!(plan.post.len(), 1);

    // frame 150 is inside the QTE window
    assert!(e.key_press("x").is_some());

    // frame 400: only the tracked rect remains
    e.seek(FrameIndex(400));
    let plan = e.render(0, &HeuristicMeasure);
    assert_eq!(plan.passes.len(), 1);
    assert!(plan.areas.is_empty());
}

#[test]
fn unknown_overlay_type_fails_at_import_with_a_serde_error() {
    let doc = r#"{
        "fps": 30, "videoWidth": 640, "videoHeight": 480, "totalFrames": 10,
        "overlays": [{ "type": "sparkles", "frameStart": 0, "frameEnd": 5 }]
    }"#;
    assert!(matches!(
        Project::from_json(doc),
        Err(VeneerError::Serde(_))
    ));
}

#[test]
fn duplicate_track_ids_fail_validation() {
    let doc = r#"{
        "fps": 30, "videoWidth": 640, "videoHeight": 480, "totalFrames": 10,
        "trackedObjects": [
            { "id": "t", "startFrame": 0, "endFrame": 5, "keyframes": [] },
            { "id": "t", "startFrame": 0, "endFrame": 5, "keyframes": [] }
        ]
    }"#;
    assert!(matches!(
        Project::from_json(doc),
        Err(VeneerError::Content(_))
    ));
}

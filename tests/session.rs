//! End-to-end session scenarios: load, tick at a camera distance, interact,
//! read the render snapshot.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use concept_scene::{
    ConceptRecord, EngineConfig, Focus, FocusTarget, GraphPayload, RelationshipRecord, SceneEvent,
    SceneSession, SelectionRef,
};
use pretty_assertions::assert_eq;

const FRAME: f32 = 1.0 / 60.0;

fn settle(session: &mut SceneSession, distance: f32) {
    for _ in 0..90 {
        session.tick(FRAME, distance);
    }
}

fn abc_payload() -> GraphPayload {
    GraphPayload::new(
        vec![
            ConceptRecord::new("A", "Alpha").with_depth(0),
            ConceptRecord::new("B", "Beta").with_depth(1),
            ConceptRecord::new("C", "Gamma").with_depth(2),
        ],
        vec![
            RelationshipRecord::new("A-B", "A", "B"),
            RelationshipRecord::new("B-C", "B", "C"),
        ],
    )
}

// ============================================================================
// Hierarchy tiers, frontier and camera distance together
// ============================================================================

#[test]
fn abc_scenario() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    assert_eq!(session.revealed_ids(), vec!["A"]);

    session.expand("A");
    assert_eq!(session.revealed_ids(), vec!["A", "B"]);

    // Beyond T1 only the core concept renders.
    settle(&mut session, 100.0);
    let far = session.render_graph();
    assert_eq!(far.node_ids(), vec!["A"]);
    assert!(far.edges.is_empty());

    // Inside T1: A, B and A-B. C is not revealed yet.
    settle(&mut session, 40.0);
    let near = session.render_graph();
    assert_eq!(near.node_ids(), vec!["A", "B"]);
    assert_eq!(near.edge_ids(), vec!["A-B"]);

    // Even at close range C needs an explicit expansion of B.
    settle(&mut session, 5.0);
    assert_eq!(session.render_graph().node_ids(), vec!["A", "B"]);

    session.expand("B");
    settle(&mut session, 5.0);
    let closest = session.render_graph();
    assert_eq!(closest.node_ids(), vec!["A", "B", "C"]);
    assert_eq!(closest.edge_ids(), vec!["A-B", "B-C"]);
}

#[test]
fn dangling_relationship_is_excluded() {
    let payload = GraphPayload::new(
        vec![ConceptRecord::new("A", "Alpha").with_depth(0), ConceptRecord::new("B", "Beta").with_depth(0)],
        vec![
            RelationshipRecord::new("A-B", "A", "B"),
            RelationshipRecord::new("A-X", "A", "X"),
        ],
    );
    let mut session = SceneSession::with_payload(EngineConfig::default(), payload);
    settle(&mut session, 10.0);

    let snapshot = session.render_graph();
    assert_eq!(snapshot.edge_ids(), vec!["A-B"]);
    assert_eq!(session.diagnostics().dangling_relationships, 1);
    assert!(session.graph().edge_index_of("A-X").is_none());
}

#[test]
fn empty_payload_renders_empty_scene() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), GraphPayload::default());
    settle(&mut session, 10.0);

    assert!(session.render_graph().is_empty());
    assert!(session.frontier().is_empty());
}

#[test]
fn invalid_camera_distance_means_core_only() {
    for distance in [f32::NAN, -5.0, f32::INFINITY] {
        let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
        session.expand("A");
        session.expand("B");
        settle(&mut session, distance);
        assert_eq!(session.render_graph().node_ids(), vec!["A"], "distance {distance}");
    }
}

#[test]
fn zooming_out_fades_before_removing() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    session.expand("A");
    settle(&mut session, 40.0);

    session.tick(FRAME, 100.0);
    let fading = session.render_graph();
    let beta = fading.node("B").expect("still fading out");
    assert!(beta.opacity > 0.0 && beta.opacity < 1.0);

    settle(&mut session, 100.0);
    assert_eq!(session.render_graph().node_ids(), vec!["A"]);
}

#[test]
fn invalid_thresholds_fall_back_to_defaults() {
    let mut config = EngineConfig::default();
    config.lod.thresholds = [5.0, 50.0, 500.0];
    let mut session = SceneSession::with_payload(config, abc_payload());
    assert_eq!(session.config().lod, concept_scene::LodConfig::default());

    session.expand("A");
    session.expand("B");
    settle(&mut session, 100.0);
    assert_eq!(session.render_graph().node_ids(), vec!["A"]);
}

#[test]
fn zero_length_tick_moves_nothing() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    session.expand("A");
    session.tick(FRAME, 40.0);
    assert!(session.begin_drag("B"));
    assert!(session.drag_to(glam::Vec3::new(30.0, 0.0, 0.0)));
    assert!(session.end_drag());

    let positions = session.positions().to_vec();
    let opacity = session.opacity().as_slice().to_vec();
    assert!(opacity.iter().any(|&value| value > 0.0 && value < 1.0));

    for _ in 0..10 {
        assert!(session.tick(0.0, 40.0));
    }
    assert_eq!(session.positions(), positions.as_slice());
    assert_eq!(session.opacity().as_slice(), opacity.as_slice());

    session.tick(FRAME, 40.0);
    assert_ne!(session.opacity().as_slice(), opacity.as_slice());
}

// ============================================================================
// Selection, hover and notifications
// ============================================================================

#[test]
fn selection_kinds_are_exclusive() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());

    assert!(session.select_edge("A-B"));
    assert_eq!(session.selection(), Some(SelectionRef::Edge("A-B".to_owned())));

    assert!(session.select_node("A"));
    assert_eq!(session.selection(), Some(SelectionRef::Node("A".to_owned())));
    assert!(!session.highlight().is_edge_selected(0));

    assert!(session.select("B-C"));
    assert_eq!(session.selection(), Some(SelectionRef::Edge("B-C".to_owned())));
    assert!(!session.highlight().is_selected(0));
}

#[test]
fn hover_takes_precedence_without_replacing_selection() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    session.select_node("A");
    session.hover(Some("C"));

    let c = session.graph().index_of("C").expect("present");
    assert_eq!(session.focus(), Focus::Hover(FocusTarget::Node(c)));
    assert_eq!(session.selection(), Some(SelectionRef::Node("A".to_owned())));

    session.hover(None);
    let a = session.graph().index_of("A").expect("present");
    assert_eq!(session.focus(), Focus::Selection(FocusTarget::Node(a)));
}

#[test]
fn selecting_hidden_concept_leaves_frontier_alone() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    assert!(session.select_node("C"));
    assert_eq!(session.revealed_ids(), vec!["A"]);
    assert_eq!(session.selection(), Some(SelectionRef::Node("C".to_owned())));

    settle(&mut session, 5.0);
    let snapshot = session.render_graph();
    assert_eq!(snapshot.node_ids(), vec!["A"]);
    assert!(snapshot.node("C").is_none());

    // Only an explicit expansion brings it in.
    session.expand("B");
    settle(&mut session, 5.0);
    let c = session.render_graph().node("C").cloned().expect("revealed by expansion");
    assert!(c.is_selected);
}

#[test]
fn notifications_follow_interactions() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    session.select_node("B");
    session.select_node("B");
    session.expand("B");
    session.expand("B");
    session.clear_selection();

    let events = session.drain_events().collect::<Vec<_>>();
    assert_eq!(
        events,
        vec![
            SceneEvent::GraphLoaded {
                concepts: 3,
                relationships: 2,
                dropped: 0,
            },
            SceneEvent::SelectionChanged(Some(SelectionRef::Node("B".to_owned()))),
            SceneEvent::Expanded {
                node: "B".to_owned(),
                revealed: vec!["B".to_owned(), "C".to_owned()],
            },
            SceneEvent::SelectionChanged(None),
        ]
    );
    assert_eq!(session.drain_events().count(), 0);
}

#[test]
fn search_matches_highlight_only_without_focus() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    session.expand("A");
    session.expand("B");
    assert_eq!(session.set_search("gamma"), 1);
    settle(&mut session, 5.0);

    let unfocused = session.render_graph();
    assert!(unfocused.node("C").expect("visible").is_highlighted);
    assert!(!unfocused.node("A").expect("visible").is_highlighted);

    session.select_edge("A-B");
    let focused = session.render_graph();
    assert!(!focused.node("C").expect("visible").is_highlighted);
    assert!(focused.node("A").expect("visible").is_highlighted);
    assert!(focused.node("B").expect("visible").is_highlighted);
}

// ============================================================================
// Loads
// ============================================================================

#[test]
fn newer_load_wins_over_stale_one() {
    let mut session = SceneSession::new(EngineConfig::default());
    let (release_tx, release_rx) = mpsc::channel::<()>();

    session.request_load(move || {
        let _ = release_rx.recv();
        Ok(GraphPayload::new(vec![ConceptRecord::new("stale", "Stale")], Vec::new()))
    });
    session.request_load(|| Ok(abc_payload()));

    for _ in 0..500 {
        session.tick(FRAME, 10.0);
        if !session.is_loading() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    assert!(session.graph().index_of("A").is_some());

    let _ = release_tx.send(());
    thread::sleep(Duration::from_millis(20));
    settle(&mut session, 10.0);

    assert!(session.graph().index_of("stale").is_none());
    assert_eq!(session.graph().node_count(), 3);
}

#[test]
fn failed_load_keeps_current_graph() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    session.drain_events().for_each(drop);
    session.request_load(|| Err(anyhow::anyhow!("backend unavailable")));

    for _ in 0..500 {
        session.tick(FRAME, 10.0);
        if !session.is_loading() {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }

    assert_eq!(session.graph().node_count(), 3);
    let events = session.drain_events().collect::<Vec<_>>();
    assert_eq!(events, vec![SceneEvent::LoadFailed("backend unavailable".to_owned())]);
}

#[test]
fn reload_resets_session_state() {
    let mut session = SceneSession::with_payload(EngineConfig::default(), abc_payload());
    session.expand("A");
    session.select_node("B");
    settle(&mut session, 40.0);

    session.load_payload(abc_payload());

    assert_eq!(session.revealed_ids(), vec!["A"]);
    assert_eq!(session.selection(), None);
    assert_eq!(session.focus(), Focus::None);
    assert!(session.opacity().as_slice().iter().all(|&value| value == 0.0));
}

// ============================================================================
// Drag and presentation rotation
// ============================================================================

#[test]
fn drag_snap_back_restores_position() {
    let config = EngineConfig {
        drag_release: concept_scene::DragRelease::SnapBack,
        ..EngineConfig::default()
    };
    let mut session = SceneSession::with_payload(config, abc_payload());
    let assigned = session.position_of("B").expect("present");

    assert!(session.begin_drag("B"));
    assert!(session.drag_to(glam::Vec3::new(40.0, 0.0, 0.0)));
    settle(&mut session, 10.0);
    assert_eq!(session.position_of("B"), Some(glam::Vec3::new(40.0, 0.0, 0.0)));

    assert!(session.end_drag());
    assert_eq!(session.position_of("B"), Some(assigned));

    // The rest of the graph is still settling; B must not be pulled off.
    for _ in 0..60 {
        session.tick(FRAME, 10.0);
    }
    assert_eq!(session.position_of("B"), Some(assigned));
}

#[test]
fn auto_rotation_never_touches_stored_positions() {
    let mut config = EngineConfig::default();
    config.auto_rotate.enabled = true;
    config.auto_rotate.radians_per_second = 1.0;
    let mut session = SceneSession::with_payload(config, abc_payload());
    let stored = session.positions().to_vec();

    settle(&mut session, 10.0);

    assert_eq!(session.positions(), stored.as_slice());
    assert!(session.rotation() > 0.0);
    let a = session.graph().index_of("A").expect("present");
    let rendered = session.render_graph().node("A").expect("core").position;
    let expected = glam::Quat::from_rotation_y(session.rotation()) * stored[a];
    assert!((rendered - expected).length() < 1e-4);
}

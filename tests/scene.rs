//! Composer behavior on hand-built inputs.

use concept_scene::{
    ConceptGraph, ConceptRecord, FocusState, Frontier, GraphPayload, HighlightState, LodConfig,
    OpacityState, RelationshipRecord, RelationshipType, RenderGraph, SceneInputs, SearchMatches,
    VisibilityFrame, compose,
};
use glam::Vec3;
use pretty_assertions::assert_eq;

struct Fixture {
    graph: ConceptGraph,
    positions: Vec<Vec3>,
    frontier: Frontier,
    opacity: OpacityState,
}

impl Fixture {
    fn new() -> Self {
        let graph = ConceptGraph::from_payload(GraphPayload::new(
            vec![
                ConceptRecord::new("sun", "Sun").with_depth(0).with_priority(1),
                ConceptRecord::new("earth", "Earth").with_depth(1),
                ConceptRecord::new("moon", "Moon").with_depth(2).with_priority(3),
            ],
            vec![
                RelationshipRecord::new("pull", "sun", "earth"),
                RelationshipRecord::new("orbit", "moon", "earth").with_type(RelationshipType::Inverse),
            ],
        ))
        .0;
        let positions = vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(12.0, 1.0, 0.0)];
        let mut frontier = Frontier::seeded(&graph);
        for index in 0..graph.node_count() {
            frontier.reveal(index);
        }
        let mut opacity = OpacityState::new(graph.node_count());
        let config = LodConfig::default();
        while opacity.step(&[1.0, 1.0, 1.0], &config, 1.0) {}

        Self {
            graph,
            positions,
            frontier,
            opacity,
        }
    }

    fn compose(&self, distance: f32, focus: &FocusState, search: Option<&SearchMatches>, rotation: f32) -> RenderGraph {
        let highlight = HighlightState::build(&self.graph, focus);
        compose(&SceneInputs {
            graph: &self.graph,
            positions: &self.positions,
            frontier: &self.frontier,
            visibility: VisibilityFrame::new(&LodConfig::default(), distance),
            highlight: &highlight,
            opacity: &self.opacity,
            search,
            rotation,
            fade_epsilon: LodConfig::default().fade_epsilon,
        })
    }
}

#[test]
fn renders_everything_revealed_and_visible() {
    let fixture = Fixture::new();
    let snapshot = fixture.compose(5.0, &FocusState::default(), None, 0.0);

    assert_eq!(snapshot.node_ids(), vec!["sun", "earth", "moon"]);
    assert_eq!(snapshot.edge_ids(), vec!["pull", "orbit"]);
    let orbit = snapshot.edge("orbit").expect("rendered");
    assert_eq!(orbit.source_id, "moon");
    assert_eq!(orbit.target_id, "earth");
    assert!(snapshot.node("sun").expect("rendered").radius > snapshot.node("moon").expect("rendered").radius);
}

#[test]
fn hidden_endpoint_drops_edge() {
    let fixture = Fixture::new();
    let mut opacity = fixture.opacity.clone();
    // Moon already faded out at this distance.
    while opacity.step(&[1.0, 1.0, 0.0], &LodConfig::default(), 1.0) {}
    let highlight = HighlightState::default();
    let snapshot = compose(&SceneInputs {
        graph: &fixture.graph,
        positions: &fixture.positions,
        frontier: &fixture.frontier,
        visibility: VisibilityFrame::new(&LodConfig::default(), 40.0),
        highlight: &highlight,
        opacity: &opacity,
        search: None,
        rotation: 0.0,
        fade_epsilon: 0.01,
    });

    assert_eq!(snapshot.node_ids(), vec!["sun", "earth"]);
    assert_eq!(snapshot.edge_ids(), vec!["pull"]);
}

#[test]
fn selection_spotlights_incident_edges() {
    let fixture = Fixture::new();
    let mut focus = FocusState::default();
    focus.select_node(fixture.graph.index_of("sun").expect("present"));
    let snapshot = fixture.compose(5.0, &focus, None, 0.0);

    let pull = snapshot.edge("pull").expect("rendered");
    let orbit = snapshot.edge("orbit").expect("rendered");
    assert!(pull.width > orbit.width);
    assert!(pull.opacity > orbit.opacity);
    assert!(snapshot.node("sun").expect("rendered").is_selected);
    assert!(snapshot.node("earth").expect("rendered").is_highlighted);
    assert!(!snapshot.node("moon").expect("rendered").is_highlighted);
}

#[test]
fn rotation_is_applied_to_output_only() {
    let fixture = Fixture::new();
    let snapshot = fixture.compose(5.0, &FocusState::default(), None, std::f32::consts::FRAC_PI_2);

    let earth = snapshot.node("earth").expect("rendered").position;
    assert!((earth - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4, "{earth:?}");
    assert_eq!(fixture.positions[1], Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn search_highlights_when_unfocused() {
    let fixture = Fixture::new();
    let matches = SearchMatches::build(&fixture.graph, "moo");
    let snapshot = fixture.compose(5.0, &FocusState::default(), matches.as_ref(), 0.0);

    assert!(snapshot.node("moon").expect("rendered").is_highlighted);
    assert!(!snapshot.node("sun").expect("rendered").is_highlighted);
}

#[test]
fn snapshot_serializes_for_the_renderer() {
    let fixture = Fixture::new();
    let snapshot = fixture.compose(5.0, &FocusState::default(), None, 0.0);
    let json = serde_json::to_value(&snapshot).expect("serializable");

    assert_eq!(json["nodes"][1]["position"], serde_json::json!([10.0, 0.0, 0.0]));
    assert_eq!(json["nodes"][0]["isHighlighted"], serde_json::json!(false));
    assert_eq!(json["edges"][1]["sourceId"], serde_json::json!("moon"));
    assert_eq!(json["edges"][1]["color"].as_array().map(Vec::len), Some(4));
}

//! Session state tying the engine together.
//!
//! A [`SceneSession`] owns one loaded graph with its layout, frontier, focus
//! and fade state. The host feeds it frame ticks with the current camera
//! distance plus discrete interaction events, and reads back a
//! [`RenderGraph`] and a queue of [`SceneEvent`] notifications.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::frontier::Frontier;
use crate::graph::{ConceptGraph, GraphDiagnostics, GraphPayload};
use crate::highlight::{Focus, FocusState, FocusTarget, HighlightState};
use crate::layout::LiveLayout;
use crate::loader::{GraphLoader, LoadOutcome, LoadTicket};
use crate::lod::{OpacityState, VisibilityFrame};
use crate::scene::{RenderGraph, SceneInputs, compose};
use crate::search::SearchMatches;

/// A committed selection by id, as reported to the detail panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionRef {
    Node(String),
    Edge(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    GraphLoaded {
        concepts: usize,
        relationships: usize,
        /// Concepts and relationships dropped while repairing the payload.
        dropped: usize,
    },
    LoadFailed(String),
    SelectionChanged(Option<SelectionRef>),
    Expanded {
        node: String,
        revealed: Vec<String>,
    },
}

#[derive(Debug)]
pub struct SceneSession {
    config: EngineConfig,
    graph: ConceptGraph,
    diagnostics: GraphDiagnostics,
    layout: LiveLayout,
    frontier: Frontier,
    focus: FocusState,
    highlight: HighlightState,
    visibility: VisibilityFrame,
    opacity: OpacityState,
    opacity_targets: Vec<f32>,
    search: Option<SearchMatches>,
    rotation: f32,
    loader: GraphLoader,
    events: VecDeque<SceneEvent>,
}

impl SceneSession {
    /// Session with an empty graph. Config sections that fail validation
    /// fall back to their defaults.
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        let visibility = VisibilityFrame::new(&config.lod, f32::MAX);
        Self {
            config,
            graph: ConceptGraph::empty(),
            diagnostics: GraphDiagnostics::default(),
            layout: LiveLayout::default(),
            frontier: Frontier::default(),
            focus: FocusState::default(),
            highlight: HighlightState::default(),
            visibility,
            opacity: OpacityState::default(),
            opacity_targets: Vec::new(),
            search: None,
            rotation: 0.0,
            loader: GraphLoader::new(),
            events: VecDeque::new(),
        }
    }

    pub fn with_payload(config: EngineConfig, payload: GraphPayload) -> Self {
        let mut session = Self::new(config);
        session.load_payload(payload);
        session
    }

    /// Replaces the graph right away. Any fetch still in flight is
    /// superseded and its result will be dropped.
    pub fn load_payload(&mut self, payload: GraphPayload) {
        self.loader.supersede();
        self.apply_payload(payload);
    }

    /// Starts an off-thread fetch. The newest request wins; its result is
    /// applied on the first [`tick`](Self::tick) after it arrives.
    pub fn request_load<F>(&mut self, fetch: F) -> LoadTicket
    where
        F: FnOnce() -> anyhow::Result<GraphPayload> + Send + 'static,
    {
        self.loader.request(fetch)
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    fn apply_payload(&mut self, payload: GraphPayload) {
        let (graph, diagnostics) = ConceptGraph::from_payload(payload);
        let layout = LiveLayout::compute(&graph, &self.config.layout);
        let node_count = graph.node_count();

        self.frontier = Frontier::seeded(&graph);
        self.focus = FocusState::default();
        self.highlight = HighlightState::default();
        self.visibility = VisibilityFrame::new(&self.config.lod, f32::MAX);
        self.opacity = OpacityState::new(node_count);
        self.opacity_targets = vec![0.0; node_count];
        self.search = None;
        self.rotation = 0.0;
        self.layout = layout;
        self.graph = graph;
        self.diagnostics = diagnostics;

        info!(
            concepts = node_count,
            relationships = self.graph.edge_count(),
            revealed = self.frontier.len(),
            "graph loaded"
        );
        self.events.push_back(SceneEvent::GraphLoaded {
            concepts: node_count,
            relationships: self.graph.edge_count(),
            dropped: diagnostics.dropped(),
        });
    }

    /// Advances one frame: applies a finished load, re-evaluates visibility
    /// for `camera_distance`, steps physics and fades. Returns whether
    /// anything is still moving.
    pub fn tick(&mut self, dt: f32, camera_distance: f32) -> bool {
        if let Some(outcome) = self.loader.poll() {
            match outcome {
                LoadOutcome::Loaded { payload, .. } => self.apply_payload(payload),
                LoadOutcome::Failed { ticket, message } => {
                    warn!(generation = ticket.generation(), error = %message, "graph load failed");
                    self.events.push_back(SceneEvent::LoadFailed(message));
                }
            }
        }

        self.visibility = VisibilityFrame::new(&self.config.lod, camera_distance);

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if dt == 0.0 {
            return self.layout.is_animating() || self.opacity_pending() || self.is_loading();
        }
        let time_scale = (dt * 60.0).clamp(0.25, 3.0);
        let moving = self.layout.tick(time_scale);

        let mut targets = std::mem::take(&mut self.opacity_targets);
        for (index, target) in targets.iter_mut().enumerate() {
            *target = self.opacity_target(index);
        }
        let fading = self.opacity.step(&targets, &self.config.lod, time_scale);
        self.opacity_targets = targets;

        let rotating = self.advance_rotation(dt);
        moving || fading || rotating || self.is_loading()
    }

    fn opacity_target(&self, index: usize) -> f32 {
        match self.graph.concept(index) {
            Some(concept) if self.frontier.contains(index) => {
                self.visibility.target_opacity(concept.depth_level)
            }
            _ => 0.0,
        }
    }

    /// Whether some concept's opacity has not reached its current target.
    fn opacity_pending(&self) -> bool {
        let epsilon = self.config.lod.fade_epsilon;
        (0..self.graph.node_count())
            .any(|index| (self.opacity.get(index) - self.opacity_target(index)).abs() > epsilon)
    }

    fn advance_rotation(&mut self, dt: f32) -> bool {
        let auto_rotate = self.config.auto_rotate;
        if !auto_rotate.enabled {
            return false;
        }
        if auto_rotate.pause_while_focused && self.highlight.focus() != Focus::None {
            return false;
        }
        self.rotation = (self.rotation + auto_rotate.radians_per_second * dt).rem_euclid(TAU);
        true
    }

    /// Selects a concept if `id` names one, otherwise a relationship.
    pub fn select(&mut self, id: &str) -> bool {
        if self.graph.index_of(id).is_some() {
            self.select_node(id)
        } else {
            self.select_edge(id)
        }
    }

    /// Commits a concept selection, clearing any selected relationship. The
    /// frontier is left as is; only [`expand`](Self::expand) grows it.
    pub fn select_node(&mut self, id: &str) -> bool {
        let Some(index) = self.graph.index_of(id) else {
            debug!(concept = id, "ignoring selection of unknown concept");
            return false;
        };
        if self.focus.select_node(index) {
            self.refresh_highlight();
            self.events
                .push_back(SceneEvent::SelectionChanged(Some(SelectionRef::Node(id.to_owned()))));
        }
        true
    }

    /// Commits a relationship selection, clearing any selected concept.
    pub fn select_edge(&mut self, id: &str) -> bool {
        let Some(index) = self.graph.edge_index_of(id) else {
            debug!(relationship = id, "ignoring selection of unknown relationship");
            return false;
        };
        if self.focus.select_edge(index) {
            self.refresh_highlight();
            self.events
                .push_back(SceneEvent::SelectionChanged(Some(SelectionRef::Edge(id.to_owned()))));
        }
        true
    }

    pub fn clear_selection(&mut self) {
        if self.focus.clear_selection() {
            self.refresh_highlight();
            self.events.push_back(SceneEvent::SelectionChanged(None));
        }
    }

    /// Sets or clears the hovered concept. Unknown ids clear the hover.
    pub fn hover(&mut self, id: Option<&str>) {
        let index = id.and_then(|id| self.graph.index_of(id));
        if self.focus.set_hover(index) {
            self.refresh_highlight();
        }
    }

    /// Reveals `id` and all of its neighbors. Returns the ids that were not
    /// revealed before; a repeated call returns nothing.
    pub fn expand(&mut self, id: &str) -> Vec<String> {
        let Some(index) = self.graph.index_of(id) else {
            debug!(concept = id, "ignoring expansion of unknown concept");
            return Vec::new();
        };

        let revealed = self
            .frontier
            .expand(&self.graph, index)
            .into_iter()
            .filter_map(|index| self.graph.concept(index))
            .map(|concept| concept.id.clone())
            .collect::<Vec<_>>();

        if !revealed.is_empty() {
            debug!(concept = id, revealed = revealed.len(), "frontier expanded");
            self.events.push_back(SceneEvent::Expanded {
                node: id.to_owned(),
                revealed: revealed.clone(),
            });
        }
        revealed
    }

    /// Fuzzy label search. Matches render highlighted while nothing is
    /// focused. A blank query clears it.
    pub fn set_search(&mut self, query: &str) -> usize {
        self.search = SearchMatches::build(&self.graph, query);
        self.search.as_ref().map_or(0, SearchMatches::len)
    }

    pub fn begin_drag(&mut self, id: &str) -> bool {
        let Some(index) = self.graph.index_of(id) else {
            return false;
        };
        self.layout.begin_drag(index, self.config.drag_release)
    }

    /// Moves the dragged concept to `position`, given in layout space.
    pub fn drag_to(&mut self, position: Vec3) -> bool {
        self.layout.drag_to(position)
    }

    pub fn end_drag(&mut self) -> bool {
        self.layout.end_drag(self.config.drag_release).is_some()
    }

    fn refresh_highlight(&mut self) {
        self.highlight = HighlightState::build(&self.graph, &self.focus);
    }

    /// Snapshot for the renderer. Read-only; safe to call every frame.
    pub fn render_graph(&self) -> RenderGraph {
        compose(&SceneInputs {
            graph: &self.graph,
            positions: self.layout.positions(),
            frontier: &self.frontier,
            visibility: self.visibility,
            highlight: &self.highlight,
            opacity: &self.opacity,
            search: self.search.as_ref(),
            rotation: self.rotation,
            fade_epsilon: self.config.lod.fade_epsilon,
        })
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = SceneEvent> + '_ {
        self.events.drain(..)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &ConceptGraph {
        &self.graph
    }

    pub fn diagnostics(&self) -> GraphDiagnostics {
        self.diagnostics
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Revealed concept ids in graph order.
    pub fn revealed_ids(&self) -> Vec<&str> {
        self.frontier
            .iter()
            .filter_map(|index| self.graph.concept(index))
            .map(|concept| concept.id.as_str())
            .collect()
    }

    pub fn focus(&self) -> Focus {
        self.focus.active()
    }

    pub fn selection(&self) -> Option<SelectionRef> {
        match self.focus.selection()? {
            FocusTarget::Node(index) => self
                .graph
                .concept(index)
                .map(|concept| SelectionRef::Node(concept.id.clone())),
            FocusTarget::Edge(index) => self
                .graph
                .relationship(index)
                .map(|relationship| SelectionRef::Edge(relationship.id.clone())),
        }
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn visibility(&self) -> VisibilityFrame {
        self.visibility
    }

    pub fn opacity(&self) -> &OpacityState {
        &self.opacity
    }

    /// Current layout-space positions, without presentation rotation.
    pub fn positions(&self) -> &[Vec3] {
        self.layout.positions()
    }

    pub fn position_of(&self, id: &str) -> Option<Vec3> {
        let index = self.graph.index_of(id)?;
        self.layout.positions().get(index).copied()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }
}

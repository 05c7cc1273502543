//! Render-ready snapshot of the scene.
//!
//! [`compose`] is a pure function of the layout, visibility, frontier,
//! highlight and opacity state. It never mutates its inputs and can run every
//! frame.

mod style;

use glam::{Quat, Vec3};
use serde::Serialize;

use crate::frontier::Frontier;
use crate::graph::ConceptGraph;
use crate::highlight::{Focus, HighlightState};
use crate::layout::node_radius;
use crate::lod::{OpacityState, VisibilityFrame};
use crate::search::SearchMatches;

pub use style::Rgba;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub position: Vec3,
    pub radius: f32,
    pub opacity: f32,
    pub is_highlighted: bool,
    pub is_selected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub opacity: f32,
    pub width: f32,
    pub color: Rgba,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&RenderEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.id.as_str()).collect()
    }

    pub fn edge_ids(&self) -> Vec<&str> {
        self.edges.iter().map(|edge| edge.id.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Everything [`compose`] reads. `positions` is index-aligned with the
/// graph's concepts.
#[derive(Clone, Copy, Debug)]
pub struct SceneInputs<'a> {
    pub graph: &'a ConceptGraph,
    pub positions: &'a [Vec3],
    pub frontier: &'a Frontier,
    pub visibility: VisibilityFrame,
    pub highlight: &'a HighlightState,
    pub opacity: &'a OpacityState,
    pub search: Option<&'a SearchMatches>,
    /// Presentation-time rotation about the vertical axis, in radians.
    pub rotation: f32,
    /// Concepts fading out keep rendering while above this opacity.
    pub fade_epsilon: f32,
}

/// A concept renders when it is revealed and either visible at this camera
/// distance or still fading out. A relationship renders when both of its
/// concepts render.
pub fn compose(inputs: &SceneInputs<'_>) -> RenderGraph {
    let graph = inputs.graph;
    let rotation = if inputs.rotation.is_finite() && inputs.rotation != 0.0 {
        Some(Quat::from_rotation_y(inputs.rotation))
    } else {
        None
    };
    // Search matches stand in for a focus while nothing is focused.
    let pseudo_matches = match inputs.highlight.focus() {
        Focus::None => inputs.search,
        _ => None,
    };

    let mut rendered = vec![false; graph.node_count()];
    let mut nodes = Vec::new();
    for (index, concept) in graph.concepts().iter().enumerate() {
        if !inputs.frontier.contains(index) {
            continue;
        }
        let opacity = inputs.opacity.get(index);
        if !inputs.visibility.shows(concept.depth_level) && opacity <= inputs.fade_epsilon {
            continue;
        }
        let Some(&position) = inputs.positions.get(index) else {
            continue;
        };
        if !position.is_finite() {
            continue;
        }

        rendered[index] = true;
        let is_highlighted = inputs.highlight.is_highlighted(index)
            || pseudo_matches.is_some_and(|matches| matches.contains(index));
        nodes.push(RenderNode {
            id: concept.id.clone(),
            label: concept.label.clone(),
            position: rotation.map_or(position, |rotation| rotation * position),
            radius: node_radius(concept),
            opacity,
            is_highlighted,
            is_selected: inputs.highlight.is_selected(index),
        });
    }

    let mut edges = Vec::new();
    for (index, relationship) in graph.relationships().iter().enumerate() {
        let Some(&(source, target)) = graph.endpoints().get(index) else {
            continue;
        };
        let both_rendered = rendered.get(source).copied().unwrap_or(false)
            && rendered.get(target).copied().unwrap_or(false);
        if !both_rendered {
            continue;
        }

        let emphasis = inputs.highlight.edge_emphasis(index);
        let opacity = inputs.opacity.get(source).min(inputs.opacity.get(target))
            * emphasis.opacity_factor();
        edges.push(RenderEdge {
            id: relationship.id.clone(),
            source_id: relationship.source.clone(),
            target_id: relationship.target.clone(),
            opacity,
            width: emphasis.width(),
            color: style::edge_color(relationship.relationship_type, emphasis, opacity),
        });
    }

    RenderGraph { nodes, edges }
}

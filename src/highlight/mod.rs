//! Selection and hover focus, and the emphasis derived from it.
//!
//! There is at most one committed selection, a concept or a relationship,
//! and independently at most one hovered concept. Hover wins for emphasis
//! but never replaces the selection.

use std::collections::HashSet;

use crate::graph::ConceptGraph;

mod collect;

use self::collect::{collect_focus_edges, collect_focus_nodes};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    Node(usize),
    Edge(usize),
}

/// The focus that drives emphasis this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    None,
    Hover(FocusTarget),
    Selection(FocusTarget),
}

impl Focus {
    pub fn target(self) -> Option<FocusTarget> {
        match self {
            Self::None => None,
            Self::Hover(target) | Self::Selection(target) => Some(target),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FocusState {
    selection: Option<FocusTarget>,
    hover: Option<usize>,
}

impl FocusState {
    /// Replaces any selection, including a selected relationship. Returns
    /// whether the selection changed.
    pub fn select_node(&mut self, index: usize) -> bool {
        self.replace_selection(Some(FocusTarget::Node(index)))
    }

    /// Replaces any selection, including a selected concept.
    pub fn select_edge(&mut self, index: usize) -> bool {
        self.replace_selection(Some(FocusTarget::Edge(index)))
    }

    pub fn clear_selection(&mut self) -> bool {
        self.replace_selection(None)
    }

    fn replace_selection(&mut self, selection: Option<FocusTarget>) -> bool {
        let changed = self.selection != selection;
        self.selection = selection;
        changed
    }

    pub fn set_hover(&mut self, hover: Option<usize>) -> bool {
        let changed = self.hover != hover;
        self.hover = hover;
        changed
    }

    pub fn selection(&self) -> Option<FocusTarget> {
        self.selection
    }

    pub fn selected_node(&self) -> Option<usize> {
        match self.selection {
            Some(FocusTarget::Node(index)) => Some(index),
            _ => None,
        }
    }

    pub fn selected_edge(&self) -> Option<usize> {
        match self.selection {
            Some(FocusTarget::Edge(index)) => Some(index),
            _ => None,
        }
    }

    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    pub fn active(&self) -> Focus {
        match (self.hover, self.selection) {
            (Some(index), _) => Focus::Hover(FocusTarget::Node(index)),
            (None, Some(target)) => Focus::Selection(target),
            (None, None) => Focus::None,
        }
    }
}

/// How a relationship is drawn relative to the active focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEmphasis {
    /// Nothing is focused.
    Ambient,
    /// Touches the focus.
    Spotlit,
    /// Something else is focused.
    Dimmed,
}

impl EdgeEmphasis {
    pub fn opacity_factor(self) -> f32 {
        match self {
            Self::Ambient => 0.45,
            Self::Spotlit => 1.0,
            Self::Dimmed => 0.12,
        }
    }

    pub fn width(self) -> f32 {
        match self {
            Self::Ambient => 1.0,
            Self::Spotlit => 2.6,
            Self::Dimmed => 0.6,
        }
    }
}

/// Highlight sets for the current focus, rebuilt from scratch on every
/// focus change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightState {
    focus: Focus,
    selection: Option<FocusTarget>,
    related_nodes: HashSet<usize>,
    related_edges: HashSet<usize>,
}

impl HighlightState {
    pub fn build(graph: &ConceptGraph, focus_state: &FocusState) -> Self {
        let focus = focus_state.active();
        let mut related_nodes = HashSet::new();
        let mut related_edges = HashSet::new();

        if let Some(target) = focus.target() {
            collect_focus_nodes(graph, target, &mut related_nodes);
            collect_focus_edges(graph, target, &mut related_edges);
        }

        Self {
            focus,
            selection: focus_state.selection(),
            related_nodes,
            related_edges,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_empty(&self) -> bool {
        self.related_nodes.is_empty()
    }

    pub fn related_nodes(&self) -> &HashSet<usize> {
        &self.related_nodes
    }

    pub fn is_highlighted(&self, node: usize) -> bool {
        self.related_nodes.contains(&node)
    }

    /// Committed selection only; hover never selects.
    pub fn is_selected(&self, node: usize) -> bool {
        self.selection == Some(FocusTarget::Node(node))
    }

    pub fn is_edge_selected(&self, edge: usize) -> bool {
        self.selection == Some(FocusTarget::Edge(edge))
    }

    pub fn edge_emphasis(&self, edge: usize) -> EdgeEmphasis {
        match self.focus {
            Focus::None => EdgeEmphasis::Ambient,
            _ if self.related_edges.contains(&edge) => EdgeEmphasis::Spotlit,
            _ => EdgeEmphasis::Dimmed,
        }
    }
}

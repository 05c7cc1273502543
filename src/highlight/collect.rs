use std::collections::HashSet;

use super::FocusTarget;
use crate::graph::ConceptGraph;

pub(super) fn collect_focus_nodes(
    graph: &ConceptGraph,
    target: FocusTarget,
    related_nodes: &mut HashSet<usize>,
) {
    match target {
        FocusTarget::Node(node) => {
            if node >= graph.node_count() {
                return;
            }
            related_nodes.insert(node);
            related_nodes.extend(graph.neighbors(node).iter().copied());
        }
        FocusTarget::Edge(edge) => {
            if let Some(&(source, target)) = graph.endpoints().get(edge) {
                related_nodes.insert(source);
                related_nodes.insert(target);
            }
        }
    }
}

pub(super) fn collect_focus_edges(
    graph: &ConceptGraph,
    target: FocusTarget,
    related_edges: &mut HashSet<usize>,
) {
    match target {
        FocusTarget::Node(node) => {
            related_edges.extend(graph.incident_edges(node).iter().copied());
        }
        FocusTarget::Edge(edge) => {
            if edge < graph.edge_count() {
                related_edges.insert(edge);
            }
        }
    }
}

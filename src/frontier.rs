//! The revealed frontier: concepts the user has been shown so far.
//!
//! Seeded from hierarchy attributes at load and only ever grown afterwards,
//! by expanding a concept into its neighborhood. Selection never touches it.
//! A reload builds a fresh frontier.

use tracing::debug;

use crate::graph::ConceptGraph;

/// Seed size when no concept qualifies by hierarchy.
pub const FALLBACK_SEED_SIZE: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontier {
    revealed: Vec<bool>,
    count: usize,
}

impl Frontier {
    /// Main concepts and core concepts, skipping anything ranked below
    /// detail. Falls back to the first [`FALLBACK_SEED_SIZE`] concepts.
    pub fn seeded(graph: &ConceptGraph) -> Self {
        let mut frontier = Self {
            revealed: vec![false; graph.node_count()],
            count: 0,
        };

        for (index, concept) in graph.concepts().iter().enumerate() {
            if (concept.priority == 1 || concept.depth_level == 0) && concept.priority <= 3 {
                frontier.reveal(index);
            }
        }

        if frontier.is_empty() {
            for index in 0..graph.node_count().min(FALLBACK_SEED_SIZE) {
                frontier.reveal(index);
            }
        }

        debug!(seeded = frontier.count, total = graph.node_count(), "frontier seeded");
        frontier
    }

    pub fn contains(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Revealed concept indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.revealed
            .iter()
            .enumerate()
            .filter_map(|(index, &revealed)| revealed.then_some(index))
    }

    /// Returns whether `index` was newly revealed.
    pub fn reveal(&mut self, index: usize) -> bool {
        match self.revealed.get_mut(index) {
            Some(slot) if !*slot => {
                *slot = true;
                self.count += 1;
                true
            }
            _ => false,
        }
    }

    /// Unions `index` and all of its neighbors into the frontier. Returns the
    /// newly revealed indices; empty on a repeated call.
    pub fn expand(&mut self, graph: &ConceptGraph, index: usize) -> Vec<usize> {
        if index >= self.revealed.len() {
            return Vec::new();
        }

        let mut added = Vec::new();
        if self.reveal(index) {
            added.push(index);
        }
        for &neighbor in graph.neighbors(index) {
            if self.reveal(neighbor) {
                added.push(neighbor);
            }
        }
        added
    }
}

//! Spatial placement of concepts.
//!
//! Two strategies share one contract: [`compute_layout`] returns one finite,
//! distinct position per concept. The force strategy relaxes a
//! [`ForceSimulation`] for a bounded number of steps; the orbital strategy
//! places concepts on rings around a root deterministically.

mod live;
mod orbital;
pub mod physics;

use std::collections::{HashMap, HashSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{Concept, ConceptGraph};
use crate::util::spiral_direction;

pub use live::{DragRelease, LiveLayout};
pub use orbital::OrbitalConfig;
pub use physics::{ForceSimulation, PhysicsConfig};

const DISTINCT_NUDGE: f32 = 0.05;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    #[default]
    Force,
    Orbital,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub strategy: LayoutStrategy,
    pub physics: PhysicsConfig,
    pub orbital: OrbitalConfig,
    /// Step budget for the load-time relaxation.
    pub settle_steps: usize,
    /// Mean squared speed under which relaxation stops early.
    pub settle_energy: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: LayoutStrategy::default(),
            physics: PhysicsConfig::default(),
            orbital: OrbitalConfig::default(),
            settle_steps: 300,
            settle_energy: 1e-4,
        }
    }
}

/// One position per concept, index-aligned with [`ConceptGraph::concepts`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    positions: Vec<Vec3>,
}

impl Layout {
    /// Wraps raw positions, replacing non-finite coordinates and separating
    /// coincident ones.
    pub(crate) fn from_raw(mut positions: Vec<Vec3>) -> Self {
        for (index, position) in positions.iter_mut().enumerate() {
            if !position.is_finite() {
                *position = spiral_direction(index, 0) * (1.0 + index as f32).sqrt();
            }
        }
        ensure_distinct(&mut positions);
        Self { positions }
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions keyed by concept id.
    pub fn to_map(&self, graph: &ConceptGraph) -> HashMap<String, Vec3> {
        graph
            .concepts()
            .iter()
            .zip(&self.positions)
            .map(|(concept, position)| (concept.id.clone(), *position))
            .collect()
    }

    pub fn into_positions(self) -> Vec<Vec3> {
        self.positions
    }
}

pub fn compute_layout(graph: &ConceptGraph, config: &LayoutConfig) -> Layout {
    match config.strategy {
        _ if graph.node_count() <= 1 => Layout::from_raw(vec![Vec3::ZERO; graph.node_count()]),
        LayoutStrategy::Force => {
            let simulation = settle_force(graph, config);
            Layout::from_raw(simulation.into_positions())
        }
        LayoutStrategy::Orbital => Layout::from_raw(orbital::place(graph, &config.orbital)),
    }
}

pub(crate) fn settle_force(graph: &ConceptGraph, config: &LayoutConfig) -> ForceSimulation {
    let mut simulation = ForceSimulation::new(graph, config.physics);
    let steps = simulation.settle(config.settle_steps, config.settle_energy.max(0.0));
    debug!(
        nodes = graph.node_count(),
        steps,
        energy = simulation.kinetic_energy(),
        "force layout settled"
    );
    simulation
}

/// Concept with the lowest `depth_level`; ties go to the earliest one.
pub fn root_index(graph: &ConceptGraph) -> Option<usize> {
    graph
        .concepts()
        .iter()
        .enumerate()
        .min_by_key(|(index, concept)| (concept.depth_level, *index))
        .map(|(index, _)| index)
}

/// Visual radius, shared by the collision constraint and the composer.
pub fn node_radius(concept: &Concept) -> f32 {
    match concept.priority {
        1 => 1.0,
        2 => 0.75,
        _ => 0.55,
    }
}

fn position_key(position: Vec3) -> [u32; 3] {
    // `+ 0.0` folds -0.0 into 0.0
    let position = position + Vec3::ZERO;
    [
        position.x.to_bits(),
        position.y.to_bits(),
        position.z.to_bits(),
    ]
}

fn ensure_distinct(positions: &mut [Vec3]) {
    let mut taken = HashSet::with_capacity(positions.len());
    for (index, position) in positions.iter_mut().enumerate() {
        let mut attempt = 0usize;
        while !taken.insert(position_key(*position)) {
            attempt += 1;
            *position += spiral_direction(index, attempt) * (DISTINCT_NUDGE * attempt as f32);
        }
    }
}

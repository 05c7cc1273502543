// Orbital placement.
//
// The root sits at the origin. Entity-like concepts share an inner ring in
// the horizontal plane; everything else goes on a wider outer ring whose
// height follows a sine wave so the ring reads as 3D from any side.
//
// Properties:
// - Deterministic: depends only on concept order and attributes
// - Every ring slot is unique, so no two concepts coincide

use std::f32::consts::TAU;

use glam::{Vec3, vec3};
use serde::{Deserialize, Serialize};

use super::root_index;
use crate::graph::{Concept, ConceptGraph, SemanticType};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalConfig {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Peak vertical offset on the outer ring.
    pub wave_amplitude: f32,
    /// Wave periods per revolution of the outer ring.
    pub wave_frequency: f32,
    /// Untyped concepts whose label has at most this many words count as
    /// entity-like.
    pub short_label_words: usize,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self {
            inner_radius: 12.0,
            outer_radius: 22.0,
            wave_amplitude: 3.0,
            wave_frequency: 3.0,
            short_label_words: 2,
        }
    }
}

fn is_entity_like(concept: &Concept, config: &OrbitalConfig) -> bool {
    match concept.semantic_type {
        SemanticType::Entity => true,
        SemanticType::Other => {
            let words = concept.label.split_whitespace().count();
            words > 0 && words <= config.short_label_words
        }
        SemanticType::Variable | SemanticType::Law | SemanticType::Process => false,
    }
}

pub(super) fn place(graph: &ConceptGraph, config: &OrbitalConfig) -> Vec<Vec3> {
    let mut positions = vec![Vec3::ZERO; graph.node_count()];
    let Some(root) = root_index(graph) else {
        return positions;
    };

    let inner_radius = config.inner_radius.max(1.0);
    let outer_radius = config.outer_radius.max(inner_radius + 1.0);

    let (inner, outer): (Vec<usize>, Vec<usize>) = (0..graph.node_count())
        .filter(|&index| index != root)
        .partition(|&index| {
            graph
                .concept(index)
                .is_some_and(|concept| is_entity_like(concept, config))
        });

    let inner_step = TAU / inner.len().max(1) as f32;
    for (slot, &index) in inner.iter().enumerate() {
        let angle = slot as f32 * inner_step;
        positions[index] = vec3(angle.cos() * inner_radius, 0.0, angle.sin() * inner_radius);
    }

    // Half-step offset keeps outer slots from lining up behind inner ones.
    let outer_step = TAU / outer.len().max(1) as f32;
    for (slot, &index) in outer.iter().enumerate() {
        let angle = (slot as f32 + 0.5) * outer_step;
        let height = (angle * config.wave_frequency).sin() * config.wave_amplitude;
        positions[index] = vec3(angle.cos() * outer_radius, height, angle.sin() * outer_radius);
    }

    positions
}

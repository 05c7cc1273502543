//! Force-directed relaxation in 3D.
//!
//! Bodies repel pairwise (Barnes-Hut over an octree), relationships and
//! parent hints act as damped springs, a weak pull keeps everything near the
//! origin and a collision pass enforces a minimum distance proportional to
//! the bodies' radii. The whole step is scaled by a temperature that decays
//! every step and is raised again while a body is dragged.

mod forces;
mod octree;

use std::collections::HashMap;

use glam::{Vec3, vec3};
use serde::{Deserialize, Serialize};

use super::{node_radius, root_index};
use crate::graph::{ConceptGraph, MAX_ABSTRACTION_LEVEL};
use crate::util::stable_triple;
use forces::{CollisionParams, RepulsionParams, accumulate_collision_pairs, accumulate_repulsion_for_body};
use octree::OctNode;

const BARNES_HUT_THETA: f32 = 0.72;
const GOLDEN_ANGLE: f32 = 2.399_963;
const MIN_TEMPERATURE: f32 = 0.001;
const STEP_GAIN: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub intensity: f32,
    pub repulsion_scale: f32,
    pub spring_scale: f32,
    pub collision_scale: f32,
    pub velocity_damping: f32,
    /// Spring rest length between two related concepts, before radii.
    pub rest_length: f32,
    /// Vertical distance between two adjacent abstraction levels.
    pub abstraction_spacing: f32,
    pub hierarchy_pull: f32,
    pub category_pull: f32,
    /// Fraction of temperature lost per step.
    pub cooling: f32,
    /// Temperature restored while a body is dragged.
    pub drag_reheat: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            repulsion_scale: 1.0,
            spring_scale: 1.0,
            collision_scale: 1.0,
            velocity_damping: 0.86,
            rest_length: 6.0,
            abstraction_spacing: 1.2,
            hierarchy_pull: 0.05,
            category_pull: 0.02,
            cooling: 0.02,
            drag_reheat: 0.35,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Spring {
    from: usize,
    to: usize,
    rest: f32,
    stiffness: f32,
}

#[derive(Clone, Debug, Default)]
struct Scratch {
    forces: Vec<Vec3>,
    category_sums: Vec<Vec3>,
    category_counts: Vec<usize>,
}

#[derive(Clone, Debug)]
pub struct ForceSimulation {
    config: PhysicsConfig,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    radii: Vec<f32>,
    pinned: Vec<bool>,
    springs: Vec<Spring>,
    vertical_targets: Vec<f32>,
    categories: Vec<usize>,
    category_count: usize,
    root: Option<usize>,
    temperature: f32,
    scratch: Scratch,
}

impl ForceSimulation {
    pub fn new(graph: &ConceptGraph, config: PhysicsConfig) -> Self {
        let node_count = graph.node_count();
        let root = root_index(graph);
        let rest_length = config.rest_length.clamp(0.5, 100.0);
        let spacing = config.abstraction_spacing.clamp(0.0, 20.0);
        let mid_level = MAX_ABSTRACTION_LEVEL * 0.5;

        let radii = graph.concepts().iter().map(node_radius).collect::<Vec<_>>();
        let vertical_targets = graph
            .concepts()
            .iter()
            .map(|concept| (concept.abstraction_level - mid_level) * spacing)
            .collect::<Vec<_>>();

        let shell = (node_count as f32).cbrt() * rest_length * 1.2;
        let positions = graph
            .concepts()
            .iter()
            .enumerate()
            .map(|(index, concept)| {
                if Some(index) == root {
                    return vec3(0.0, vertical_targets[index], 0.0);
                }
                let (jx, jy, jz) = stable_triple(&concept.id);
                let jitter = vec3(jx, jy, jz) * (rest_length * 0.5);
                let angle = index as f32 * GOLDEN_ANGLE;
                let radius = shell * ((index as f32 + 0.5) / node_count as f32).sqrt();
                vec3(angle.cos() * radius, vertical_targets[index], angle.sin() * radius) + jitter
            })
            .collect::<Vec<_>>();

        let mut springs = Vec::with_capacity(graph.edge_count());
        for &(from, to) in graph.endpoints() {
            if from == to {
                continue;
            }
            springs.push(Spring {
                from,
                to,
                rest: rest_length + (radii[from] + radii[to]) * 2.0,
                stiffness: 1.0,
            });
        }
        for index in 0..node_count {
            for &parent in graph.parents(index) {
                springs.push(Spring {
                    from: index,
                    to: parent,
                    rest: rest_length + (radii[index] + radii[parent]) * 2.0,
                    stiffness: 0.5,
                });
            }
        }

        let mut category_ids = HashMap::new();
        let categories = graph
            .concepts()
            .iter()
            .map(|concept| {
                let next = category_ids.len();
                *category_ids.entry(concept.category.as_str()).or_insert(next)
            })
            .collect::<Vec<_>>();

        Self {
            config,
            velocities: vec![Vec3::ZERO; node_count],
            pinned: vec![false; node_count],
            positions,
            radii,
            springs,
            vertical_targets,
            category_count: category_ids.len(),
            categories,
            root,
            temperature: 1.0,
            scratch: Scratch::default(),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<Vec3> {
        self.positions
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Mean squared speed over free bodies.
    pub fn kinetic_energy(&self) -> f32 {
        let mut total = 0.0;
        let mut count = 0usize;
        for (velocity, pinned) in self.velocities.iter().zip(&self.pinned) {
            if !pinned {
                total += velocity.length_squared();
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { total / count as f32 }
    }

    pub fn is_active(&self) -> bool {
        self.temperature > MIN_TEMPERATURE
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.pinned.get(index).copied().unwrap_or(false)
    }

    /// Stops integration until the next reheat.
    pub fn cool(&mut self) {
        self.temperature = 0.0;
        self.velocities.fill(Vec3::ZERO);
    }

    /// Overwrites every body position, e.g. after the caller separated
    /// coincident bodies. Lengths must match.
    pub fn reset_positions(&mut self, positions: &[Vec3]) {
        if positions.len() == self.positions.len() {
            self.positions.copy_from_slice(positions);
            self.velocities.fill(Vec3::ZERO);
        }
    }

    pub fn reheat(&mut self, temperature: f32) {
        self.temperature = self.temperature.max(temperature.clamp(0.0, 1.0));
    }

    /// Excludes `index` from integration. Its position still pushes and pulls
    /// the free bodies.
    pub fn pin(&mut self, index: usize) {
        if let Some(pinned) = self.pinned.get_mut(index) {
            *pinned = true;
            self.velocities[index] = Vec3::ZERO;
            self.reheat(self.config.drag_reheat);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(pinned) = self.pinned.get_mut(index) {
            *pinned = false;
        }
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) {
        if !position.is_finite() {
            return;
        }
        if let Some(slot) = self.positions.get_mut(index) {
            *slot = position;
            self.velocities[index] = Vec3::ZERO;
            if self.pinned[index] {
                self.reheat(self.config.drag_reheat);
            }
        }
    }

    /// Runs up to `max_steps` steps, stopping early once the mean kinetic
    /// energy falls below `energy_threshold` or everything sleeps. Returns the
    /// number of steps taken.
    pub fn settle(&mut self, max_steps: usize, energy_threshold: f32) -> usize {
        let min_steps = max_steps.min(20);
        for step in 0..max_steps {
            let moving = self.step(1.0);
            let settled = step + 1 >= min_steps && self.kinetic_energy() < energy_threshold;
            if !moving || settled {
                return step + 1;
            }
        }
        max_steps
    }

    /// One relaxation step. `time_scale` is the frame time in 60 Hz frames.
    /// Returns whether any free body moved.
    pub fn step(&mut self, time_scale: f32) -> bool {
        let node_count = self.positions.len();
        if node_count < 2 || !self.is_active() {
            return false;
        }

        let config = self.config;
        let intensity = config.intensity.clamp(0.2, 2.5);
        let repulsion = RepulsionParams {
            strength: 30.0 * intensity * config.repulsion_scale.clamp(0.25, 2.6),
            softening: 0.5,
            theta: BARNES_HUT_THETA,
        };
        let spring_strength = 0.12 * intensity * config.spring_scale.clamp(0.2, 2.2);
        let spring_damping = 0.22;
        let center_pull = 0.015 * intensity;
        let root_pull = 0.04 * intensity;
        let hierarchy_pull = config.hierarchy_pull.clamp(0.0, 0.5) * intensity;
        let category_pull = config.category_pull.clamp(0.0, 0.5) * intensity;
        let damping = config.velocity_damping.clamp(0.5, 0.97);
        let time_scale = time_scale.clamp(0.25, 3.0);
        let damping_factor = damping.powf(time_scale);
        let gain = STEP_GAIN * self.temperature * time_scale;

        let scratch = &mut self.scratch;
        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec3::ZERO);
        let forces = &mut scratch.forces;
        let positions = &self.positions;

        let mut max_radius = 0.0_f32;
        for &radius in &self.radii {
            max_radius = max_radius.max(radius);
        }

        if let Some(tree) = OctNode::build(positions) {
            for (index, force) in forces.iter_mut().enumerate() {
                accumulate_repulsion_for_body(&tree, index, positions, repulsion, force);
            }

            let collision = CollisionParams {
                strength: 1.5 * intensity * config.collision_scale.clamp(0.2, 2.0),
                spacing: 2.2,
                max_distance_sq: (max_radius * 2.0 * 2.2).powi(2),
            };
            if collision.max_distance_sq > 0.0 {
                accumulate_collision_pairs(&tree, &tree, true, positions, &self.radii, collision, forces);
            }
        }

        for spring in &self.springs {
            let delta = positions[spring.from] - positions[spring.to];
            let distance = delta.length();
            if distance <= 0.0001 {
                continue;
            }
            let direction = delta / distance;
            let stretch = (distance - spring.rest) * spring_strength * spring.stiffness;
            let relative_velocity = self.velocities[spring.from] - self.velocities[spring.to];
            let damping_force = relative_velocity.dot(direction) * spring_damping;
            let correction = direction * (stretch + damping_force);

            forces[spring.from] -= correction;
            forces[spring.to] += correction;
        }

        scratch.category_sums.clear();
        scratch.category_sums.resize(self.category_count, Vec3::ZERO);
        scratch.category_counts.clear();
        scratch.category_counts.resize(self.category_count, 0);
        for (index, &category) in self.categories.iter().enumerate() {
            scratch.category_sums[category] += positions[index];
            scratch.category_counts[category] += 1;
        }

        for (index, force) in forces.iter_mut().enumerate() {
            let position = positions[index];
            *force -= position * center_pull;
            if Some(index) == self.root {
                *force -= position * root_pull;
            }

            force.y += (self.vertical_targets[index] - position.y) * hierarchy_pull;

            let category = self.categories[index];
            let members = scratch.category_counts[category];
            if members > 1 {
                let centroid = scratch.category_sums[category] / members as f32;
                *force += (centroid - position) * category_pull;
            }
        }

        let max_force = 40.0 + (intensity * 20.0);
        let max_speed = 1.5 + (intensity * 1.5);
        let min_sleep_speed_sq = 0.0005 * 0.0005;
        let min_sleep_force_sq = 0.002 * 0.002;
        let mut any_motion = false;
        for index in 0..node_count {
            if self.pinned[index] {
                self.velocities[index] = Vec3::ZERO;
                continue;
            }

            let force = forces[index].clamp_length_max(max_force);
            let force = if force.is_finite() { force } else { Vec3::ZERO };
            let mut velocity = ((self.velocities[index] + force * gain) * damping_factor)
                .clamp_length_max(max_speed);

            let speed_sq = velocity.length_squared();
            if speed_sq < min_sleep_speed_sq && force.length_squared() * gain < min_sleep_force_sq {
                velocity = Vec3::ZERO;
            }

            self.velocities[index] = velocity;
            self.positions[index] += velocity * time_scale;
            if velocity.length_squared() > 0.0 {
                any_motion = true;
            }
        }

        if !self.pinned.iter().any(|&pinned| pinned) {
            let mut centroid = Vec3::ZERO;
            for position in &self.positions {
                centroid += *position;
            }
            centroid /= node_count as f32;
            let horizontal = vec3(centroid.x, 0.0, centroid.z);
            if horizontal.length_squared() > 0.000_001 {
                for position in &mut self.positions {
                    *position -= horizontal;
                }
            }
        }

        self.temperature *= 1.0 - config.cooling.clamp(0.001, 0.5);
        if self.temperature < MIN_TEMPERATURE {
            self.temperature = 0.0;
            self.velocities.fill(Vec3::ZERO);
        }

        any_motion
    }
}

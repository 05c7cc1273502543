use glam::Vec3;

use super::octree::OctNode;
use crate::util::spiral_direction;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    /// Minimum center distance is `(r_a + r_b) * spacing`.
    pub(super) spacing: f32,
    pub(super) max_distance_sq: f32,
}

fn push_direction(delta: Vec3, distance: f32, from: usize, to: usize) -> Vec3 {
    if distance > 0.0001 {
        delta / distance
    } else {
        spiral_direction(from, to)
    }
}

fn repulsion_between(point_a: Vec3, point_b: Vec3, from: usize, to: usize, params: RepulsionParams) -> Vec3 {
    let delta = point_a - point_b;
    let distance_sq = delta.length_squared();
    let direction = push_direction(delta, distance_sq.sqrt(), from, to);
    direction * (params.strength / (distance_sq + params.softening))
}

pub(super) fn accumulate_repulsion_for_body(
    node: &OctNode,
    index: usize,
    positions: &[Vec3],
    params: RepulsionParams,
    force: &mut Vec3,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            *force += repulsion_between(point, positions[other], index, other, params);
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_squared().max(0.0001);
    let distance = distance_sq.sqrt();
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < params.theta
        && node.mass > 1.0;

    if can_approximate {
        let direction = delta / distance;
        *force += direction * ((params.strength * node.mass) / (distance_sq + params.softening));
        return;
    }

    for child in node.children() {
        accumulate_repulsion_for_body(child, index, positions, params, force);
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    positions: &[Vec3],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec3],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    let min_distance = (radii[from] + radii[to]) * params.spacing;
    if distance >= min_distance {
        return;
    }

    let direction = push_direction(delta, distance, from, to);
    let overlap_push = (min_distance - distance) * params.strength;
    forces[from] += direction * overlap_push;
    forces[to] -= direction * overlap_push;
}

/// Dual-tree traversal visiting every body pair whose cells are close enough
/// to collide, each pair once.
pub(super) fn accumulate_collision_pairs(
    node_a: &OctNode,
    node_b: &OctNode,
    same_node: bool,
    positions: &[Vec3],
    radii: &[f32],
    params: CollisionParams,
    forces: &mut [Vec3],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_overlap(from, to, positions, radii, params, forces);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_overlap(from, to, positions, radii, params, forces);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (first, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, forces);
            for child_b in &children[first + 1..] {
                accumulate_collision_pairs(child_a, child_b, false, positions, radii, params, forces);
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, forces);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, forces);
        }
    }
}

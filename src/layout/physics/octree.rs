use glam::{Vec3, vec3};

const OCTREE_LEAF_CAPACITY: usize = 12;
const OCTREE_MAX_DEPTH: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Cube {
    pub(super) center: Vec3,
    pub(super) half_extent: f32,
}

impl Cube {
    fn from_points(points: &[Vec3]) -> Option<Self> {
        // `Vec3::min`/`max` skip NaN lanes, so the bounds alone cannot tell.
        if points.is_empty() || points.iter().any(|point| !point.is_finite()) {
            return None;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        let center = (min + max) * 0.5;
        let span = (max - min).max(Vec3::ONE);
        let half_extent = (span.max_element() * 0.5) + 1.0;

        Some(Self {
            center,
            half_extent,
        })
    }

    pub(super) fn contains(self, point: Vec3) -> bool {
        let offset = (point - self.center).abs();
        offset.max_element() <= self.half_extent
    }

    fn child(self, octant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign = |bit: usize| if octant & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec3(sign(1), sign(2), sign(4)),
            half_extent: quarter,
        }
    }

    fn octant_for(self, point: Vec3) -> usize {
        usize::from(point.x >= self.center.x)
            | (usize::from(point.y >= self.center.y) << 1)
            | (usize::from(point.z >= self.center.z) << 2)
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    pub(super) fn distance_sq_to(self, other: Self) -> f32 {
        let gap = (self.center - other.center).abs() - Vec3::splat(self.half_extent + other.half_extent);
        gap.max(Vec3::ZERO).length_squared()
    }
}

/// Barnes-Hut octree over body positions. Leaves hold body indices; inner
/// cells only aggregate mass.
pub(super) struct OctNode {
    pub(super) bounds: Cube,
    pub(super) center_of_mass: Vec3,
    pub(super) mass: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<OctNode>>; 8],
}

impl OctNode {
    pub(super) fn build(positions: &[Vec3]) -> Option<Self> {
        let bounds = Cube::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, 0))
    }

    fn build_node(bounds: Cube, indices: Vec<usize>, positions: &[Vec3], depth: usize) -> Self {
        let mut center_of_mass = Vec3::ZERO;
        for &index in &indices {
            center_of_mass += positions[index];
        }

        let mass = indices.len() as f32;
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= OCTREE_MAX_DEPTH || node.indices.len() <= OCTREE_LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 8, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.octant_for(positions[index])].push(index);
        }

        let non_empty = buckets.iter().filter(|bucket| !bucket.is_empty()).count();
        if non_empty <= 1 {
            return node;
        }

        for (octant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[octant] = Some(Box::new(Self::build_node(
                bounds.child(octant),
                bucket,
                positions,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &OctNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_indices(node: &OctNode, out: &mut Vec<usize>) {
        out.extend(node.indices.iter().copied());
        for child in node.children() {
            leaf_indices(child, out);
        }
    }

    #[test]
    fn every_body_lands_in_exactly_one_leaf() {
        let positions = (0..200)
            .map(|i| {
                let t = i as f32;
                vec3((t * 1.7).sin() * 40.0, (t * 0.9).cos() * 25.0, (t * 0.31).sin() * 60.0)
            })
            .collect::<Vec<_>>();

        let tree = OctNode::build(&positions).expect("finite positions build a tree");
        let mut seen = Vec::new();
        leaf_indices(&tree, &mut seen);
        seen.sort_unstable();

        assert_eq!(seen, (0..200).collect::<Vec<_>>());
        assert_eq!(tree.mass, 200.0);
        assert!(!tree.is_leaf());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![Vec3::ONE; 40];
        let tree = OctNode::build(&positions).expect("finite positions build a tree");

        assert!(tree.is_leaf());
        assert_eq!(tree.indices.len(), 40);
        assert!((tree.center_of_mass - Vec3::ONE).length() < 1e-5);
    }

    #[test]
    fn non_finite_positions_build_nothing() {
        let positions = vec![Vec3::ZERO, vec3(f32::NAN, 0.0, 0.0)];
        assert!(OctNode::build(&positions).is_none());
    }

    #[test]
    fn cube_gap_is_zero_when_touching() {
        let a = Cube {
            center: Vec3::ZERO,
            half_extent: 1.0,
        };
        let b = Cube {
            center: vec3(2.0, 0.0, 0.0),
            half_extent: 1.0,
        };
        let c = Cube {
            center: vec3(5.0, 0.0, 0.0),
            half_extent: 1.0,
        };

        assert_eq!(a.distance_sq_to(b), 0.0);
        assert!((a.distance_sq_to(c) - 9.0).abs() < 1e-5);
        assert!(a.contains(vec3(1.0, -1.0, 0.5)));
        assert!(!a.contains(vec3(1.5, 0.0, 0.0)));
    }
}

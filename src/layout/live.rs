use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Layout, LayoutConfig, LayoutStrategy, compute_layout, physics::ForceSimulation, settle_force};
use crate::graph::ConceptGraph;

/// What happens to a dragged concept when the drag ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragRelease {
    /// Unpin and let the simulation carry it from the drop point.
    #[default]
    Resume,
    /// Return to the position assigned at load and stay pinned there.
    SnapBack,
}

/// Layout owned by a session: the positions assigned at load plus the
/// positions currently shown, which only drift through physics and drags.
#[derive(Clone, Debug, Default)]
pub struct LiveLayout {
    assigned: Vec<Vec3>,
    current: Vec<Vec3>,
    simulation: Option<ForceSimulation>,
    dragging: Option<usize>,
}

impl LiveLayout {
    pub fn compute(graph: &ConceptGraph, config: &LayoutConfig) -> Self {
        if config.strategy == LayoutStrategy::Orbital || graph.node_count() <= 1 {
            let layout = compute_layout(graph, config);
            return Self::from_layout(layout, None);
        }

        let mut simulation = settle_force(graph, config);
        let layout = Layout::from_raw(simulation.positions().to_vec());
        simulation.reset_positions(layout.positions());
        simulation.cool();
        Self::from_layout(layout, Some(simulation))
    }

    fn from_layout(layout: Layout, simulation: Option<ForceSimulation>) -> Self {
        let assigned = layout.into_positions();
        Self {
            current: assigned.clone(),
            assigned,
            simulation,
            dragging: None,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.current
    }

    pub fn assigned(&self) -> &[Vec3] {
        &self.assigned
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Whether a tick could still move anything.
    pub fn is_animating(&self) -> bool {
        self.simulation
            .as_ref()
            .is_some_and(ForceSimulation::is_active)
    }

    /// Advances the simulation, if any. Returns whether positions changed.
    pub fn tick(&mut self, time_scale: f32) -> bool {
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };
        if !simulation.step(time_scale) {
            return false;
        }
        self.current.copy_from_slice(simulation.positions());
        true
    }

    /// Pins `index` under the pointer. A drag already in progress is
    /// released first.
    pub fn begin_drag(&mut self, index: usize, release: DragRelease) -> bool {
        if index >= self.current.len() {
            return false;
        }
        if self.dragging.is_some() {
            self.end_drag(release);
        }
        self.dragging = Some(index);
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.pin(index);
        }
        debug!(index, "drag started");
        true
    }

    pub fn drag_to(&mut self, position: Vec3) -> bool {
        let Some(index) = self.dragging else {
            return false;
        };
        if !position.is_finite() {
            return false;
        }
        self.current[index] = position;
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.set_position(index, position);
        }
        true
    }

    /// Releases the dragged concept. A snapped-back concept keeps its pin so
    /// the neighbors still settling around it cannot pull it off again; the
    /// next drag released with [`DragRelease::Resume`] frees it.
    pub fn end_drag(&mut self, release: DragRelease) -> Option<usize> {
        let index = self.dragging.take()?;
        if release == DragRelease::SnapBack {
            self.current[index] = self.assigned[index];
        }
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.set_position(index, self.current[index]);
            if release == DragRelease::Resume {
                simulation.unpin(index);
            }
        }
        debug!(index, ?release, "drag ended");
        Some(index)
    }
}

//! Level-of-detail visibility.
//!
//! A concept at `depth_level` k is visible while the camera is closer to the
//! origin than `T_k`. Level 0 has no threshold. Opacity follows visibility
//! through an exponential fade instead of switching.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};
use crate::graph::MAX_DEPTH_LEVEL;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// Distances for levels 1, 2 and 3. Must be strictly decreasing.
    pub thresholds: [f32; 3],
    /// Share of the remaining gap to the target closed per 60 Hz frame.
    pub fade_damping: f32,
    /// Opacities closer than this to their target snap to it. Concepts
    /// fading out stop rendering once they fall below it.
    pub fade_epsilon: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            thresholds: [60.0, 35.0, 18.0],
            fade_damping: 0.2,
            fade_epsilon: 0.01,
        }
    }
}

impl LodConfig {
    pub fn threshold(&self, level: u8) -> f32 {
        threshold_for(&self.thresholds, level)
    }

    pub fn validate(&self) -> Result<()> {
        let mut previous = f32::INFINITY;
        for (offset, &threshold) in self.thresholds.iter().enumerate() {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(SceneError::Config(format!(
                    "lod threshold for level {} must be a positive number, got {threshold}",
                    offset + 1
                )));
            }
            if threshold >= previous {
                return Err(SceneError::Config(format!(
                    "lod thresholds must strictly decrease, level {} has {threshold} after {previous}",
                    offset + 1
                )));
            }
            previous = threshold;
        }

        if !(self.fade_damping > 0.0 && self.fade_damping <= 1.0) {
            return Err(SceneError::Config(format!(
                "fade_damping must be in (0, 1], got {}",
                self.fade_damping
            )));
        }
        if !(0.0..0.5).contains(&self.fade_epsilon) {
            return Err(SceneError::Config(format!(
                "fade_epsilon must be in [0, 0.5), got {}",
                self.fade_epsilon
            )));
        }
        Ok(())
    }
}

fn threshold_for(thresholds: &[f32; 3], level: u8) -> f32 {
    match level.min(MAX_DEPTH_LEVEL) {
        0 => f32::INFINITY,
        level => thresholds[usize::from(level) - 1],
    }
}

/// NaN, negative and infinite distances collapse to the farthest finite
/// distance, which leaves only core concepts visible.
pub fn sanitize_camera_distance(distance: f32) -> f32 {
    if distance.is_finite() && distance >= 0.0 {
        distance
    } else {
        f32::MAX
    }
}

/// Visibility decision for one frame's camera distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityFrame {
    distance: f32,
    thresholds: [f32; 3],
}

impl VisibilityFrame {
    pub fn new(config: &LodConfig, camera_distance: f32) -> Self {
        Self {
            distance: sanitize_camera_distance(camera_distance),
            thresholds: config.thresholds,
        }
    }

    pub fn core_only() -> Self {
        Self::new(&LodConfig::default(), f32::MAX)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn shows(&self, level: u8) -> bool {
        self.distance < threshold_for(&self.thresholds, level)
    }

    /// Deepest visible level. Levels are visible as a prefix because the
    /// thresholds decrease.
    pub fn tier(&self) -> u8 {
        (0..=MAX_DEPTH_LEVEL)
            .take_while(|&level| self.shows(level))
            .last()
            .unwrap_or(0)
    }

    pub fn target_opacity(&self, level: u8) -> f32 {
        if self.shows(level) { 1.0 } else { 0.0 }
    }
}

impl Default for VisibilityFrame {
    fn default() -> Self {
        Self::core_only()
    }
}

/// Per-concept opacity, faded toward a target every tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpacityState {
    values: Vec<f32>,
}

impl OpacityState {
    /// Everything starts transparent and fades in.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn get(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Moves every value toward its target. `time_scale` is the frame time
    /// in 60 Hz frames. Returns whether anything is still fading.
    pub fn step(&mut self, targets: &[f32], config: &LodConfig, time_scale: f32) -> bool {
        let damping = config.fade_damping.clamp(0.001, 1.0);
        let blend = 1.0 - (1.0 - damping).powf(time_scale.max(0.0));
        let epsilon = config.fade_epsilon.max(0.0);

        let mut animating = false;
        for (value, &target) in self.values.iter_mut().zip(targets) {
            let target = target.clamp(0.0, 1.0);
            *value += (target - *value) * blend;
            if (target - *value).abs() <= epsilon {
                *value = target;
            } else {
                animating = true;
            }
        }
        animating
    }
}

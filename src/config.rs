//! Engine configuration.
//!
//! Every section has defaults, so an empty JSON object is a valid config and
//! a partial one only overrides what it names.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, SceneError};
use crate::layout::{DragRelease, LayoutConfig};
use crate::lod::LodConfig;

/// Cosmetic whole-scene spin. Applied by the composer only; stored positions
/// never rotate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRotate {
    pub enabled: bool,
    pub radians_per_second: f32,
    pub pause_while_focused: bool,
}

impl Default for AutoRotate {
    fn default() -> Self {
        Self {
            enabled: false,
            radians_per_second: 0.1,
            pause_while_focused: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub lod: LodConfig,
    pub drag_release: DragRelease,
    pub auto_rotate: AutoRotate,
}

impl EngineConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.lod.validate()?;
        validate_layout(&self.layout)?;
        validate_auto_rotate(&self.auto_rotate)
    }

    /// Replaces every section that fails validation with its default. Used
    /// for configs built in code, which never pass through
    /// [`from_json`](Self::from_json).
    pub fn sanitized(mut self) -> Self {
        if let Err(error) = self.lod.validate() {
            warn!(%error, "invalid lod config, using defaults");
            self.lod = LodConfig::default();
        }
        if let Err(error) = validate_layout(&self.layout) {
            warn!(%error, "invalid layout config, using defaults");
            self.layout = LayoutConfig::default();
        }
        if let Err(error) = validate_auto_rotate(&self.auto_rotate) {
            warn!(%error, "invalid auto_rotate config, using defaults");
            self.auto_rotate = AutoRotate::default();
        }
        self
    }
}

fn validate_layout(layout: &LayoutConfig) -> Result<()> {
    if layout.settle_steps == 0 {
        return Err(SceneError::Config("layout.settle_steps must be at least 1".to_owned()));
    }
    let orbital = &layout.orbital;
    if !(orbital.inner_radius.is_finite() && orbital.outer_radius.is_finite()) {
        return Err(SceneError::Config("orbital radii must be finite".to_owned()));
    }
    if orbital.outer_radius <= orbital.inner_radius {
        return Err(SceneError::Config(format!(
            "orbital outer_radius ({}) must exceed inner_radius ({})",
            orbital.outer_radius, orbital.inner_radius
        )));
    }
    Ok(())
}

fn validate_auto_rotate(auto_rotate: &AutoRotate) -> Result<()> {
    if !auto_rotate.radians_per_second.is_finite() {
        return Err(SceneError::Config(
            "auto_rotate.radians_per_second must be finite".to_owned(),
        ));
    }
    Ok(())
}

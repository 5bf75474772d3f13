//! Persisted tool preferences.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BendError, Result};

/// Bend preferences, stored as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BendSettings {
    /// Approximate the arc with flat facets instead of a smooth curve.
    pub segmented: bool,
    /// Soften and smooth the seams created by slicing.
    pub soften_seams: bool,
    /// Number of subdivisions along the reference segment.
    pub subdivisions: usize,
    /// Deepest nesting of sub-objects a bend descends into.
    pub max_depth: usize,
    /// Debug drawing toggles.
    pub debug: DebugSettings,
}

/// Debug drawing toggles for the overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Draw the object's bounding box.
    pub draw_boundingbox: bool,
    /// Label curve and segment lengths.
    pub draw_debug_info: bool,
    /// Draw the sliced mesh in reference segment space.
    pub draw_local_mesh: bool,
    /// Draw the sliced mesh in world space.
    pub draw_global_mesh: bool,
    /// Draw the cutting planes.
    pub draw_slice_planes: bool,
}

impl Default for BendSettings {
    fn default() -> Self {
        Self {
            segmented: true,
            soften_seams: true,
            subdivisions: 24,
            max_depth: 32,
            debug: DebugSettings::default(),
        }
    }
}

impl BendSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.subdivisions == 0 {
            return Err(BendError::Validation(
                "subdivisions must be at least 1".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(BendError::Validation("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse and validate settings from TOML. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| BendError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| BendError::Settings(e.to_string()))
    }

    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| BendError::Settings(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Write settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml_string()?)
            .map_err(|e| BendError::Settings(format!("{}: {e}", path.display())))
    }
}

//! Suppressor component settings (TOML)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::evaluate::ToggleState;

/// Default displacement threshold: anything perceptibly moved
pub const DEFAULT_BLEND_SHAPE_THRESHOLD: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuppressorSettings {
    /// Engage suppression at rest. Animation curves on this property are
    /// retargeted onto the toggle channel.
    #[serde(default)]
    pub suppress_blink: bool,
    #[serde(default = "default_threshold")]
    pub blend_shape_threshold: f32,
}

fn default_threshold() -> f32 {
    DEFAULT_BLEND_SHAPE_THRESHOLD
}

impl Default for SuppressorSettings {
    fn default() -> Self {
        Self {
            suppress_blink: false,
            blend_shape_threshold: DEFAULT_BLEND_SHAPE_THRESHOLD,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Negative, NaN or infinite threshold
    #[error("blend_shape_threshold must be finite and non-negative, got {0}")]
    InvalidThreshold(f32),
}

impl SuppressorSettings {
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let threshold = self.blend_shape_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(SettingsError::InvalidThreshold(threshold));
        }
        Ok(())
    }

    /// Toggle state the renderer starts in
    pub fn rest_state(&self) -> ToggleState {
        ToggleState::from_suppressed(self.suppress_blink)
    }

    /// Renderer weight of the toggle channel at rest
    pub fn rest_weight(&self) -> f32 {
        self.rest_state().weight()
    }
}

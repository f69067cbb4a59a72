//! Driver settings
//!
//! Loaded from a JSON file by the host; every field has a default so partial
//! files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;

/// Simulation driver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Fixed simulation rate (steps per second)
    pub step_hz: u32,
    /// Maximum steps drained per rendered frame
    pub max_substeps: u32,

    // === World ===
    /// Default scene width in world units
    pub scene_width: f32,
    /// Default scene height in world units
    pub scene_height: f32,

    // === Demo ===
    /// Seed for the demo scatter RNG
    pub seed: u64,
    /// Number of steps the headless demo runs
    pub demo_steps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_hz: STEP_HZ,
            max_substeps: MAX_SUBSTEPS,

            scene_width: SCENE_WIDTH,
            scene_height: SCENE_HEIGHT,

            seed: 12345,
            demo_steps: 600,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize settings back to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Duration of one simulation step in seconds
    pub fn step_dt(&self) -> f32 {
        1.0 / self.step_hz as f32
    }

    /// Clamp values the driver cannot work with
    fn sanitized(mut self) -> Self {
        self.step_hz = self.step_hz.max(1);
        self.max_substeps = self.max_substeps.max(1);
        self
    }
}

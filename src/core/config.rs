//! Animation configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Error;

/// Default skinning palette capacity
pub const DEFAULT_MAX_BONES: usize = 100;

/// Ticks per second used when a clip reports 0 (unspecified)
pub const DEFAULT_TICKS_PER_SECOND: f32 = 1.0;

/// Settings applied while rigs and clips are loaded
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Maximum number of bones in a model's skinning palette
    pub max_bones: usize,
    /// Replaces a clip's ticks-per-second when the source data reports 0
    pub default_ticks_per_second: f32,
    /// Reject adjacent keys with identical timestamps instead of stepping
    pub strict_timestamps: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            max_bones: DEFAULT_MAX_BONES,
            default_ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            strict_timestamps: false,
        }
    }
}

impl AnimationConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }

    /// Resolve a clip's reported ticks-per-second
    pub fn ticks_per_second(&self, reported: f32) -> f32 {
        if reported == 0.0 {
            self.default_ticks_per_second
        } else {
            reported
        }
    }
}

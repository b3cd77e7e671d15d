//! Droplet erosion parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest sediment capacity a droplet ever has: half of one 16-bit height
/// step. Keeps flat ground from being eroded without limit.
pub const MIN_SEDIMENT_CAPACITY: f64 = 0.5 / u16::MAX as f64;

/// Errors while loading or saving parameter files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid parameter file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Could not serialize parameters: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Tuning knobs for one droplet's lifetime.
///
/// The simulator trusts these values; call [`ErosionParams::clamped`] on
/// anything that came from a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErosionParams {
    /// Maximum number of steps a droplet takes (>= 1).
    pub max_droplet_lifetime: u32,
    /// How much of its previous direction a droplet keeps (0-1).
    pub inertia: f64,
    /// Multiplier on slope * speed * water for the sediment capacity.
    pub sediment_capacity_factor: f64,
    /// Lower bound on the sediment capacity.
    pub min_sediment_capacity: f64,
    /// Fraction of excess sediment dropped per step (0-1).
    pub deposit_speed: f64,
    /// Fraction of free capacity eroded per step (0-1).
    pub erode_speed: f64,
    /// Brush radius for deposits, in samples.
    pub deposit_brush_radius: f64,
    /// Brush radius for erosion, in samples.
    pub erode_brush_radius: f64,
    /// Fraction of water lost per step (0-1).
    pub evaporate_speed: f64,
    pub gravity: f64,
    /// Sharpens the brush falloff; 0 gives a linear cone.
    pub brush_pointiness: f64,
    pub initial_water: f64,
    pub initial_speed: f64,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            max_droplet_lifetime: 30,
            inertia: 0.05,
            sediment_capacity_factor: 4.0,
            min_sediment_capacity: MIN_SEDIMENT_CAPACITY,
            deposit_speed: 0.3,
            erode_speed: 0.3,
            deposit_brush_radius: 3.0,
            erode_brush_radius: 3.0,
            evaporate_speed: 0.01,
            gravity: 4.0,
            brush_pointiness: 0.0,
            initial_water: 1.0,
            initial_speed: 1.0,
        }
    }
}

impl ErosionParams {
    /// Returns a copy with every knob forced into its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            max_droplet_lifetime: self.max_droplet_lifetime.max(1),
            inertia: self.inertia.clamp(0.0, 1.0),
            sediment_capacity_factor: self.sediment_capacity_factor.max(0.0),
            min_sediment_capacity: self.min_sediment_capacity.max(0.0),
            deposit_speed: self.deposit_speed.clamp(0.0, 1.0),
            erode_speed: self.erode_speed.clamp(0.0, 1.0),
            deposit_brush_radius: self.deposit_brush_radius.max(0.0),
            erode_brush_radius: self.erode_brush_radius.max(0.0),
            evaporate_speed: self.evaporate_speed.clamp(0.0, 1.0),
            gravity: self.gravity.max(0.0),
            brush_pointiness: self.brush_pointiness.max(0.0),
            initial_water: self.initial_water.max(0.0),
            initial_speed: self.initial_speed.max(0.0),
        }
    }

    /// Reads parameters from a TOML file; missing keys keep their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Per-step water loss `m` in `w <- w * (1 - evaporate_speed) - m`,
    /// chosen so that water is exactly zero after the last step.
    pub fn water_modifier(&self) -> f64 {
        let keep = 1.0 - self.evaporate_speed;
        let steps = self.max_droplet_lifetime.max(1) as i32;
        // Geometric series 1 + keep + ... + keep^(steps-1).
        let series: f64 = (0..steps).map(|i| keep.powi(i)).sum();
        self.initial_water * keep.powi(steps) / series
    }
}

//! Multi-octave fractal Brownian motion (fBm) noise sampled on the sphere.

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

/// Configuration for multi-octave fractal noise generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves (4-8 typical).
    pub octaves: usize,
    /// Base frequency of the noise (1.0-4.0 typical).
    pub frequency: f64,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f64,
    /// Amplitude decay per octave (0.4-0.6 typical).
    pub persistence: f64,
    /// Random seed for reproducible generation.
    pub seed: u32,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            frequency: 2.0,
            lacunarity: 2.0,
            persistence: 0.5,
            seed: 42,
        }
    }
}

impl FractalNoiseConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Rougher, more mountainous terrain.
    pub fn rugged(seed: u32) -> Self {
        Self {
            octaves: 8,
            frequency: 1.5,
            lacunarity: 2.1,
            persistence: 0.55,
            seed,
        }
    }

    /// Builds the noise function described by this configuration.
    pub fn build(&self) -> Fbm<Perlin> {
        Fbm::<Perlin>::new(self.seed)
            .set_octaves(self.octaves.max(1))
            .set_frequency(self.frequency)
            .set_lacunarity(self.lacunarity)
            .set_persistence(self.persistence)
    }
}

/// Samples fractal noise at a point on the unit sphere.
///
/// Sampling in 3D avoids any seam between cube faces in the raw noise; the
/// seams the stitcher repairs come from later per-face processing.
pub fn sample_fractal_noise(noise: &Fbm<Perlin>, pos: Vec3) -> f64 {
    noise.get([pos.x as f64, pos.y as f64, pos.z as f64])
}

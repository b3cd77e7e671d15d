//! Noise generation module for seeding height fields.

mod fractal;

pub use fractal::{FractalNoiseConfig, sample_fractal_noise};

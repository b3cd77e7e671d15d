//! Cube-sphere terrain core.
//!
//! Height fields stored as six square faces, droplet erosion that travels
//! across face seams as if they were not there, and a stitching pass that
//! removes the discontinuities left along the cube's edges and corners.

pub mod cancel;
pub mod geometry;
pub mod noise;
pub mod terrain;
pub mod erosion;
pub mod seams;
pub mod export;
pub mod pipeline;

pub use cancel::{CancelToken, Outcome};
pub use geometry::{CubeFaceId, CubeTopology, Direction, FacePoint};
pub use noise::FractalNoiseConfig;
pub use terrain::{CubeMap, HeightField};
pub use erosion::{run_droplets, ErosionParams, ErosionSimulator, ErosionStats};
pub use seams::{SeamOptions, SeamStitcher};
pub use pipeline::{ErosionStage, GenerationStage, HeightmapStage, Pipeline, PipelineError, SeamStage, StageConfig};

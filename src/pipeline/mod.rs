//! Pipeline module for orchestrating generation stages.
//!
//! Provides a trait-based architecture for stages that can be composed
//! into a complete run: noise fill, erosion, seam repair.

mod stage;

pub use stage::{
    ErosionStage, GenerationStage, HeightmapStage, Pipeline, PipelineError, SeamStage, StageConfig, StageId,
};

//! Generation stage trait and pipeline orchestration.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::cancel::CancelToken;
use crate::erosion::{run_droplets, ErosionParams, ErosionSimulator};
use crate::noise::FractalNoiseConfig;
use crate::seams::SeamStitcher;
use crate::terrain::HeightField;

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Initial height field from fractal noise.
    Heightmap,
    /// Droplet erosion.
    Erosion,
    /// Seam and corner repair.
    Seams,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Heightmap => "heightmap",
            StageId::Erosion => "erosion",
            StageId::Seams => "seams",
        }
    }
}

/// Configuration shared by every stage of a run.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    /// Noise configuration for the initial height field.
    pub noise: FractalNoiseConfig,
    /// Checked by long-running stages; cancelling stops the run.
    pub cancel: CancelToken,
}

impl StageConfig {
    /// Creates a new configuration with the given noise settings.
    pub fn with_noise(noise: FractalNoiseConfig) -> Self {
        Self {
            noise,
            cancel: CancelToken::new(),
        }
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
    #[error("Stage '{0}' was cancelled")]
    Cancelled(String),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the height field in place, building upon
/// previous stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, modifying the field in place.
    fn execute(&self, field: &mut HeightField, config: &StageConfig) -> Result<(), PipelineError>;

    /// Optional progress callback for long-running stages.
    ///
    /// # Arguments
    /// * `progress` - Value from 0.0 to 1.0 indicating completion
    fn on_progress(&self, _progress: f32) {
        // Default: do nothing
    }
}

/// Orchestrates generation stages into a complete run.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    config: StageConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: StageConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Token that cancels this pipeline's stages.
    pub fn cancel_token(&self) -> CancelToken {
        self.config.cancel.clone()
    }

    /// Executes all stages in order on the given field.
    pub fn run(&self, field: &mut HeightField) -> Result<(), PipelineError> {
        self.run_with_callbacks(field, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `field` - The height field to generate into
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        field: &mut HeightField,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            if self.config.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled(stage.name().to_string()));
            }

            log::debug!("Running stage '{}' ({}/{})", stage.name(), i + 1, total);
            stage.execute(field, &self.config)?;
            completed.push(stage.id());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Fills the field from fractal noise and normalizes it to [0, 1].
pub struct HeightmapStage;

impl GenerationStage for HeightmapStage {
    fn id(&self) -> StageId {
        StageId::Heightmap
    }

    fn name(&self) -> &str {
        "Heightmap Generation"
    }

    fn execute(&self, field: &mut HeightField, config: &StageConfig) -> Result<(), PipelineError> {
        use crate::terrain::generate_heightmap;

        generate_heightmap(field, &config.noise);
        Ok(())
    }
}

/// Runs a batch of droplets over the whole cube-sphere.
pub struct ErosionStage {
    pub params: ErosionParams,
    pub droplets: u64,
    /// Seed for droplet start positions.
    pub seed: u64,
}

impl ErosionStage {
    pub fn new(params: ErosionParams, droplets: u64, seed: u64) -> Self {
        Self {
            params,
            droplets,
            seed,
        }
    }
}

impl GenerationStage for ErosionStage {
    fn id(&self) -> StageId {
        StageId::Erosion
    }

    fn name(&self) -> &str {
        "Droplet Erosion"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Heightmap]
    }

    fn execute(&self, field: &mut HeightField, config: &StageConfig) -> Result<(), PipelineError> {
        let params = self.params.clamped();
        let max_radius = params.erode_brush_radius.max(params.deposit_brush_radius);
        if max_radius >= field.resolution() as f64 {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                format!(
                    "brush radius {} does not fit on {}x{} faces",
                    max_radius,
                    field.resolution(),
                    field.resolution()
                ),
            ));
        }

        let mut simulator = ErosionSimulator::with_params(params);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let stats = run_droplets(&mut simulator, field, &mut rng, self.droplets, &config.cancel, |p| {
            self.on_progress(p)
        });

        if stats.outcome.is_cancelled() {
            return Err(PipelineError::Cancelled(self.name().to_string()));
        }
        log::debug!("{} of {} droplets stalled on flat ground", stats.stalled, stats.droplets);
        Ok(())
    }
}

/// Stitches the face seams and cube corners.
pub struct SeamStage {
    pub stitcher: SeamStitcher,
}

impl SeamStage {
    pub fn new(stitcher: SeamStitcher) -> Self {
        Self { stitcher }
    }
}

impl GenerationStage for SeamStage {
    fn id(&self) -> StageId {
        StageId::Seams
    }

    fn name(&self) -> &str {
        "Seam Stitching"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Heightmap]
    }

    fn execute(&self, field: &mut HeightField, config: &StageConfig) -> Result<(), PipelineError> {
        if self.stitcher.make_seamless(field, &config.cancel).is_cancelled() {
            return Err(PipelineError::Cancelled(self.name().to_string()));
        }
        Ok(())
    }
}

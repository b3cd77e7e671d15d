//! Height field initialization from fractal noise.

use rayon::prelude::*;

use crate::geometry::FaceCoord;
use crate::noise::{FractalNoiseConfig, sample_fractal_noise};
use super::cube_map::HeightField;

/// Fills every face of `field` with fractal noise and normalizes to [0, 1].
///
/// Faces are generated in parallel; each sample is taken at its pixel
/// centre projected onto the unit sphere.
pub fn generate_heightmap(field: &mut HeightField, config: &FractalNoiseConfig) {
    let resolution = field.resolution();
    let noise = config.build();

    field.par_faces_mut().for_each(|(face_id, heights)| {
        heights.par_iter_mut().enumerate().for_each(|(i, height)| {
            let x = (i as u32) % resolution;
            let y = (i as u32) / resolution;
            let pos = FaceCoord::from_pixel(face_id, x, y, resolution).to_sphere_point();
            *height = sample_fractal_noise(&noise, pos);
        });
    });

    field.normalize();
}

//! PNG export for height fields.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageEncoder;
use thiserror::Error;

use crate::geometry::CubeFaceId;
use crate::terrain::HeightField;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f64, f64),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Height written as black.
    pub min_height: f64,
    /// Height written as white.
    pub max_height: f64,
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Stretches the field's actual height range over the full 16 bits.
    pub fn auto_range(field: &HeightField) -> Self {
        let (min, max) = field.height_range();
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Quantizes one face to 16-bit samples, row-major.
pub fn face_to_u16(field: &HeightField, face: CubeFaceId, options: &PngExportOptions) -> Vec<u16> {
    let range = options.max_height - options.min_height;
    field
        .face(face)
        .iter()
        .map(|&h| {
            let normalized = ((h - options.min_height) / range).clamp(0.0, 1.0);
            (normalized * u16::MAX as f64).round() as u16
        })
        .collect()
}

/// Exports one face as a 16-bit grayscale PNG.
pub fn export_face_png(
    field: &HeightField,
    face: CubeFaceId,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    if options.min_height >= options.max_height {
        return Err(PngExportError::InvalidHeightRange(options.min_height, options.max_height));
    }

    let resolution = field.resolution();
    let pixels = face_to_u16(field, face, options);

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // The encoder takes native-endian samples and swaps them itself.
    encoder.write_image(
        bytemuck::cast_slice(&pixels),
        resolution,
        resolution,
        image::ExtendedColorType::L16,
    )?;

    Ok(())
}

/// Exports all six faces as `{base_name}_{face}.png` in `output_dir`.
pub fn export_field_png(
    field: &HeightField,
    output_dir: &Path,
    base_name: &str,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    std::fs::create_dir_all(output_dir)?;

    for face in CubeFaceId::all() {
        let filename = format!("{}_{}.png", base_name, face.short_name());
        export_face_png(field, face, &output_dir.join(filename), options)?;
    }

    Ok(())
}

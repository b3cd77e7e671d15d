//! Export module for handing finished height fields to image tools.
//!
//! Writes one 16-bit grayscale PNG per cube face.

mod png;

pub use png::{export_face_png, export_field_png, face_to_u16, PngExportError, PngExportOptions};

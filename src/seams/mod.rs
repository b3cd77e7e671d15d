//! Seam repair between cube faces.

mod polyfit;
mod stitcher;

pub use polyfit::{evaluate_polynomial, fit_polynomial};
pub use stitcher::{fix_cube_triplets, SeamOptions, SeamStitcher};

//! Height field storage and initialization.

mod cube_map;
mod heightmap;

pub use cube_map::{CubeMap, HeightField};
pub use heightmap::generate_heightmap;

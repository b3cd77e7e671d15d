//! Cube-sphere geometry module.
//!
//! Face identifiers, the seam-aware addressing used by erosion and seam
//! stitching, and the mapping from face pixels onto the sphere.

mod face;
mod cube_sphere;
pub mod topology;

pub use face::{CubeFaceId, Direction};
pub use cube_sphere::{FaceCoord, face_uv_to_cube, cube_to_sphere};
pub use topology::{CubeEdge, CubeTopology, EdgeTransition, FacePoint, VectorStep, EDGE_TRANSITIONS};

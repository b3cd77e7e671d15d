//! Coordinate conversion utilities for cube-sphere mapping.
//!
//! The face orientation here is the embedding the edge transition table in
//! `topology.rs` was traced from: on every face u grows East and v grows
//! South when the face is viewed from outside the cube.

use glam::Vec3;
use super::face::CubeFaceId;

/// A 2D coordinate within a cube face, with UV in [0, 1] range.
#[derive(Debug, Clone, Copy)]
pub struct FaceCoord {
    /// The cube face this coordinate belongs to.
    pub face: CubeFaceId,
    /// U coordinate in [0, 1] range (East).
    pub u: f32,
    /// V coordinate in [0, 1] range (South).
    pub v: f32,
}

impl FaceCoord {
    /// Creates a new face coordinate.
    pub fn new(face: CubeFaceId, u: f32, v: f32) -> Self {
        Self { face, u, v }
    }

    /// Returns the coordinate of the centre of pixel `(x, y)` on a face of
    /// width `resolution`.
    pub fn from_pixel(face: CubeFaceId, x: u32, y: u32, resolution: u32) -> Self {
        let u = (x as f32 + 0.5) / resolution as f32;
        let v = (y as f32 + 0.5) / resolution as f32;
        Self { face, u, v }
    }

    /// Converts this face coordinate to a point on the unit sphere.
    pub fn to_sphere_point(self) -> Vec3 {
        cube_to_sphere(face_uv_to_cube(self.face, self.u, self.v))
    }
}

/// Converts UV coordinates on a face to a 3D point on the unit cube surface.
///
/// UV coordinates are in [0, 1] range and map to [-1, 1] on the cube face.
/// The cube is right-handed with +Y through `Up` and +Z through `Front`.
pub fn face_uv_to_cube(face: CubeFaceId, u: f32, v: f32) -> Vec3 {
    let s = u * 2.0 - 1.0;
    let t = v * 2.0 - 1.0;

    match face {
        CubeFaceId::Front => Vec3::new(s, -t, 1.0),
        CubeFaceId::Right => Vec3::new(1.0, -t, -s),
        CubeFaceId::Back => Vec3::new(-s, -t, -1.0),
        CubeFaceId::Left => Vec3::new(-1.0, -t, s),
        CubeFaceId::Up => Vec3::new(s, 1.0, t),
        CubeFaceId::Down => Vec3::new(s, -1.0, -t),
    }
}

/// Projects a point on the cube surface radially onto the unit sphere.
pub fn cube_to_sphere(cube_point: Vec3) -> Vec3 {
    cube_point.normalize()
}

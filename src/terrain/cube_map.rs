//! Per-face grids covering the whole cube-sphere.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::{CubeFaceId, CubeTopology, FacePoint};

/// Six equal N×N grids, one per cube face, stored row-major.
///
/// Access is always through a [`FacePoint`] and is bounds-checked: an
/// out-of-range coordinate is an addressing bug and panics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeMap<T> {
    resolution: u32,
    faces: [Vec<T>; 6],
}

/// Height samples in [0, 1] for the six faces.
pub type HeightField = CubeMap<f64>;

impl<T: Copy> CubeMap<T> {
    /// Creates a map with every sample set to `value`.
    pub fn filled(resolution: u32, value: T) -> Self {
        assert!(resolution >= 2, "cube faces need at least 2x2 samples");
        let size = (resolution as usize) * (resolution as usize);
        Self {
            resolution,
            faces: std::array::from_fn(|_| vec![value; size]),
        }
    }

    /// Width and height of every face in samples.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Addressing helper for this map's resolution.
    pub fn topology(&self) -> CubeTopology {
        CubeTopology::new(self.resolution)
    }

    /// Returns the sample at `p`.
    ///
    /// # Panics
    /// Panics if `p` lies outside the face.
    pub fn get(&self, p: FacePoint) -> T {
        self.faces[p.face.index()][self.index(p)]
    }

    /// Sets the sample at `p`.
    ///
    /// # Panics
    /// Panics if `p` lies outside the face.
    pub fn set(&mut self, p: FacePoint, value: T) {
        let i = self.index(p);
        self.faces[p.face.index()][i] = value;
    }

    /// Row-major samples of one face.
    pub fn face(&self, id: CubeFaceId) -> &[T] {
        &self.faces[id.index()]
    }

    /// All faces in [`CubeFaceId::all`] order, for per-face parallel passes.
    pub fn par_faces_mut(&mut self) -> impl ParallelIterator<Item = (CubeFaceId, &mut Vec<T>)> + '_
    where
        T: Send,
    {
        self.faces
            .par_iter_mut()
            .enumerate()
            .map(|(i, face)| (CubeFaceId::all()[i], face))
    }

    /// Returns the total number of samples across all faces.
    pub fn sample_count(&self) -> usize {
        self.faces.iter().map(Vec::len).sum()
    }

    /// Iterates every sample position, face by face in row-major order.
    pub fn points(&self) -> impl Iterator<Item = FacePoint> + '_ {
        let res = self.resolution;
        CubeFaceId::all()
            .into_iter()
            .flat_map(move |face| (0..res).flat_map(move |y| (0..res).map(move |x| FacePoint::new(face, x, y))))
    }

    fn index(&self, p: FacePoint) -> usize {
        assert!(
            p.x < self.resolution && p.y < self.resolution,
            "{:?} is outside a {}x{} face",
            p,
            self.resolution,
            self.resolution
        );
        (p.y as usize) * (self.resolution as usize) + p.x as usize
    }
}

impl CubeMap<f64> {
    /// Adds `delta` to the sample at `p` and clamps the result to [0, 1].
    ///
    /// Returns the change that was actually applied.
    pub fn add_clamped(&mut self, p: FacePoint, delta: f64) -> f64 {
        let old = self.get(p);
        let new = (old + delta).clamp(0.0, 1.0);
        self.set(p, new);
        new - old
    }

    /// Computes the global min and max height values across all faces.
    pub fn height_range(&self) -> (f64, f64) {
        let mut min = f64::MAX;
        let mut max = f64::MIN;

        for face in &self.faces {
            for &height in face {
                min = min.min(height);
                max = max.max(height);
            }
        }

        (min, max)
    }

    /// Linearly rescales all samples so the field spans exactly [0, 1].
    ///
    /// A constant field is set to 0.5.
    pub fn normalize(&mut self) {
        let (min, max) = self.height_range();
        let range = max - min;
        for face in &mut self.faces {
            for h in face.iter_mut() {
                *h = if range > 0.0 { (*h - min) / range } else { 0.5 };
            }
        }
    }

    /// Sum of all samples; erosion moves material around, so this is a
    /// useful conservation diagnostic.
    pub fn total(&self) -> f64 {
        self.faces.iter().flat_map(|f| f.iter()).sum()
    }
}

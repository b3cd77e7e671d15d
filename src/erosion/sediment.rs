//! How eroded material leaves and returns to the terrain.
//!
//! The droplet decides *how much* to erode or deposit at each brushed
//! sample; a [`SedimentModel`] decides what that does to the height field.

use crate::geometry::FacePoint;
use crate::terrain::{CubeMap, HeightField};

/// Strategy for turning brushed erosion/deposition into height changes.
pub trait SedimentModel {
    /// Erodes at most `amount` (> 0) at `p` and returns the material removed.
    fn erode(&mut self, field: &mut HeightField, p: FacePoint, amount: f64) -> f64;

    /// Deposits `amount` (> 0) at `p` and returns the material laid down.
    fn deposit(&mut self, field: &mut HeightField, p: FacePoint, amount: f64) -> f64;
}

/// Homogeneous terrain: erosion and deposition act directly on the heights.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareRock;

impl SedimentModel for BareRock {
    fn erode(&mut self, field: &mut HeightField, p: FacePoint, amount: f64) -> f64 {
        -field.add_clamped(p, -amount)
    }

    fn deposit(&mut self, field: &mut HeightField, p: FacePoint, amount: f64) -> f64 {
        field.add_clamped(p, amount)
    }
}

/// Deposited sediment on top of bedrock of varying hardness.
///
/// Deposits build up a soft layer that erodes at double rate. Once it is
/// gone the remaining erosion budget is scaled by the bedrock's resistance,
/// looked up from the sample's hardness index.
#[derive(Debug, Clone)]
pub struct LayeredSediment {
    soft: CubeMap<f64>,
    hardness: CubeMap<u8>,
    resistance: Vec<f64>,
}

impl LayeredSediment {
    /// `resistance[i]` is the fraction of erosion that hardness class `i`
    /// withstands (0 = erodes freely, 1 = never erodes). Classes beyond the
    /// table use its last entry.
    pub fn new(hardness: CubeMap<u8>, resistance: Vec<f64>) -> Self {
        let soft = CubeMap::filled(hardness.resolution(), 0.0);
        Self {
            soft,
            hardness,
            resistance,
        }
    }

    /// Uniform bedrock of a single hardness class.
    pub fn uniform(resolution: u32, resistance: f64) -> Self {
        Self::new(CubeMap::filled(resolution, 0), vec![resistance])
    }

    /// Thickness of the soft layer at `p`.
    pub fn soft_depth(&self, p: FacePoint) -> f64 {
        self.soft.get(p)
    }

    /// The soft layer overlay for all faces.
    pub fn soft_layer(&self) -> &CubeMap<f64> {
        &self.soft
    }

    fn resistance_at(&self, p: FacePoint) -> f64 {
        let class = self.hardness.get(p) as usize;
        self.resistance
            .get(class)
            .or(self.resistance.last())
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }
}

impl SedimentModel for LayeredSediment {
    fn erode(&mut self, field: &mut HeightField, p: FacePoint, amount: f64) -> f64 {
        let soft = self.soft.get(p);
        let from_soft = soft.min(2.0 * amount);
        let budget = amount - from_soft / 2.0;
        let from_rock = budget * (1.0 - self.resistance_at(p));

        let removed = -field.add_clamped(p, -(from_soft + from_rock));
        self.soft.set(p, soft - from_soft.min(removed));
        removed
    }

    fn deposit(&mut self, field: &mut HeightField, p: FacePoint, amount: f64) -> f64 {
        let added = field.add_clamped(p, amount);
        self.soft.set(p, self.soft.get(p) + added);
        added
    }
}

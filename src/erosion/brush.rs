//! Weighted footprint used to spread erosion and deposition around a droplet.

use std::collections::HashMap;

use glam::DVec2;

use crate::geometry::{CubeTopology, FacePoint};
use crate::terrain::HeightField;

/// Sub-samples per axis when integrating a cell's share of the brush.
const SUBSAMPLES: u32 = 4;

/// A cone-shaped kernel, optionally sharpened by `pointiness`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub radius: f64,
    pub pointiness: f64,
}

impl Brush {
    pub fn new(radius: f64, pointiness: f64) -> Self {
        Self {
            radius: radius.max(0.0),
            pointiness: pointiness.max(0.0),
        }
    }

    /// Weights of every sample the brush touches when centred at `offset`
    /// inside the footprint of `center`. The weights sum to 1.
    ///
    /// Cells are reached through [`CubeTopology::step`], so a brush near a
    /// seam spills onto the neighbouring face. The reach is capped below the
    /// tile width. Offsets that fold onto the same sample near a cube corner
    /// are merged, so each sample appears once. When no sub-sample falls
    /// inside the radius (including radius 0) the whole weight goes to
    /// `center`.
    pub fn weights(&self, topology: &CubeTopology, center: FacePoint, offset: DVec2) -> Vec<(FacePoint, f64)> {
        if self.radius <= 0.0 {
            return vec![(center, 1.0)];
        }

        let max_reach = topology.resolution() as i32 - 1;
        let reach = (self.radius.ceil() as i32).min(max_reach);
        let low = (-reach - 1).max(-max_reach);
        let exponent = 1.0 + self.pointiness;

        let mut cells: Vec<(FacePoint, f64)> = Vec::new();
        let mut slots: HashMap<FacePoint, usize> = HashMap::new();
        let mut total = 0.0;
        for dy in low..=reach {
            for dx in low..=reach {
                let weight = self.cell_weight(DVec2::new(dx as f64, dy as f64) - offset, exponent);
                if weight <= 0.0 {
                    continue;
                }
                let cell = topology.step(center, dx, dy);
                match slots.get(&cell) {
                    Some(&slot) => cells[slot].1 += weight,
                    None => {
                        slots.insert(cell, cells.len());
                        cells.push((cell, weight));
                    }
                }
                total += weight;
            }
        }

        if total <= 0.0 {
            return vec![(center, 1.0)];
        }
        for (_, weight) in &mut cells {
            *weight /= total;
        }
        cells
    }

    /// Mean falloff over the cell whose corner sits at `corner` relative to
    /// the brush centre.
    fn cell_weight(&self, corner: DVec2, exponent: f64) -> f64 {
        let step = 1.0 / SUBSAMPLES as f64;
        let mut sum = 0.0;
        for sy in 0..SUBSAMPLES {
            for sx in 0..SUBSAMPLES {
                let sample = corner + DVec2::new((sx as f64 + 0.5) * step, (sy as f64 + 0.5) * step);
                let falloff = 1.0 - sample.length() / self.radius;
                if falloff > 0.0 {
                    sum += falloff.powf(exponent);
                }
            }
        }
        sum / (SUBSAMPLES * SUBSAMPLES) as f64
    }
}

/// Averages every seam sample in `touched` with its twins on the other
/// faces, so the duplicated samples along an edge agree again after a
/// brush wrote to only one side.
pub fn reconcile_seams(field: &mut HeightField, topology: &CubeTopology, touched: impl IntoIterator<Item = FacePoint>) {
    for p in touched {
        if !topology.is_edge_sample(p) {
            continue;
        }
        let twins = topology.edge_twins(p);
        let sum: f64 = field.get(p) + twins.iter().map(|&t| field.get(t)).sum::<f64>();
        let mean = sum / (twins.len() + 1) as f64;
        field.set(p, mean);
        for t in twins {
            field.set(t, mean);
        }
    }
}

//! Removes discontinuities along the 12 cube edges and at the 8 corners.
//!
//! For every position along an edge, the five samples nearest the seam on
//! each side form a 10-sample profile across it. A quartic is fitted to the
//! eight samples that are not directly on the seam; both seam samples are
//! replaced by the curve's value halfway between them and the others are
//! pulled towards the curve, more strongly the closer they are to the seam.

use glam::DVec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cancel::{CancelToken, Outcome};
use crate::erosion::{ErosionParams, ErosionSimulator};
use crate::geometry::{CubeEdge, CubeTopology, Direction, FacePoint};
use crate::terrain::HeightField;

use super::polyfit::{evaluate_polynomial, fit_polynomial};

/// Samples taken on each side of a seam.
const SIDE: usize = 5;

const PROFILE: usize = 2 * SIDE;

const POLY_DEGREE: usize = 4;

/// Blend weight towards the fitted curve for the profile pairs `(3, 6)`,
/// `(2, 7)`, `(1, 8)` and `(0, 9)`.
const BLEND_WEIGHTS: [f64; SIDE - 1] = [0.8, 0.6, 0.3, 0.1];

/// Options for [`SeamStitcher::make_seamless`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeamOptions {
    /// Only repair the five positions nearest each end of every edge.
    pub corners_only: bool,
    /// Run extra droplets from every face corner after stitching.
    pub erode_corners: bool,
    /// Droplets started at each of the 24 face corners when `erode_corners`
    /// is set.
    pub corner_droplets: u32,
}

impl Default for SeamOptions {
    fn default() -> Self {
        Self {
            corners_only: false,
            erode_corners: false,
            corner_droplets: 4,
        }
    }
}

/// Height writes computed for one edge.
#[derive(Debug, Default)]
struct EdgeFix {
    /// Blended samples off the seam.
    blended: Vec<(FacePoint, f64)>,
    /// The two samples on the seam, per row.
    seam: Vec<(FacePoint, f64)>,
    cancelled: bool,
}

/// Post-process that makes the six faces agree where they meet.
#[derive(Debug, Clone, Default)]
pub struct SeamStitcher {
    options: SeamOptions,
    erosion: ErosionParams,
}

impl SeamStitcher {
    /// `erosion` is used for the corner droplets only.
    pub fn new(options: SeamOptions, erosion: ErosionParams) -> Self {
        Self { options, erosion }
    }

    pub fn options(&self) -> &SeamOptions {
        &self.options
    }

    /// Stitches every edge, then makes each cube corner agree three ways.
    ///
    /// Edges are processed in parallel against the unmodified field and their
    /// results written afterwards in a fixed order, so the result does not
    /// depend on scheduling. On cancellation the rows finished so far are
    /// written and the corner passes are skipped.
    pub fn make_seamless(&self, field: &mut HeightField, token: &CancelToken) -> Outcome {
        let topology = field.topology();
        let n = topology.resolution() as usize;

        if n <= SIDE {
            log::warn!(
                "Resolution {} is too small to stitch {}-sample profiles; only fixing corners",
                n,
                PROFILE
            );
            fix_cube_triplets(field, &topology);
            return Outcome::Completed;
        }

        let edges = topology.cube_edges();
        let fixes: Vec<EdgeFix> = {
            let field = &*field;
            edges
                .par_iter()
                .map(|edge| self.fix_edge(field, &topology, edge, token))
                .collect()
        };
        self.apply_fixes(field, &topology, &fixes, token)
    }

    /// Writes the edge results in order, then runs the corner passes unless
    /// some edge stopped early.
    fn apply_fixes(&self, field: &mut HeightField, topology: &CubeTopology, fixes: &[EdgeFix], token: &CancelToken) -> Outcome {
        let cancelled = fixes.iter().any(|fix| fix.cancelled);
        for fix in fixes {
            for &(p, h) in &fix.blended {
                field.set(p, h);
            }
        }
        // Seam samples last: a sample next to a face corner can sit in the
        // profile of the crossing edge as well.
        for fix in fixes {
            for &(p, h) in &fix.seam {
                field.set(p, h);
            }
        }

        if cancelled {
            log::warn!("Seam stitching cancelled");
            return Outcome::Cancelled;
        }

        fix_cube_triplets(field, topology);
        log::debug!("Stitched {} edges", fixes.len());

        if self.options.erode_corners {
            if self.erode_corners(field, topology, token).is_cancelled() {
                return Outcome::Cancelled;
            }
            fix_cube_triplets(field, topology);
        }

        Outcome::Completed
    }

    fn fix_edge(&self, field: &HeightField, topology: &CubeTopology, edge: &CubeEdge, token: &CancelToken) -> EdgeFix {
        let n = topology.resolution();
        let mut fix = EdgeFix::default();

        for along in 0..n {
            if self.options.corners_only && along >= SIDE as u32 && along < n - SIDE as u32 {
                continue;
            }
            if token.is_cancelled() {
                fix.cancelled = true;
                break;
            }
            let profile = profile_points(topology, edge, along);
            fix_profile(field, &profile, &mut fix);
        }
        fix
    }

    fn erode_corners(&self, field: &mut HeightField, topology: &CubeTopology, token: &CancelToken) -> Outcome {
        let mut simulator = ErosionSimulator::with_params(self.erosion.clone());
        for corner in topology.cube_corners() {
            for p in corner {
                for _ in 0..self.options.corner_droplets {
                    let droplet = simulator.spawn(p, DVec2::ZERO);
                    simulator.run(field, droplet, token);
                    if token.is_cancelled() {
                        return Outcome::Cancelled;
                    }
                }
            }
        }
        Outcome::Completed
    }
}

/// Averages the three samples meeting at each cube corner and writes the
/// average back to all of them.
pub fn fix_cube_triplets(field: &mut HeightField, topology: &CubeTopology) {
    for corner in topology.cube_corners() {
        let mean = corner.iter().map(|&p| field.get(p)).sum::<f64>() / 3.0;
        for p in corner {
            field.set(p, mean);
        }
    }
}

/// The ten samples across `edge` at position `along`, ordered from deep
/// inside `edge.face` (index 0) to deep inside `edge.neighbor` (index 9).
/// Indices 4 and 5 are the seam samples.
fn profile_points(topology: &CubeTopology, edge: &CubeEdge, along: u32) -> [FacePoint; PROFILE] {
    let r = topology.resolution() - 1;
    let seam = match edge.side {
        Direction::West => FacePoint::new(edge.face, 0, along),
        Direction::East => FacePoint::new(edge.face, r, along),
        Direction::North => FacePoint::new(edge.face, along, 0),
        Direction::South => FacePoint::new(edge.face, along, r),
    };
    let (dx, dy) = edge.side.delta();

    std::array::from_fn(|i| {
        // Signed distance from the seam sample, outwards positive.
        let k = i as i32 - (SIDE as i32 - 1);
        topology.step(seam, dx * k, dy * k)
    })
}

fn fix_profile(field: &HeightField, profile: &[FacePoint; PROFILE], fix: &mut EdgeFix) {
    let heights = profile.map(|p| field.get(p));

    // Centre the abscissa between the two seam samples.
    let centre = (PROFILE as f64 - 1.0) / 2.0;
    let (xs, ys): (Vec<f64>, Vec<f64>) = (0..PROFILE)
        .filter(|&i| i != SIDE - 1 && i != SIDE)
        .map(|i| (i as f64 - centre, heights[i]))
        .unzip();

    let Some(curve) = fit_polynomial(&xs, &ys, POLY_DEGREE) else {
        return;
    };

    let seam_height = evaluate_polynomial(&curve, 0.0).clamp(0.0, 1.0);
    fix.seam.push((profile[SIDE - 1], seam_height));
    fix.seam.push((profile[SIDE], seam_height));

    for (distance, &weight) in BLEND_WEIGHTS.iter().enumerate() {
        for i in [SIDE - 2 - distance, SIDE + 1 + distance] {
            let fitted = evaluate_polynomial(&curve, i as f64 - centre);
            let blended = heights[i] * (1.0 - weight) + fitted * weight;
            fix.blended.push((profile[i], blended.clamp(0.0, 1.0)));
        }
    }
}

//! Particle-based hydraulic erosion on the cube-sphere.
//!
//! A droplet carries water, speed and sediment across the surface. At every
//! step it follows the local gradient, picks up material where it has spare
//! capacity and drops it where it has too much. Movement, gradient sampling
//! and brushes all go through [`CubeTopology`], so droplets cross face seams
//! without noticing them.

use glam::DVec2;
use rand::Rng;

use crate::cancel::CancelToken;
use crate::geometry::{CubeFaceId, CubeTopology, FacePoint};
use crate::terrain::HeightField;

use super::brush::{reconcile_seams, Brush};
use super::config::ErosionParams;
use super::sediment::{BareRock, SedimentModel};

/// Largest offset component below 1.0.
const OFFSET_MAX: f64 = 1.0 - f64::EPSILON;

/// Direction vectors shorter than this count as "no slope".
const MIN_DIRECTION: f64 = 1e-12;

/// Mutable state of one droplet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropletState {
    pub point: FacePoint,
    /// Position inside `point`'s footprint, each component in [0, 1).
    pub offset: DVec2,
    /// Unit direction of travel in the current face's frame (zero at spawn).
    pub direction: DVec2,
    pub speed: f64,
    pub water: f64,
    pub sediment: f64,
}

/// Why a droplet stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Ran for `max_droplet_lifetime` steps.
    Lifetime,
    /// Came to rest on perfectly flat ground.
    NoSlope,
    /// Ran out of water before its lifetime was over.
    Evaporated,
    Cancelled,
}

/// What one droplet did to the terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropletReport {
    pub steps: u32,
    pub eroded: f64,
    pub deposited: f64,
    /// Water left when the droplet stopped.
    pub water: f64,
    /// Sediment still carried when the droplet stopped.
    pub sediment: f64,
    /// Sample the droplet stopped on.
    pub point: FacePoint,
    pub termination: Termination,
}

/// Runs droplets over a [`HeightField`].
///
/// `M` decides how brushed material changes the heights; the default
/// [`BareRock`] edits them directly.
#[derive(Debug, Clone)]
pub struct ErosionSimulator<M = BareRock> {
    params: ErosionParams,
    model: M,
    erode_brush: Brush,
    deposit_brush: Brush,
    water_modifier: f64,
}

impl ErosionSimulator<BareRock> {
    pub fn with_params(params: ErosionParams) -> Self {
        Self::new(params, BareRock)
    }
}

impl<M: SedimentModel> ErosionSimulator<M> {
    /// Creates a simulator. `params` are clamped into their valid ranges.
    pub fn new(params: ErosionParams, model: M) -> Self {
        let params = params.clamped();
        Self {
            erode_brush: Brush::new(params.erode_brush_radius, params.brush_pointiness),
            deposit_brush: Brush::new(params.deposit_brush_radius, params.brush_pointiness),
            water_modifier: params.water_modifier(),
            params,
            model,
        }
    }

    pub fn params(&self) -> &ErosionParams {
        &self.params
    }

    pub fn into_model(self) -> M {
        self.model
    }

    /// Fresh droplet at rest with the configured water and speed.
    pub fn spawn(&self, point: FacePoint, offset: DVec2) -> DropletState {
        DropletState {
            point,
            offset: offset.clamp(DVec2::ZERO, DVec2::splat(OFFSET_MAX)),
            direction: DVec2::ZERO,
            speed: self.params.initial_speed,
            water: self.params.initial_water,
            sediment: 0.0,
        }
    }

    /// Drops one droplet on the field and runs it to completion.
    ///
    /// With `start == None` the droplet starts at a uniformly random face,
    /// sample and offset drawn from `rng`.
    pub fn erode<R: Rng + ?Sized>(
        &mut self,
        field: &mut HeightField,
        rng: &mut R,
        token: &CancelToken,
        start: Option<(FacePoint, DVec2)>,
    ) -> DropletReport {
        let (point, offset) = start.unwrap_or_else(|| random_start(rng, field.resolution()));
        let droplet = self.spawn(point, offset);
        self.run(field, droplet, token)
    }

    /// Runs an already spawned droplet until it terminates.
    pub fn run(&mut self, field: &mut HeightField, mut droplet: DropletState, token: &CancelToken) -> DropletReport {
        let topology = field.topology();
        let p = self.params.clone();
        let mut report = DropletReport {
            steps: 0,
            eroded: 0.0,
            deposited: 0.0,
            water: droplet.water,
            sediment: droplet.sediment,
            point: droplet.point,
            termination: Termination::Lifetime,
        };

        for _ in 0..p.max_droplet_lifetime {
            if token.is_cancelled() {
                report.termination = Termination::Cancelled;
                break;
            }
            if droplet.water <= 0.0 {
                report.termination = Termination::Evaporated;
                break;
            }

            let (old_height, gradient) = height_and_gradient(field, &topology, droplet.point, droplet.offset);

            let direction = droplet.direction * p.inertia - gradient * (1.0 - p.inertia);
            let length = direction.length();
            if length < MIN_DIRECTION {
                report.termination = Termination::NoSlope;
                break;
            }
            droplet.direction = direction / length;

            let old_point = droplet.point;
            let old_offset = droplet.offset;
            advance(&topology, &mut droplet);

            let new_height = sample_height(field, &topology, droplet.point, droplet.offset);
            let delta = new_height - old_height;
            let capacity = (-delta * droplet.speed * droplet.water * p.sediment_capacity_factor)
                .max(p.min_sediment_capacity);

            if droplet.sediment > capacity || delta > 0.0 {
                let amount = if delta > 0.0 {
                    delta.min(droplet.sediment)
                } else {
                    (droplet.sediment - capacity) * p.deposit_speed
                };
                if amount > 0.0 {
                    let added = self.deposit(field, &topology, old_point, old_offset, amount);
                    droplet.sediment -= added;
                    report.deposited += added;
                }
            } else {
                let amount = ((capacity - droplet.sediment) * p.erode_speed).min(-delta);
                if amount > 0.0 {
                    let removed = self.erode_at(field, &topology, old_point, old_offset, amount);
                    droplet.sediment += removed;
                    report.eroded += removed;
                }
            }

            // The brush may have moved the ground under the old position.
            let delta = new_height - sample_height(field, &topology, old_point, old_offset);
            let energy = droplet.speed * droplet.speed - delta * p.gravity;
            if energy >= 0.0 {
                droplet.speed = energy.sqrt();
            } else {
                droplet.direction = -droplet.direction;
                droplet.speed = (delta * p.gravity).sqrt();
            }

            droplet.water = (droplet.water * (1.0 - p.evaporate_speed) - self.water_modifier).max(0.0);
            report.steps += 1;
        }

        report.water = droplet.water;
        report.sediment = droplet.sediment;
        report.point = droplet.point;
        report
    }

    fn deposit(
        &mut self,
        field: &mut HeightField,
        topology: &CubeTopology,
        point: FacePoint,
        offset: DVec2,
        amount: f64,
    ) -> f64 {
        let weights = self.deposit_brush.weights(topology, point, offset);
        let added: f64 = weights
            .iter()
            .map(|&(cell, weight)| self.model.deposit(field, cell, amount * weight))
            .sum();
        reconcile_seams(field, topology, weights.into_iter().map(|(cell, _)| cell));
        added
    }

    fn erode_at(
        &mut self,
        field: &mut HeightField,
        topology: &CubeTopology,
        point: FacePoint,
        offset: DVec2,
        amount: f64,
    ) -> f64 {
        let weights = self.erode_brush.weights(topology, point, offset);
        let removed: f64 = weights
            .iter()
            .map(|&(cell, weight)| self.model.erode(field, cell, amount * weight))
            .sum();
        reconcile_seams(field, topology, weights.into_iter().map(|(cell, _)| cell));
        removed
    }
}

/// Uniformly random start sample and offset.
pub fn random_start<R: Rng + ?Sized>(rng: &mut R, resolution: u32) -> (FacePoint, DVec2) {
    let face = CubeFaceId::all()[rng.gen_range(0..6)];
    let x = rng.gen_range(0..resolution);
    let y = rng.gen_range(0..resolution);
    let offset = DVec2::new(rng.gen::<f64>(), rng.gen::<f64>());
    (FacePoint::new(face, x, y), offset)
}

/// Moves the droplet one unit along its direction, crossing seams as needed.
fn advance(topology: &CubeTopology, droplet: &mut DropletState) {
    let moved = droplet.offset + droplet.direction;
    let cells = moved.floor();
    let offset = (moved - cells).clamp(DVec2::ZERO, DVec2::splat(OFFSET_MAX));
    let (dx, dy) = (cells.x as i32, cells.y as i32);

    if dx == 0 && dy == 0 {
        droplet.offset = offset;
        return;
    }
    let step = topology.step_with_vector(droplet.point, offset, droplet.direction, dx, dy);
    droplet.point = step.point;
    droplet.offset = step.offset;
    droplet.direction = step.velocity;
}

/// Heights at the four nodes of the cell whose top-left node is `p`:
/// `[p, east, south, south-east]`.
fn cell_corners(field: &HeightField, topology: &CubeTopology, p: FacePoint) -> [f64; 4] {
    let [_, east, _, south] = topology.neighbors(p);
    let south_east = topology.step(p, 1, 1);
    [field.get(p), field.get(east), field.get(south), field.get(south_east)]
}

/// Bilinear height at `offset` inside `p`'s cell.
pub(crate) fn sample_height(field: &HeightField, topology: &CubeTopology, p: FacePoint, offset: DVec2) -> f64 {
    let [nw, ne, sw, se] = cell_corners(field, topology, p);
    let (u, v) = (offset.x, offset.y);
    nw * (1.0 - u) * (1.0 - v) + ne * u * (1.0 - v) + sw * (1.0 - u) * v + se * u * v
}

/// Bilinear height and its gradient at `offset` inside `p`'s cell.
pub(crate) fn height_and_gradient(
    field: &HeightField,
    topology: &CubeTopology,
    p: FacePoint,
    offset: DVec2,
) -> (f64, DVec2) {
    let [nw, ne, sw, se] = cell_corners(field, topology, p);
    let (u, v) = (offset.x, offset.y);
    let gradient = DVec2::new(
        (ne - nw) * (1.0 - v) + (se - sw) * v,
        (sw - nw) * (1.0 - u) + (se - ne) * u,
    );
    let height = nw * (1.0 - u) * (1.0 - v) + ne * u * (1.0 - v) + sw * (1.0 - u) * v + se * u * v;
    (height, gradient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erosion::sediment::LayeredSediment;
    use crate::geometry::FaceCoord;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Slopes down towards +x on every face.
    fn ramp(resolution: u32) -> HeightField {
        let mut field = HeightField::filled(resolution, 0.0);
        for p in field.points().collect::<Vec<_>>() {
            field.set(p, 0.9 - 0.8 * p.x as f64 / (resolution - 1) as f64);
        }
        field
    }

    fn bumpy(resolution: u32, seed: u32) -> HeightField {
        let mut field = HeightField::filled(resolution, 0.0);
        crate::terrain::generate_heightmap(&mut field, &crate::noise::FractalNoiseConfig::with_seed(seed));
        field
    }

    #[test]
    fn test_flat_field_is_untouched() {
        let mut field = HeightField::filled(16, 0.5);
        let mut sim = ErosionSimulator::with_params(ErosionParams::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let token = CancelToken::new();

        for _ in 0..50 {
            let report = sim.erode(&mut field, &mut rng, &token, None);
            assert_eq!(report.termination, Termination::NoSlope);
            assert_eq!(report.steps, 0);
        }
        assert!(field.points().all(|p| field.get(p) == 0.5));
    }

    #[test]
    fn test_zero_water_changes_nothing() {
        let mut field = bumpy(16, 3);
        let before = field.clone();
        let params = ErosionParams {
            initial_water: 0.0,
            ..Default::default()
        };
        let mut sim = ErosionSimulator::with_params(params);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let report = sim.erode(&mut field, &mut rng, &CancelToken::new(), None);
        assert_eq!(report.termination, Termination::Evaporated);
        assert_eq!(report.steps, 0);
        assert_eq!(field, before);
    }

    #[test]
    fn test_heights_stay_in_unit_range() {
        let mut field = bumpy(16, 7);
        let params = ErosionParams {
            erode_speed: 1.0,
            deposit_speed: 1.0,
            sediment_capacity_factor: 64.0,
            ..Default::default()
        };
        let mut sim = ErosionSimulator::with_params(params);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let token = CancelToken::new();

        for _ in 0..300 {
            sim.erode(&mut field, &mut rng, &token, None);
        }
        assert!(field.points().all(|p| (0.0..=1.0).contains(&field.get(p))));
    }

    #[test]
    fn test_water_runs_out_on_last_step() {
        // A long even ramp keeps the droplet moving for its whole lifetime.
        let mut field = ramp(64);
        let mut sim = ErosionSimulator::with_params(ErosionParams {
            max_droplet_lifetime: 20,
            ..Default::default()
        });
        let start = (FacePoint::new(CubeFaceId::Front, 2, 32), DVec2::splat(0.5));
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let report = sim.erode(&mut field, &mut rng, &CancelToken::new(), Some(start));
        assert_eq!(report.termination, Termination::Lifetime);
        assert_eq!(report.steps, 20);
        assert!(report.water.abs() < 1e-9, "water left: {}", report.water);
    }

    #[test]
    fn test_sediment_clipped_at_ceiling_stays_carried() {
        // Front's western half sits just below the ceiling, the rest of the
        // cube at it. An uphill step deposits onto both halves.
        let mut field = HeightField::filled(16, 1.0);
        for y in 0..16 {
            for x in 0..8 {
                field.set(FacePoint::new(CubeFaceId::Front, x, y), 0.95);
            }
        }
        let mut sim = ErosionSimulator::with_params(ErosionParams {
            inertia: 1.0,
            max_droplet_lifetime: 1,
            ..Default::default()
        });
        let mut droplet = sim.spawn(FacePoint::new(CubeFaceId::Front, 7, 8), DVec2::splat(0.5));
        droplet.direction = DVec2::X;
        droplet.sediment = 0.5;

        let report = sim.run(&mut field, droplet, &CancelToken::new());
        assert_eq!(report.steps, 1);
        assert_eq!(report.eroded, 0.0);
        assert!(report.deposited > 0.0);
        assert!(report.deposited < 0.025 - 1e-6, "{:?}", report);
        assert!((report.sediment - (0.5 - report.deposited)).abs() < 1e-12);
        assert!(field.points().all(|p| field.get(p) <= 1.0));
    }

    #[test]
    fn test_droplet_erodes_downhill() {
        let mut field = ramp(32);
        let mut sim = ErosionSimulator::with_params(ErosionParams::default());
        let start = (FacePoint::new(CubeFaceId::Front, 4, 16), DVec2::splat(0.5));
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let report = sim.erode(&mut field, &mut rng, &CancelToken::new(), Some(start));
        assert!(report.steps > 0);
        assert!(report.eroded > 0.0);
    }

    #[test]
    fn test_droplet_crosses_seam() {
        // Lowest point at the centre of Right; the slope runs continuously
        // across the Front/Right seam.
        let mut field = HeightField::filled(16, 0.0);
        for p in field.points().collect::<Vec<_>>() {
            let pos = FaceCoord::from_pixel(p.face, p.x, p.y, 16).to_sphere_point();
            field.set(p, 0.5 - 0.4 * pos.x as f64);
        }
        let mut sim = ErosionSimulator::with_params(ErosionParams::default());
        let droplet = sim.spawn(FacePoint::new(CubeFaceId::Front, 12, 8), DVec2::splat(0.5));

        let report = sim.run(&mut field, droplet, &CancelToken::new());
        assert!(report.steps >= 4, "{:?}", report);
        assert_eq!(report.point.face, CubeFaceId::Right);
    }

    #[test]
    fn test_advance_hands_over_to_neighbor_face() {
        let topology = CubeTopology::new(8);
        let mut droplet = DropletState {
            point: FacePoint::new(CubeFaceId::Up, 0, 3),
            offset: DVec2::new(0.2, 0.5),
            direction: DVec2::new(-1.0, 0.0),
            speed: 1.0,
            water: 1.0,
            sediment: 0.0,
        };
        advance(&topology, &mut droplet);
        assert_eq!(droplet.point.face, CubeFaceId::Left);
        assert!(droplet.offset.cmpge(DVec2::ZERO).all() && droplet.offset.cmplt(DVec2::ONE).all());
        // West on Up is South on Left.
        assert!((droplet.direction - DVec2::new(0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_cancelled_droplet_does_nothing() {
        let mut field = bumpy(16, 9);
        let before = field.clone();
        let token = CancelToken::new();
        token.cancel();
        let mut sim = ErosionSimulator::with_params(ErosionParams::default());
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let report = sim.erode(&mut field, &mut rng, &token, None);
        assert_eq!(report.termination, Termination::Cancelled);
        assert_eq!(field, before);
    }

    #[test]
    fn test_same_seed_same_result() {
        let run = |seed| {
            let mut field = bumpy(16, 11);
            let mut sim = ErosionSimulator::with_params(ErosionParams::default());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let token = CancelToken::new();
            for _ in 0..100 {
                sim.erode(&mut field, &mut rng, &token, None);
            }
            field
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_layered_sediment_records_deposits() {
        let mut field = bumpy(16, 13);
        let model = LayeredSediment::uniform(16, 0.5);
        let mut sim = ErosionSimulator::new(ErosionParams::default(), model);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let token = CancelToken::new();

        let mut deposited = 0.0;
        for _ in 0..200 {
            deposited += sim.erode(&mut field, &mut rng, &token, None).deposited;
        }
        let soft = sim.into_model();
        if deposited > 0.0 {
            assert!(soft.soft_layer().total() > 0.0);
        }
        assert!(soft.soft_layer().points().all(|p| soft.soft_depth(p) >= 0.0));
    }

    #[test]
    fn test_gradient_on_ramp() {
        let field = ramp(16);
        let topology = field.topology();
        let (height, gradient) =
            height_and_gradient(&field, &topology, FacePoint::new(CubeFaceId::Front, 5, 5), DVec2::splat(0.5));
        let step = 0.8 / 15.0;
        assert!((gradient.x + step).abs() < 1e-12);
        assert!(gradient.y.abs() < 1e-12);
        assert!((height - (0.9 - step * 5.5)).abs() < 1e-12);
    }
}

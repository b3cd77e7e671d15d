//! Runs a batch of droplets with progress reporting.

use rand::Rng;

use crate::cancel::{CancelToken, Outcome};
use crate::terrain::HeightField;

use super::droplet::{ErosionSimulator, Termination};
use super::sediment::SedimentModel;

/// Totals over a batch of droplets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErosionStats {
    pub outcome: Outcome,
    /// Droplets that ran (including one interrupted by cancellation).
    pub droplets: u64,
    pub steps: u64,
    pub eroded: f64,
    pub deposited: f64,
    /// Droplets that stopped on flat ground.
    pub stalled: u64,
}

impl Default for ErosionStats {
    fn default() -> Self {
        Self {
            outcome: Outcome::Completed,
            droplets: 0,
            steps: 0,
            eroded: 0.0,
            deposited: 0.0,
            stalled: 0,
        }
    }
}

/// Simulates `count` droplets, one after another, from random starts.
///
/// `on_progress` receives the completed fraction roughly every percent and
/// once more at the end. The batch stops early when `token` is cancelled;
/// terrain changes made so far are kept.
pub fn run_droplets<M, R, F>(
    simulator: &mut ErosionSimulator<M>,
    field: &mut HeightField,
    rng: &mut R,
    count: u64,
    token: &CancelToken,
    mut on_progress: F,
) -> ErosionStats
where
    M: SedimentModel,
    R: Rng + ?Sized,
    F: FnMut(f32),
{
    let report_every = (count / 100).max(1);
    let mut stats = ErosionStats::default();

    log::debug!(
        "Running {} droplets on a {}x{} cube-sphere",
        count,
        field.resolution(),
        field.resolution()
    );

    for i in 0..count {
        if token.is_cancelled() {
            stats.outcome = Outcome::Cancelled;
            break;
        }

        let report = simulator.erode(field, rng, token, None);
        stats.droplets += 1;
        stats.steps += report.steps as u64;
        stats.eroded += report.eroded;
        stats.deposited += report.deposited;
        match report.termination {
            Termination::NoSlope => stats.stalled += 1,
            Termination::Cancelled => {
                stats.outcome = Outcome::Cancelled;
                break;
            }
            Termination::Lifetime | Termination::Evaporated => {}
        }

        if (i + 1) % report_every == 0 {
            on_progress((i + 1) as f32 / count as f32);
        }
    }

    if stats.outcome.is_cancelled() {
        log::warn!("Erosion cancelled after {} of {} droplets", stats.droplets, count);
    } else {
        on_progress(1.0);
        log::info!(
            "Erosion finished: {} droplets, {} steps, eroded {:.4}, deposited {:.4}",
            stats.droplets,
            stats.steps,
            stats.eroded,
            stats.deposited
        );
    }

    stats
}

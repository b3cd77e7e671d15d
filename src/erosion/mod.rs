//! Droplet-based hydraulic erosion over the whole cube-sphere.
//!
//! [`ErosionSimulator`] runs single droplets; [`run_droplets`] runs a batch
//! of them with progress reporting. Droplets, their gradient samples and
//! their brushes address the terrain through
//! [`CubeTopology`](crate::geometry::CubeTopology), so face seams are
//! invisible to the simulation.

mod brush;
mod config;
mod driver;
mod droplet;
mod sediment;

pub use brush::{reconcile_seams, Brush};
pub use config::{ConfigError, ErosionParams, MIN_SEDIMENT_CAPACITY};
pub use driver::{run_droplets, ErosionStats};
pub use droplet::{random_start, DropletReport, DropletState, ErosionSimulator, Termination};
pub use sediment::{BareRock, LayeredSediment, SedimentModel};

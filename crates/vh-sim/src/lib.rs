//! Lumped thermal simulation of a resistively heated water vessel.
//!
//! Provides:
//! - Heater parameters and vessel/insulation geometry
//! - Linear wall loss and loss profiles
//! - Ice injection with latent heat and mass accounting
//! - Seeded random ambient drops
//! - Forward Euler, RK4 and adaptive Dormand–Prince integration
//! - A run driver with hazard ceiling and time-to-target tracking

pub mod error;
pub mod heat_loss;
pub mod injection;
pub mod integrator;
pub mod model;
pub mod params;
pub mod perturbation;
pub mod sim;
pub mod state;
pub mod step;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use heat_loss::{LossProfileRow, loss_profile, loss_rate};
pub use injection::{InjectionEvent, InjectionMassBasis, InjectionRecord, apply_injection};
pub use integrator::{Dopri5, ForwardEuler, Integrator, IntegratorType, RK4};
pub use model::{
    HeaterModel, TransientModel, lossless_temperature_c, lossless_time_to_reach_s,
    lossy_temperature_c,
};
pub use params::{Insulation, ThermalParameters, VesselGeometry};
pub use perturbation::{PerturbationEvent, PerturbationSpec, PerturbationStats};
pub use sim::{SimInputs, SimOptions, SimRecord, Termination, TimeGrid, TimeSeries, run_sim};
pub use state::FluidState;

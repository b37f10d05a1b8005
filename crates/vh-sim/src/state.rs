//! Lumped fluid state advanced by the integrator.

use serde::Serialize;

/// Temperature, mass and clock of the fluid in the vessel.
///
/// Mass only changes through injections; the integrator never persists it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FluidState {
    /// Temperature (°C)
    pub temperature_c: f64,
    /// Current fluid mass (kg)
    pub mass_kg: f64,
    /// Simulated time (s)
    pub time_s: f64,
}

impl FluidState {
    pub fn initial(temperature_c: f64, mass_kg: f64) -> Self {
        Self {
            temperature_c,
            mass_kg,
            time_s: 0.0,
        }
    }
}

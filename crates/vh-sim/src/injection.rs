//! Discrete cold-mass injection (e.g. ice dropped into the vessel).

use serde::{Deserialize, Serialize};
use vh_core::{ensure_finite, ensure_non_negative, ensure_positive};

use crate::error::SimResult;
use crate::state::FluidState;

/// Scheduled addition of mass that melts and mixes into the fluid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InjectionEvent {
    /// Scheduled time (s)
    pub time_s: f64,
    /// Added mass (kg)
    pub mass_kg: f64,
    /// Temperature of the added mass (°C)
    pub temperature_c: f64,
    /// Latent heat absorbed by the phase change (J/kg). Zero for a liquid.
    pub latent_heat_j_per_kg: f64,
}

impl InjectionEvent {
    /// Ice at 0 °C.
    pub fn ice(time_s: f64, mass_kg: f64) -> Self {
        Self {
            time_s,
            mass_kg,
            temperature_c: 0.0,
            latent_heat_j_per_kg: vh_core::units::constants::ICE_LATENT_HEAT_J_PER_KG,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_non_negative(self.time_s, "injection time")?;
        ensure_positive(self.mass_kg, "injection mass")?;
        ensure_finite(self.temperature_c, "injection temperature")?;
        ensure_non_negative(self.latent_heat_j_per_kg, "injection latent heat")?;
        Ok(())
    }

    /// Energy the added mass draws from the fluid to melt and reach `fluid_c` (J).
    pub fn absorbed_energy_j(&self, fluid_c: f64, specific_heat_j_per_kg_k: f64) -> f64 {
        self.mass_kg * self.latent_heat_j_per_kg
            + self.mass_kg * specific_heat_j_per_kg_k * (fluid_c - self.temperature_c)
    }
}

/// Which mass the absorbed energy is spread over when computing the drop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionMassBasis {
    /// Fluid mass plus the added mass (closed energy balance of the mixture).
    #[default]
    Mixture,
    /// Fluid mass before the addition, as in the historical scenario runs.
    PreInjection,
}

/// What an applied injection did to the fluid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InjectionRecord {
    /// Step time the injection was applied at (s)
    pub applied_at_s: f64,
    /// Time it was scheduled for (s)
    pub scheduled_s: f64,
    pub temperature_before_c: f64,
    pub temperature_after_c: f64,
    pub drop_c: f64,
    pub mass_after_kg: f64,
}

/// Apply `event` to `state`, lowering its temperature and adding the mass.
pub fn apply_injection(
    state: FluidState,
    event: &InjectionEvent,
    specific_heat_j_per_kg_k: f64,
    basis: InjectionMassBasis,
) -> (FluidState, InjectionRecord) {
    let basis_mass_kg = match basis {
        InjectionMassBasis::Mixture => state.mass_kg + event.mass_kg,
        InjectionMassBasis::PreInjection => state.mass_kg,
    };
    let drop_c = event.absorbed_energy_j(state.temperature_c, specific_heat_j_per_kg_k)
        / (basis_mass_kg * specific_heat_j_per_kg_k);

    let next = FluidState {
        temperature_c: state.temperature_c - drop_c,
        mass_kg: state.mass_kg + event.mass_kg,
        time_s: state.time_s,
    };
    let record = InjectionRecord {
        applied_at_s: state.time_s,
        scheduled_s: event.time_s,
        temperature_before_c: state.temperature_c,
        temperature_after_c: next.temperature_c,
        drop_c,
        mass_after_kg: next.mass_kg,
    };
    (next, record)
}

/// Injection events ordered by time, each fired once.
///
/// An event fires on the first step whose start time is within half a step
/// of its scheduled time or later, i.e. the grid point nearest to it.
#[derive(Clone, Debug, Default)]
pub struct InjectionSchedule {
    pending: Vec<InjectionEvent>,
}

impl InjectionSchedule {
    pub fn new(mut events: Vec<InjectionEvent>) -> SimResult<Self> {
        for event in &events {
            event.validate()?;
        }
        events.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        Ok(Self { pending: events })
    }

    /// Remove and return the events due for a step starting at `t` of length `dt`.
    pub fn take_due(&mut self, t: f64, dt: f64) -> Vec<InjectionEvent> {
        let due = self
            .pending
            .iter()
            .take_while(|e| t >= e.time_s - 0.5 * dt)
            .count();
        self.pending.drain(..due).collect()
    }

    /// Events that never fired.
    pub fn remaining(&self) -> &[InjectionEvent] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

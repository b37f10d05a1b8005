//! TransientModel trait and the lumped heater model.

use crate::heat_loss::loss_rate;
use crate::params::ThermalParameters;

/// Trait for scalar transient models, dT/dt = f(t, T).
pub trait TransientModel {
    /// Compute the temperature derivative (K/s) at time `t_s`.
    fn rhs(&self, t_s: f64, temperature_c: f64) -> f64;
}

/// Heater, loss and fluid frozen over one output interval.
///
/// Ambient and mass may change between intervals (perturbations, injections),
/// never inside one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaterModel {
    pub power_w: f64,
    pub loss_coeff_w_per_k: f64,
    pub ambient_c: f64,
    /// Current mass times specific heat (J/K)
    pub heat_capacity_j_per_k: f64,
}

impl HeaterModel {
    pub fn new(params: &ThermalParameters, mass_kg: f64, ambient_c: f64) -> Self {
        Self {
            power_w: params.power_w(),
            loss_coeff_w_per_k: params.loss_coeff_w_per_k,
            ambient_c,
            heat_capacity_j_per_k: mass_kg * params.specific_heat_j_per_kg_k,
        }
    }

    /// Heater power minus wall loss (W).
    pub fn net_power_w(&self, temperature_c: f64) -> f64 {
        self.power_w - loss_rate(temperature_c, self.ambient_c, self.loss_coeff_w_per_k)
    }
}

impl TransientModel for HeaterModel {
    fn rhs(&self, _t_s: f64, temperature_c: f64) -> f64 {
        self.net_power_w(temperature_c) / self.heat_capacity_j_per_k
    }
}

/// Closed-form temperature with no wall loss: T0 + P·t/(m·c).
pub fn lossless_temperature_c(params: &ThermalParameters, initial_c: f64, t_s: f64) -> f64 {
    initial_c + params.power_w() * t_s / params.heat_capacity_j_per_k()
}

/// Closed-form temperature under constant power, loss and ambient.
///
/// T(t) = T∞ + (T0 − T∞)·exp(−t/τ) with T∞ = T_amb + P/k and τ = m·c/k.
/// Falls back to the lossless form when k = 0.
pub fn lossy_temperature_c(params: &ThermalParameters, initial_c: f64, t_s: f64) -> f64 {
    if params.loss_coeff_w_per_k <= 0.0 {
        return lossless_temperature_c(params, initial_c, t_s);
    }
    let t_inf = params.equilibrium_c();
    t_inf + (initial_c - t_inf) * (-t_s / params.time_constant_s()).exp()
}

/// Time the lossless heater takes to go from `initial_c` to `target_c` (s).
pub fn lossless_time_to_reach_s(params: &ThermalParameters, initial_c: f64, target_c: f64) -> f64 {
    params.energy_to_heat_j(initial_c, target_c) / params.power_w()
}

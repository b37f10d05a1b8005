//! Newtonian heat loss through the vessel wall.

use serde::Serialize;

/// Heat-loss rate (W) for a fluid at `t_fluid_c` in surroundings at `t_ambient_c`.
///
/// Positive is a net loss. The sign flips when ambient is warmer than the
/// fluid, which then gains heat through the wall.
#[inline]
pub fn loss_rate(t_fluid_c: f64, t_ambient_c: f64, k_loss_w_per_k: f64) -> f64 {
    k_loss_w_per_k * (t_fluid_c - t_ambient_c)
}

/// One row of a loss table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LossProfileRow {
    /// Fluid minus ambient (K)
    pub delta_t_k: f64,
    pub loss_w: f64,
    /// Loss as a share of heater power (%)
    pub percent_of_power: f64,
}

/// Tabulate the loss against heater power for a set of temperature differentials.
pub fn loss_profile(k_loss_w_per_k: f64, power_w: f64, deltas_k: &[f64]) -> Vec<LossProfileRow> {
    deltas_k
        .iter()
        .map(|&delta_t_k| {
            let loss_w = loss_rate(delta_t_k, 0.0, k_loss_w_per_k);
            let percent_of_power = if power_w > 0.0 {
                loss_w / power_w * 100.0
            } else {
                f64::NAN
            };
            LossProfileRow {
                delta_t_k,
                loss_w,
                percent_of_power,
            }
        })
        .collect()
}

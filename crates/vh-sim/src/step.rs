//! One integration step: events, then the interval solve.
//!
//! `(FluidState, PerturbationState) -> (FluidState, PerturbationState)` for a
//! single interval, with no hidden state. The driver in [`crate::sim`] folds
//! it over the time grid.

use rand::Rng;

use crate::error::SimResult;
use crate::injection::{InjectionEvent, InjectionMassBasis, InjectionRecord, apply_injection};
use crate::integrator::IntegratorType;
use crate::model::HeaterModel;
use crate::params::ThermalParameters;
use crate::perturbation::{PerturbationSpec, PerturbationState, PerturbationTick};
use crate::state::FluidState;

/// Inputs that stay fixed for the whole run.
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    pub params: &'a ThermalParameters,
    pub perturbation: Option<&'a PerturbationSpec>,
    pub integrator: IntegratorType,
    pub injection_basis: InjectionMassBasis,
}

/// Result of advancing one interval.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub fluid: FluidState,
    pub perturbation: PerturbationState,
    /// Ambient the interval was integrated against (°C)
    pub ambient_c: f64,
    pub tick: PerturbationTick,
    pub injections: Vec<InjectionRecord>,
}

/// Advance `fluid` over `[fluid.time_s, fluid.time_s + dt_s]`.
///
/// Order within the step:
/// 1. due injections are applied to the state at the step start
/// 2. the perturbation countdown ticks and, if idle, draws from `rng`
/// 3. the interval is integrated with the resulting ambient and mass
pub fn step<R: Rng + ?Sized>(
    ctx: &StepContext<'_>,
    fluid: FluidState,
    perturbation: PerturbationState,
    due: &[InjectionEvent],
    dt_s: f64,
    rng: &mut R,
) -> SimResult<StepOutcome> {
    let t_s = fluid.time_s;

    let mut fluid = fluid;
    let mut injections = Vec::with_capacity(due.len());
    for event in due {
        let (next, record) = apply_injection(
            fluid,
            event,
            ctx.params.specific_heat_j_per_kg_k,
            ctx.injection_basis,
        );
        fluid = next;
        injections.push(record);
    }

    let (perturbation, tick) = match ctx.perturbation {
        Some(spec) => perturbation.advance(spec, t_s, dt_s, rng),
        None => (perturbation, PerturbationTick::default()),
    };
    let ambient_c = perturbation.ambient_c(ctx.params.ambient_c);

    let model = HeaterModel::new(ctx.params, fluid.mass_kg, ambient_c);
    let temperature_c = ctx
        .integrator
        .step(&model, t_s, fluid.temperature_c, dt_s)?;

    Ok(StepOutcome {
        fluid: FluidState {
            temperature_c,
            mass_kg: fluid.mass_kg,
            time_s: t_s + dt_s,
        },
        perturbation,
        ambient_c,
        tick,
        injections,
    })
}

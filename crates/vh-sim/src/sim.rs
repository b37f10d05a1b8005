//! Simulation runner and result recording.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vh_core::ensure_finite;

use crate::error::{SimError, SimResult};
use crate::injection::{InjectionEvent, InjectionMassBasis, InjectionRecord, InjectionSchedule};
use crate::integrator::IntegratorType;
use crate::params::ThermalParameters;
use crate::perturbation::{PerturbationEvent, PerturbationSpec, PerturbationState};
use crate::state::FluidState;
use crate::step::{StepContext, step};

/// Default hazard ceiling (°C): boiling water at sea level.
pub const DEFAULT_HAZARD_CEILING_C: f64 = 100.0;

/// Output instants of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGrid {
    /// `0, dt, 2·dt, …` up to and including `t_end` when it lands on the grid.
    Uniform { dt_s: f64, t_end_s: f64 },
    /// Strictly increasing sample times; intervals may differ.
    Explicit(Vec<f64>),
}

impl TimeGrid {
    pub fn uniform(dt_s: f64, t_end_s: f64) -> Self {
        Self::Uniform { dt_s, t_end_s }
    }

    /// Materialize the sample times, at most `max_steps + 2` of them.
    ///
    /// The one point past the step budget lets the driver tell a grid cut
    /// short by the limit from one that ends exactly on it.
    pub fn points(&self, max_steps: usize) -> SimResult<Vec<f64>> {
        let cap = max_steps.saturating_add(1);
        match self {
            Self::Uniform { dt_s, t_end_s } => {
                let dt = ensure_finite(*dt_s, "time step")?;
                let t_end = ensure_finite(*t_end_s, "simulation horizon")?;
                if dt <= 0.0 {
                    return Err(SimError::InvalidArg {
                        what: "dt must be positive",
                    });
                }
                if t_end < 0.0 {
                    return Err(SimError::InvalidArg {
                        what: "t_end must be non-negative",
                    });
                }
                // Multiply instead of accumulating so t_end lands exactly.
                let n = ((t_end / dt + 1e-9).floor() as usize).min(cap);
                Ok((0..=n).map(|i| i as f64 * dt).collect())
            }
            Self::Explicit(points) => {
                if points.is_empty() {
                    return Err(SimError::InvalidArg {
                        what: "time grid must not be empty",
                    });
                }
                for &t in points {
                    ensure_finite(t, "time grid point")?;
                }
                if points.windows(2).any(|w| w[1] <= w[0]) {
                    return Err(SimError::InvalidArg {
                        what: "time grid must be strictly increasing",
                    });
                }
                Ok(points.iter().copied().take(cap.saturating_add(1)).collect())
            }
        }
    }
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self::uniform(1.0, 360.0)
    }
}

/// Options for simulation runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimOptions {
    pub grid: TimeGrid,
    /// Integrator type (default: ForwardEuler)
    pub integrator: IntegratorType,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Stop once the fluid exceeds this temperature (°C)
    pub hazard_ceiling_c: Option<f64>,
    /// Report the first time the fluid reaches this temperature (°C)
    pub target_c: Option<f64>,
    pub injection_basis: InjectionMassBasis,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            grid: TimeGrid::default(),
            integrator: IntegratorType::default(),
            max_steps: 1_000_000,
            record_every: 1,
            hazard_ceiling_c: Some(DEFAULT_HAZARD_CEILING_C),
            target_c: None,
            injection_basis: InjectionMassBasis::default(),
        }
    }
}

/// Everything that describes the physical scenario of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimInputs {
    pub params: ThermalParameters,
    /// Fluid temperature at the first grid point (°C)
    pub initial_c: f64,
    #[serde(default)]
    pub injections: Vec<InjectionEvent>,
    #[serde(default)]
    pub perturbation: Option<PerturbationSpec>,
}

impl SimInputs {
    pub fn new(params: ThermalParameters, initial_c: f64) -> Self {
        Self {
            params,
            initial_c,
            injections: Vec::new(),
            perturbation: None,
        }
    }

    pub fn with_injection(mut self, event: InjectionEvent) -> Self {
        self.injections.push(event);
        self
    }

    pub fn with_perturbation(mut self, spec: PerturbationSpec) -> Self {
        self.perturbation = Some(spec);
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        self.params.validate()?;
        ensure_finite(self.initial_c, "initial temperature")?;
        for event in &self.injections {
            event.validate()?;
        }
        if let Some(spec) = &self.perturbation {
            spec.validate()?;
        }
        Ok(())
    }
}

impl Default for SimInputs {
    fn default() -> Self {
        Self::new(ThermalParameters::default(), 20.0)
    }
}

/// Why the run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// The whole grid was integrated.
    Completed,
    /// The fluid exceeded the hazard ceiling; the series ends at that sample.
    HazardCeiling { time_s: f64, temperature_c: f64 },
    /// The `max_steps` safety limit was hit.
    MaxSteps { time_s: f64 },
}

impl Termination {
    pub fn is_truncated(&self) -> bool {
        !matches!(self, Self::Completed)
    }
}

/// Ordered `(time, temperature)` pairs.
pub type TimeSeries = Vec<(f64, f64)>;

/// Record of simulation results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimRecord {
    /// Time points (s)
    pub t: Vec<f64>,
    /// Fluid temperature at each time point (°C)
    pub temperature_c: Vec<f64>,
    /// Ambient over the interval ending at each time point; the first entry is the baseline (°C)
    pub ambient_c: Vec<f64>,
    /// Fluid mass at each time point (kg)
    pub mass_kg: Vec<f64>,
    pub perturbations: Vec<PerturbationEvent>,
    pub injections: Vec<InjectionRecord>,
    /// Scheduled injections the grid never reached
    pub unapplied_injections: Vec<InjectionEvent>,
    pub termination: Termination,
    /// First time the fluid reached the target temperature (s)
    pub time_to_target_s: Option<f64>,
}

impl SimRecord {
    pub fn series(&self) -> TimeSeries {
        self.t
            .iter()
            .copied()
            .zip(self.temperature_c.iter().copied())
            .collect()
    }

    pub fn ambient_series(&self) -> TimeSeries {
        self.t
            .iter()
            .copied()
            .zip(self.ambient_c.iter().copied())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn final_temperature_c(&self) -> Option<f64> {
        self.temperature_c.last().copied()
    }

    pub fn peak_temperature_c(&self) -> Option<f64> {
        self.temperature_c.iter().copied().reduce(f64::max)
    }

    /// Linear interpolation of the recorded temperature at `t_s`.
    pub fn temperature_at(&self, t_s: f64) -> Option<f64> {
        let idx = self.t.partition_point(|&t| t < t_s);
        if idx < self.t.len() && self.t[idx] == t_s {
            return Some(self.temperature_c[idx]);
        }
        if idx == 0 || idx >= self.t.len() {
            return None;
        }
        let (t0, t1) = (self.t[idx - 1], self.t[idx]);
        let (y0, y1) = (self.temperature_c[idx - 1], self.temperature_c[idx]);
        Some(y0 + (y1 - y0) * (t_s - t0) / (t1 - t0))
    }

    fn push(&mut self, fluid: &FluidState, ambient_c: f64) {
        self.t.push(fluid.time_s);
        self.temperature_c.push(fluid.temperature_c);
        self.ambient_c.push(ambient_c);
        self.mass_kg.push(fluid.mass_kg);
    }
}

/// Run a heating simulation over the configured time grid.
///
/// Configuration errors are returned before any step is taken. Reaching the
/// hazard ceiling is not an error: the record ends at the first sample above
/// it and `termination` says so.
pub fn run_sim(inputs: &SimInputs, opts: &SimOptions) -> SimResult<SimRecord> {
    inputs.validate()?;
    opts.integrator.validate()?;
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }
    if let Some(ceiling) = opts.hazard_ceiling_c {
        ensure_finite(ceiling, "hazard ceiling")?;
    }
    let grid = opts.grid.points(opts.max_steps)?;

    let params = &inputs.params;
    debug!(
        power_w = params.power_w(),
        mass_kg = params.mass_kg,
        loss_w_per_k = params.loss_coeff_w_per_k,
        ambient_c = params.ambient_c,
        steps = grid.len().saturating_sub(1),
        integrator = ?opts.integrator,
        "starting heating run"
    );

    let ctx = StepContext {
        params,
        perturbation: inputs.perturbation.as_ref(),
        integrator: opts.integrator,
        injection_basis: opts.injection_basis,
    };
    let mut schedule = InjectionSchedule::new(inputs.injections.clone())?;
    let mut rng = StdRng::seed_from_u64(inputs.perturbation.map_or(0, |p| p.seed));

    let mut fluid = FluidState {
        temperature_c: inputs.initial_c,
        mass_kg: params.mass_kg,
        time_s: grid[0],
    };
    let mut perturbation = PerturbationState::default();

    let mut record = SimRecord {
        t: Vec::with_capacity(grid.len() / opts.record_every + 2),
        temperature_c: Vec::with_capacity(grid.len() / opts.record_every + 2),
        ambient_c: Vec::with_capacity(grid.len() / opts.record_every + 2),
        mass_kg: Vec::with_capacity(grid.len() / opts.record_every + 2),
        perturbations: Vec::new(),
        injections: Vec::new(),
        unapplied_injections: Vec::new(),
        termination: Termination::Completed,
        time_to_target_s: None,
    };
    record.push(&fluid, params.ambient_c);
    let reached = |temperature_c: f64| opts.target_c.is_some_and(|target| temperature_c >= target);
    if reached(fluid.temperature_c) {
        record.time_to_target_s = Some(fluid.time_s);
    }
    let exceeds =
        |temperature_c: f64| opts.hazard_ceiling_c.is_some_and(|ceiling| temperature_c > ceiling);
    if exceeds(fluid.temperature_c) {
        warn!(
            time_s = fluid.time_s,
            temperature_c = fluid.temperature_c,
            "initial state above hazard ceiling; nothing integrated"
        );
        record.termination = Termination::HazardCeiling {
            time_s: fluid.time_s,
            temperature_c: fluid.temperature_c,
        };
    }
    let steps = if record.termination.is_truncated() {
        &grid[..1]
    } else {
        &grid[..]
    };

    let mut step_count = 0;
    let mut recorded_last = true;
    for window in steps.windows(2) {
        if step_count >= opts.max_steps {
            warn!(time_s = fluid.time_s, max_steps = opts.max_steps, "step limit reached");
            record.termination = Termination::MaxSteps {
                time_s: fluid.time_s,
            };
            break;
        }

        let (t0, t1) = (window[0], window[1]);
        let dt = t1 - t0;
        let due = schedule.take_due(t0, dt);
        let outcome = step(&ctx, fluid, perturbation, &due, dt, &mut rng)?;

        for applied in &outcome.injections {
            info!(
                time_s = applied.applied_at_s,
                scheduled_s = applied.scheduled_s,
                drop_c = applied.drop_c,
                mass_kg = applied.mass_after_kg,
                "injection applied"
            );
        }
        record.injections.extend_from_slice(&outcome.injections);
        if outcome.tick.expired {
            if let Some(last) = record.perturbations.last_mut() {
                last.end_s = t0;
            }
        }
        if let Some(event) = outcome.tick.started {
            info!(
                onset_s = event.onset_s,
                drop_c = event.drop_c,
                duration_steps = event.duration_steps,
                "ambient perturbation started"
            );
            record.perturbations.push(event);
        }

        fluid = outcome.fluid;
        fluid.time_s = t1;
        perturbation = outcome.perturbation;
        step_count += 1;

        if record.time_to_target_s.is_none() && reached(fluid.temperature_c) {
            record.time_to_target_s = Some(t1);
        }

        let hazard = exceeds(fluid.temperature_c);

        recorded_last = hazard || step_count % opts.record_every == 0;
        if recorded_last {
            record.push(&fluid, outcome.ambient_c);
        }

        if hazard {
            warn!(
                time_s = t1,
                temperature_c = fluid.temperature_c,
                "hazard ceiling exceeded; truncating series"
            );
            record.termination = Termination::HazardCeiling {
                time_s: t1,
                temperature_c: fluid.temperature_c,
            };
            break;
        }
    }

    // Always record final state
    if !recorded_last {
        record.push(&fluid, perturbation.ambient_c(params.ambient_c));
    }

    // An event still running when the series ends is cut at the last sample
    if perturbation.is_active() {
        if let Some(last) = record.perturbations.last_mut() {
            last.end_s = last.end_s.min(fluid.time_s);
        }
    }

    record.unapplied_injections = schedule.remaining().to_vec();
    for event in &record.unapplied_injections {
        warn!(scheduled_s = event.time_s, "injection scheduled beyond the simulated horizon");
    }

    debug!(
        samples = record.len(),
        final_c = fluid.temperature_c,
        termination = ?record.termination,
        "heating run finished"
    );
    Ok(record)
}

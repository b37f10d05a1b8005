//! Stochastic ambient-temperature drops.
//!
//! Each step with no active event draws one Bernoulli trial. On success a
//! magnitude and a duration are drawn, in that order, from the same stream:
//!
//! 1. trial: `u ~ U[0, 1)`, fires when `u < probability_per_step`
//! 2. magnitude: `min_drop + (max_drop - min_drop) * U[0, 1)`
//! 3. duration: integer steps, `U{min_duration, max_duration}` inclusive
//!
//! Changing that order changes every trace produced under a given seed.
//!
//! The event lowers ambient for exactly `duration_steps` integration steps.
//! The countdown is the only exclusion mechanism: no trial is drawn while it
//! is non-zero, so events never overlap.

use rand::Rng;
use serde::{Deserialize, Serialize};
use vh_core::{ensure_finite, ensure_non_negative};

use crate::error::{SimError, SimResult};

/// Configuration of the random ambient drops.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerturbationSpec {
    /// Chance of an event starting on any idle step, in [0, 1]
    pub probability_per_step: f64,
    /// Smallest ambient drop (K)
    pub min_drop_c: f64,
    /// Largest ambient drop (K)
    pub max_drop_c: f64,
    /// Shortest event, in steps
    pub min_duration_steps: u32,
    /// Longest event, in steps
    pub max_duration_steps: u32,
    /// Seed of the random stream
    pub seed: u64,
}

impl Default for PerturbationSpec {
    fn default() -> Self {
        Self {
            probability_per_step: 1.0 / 300.0,
            min_drop_c: 5.0,
            max_drop_c: 50.0,
            min_duration_steps: 5,
            max_duration_steps: 30,
            seed: 42,
        }
    }
}

impl PerturbationSpec {
    pub fn validate(&self) -> SimResult<()> {
        let p = ensure_finite(self.probability_per_step, "perturbation probability")?;
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::InvalidArg {
                what: "perturbation probability must be within [0, 1]",
            });
        }
        ensure_non_negative(self.min_drop_c, "minimum ambient drop")?;
        ensure_finite(self.max_drop_c, "maximum ambient drop")?;
        if self.max_drop_c < self.min_drop_c {
            return Err(SimError::InvalidArg {
                what: "maximum ambient drop is below the minimum",
            });
        }
        if self.min_duration_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "perturbation duration must be at least one step",
            });
        }
        if self.max_duration_steps < self.min_duration_steps {
            return Err(SimError::InvalidArg {
                what: "maximum perturbation duration is below the minimum",
            });
        }
        Ok(())
    }
}

/// A drawn ambient excursion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PerturbationEvent {
    /// Start time (s)
    pub onset_s: f64,
    /// Ambient drop below baseline (K)
    pub drop_c: f64,
    pub duration_steps: u32,
    /// Time the baseline came back (s); onset + duration on a uniform grid
    pub end_s: f64,
}

impl PerturbationEvent {
    pub fn duration_s(&self) -> f64 {
        self.end_s - self.onset_s
    }

    /// Half-open `[onset, end)` overlap test.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.onset_s < other.end_s && other.onset_s < self.end_s
    }
}

/// Countdown and active drop, threaded through the step function.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerturbationState {
    /// Steps the current event still covers, including the current one
    pub remaining_steps: u32,
    pub drop_c: f64,
}

/// What happened to the perturbation on one step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerturbationTick {
    /// The previous event ended at the start of this step.
    pub expired: bool,
    pub started: Option<PerturbationEvent>,
}

impl PerturbationState {
    pub fn is_active(&self) -> bool {
        self.remaining_steps > 0
    }

    /// Ambient seen by the fluid while this state holds.
    pub fn ambient_c(&self, baseline_c: f64) -> f64 {
        if self.is_active() {
            baseline_c - self.drop_c
        } else {
            baseline_c
        }
    }

    /// Advance the countdown for a step starting at `t_s` and, when idle,
    /// draw for a new event.
    pub fn advance<R: Rng + ?Sized>(
        self,
        spec: &PerturbationSpec,
        t_s: f64,
        dt_s: f64,
        rng: &mut R,
    ) -> (Self, PerturbationTick) {
        let mut next = self;
        let mut tick = PerturbationTick::default();

        if next.remaining_steps > 0 {
            next.remaining_steps -= 1;
            if next.remaining_steps == 0 {
                next.drop_c = 0.0;
                tick.expired = true;
            }
        }

        if next.remaining_steps == 0 {
            let trial: f64 = rng.r#gen();
            if trial < spec.probability_per_step {
                let drop_c =
                    spec.min_drop_c + (spec.max_drop_c - spec.min_drop_c) * rng.r#gen::<f64>();
                let duration_steps =
                    rng.gen_range(spec.min_duration_steps..=spec.max_duration_steps);
                next = Self {
                    remaining_steps: duration_steps,
                    drop_c,
                };
                tick.started = Some(PerturbationEvent {
                    onset_s: t_s,
                    drop_c,
                    duration_steps,
                    end_s: t_s + f64::from(duration_steps) * dt_s,
                });
            }
        }

        (next, tick)
    }
}

/// Summary of a perturbation log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PerturbationStats {
    pub count: usize,
    pub mean_drop_c: f64,
    pub max_drop_c: f64,
    pub mean_duration_s: f64,
    pub total_duration_s: f64,
}

impl PerturbationStats {
    pub fn from_events(events: &[PerturbationEvent]) -> Self {
        if events.is_empty() {
            return Self::default();
        }
        let n = events.len() as f64;
        let total_duration_s: f64 = events.iter().map(PerturbationEvent::duration_s).sum();
        Self {
            count: events.len(),
            mean_drop_c: events.iter().map(|e| e.drop_c).sum::<f64>() / n,
            max_drop_c: events.iter().map(|e| e.drop_c).fold(f64::MIN, f64::max),
            mean_duration_s: total_duration_s / n,
            total_duration_s,
        }
    }
}

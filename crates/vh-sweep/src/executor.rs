//! Sweep execution: one heating run per sampled value.
//!
//! Runs share nothing, so they execute on the rayon pool. Results come back in
//! sample order regardless of scheduling.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use vh_sim::{SimError, SimInputs, SimOptions, SimRecord, Termination, run_sim};

use crate::distribution::{ParameterField, SweepSpec, sample_variants};
use crate::error::SweepError;

/// Outcome of one variant.
#[derive(Debug)]
pub struct VariantRun {
    /// Sampled value of the swept field
    pub value: f64,
    /// Trajectory, or why the run could not be carried out
    pub outcome: Result<SimRecord, SimError>,
}

impl VariantRun {
    pub fn record(&self) -> Option<&SimRecord> {
        self.outcome.as_ref().ok()
    }

    pub fn summary(&self) -> VariantSummary {
        match &self.outcome {
            Ok(record) => VariantSummary {
                value: self.value,
                final_temperature_c: record.final_temperature_c(),
                peak_temperature_c: record.peak_temperature_c(),
                time_to_target_s: record.time_to_target_s,
                termination: Some(record.termination),
                error: None,
            },
            Err(e) => VariantSummary {
                value: self.value,
                final_temperature_c: None,
                peak_temperature_c: None,
                time_to_target_s: None,
                termination: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Per-variant figures for comparison tables.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantSummary {
    pub value: f64,
    pub final_temperature_c: Option<f64>,
    pub peak_temperature_c: Option<f64>,
    pub time_to_target_s: Option<f64>,
    pub termination: Option<Termination>,
    pub error: Option<String>,
}

/// Result of a parameter sweep.
#[derive(Debug)]
pub struct SweepResult {
    /// Field that was swept
    pub field: ParameterField,
    /// Runs in sample order, excluded values omitted
    pub runs: Vec<VariantRun>,
    /// Sampled values that were not simulated
    pub excluded: Vec<f64>,
    /// Number of runs that produced a trajectory
    pub num_successful: usize,
    /// Number of runs rejected or aborted
    pub num_failed: usize,
}

impl SweepResult {
    /// Sampled values that were simulated, in order.
    pub fn values(&self) -> Vec<f64> {
        self.runs.iter().map(|r| r.value).collect()
    }

    pub fn summaries(&self) -> Vec<VariantSummary> {
        self.runs.iter().map(VariantRun::summary).collect()
    }

    /// Successful trajectories paired with their sampled value.
    pub fn records(&self) -> impl Iterator<Item = (f64, &SimRecord)> {
        self.runs
            .iter()
            .filter_map(|r| r.record().map(|rec| (r.value, rec)))
    }

    /// Number of runs cut short by the hazard ceiling.
    pub fn num_hazard(&self) -> usize {
        self.records()
            .filter(|(_, rec)| matches!(rec.termination, Termination::HazardCeiling { .. }))
            .count()
    }
}

/// Run `base` once per admissible value of `spec`.
///
/// A variant that fails validation or hits the hazard ceiling is recorded
/// and the sweep carries on. Excluded draws are listed, never raised; only a
/// bad sweep definition is an error.
pub fn run_sweep(
    base: &SimInputs,
    spec: &SweepSpec,
    opts: &SimOptions,
) -> Result<SweepResult, SweepError> {
    let variants = sample_variants(spec)?;
    if variants.accepted.is_empty() {
        warn!(
            sweep = %spec,
            excluded = variants.excluded.len(),
            "every sampled value was excluded; nothing to simulate"
        );
    }
    debug!(
        sweep = %spec,
        variants = variants.accepted.len(),
        "starting sweep"
    );

    let runs: Vec<VariantRun> = variants
        .accepted
        .par_iter()
        .map(|&value| VariantRun {
            value,
            outcome: run_sim(&spec.field.apply(base, value), opts),
        })
        .collect();

    let num_successful = runs.iter().filter(|r| r.outcome.is_ok()).count();
    let num_failed = runs.len() - num_successful;
    let result = SweepResult {
        field: spec.field,
        runs,
        excluded: variants.excluded,
        num_successful,
        num_failed,
    };

    info!(
        field = %spec.field,
        successful = result.num_successful,
        failed = result.num_failed,
        excluded = result.excluded.len(),
        hazard = result.num_hazard(),
        "sweep complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use vh_sim::{ThermalParameters, TimeGrid};

    fn base() -> SimInputs {
        SimInputs::new(ThermalParameters::default(), 20.0)
    }

    fn short_opts() -> SimOptions {
        SimOptions {
            grid: TimeGrid::uniform(5.0, 300.0),
            target_c: Some(80.0),
            ..SimOptions::default()
        }
    }

    #[test]
    fn voltage_family_preserves_order() {
        let spec = SweepSpec {
            field: ParameterField::Voltage,
            distribution: Distribution::Uniform {
                low: 4.0,
                high: 12.0,
                n: 5,
            },
        };
        let result = run_sweep(&base(), &spec, &short_opts()).unwrap();
        assert_eq!(result.values(), vec![4.0, 6.0, 8.0, 10.0, 12.0]);
        assert_eq!(result.num_successful, 5);

        // Higher voltage, hotter water.
        let finals: Vec<f64> = result
            .summaries()
            .iter()
            .map(|s| s.final_temperature_c.unwrap())
            .collect();
        assert!(finals.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn failed_variant_does_not_stop_the_sweep() {
        // Every variant inherits the invalid mass and fails validation.
        let mut broken = base();
        broken.params.mass_kg = -1.0;
        let spec = SweepSpec {
            field: ParameterField::Voltage,
            distribution: Distribution::Uniform {
                low: 10.0,
                high: 12.0,
                n: 3,
            },
        };
        let result = run_sweep(&broken, &spec, &short_opts()).unwrap();
        assert_eq!(result.num_failed, 3);
        assert!(result.summaries().iter().all(|s| s.error.is_some()));
    }

    #[test]
    fn all_excluded_yields_empty_result() {
        let spec = SweepSpec {
            field: ParameterField::Mass,
            distribution: Distribution::Uniform {
                low: -2.0,
                high: -1.0,
                n: 4,
            },
        };
        let result = run_sweep(&base(), &spec, &short_opts()).unwrap();
        assert!(result.runs.is_empty());
        assert_eq!(result.excluded.len(), 4);
        assert_eq!(result.excluded.first(), Some(&-2.0));
        assert_eq!(result.excluded.last(), Some(&-1.0));
        assert_eq!(result.num_successful, 0);
        assert_eq!(result.num_failed, 0);
    }
}

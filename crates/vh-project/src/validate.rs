//! Scenario validation logic.

use crate::schema::{
    FluidDef, HeaterDef, InjectionDef, InsulationDef, PerturbationDef, Scenario, SimulationDef,
    SweepDef, VesselDef,
};
use std::collections::HashSet;
use vh_sim::IntegratorType;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    validate_heater(&scenario.heater)?;
    validate_vessel(&scenario.vessel)?;
    validate_insulation(&scenario.insulation, &scenario.vessel)?;
    validate_fluid(&scenario.fluid)?;
    validate_simulation(&scenario.simulation)?;

    for (idx, injection) in scenario.injections.iter().enumerate() {
        validate_injection(idx, injection)?;
    }
    if let Some(perturbation) = &scenario.perturbation {
        validate_perturbation(perturbation)?;
    }

    let mut sweep_ids = HashSet::new();
    for sweep in &scenario.sweeps {
        if !sweep_ids.insert(&sweep.id) {
            return Err(ValidationError::DuplicateId {
                id: sweep.id.clone(),
                context: "sweeps".to_string(),
            });
        }
        validate_sweep(sweep)?;
    }

    Ok(())
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, value, "must be non-negative and finite"));
    }
    Ok(())
}

fn require_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(invalid(field, value, "must be finite"));
    }
    Ok(())
}

fn validate_heater(heater: &HeaterDef) -> Result<(), ValidationError> {
    require_non_negative("heater voltage_v", heater.voltage_v)?;
    require_positive("heater resistance_ohm", heater.resistance_ohm)
}

fn validate_vessel(vessel: &VesselDef) -> Result<(), ValidationError> {
    match vessel {
        VesselDef::Cylinder {
            diameter_cm,
            height_cm,
        } => {
            require_positive("vessel diameter_cm", *diameter_cm)?;
            require_positive("vessel height_cm", *height_cm)
        }
        VesselDef::Mass { mass_kg } => require_positive("vessel mass_kg", *mass_kg),
    }
}

fn validate_insulation(
    insulation: &InsulationDef,
    vessel: &VesselDef,
) -> Result<(), ValidationError> {
    match insulation {
        InsulationDef::Layer {
            thickness_cm,
            conductivity_w_per_m_k,
        } => {
            if matches!(vessel, VesselDef::Mass { .. }) {
                return Err(ValidationError::Unsupported {
                    feature: "insulation layer on a mass-only vessel".to_string(),
                    reason: "a layer needs the cylinder surface; give loss_coeff_w_per_k instead"
                        .to_string(),
                });
            }
            require_positive("insulation thickness_cm", *thickness_cm)?;
            require_non_negative("insulation conductivity_w_per_m_k", *conductivity_w_per_m_k)
        }
        InsulationDef::Coefficient { loss_coeff_w_per_k } => {
            require_non_negative("insulation loss_coeff_w_per_k", *loss_coeff_w_per_k)
        }
    }
}

fn validate_fluid(fluid: &FluidDef) -> Result<(), ValidationError> {
    require_positive("fluid specific_heat_j_per_kg_k", fluid.specific_heat_j_per_kg_k)?;
    require_positive("fluid density_kg_per_l", fluid.density_kg_per_l)?;
    require_finite("fluid initial_temperature_c", fluid.initial_temperature_c)?;
    require_finite("fluid ambient_temperature_c", fluid.ambient_temperature_c)
}

fn validate_simulation(sim: &SimulationDef) -> Result<(), ValidationError> {
    require_positive("simulation dt_s", sim.dt_s)?;
    require_non_negative("simulation t_end_s", sim.t_end_s)?;
    if let Some(target) = sim.target_temperature_c {
        require_finite("simulation target_temperature_c", target)?;
    }
    if let Some(ceiling) = sim.hazard_ceiling_c {
        require_finite("simulation hazard_ceiling_c", ceiling)?;
    }
    if sim.record_every == 0 {
        return Err(invalid("simulation record_every", 0, "must be at least 1"));
    }
    if sim.max_steps == 0 {
        return Err(invalid("simulation max_steps", 0, "must be at least 1"));
    }
    if let IntegratorType::Dopri5 { abs_tol, rel_tol } = sim.integrator {
        require_positive("simulation integrator abs_tol", abs_tol)?;
        require_positive("simulation integrator rel_tol", rel_tol)?;
    }
    Ok(())
}

fn validate_injection(idx: usize, injection: &InjectionDef) -> Result<(), ValidationError> {
    require_non_negative(&format!("injection[{idx}] time_s"), injection.time_s)?;
    require_positive(&format!("injection[{idx}] mass_kg"), injection.mass_kg)?;
    require_finite(&format!("injection[{idx}] temperature_c"), injection.temperature_c)?;
    require_non_negative(
        &format!("injection[{idx}] latent_heat_j_per_kg"),
        injection.latent_heat_j_per_kg,
    )
}

fn validate_perturbation(p: &PerturbationDef) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&p.probability_per_step) {
        return Err(invalid(
            "perturbation probability_per_step",
            p.probability_per_step,
            "must be within [0, 1]",
        ));
    }
    require_non_negative("perturbation min_drop_c", p.min_drop_c)?;
    require_finite("perturbation max_drop_c", p.max_drop_c)?;
    if p.max_drop_c < p.min_drop_c {
        return Err(invalid(
            "perturbation max_drop_c",
            p.max_drop_c,
            "must not be below min_drop_c",
        ));
    }
    if p.min_duration_steps == 0 {
        return Err(invalid(
            "perturbation min_duration_steps",
            0,
            "must be at least 1",
        ));
    }
    if p.max_duration_steps < p.min_duration_steps {
        return Err(invalid(
            "perturbation max_duration_steps",
            p.max_duration_steps,
            "must not be below min_duration_steps",
        ));
    }
    Ok(())
}

fn validate_sweep(sweep: &SweepDef) -> Result<(), ValidationError> {
    sweep
        .distribution
        .validate()
        .map_err(|e| ValidationError::InvalidValue {
            field: format!("sweep '{}' distribution", sweep.id),
            value: sweep.distribution.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vh_sweep::{Distribution, ParameterField};

    #[test]
    fn reference_scenario_is_valid() {
        validate_scenario(&Scenario::default()).unwrap();
    }

    #[test]
    fn rejects_zero_resistance() {
        let mut scenario = Scenario::default();
        scenario.heater.resistance_ohm = 0.0;
        let err = validate_scenario(&scenario).unwrap_err();
        assert!(err.to_string().contains("resistance_ohm"));
    }

    #[test]
    fn rejects_layer_without_geometry() {
        let scenario = Scenario {
            vessel: VesselDef::Mass { mass_kg: 0.75 },
            ..Scenario::default()
        };
        assert!(matches!(
            validate_scenario(&scenario),
            Err(ValidationError::Unsupported { .. })
        ));
    }

    #[test]
    fn rejects_future_version() {
        let scenario = Scenario {
            version: crate::migrate::LATEST_VERSION + 1,
            ..Scenario::default()
        };
        assert!(matches!(
            validate_scenario(&scenario),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_bad_probability() {
        let scenario = Scenario {
            perturbation: Some(PerturbationDef {
                probability_per_step: 1.5,
                ..PerturbationDef::default()
            }),
            ..Scenario::default()
        };
        assert!(validate_scenario(&scenario).is_err());
    }

    #[test]
    fn rejects_duplicate_sweep_ids() {
        let sweep = SweepDef {
            id: "volts".to_string(),
            field: ParameterField::Voltage,
            distribution: Distribution::Uniform {
                low: 10.0,
                high: 14.0,
                n: 3,
            },
        };
        let scenario = Scenario {
            sweeps: vec![sweep.clone(), sweep],
            ..Scenario::default()
        };
        assert!(matches!(
            validate_scenario(&scenario),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn rejects_empty_sweep() {
        let scenario = Scenario {
            sweeps: vec![SweepDef {
                id: "none".to_string(),
                field: ParameterField::Mass,
                distribution: Distribution::Uniform {
                    low: 0.5,
                    high: 1.0,
                    n: 0,
                },
            }],
            ..Scenario::default()
        };
        assert!(validate_scenario(&scenario).is_err());
    }

    #[test]
    fn rejects_negative_injection_mass() {
        let scenario = Scenario {
            injections: vec![InjectionDef {
                time_s: 50.0,
                mass_kg: -0.04,
                temperature_c: 0.0,
                latent_heat_j_per_kg: 334_000.0,
            }],
            ..Scenario::default()
        };
        let err = validate_scenario(&scenario).unwrap_err();
        assert!(err.to_string().contains("injection[0] mass_kg"));
    }
}

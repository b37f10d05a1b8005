//! Conversion from scenario definitions to simulation inputs.

use vh_core::units::{cm, w_per_m_k};
use vh_sim::{
    InjectionEvent, Insulation, PerturbationSpec, SimInputs, SimOptions, ThermalParameters,
    TimeGrid, VesselGeometry,
};
use vh_sweep::SweepSpec;

use crate::ProjectResult;
use crate::schema::{InjectionDef, InsulationDef, PerturbationDef, Scenario, VesselDef};
use crate::validate::validate_scenario;

impl Scenario {
    /// Vessel geometry, when the scenario describes one.
    pub fn geometry(&self) -> Option<VesselGeometry> {
        match self.vessel {
            VesselDef::Cylinder {
                diameter_cm,
                height_cm,
            } => Some(VesselGeometry {
                diameter: cm(diameter_cm),
                height: cm(height_cm),
                density_kg_per_l: self.fluid.density_kg_per_l,
            }),
            VesselDef::Mass { .. } => None,
        }
    }

    pub fn mass_kg(&self) -> f64 {
        match self.vessel {
            VesselDef::Cylinder { .. } => self.geometry().map_or(0.0, |g| g.mass_kg()),
            VesselDef::Mass { mass_kg } => mass_kg,
        }
    }

    /// Loss coefficient (W/K), from the insulation layer or given directly.
    pub fn loss_coeff_w_per_k(&self) -> f64 {
        match (&self.insulation, self.geometry()) {
            (InsulationDef::Coefficient { loss_coeff_w_per_k }, _) => *loss_coeff_w_per_k,
            (
                InsulationDef::Layer {
                    thickness_cm,
                    conductivity_w_per_m_k,
                },
                Some(geometry),
            ) => Insulation {
                thickness: cm(*thickness_cm),
                conductivity: w_per_m_k(*conductivity_w_per_m_k),
            }
            .loss_coefficient_w_per_k(geometry.surface_area()),
            // Rejected by validation.
            (InsulationDef::Layer { .. }, None) => 0.0,
        }
    }

    pub fn thermal_parameters(&self) -> ProjectResult<ThermalParameters> {
        validate_scenario(self)?;
        let params = ThermalParameters {
            voltage_v: self.heater.voltage_v,
            resistance_ohm: self.heater.resistance_ohm,
            mass_kg: self.mass_kg(),
            specific_heat_j_per_kg_k: self.fluid.specific_heat_j_per_kg_k,
            loss_coeff_w_per_k: self.loss_coeff_w_per_k(),
            ambient_c: self.fluid.ambient_temperature_c,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn to_sim_inputs(&self) -> ProjectResult<SimInputs> {
        let inputs = SimInputs {
            params: self.thermal_parameters()?,
            initial_c: self.fluid.initial_temperature_c,
            injections: self.injections.iter().map(InjectionDef::to_event).collect(),
            perturbation: self.perturbation.as_ref().map(PerturbationDef::to_spec),
        };
        inputs.validate()?;
        Ok(inputs)
    }

    pub fn sim_options(&self) -> SimOptions {
        let sim = &self.simulation;
        SimOptions {
            grid: TimeGrid::uniform(sim.dt_s, sim.t_end_s),
            integrator: sim.integrator,
            max_steps: sim.max_steps,
            record_every: sim.record_every,
            hazard_ceiling_c: sim.hazard_ceiling_c,
            target_c: sim.target_temperature_c,
            injection_basis: sim.injection_basis,
        }
    }

    /// Sweep by id.
    pub fn sweep(&self, id: &str) -> Option<SweepSpec> {
        self.sweeps.iter().find(|s| s.id == id).map(|s| SweepSpec {
            field: s.field,
            distribution: s.distribution,
        })
    }
}

impl InjectionDef {
    pub fn to_event(&self) -> InjectionEvent {
        InjectionEvent {
            time_s: self.time_s,
            mass_kg: self.mass_kg,
            temperature_c: self.temperature_c,
            latent_heat_j_per_kg: self.latent_heat_j_per_kg,
        }
    }
}

impl PerturbationDef {
    pub fn to_spec(&self) -> PerturbationSpec {
        PerturbationSpec {
            probability_per_step: self.probability_per_step,
            min_drop_c: self.min_drop_c,
            max_drop_c: self.max_drop_c,
            min_duration_steps: self.min_duration_steps,
            max_duration_steps: self.max_duration_steps,
            seed: self.seed,
        }
    }
}

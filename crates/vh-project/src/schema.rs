//! Scenario schema definitions.
//!
//! Every section has serde defaults matching the reference bench setup, so a
//! file only needs to spell out what differs from it.

use serde::{Deserialize, Serialize};
use vh_core::units::constants::{
    GLASS_FIBRE_CONDUCTIVITY_W_PER_M_K, ICE_LATENT_HEAT_J_PER_KG, WATER_DENSITY_KG_PER_L,
    WATER_SPECIFIC_HEAT_J_PER_KG_K,
};
use vh_sim::{InjectionMassBasis, IntegratorType};
use vh_sweep::{Distribution, ParameterField};

use crate::migrate::LATEST_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub heater: HeaterDef,
    #[serde(default)]
    pub vessel: VesselDef,
    #[serde(default)]
    pub insulation: InsulationDef,
    #[serde(default)]
    pub fluid: FluidDef,
    #[serde(default)]
    pub simulation: SimulationDef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub injections: Vec<InjectionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perturbation: Option<PerturbationDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sweeps: Vec<SweepDef>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            version: LATEST_VERSION,
            name: "reference".to_string(),
            description: None,
            heater: HeaterDef::default(),
            vessel: VesselDef::default(),
            insulation: InsulationDef::default(),
            fluid: FluidDef::default(),
            simulation: SimulationDef::default(),
            injections: Vec::new(),
            perturbation: None,
            sweeps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaterDef {
    #[serde(default = "default_voltage_v")]
    pub voltage_v: f64,
    #[serde(default = "default_resistance_ohm")]
    pub resistance_ohm: f64,
}

impl Default for HeaterDef {
    fn default() -> Self {
        Self {
            voltage_v: default_voltage_v(),
            resistance_ohm: default_resistance_ohm(),
        }
    }
}

fn default_voltage_v() -> f64 {
    12.0
}

fn default_resistance_ohm() -> f64 {
    0.23
}

/// Where the fluid mass comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VesselDef {
    /// Closed cylinder filled to the brim.
    Cylinder { diameter_cm: f64, height_cm: f64 },
    /// Fluid mass given directly; no geometry.
    Mass { mass_kg: f64 },
}

impl Default for VesselDef {
    fn default() -> Self {
        Self::Cylinder {
            diameter_cm: 8.0,
            height_cm: 15.0,
        }
    }
}

/// Where the loss coefficient comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsulationDef {
    /// Uniform layer over the whole cylinder surface.
    Layer {
        thickness_cm: f64,
        #[serde(default = "default_conductivity")]
        conductivity_w_per_m_k: f64,
    },
    /// Loss coefficient given directly (W/K).
    Coefficient { loss_coeff_w_per_k: f64 },
}

impl Default for InsulationDef {
    fn default() -> Self {
        Self::Layer {
            thickness_cm: 0.25,
            conductivity_w_per_m_k: default_conductivity(),
        }
    }
}

fn default_conductivity() -> f64 {
    GLASS_FIBRE_CONDUCTIVITY_W_PER_M_K
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    #[serde(default = "default_specific_heat")]
    pub specific_heat_j_per_kg_k: f64,
    #[serde(default = "default_density")]
    pub density_kg_per_l: f64,
    #[serde(default = "default_temperature_c")]
    pub initial_temperature_c: f64,
    #[serde(default = "default_temperature_c")]
    pub ambient_temperature_c: f64,
}

impl Default for FluidDef {
    fn default() -> Self {
        Self {
            specific_heat_j_per_kg_k: default_specific_heat(),
            density_kg_per_l: default_density(),
            initial_temperature_c: default_temperature_c(),
            ambient_temperature_c: default_temperature_c(),
        }
    }
}

fn default_specific_heat() -> f64 {
    WATER_SPECIFIC_HEAT_J_PER_KG_K
}

fn default_density() -> f64 {
    WATER_DENSITY_KG_PER_L
}

fn default_temperature_c() -> f64 {
    20.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    #[serde(default = "default_t_end_s")]
    pub t_end_s: f64,
    #[serde(default = "default_dt_s")]
    pub dt_s: f64,
    #[serde(default)]
    pub integrator: IntegratorType,
    #[serde(default = "default_target_c")]
    pub target_temperature_c: Option<f64>,
    #[serde(default = "default_hazard_ceiling_c")]
    pub hazard_ceiling_c: Option<f64>,
    #[serde(default)]
    pub injection_basis: InjectionMassBasis,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for SimulationDef {
    fn default() -> Self {
        Self {
            t_end_s: default_t_end_s(),
            dt_s: default_dt_s(),
            integrator: IntegratorType::default(),
            target_temperature_c: default_target_c(),
            hazard_ceiling_c: default_hazard_ceiling_c(),
            injection_basis: InjectionMassBasis::default(),
            record_every: default_record_every(),
            max_steps: default_max_steps(),
        }
    }
}

fn default_t_end_s() -> f64 {
    360.0
}

fn default_dt_s() -> f64 {
    1.0
}

fn default_target_c() -> Option<f64> {
    Some(80.0)
}

fn default_hazard_ceiling_c() -> Option<f64> {
    Some(vh_sim::sim::DEFAULT_HAZARD_CEILING_C)
}

fn default_record_every() -> usize {
    1
}

fn default_max_steps() -> usize {
    1_000_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectionDef {
    pub time_s: f64,
    pub mass_kg: f64,
    #[serde(default)]
    pub temperature_c: f64,
    #[serde(default = "default_latent_heat")]
    pub latent_heat_j_per_kg: f64,
}

fn default_latent_heat() -> f64 {
    ICE_LATENT_HEAT_J_PER_KG
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerturbationDef {
    #[serde(default = "default_probability")]
    pub probability_per_step: f64,
    #[serde(default = "default_min_drop")]
    pub min_drop_c: f64,
    #[serde(default = "default_max_drop")]
    pub max_drop_c: f64,
    #[serde(default = "default_min_duration")]
    pub min_duration_steps: u32,
    #[serde(default = "default_max_duration")]
    pub max_duration_steps: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for PerturbationDef {
    fn default() -> Self {
        Self {
            probability_per_step: default_probability(),
            min_drop_c: default_min_drop(),
            max_drop_c: default_max_drop(),
            min_duration_steps: default_min_duration(),
            max_duration_steps: default_max_duration(),
            seed: default_seed(),
        }
    }
}

fn default_probability() -> f64 {
    1.0 / 300.0
}

fn default_min_drop() -> f64 {
    5.0
}

fn default_max_drop() -> f64 {
    50.0
}

fn default_min_duration() -> u32 {
    5
}

fn default_max_duration() -> u32 {
    30
}

fn default_seed() -> u64 {
    42
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepDef {
    pub id: String,
    pub field: ParameterField,
    pub distribution: Distribution,
}

//! Physical parameter set for a resistively heated vessel.
//!
//! [`ThermalParameters`] is the lumped description the integrator consumes.
//! [`VesselGeometry`] and [`Insulation`] derive its mass and loss coefficient
//! from a cylinder and an insulating jacket.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use uom::si::area::square_meter;
use uom::si::length::meter;
use uom::si::thermal_conductivity::watt_per_meter_kelvin;
use uom::si::volume::liter;
use vh_core::units::constants::{
    GLASS_FIBRE_CONDUCTIVITY_W_PER_M_K, WATER_DENSITY_KG_PER_L, WATER_SPECIFIC_HEAT_J_PER_KG_K,
};
use vh_core::units::{Area, Length, ThermalConductivity, Volume, cm, w_per_m_k};
use vh_core::{ensure_finite, ensure_non_negative, ensure_positive};

use crate::error::SimResult;

/// Electrical, fluid and loss properties of one heating scenario.
///
/// Immutable once validated; sweeps derive variants with the `with_*` methods.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThermalParameters {
    /// Supply voltage (V)
    pub voltage_v: f64,
    /// Heating element resistance (Ω)
    pub resistance_ohm: f64,
    /// Fluid mass at t=0 (kg)
    pub mass_kg: f64,
    /// Specific heat of the fluid (J/(kg·K))
    pub specific_heat_j_per_kg_k: f64,
    /// Heat-loss coefficient of the vessel (W/K)
    pub loss_coeff_w_per_k: f64,
    /// Baseline ambient temperature (°C)
    pub ambient_c: f64,
}

impl ThermalParameters {
    /// Check the physical invariants. Called before any stepping begins.
    pub fn validate(&self) -> SimResult<()> {
        ensure_non_negative(self.voltage_v, "voltage")?;
        ensure_positive(self.resistance_ohm, "resistance")?;
        ensure_positive(self.mass_kg, "mass")?;
        ensure_positive(self.specific_heat_j_per_kg_k, "specific heat")?;
        ensure_non_negative(self.loss_coeff_w_per_k, "loss coefficient")?;
        ensure_finite(self.ambient_c, "ambient temperature")?;
        Ok(())
    }

    /// Heater power P = V²/R (W).
    pub fn power_w(&self) -> f64 {
        self.voltage_v * self.voltage_v / self.resistance_ohm
    }

    /// Heater current I = V/R (A).
    pub fn current_a(&self) -> f64 {
        self.voltage_v / self.resistance_ohm
    }

    /// Heat capacity of the initial fluid mass (J/K).
    pub fn heat_capacity_j_per_k(&self) -> f64 {
        self.mass_kg * self.specific_heat_j_per_kg_k
    }

    /// Thermal time constant m·c/k (s). Infinite for a perfectly insulated vessel.
    pub fn time_constant_s(&self) -> f64 {
        if self.loss_coeff_w_per_k > 0.0 {
            self.heat_capacity_j_per_k() / self.loss_coeff_w_per_k
        } else {
            f64::INFINITY
        }
    }

    /// Energy needed to bring the initial mass from `from_c` to `to_c` (J).
    pub fn energy_to_heat_j(&self, from_c: f64, to_c: f64) -> f64 {
        self.heat_capacity_j_per_k() * (to_c - from_c)
    }

    /// Temperature the fluid settles at under constant power and ambient (°C).
    pub fn equilibrium_c(&self) -> f64 {
        if self.loss_coeff_w_per_k > 0.0 {
            self.ambient_c + self.power_w() / self.loss_coeff_w_per_k
        } else {
            f64::INFINITY
        }
    }

    pub fn with_voltage(self, voltage_v: f64) -> Self {
        Self { voltage_v, ..self }
    }

    pub fn with_resistance(self, resistance_ohm: f64) -> Self {
        Self {
            resistance_ohm,
            ..self
        }
    }

    pub fn with_mass(self, mass_kg: f64) -> Self {
        Self { mass_kg, ..self }
    }

    pub fn with_specific_heat(self, specific_heat_j_per_kg_k: f64) -> Self {
        Self {
            specific_heat_j_per_kg_k,
            ..self
        }
    }

    pub fn with_loss_coefficient(self, loss_coeff_w_per_k: f64) -> Self {
        Self {
            loss_coeff_w_per_k,
            ..self
        }
    }

    pub fn with_ambient(self, ambient_c: f64) -> Self {
        Self { ambient_c, ..self }
    }

    /// Parameters derived from a vessel and its insulation.
    pub fn from_design(
        voltage_v: f64,
        resistance_ohm: f64,
        vessel: &VesselGeometry,
        insulation: &Insulation,
        specific_heat_j_per_kg_k: f64,
        ambient_c: f64,
    ) -> SimResult<Self> {
        vessel.validate()?;
        insulation.validate()?;
        let params = Self {
            voltage_v,
            resistance_ohm,
            mass_kg: vessel.mass_kg(),
            specific_heat_j_per_kg_k,
            loss_coeff_w_per_k: insulation.loss_coefficient_w_per_k(vessel.surface_area()),
            ambient_c,
        };
        params.validate()?;
        Ok(params)
    }
}

impl Default for ThermalParameters {
    /// 12 V across 0.23 Ω into the default 8×15 cm glass-fibre vessel at 20 °C.
    fn default() -> Self {
        let vessel = VesselGeometry::default();
        let insulation = Insulation::default();
        Self {
            voltage_v: 12.0,
            resistance_ohm: 0.23,
            mass_kg: vessel.mass_kg(),
            specific_heat_j_per_kg_k: WATER_SPECIFIC_HEAT_J_PER_KG_K,
            loss_coeff_w_per_k: insulation.loss_coefficient_w_per_k(vessel.surface_area()),
            ambient_c: 20.0,
        }
    }
}

/// Closed cylinder holding the fluid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VesselGeometry {
    pub diameter: Length,
    pub height: Length,
    /// Fluid density (kg/L)
    pub density_kg_per_l: f64,
}

impl VesselGeometry {
    pub fn new(diameter: Length, height: Length, density_kg_per_l: f64) -> SimResult<Self> {
        let vessel = Self {
            diameter,
            height,
            density_kg_per_l,
        };
        vessel.validate()?;
        Ok(vessel)
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.diameter.get::<meter>(), "vessel diameter")?;
        ensure_positive(self.height.get::<meter>(), "vessel height")?;
        ensure_positive(self.density_kg_per_l, "fluid density")?;
        Ok(())
    }

    pub fn radius(&self) -> Length {
        self.diameter / 2.0
    }

    pub fn volume(&self) -> Volume {
        let r = self.radius();
        r * r * self.height * PI
    }

    pub fn capacity_l(&self) -> f64 {
        self.volume().get::<liter>()
    }

    /// Fluid mass when the vessel is full (kg).
    pub fn mass_kg(&self) -> f64 {
        self.capacity_l() * self.density_kg_per_l
    }

    pub fn lateral_area(&self) -> Area {
        self.radius() * self.height * (2.0 * PI)
    }

    /// Top and bottom discs together.
    pub fn base_area(&self) -> Area {
        let r = self.radius();
        r * r * (2.0 * PI)
    }

    pub fn surface_area(&self) -> Area {
        self.lateral_area() + self.base_area()
    }
}

impl Default for VesselGeometry {
    fn default() -> Self {
        Self {
            diameter: cm(8.0),
            height: cm(15.0),
            density_kg_per_l: WATER_DENSITY_KG_PER_L,
        }
    }
}

/// Uniform insulating jacket around the vessel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Insulation {
    pub thickness: Length,
    pub conductivity: ThermalConductivity,
}

impl Insulation {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.thickness.get::<meter>(), "insulation thickness")?;
        ensure_non_negative(
            self.conductivity.get::<watt_per_meter_kelvin>(),
            "insulation conductivity",
        )?;
        Ok(())
    }

    /// Conductive loss coefficient k·A/e (W/K) over the given surface.
    pub fn loss_coefficient_w_per_k(&self, area: Area) -> f64 {
        self.conductivity.get::<watt_per_meter_kelvin>() * area.get::<square_meter>()
            / self.thickness.get::<meter>()
    }
}

impl Default for Insulation {
    fn default() -> Self {
        Self {
            thickness: cm(0.25),
            conductivity: w_per_m_k(GLASS_FIBRE_CONDUCTIVITY_W_PER_M_K),
        }
    }
}

//! SI quantity aliases and constructors backed by `uom`.

use uom::si::f64::{
    Area as UomArea, Length as UomLength, ThermalConductivity as UomThermalConductivity,
    Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Area = UomArea;
pub type Length = UomLength;
pub type ThermalConductivity = UomThermalConductivity;
pub type Volume = UomVolume;

#[inline]
pub fn cm(v: f64) -> Length {
    use uom::si::length::centimeter;
    Length::new::<centimeter>(v)
}

#[inline]
pub fn w_per_m_k(v: f64) -> ThermalConductivity {
    use uom::si::thermal_conductivity::watt_per_meter_kelvin;
    ThermalConductivity::new::<watt_per_meter_kelvin>(v)
}

pub mod constants {
    /// Specific heat of liquid water, J/(kg·K).
    pub const WATER_SPECIFIC_HEAT_J_PER_KG_K: f64 = 4180.0;
    /// Density of liquid water, kg/L.
    pub const WATER_DENSITY_KG_PER_L: f64 = 1.0;
    /// Latent heat of fusion of ice, J/kg.
    pub const ICE_LATENT_HEAT_J_PER_KG: f64 = 334_000.0;
    /// Glass fibre insulation, W/(m·K).
    pub const GLASS_FIBRE_CONDUCTIVITY_W_PER_M_K: f64 = 0.04;
}

//! Sweep definitions and parameter sampling.
//!
//! A sweep varies one field of a base scenario. Values come from evenly
//! spaced points or from seeded random draws, and values the physics cannot
//! take (e.g. a non-positive voltage) are excluded, never clamped.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use tracing::info;
use vh_core::{ensure_finite, linspace};
use vh_sim::SimInputs;

use crate::error::SweepError;

/// Scenario field a sweep varies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterField {
    Voltage,
    Resistance,
    InitialTemperature,
    AmbientTemperature,
    Mass,
    SpecificHeat,
    LossCoefficient,
}

impl ParameterField {
    pub const ALL: [Self; 7] = [
        Self::Voltage,
        Self::Resistance,
        Self::InitialTemperature,
        Self::AmbientTemperature,
        Self::Mass,
        Self::SpecificHeat,
        Self::LossCoefficient,
    ];

    /// Whether a run can be built with this value.
    pub fn admits(self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self {
            Self::Voltage | Self::Resistance | Self::Mass | Self::SpecificHeat => value > 0.0,
            Self::LossCoefficient => value >= 0.0,
            Self::InitialTemperature | Self::AmbientTemperature => true,
        }
    }

    /// Current value of the field in `inputs`.
    pub fn value(self, inputs: &SimInputs) -> f64 {
        let p = &inputs.params;
        match self {
            Self::Voltage => p.voltage_v,
            Self::Resistance => p.resistance_ohm,
            Self::InitialTemperature => inputs.initial_c,
            Self::AmbientTemperature => p.ambient_c,
            Self::Mass => p.mass_kg,
            Self::SpecificHeat => p.specific_heat_j_per_kg_k,
            Self::LossCoefficient => p.loss_coeff_w_per_k,
        }
    }

    /// Copy of `base` with this field set to `value`.
    pub fn apply(self, base: &SimInputs, value: f64) -> SimInputs {
        let mut inputs = base.clone();
        let p = inputs.params;
        match self {
            Self::Voltage => inputs.params = p.with_voltage(value),
            Self::Resistance => inputs.params = p.with_resistance(value),
            Self::InitialTemperature => inputs.initial_c = value,
            Self::AmbientTemperature => inputs.params = p.with_ambient(value),
            Self::Mass => inputs.params = p.with_mass(value),
            Self::SpecificHeat => inputs.params = p.with_specific_heat(value),
            Self::LossCoefficient => inputs.params = p.with_loss_coefficient(value),
        }
        inputs
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Voltage => "V",
            Self::Resistance => "Ω",
            Self::InitialTemperature | Self::AmbientTemperature => "°C",
            Self::Mass => "kg",
            Self::SpecificHeat => "J/(kg·K)",
            Self::LossCoefficient => "W/K",
        }
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Voltage => "voltage",
            Self::Resistance => "resistance",
            Self::InitialTemperature => "initial_temperature",
            Self::AmbientTemperature => "ambient_temperature",
            Self::Mass => "mass",
            Self::SpecificHeat => "specific_heat",
            Self::LossCoefficient => "loss_coefficient",
        };
        f.write_str(name)
    }
}

/// How sweep values are generated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// `n` evenly spaced values from `low` to `high`, both included.
    Uniform { low: f64, high: f64, n: usize },
    /// `n` seeded draws from `U[low, high)`.
    RandomUniform {
        low: f64,
        high: f64,
        n: usize,
        #[serde(default)]
        seed: u64,
    },
    /// `n` seeded draws from `N(mean, sd²)`.
    Normal {
        mean: f64,
        sd: f64,
        n: usize,
        #[serde(default)]
        seed: u64,
    },
}

impl Distribution {
    pub fn len(&self) -> usize {
        match *self {
            Self::Uniform { n, .. } | Self::RandomUniform { n, .. } | Self::Normal { n, .. } => n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<(), SweepError> {
        if self.is_empty() {
            return Err(SweepError::InvalidConfiguration(
                "sweep must have at least one sample".to_string(),
            ));
        }
        match *self {
            Self::Uniform { low, high, .. } | Self::RandomUniform { low, high, .. } => {
                ensure_finite(low, "sweep lower bound")?;
                ensure_finite(high, "sweep upper bound")?;
                if high < low {
                    return Err(SweepError::InvalidConfiguration(format!(
                        "upper bound {high} is below lower bound {low}"
                    )));
                }
            }
            Self::Normal { mean, sd, .. } => {
                ensure_finite(mean, "sweep mean")?;
                ensure_finite(sd, "sweep standard deviation")?;
                if sd < 0.0 {
                    return Err(SweepError::InvalidConfiguration(format!(
                        "standard deviation {sd} is negative"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Generate the raw values, before any exclusion.
    ///
    /// Random families are reproducible: the same seed yields the same values.
    pub fn generate(&self) -> Result<Vec<f64>, SweepError> {
        self.validate()?;
        let values = match *self {
            Self::Uniform { low, high, n } => linspace(low, high, n),
            Self::RandomUniform { low, high, n, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..n)
                    .map(|_| low + (high - low) * rng.r#gen::<f64>())
                    .collect()
            }
            Self::Normal { mean, sd, n, seed } => {
                let normal = Normal::new(mean, sd)
                    .map_err(|e| SweepError::InvalidConfiguration(e.to_string()))?;
                let rng = StdRng::seed_from_u64(seed);
                rng.sample_iter(normal).take(n).collect()
            }
        };
        Ok(values)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform { low, high, n } => write!(f, "{n} points from {low} to {high}"),
            Self::RandomUniform { low, high, n, seed } => {
                write!(f, "{n} uniform draws in [{low}, {high}) (seed {seed})")
            }
            Self::Normal { mean, sd, n, seed } => {
                write!(f, "{n} normal draws, mean {mean}, sd {sd} (seed {seed})")
            }
        }
    }
}

/// Definition of a single parameter sweep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    pub field: ParameterField,
    pub distribution: Distribution,
}

impl fmt::Display for SweepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sweep {} ({}): {}",
            self.field,
            self.field.unit(),
            self.distribution
        )
    }
}

/// Sampled values split by admissibility, each in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variants {
    pub accepted: Vec<f64>,
    pub excluded: Vec<f64>,
}

/// Draw the values of `spec` and drop those the field cannot take.
pub fn sample_variants(spec: &SweepSpec) -> Result<Variants, SweepError> {
    let (accepted, excluded): (Vec<f64>, Vec<f64>) = spec
        .distribution
        .generate()?
        .into_iter()
        .partition(|&v| spec.field.admits(v));

    if !excluded.is_empty() {
        info!(
            field = %spec.field,
            excluded = excluded.len(),
            accepted = accepted.len(),
            "skipping non-physical sweep values"
        );
    }
    Ok(Variants { accepted, excluded })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_evenly_spaced() {
        let dist = Distribution::Uniform {
            low: 10.0,
            high: 14.0,
            n: 5,
        };
        assert_eq!(dist.generate().unwrap(), vec![10.0, 11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn single_point_uniform() {
        let dist = Distribution::Uniform {
            low: 12.0,
            high: 20.0,
            n: 1,
        };
        assert_eq!(dist.generate().unwrap(), vec![12.0]);
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let dist = Distribution::Normal {
            mean: 12.0,
            sd: 2.0,
            n: 50,
            seed: 42,
        };
        assert_eq!(dist.generate().unwrap(), dist.generate().unwrap());

        let other = Distribution::Normal {
            mean: 12.0,
            sd: 2.0,
            n: 50,
            seed: 43,
        };
        assert_ne!(dist.generate().unwrap(), other.generate().unwrap());
    }

    #[test]
    fn random_uniform_stays_in_range() {
        let dist = Distribution::RandomUniform {
            low: 0.2,
            high: 0.3,
            n: 200,
            seed: 1,
        };
        let values = dist.generate().unwrap();
        assert_eq!(values.len(), 200);
        assert!(values.iter().all(|&v| (0.2..0.3).contains(&v)));
    }

    #[test]
    fn invalid_distributions_are_rejected() {
        let empty = Distribution::Uniform {
            low: 0.0,
            high: 1.0,
            n: 0,
        };
        assert!(empty.generate().is_err());
        let inverted = Distribution::RandomUniform {
            low: 2.0,
            high: 1.0,
            n: 3,
            seed: 0,
        };
        assert!(inverted.generate().is_err());
        let negative_sd = Distribution::Normal {
            mean: 1.0,
            sd: -1.0,
            n: 3,
            seed: 0,
        };
        assert!(negative_sd.generate().is_err());
    }

    #[test]
    fn non_positive_voltages_are_excluded() {
        let spec = SweepSpec {
            field: ParameterField::Voltage,
            distribution: Distribution::Normal {
                mean: 0.0,
                sd: 3.0,
                n: 100,
                seed: 42,
            },
        };
        let variants = sample_variants(&spec).unwrap();
        assert_eq!(variants.accepted.len() + variants.excluded.len(), 100);
        assert!(!variants.excluded.is_empty());
        assert!(variants.accepted.iter().all(|&v| v > 0.0));
        assert!(variants.excluded.iter().all(|&v| v <= 0.0));
    }

    #[test]
    fn temperatures_may_be_negative() {
        let spec = SweepSpec {
            field: ParameterField::AmbientTemperature,
            distribution: Distribution::Uniform {
                low: -20.0,
                high: 20.0,
                n: 5,
            },
        };
        let variants = sample_variants(&spec).unwrap();
        assert_eq!(variants.accepted.len(), 5);
        assert!(variants.excluded.is_empty());
    }

    #[test]
    fn apply_touches_only_the_swept_field() {
        let base = SimInputs::default();
        for field in ParameterField::ALL {
            let varied = field.apply(&base, 1.5);
            assert_eq!(field.value(&varied), 1.5);
            for other in ParameterField::ALL.into_iter().filter(|&f| f != field) {
                assert_eq!(other.value(&varied), other.value(&base), "{field} changed {other}");
            }
        }
    }

    #[test]
    fn serde_tags() {
        let json = r#"{"field":"voltage","distribution":{"kind":"normal","mean":12.0,"sd":1.0,"n":10,"seed":7}}"#;
        let spec: SweepSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.field, ParameterField::Voltage);
        assert_eq!(spec.distribution.len(), 10);
    }
}

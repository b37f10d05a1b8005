//! Parameter distribution sweeps over heating runs.
//!
//! A sweep draws values for one parameter, builds one run per value on top of
//! a base scenario and executes the runs in parallel.

pub mod distribution;
pub mod error;
pub mod executor;

pub use distribution::{Distribution, ParameterField, SweepSpec, Variants, sample_variants};
pub use error::SweepError;
pub use executor::{SweepResult, VariantRun, VariantSummary, run_sweep};

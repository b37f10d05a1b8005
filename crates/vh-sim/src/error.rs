//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while configuring or running a heating simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical parameter: {what}")]
    NonPhysical { what: String },

    #[error("ODE integration failed at t={t}s: {message}")]
    Integration { t: f64, message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<vh_core::VhError> for SimError {
    fn from(e: vh_core::VhError) -> Self {
        SimError::NonPhysical {
            what: e.to_string(),
        }
    }
}

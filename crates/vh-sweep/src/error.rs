//! Error types for sweep configuration.

use thiserror::Error;

/// Errors in a sweep definition. Failures of individual variant runs are
/// kept in the sweep result instead.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Invalid sweep configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Core(#[from] vh_core::VhError),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Scenario error: {0}")]
    Project(#[from] vh_project::ProjectError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] vh_sim::SimError),

    #[error("Sweep error: {0}")]
    Sweep(#[from] vh_sweep::SweepError),

    #[error("Sweep not found: {0}")]
    SweepNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CliResult<T> = Result<T, CliError>;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vh_project::Scenario;
use vh_sim::{IntegratorType, SimInputs, SimOptions, TimeGrid, loss_profile, run_sim};
use vh_sweep::run_sweep;

mod error;
mod report;

use error::{CliError, CliResult};
use report::{RunSummary, comparison_csv, losses_table, series_csv, sweep_csv};

#[derive(Parser)]
#[command(name = "vh")]
#[command(about = "Vessel heating simulator - heated water vessel thermal model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
    },
    /// Run a scenario and export the temperature series
    Run {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
        #[command(flatten)]
        overrides: RunOverrides,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the run summary as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Add closed-form and unperturbed reference curves to the CSV
        #[arg(long)]
        compare: bool,
    },
    /// Run one of the scenario's parameter sweeps
    Sweep {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
        /// Sweep ID as listed in the scenario
        sweep_id: String,
        #[command(flatten)]
        overrides: RunOverrides,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Tabulate wall loss against fluid-ambient temperature difference
    Losses {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
        /// Largest temperature difference in K
        #[arg(long, default_value_t = 80.0)]
        max_delta: f64,
        /// Spacing of the table in K
        #[arg(long, default_value_t = 10.0)]
        step: f64,
    },
}

#[derive(clap::Args)]
struct RunOverrides {
    /// Integration method, overriding the scenario
    #[arg(long, value_enum)]
    integrator: Option<Method>,
    /// Time step in seconds
    #[arg(long)]
    dt: Option<f64>,
    /// End time in seconds
    #[arg(long)]
    t_end: Option<f64>,
    /// Keep integrating past the hazard ceiling
    #[arg(long)]
    no_hazard_stop: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Euler,
    Rk4,
    Ode,
}

impl RunOverrides {
    fn apply(&self, scenario: &Scenario) -> SimOptions {
        let mut opts = scenario.sim_options();
        if let Some(method) = self.integrator {
            opts.integrator = match method {
                Method::Euler => IntegratorType::ForwardEuler,
                Method::Rk4 => IntegratorType::Rk4,
                Method::Ode => IntegratorType::ode(),
            };
        }
        if self.dt.is_some() || self.t_end.is_some() {
            opts.grid = TimeGrid::uniform(
                self.dt.unwrap_or(scenario.simulation.dt_s),
                self.t_end.unwrap_or(scenario.simulation.t_end_s),
            );
        }
        if self.no_hazard_stop {
            opts.hazard_ceiling_c = None;
        }
        opts
    }
}

fn main() -> CliResult<()> {
    // Logs go to stderr so CSV on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Run {
            scenario_path,
            overrides,
            output,
            json,
            compare,
        } => cmd_run(&scenario_path, &overrides, output.as_deref(), json, compare),
        Commands::Sweep {
            scenario_path,
            sweep_id,
            overrides,
            output,
        } => cmd_sweep(&scenario_path, &sweep_id, &overrides, output.as_deref()),
        Commands::Losses {
            scenario_path,
            max_delta,
            step,
        } => cmd_losses(&scenario_path, max_delta, step),
    }
}

fn cmd_validate(scenario_path: &Path) -> CliResult<()> {
    eprintln!("Validating scenario: {}", scenario_path.display());
    let scenario = vh_project::load(scenario_path)?;
    let params = scenario.thermal_parameters()?;
    eprintln!("✓ Scenario is valid");
    eprintln!(
        "  Power: {:.2} W, mass: {:.4} kg, loss coefficient: {:.4} W/K",
        params.power_w(),
        params.mass_kg,
        params.loss_coeff_w_per_k
    );
    Ok(())
}

fn cmd_run(
    scenario_path: &Path,
    overrides: &RunOverrides,
    output: Option<&Path>,
    json: bool,
    compare: bool,
) -> CliResult<()> {
    let scenario = vh_project::load(scenario_path)?;
    let inputs = scenario.to_sim_inputs()?;
    let opts = overrides.apply(&scenario);
    info!(scenario = %scenario.name, "running scenario");

    let record = run_sim(&inputs, &opts)?;
    let summary = RunSummary::from_record(&scenario.name, &inputs, opts.target_c, &record);
    let csv = if compare {
        let reference = match inputs.perturbation {
            Some(_) => {
                info!("running unperturbed reference");
                let calm = SimInputs {
                    perturbation: None,
                    ..inputs.clone()
                };
                Some(run_sim(&calm, &opts)?)
            }
            None => None,
        };
        comparison_csv(&record, &inputs, reference.as_ref())
    } else {
        series_csv(&record)
    };

    // Summary goes wherever the CSV does not
    if let Some(path) = output {
        std::fs::write(path, csv)?;
        eprintln!("✓ Exported {} data points to {}", record.len(), path.display());
        print_summary(&summary, json, false)?;
    } else {
        print!("{}", csv);
        print_summary(&summary, json, true)?;
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, json: bool, to_stderr: bool) -> CliResult<()> {
    let text = if json {
        serde_json::to_string_pretty(summary)?
    } else {
        summary.render_text()
    };
    if to_stderr {
        eprintln!("{}", text.trim_end());
    } else {
        println!("{}", text.trim_end());
    }
    Ok(())
}

fn cmd_sweep(
    scenario_path: &Path,
    sweep_id: &str,
    overrides: &RunOverrides,
    output: Option<&Path>,
) -> CliResult<()> {
    let scenario = vh_project::load(scenario_path)?;
    let spec = scenario
        .sweep(sweep_id)
        .ok_or_else(|| CliError::SweepNotFound(sweep_id.to_string()))?;
    let base = scenario.to_sim_inputs()?;
    let opts = overrides.apply(&scenario);

    let result = run_sweep(&base, &spec, &opts)?;
    let csv = sweep_csv(result.field, &result.summaries());

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        eprintln!("✓ Exported {} variants to {}", result.runs.len(), path.display());
    } else {
        print!("{}", csv);
    }
    if !result.excluded.is_empty() {
        eprintln!(
            "  {} non-physical values skipped: {:?}",
            result.excluded.len(),
            result.excluded
        );
    }
    Ok(())
}

fn cmd_losses(scenario_path: &Path, max_delta: f64, step: f64) -> CliResult<()> {
    if !(step > 0.0 && max_delta >= 0.0) {
        return Err(CliError::InvalidInput(
            "step must be positive and max-delta non-negative".to_string(),
        ));
    }
    let scenario = vh_project::load(scenario_path)?;
    let params = scenario.thermal_parameters()?;

    let n = (max_delta / step + 1e-9).floor() as usize;
    let deltas: Vec<f64> = (0..=n).map(|i| i as f64 * step).collect();
    let rows = loss_profile(params.loss_coeff_w_per_k, params.power_w(), &deltas);

    println!(
        "Loss coefficient: {:.4} W/K, heater power: {:.2} W",
        params.loss_coeff_w_per_k,
        params.power_w()
    );
    if params.loss_coeff_w_per_k > 0.0 {
        println!(
            "Equilibrium temperature: {:.1} °C, time constant: {:.0} s",
            params.equilibrium_c(),
            params.time_constant_s()
        );
    }
    print!("{}", losses_table(&rows));
    Ok(())
}

//! Text, CSV and JSON renderings of run results.

use serde::Serialize;
use vh_sim::{
    InjectionRecord, LossProfileRow, PerturbationEvent, PerturbationStats, SimInputs, SimRecord,
    Termination, lossless_temperature_c, lossless_time_to_reach_s, lossy_temperature_c,
};
use vh_sweep::{ParameterField, VariantSummary};

/// Headline figures of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub power_w: f64,
    pub current_a: f64,
    /// Energy to take the initial mass to the target, ignoring losses (J)
    pub energy_to_target_j: Option<f64>,
    /// Lossless time to the target (s)
    pub ideal_time_to_target_s: Option<f64>,
    pub samples: usize,
    pub final_temperature_c: Option<f64>,
    pub peak_temperature_c: Option<f64>,
    pub time_to_target_s: Option<f64>,
    pub termination: Termination,
    pub injections: Vec<InjectionRecord>,
    pub unapplied_injections: usize,
    pub perturbations: Vec<PerturbationEvent>,
    pub perturbation_stats: PerturbationStats,
}

impl RunSummary {
    pub fn from_record(
        scenario: &str,
        inputs: &SimInputs,
        target_c: Option<f64>,
        record: &SimRecord,
    ) -> Self {
        let params = &inputs.params;
        let target_above = target_c.filter(|&target| target > inputs.initial_c);
        let energy_to_target_j =
            target_above.map(|target| params.energy_to_heat_j(inputs.initial_c, target));
        let ideal_time_to_target_s = target_above
            .filter(|_| params.power_w() > 0.0)
            .map(|target| lossless_time_to_reach_s(params, inputs.initial_c, target));
        Self {
            scenario: scenario.to_string(),
            power_w: params.power_w(),
            current_a: params.current_a(),
            energy_to_target_j,
            ideal_time_to_target_s,
            samples: record.len(),
            final_temperature_c: record.final_temperature_c(),
            peak_temperature_c: record.peak_temperature_c(),
            time_to_target_s: record.time_to_target_s,
            termination: record.termination,
            injections: record.injections.clone(),
            unapplied_injections: record.unapplied_injections.len(),
            perturbations: record.perturbations.clone(),
            perturbation_stats: PerturbationStats::from_events(&record.perturbations),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = format!("Scenario: {}\n", self.scenario);
        out.push_str(&format!(
            "  Heater: {:.2} W at {:.2} A\n",
            self.power_w, self.current_a
        ));
        if let Some(energy) = self.energy_to_target_j {
            out.push_str(&format!("  Energy to target: {:.0} J\n", energy));
        }
        if let Some(t) = self.ideal_time_to_target_s {
            out.push_str(&format!(
                "  Ideal time to target: {:.1} s ({:.2} min)\n",
                t,
                t / 60.0
            ));
        }
        out.push_str(&format!("  Samples: {}\n", self.samples));
        if let Some(t) = self.final_temperature_c {
            out.push_str(&format!("  Final temperature: {:.2} °C\n", t));
        }
        if let Some(t) = self.peak_temperature_c {
            out.push_str(&format!("  Peak temperature:  {:.2} °C\n", t));
        }
        match self.time_to_target_s {
            Some(t) => out.push_str(&format!(
                "  Target reached at: {:.1} s ({:.2} min)\n",
                t,
                t / 60.0
            )),
            None => out.push_str("  Target not reached\n"),
        }
        match self.termination {
            Termination::Completed => out.push_str("  Termination: completed\n"),
            Termination::HazardCeiling {
                time_s,
                temperature_c,
            } => out.push_str(&format!(
                "  Termination: hazard ceiling exceeded at {:.1} s ({:.2} °C)\n",
                time_s, temperature_c
            )),
            Termination::MaxSteps { time_s } => out.push_str(&format!(
                "  Termination: step limit reached at {:.1} s\n",
                time_s
            )),
        }

        for inj in &self.injections {
            out.push_str(&format!(
                "  Injection at {:.1} s: {:.2} -> {:.2} °C (drop {:.2} °C, mass {:.3} kg)\n",
                inj.applied_at_s,
                inj.temperature_before_c,
                inj.temperature_after_c,
                inj.drop_c,
                inj.mass_after_kg
            ));
        }
        if self.unapplied_injections > 0 {
            out.push_str(&format!(
                "  Injections beyond horizon: {}\n",
                self.unapplied_injections
            ));
        }

        let stats = &self.perturbation_stats;
        if stats.count > 0 {
            out.push_str(&format!(
                "  Ambient drops: {} (mean {:.1} °C, max {:.1} °C, mean duration {:.1} s)\n",
                stats.count, stats.mean_drop_c, stats.max_drop_c, stats.mean_duration_s
            ));
            for e in &self.perturbations {
                out.push_str(&format!(
                    "    t={:.0} s: -{:.1} °C for {} steps\n",
                    e.onset_s, e.drop_c, e.duration_steps
                ));
            }
        }
        out
    }
}

pub fn series_csv(record: &SimRecord) -> String {
    let mut csv = String::from("time_s,temperature_c,ambient_c,mass_kg\n");
    for i in 0..record.len() {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            record.t[i], record.temperature_c[i], record.ambient_c[i], record.mass_kg[i]
        ));
    }
    csv
}

/// Series CSV with the closed-form curves alongside.
///
/// `lossless_c` and `lossy_c` start from the initial temperature and ignore
/// injections and perturbations. `reference_c` is only written when an
/// unperturbed re-run is given, interpolated onto this record's times.
pub fn comparison_csv(
    record: &SimRecord,
    inputs: &SimInputs,
    reference: Option<&SimRecord>,
) -> String {
    let mut csv = String::from("time_s,temperature_c,ambient_c,mass_kg,lossless_c,lossy_c");
    if reference.is_some() {
        csv.push_str(",reference_c");
    }
    csv.push('\n');

    let t0 = record.t.first().copied().unwrap_or_default();
    for i in 0..record.len() {
        let t = record.t[i];
        let elapsed = t - t0;
        csv.push_str(&format!(
            "{},{},{},{},{},{}",
            t,
            record.temperature_c[i],
            record.ambient_c[i],
            record.mass_kg[i],
            lossless_temperature_c(&inputs.params, inputs.initial_c, elapsed),
            lossy_temperature_c(&inputs.params, inputs.initial_c, elapsed)
        ));
        if let Some(reference) = reference {
            csv.push(',');
            csv.push_str(&opt(reference.temperature_at(t)));
        }
        csv.push('\n');
    }
    csv
}

pub fn sweep_csv(field: ParameterField, summaries: &[VariantSummary]) -> String {
    let mut csv = format!(
        "{},final_temperature_c,peak_temperature_c,time_to_target_s,termination,error\n",
        field
    );
    for s in summaries {
        let termination = match s.termination {
            Some(Termination::Completed) => "completed",
            Some(Termination::HazardCeiling { .. }) => "hazard_ceiling",
            Some(Termination::MaxSteps { .. }) => "max_steps",
            None => "",
        };
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            s.value,
            opt(s.final_temperature_c),
            opt(s.peak_temperature_c),
            opt(s.time_to_target_s),
            termination,
            s.error.as_deref().unwrap_or("").replace(',', ";")
        ));
    }
    csv
}

pub fn losses_table(rows: &[LossProfileRow]) -> String {
    let mut out = String::from("  ΔT (K)    Loss (W)    % of power\n");
    for row in rows {
        out.push_str(&format!(
            "  {:>6.1}  {:>10.3}  {:>12.2}\n",
            row.delta_t_k, row.loss_w, row.percent_of_power
        ));
    }
    out
}

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

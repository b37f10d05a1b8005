//! Integration test: deterministic heating runs.
//!
//! Covers:
//! - Lossless heating against the closed form
//! - Euler against adaptive ODE integration with wall loss
//! - Ice injection mid-run and the mass used afterwards
//! - Hazard ceiling truncation and time-to-target
//! - Strict monotonicity of lossless heating over random heaters

use proptest::prelude::*;
use vh_core::units::constants::ICE_LATENT_HEAT_J_PER_KG;
use vh_sim::{
    InjectionEvent, InjectionMassBasis, IntegratorType, SimInputs, SimOptions, Termination,
    ThermalParameters, TimeGrid, lossless_temperature_c, lossy_temperature_c, run_sim,
};

fn bench_params() -> ThermalParameters {
    ThermalParameters {
        voltage_v: 12.0,
        resistance_ohm: 0.23,
        mass_kg: 0.75,
        specific_heat_j_per_kg_k: 4180.0,
        loss_coeff_w_per_k: 0.0,
        ambient_c: 20.0,
    }
}

fn opts(dt_s: f64, t_end_s: f64) -> SimOptions {
    SimOptions {
        grid: TimeGrid::uniform(dt_s, t_end_s),
        ..SimOptions::default()
    }
}

#[test]
fn lossless_run_matches_closed_form() {
    let params = bench_params();
    let record = run_sim(&SimInputs::new(params, 20.0), &opts(1.0, 300.0)).unwrap();

    assert_eq!(record.termination, Termination::Completed);
    assert_eq!(record.len(), 301);
    for (t, temp) in record.series() {
        let exact = lossless_temperature_c(&params, 20.0, t);
        assert!((temp - exact).abs() < 1e-9, "t={t}: {temp} vs {exact}");
    }
    let final_c = record.final_temperature_c().unwrap();
    assert!((final_c - 79.9126).abs() < 1e-3);
}

#[test]
fn lossless_run_is_strictly_increasing() {
    let record = run_sim(&SimInputs::new(bench_params(), 20.0), &opts(5.0, 250.0)).unwrap();
    assert!(record.temperature_c.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn euler_and_ode_agree_with_wall_loss() {
    let inputs = SimInputs::default();
    let euler = run_sim(&inputs, &opts(1.0, 300.0)).unwrap();
    let ode = run_sim(
        &inputs,
        &SimOptions {
            integrator: IntegratorType::ode(),
            ..opts(1.0, 300.0)
        },
    )
    .unwrap();

    assert_eq!(euler.t, ode.t);
    for (a, b) in euler.temperature_c.iter().zip(&ode.temperature_c) {
        assert!((a - b).abs() < 0.1);
    }
}

#[test]
fn ode_tracks_exponential_approach() {
    let params = ThermalParameters::default().with_voltage(3.0);
    let opts = SimOptions {
        integrator: IntegratorType::ode(),
        hazard_ceiling_c: None,
        ..opts(5.0, 3600.0)
    };
    let record = run_sim(&SimInputs::new(params, 20.0), &opts).unwrap();
    for (t, temp) in record.series() {
        let exact = lossy_temperature_c(&params, 20.0, t);
        assert!((temp - exact).abs() < 1e-5, "t={t}: {temp} vs {exact}");
    }
}

#[test]
fn rk4_matches_ode_on_coarse_grid() {
    let inputs = SimInputs::default();
    let rk4 = run_sim(
        &inputs,
        &SimOptions {
            integrator: IntegratorType::Rk4,
            ..opts(10.0, 200.0)
        },
    )
    .unwrap();
    let params = inputs.params;
    let last = rk4.final_temperature_c().unwrap();
    assert!((last - lossy_temperature_c(&params, 20.0, 200.0)).abs() < 1e-8);
}

#[test]
fn ice_injection_drops_temperature_and_adds_mass() {
    let params = bench_params();
    let inputs = SimInputs::new(params, 20.0).with_injection(InjectionEvent::ice(50.0, 0.04));
    let record = run_sim(&inputs, &opts(1.0, 120.0)).unwrap();

    assert_eq!(record.injections.len(), 1);
    let applied = record.injections[0];
    assert_eq!(applied.applied_at_s, 50.0);
    assert!((applied.mass_after_kg - 0.79).abs() < 1e-12);

    // The t=50 sample is the state before the ice goes in.
    let before = lossless_temperature_c(&params, 20.0, 50.0);
    assert!((record.temperature_c[50] - before).abs() < 1e-9);
    assert!((applied.temperature_before_c - before).abs() < 1e-9);

    // Closed energy balance over the mixture.
    let c = params.specific_heat_j_per_kg_k;
    let energy_before = 0.75 * c * before;
    let energy_after = 0.79 * c * applied.temperature_after_c;
    assert!((energy_before - 0.04 * ICE_LATENT_HEAT_J_PER_KG - energy_after).abs() < 1e-6);

    // After the drop the heater warms 0.79 kg, not 0.75 kg.
    let rise = record.temperature_c[52] - record.temperature_c[51];
    assert!((rise - params.power_w() / (0.79 * c)).abs() < 1e-9);
    assert!((record.mass_kg[49] - 0.75).abs() < 1e-12);
    assert!((record.mass_kg[51] - 0.79).abs() < 1e-12);
    assert!(record.unapplied_injections.is_empty());
}

#[test]
fn pre_injection_basis_gives_larger_drop() {
    let inputs = SimInputs::new(bench_params(), 64.0).with_injection(InjectionEvent::ice(0.0, 0.04));
    let mixture = run_sim(&inputs, &opts(1.0, 10.0)).unwrap();
    let historical = run_sim(
        &inputs,
        &SimOptions {
            injection_basis: InjectionMassBasis::PreInjection,
            ..opts(1.0, 10.0)
        },
    )
    .unwrap();
    assert!((mixture.injections[0].drop_c - 7.2863).abs() < 1e-4);
    assert!((historical.injections[0].drop_c - 7.6749).abs() < 1e-4);
}

#[test]
fn injection_snaps_to_nearest_grid_point() {
    let inputs = SimInputs::new(bench_params(), 20.0).with_injection(InjectionEvent::ice(52.0, 0.04));
    let record = run_sim(&inputs, &opts(5.0, 100.0)).unwrap();
    assert_eq!(record.injections[0].applied_at_s, 50.0);
    assert_eq!(record.injections[0].scheduled_s, 52.0);
}

#[test]
fn injection_beyond_horizon_is_reported() {
    let inputs = SimInputs::new(bench_params(), 20.0).with_injection(InjectionEvent::ice(500.0, 0.04));
    let record = run_sim(&inputs, &opts(1.0, 100.0)).unwrap();
    assert!(record.injections.is_empty());
    assert_eq!(record.unapplied_injections.len(), 1);
    assert!(record.mass_kg.iter().all(|&m| (m - 0.75).abs() < 1e-12));
}

#[test]
fn hazard_ceiling_truncates_after_first_exceedance() {
    let params = bench_params().with_voltage(24.0);
    let record = run_sim(&SimInputs::new(params, 20.0), &opts(1.0, 600.0)).unwrap();

    let Termination::HazardCeiling {
        time_s,
        temperature_c,
    } = record.termination
    else {
        panic!("expected hazard truncation, got {:?}", record.termination);
    };
    assert_eq!(record.t.last().copied(), Some(time_s));
    assert_eq!(record.final_temperature_c(), Some(temperature_c));
    assert!(temperature_c > 100.0);
    let (_, earlier) = record.temperature_c.split_last().unwrap();
    assert!(earlier.iter().all(|&t| t <= 100.0));
    assert!(record.termination.is_truncated());
}

#[test]
fn start_above_ceiling_stops_at_first_sample() {
    // Cooling towards 0 °C would otherwise be integrated for the full horizon.
    let params = ThermalParameters::default()
        .with_voltage(0.0)
        .with_loss_coefficient(50.0)
        .with_ambient(0.0);
    let inputs = SimInputs::new(params, 105.0).with_injection(InjectionEvent::ice(20.0, 0.04));
    let record = run_sim(&inputs, &opts(5.0, 100.0)).unwrap();

    assert_eq!(record.series(), vec![(0.0, 105.0)]);
    assert_eq!(
        record.termination,
        Termination::HazardCeiling {
            time_s: 0.0,
            temperature_c: 105.0
        }
    );
    assert!(record.injections.is_empty());
    assert_eq!(record.unapplied_injections.len(), 1);
}

#[test]
fn hazard_ceiling_can_be_disabled() {
    let params = bench_params().with_voltage(24.0);
    let opts = SimOptions {
        hazard_ceiling_c: None,
        ..opts(1.0, 600.0)
    };
    let record = run_sim(&SimInputs::new(params, 20.0), &opts).unwrap();
    assert_eq!(record.termination, Termination::Completed);
    assert!(record.peak_temperature_c().unwrap() > 100.0);
}

#[test]
fn time_to_target_is_first_grid_point_at_or_above() {
    let opts = SimOptions {
        target_c: Some(80.0),
        ..opts(1.0, 360.0)
    };
    let record = run_sim(&SimInputs::new(bench_params(), 20.0), &opts).unwrap();
    assert_eq!(record.time_to_target_s, Some(301.0));

    let never = SimOptions {
        target_c: Some(95.0),
        ..opts.clone()
    };
    let short = SimOptions {
        grid: TimeGrid::uniform(1.0, 60.0),
        ..never
    };
    let record = run_sim(&SimInputs::new(bench_params(), 20.0), &short).unwrap();
    assert_eq!(record.time_to_target_s, None);
}

#[test]
fn explicit_grid_with_uneven_steps() {
    let params = bench_params();
    let opts = SimOptions {
        grid: TimeGrid::Explicit(vec![0.0, 1.0, 3.0, 10.0, 30.0]),
        ..SimOptions::default()
    };
    let record = run_sim(&SimInputs::new(params, 20.0), &opts).unwrap();
    assert_eq!(record.t, vec![0.0, 1.0, 3.0, 10.0, 30.0]);
    let exact = lossless_temperature_c(&params, 20.0, 30.0);
    assert!((record.final_temperature_c().unwrap() - exact).abs() < 1e-9);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn lossless_heating_strictly_increases(
        voltage in 1.0f64..24.0,
        mass in 0.2f64..5.0,
        dt in 0.5f64..10.0,
        integrator in prop_oneof![Just(IntegratorType::ForwardEuler), Just(IntegratorType::Rk4)],
    ) {
        let params = bench_params().with_voltage(voltage).with_mass(mass);
        let opts = SimOptions {
            integrator,
            hazard_ceiling_c: None,
            ..opts(dt, 40.0 * dt)
        };
        let record = run_sim(&SimInputs::new(params, 20.0), &opts).unwrap();
        prop_assert_eq!(record.len(), 41);
        prop_assert!(record.temperature_c.windows(2).all(|w| w[1] > w[0]));
    }
}

use vh_project::schema::*;
use vh_project::{from_json_str, from_yaml_str, to_json_string, to_yaml_string, validate_scenario};
use vh_sim::{InjectionMassBasis, IntegratorType};
use vh_sweep::{Distribution, ParameterField};

fn full_scenario() -> Scenario {
    Scenario {
        name: "Everything".to_string(),
        description: Some("all optional sections filled in".to_string()),
        simulation: SimulationDef {
            t_end_s: 600.0,
            dt_s: 5.0,
            integrator: IntegratorType::ode(),
            injection_basis: InjectionMassBasis::PreInjection,
            ..SimulationDef::default()
        },
        injections: vec![InjectionDef {
            time_s: 50.0,
            mass_kg: 0.04,
            temperature_c: 0.0,
            latent_heat_j_per_kg: 334_000.0,
        }],
        perturbation: Some(PerturbationDef::default()),
        sweeps: vec![SweepDef {
            id: "volts".to_string(),
            field: ParameterField::Voltage,
            distribution: Distribution::Normal {
                mean: 12.0,
                sd: 4.0,
                n: 5,
                seed: 42,
            },
        }],
        ..Scenario::default()
    }
}

#[test]
fn roundtrip_yaml_reference_scenario() {
    let scenario = Scenario::default();
    validate_scenario(&scenario).unwrap();

    let text = to_yaml_string(&scenario).unwrap();
    let loaded = from_yaml_str(&text).unwrap();

    assert_eq!(scenario, loaded);
}

#[test]
fn roundtrip_yaml_full_scenario() {
    let scenario = full_scenario();
    let loaded = from_yaml_str(&to_yaml_string(&scenario).unwrap()).unwrap();
    assert_eq!(scenario, loaded);
}

#[test]
fn roundtrip_json_full_scenario() {
    let scenario = full_scenario();
    let loaded = from_json_str(&to_json_string(&scenario).unwrap()).unwrap();
    assert_eq!(scenario, loaded);
}

#[test]
fn minimal_file_takes_reference_defaults() {
    let scenario = from_yaml_str("version: 1\nname: minimal\n").unwrap();
    assert_eq!(scenario.heater, HeaterDef::default());
    assert_eq!(scenario.vessel, VesselDef::default());
    assert_eq!(scenario.simulation.target_temperature_c, Some(80.0));
    assert_eq!(scenario.simulation.hazard_ceiling_c, Some(100.0));
    assert_eq!(scenario.simulation.integrator, IntegratorType::ForwardEuler);
}

#[test]
fn null_ceiling_disables_hazard_stop() {
    let text = "version: 1\nname: open\nsimulation:\n  hazard_ceiling_c: null\n";
    let scenario = from_yaml_str(text).unwrap();
    assert_eq!(scenario.simulation.hazard_ceiling_c, None);
}

#[test]
fn version_zero_is_migrated_on_load() {
    let text = "version: 0\nname: legacy\ninjections:\n  - time_s: 50.0\n    mass_kg: 0.04\n";
    let scenario = from_yaml_str(text).unwrap();
    assert_eq!(scenario.version, vh_project::LATEST_VERSION);
    assert_eq!(
        scenario.simulation.injection_basis,
        InjectionMassBasis::PreInjection
    );
    assert_eq!(scenario.injections[0].latent_heat_j_per_kg, 334_000.0);
}

#[test]
fn validation_fails_on_negative_thickness() {
    let text = "version: 1\nname: bad\ninsulation:\n  kind: layer\n  thickness_cm: -0.1\n";
    assert!(from_yaml_str(text).is_err());
}

#[test]
fn unknown_integrator_is_a_parse_error() {
    let text = "version: 1\nname: bad\nsimulation:\n  integrator:\n    method: leapfrog\n";
    assert!(matches!(
        from_yaml_str(text),
        Err(vh_project::ProjectError::Yaml(_))
    ));
}

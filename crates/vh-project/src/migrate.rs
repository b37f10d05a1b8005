//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Scenario;
use vh_sim::InjectionMassBasis;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    while scenario.version < LATEST_VERSION {
        scenario = migrate_one_version(scenario)?;
    }
    Ok(scenario)
}

fn migrate_one_version(scenario: Scenario) -> Result<Scenario, ProjectError> {
    match scenario.version {
        0 => migrate_v0_to_v1(scenario),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files predate `injection_basis` and were always evaluated with
/// the drop spread over the pre-injection mass.
fn migrate_v0_to_v1(mut scenario: Scenario) -> Result<Scenario, ProjectError> {
    scenario.simulation.injection_basis = InjectionMassBasis::PreInjection;
    scenario.version = 1;
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_latest_is_noop() {
        let scenario = Scenario::default();
        let migrated = migrate_to_latest(scenario.clone()).unwrap();
        assert_eq!(migrated, scenario);
    }

    #[test]
    fn v0_keeps_historical_injection_drop() {
        let scenario = Scenario {
            version: 0,
            ..Scenario::default()
        };
        let migrated = migrate_to_latest(scenario).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(
            migrated.simulation.injection_basis,
            InjectionMassBasis::PreInjection
        );
    }
}

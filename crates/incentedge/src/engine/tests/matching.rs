use super::common::*;
use crate::engine::domain::{
    EligibilityRule, IncentiveFormula, IneligibilityReason, ProgramCategory, ProgramStatus,
    ProjectType,
};
use crate::engine::{EngineConfig, EngineError, IncentiveEngine};

fn flat(id: &str) -> crate::engine::domain::IncentiveProgram {
    program(
        id,
        IncentiveFormula::Flat {
            amount: 1_000.0,
            cap: 1_000.0,
        },
    )
}

#[test]
fn negative_unit_count_fails_the_whole_call() {
    let catalog = catalog(vec![flat("a")]);
    let mut project = solar_project(500_000.0);
    project.unit_count = -5;

    let err = engine()
        .match_programs(&catalog, &project)
        .expect_err("invalid input");

    assert_eq!(
        err,
        EngineError::InvalidInput {
            field: "unit_count",
            value: -5.0
        }
    );
}

#[test]
fn negative_budget_fails_the_whole_call() {
    let catalog = catalog(vec![flat("a")]);
    let mut project = solar_project(500_000.0);
    project.total_budget = -1.0;

    let err = engine()
        .match_programs(&catalog, &project)
        .expect_err("invalid input");

    assert!(matches!(
        err,
        EngineError::InvalidInput {
            field: "total_budget",
            ..
        }
    ));
}

#[test]
fn non_finite_budget_is_rejected() {
    let catalog = catalog(vec![flat("a")]);
    let mut project = solar_project(500_000.0);
    project.total_budget = f64::NAN;

    assert!(engine().match_programs(&catalog, &project).is_err());
}

#[test]
fn results_preserve_catalog_order() {
    let catalog = catalog(vec![flat("first"), flat("second"), flat("third")]);
    let project = solar_project(500_000.0);

    let results = engine()
        .match_programs(&catalog, &project)
        .expect("matches");

    let ids: Vec<_> = results
        .iter()
        .map(|result| result.program.id.0.as_str())
        .collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn type_clause_is_checked_before_budget() {
    // Fails both the type and budget clauses; the fixed clause order means
    // the reported reason is always the type mismatch.
    let mut restricted = flat("restricted");
    restricted.eligibility = EligibilityRule {
        project_types: vec![ProjectType::Wind],
        min_budget: Some(1_000_000.0),
        ..EligibilityRule::default()
    };
    let catalog = catalog(vec![restricted]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert!(!results[0].eligible);
    assert_eq!(
        results[0].reason,
        Some(IneligibilityReason::ProjectTypeMismatch)
    );
}

#[test]
fn range_bounds_are_inclusive() {
    let mut bounded = flat("bounded");
    bounded.eligibility = EligibilityRule {
        min_units: Some(100),
        max_units: Some(100),
        min_budget: Some(500_000.0),
        max_budget: Some(500_000.0),
        ..EligibilityRule::default()
    };
    let catalog = catalog(vec![bounded]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert!(results[0].eligible);
}

#[test]
fn unit_count_outside_range_reports_size_reason() {
    let mut bounded = flat("bounded");
    bounded.eligibility = EligibilityRule {
        max_units: Some(50),
        ..EligibilityRule::default()
    };
    let catalog = catalog(vec![bounded]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert_eq!(results[0].reason, Some(IneligibilityReason::SizeOutOfRange));
}

#[test]
fn budget_outside_range_reports_budget_reason() {
    let mut bounded = flat("bounded");
    bounded.eligibility = EligibilityRule {
        max_budget: Some(100_000.0),
        ..EligibilityRule::default()
    };
    let catalog = catalog(vec![bounded]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert_eq!(
        results[0].reason,
        Some(IneligibilityReason::BudgetOutOfRange)
    );
}

#[test]
fn state_program_matches_its_state_case_insensitively() {
    let mut state_program = flat("state");
    state_program.category = ProgramCategory::State;
    state_program.region = Some("ny".to_string());
    let catalog = catalog(vec![state_program]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert!(results[0].eligible);
}

#[test]
fn state_mismatch_reports_jurisdiction_reason() {
    let mut state_program = flat("state");
    state_program.category = ProgramCategory::State;
    state_program.region = Some("CA".to_string());
    let catalog = catalog(vec![state_program]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert_eq!(
        results[0].reason,
        Some(IneligibilityReason::JurisdictionMismatch)
    );
}

#[test]
fn utility_program_requires_matching_territory() {
    let mut utility_program = flat("utility");
    utility_program.category = ProgramCategory::Utility;
    utility_program.region = Some("PG&E".to_string());
    let catalog = catalog(vec![utility_program]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert_eq!(
        results[0].reason,
        Some(IneligibilityReason::JurisdictionMismatch)
    );
}

#[test]
fn local_program_without_project_city_is_not_contained() {
    let mut local_program = flat("local");
    local_program.category = ProgramCategory::Local;
    local_program.region = Some("Austin".to_string());
    let catalog = catalog(vec![local_program]);

    let mut project = solar_project(500_000.0);
    project.location.city = None;

    let results = engine()
        .match_programs(&catalog, &project)
        .expect("matches");

    assert_eq!(
        results[0].reason,
        Some(IneligibilityReason::JurisdictionMismatch)
    );
}

#[test]
fn expired_program_is_inactive() {
    let mut expired = flat("expired");
    expired.status = ProgramStatus::Expired;
    let catalog = catalog(vec![expired]);

    let results = engine()
        .match_programs(&catalog, &solar_project(500_000.0))
        .expect("matches");

    assert_eq!(
        results[0].reason,
        Some(IneligibilityReason::ProgramInactive)
    );
}

#[test]
fn pending_program_is_gated_by_config() {
    let mut pending = flat("pending");
    pending.status = ProgramStatus::Pending;
    let catalog = catalog(vec![pending]);
    let project = solar_project(500_000.0);

    let default_results = engine()
        .match_programs(&catalog, &project)
        .expect("matches");
    assert_eq!(
        default_results[0].reason,
        Some(IneligibilityReason::ProgramInactive)
    );

    let inclusive = IncentiveEngine::new(EngineConfig {
        include_pending_programs: true,
        ..EngineConfig::default()
    });
    let results = inclusive
        .match_programs(&catalog, &project)
        .expect("matches");
    assert!(results[0].eligible);
}

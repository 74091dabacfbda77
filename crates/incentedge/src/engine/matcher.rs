use super::config::EngineConfig;
use super::domain::{
    IncentiveProgram, IneligibilityReason, MatchResult, ProgramCategory, ProgramStatus,
    ProjectInput, ProjectLocation,
};
use super::EngineError;

pub(crate) fn match_programs(
    programs: &[IncentiveProgram],
    project: &ProjectInput,
    config: &EngineConfig,
) -> Result<Vec<MatchResult>, EngineError> {
    validate_project(project)?;

    Ok(programs
        .iter()
        .map(|program| {
            let reason = first_failing_clause(program, project, config);
            MatchResult {
                program: program.clone(),
                eligible: reason.is_none(),
                reason,
            }
        })
        .collect())
}

/// Malformed input fails the whole call before any program is evaluated.
fn validate_project(project: &ProjectInput) -> Result<(), EngineError> {
    if project.unit_count < 0 {
        return Err(EngineError::InvalidInput {
            field: "unit_count",
            value: project.unit_count as f64,
        });
    }

    if !project.total_budget.is_finite() || project.total_budget < 0.0 {
        return Err(EngineError::InvalidInput {
            field: "total_budget",
            value: project.total_budget,
        });
    }

    Ok(())
}

/// Clauses are checked in a fixed order (status, type, size, budget,
/// geography) so a program failing several clauses always reports the same
/// reason code.
fn first_failing_clause(
    program: &IncentiveProgram,
    project: &ProjectInput,
    config: &EngineConfig,
) -> Option<IneligibilityReason> {
    match program.status {
        ProgramStatus::Expired => return Some(IneligibilityReason::ProgramInactive),
        ProgramStatus::Pending if !config.include_pending_programs => {
            return Some(IneligibilityReason::ProgramInactive)
        }
        _ => {}
    }

    let rule = &program.eligibility;

    if !rule.project_types.is_empty() && !rule.project_types.contains(&project.project_type) {
        return Some(IneligibilityReason::ProjectTypeMismatch);
    }

    let below_min = rule
        .min_units
        .map_or(false, |min| project.unit_count < i64::from(min));
    let above_max = rule
        .max_units
        .map_or(false, |max| project.unit_count > i64::from(max));
    if below_min || above_max {
        return Some(IneligibilityReason::SizeOutOfRange);
    }

    let under_budget = rule
        .min_budget
        .map_or(false, |min| project.total_budget < min);
    let over_budget = rule
        .max_budget
        .map_or(false, |max| project.total_budget > max);
    if under_budget || over_budget {
        return Some(IneligibilityReason::BudgetOutOfRange);
    }

    if !jurisdiction_contains(program, &project.location) {
        return Some(IneligibilityReason::JurisdictionMismatch);
    }

    None
}

fn jurisdiction_contains(program: &IncentiveProgram, location: &ProjectLocation) -> bool {
    let region_matches = |candidate: Option<&str>| match (program.region.as_deref(), candidate) {
        (None, _) => true,
        (Some(region), Some(value)) => region.eq_ignore_ascii_case(value.trim()),
        (Some(_), None) => false,
    };

    match program.category {
        ProgramCategory::Federal => true,
        ProgramCategory::State => region_matches(Some(location.state.as_str())),
        ProgramCategory::Local => region_matches(location.city.as_deref()),
        ProgramCategory::Utility => region_matches(location.utility.as_deref()),
    }
}

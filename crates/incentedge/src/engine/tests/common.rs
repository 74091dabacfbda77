use crate::catalog::CatalogSnapshot;
use crate::engine::domain::{
    EligibilityRule, EstimateLine, EstimateStatus, IncentiveFormula, IncentiveProgram,
    ProgramCategory, ProgramId, ProgramStatus, ProjectInput, ProjectLocation, ProjectType,
};
use crate::engine::{EngineConfig, IncentiveEngine};

pub(crate) fn engine() -> IncentiveEngine {
    IncentiveEngine::new(EngineConfig::default())
}

pub(crate) fn program(id: &str, formula: IncentiveFormula) -> IncentiveProgram {
    IncentiveProgram {
        id: ProgramId::new(id),
        name: format!("Program {id}"),
        category: ProgramCategory::Federal,
        region: None,
        formula,
        eligibility: EligibilityRule::default(),
        status: ProgramStatus::Active,
        base_confidence: 0.8,
        exclusive_with: Vec::new(),
        expires_on: None,
    }
}

pub(crate) fn catalog(programs: Vec<IncentiveProgram>) -> CatalogSnapshot {
    CatalogSnapshot::from_programs(programs).expect("test catalog is valid")
}

pub(crate) fn solar_project(budget: f64) -> ProjectInput {
    ProjectInput {
        project_type: ProjectType::Solar,
        unit_count: 100,
        total_budget: budget,
        location: ProjectLocation {
            state: "NY".to_string(),
            city: Some("New York".to_string()),
            utility: Some("Con Edison".to_string()),
        },
        retrofit: false,
    }
}

pub(crate) fn line(
    id: &str,
    amount: f64,
    confidence: f64,
    status: EstimateStatus,
) -> EstimateLine {
    EstimateLine {
        program_id: ProgramId::new(id),
        program_name: format!("Program {id}"),
        amount,
        confidence,
        status,
    }
}

//! Catalog loading and snapshot management.
//!
//! A [`CatalogSnapshot`] is an immutable, ordered program set. Reloads never
//! mutate an existing snapshot: [`CatalogHandle`] swaps in a whole new
//! `Arc`'d snapshot so in-flight calculations keep a consistent view.

mod mapping;
mod parser;

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::domain::{
    EligibilityRule, IncentiveFormula, IncentiveProgram, ProgramCategory, ProgramId, ProgramStatus,
    ProjectType,
};

/// Immutable, validated program set plus load metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    programs: Vec<IncentiveProgram>,
    loaded_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Validate and freeze an ordered program list.
    pub fn from_programs(programs: Vec<IncentiveProgram>) -> Result<Self, CatalogError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for program in &programs {
            validate_program(program)?;
            if !seen.insert(program.id.0.as_str()) {
                return Err(CatalogError::DuplicateId(program.id.0.clone()));
            }
        }

        Ok(Self {
            programs,
            loaded_at: Utc::now(),
        })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let rows = parser::parse_rows(reader)?;
        let programs = rows
            .into_iter()
            .map(mapping::program_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_programs(programs)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Small embedded catalog for demos and smoke tests, shaped after the
    /// federal/state/utility mix of the real program database.
    pub fn builtin() -> Self {
        let programs = vec![
            IncentiveProgram {
                id: ProgramId::new("fed-itc"),
                name: "Federal Investment Tax Credit".to_string(),
                category: ProgramCategory::Federal,
                region: None,
                formula: IncentiveFormula::PercentageOfCost {
                    rate: 0.30,
                    cap: 1_000_000.0,
                },
                eligibility: EligibilityRule {
                    project_types: vec![ProjectType::Solar, ProjectType::Storage],
                    ..EligibilityRule::default()
                },
                status: ProgramStatus::Active,
                base_confidence: 0.9,
                exclusive_with: Vec::new(),
                expires_on: None,
            },
            IncentiveProgram {
                id: ProgramId::new("fed-itc-domestic"),
                name: "Federal ITC Domestic Content Bonus".to_string(),
                category: ProgramCategory::Federal,
                region: None,
                formula: IncentiveFormula::PercentageOfCost {
                    rate: 0.40,
                    cap: 1_200_000.0,
                },
                eligibility: EligibilityRule {
                    project_types: vec![ProjectType::Solar],
                    min_budget: Some(500_000.0),
                    ..EligibilityRule::default()
                },
                status: ProgramStatus::Active,
                base_confidence: 0.6,
                exclusive_with: vec![ProgramId::new("fed-itc")],
                expires_on: None,
            },
            IncentiveProgram {
                id: ProgramId::new("ny-sun"),
                name: "NY-Sun Megawatt Block".to_string(),
                category: ProgramCategory::State,
                region: Some("NY".to_string()),
                formula: IncentiveFormula::PerUnit {
                    rate: 350.0,
                    cap: 250_000.0,
                },
                eligibility: EligibilityRule {
                    project_types: vec![ProjectType::Solar],
                    min_units: Some(10),
                    ..EligibilityRule::default()
                },
                status: ProgramStatus::Active,
                base_confidence: 0.75,
                exclusive_with: Vec::new(),
                expires_on: None,
            },
            IncentiveProgram {
                id: ProgramId::new("nyc-retrofit"),
                name: "NYC Efficiency Retrofit Grant".to_string(),
                category: ProgramCategory::Local,
                region: Some("New York".to_string()),
                formula: IncentiveFormula::PercentageOfCost {
                    rate: 0.10,
                    cap: 150_000.0,
                },
                eligibility: EligibilityRule {
                    project_types: vec![
                        ProjectType::EnergyEfficiency,
                        ProjectType::Hvac,
                        ProjectType::Lighting,
                    ],
                    ..EligibilityRule::default()
                },
                status: ProgramStatus::Active,
                base_confidence: 0.65,
                exclusive_with: Vec::new(),
                expires_on: None,
            },
            IncentiveProgram {
                id: ProgramId::new("coned-storage"),
                name: "Con Edison Storage Rebate".to_string(),
                category: ProgramCategory::Utility,
                region: Some("Con Edison".to_string()),
                formula: IncentiveFormula::PerUnit {
                    rate: 200.0,
                    cap: 100_000.0,
                },
                eligibility: EligibilityRule {
                    project_types: vec![ProjectType::Storage],
                    ..EligibilityRule::default()
                },
                status: ProgramStatus::Active,
                base_confidence: 0.8,
                exclusive_with: Vec::new(),
                expires_on: None,
            },
            IncentiveProgram {
                id: ProgramId::new("ny-prop-tax"),
                name: "NY Property Tax Abatement Expansion".to_string(),
                category: ProgramCategory::State,
                region: Some("NY".to_string()),
                formula: IncentiveFormula::Flat {
                    amount: 62_500.0,
                    cap: 62_500.0,
                },
                eligibility: EligibilityRule::default(),
                status: ProgramStatus::Pending,
                base_confidence: 0.4,
                exclusive_with: Vec::new(),
                expires_on: None,
            },
        ];

        Self::from_programs(programs).expect("builtin catalog is valid")
    }

    pub fn programs(&self) -> &[IncentiveProgram] {
        &self.programs
    }

    pub fn get(&self, id: &ProgramId) -> Option<&IncentiveProgram> {
        self.programs.iter().find(|program| &program.id == id)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn validate_program(program: &IncentiveProgram) -> Result<(), CatalogError> {
    match program.formula {
        IncentiveFormula::PercentageOfCost { rate, .. } => {
            if !(0.0..=1.0).contains(&rate) {
                return Err(CatalogError::RateOutOfRange {
                    id: program.id.0.clone(),
                    rate,
                });
            }
        }
        IncentiveFormula::PerUnit { rate, .. } => {
            if rate < 0.0 {
                return Err(CatalogError::NegativeValue {
                    id: program.id.0.clone(),
                    field: "rate",
                    value: rate,
                });
            }
        }
        IncentiveFormula::Flat { amount, .. } => {
            if amount < 0.0 {
                return Err(CatalogError::NegativeValue {
                    id: program.id.0.clone(),
                    field: "amount",
                    value: amount,
                });
            }
        }
        IncentiveFormula::Unknown { .. } => {}
    }

    if let Some(cap) = program.formula.cap() {
        if cap < 0.0 {
            return Err(CatalogError::NegativeValue {
                id: program.id.0.clone(),
                field: "cap",
                value: cap,
            });
        }
    }

    if !(0.0..=1.0).contains(&program.base_confidence) {
        return Err(CatalogError::ConfidenceOutOfRange {
            id: program.id.0.clone(),
            value: program.base_confidence,
        });
    }

    Ok(())
}

/// Shared handle over the current snapshot. Readers clone the `Arc` and keep
/// a consistent catalog for the duration of a call; reloads replace the
/// whole snapshot.
#[derive(Clone)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<CatalogSnapshot>>>,
}

impl CatalogHandle {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn current(&self) -> Arc<CatalogSnapshot> {
        self.inner.read().expect("catalog lock poisoned").clone()
    }

    pub fn replace(&self, snapshot: CatalogSnapshot) {
        tracing::info!(programs = snapshot.len(), "catalog snapshot replaced");
        let mut guard = self.inner.write().expect("catalog lock poisoned");
        *guard = Arc::new(snapshot);
    }
}

/// Catalog loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("program {id}: rate {rate} outside [0, 1] for percentage-of-cost formula")]
    RateOutOfRange { id: String, rate: f64 },
    #[error("program {id}: {field} must not be negative (got {value})")]
    NegativeValue {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("program {id}: confidence {value} outside [0, 1]")]
    ConfidenceOutOfRange { id: String, value: f64 },
    #[error("program {id}: unrecognized {field} value '{value}'")]
    UnknownField {
        id: String,
        field: &'static str,
        value: String,
    },
    #[error("program {id}: missing required field {field}")]
    MissingField { id: String, field: &'static str },
    #[error("duplicate program id {0}")]
    DuplicateId(String),
}

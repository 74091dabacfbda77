use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for catalog programs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProgramId(pub String);

impl ProgramId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Level of government (or utility) offering a program. Doubles as the
/// jurisdiction level when testing geographic containment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramCategory {
    Federal,
    State,
    Local,
    Utility,
}

impl ProgramCategory {
    pub const fn label(self) -> &'static str {
        match self {
            ProgramCategory::Federal => "federal",
            ProgramCategory::State => "state",
            ProgramCategory::Local => "local",
            ProgramCategory::Utility => "utility",
        }
    }
}

/// Lifecycle state of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Active,
    Expired,
    Pending,
}

/// Benefit formula attached to a program. Caps are expressed in the same
/// base currency units as project budgets; a cap always applies, including
/// to flat awards.
///
/// `Unknown` preserves formula kinds the calculator cannot price. Catalog
/// data originates from scraped state/federal databases, so unrecognized
/// kinds are expected and must not poison the rest of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum IncentiveFormula {
    PercentageOfCost { rate: f64, cap: f64 },
    PerUnit { rate: f64, cap: f64 },
    Flat { amount: f64, cap: f64 },
    Unknown {
        // The variant tag already serializes as `kind`.
        #[serde(rename = "unknown-kind")]
        kind: String,
    },
}

impl IncentiveFormula {
    pub fn cap(&self) -> Option<f64> {
        match self {
            IncentiveFormula::PercentageOfCost { cap, .. }
            | IncentiveFormula::PerUnit { cap, .. }
            | IncentiveFormula::Flat { cap, .. } => Some(*cap),
            IncentiveFormula::Unknown { .. } => None,
        }
    }
}

/// Technology categories drawn from the incentive databases the catalog is
/// scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    Solar,
    Wind,
    Geothermal,
    Storage,
    EnergyEfficiency,
    EvCharging,
    Hvac,
    Lighting,
}

impl ProjectType {
    pub const fn label(self) -> &'static str {
        match self {
            ProjectType::Solar => "solar",
            ProjectType::Wind => "wind",
            ProjectType::Geothermal => "geothermal",
            ProjectType::Storage => "storage",
            ProjectType::EnergyEfficiency => "energy-efficiency",
            ProjectType::EvCharging => "ev-charging",
            ProjectType::Hvac => "hvac",
            ProjectType::Lighting => "lighting",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "solar" => Some(Self::Solar),
            "wind" => Some(Self::Wind),
            "geothermal" => Some(Self::Geothermal),
            "storage" => Some(Self::Storage),
            "energy-efficiency" => Some(Self::EnergyEfficiency),
            "ev-charging" => Some(Self::EvCharging),
            "hvac" => Some(Self::Hvac),
            "lighting" => Some(Self::Lighting),
            _ => None,
        }
    }
}

/// Eligibility predicate for a program. Empty `project_types` means any
/// technology qualifies; range bounds are inclusive where present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EligibilityRule {
    #[serde(default)]
    pub project_types: Vec<ProjectType>,
    pub min_units: Option<u32>,
    pub max_units: Option<u32>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
}

/// A single incentive program record. Immutable once loaded into a catalog
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveProgram {
    pub id: ProgramId,
    pub name: String,
    pub category: ProgramCategory,
    /// Geographic scope for the category level: state code for state
    /// programs, city for local, territory name for utility. `None` means
    /// nationwide (federal programs usually leave it unset).
    pub region: Option<String>,
    pub formula: IncentiveFormula,
    pub eligibility: EligibilityRule,
    pub status: ProgramStatus,
    /// Probability a claim under this program succeeds, in `[0, 1]`.
    pub base_confidence: f64,
    /// Programs that cannot be claimed alongside this one.
    #[serde(default)]
    pub exclusive_with: Vec<ProgramId>,
    pub expires_on: Option<NaiveDate>,
}

/// Project location used for jurisdiction containment checks.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectLocation {
    pub state: String,
    pub city: Option<String>,
    pub utility: Option<String>,
}

/// Caller-supplied project attributes for a single calculation. Never
/// persisted by the engine.
///
/// `unit_count` is signed so malformed input can be rejected with a clear
/// error instead of wrapping at the serialization boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub project_type: ProjectType,
    pub unit_count: i64,
    pub total_budget: f64,
    pub location: ProjectLocation,
    #[serde(default)]
    pub retrofit: bool,
}

/// Why a program failed the eligibility predicate. Exactly one reason is
/// reported per ineligible program, determined by a fixed clause order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IneligibilityReason {
    ProgramInactive,
    ProjectTypeMismatch,
    SizeOutOfRange,
    BudgetOutOfRange,
    JurisdictionMismatch,
}

impl IneligibilityReason {
    pub const fn label(self) -> &'static str {
        match self {
            IneligibilityReason::ProgramInactive => "program-inactive",
            IneligibilityReason::ProjectTypeMismatch => "project-type-mismatch",
            IneligibilityReason::SizeOutOfRange => "size-out-of-range",
            IneligibilityReason::BudgetOutOfRange => "budget-out-of-range",
            IneligibilityReason::JurisdictionMismatch => "jurisdiction-mismatch",
        }
    }
}

/// Per-program outcome of an eligibility pass, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub program: IncentiveProgram,
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<IneligibilityReason>,
}

/// Application lifecycle of an estimate line. Transitions are driven by the
/// external application-tracking workflow; the engine only validates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    Estimated,
    Applied,
    Approved,
    Received,
    Rejected,
}

impl EstimateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EstimateStatus::Estimated => "estimated",
            EstimateStatus::Applied => "applied",
            EstimateStatus::Approved => "approved",
            EstimateStatus::Received => "received",
            EstimateStatus::Rejected => "rejected",
        }
    }

    /// `estimated -> applied -> approved -> received`, with `rejected`
    /// reachable from `applied` or `approved`. Terminal states admit no
    /// further moves.
    pub fn can_transition_to(self, next: EstimateStatus) -> bool {
        matches!(
            (self, next),
            (EstimateStatus::Estimated, EstimateStatus::Applied)
                | (EstimateStatus::Applied, EstimateStatus::Approved)
                | (EstimateStatus::Applied, EstimateStatus::Rejected)
                | (EstimateStatus::Approved, EstimateStatus::Received)
                | (EstimateStatus::Approved, EstimateStatus::Rejected)
        )
    }
}

/// A priced claim against one program. Amounts are numeric base units;
/// formatting stays a presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateLine {
    pub program_id: ProgramId,
    pub program_name: String,
    pub amount: f64,
    pub confidence: f64,
    pub status: EstimateStatus,
}

/// Why a program was priced but left out of the final batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum SkipReason {
    ExcludedByStackingRule { kept: ProgramId },
    UnrecognizedFormula { kind: String },
}

/// Side channel entry reported alongside an estimate batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEstimate {
    pub program_id: ProgramId,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Calculator output: surviving lines plus the non-fatal skip channel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateBatch {
    pub lines: Vec<EstimateLine>,
    pub skipped: Vec<SkippedEstimate>,
}

/// Portfolio-level KPIs. Always derivable from the line set; never stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    /// Sum of estimated amounts across all lines.
    pub total: f64,
    /// Sum of amount x confidence; never exceeds `total`.
    pub expected: f64,
    /// Sum of amounts with status `received`.
    pub received: f64,
    /// Sum of amounts with status `applied` or `approved`.
    pub pipeline: f64,
    /// `received / total` as a percentage; defined as 0 when `total` is 0.
    pub capture_rate: f64,
    /// Distinct programs whose line has not been rejected.
    pub program_count: usize,
    /// Mean confidence across lines; 0 for an empty set.
    pub avg_confidence: f64,
}

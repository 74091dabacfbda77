use chrono::NaiveDate;

use super::parser::ProgramRow;
use super::CatalogError;
use crate::engine::domain::{
    EligibilityRule, IncentiveFormula, IncentiveProgram, ProgramCategory, ProgramId, ProgramStatus,
    ProjectType,
};

const DEFAULT_CONFIDENCE: f64 = 0.5;

pub(crate) fn program_from_row(row: ProgramRow) -> Result<IncentiveProgram, CatalogError> {
    let id = row.id.clone();

    let category = parse_category(&row.category)
        .ok_or_else(|| CatalogError::UnknownField {
            id: id.clone(),
            field: "Category",
            value: row.category.clone(),
        })?;

    let status = match row.status.as_deref() {
        None => ProgramStatus::Active,
        Some(value) => parse_status(value).ok_or_else(|| CatalogError::UnknownField {
            id: id.clone(),
            field: "Status",
            value: value.to_string(),
        })?,
    };

    let formula = parse_formula(&row, &id)?;
    let project_types = parse_project_types(row.project_types.as_deref(), &id)?;
    let expires_on = parse_expiry(row.expires_on.as_deref(), &id)?;

    let exclusive_with = row
        .exclusive_with
        .as_deref()
        .map(|list| {
            list.split(';')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ProgramId::new)
                .collect()
        })
        .unwrap_or_default();

    Ok(IncentiveProgram {
        id: ProgramId::new(row.id),
        name: row.name,
        category,
        region: row.region,
        formula,
        eligibility: EligibilityRule {
            project_types,
            min_units: row.min_units,
            max_units: row.max_units,
            min_budget: row.min_budget,
            max_budget: row.max_budget,
        },
        status,
        base_confidence: row.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        exclusive_with,
        expires_on,
    })
}

fn parse_category(value: &str) -> Option<ProgramCategory> {
    match value.trim().to_ascii_lowercase().as_str() {
        "federal" => Some(ProgramCategory::Federal),
        "state" => Some(ProgramCategory::State),
        "local" => Some(ProgramCategory::Local),
        "utility" => Some(ProgramCategory::Utility),
        _ => None,
    }
}

fn parse_status(value: &str) -> Option<ProgramStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "active" => Some(ProgramStatus::Active),
        "expired" => Some(ProgramStatus::Expired),
        "pending" => Some(ProgramStatus::Pending),
        _ => None,
    }
}

/// Unrecognized kinds are preserved as [`IncentiveFormula::Unknown`] rather
/// than rejected; one unpriceable row must not sink the file.
fn parse_formula(row: &ProgramRow, id: &str) -> Result<IncentiveFormula, CatalogError> {
    let kind = row.formula.trim().to_ascii_lowercase();

    let require = |value: Option<f64>, field: &'static str| {
        value.ok_or_else(|| CatalogError::MissingField {
            id: id.to_string(),
            field,
        })
    };

    match kind.as_str() {
        "percentage-of-cost" => Ok(IncentiveFormula::PercentageOfCost {
            rate: require(row.rate, "Rate")?,
            cap: require(row.cap, "Cap")?,
        }),
        "per-unit" => Ok(IncentiveFormula::PerUnit {
            rate: require(row.rate, "Rate")?,
            cap: require(row.cap, "Cap")?,
        }),
        "flat" => Ok(IncentiveFormula::Flat {
            amount: require(row.rate, "Rate")?,
            cap: require(row.cap, "Cap")?,
        }),
        _ => Ok(IncentiveFormula::Unknown {
            kind: row.formula.trim().to_string(),
        }),
    }
}

fn parse_project_types(
    list: Option<&str>,
    id: &str,
) -> Result<Vec<ProjectType>, CatalogError> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };

    list.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            ProjectType::parse(entry).ok_or_else(|| CatalogError::UnknownField {
                id: id.to_string(),
                field: "Project Types",
                value: entry.to_string(),
            })
        })
        .collect()
}

fn parse_expiry(value: Option<&str>, id: &str) -> Result<Option<NaiveDate>, CatalogError> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                CatalogError::UnknownField {
                    id: id.to_string(),
                    field: "Expires On",
                    value: raw.to_string(),
                }
            })
        })
        .transpose()
}

//! Incentive matching, estimation, and portfolio aggregation.
//!
//! All three operations are pure, synchronous computations over immutable
//! inputs. Callers hand in a catalog snapshot and project attributes; the
//! engine never reads ambient state and never mutates the catalog, so
//! concurrent invocations need no coordination.

mod aggregator;
mod calculator;
mod config;
pub mod domain;
mod matcher;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use domain::{
    EligibilityRule, EstimateBatch, EstimateLine, EstimateStatus, IncentiveFormula,
    IncentiveProgram, IneligibilityReason, MatchResult, PortfolioSnapshot, ProgramCategory,
    ProgramId, ProgramStatus, ProjectInput, ProjectLocation, ProjectType, SkipReason,
    SkippedEstimate,
};

use crate::catalog::CatalogSnapshot;
use serde::{Deserialize, Serialize};

/// Stateless engine applying one configuration to any number of calls.
pub struct IncentiveEngine {
    config: EngineConfig,
}

impl IncentiveEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate every catalog program against the project, preserving
    /// catalog order. Malformed input (negative unit count or budget) fails
    /// the whole call with [`EngineError::InvalidInput`].
    pub fn match_programs(
        &self,
        catalog: &CatalogSnapshot,
        project: &ProjectInput,
    ) -> Result<Vec<MatchResult>, EngineError> {
        matcher::match_programs(catalog.programs(), project, &self.config)
    }

    /// Price each eligible match. Unrecognized formulas and stacking losers
    /// land in the batch's `skipped` channel instead of failing the call.
    pub fn estimate(&self, matches: &[MatchResult], project: &ProjectInput) -> EstimateBatch {
        calculator::estimate_lines(matches, project, &self.config)
    }

    /// Reduce a line set to portfolio KPIs. The empty set yields the all-zero
    /// snapshot.
    pub fn aggregate(&self, lines: &[EstimateLine]) -> PortfolioSnapshot {
        aggregator::aggregate_lines(lines)
    }

    /// Full pipeline: match, estimate, aggregate.
    pub fn evaluate(
        &self,
        catalog: &CatalogSnapshot,
        project: &ProjectInput,
    ) -> Result<ProjectEvaluation, EngineError> {
        let matches = self.match_programs(catalog, project)?;
        let batch = self.estimate(&matches, project);
        let snapshot = self.aggregate(&batch.lines);

        Ok(ProjectEvaluation {
            matches,
            batch,
            snapshot,
        })
    }
}

/// Combined output of the match -> estimate -> aggregate pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectEvaluation {
    pub matches: Vec<MatchResult>,
    pub batch: EstimateBatch,
    pub snapshot: PortfolioSnapshot,
}

/// Errors that fail an engine call outright. Line-level conditions are
/// reported through [`EstimateBatch::skipped`] instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid project input: {field} must be a non-negative finite number (got {value})")]
    InvalidInput { field: &'static str, value: f64 },
}

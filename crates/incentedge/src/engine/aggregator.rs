use std::collections::BTreeSet;

use super::domain::{EstimateLine, EstimateStatus, PortfolioSnapshot};

/// Pure reduction over the line set. Cheap enough to recompute on every call
/// for the portfolio sizes this serves (at most a few hundred lines).
pub(crate) fn aggregate_lines(lines: &[EstimateLine]) -> PortfolioSnapshot {
    if lines.is_empty() {
        return PortfolioSnapshot::default();
    }

    let mut snapshot = PortfolioSnapshot::default();
    let mut confidence_sum = 0.0;
    let mut active_programs: BTreeSet<&str> = BTreeSet::new();

    for line in lines {
        snapshot.total += line.amount;
        snapshot.expected += line.amount * line.confidence;
        confidence_sum += line.confidence;

        match line.status {
            EstimateStatus::Applied | EstimateStatus::Approved => {
                snapshot.pipeline += line.amount;
            }
            EstimateStatus::Received => snapshot.received += line.amount,
            EstimateStatus::Estimated | EstimateStatus::Rejected => {}
        }

        if line.status != EstimateStatus::Rejected {
            active_programs.insert(line.program_id.0.as_str());
        }
    }

    // A zero-value portfolio has captured nothing, not NaN percent.
    snapshot.capture_rate = if snapshot.total > 0.0 {
        (snapshot.received / snapshot.total) * 100.0
    } else {
        0.0
    };
    snapshot.program_count = active_programs.len();
    snapshot.avg_confidence = confidence_sum / lines.len() as f64;

    snapshot
}

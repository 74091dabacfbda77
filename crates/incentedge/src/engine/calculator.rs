use super::config::EngineConfig;
use super::domain::{
    EstimateBatch, EstimateLine, EstimateStatus, IncentiveFormula, MatchResult, ProgramId,
    ProjectInput, SkipReason, SkippedEstimate,
};

struct PricedLine {
    line: EstimateLine,
    exclusive_with: Vec<ProgramId>,
    retained: bool,
}

pub(crate) fn estimate_lines(
    matches: &[MatchResult],
    project: &ProjectInput,
    config: &EngineConfig,
) -> EstimateBatch {
    let mut priced = Vec::new();
    let mut skipped = Vec::new();

    for result in matches.iter().filter(|result| result.eligible) {
        let program = &result.program;

        let amount = match raw_amount(&program.formula, project) {
            Some(amount) => amount,
            None => {
                // One unpriceable catalog entry must not block the batch.
                let kind = match &program.formula {
                    IncentiveFormula::Unknown { kind } => kind.clone(),
                    _ => unreachable!("priced formulas always produce an amount"),
                };
                skipped.push(SkippedEstimate {
                    program_id: program.id.clone(),
                    reason: SkipReason::UnrecognizedFormula { kind },
                });
                continue;
            }
        };

        let confidence = config
            .confidence_override
            .unwrap_or(program.base_confidence)
            .clamp(0.0, 1.0);

        priced.push(PricedLine {
            line: EstimateLine {
                program_id: program.id.clone(),
                program_name: program.name.clone(),
                amount,
                confidence,
                status: EstimateStatus::Estimated,
            },
            exclusive_with: program.exclusive_with.clone(),
            retained: true,
        });
    }

    if config.apply_stacking_rules {
        resolve_stacking(&mut priced, &mut skipped);
    }

    EstimateBatch {
        lines: priced
            .into_iter()
            .filter(|entry| entry.retained)
            .map(|entry| entry.line)
            .collect(),
        skipped,
    }
}

/// Amounts are rounded to cents so rate arithmetic does not leak binary
/// float noise into monetary output.
fn raw_amount(formula: &IncentiveFormula, project: &ProjectInput) -> Option<f64> {
    let amount = match formula {
        IncentiveFormula::PercentageOfCost { rate, cap } => {
            (project.total_budget * rate).min(*cap)
        }
        IncentiveFormula::PerUnit { rate, cap } => (project.unit_count as f64 * rate).min(*cap),
        IncentiveFormula::Flat { amount, cap } => amount.min(*cap),
        IncentiveFormula::Unknown { .. } => return None,
    };

    Some((amount * 100.0).round() / 100.0)
}

/// Mutual exclusivity needs both raw amounts, so this runs only after every
/// line is priced. The lower-amount member of each exclusive pair is dropped;
/// ties keep the earlier catalog entry.
fn resolve_stacking(priced: &mut [PricedLine], skipped: &mut Vec<SkippedEstimate>) {
    for first in 0..priced.len() {
        if !priced[first].retained {
            continue;
        }
        for second in (first + 1)..priced.len() {
            if !priced[second].retained || !mutually_exclusive(&priced[first], &priced[second]) {
                continue;
            }

            let (winner, loser) = if priced[second].line.amount > priced[first].line.amount {
                (second, first)
            } else {
                (first, second)
            };

            priced[loser].retained = false;
            let kept = priced[winner].line.program_id.clone();
            skipped.push(SkippedEstimate {
                program_id: priced[loser].line.program_id.clone(),
                reason: SkipReason::ExcludedByStackingRule { kept },
            });

            if loser == first {
                break;
            }
        }
    }
}

fn mutually_exclusive(a: &PricedLine, b: &PricedLine) -> bool {
    a.exclusive_with.contains(&b.line.program_id) || b.exclusive_with.contains(&a.line.program_id)
}

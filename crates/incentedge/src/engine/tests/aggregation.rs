use super::common::*;
use crate::engine::domain::{EstimateStatus, IncentiveFormula, PortfolioSnapshot};

#[test]
fn empty_set_yields_the_zero_snapshot() {
    let snapshot = engine().aggregate(&[]);
    assert_eq!(snapshot, PortfolioSnapshot::default());
    assert_eq!(snapshot.capture_rate, 0.0);
}

#[test]
fn totals_and_expected_value() {
    let lines = vec![
        line("a", 100_000.0, 0.75, EstimateStatus::Estimated),
        line("b", 50_000.0, 0.25, EstimateStatus::Estimated),
    ];

    let snapshot = engine().aggregate(&lines);

    assert_eq!(snapshot.total, 150_000.0);
    assert_eq!(snapshot.expected, 87_500.0);
    assert!(snapshot.expected <= snapshot.total);
    assert_eq!(snapshot.program_count, 2);
    assert_eq!(snapshot.avg_confidence, 0.5);
}

#[test]
fn pipeline_covers_applied_and_approved_only() {
    let lines = vec![
        line("a", 100.0, 1.0, EstimateStatus::Estimated),
        line("b", 200.0, 1.0, EstimateStatus::Applied),
        line("c", 300.0, 1.0, EstimateStatus::Approved),
        line("d", 400.0, 1.0, EstimateStatus::Received),
    ];

    let snapshot = engine().aggregate(&lines);

    assert_eq!(snapshot.pipeline, 500.0);
    assert_eq!(snapshot.received, 400.0);
    assert!(snapshot.pipeline <= snapshot.total);
}

#[test]
fn capture_rate_is_received_over_total_in_percent() {
    let lines = vec![
        line("a", 750.0, 1.0, EstimateStatus::Estimated),
        line("b", 250.0, 1.0, EstimateStatus::Received),
    ];

    let snapshot = engine().aggregate(&lines);

    assert_eq!(snapshot.capture_rate, 25.0);
}

#[test]
fn zero_value_lines_do_not_divide_by_zero() {
    let lines = vec![
        line("a", 0.0, 0.5, EstimateStatus::Received),
        line("b", 0.0, 0.5, EstimateStatus::Estimated),
    ];

    let snapshot = engine().aggregate(&lines);

    assert_eq!(snapshot.total, 0.0);
    assert_eq!(snapshot.capture_rate, 0.0);
}

#[test]
fn rejected_lines_leave_the_program_count() {
    let lines = vec![
        line("a", 100.0, 1.0, EstimateStatus::Approved),
        line("b", 200.0, 1.0, EstimateStatus::Rejected),
    ];

    let snapshot = engine().aggregate(&lines);

    assert_eq!(snapshot.program_count, 1);
}

#[test]
fn federal_itc_end_to_end() {
    // catalog = [fed-itc: percentage-of-cost 30% capped at 1,000,000],
    // project budget 2,000,000 -> one 600,000 line.
    let catalog = catalog(vec![{
        let mut itc = program(
            "fed-itc",
            IncentiveFormula::PercentageOfCost {
                rate: 0.30,
                cap: 1_000_000.0,
            },
        );
        itc.eligibility.project_types = vec![crate::engine::domain::ProjectType::Solar];
        itc
    }]);
    let project = solar_project(2_000_000.0);

    let evaluation = engine().evaluate(&catalog, &project).expect("evaluates");

    assert_eq!(evaluation.matches.len(), 1);
    assert!(evaluation.matches[0].eligible);
    assert_eq!(evaluation.batch.lines.len(), 1);
    assert_eq!(evaluation.batch.lines[0].amount, 600_000.0);
    assert_eq!(evaluation.snapshot.total, 600_000.0);
}

#[test]
fn pipeline_is_idempotent_over_identical_inputs() {
    let catalog = catalog(vec![
        program(
            "itc",
            IncentiveFormula::PercentageOfCost {
                rate: 0.30,
                cap: 1_000_000.0,
            },
        ),
        program(
            "rebate",
            IncentiveFormula::PerUnit {
                rate: 350.0,
                cap: 250_000.0,
            },
        ),
    ]);
    let project = solar_project(2_000_000.0);
    let engine = engine();

    let first = engine.evaluate(&catalog, &project).expect("evaluates");
    let second = engine.evaluate(&catalog, &project).expect("evaluates");

    assert_eq!(first, second);
}

use crate::infra::{default_engine_config, InMemoryPortfolioRepository};
use clap::Args;
use incentedge::catalog::CatalogSnapshot;
use incentedge::engine::domain::{
    EstimateStatus, ProjectInput, ProjectLocation, ProjectType,
};
use incentedge::engine::{IncentiveEngine, ProjectEvaluation};
use incentedge::error::AppError;
use incentedge::portfolio::{PortfolioService, ProjectId};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Load the program catalog from this CSV file instead of the builtin set
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Project technology (solar, wind, geothermal, storage,
    /// energy-efficiency, ev-charging, hvac, lighting)
    #[arg(long, value_parser = parse_project_type)]
    pub(crate) project_type: ProjectType,
    /// Project size in units (panels, fixtures, kW blocks)
    #[arg(long, default_value_t = 100)]
    pub(crate) units: i64,
    /// Total project budget in dollars
    #[arg(long)]
    pub(crate) budget: f64,
    /// Two-letter state code
    #[arg(long)]
    pub(crate) state: String,
    /// City, for local program matching
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Utility territory, for utility program matching
    #[arg(long)]
    pub(crate) utility: Option<String>,
    /// Mark the project as a retrofit rather than new construction
    #[arg(long)]
    pub(crate) retrofit: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Load the program catalog from this CSV file instead of the builtin set
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn parse_project_type(value: &str) -> Result<ProjectType, String> {
    ProjectType::parse(value).ok_or_else(|| format!("unknown project type '{value}'"))
}

fn load_catalog(path: Option<&PathBuf>) -> Result<CatalogSnapshot, AppError> {
    Ok(match path {
        Some(path) => CatalogSnapshot::from_csv_path(path)?,
        None => CatalogSnapshot::builtin(),
    })
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_ref())?;

    let project = ProjectInput {
        project_type: args.project_type,
        unit_count: args.units,
        total_budget: args.budget,
        location: ProjectLocation {
            state: args.state,
            city: args.city,
            utility: args.utility,
        },
        retrofit: args.retrofit,
    };

    let engine = IncentiveEngine::new(default_engine_config());
    let evaluation = engine.evaluate(&catalog, &project)?;

    print_evaluation(&project, &evaluation);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = load_catalog(args.catalog.as_ref())?;

    println!("IncentEdge incentive engine demo");
    println!("================================");
    println!(
        "Catalog: {} programs (loaded {})",
        catalog.len(),
        catalog.loaded_at().format("%Y-%m-%d %H:%M UTC")
    );

    let project = ProjectInput {
        project_type: ProjectType::Solar,
        unit_count: 150,
        total_budget: 2_000_000.0,
        location: ProjectLocation {
            state: "NY".to_string(),
            city: Some("New York".to_string()),
            utility: Some("Con Edison".to_string()),
        },
        retrofit: false,
    };

    println!();
    println!(
        "Project: {} | {} units | ${:.0} budget | {}, {}",
        project.project_type.label(),
        project.unit_count,
        project.total_budget,
        project.location.city.as_deref().unwrap_or("-"),
        project.location.state
    );

    let repository = Arc::new(InMemoryPortfolioRepository::default());
    let service = PortfolioService::new(repository, default_engine_config());
    let project_id = ProjectId("demo-project".to_string());

    let report = service.run_estimate(&project_id, &catalog, &project)?;

    println!();
    println!("Matched programs:");
    for result in &report.matches {
        if result.eligible {
            println!("  [x] {} ({})", result.program.name, result.program.id.0);
        } else if let Some(reason) = result.reason {
            println!(
                "  [ ] {} ({}) - {}",
                result.program.name,
                result.program.id.0,
                reason.label()
            );
        }
    }

    if !report.skipped.is_empty() {
        println!();
        println!("Skipped during estimation:");
        for skip in &report.skipped {
            println!("  {} - {:?}", skip.program_id.0, skip.reason);
        }
    }

    println!();
    println!("Estimate lines:");
    for entry in &report.entries {
        println!(
            "  {:<24} ${:>12.0}  confidence {:.0}%",
            entry.line.program_name,
            entry.line.amount,
            entry.line.confidence * 100.0
        );
    }

    // Walk the first line through the application lifecycle so the capture
    // KPIs have something to show.
    if let Some(first) = report.entries.first() {
        service.advance(&first.id, EstimateStatus::Applied)?;
        service.advance(&first.id, EstimateStatus::Approved)?;
        service.advance(&first.id, EstimateStatus::Received)?;
    }

    let snapshot = service.snapshot(&project_id)?;
    println!();
    println!("Portfolio KPIs:");
    println!("  Total potential    ${:.0}", snapshot.total);
    println!("  Expected value     ${:.0}", snapshot.expected);
    println!("  Pipeline           ${:.0}", snapshot.pipeline);
    println!("  Received           ${:.0}", snapshot.received);
    println!("  Capture rate       {:.1}%", snapshot.capture_rate);
    println!("  Programs           {}", snapshot.program_count);
    println!("  Avg confidence     {:.0}%", snapshot.avg_confidence * 100.0);

    Ok(())
}

fn print_evaluation(project: &ProjectInput, evaluation: &ProjectEvaluation) {
    let eligible = evaluation
        .matches
        .iter()
        .filter(|result| result.eligible)
        .count();

    println!(
        "{} of {} programs match this {} project",
        eligible,
        evaluation.matches.len(),
        project.project_type.label()
    );

    for line in &evaluation.batch.lines {
        println!(
            "  {:<24} ${:>12.0}  confidence {:.0}%",
            line.program_name,
            line.amount,
            line.confidence * 100.0
        );
    }
    for skip in &evaluation.batch.skipped {
        println!("  {:<24} skipped ({:?})", skip.program_id.0, skip.reason);
    }

    println!();
    println!(
        "Total ${:.0} | expected ${:.0} | avg confidence {:.0}%",
        evaluation.snapshot.total,
        evaluation.snapshot.expected,
        evaluation.snapshot.avg_confidence * 100.0
    );
}

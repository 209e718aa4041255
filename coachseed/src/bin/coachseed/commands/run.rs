use anyhow::{Context, Result};
use clap::Args;
use coachseed::{MigrationRegistry, MigrationRunner, RunReport};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, PlanView};
use crate::utils::format_elapsed;

pub const EXAMPLES: &[ExampleGroup] = &[
    ExampleGroup {
        title: "Apply Migrations",
        commands: &[
            "coachseed run                        # Create collections, then apply pending migrations",
            "coachseed run --skip-collections     # Apply pending migrations only",
        ],
    },
    ExampleGroup {
        title: "Preview",
        commands: &[
            "coachseed run --dry-run              # List pending migrations without running them",
            "coachseed --output json run          # Machine-readable report",
        ],
    },
];

#[derive(Args)]
pub struct RunArgs {
    /// Preview pending migrations without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Skip creating collections and search indexes
    #[arg(long)]
    pub skip_collections: bool,
}

pub async fn handle_run(args: RunArgs, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    output.heading(if args.dry_run { "Migration Plan" } else { "Run Migrations" });

    let registry = MigrationRegistry::builtin().context("Invalid migration registry")?;
    output.verbose(&format!("Registered: {}", registry.names().join(", ")));

    let mut store = ctx.connect(output).await?;
    let mut runner = MigrationRunner::new(&mut store, &registry).skip_collections(args.skip_collections);

    if args.dry_run {
        output.warning("DRY RUN MODE - No changes will be made");
        let plan = runner.plan().await.context("Failed to read the migration log")?;
        if plan.is_empty() {
            output.success("All migrations are up to date");
        } else {
            output.info(&format!("{} migration(s) pending", plan.len()));
        }
        output.display(&PlanView(plan))?;
        return Ok(());
    }

    output.progress("Applying migrations");
    let report = runner.run().await;
    output.clear_line();

    render_collections(&report, output);
    output.display(&report)?;
    render_summary(&report, output);
    Ok(())
}

fn render_collections(report: &RunReport, output: &OutputManager) {
    let Some(collections) = &report.collections else {
        return;
    };

    output.heading("Collections");
    if collections.created.is_empty() {
        output.info(&format!("{} collection(s) already present", collections.existing.len()));
    } else {
        output.success(&format!("Created: {}", collections.created.join(", ")));
    }
    if !collections.indexed.is_empty() {
        output.success(&format!("Indexed: {}", collections.indexed.join(", ")));
    }
    for issue in &collections.issues {
        output.warning(&format!("{} ({:?}): {}", issue.collection, issue.stage, issue.message));
    }

    output.heading("Migrations");
}

fn render_summary(report: &RunReport, output: &OutputManager) {
    if !report.warnings.is_empty() {
        output.heading("Skipped Items");
        for warning in &report.warnings {
            output.warning(&format!("{} {}: {}", warning.migration, warning.item, warning.message));
        }
    }

    output.heading("Summary");

    if report.applied() > 0 {
        output.success(&format!(
            "{} migration(s) applied in {}",
            report.applied(),
            format_elapsed(report.total_time_ms)
        ));
    } else if report.failed() == 0 {
        output.success("All migrations are up to date");
    }

    if report.skipped() > 0 {
        output.info(&format!("{} migration(s) already applied", report.skipped()));
    }

    for (name, error) in report.errors() {
        output.error(&format!("{name}: {error}"));
    }
}

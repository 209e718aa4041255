use anyhow::{Context, Result};
use coachseed::{MigrationRegistry, MigrationRunner, RollbackOutcome};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Revert",
    commands: &[
        "coachseed rollback                   # Revert the most recently applied migration",
        "coachseed status                     # Check which migration is the latest first",
    ],
}];

pub async fn handle_rollback(ctx: &AppContext, output: &OutputManager) -> Result<()> {
    output.heading("Rollback");

    let registry = MigrationRegistry::builtin().context("Invalid migration registry")?;
    let mut store = ctx.connect(output).await?;
    let mut runner = MigrationRunner::new(&mut store, &registry);

    output.progress("Rolling back");
    let outcome = runner.rollback_last().await;
    output.clear_line();

    let outcome = outcome.context("Rollback failed")?;
    output.display(&outcome)?;

    match &outcome {
        RollbackOutcome::NothingToRollback => output.info("Nothing to roll back"),
        RollbackOutcome::RolledBack { name, warnings } => {
            for warning in warnings {
                output.warning(&format!("{}: {}", warning.item, warning.message));
            }
            output.success(&format!("Rolled back '{name}'"));
        }
    }
    Ok(())
}

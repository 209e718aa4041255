use anyhow::{Context, Result};
use coachseed::{MigrationRegistry, MigrationRunner};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, StatusView};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Inspect",
    commands: &[
        "coachseed status                     # Applied and pending migrations",
        "coachseed --output compact status    # One-line summary",
    ],
}];

pub async fn handle_status(ctx: &AppContext, output: &OutputManager) -> Result<()> {
    output.heading("Migration Status");

    let registry = MigrationRegistry::builtin().context("Invalid migration registry")?;
    let mut store = ctx.connect(output).await?;
    let mut runner = MigrationRunner::new(&mut store, &registry);

    let statuses = runner.status().await.context("Failed to read the migration log")?;
    let applied = statuses.iter().filter(|status| status.applied).count();

    output.display(&StatusView(statuses))?;
    output.key_value("Applied", &applied.to_string());
    output.key_value("Registered", &registry.len().to_string());
    Ok(())
}

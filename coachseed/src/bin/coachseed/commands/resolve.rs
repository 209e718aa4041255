use anyhow::{Context, Result};
use clap::Args;
use coachseed::{MigrationRegistry, MigrationRunner, Resolution};

use crate::context::AppContext;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, ResolveView};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Recovery",
    commands: &[
        "coachseed resolve 2-users --applied       # Mark migration as applied",
        "coachseed resolve 2-users --rolled-back   # Mark migration as rolled back",
    ],
}];

#[derive(Args)]
pub struct ResolveArgs {
    /// Migration name to resolve
    pub migration_name: String,

    /// Mark the migration as applied
    #[arg(long, conflicts_with = "rolled_back", required_unless_present = "rolled_back")]
    pub applied: bool,

    /// Mark the migration as rolled back
    #[arg(long, conflicts_with = "applied")]
    pub rolled_back: bool,
}

pub async fn handle_resolve(args: ResolveArgs, ctx: &AppContext, output: &OutputManager) -> Result<()> {
    output.heading("Resolve Migration");

    let registry = MigrationRegistry::builtin().context("Invalid migration registry")?;
    let mut store = ctx.connect(output).await?;
    let mut runner = MigrationRunner::new(&mut store, &registry);

    let name = args.migration_name.as_str();
    let resolution = if args.applied {
        Resolution::Applied
    } else {
        Resolution::RolledBack
    };

    let changed = runner
        .resolve(name, resolution)
        .await
        .with_context(|| format!("Failed to resolve '{name}'"))?;

    match (resolution, changed) {
        (Resolution::Applied, true) => output.success(&format!("Marked '{name}' as applied")),
        (Resolution::Applied, false) => {
            output.warning(&format!("Migration '{name}' is already marked as applied"))
        }
        (Resolution::RolledBack, true) => output.success(&format!("Marked '{name}' as rolled back")),
        (Resolution::RolledBack, false) => {
            output.warning(&format!("Migration '{name}' is not marked as applied"))
        }
    }
    output.display(&ResolveView {
        migration: args.migration_name.clone(),
        resolution,
        changed,
    })?;
    Ok(())
}

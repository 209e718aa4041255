mod commands;
mod context;
mod examples;
mod help;
mod output;
mod theme;
mod utils;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand, error::ErrorKind};

use commands::{
    resolve::{ResolveArgs, handle_resolve},
    rollback::handle_rollback,
    run::{RunArgs, handle_run},
    status::handle_status,
};
use context::AppContext;
use output::{GlobalOptions, OutputFormat, OutputManager};

#[derive(Parser)]
#[command(name = "coachseed")]
#[command(version)]
#[command(
    about = "Collection bootstrap and seed migrations for the coaching platform",
    long_about = r#"Prepares a coaching platform document store:

• Creates every registered collection and its search index
• Applies seed migrations in order, exactly once
• Reverts the most recent migration on demand

Commands:
  run       Create collections and apply pending migrations
  rollback  Revert the most recently applied migration
  status    Show applied and pending migrations
  resolve   Mark a migration as applied or rolled back without running it
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (defaults to ./coachseed.toml when present)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Store URL, overrides the configuration file
    #[arg(long, value_name = "URL", env = "COACHSEED_STORE_URL", global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create collections and apply pending migrations
    Run(RunArgs),

    /// Revert the most recently applied migration
    Rollback,

    /// Show applied and pending migrations
    Status,

    /// Mark a migration as applied or rolled back without running it
    Resolve(ResolveArgs),
}

impl Cli {
    /// Parse arguments with styled help. Help, version and usage errors exit here.
    fn parse_styled() -> Self {
        let matches = match help::decorate(Cli::command()).try_get_matches() {
            Ok(matches) => matches,
            Err(err) => exit_with(err),
        };
        Cli::from_arg_matches(&matches).unwrap_or_else(|err| exit_with(err))
    }
}

fn exit_with(err: clap::Error) -> ! {
    let to_stdout = matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
    blank_line(to_stdout);
    if let Err(print_err) = err.print()
        && print_err.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("Failed to write help: {print_err}");
    }
    blank_line(to_stdout);
    std::process::exit(err.exit_code());
}

fn blank_line(to_stdout: bool) {
    let _ = if to_stdout {
        io::stdout().write_all(b"\n").and_then(|()| io::stdout().flush())
    } else {
        io::stderr().write_all(b"\n").and_then(|()| io::stderr().flush())
    };
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse_styled();

    blank_line(true);
    let result = execute(cli).await;
    blank_line(true);

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let options = GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    };
    if options.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(options);
    let ctx = AppContext::load(cli.config.as_deref(), cli.url)?;

    match cli.command {
        Commands::Run(args) => handle_run(args, &ctx, &output).await,
        Commands::Rollback => handle_rollback(&ctx, &output).await,
        Commands::Status => handle_status(&ctx, &output).await,
        Commands::Resolve(args) => handle_resolve(args, &ctx, &output).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::examples::command_examples;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
        help::decorate(Cli::command()).debug_assert();
    }

    #[test]
    fn resolve_requires_a_direction() {
        assert!(Cli::try_parse_from(["coachseed", "resolve", "2-users"]).is_err());
        assert!(Cli::try_parse_from(["coachseed", "resolve", "2-users", "--applied", "--rolled-back"]).is_err());

        let cli = Cli::try_parse_from(["coachseed", "resolve", "2-users", "--rolled-back"]).unwrap();
        assert!(matches!(cli.command, Commands::Resolve(args) if args.rolled_back && !args.applied));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["coachseed", "run", "--dry-run", "--output", "json", "--url", "redis://x/"])
            .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.url.as_deref(), Some("redis://x/"));
        assert!(matches!(cli.command, Commands::Run(args) if args.dry_run && !args.skip_collections));
    }

    #[test]
    fn decorated_command_parses_into_cli() {
        let matches = help::decorate(Cli::command())
            .try_get_matches_from(["coachseed", "--no-color", "resolve", "1-roles", "--applied"])
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();
        assert!(cli.no_color);
        assert!(matches!(cli.command, Commands::Resolve(args) if args.migration_name == "1-roles" && args.applied));
    }

    #[test]
    fn examples_cover_every_subcommand() {
        let command = Cli::command();
        for example in command_examples() {
            assert!(command.find_subcommand(example.name).is_some(), "{}", example.name);
        }
    }
}

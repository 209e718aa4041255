use anyhow::Result;
use clap::ValueEnum;
use coachseed::{MigrationStatus, OutcomeKind, PlannedMigration, Resolution, RollbackOutcome, RunReport};
use colored::{Color, ColoredString, Colorize};
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;
use std::io::Write;

use crate::theme::{ICONS, THEME, outcome_color};
use crate::utils::{format_date, format_elapsed};

/// How results and tables are rendered
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Bordered tables and colored status lines
    #[default]
    Table,
    /// Pretty-printed JSON on stdout, nothing else
    Json,
    /// One line per result
    Compact,
}

#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Renders a result in the table and compact formats. JSON goes through serde.
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
    fn to_compact(&self) -> String;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Status lines are suppressed in quiet and JSON modes.
    fn is_chatty(&self) -> bool {
        !self.options.quiet && self.options.output_format != OutputFormat::Json
    }

    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        let rendered = match self.options.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(data)?,
            OutputFormat::Table => data.to_table(&self.options).to_string(),
            OutputFormat::Compact => data.to_compact(),
        };
        println!("{rendered}");
        Ok(())
    }

    fn paint(&self, text: &str, color: Color) -> ColoredString {
        if self.options.no_color { text.normal() } else { text.color(color) }
    }

    fn status_line(&self, icon: &str, message: &str, color: Color) -> String {
        format!("{} {}", self.paint(icon, color), self.paint(message, color))
    }

    pub fn success(&self, message: &str) {
        if self.is_chatty() {
            println!("{}", self.status_line(ICONS.success, message, THEME.success));
        }
    }

    /// Always printed, on stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.status_line(ICONS.error, message, THEME.error));
    }

    pub fn warning(&self, message: &str) {
        if self.is_chatty() {
            println!("{}", self.status_line(ICONS.warning, message, THEME.warning));
        }
    }

    pub fn info(&self, message: &str) {
        if self.is_chatty() {
            println!("{}", self.status_line(ICONS.info, message, THEME.info));
        }
    }

    /// Only with `--verbose`. Goes to stderr so JSON output stays parseable.
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", self.status_line(ICONS.arrow, message, THEME.muted));
        }
    }

    pub fn heading(&self, text: &str) {
        if !self.is_chatty() {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(THEME.heading).bold());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if self.is_chatty() {
            println!("{}: {}", self.paint(key, THEME.label).bold(), self.paint(value, THEME.text));
        }
    }

    pub fn bullet(&self, text: &str) {
        if self.is_chatty() {
            println!("  {} {text}", self.paint(ICONS.bullet, THEME.muted));
        }
    }

    /// Transient line, overwritten by the next `clear_line`.
    pub fn progress(&self, message: &str) {
        if self.is_chatty() {
            print!("\r{}...", self.status_line(ICONS.loading, message, THEME.accent));
            let _ = std::io::stdout().flush();
        }
    }

    pub fn clear_line(&self) {
        if self.is_chatty() {
            print!("\r{:80}\r", "");
            let _ = std::io::stdout().flush();
        }
    }
}

fn themed_table(options: &GlobalOptions, headers: &[&str]) -> Table {
    let preset = if options.no_color {
        comfy_table::presets::ASCII_FULL
    } else {
        comfy_table::presets::UTF8_FULL_CONDENSED
    };
    let mut table = Table::new();
    table.load_preset(preset).set_header(headers.iter().map(|title| {
        let cell = Cell::new(title).add_attribute(Attribute::Bold);
        if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
    }));
    table
}

fn colored_cell(text: &str, color: TableColor, options: &GlobalOptions) -> Cell {
    if options.no_color {
        Cell::new(text)
    } else {
        Cell::new(text).fg(color)
    }
}

fn outcome_label(kind: OutcomeKind) -> &'static str {
    match kind {
        OutcomeKind::Applied => "applied",
        OutcomeKind::Skipped => "skipped",
        OutcomeKind::Failed => "failed",
    }
}

impl TableDisplay for RunReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Migration", "Result", "Time", "Detail"]);

        for outcome in &self.migrations {
            let label = format!("{} {}", ICONS.outcome(outcome.kind), outcome_label(outcome.kind));
            let color = outcome_color(outcome.kind);
            let warnings = self
                .warnings
                .iter()
                .filter(|warning| warning.migration == outcome.name)
                .count();
            let detail = match (&outcome.error, warnings) {
                (Some(error), _) => error.clone(),
                (None, 0) => String::new(),
                (None, count) => format!("{count} item(s) skipped"),
            };
            table.add_row(vec![
                Cell::new(&outcome.name),
                colored_cell(&label, color, options),
                Cell::new(format_elapsed(outcome.elapsed_ms)),
                Cell::new(detail),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        let mut line = format!(
            "applied={} skipped={} failed={} warnings={}",
            self.applied(),
            self.skipped(),
            self.failed(),
            self.warnings.len()
        );
        if let Some(collections) = &self.collections {
            line.push_str(&format!(
                " collections_created={} collection_issues={}",
                collections.created.len(),
                collections.issues.len()
            ));
        }
        line.push_str(&format!(" time={}ms", self.total_time_ms));
        line
    }
}

impl TableDisplay for RollbackOutcome {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Rollback", "Detail"]);
        match self {
            RollbackOutcome::NothingToRollback => {
                table.add_row(vec![Cell::new("-"), Cell::new("Nothing to roll back")]);
            }
            RollbackOutcome::RolledBack { name, warnings } => {
                let detail = if warnings.is_empty() {
                    "Rolled back".to_string()
                } else {
                    format!("Rolled back, {} item(s) skipped", warnings.len())
                };
                table.add_row(vec![Cell::new(name), colored_cell(&detail, TableColor::Green, options)]);
            }
        }
        table
    }

    fn to_compact(&self) -> String {
        match self {
            RollbackOutcome::NothingToRollback => "nothing_to_rollback".to_string(),
            RollbackOutcome::RolledBack { name, .. } => format!("rolled_back={name}"),
        }
    }
}

/// Registered migrations with their log state
#[derive(Serialize)]
#[serde(transparent)]
pub struct StatusView(pub Vec<MigrationStatus>);

impl TableDisplay for StatusView {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Migration", "State", "Applied At", "Requires"]);

        if self.0.is_empty() {
            table.add_row(vec![Cell::new("No migrations registered")]);
            return table;
        }

        for status in &self.0 {
            let (state, color) = match (status.applied, status.registered) {
                (true, true) => ("applied", TableColor::Green),
                (false, _) => ("pending", TableColor::Yellow),
                (true, false) => ("unregistered", TableColor::Red),
            };
            table.add_row(vec![
                Cell::new(&status.name),
                colored_cell(state, color, options),
                Cell::new(status.applied_at.as_deref().map(format_date).unwrap_or_default()),
                Cell::new(status.requires.join(", ")),
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        let applied = self.0.iter().filter(|status| status.applied).count();
        format!("applied={} pending={}", applied, self.0.len() - applied)
    }
}

/// Pending migrations of a dry run
#[derive(Serialize)]
#[serde(transparent)]
pub struct PlanView(pub Vec<PlannedMigration>);

impl TableDisplay for PlanView {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["#", "Migration", "Requires", "Note"]);

        if self.0.is_empty() {
            table.add_row(vec![Cell::new("-"), Cell::new("No pending migrations")]);
            return table;
        }

        for (index, planned) in self.0.iter().enumerate() {
            let note = if planned.is_blocked() {
                colored_cell(
                    &format!("would fail: missing {}", planned.blocked_by.join(", ")),
                    TableColor::Red,
                    options,
                )
            } else {
                Cell::new("")
            };
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(&planned.name),
                Cell::new(planned.requires.join(", ")),
                note,
            ]);
        }

        table
    }

    fn to_compact(&self) -> String {
        let names: Vec<&str> = self.0.iter().map(|planned| planned.name.as_str()).collect();
        format!("pending={} [{}]", names.len(), names.join(","))
    }
}

/// Log change made by `resolve`
#[derive(Serialize)]
pub struct ResolveView {
    pub migration: String,
    pub resolution: Resolution,
    /// False when the log already matched.
    pub changed: bool,
}

impl TableDisplay for ResolveView {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Migration", "Marked", "Changed"]);
        let marked = match self.resolution {
            Resolution::Applied => "applied",
            Resolution::RolledBack => "rolled back",
        };
        let changed = if self.changed {
            colored_cell("yes", TableColor::Green, options)
        } else {
            colored_cell("no", TableColor::DarkGrey, options)
        };
        table.add_row(vec![Cell::new(&self.migration), Cell::new(marked), changed]);
        table
    }

    fn to_compact(&self) -> String {
        let marked = match self.resolution {
            Resolution::Applied => "applied",
            Resolution::RolledBack => "rolled_back",
        };
        format!("resolved={} as={marked} changed={}", self.migration, self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coachseed::{MigrationOutcome, SeedWarning};

    fn report() -> RunReport {
        RunReport {
            store: "memory".to_string(),
            collections: None,
            migrations: vec![
                MigrationOutcome::skipped("1-roles"),
                MigrationOutcome {
                    name: "2-users".to_string(),
                    kind: OutcomeKind::Failed,
                    elapsed_ms: 3,
                    error: Some("required role 'Admin' not found".to_string()),
                },
            ],
            warnings: vec![SeedWarning {
                migration: "3-users-profiles".to_string(),
                item: "coach@example.com".to_string(),
                message: "role 'Coach' not found".to_string(),
            }],
            total_time_ms: 12,
        }
    }

    #[test]
    fn test_run_report_compact() {
        assert_eq!(
            report().to_compact(),
            "applied=0 skipped=1 failed=1 warnings=1 time=12ms"
        );
    }

    #[test]
    fn test_run_report_table_lists_every_migration() {
        let table = report().to_table(&GlobalOptions {
            no_color: true,
            ..Default::default()
        });
        let rendered = table.to_string();
        assert!(rendered.contains("1-roles"));
        assert!(rendered.contains("required role 'Admin' not found"));
    }

    #[test]
    fn test_rollback_compact() {
        assert_eq!(RollbackOutcome::NothingToRollback.to_compact(), "nothing_to_rollback");
        let rolled_back = RollbackOutcome::RolledBack {
            name: "1-roles".to_string(),
            warnings: Vec::new(),
        };
        assert_eq!(rolled_back.to_compact(), "rolled_back=1-roles");
    }

    #[test]
    fn test_status_view_serializes_as_list() {
        let view = StatusView(vec![MigrationStatus {
            name: "1-roles".to_string(),
            applied: false,
            applied_at: None,
            requires: Vec::new(),
            registered: true,
        }]);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.is_array());
        assert_eq!(view.to_compact(), "applied=0 pending=1");
    }

    #[test]
    fn test_empty_plan_still_renders() {
        let plan = PlanView(Vec::new());
        assert_eq!(serde_json::to_value(&plan).unwrap(), serde_json::json!([]));
        assert_eq!(plan.to_compact(), "pending=0 []");
        let table = plan.to_table(&GlobalOptions {
            no_color: true,
            ..Default::default()
        });
        assert!(table.to_string().contains("No pending migrations"));
    }

    #[test]
    fn test_resolve_view_json() {
        let view = ResolveView {
            migration: "2-users".to_string(),
            resolution: Resolution::RolledBack,
            changed: false,
        };
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({"migration": "2-users", "resolution": "rolled_back", "changed": false})
        );
        assert_eq!(view.to_compact(), "resolved=2-users as=rolled_back changed=false");
    }

    #[test]
    fn test_output_manager_quiet_display() {
        let manager = OutputManager::new(GlobalOptions {
            quiet: true,
            ..Default::default()
        });
        assert!(manager.display(&report()).is_ok());
    }
}

//! Styled `--help` output: colors, per-command examples and the environment appendix.

use std::fmt::Write;

use clap::{
    ColorChoice, Command,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, RgbColor, Style},
    },
};
use colored::{Color, Colorize, control::ShouldColorize};

use crate::examples::{ExampleGroup, command_examples};
use crate::theme::{ICONS, THEME};

pub const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL used by the default configuration"),
    ("COACHSEED_STORE_URL", "Overrides the configured store URL (same as --url)"),
    ("RUST_LOG", "Log filter for diagnostic output, e.g. coachseed=debug"),
];

/// Decorate the derived command with styles, examples and the appendix.
pub fn decorate(command: Command) -> Command {
    let use_color = ShouldColorize::from_env().should_colorize();
    let mut command = command
        .styles(styles())
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never })
        .after_long_help(appendix(use_color));

    for example in command_examples() {
        let groups = example.groups;
        command = command.mut_subcommand(example.name, |sub| sub.after_long_help(examples(groups, use_color)));
    }
    command
}

fn styles() -> Styles {
    let fg = |color: Color| Style::new().fg_color(Some(clap_color(color)));
    Styles::styled()
        .usage(fg(THEME.heading).bold())
        .header(fg(THEME.accent).bold())
        .literal(fg(THEME.example))
        .placeholder(fg(THEME.muted))
        .valid(fg(THEME.success))
        .invalid(fg(THEME.warning))
        .error(fg(THEME.error).bold())
}

pub fn examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", paint("Examples:", THEME.accent, true, use_color));

    for (index, group) in groups.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "  {}", paint(group.title, THEME.heading, true, use_color));
        for line in group.commands {
            let _ = writeln!(
                out,
                "    {} {}",
                paint(ICONS.arrow, THEME.example, false, use_color),
                paint(line, THEME.example, false, use_color)
            );
        }
    }
    out
}

fn appendix(use_color: bool) -> String {
    let width = ENVIRONMENT_VARIABLES
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "{}", paint("Environment Variables:", THEME.accent, true, use_color));
    for (name, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(
            out,
            "  {}  {}",
            paint(&format!("{name:<width$}"), THEME.label, true, use_color),
            paint(description, THEME.text, false, use_color)
        );
    }
    let _ = writeln!(
        out,
        "\n{} {}",
        paint("Tip:", THEME.accent, true, use_color),
        paint(
            "Run 'coachseed <command> --help' for examples of each command.",
            THEME.example,
            false,
            use_color
        )
    );
    out
}

fn paint(text: &str, color: Color, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, false) => text.color(color).to_string(),
        (true, true) => text.color(color).bold().to_string(),
    }
}

fn clap_color(color: Color) -> ClapColor {
    let ansi = match color {
        Color::Black => AnsiColor::Black,
        Color::Red => AnsiColor::Red,
        Color::Green => AnsiColor::Green,
        Color::Yellow => AnsiColor::Yellow,
        Color::Blue => AnsiColor::Blue,
        Color::Magenta => AnsiColor::Magenta,
        Color::Cyan => AnsiColor::Cyan,
        Color::White => AnsiColor::White,
        Color::BrightBlack => AnsiColor::BrightBlack,
        Color::BrightRed => AnsiColor::BrightRed,
        Color::BrightGreen => AnsiColor::BrightGreen,
        Color::BrightYellow => AnsiColor::BrightYellow,
        Color::BrightBlue => AnsiColor::BrightBlue,
        Color::BrightMagenta => AnsiColor::BrightMagenta,
        Color::BrightCyan => AnsiColor::BrightCyan,
        Color::BrightWhite => AnsiColor::BrightWhite,
        Color::TrueColor { r, g, b } => return ClapColor::Rgb(RgbColor(r, g, b)),
    };
    ClapColor::Ansi(ansi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_examples_have_no_escape_codes() {
        let rendered = examples(crate::commands::run::EXAMPLES, false);
        assert!(rendered.starts_with("Examples:\n"));
        assert!(rendered.contains("coachseed run --dry-run"));
        assert!(!rendered.contains('\u{1b}'));
    }

    #[test]
    fn appendix_lists_every_variable() {
        let rendered = appendix(false);
        for (name, _) in ENVIRONMENT_VARIABLES {
            assert!(rendered.contains(name));
        }
    }

    #[test]
    fn true_color_maps_to_rgb() {
        assert_eq!(
            clap_color(Color::TrueColor { r: 1, g: 2, b: 3 }),
            ClapColor::Rgb(RgbColor(1, 2, 3))
        );
        assert_eq!(clap_color(Color::Cyan), ClapColor::Ansi(AnsiColor::Cyan));
    }
}

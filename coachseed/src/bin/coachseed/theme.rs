use coachseed::OutcomeKind;
use colored::Color;
use comfy_table::Color as TableColor;
use once_cell::sync::Lazy;

/// Terminal colors for messages and help text
pub struct ColorTheme {
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    /// Section headings and the usage line
    pub heading: Color,
    /// Progress lines and help section titles
    pub accent: Color,
    pub muted: Color,
    /// Command lines in help examples
    pub example: Color,
    pub label: Color,
    pub text: Color,
}

pub static THEME: Lazy<ColorTheme> = Lazy::new(|| ColorTheme {
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    info: Color::Blue,
    heading: Color::BrightBlue,
    accent: Color::Cyan,
    muted: Color::BrightBlack,
    example: Color::Magenta,
    label: Color::BrightCyan,
    text: Color::White,
});

/// Table cell color for a migration outcome
pub fn outcome_color(kind: OutcomeKind) -> TableColor {
    match kind {
        OutcomeKind::Applied => TableColor::Green,
        OutcomeKind::Skipped => TableColor::DarkGrey,
        OutcomeKind::Failed => TableColor::Red,
    }
}

/// Glyphs prefixed to messages and table cells
pub struct Icons {
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
    pub arrow: &'static str,
    pub bullet: &'static str,
    pub loading: &'static str,
    pub skip: &'static str,
}

pub const ICONS: Icons = Icons {
    success: "✓",
    error: "✗",
    warning: "⚠",
    info: "ℹ",
    arrow: "→",
    bullet: "•",
    loading: "⟳",
    skip: "↷",
};

impl Icons {
    pub fn outcome(&self, kind: OutcomeKind) -> &'static str {
        match kind {
            OutcomeKind::Applied => self.success,
            OutcomeKind::Skipped => self.skip,
            OutcomeKind::Failed => self.error,
        }
    }
}

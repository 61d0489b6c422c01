//! Terminal stylesheet.

use owo_colors::Style;

/// Styles for each kind of progress line. `Default` is plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    /// Install and run steps.
    pub step: Style,
    /// Keys in key-value report lines.
    pub dim: Style,
    pub header: Style,
}

impl Styles {
    /// ANSI-colored variant used on a color-capable TTY.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            step: Style::new().cyan(),
            dim: Style::new().dimmed(),
            header: Style::new().bold().cyan(),
        }
    }
}

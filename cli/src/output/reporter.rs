//! `ProgressReporter` for the terminal.
//!
//! Services report install and run progress through the port; this adapter
//! renders it as marked lines on stdout.

use owo_colors::{OwoColorize as _, Style};

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Prints `→` steps, `✓` successes and `!` warnings, honoring `--quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    fn line(&self, mark: &str, style: Style, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", mark.style(style));
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.line("→", self.ctx.styles.step, message);
    }

    fn success(&self, message: &str) {
        self.line("✓", self.ctx.styles.success, message);
    }

    fn warn(&self, message: &str) {
        self.line("!", self.ctx.styles.warning, message);
    }
}

//! Terminal output: spinners, status lines, banner and startup tips.
//!
//! Styling goes through `console`, so colors switch off automatically when
//! output is piped or when the `colorOutput` preference is false.

use crate::error::{GenieError, GenieResult};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

const BANNER: &str = r"
  ██████╗ ███████╗███╗   ██╗██╗███████╗     ██████╗██╗     ██╗
 ██╔════╝ ██╔════╝████╗  ██║██║██╔════╝    ██╔════╝██║     ██║
 ██║  ███╗█████╗  ██╔██╗ ██║██║█████╗      ██║     ██║     ██║
 ██║   ██║██╔══╝  ██║╚██╗██║██║██╔══╝      ██║     ██║     ██║
 ╚██████╔╝███████╗██║ ╚████║██║███████╗    ╚██████╗███████╗██║
  ╚═════╝ ╚══════╝╚═╝  ╚═══╝╚═╝╚══════╝     ╚═════╝╚══════╝╚═╝
";

const TIPS: &[&str] = &[
    "💡 Tip: Use 'genie --chat' for interactive AI conversations!",
    "🚀 Tip: Try 'genie --codegen' to generate code snippets instantly!",
    "📝 Tip: Use 'genie --commitmsg' to generate perfect Git commit messages!",
    "🌍 Tip: Translate anything with 'genie --translate \"text\" --lang es'!",
    "🧹 Tip: Clean up your directory with 'genie --clean'!",
];

/// Applies the `colorOutput` preference to every styled write.
pub fn set_color_output(enabled: bool) {
    if !enabled {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

pub fn print_banner() {
    println!("{}", style(BANNER).cyan().bold());
    println!("{}", style("🎩✨ Your magical command-line assistant ✨🧞").magenta());
    println!("{}", style("━".repeat(60)).dim());
    println!();
}

pub fn print_random_tip() {
    if let Some(tip) = TIPS.choose(&mut rand::thread_rng()) {
        println!("{}", style(tip).yellow());
        println!();
    }
}

/// Spinner for remote calls and directory walks.
///
/// Draws on stderr and stays hidden when stderr is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(spinner_style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    /// Finish with success message (green checkmark) written to `out`
    pub fn succeed(&self, out: &mut dyn Write, message: &str) -> GenieResult<()> {
        self.bar.finish_and_clear();
        success(out, message)
    }

    /// Finish with warning message (yellow) written to `out`
    pub fn warn(&self, out: &mut dyn Write, message: &str) -> GenieResult<()> {
        self.bar.finish_and_clear();
        warning(out, message)
    }

    /// Finish with error message (red)
    pub fn fail(&self, message: &str) {
        self.bar.finish_and_clear();
        error(message);
    }

    pub fn stop(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

pub fn success_line(message: &str) -> String {
    format!("{} {}", style("✓").green().bold(), message)
}

fn warning_line(message: &str) -> String {
    format!("{} {}", style("⚠").yellow().bold(), message)
}

pub fn success(out: &mut dyn Write, message: &str) -> GenieResult<()> {
    write_line(out, success_line(message))
}

pub fn warning(out: &mut dyn Write, message: &str) -> GenieResult<()> {
    write_line(out, warning_line(message))
}

/// Written to stderr, outside the command output.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

pub fn header(out: &mut dyn Write, text: &str) -> GenieResult<()> {
    write_line(out, style(text).bold().cyan())
}

/// Writes one line of command output.
pub fn write_line(out: &mut dyn Write, text: impl Display) -> GenieResult<()> {
    writeln!(out, "{}", text).map_err(|e| GenieError::io("Failed to write output", e))
}

//! Terminal output
//!
//! Status lines go to stdout except warnings and errors, which go to stderr
//! so `--json` output stays parseable.

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Width of the key column in detail views
const KEY_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn mark(self) -> StyledObject<&'static str> {
        match self {
            Level::Success => style("✓").green().bold(),
            Level::Info => style("ℹ").blue().bold(),
            Level::Warning => style("⚠").yellow().bold(),
            Level::Error => style("✗").red().bold(),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Warning | Level::Error)
    }
}

fn emit(level: Level, msg: &str) {
    if level.to_stderr() {
        eprintln!("{} {}", level.mark(), msg);
    } else {
        println!("{} {}", level.mark(), msg);
    }
}

pub fn success(msg: &str) {
    emit(Level::Success, msg);
}

pub fn info(msg: &str) {
    emit(Level::Info, msg);
}

pub fn warning(msg: &str) {
    emit(Level::Warning, msg);
}

pub fn error(msg: &str) {
    emit(Level::Error, msg);
}

/// Section title in detail views
pub fn header(title: &str) {
    println!("\n{}", style(title).bold().underlined());
}

/// Aligned `key  value` row under a header
pub fn kv(key: &str, value: &str) {
    println!("  {}{}", style(pad_key(key)).dim(), value);
}

fn pad_key(key: &str) -> String {
    format!("{:<width$} ", format!("{}:", key), width = KEY_WIDTH)
}

/// Preformatted text such as a config snippet, indented under a header
pub fn block(text: &str) {
    for line in text.lines() {
        println!("    {}", style(line).dim());
    }
}

/// Compatibility marker for tables and detail views
pub fn verdict_mark(compatible: bool) -> String {
    if compatible {
        style("✓").green().to_string()
    } else {
        style("✗").red().to_string()
    }
}

/// Spinner for registry and pip calls
///
/// Drawn on stderr, so it is hidden when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let template = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let pb = ProgressBar::new_spinner()
        .with_style(template.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
        .with_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

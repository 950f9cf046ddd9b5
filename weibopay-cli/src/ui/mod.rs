//! Terminal output
//!
//! Status lines go to stderr so stdout carries only what a script would pipe:
//! canonical strings, checkout URLs, JSON and the acknowledgment body.

mod render;

pub use render::{checkout, failure, field_map, json, response};

use std::time::Duration;

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

/// How a status line is marked
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Done,
    Note,
    Warn,
    Fail,
}

impl Tone {
    fn mark(self) -> ColoredString {
        match self {
            Tone::Done => "✓".green().bold(),
            Tone::Note => "ℹ".blue().bold(),
            Tone::Warn => "⚠".yellow().bold(),
            Tone::Fail => "✗".red().bold(),
        }
    }
}

/// One marked status line on stderr
pub fn status(tone: Tone, message: impl AsRef<str>) {
    eprintln!("{} {}", tone.mark(), message.as_ref());
}

/// Section title on stdout
pub fn header(text: &str) {
    println!("\n{}", text.bold().underline());
}

/// Indented `label: value` line on stdout
pub fn field(label: &str, value: &str) {
    println!("  {}: {}", label.cyan(), value);
}

/// Spinner shown while a provider call is in flight; cleared by the caller
pub fn pending(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Ask for a required value; empty answers are re-prompted by dialoguer
pub fn prompt(label: &str) -> anyhow::Result<String> {
    Ok(dialoguer::Input::new().with_prompt(label).interact_text()?)
}

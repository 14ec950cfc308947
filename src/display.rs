//! Colored CLI rendering of supervisor events.
//!
//! This is the terminal counterpart of the event sink: lines are re-colored
//! by their classification (credential hits green, errors red, `[INFO]`
//! lines blue) and stats land on a single summary line.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::classify::classify;
use crate::stats::StatsSnapshot;

/// Current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Print the launch banner with the preview command string.
pub fn print_launch(preview: &str) {
    println!(
        "{} {} $ {}",
        timestamp().dimmed(),
        "[LAUNCH]".magenta().bold(),
        preview.cyan()
    );
    let _ = io::stdout().flush();
}

/// Print one line of attack output, colored by its classification.
pub fn print_output_line(line: &str) {
    let tags = classify(line);
    if tags.credential {
        println!("{} {}", "[SUCCESS]".green().bold(), line.green());
    } else if tags.error {
        println!("{line}", line = line.red());
    } else if tags.info {
        println!("{line}", line = line.blue());
    } else {
        println!("{line}");
    }
    let _ = io::stdout().flush();
}

/// Print a discovered credential callout.
pub fn print_credential(line: &str) {
    println!(
        "{} {} {}",
        timestamp().dimmed(),
        "[FOUND]".green().bold(),
        line.green().bold()
    );
    let _ = io::stdout().flush();
}

/// Print a throughput summary line.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn print_stats(snapshot: &StatsSnapshot) {
    let total = snapshot.elapsed_secs as u64;
    let (hours, rem) = (total / 3600, total % 3600);
    let (minutes, seconds) = (rem / 60, rem % 60);
    println!(
        "{} {} attempts={} rate={:.1}/sec elapsed={hours:02}:{minutes:02}:{seconds:02}",
        timestamp().dimmed(),
        "[STATS]".cyan().bold(),
        snapshot.attempts,
        snapshot.rate
    );
    let _ = io::stdout().flush();
}

/// Print the end-of-run summary.
pub fn print_finished(found: usize, stopped: bool) {
    let label = if stopped {
        "attack terminated by operator".yellow().to_string()
    } else {
        "attack sequence completed".green().to_string()
    };
    println!(
        "{} {} {label} ({found} credential(s) found)",
        timestamp().dimmed(),
        "[DONE]".blue().bold()
    );
    let _ = io::stdout().flush();
}

/// Print where the findings report landed.
pub fn print_report_saved(path: &std::path::Path) {
    println!(
        "{} {} results saved to {}",
        timestamp().dimmed(),
        "[REPORT]".green().bold(),
        path.display()
    );
    let _ = io::stdout().flush();
}

/// Print a non-fatal warning.
pub fn print_warning(message: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), message);
    let _ = io::stdout().flush();
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
    let _ = io::stderr().flush();
}

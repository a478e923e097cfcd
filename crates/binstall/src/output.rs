//! Terminal rendering for the download and version commands
//!
//! Result lines go to stdout; failures and warnings go to stderr so they
//! survive `binstall download ... > log`.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// `✓ msg` for a binary that is done or up to date
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// `✗ msg` for a binary or spec file that failed
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// `⚠ msg` for conditions that skip a binary without failing it
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Section title, e.g. the binary name in a dry-run summary
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Indented `key: value` line under a header
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Spinner for phases whose length is unknown up front
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(TICKS),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Counter over `total` binaries, advanced as each one finishes
pub fn install_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} Updating ({pos}/{len}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars(TICKS),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

//! Output formatting and styling module.
//!
//! Provides a centralized interface for all user-facing CLI output: colored
//! status messages, the spinner shown while a run is in progress, and the
//! summary table printed at the end. Diagnostics go through `tracing`
//! instead.

use crate::engine::RunSummary;
use crate::request::Mode;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use solovideos::output::OutputFormatter;
    /// OutputFormatter::success("Run finished");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a ticking spinner for a run whose length is not known up front.
    ///
    /// The spinner animates on its own thread, so the caller may block while
    /// it is visible.
    pub fn create_spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Prints the matches per extension and the run totals.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use solovideos::engine::RunSummary;
    /// use solovideos::output::OutputFormatter;
    /// use solovideos::Mode;
    ///
    /// OutputFormatter::summary_table(&RunSummary::default(), Mode::Simulate);
    /// ```
    pub fn summary_table(summary: &RunSummary, mode: Mode) {
        Self::header("SUMMARY");

        let rows = summary.found_by_extension();
        let width = rows
            .keys()
            .map(|ext| ext.len())
            .max()
            .unwrap_or(0)
            .max("Extension".len());

        println!(
            "{:<width$} | {}",
            "Extension".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (ext, count) in rows {
            println!(
                "{:<width$} | {} {}",
                ext,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Found".bold(),
            summary.files_found().to_string().green().bold(),
            plural(summary.files_found()),
            width = width
        );
        if !mode.is_simulate() {
            println!(
                "{:<width$} | {} {}",
                "Processed".bold(),
                summary.files_processed().to_string().green().bold(),
                plural(summary.files_processed()),
                width = width
            );
        }
        if summary.files_failed() > 0 {
            println!(
                "{:<width$} | {} {}",
                "Failed".bold(),
                summary.files_failed().to_string().red().bold(),
                plural(summary.files_failed()),
                width = width
            );
        }
        if summary.traversal_errors() > 0 {
            println!(
                "{:<width$} | {} {}",
                "Unreadable".bold(),
                summary.traversal_errors().to_string().red().bold(),
                if summary.traversal_errors() == 1 { "entry" } else { "entries" },
                width = width
            );
        }
    }

    /// One-line status after a run, e.g. `Found: 3 · Processed: 3`.
    pub fn status_line(summary: &RunSummary, mode: Mode, log_path: Option<&Path>) {
        let progress = if mode.is_simulate() {
            "all simulated".to_string()
        } else {
            format!("Processed: {}", summary.files_processed())
        };
        let status = format!("Found: {} · {}", summary.files_found(), progress);

        if summary.has_errors() {
            Self::warning(&format!("{status} · with errors, see log"));
        } else {
            Self::success(&status);
        }
        if let Some(path) = log_path {
            Self::plain(&format!("Log: {}", path.display()));
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

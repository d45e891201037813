//! Command orchestration for the solovideos binary.
//!
//! This module turns parsed command-line options plus the configuration file
//! into a [`RelocationRequest`], runs the engine on its worker thread, writes
//! the run log and prints the result. It also serves the `last-log` and
//! `formats` commands.

use crate::config::Config;
use crate::engine::{self, RunSummary};
use crate::extensions::{ExtensionSet, VideoFormat};
use crate::output::OutputFormatter;
use crate::report;
use crate::request::{Action, Mode, RelocationRequest};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for a relocation run. `None` fields fall back to the configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Directory to scan.
    pub source: PathBuf,
    /// Destination specifier; see [`crate::paths::resolve_destination`].
    pub destination: Option<String>,
    pub mode: Option<Mode>,
    pub action: Option<Action>,
    /// Extensions to extract; empty means use the configured set.
    pub extensions: Vec<String>,
    /// Override for the run log directory.
    pub log_dir: Option<PathBuf>,
    /// Skip writing the run log file.
    pub no_log_file: bool,
    /// Print the summary as JSON instead of the table.
    pub json: bool,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone)]
pub enum Command {
    /// Scan a directory and relocate (or simulate relocating) matches.
    Run(RunOptions),
    /// Show the most recent run log.
    LastLog {
        log_dir: Option<PathBuf>,
        /// Print the log contents, not only its path.
        print: bool,
    },
    /// List the known video formats.
    Formats,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub request: RelocationRequest,
    pub summary: RunSummary,
    /// Where the run log was written, unless logging to file was disabled.
    pub log_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    source: &'a Path,
    destination: &'a Path,
    mode: Mode,
    action: Action,
    summary: &'a RunSummary,
    log_path: Option<&'a Path>,
}

/// Runs a command using the default configuration lookup.
///
/// # Examples
///
/// ```no_run
/// use solovideos::cli::{run_cli, Command};
///
/// if let Err(e) = run_cli(Command::Formats) {
///     eprintln!("Error: {e:#}");
/// }
/// ```
pub fn run_cli(command: Command) -> Result<()> {
    run_cli_with_config(command, None)
}

/// Runs a command with an optional explicit configuration file.
pub fn run_cli_with_config(command: Command, config_path: Option<&Path>) -> Result<()> {
    match command {
        Command::Run(options) => {
            let config = Config::load(config_path).context("Error loading configuration")?;
            let report = relocate(&options, &config)?;
            print_report(&report, options.json)
        }
        Command::LastLog { log_dir, print } => {
            let config = Config::load(config_path).context("Error loading configuration")?;
            show_last_log(log_dir.as_deref(), &config, print)
        }
        Command::Formats => {
            list_formats();
            Ok(())
        }
    }
}

/// Builds the immutable request from options layered over the configuration.
///
/// # Errors
///
/// Fails before anything is scanned if the source is not an existing
/// directory or no extension is selected.
pub fn build_request(options: &RunOptions, config: &Config) -> Result<RelocationRequest> {
    let defaults = &config.relocation;
    let extensions = if options.extensions.is_empty() {
        defaults.extension_set()
    } else {
        ExtensionSet::parse(&options.extensions)
    };

    let request = RelocationRequest::new(
        &options.source,
        options
            .destination
            .as_deref()
            .unwrap_or(&defaults.destination),
        options.mode.unwrap_or(defaults.mode),
        options.action.unwrap_or(defaults.action),
        extensions,
    )?;
    Ok(request)
}

/// Runs a relocation in the background, waits for it and persists the run log.
pub fn relocate(options: &RunOptions, config: &Config) -> Result<RunReport> {
    let request = build_request(options, config)?;

    let spinner = (!options.json).then(|| {
        let verb = if request.mode().is_simulate() {
            "Simulating"
        } else {
            "Relocating"
        };
        OutputFormatter::create_spinner(&format!(
            "{verb} videos in {}",
            request.source_root().display()
        ))
    });

    let handle = engine::spawn(request.clone())?;
    let waited = handle.wait();
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let summary = waited?;

    let log_path = if options.no_log_file {
        None
    } else {
        let dir = match options.log_dir.as_ref().or(config.relocation.log_dir.as_ref()) {
            Some(dir) => dir.clone(),
            None => report::default_log_dir()?,
        };
        Some(report::write_run_log(&dir, &request, &summary)?)
    };

    Ok(RunReport {
        request,
        summary,
        log_path,
    })
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    let request = &report.request;

    if json {
        let payload = JsonReport {
            source: request.source_root(),
            destination: request.destination_root(),
            mode: request.mode(),
            action: request.action(),
            summary: &report.summary,
            log_path: report.log_path.as_deref(),
        };
        let text = serde_json::to_string_pretty(&payload).context("Error serializing summary")?;
        OutputFormatter::plain(&text);
        return Ok(());
    }

    OutputFormatter::info(&format!("Source: {}", request.source_root().display()));
    OutputFormatter::info(&format!(
        "Destination: {}",
        request.destination_root().display()
    ));
    if request.mode().is_simulate() {
        OutputFormatter::dry_run_notice("No files were modified.");
    }

    let errors: Vec<&String> = report
        .summary
        .log_lines()
        .iter()
        .filter(|line| line.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        OutputFormatter::header("ERRORS");
        for line in errors {
            OutputFormatter::error(line);
        }
    }

    OutputFormatter::summary_table(&report.summary, request.mode());
    println!();
    OutputFormatter::status_line(&report.summary, request.mode(), report.log_path.as_deref());
    Ok(())
}

fn show_last_log(log_dir: Option<&Path>, config: &Config, print: bool) -> Result<()> {
    let dir = match log_dir.or(config.relocation.log_dir.as_deref()) {
        Some(dir) => dir.to_path_buf(),
        None => report::default_log_dir()?,
    };

    let Some(path) = report::latest_log(&dir)? else {
        OutputFormatter::warning(&format!("No logs found in {}", dir.display()));
        return Ok(());
    };

    OutputFormatter::plain(&path.display().to_string());
    if print {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Error reading log {}", path.display()))?;
        println!();
        print!("{text}");
    }
    Ok(())
}

fn list_formats() {
    OutputFormatter::header("Known video formats");
    for format in VideoFormat::ALL {
        OutputFormatter::plain(&format!("  {:<6} {}", format.extension(), format.description()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_build_request_prefers_options_over_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let options = RunOptions {
            source: temp_dir.path().to_path_buf(),
            destination: Some("picked".to_string()),
            mode: Some(Mode::Execute),
            action: Some(Action::Copy),
            extensions: vec!["mkv".to_string()],
            ..Default::default()
        };

        let request = build_request(&options, &Config::default()).unwrap();

        assert!(request.destination_root().ends_with("picked"));
        assert_eq!(request.mode(), Mode::Execute);
        assert_eq!(request.action(), Action::Copy);
        assert_eq!(request.extensions().joined(), ".mkv");
    }

    #[test]
    fn test_build_request_falls_back_to_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let options = RunOptions {
            source: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        let request = build_request(&options, &Config::default()).unwrap();

        assert!(request.destination_root().ends_with("00_SOLO_VIDEOS"));
        assert_eq!(request.mode(), Mode::Simulate);
        assert_eq!(request.action(), Action::Move);
        assert_eq!(request.extensions(), &ExtensionSet::default());
    }

    #[test]
    fn test_build_request_rejects_blank_extensions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let options = RunOptions {
            source: temp_dir.path().to_path_buf(),
            extensions: vec![" ".to_string()],
            ..Default::default()
        };

        let err = build_request(&options, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("extension"));
    }
}

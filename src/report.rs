//! Run log rendering and persistence.
//!
//! Every run can be written to a timestamped text file in a log directory.
//! The format matches the logs produced by earlier versions of the tool so
//! existing log archives stay readable side by side.

use crate::engine::RunSummary;
use crate::relocator::ensure_unique;
use crate::request::{Mode, RelocationRequest};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors while writing or locating run logs.
#[derive(Debug, Error)]
pub enum ReportError {
    /// No log directory could be determined for this platform.
    #[error("Could not determine a log directory; pass --log-dir")]
    NoLogDir,

    #[error("Failed to create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to write run log {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to read log directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Default log location: `<Documents>/SoloVideos/logs`, or under the home
/// directory when the platform has no documents folder.
pub fn default_log_dir() -> Result<PathBuf, ReportError> {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("SoloVideos").join("logs"))
        .ok_or(ReportError::NoLogDir)
}

/// File name for a run started at `when`, e.g. `video_extract_dryrun_20250811-093000.log`.
pub fn log_file_name(mode: Mode, when: &DateTime<Local>) -> String {
    format!(
        "video_extract_{}{}.log",
        if mode.is_simulate() { "dryrun_" } else { "" },
        when.format("%Y%m%d-%H%M%S")
    )
}

/// Renders the full run log: header, one line per action or error, totals.
pub fn render(request: &RelocationRequest, summary: &RunSummary, when: &DateTime<Local>) -> String {
    let mut lines: Vec<String> = vec![
        format!("# Origen: {}", request.source_root().display()),
        format!("# Destino: {}", request.destination_root().display()),
        format!(
            "# Modo: {}  |  Acción: {}",
            request.mode().log_label(),
            request.action().log_label()
        ),
        format!("# Extensiones: {}", request.extensions().joined()),
        format!("# Fecha/hora: {}", when.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
    ];

    lines.extend(summary.log_lines().iter().cloned());

    lines.push(String::new());
    lines.push(format!("# Total vídeos detectados: {}", summary.files_found()));
    lines.push(format!(
        "# Total {}: {}",
        if request.mode().is_simulate() {
            "operaciones simuladas"
        } else {
            "archivos procesados"
        },
        summary.files_processed()
    ));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Writes the run log into `dir`, creating it if needed, and returns its path.
///
/// Two runs in the same second never overwrite each other's log.
pub fn write_run_log(
    dir: &Path,
    request: &RelocationRequest,
    summary: &RunSummary,
) -> Result<PathBuf, ReportError> {
    let now = Local::now();

    fs::create_dir_all(dir).map_err(|e| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = ensure_unique(&dir.join(log_file_name(request.mode(), &now)));
    fs::write(&path, render(request, summary, &now)).map_err(|e| ReportError::Write {
        path: path.clone(),
        source: e,
    })?;

    debug!(path = %path.display(), "run log written");
    Ok(path)
}

/// Returns the most recently modified `*.log` file in `dir`.
///
/// A missing directory yields `Ok(None)`.
pub fn latest_log(dir: &Path) -> Result<Option<PathBuf>, ReportError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let entries = fs::read_dir(dir).map_err(|e| ReportError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let newest = entries
        .flatten()
        .filter(|entry| {
            entry.file_type().is_ok_and(|t| t.is_file())
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("log"))
        })
        .filter_map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, entry.path()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path);

    Ok(newest)
}

//! The relocation engine: traversal driving relocation, one file at a time.
//!
//! [`run`] executes a request on the calling thread. [`spawn`] moves the same
//! work onto a dedicated thread and hands back a [`RunHandle`] so the caller
//! can keep its own thread responsive while it waits.

use crate::error::{RelocateError, RelocateResult, TraversalError};
use crate::extensions::extension_of;
use crate::relocator::Relocator;
use crate::request::{MatchRecord, Mode, RelocationRequest};
use crate::traversal::Traversal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Outcome of a finished run.
///
/// Built up privately while the run is in progress and frozen when it ends;
/// callers only get read access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    files_found: usize,
    files_processed: usize,
    files_failed: usize,
    traversal_errors: usize,
    found_by_extension: BTreeMap<String, usize>,
    log_lines: Vec<String>,
}

impl RunSummary {
    /// Files that passed the extension filter and were not avoided.
    pub fn files_found(&self) -> usize {
        self.files_found
    }

    /// Files actually copied or moved. Always zero for a simulation.
    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    /// Matched files whose relocation failed.
    pub fn files_failed(&self) -> usize {
        self.files_failed
    }

    /// Directory entries that could not be read during the walk.
    pub fn traversal_errors(&self) -> usize {
        self.traversal_errors
    }

    /// Matches per lowercase extension.
    pub fn found_by_extension(&self) -> &BTreeMap<String, usize> {
        &self.found_by_extension
    }

    /// Action and error lines in the order they happened.
    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    pub fn has_errors(&self) -> bool {
        self.files_failed > 0 || self.traversal_errors > 0
    }
}

/// Mutable side of a run summary, owned by the run.
#[derive(Debug, Default)]
struct SummaryAccumulator {
    summary: RunSummary,
}

impl SummaryAccumulator {
    fn log(&mut self, line: String) {
        self.summary.log_lines.push(line);
    }

    fn record_match(&mut self, record: &MatchRecord) {
        self.summary.files_found += 1;
        if let Some(ext) = extension_of(&record.source_path) {
            *self.summary.found_by_extension.entry(ext).or_insert(0) += 1;
        }
        self.log(record.log_line());
    }

    fn record_processed(&mut self) {
        self.summary.files_processed += 1;
    }

    fn record_failure(&mut self, line: String) {
        self.summary.files_failed += 1;
        self.log(line);
    }

    fn record_traversal_error(&mut self, line: String) {
        self.summary.traversal_errors += 1;
        self.log(line);
    }

    fn finish(self) -> RunSummary {
        self.summary
    }
}

/// Runs a request to completion on the current thread.
///
/// Never fails as a whole: per-file and per-entry problems are logged in the
/// summary and the walk continues.
///
/// # Examples
///
/// ```no_run
/// use solovideos::{engine, Action, ExtensionSet, Mode, RelocationRequest};
/// use std::path::Path;
///
/// let request = RelocationRequest::new(
///     Path::new("/media/camera"),
///     "OUT",
///     Mode::Simulate,
///     Action::Move,
///     ExtensionSet::default(),
/// )?;
/// let summary = engine::run(&request);
/// println!("{} videos found", summary.files_found());
/// # Ok::<(), solovideos::RelocateError>(())
/// ```
pub fn run(request: &RelocationRequest) -> RunSummary {
    info!(
        source = %request.source_root().display(),
        destination = %request.destination_root().display(),
        mode = ?request.mode(),
        action = %request.action(),
        "starting relocation run"
    );

    let summary = drive(request, Traversal::new(request));
    info!(
        found = summary.files_found(),
        processed = summary.files_processed(),
        failed = summary.files_failed(),
        "relocation run finished"
    );
    summary
}

/// Feeds walk results through the relocator, recording every outcome.
fn drive<I>(request: &RelocationRequest, items: I) -> RunSummary
where
    I: IntoIterator<Item = Result<MatchRecord, TraversalError>>,
{
    let relocator = Relocator::new(request.action());
    let mut acc = SummaryAccumulator::default();

    for item in items {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                acc.record_traversal_error(format!("ERROR: {e}"));
                continue;
            }
        };

        acc.record_match(&record);

        if request.mode() == Mode::Simulate {
            continue;
        }

        match relocator.relocate(&record) {
            Ok(_) => acc.record_processed(),
            Err(e) => {
                warn!(src = %record.source_path.display(), error = %e, "relocation failed");
                acc.record_failure(format!("ERROR: {}: {e}", record.source_path.display()));
            }
        }
    }

    acc.finish()
}

/// A run in progress on its own thread.
#[derive(Debug)]
pub struct RunHandle {
    handle: JoinHandle<RunSummary>,
}

impl RunHandle {
    /// Blocks until the run completes.
    ///
    /// # Errors
    ///
    /// Returns [`RelocateError::WorkerPanicked`] if the worker did not finish
    /// normally.
    pub fn wait(self) -> RelocateResult<RunSummary> {
        self.handle.join().map_err(|_| RelocateError::WorkerPanicked)
    }
}

/// Starts the request on a dedicated worker thread.
///
/// The request moves into the worker; the run cannot be cancelled once
/// started.
pub fn spawn(request: RelocationRequest) -> RelocateResult<RunHandle> {
    let handle = thread::Builder::new()
        .name("relocation".to_string())
        .spawn(move || run(&request))
        .map_err(RelocateError::WorkerSpawn)?;
    Ok(RunHandle { handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionSet;
    use crate::request::Action;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn request(root: &Path, mode: Mode, action: Action) -> RelocationRequest {
        RelocationRequest::new(root, "OUT", mode, action, ExtensionSet::default())
            .expect("valid request")
    }

    #[test]
    fn test_simulate_counts_without_touching_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "a/one.mp4", b"1");
        touch(root, "b/two.avi", b"2");
        touch(root, "readme.txt", b"r");

        let summary = run(&request(root, Mode::Simulate, Action::Move));

        assert_eq!(summary.files_found(), 2);
        assert_eq!(summary.files_processed(), 0);
        assert_eq!(summary.log_lines().len(), 2);
        assert!(summary.log_lines().iter().all(|l| l.starts_with("MOVER: ")));
        assert!(root.join("a/one.mp4").exists());
        assert!(!root.join("OUT").exists());
    }

    #[test]
    fn test_execute_move_counts_processed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "a/one.mp4", b"1");
        touch(root, "b/two.MOV", b"2");

        let summary = run(&request(root, Mode::Execute, Action::Move));

        assert_eq!(summary.files_found(), 2);
        assert_eq!(summary.files_processed(), 2);
        assert!(!summary.has_errors());
        assert!(root.join("OUT/a/one.mp4").exists());
        assert!(root.join("OUT/b/two.MOV").exists());
        assert!(!root.join("a/one.mp4").exists());
    }

    #[test]
    fn test_found_by_extension_groups_case_insensitively() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "x.mp4", b"");
        touch(root, "y.MP4", b"");
        touch(root, "z.mkv", b"");

        let summary = run(&request(root, Mode::Simulate, Action::Copy));

        assert_eq!(summary.found_by_extension().get(".mp4"), Some(&2));
        assert_eq!(summary.found_by_extension().get(".mkv"), Some(&1));
    }

    #[test]
    fn test_failed_file_is_logged_and_run_continues() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "a/one.mp4", b"1");
        touch(root, "b/two.mp4", b"2");
        // A plain file where the mirrored directory for a/ should go.
        fs::create_dir_all(root.join("OUT")).unwrap();
        fs::write(root.join("OUT/a"), b"blocker").unwrap();

        let summary = run(&request(root, Mode::Execute, Action::Copy));

        assert_eq!(summary.files_found(), 2);
        assert_eq!(summary.files_processed(), 1);
        assert_eq!(summary.files_failed(), 1);
        assert!(
            summary
                .log_lines()
                .iter()
                .any(|l| l.starts_with("ERROR: ") && l.contains("one.mp4"))
        );
        assert!(root.join("OUT/b/two.mp4").exists());
    }

    #[test]
    fn test_unreadable_root_is_counted_not_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("gone");
        fs::create_dir(&root).unwrap();
        let request = request(&root, Mode::Simulate, Action::Move);
        fs::remove_dir(&root).unwrap();

        let summary = run(&request);

        assert_eq!(summary.traversal_errors(), 1);
        assert_eq!(summary.files_found(), 0);
        assert!(summary.has_errors());
        assert_eq!(summary.log_lines().len(), 1);
        assert!(summary.log_lines()[0].starts_with("ERROR: cannot read"));
    }

    #[test]
    fn test_walk_error_between_matches_does_not_stop_run() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "a/one.mp4", b"1");
        touch(root, "z/two.mp4", b"2");
        let request = request(root, Mode::Execute, Action::Copy);

        let walk_error = walkdir::WalkDir::new(root.join("missing"))
            .into_iter()
            .find_map(Result::err)
            .expect("walking a missing directory fails");
        let record = |rel: &str| MatchRecord {
            source_path: root.join(rel),
            planned_destination: root.join("OUT").join(rel),
            action: Action::Copy,
        };
        let items = vec![
            Ok(record("a/one.mp4")),
            Err(TraversalError::from(walk_error)),
            Ok(record("z/two.mp4")),
        ];

        let summary = drive(&request, items);

        assert_eq!(summary.files_found(), 2);
        assert_eq!(summary.files_processed(), 2);
        assert_eq!(summary.traversal_errors(), 1);
        assert_eq!(summary.files_failed(), 0);
        assert!(summary.log_lines()[1].starts_with("ERROR: cannot read"));
        assert!(summary.log_lines()[2].starts_with("COPIAR: "));
        assert!(root.join("OUT/z/two.mp4").exists());
    }

    #[test]
    fn test_spawn_returns_summary() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "clip.webm", b"w");

        let handle = spawn(request(temp_dir.path(), Mode::Simulate, Action::Move))
            .expect("worker starts");
        let summary = handle.wait().expect("worker finishes");

        assert_eq!(summary.files_found(), 1);
    }
}

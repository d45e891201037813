//! The immutable description of one relocation run.

use crate::error::{RelocateError, RelocateResult};
use crate::extensions::ExtensionSet;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Whether a run touches the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Log what would happen, change nothing.
    #[default]
    Simulate,
    /// Create directories and relocate files.
    Execute,
}

impl Mode {
    pub fn is_simulate(&self) -> bool {
        matches!(self, Mode::Simulate)
    }

    /// Label used in the run log header.
    pub fn log_label(&self) -> &'static str {
        match self {
            Mode::Simulate => "DRY-RUN",
            Mode::Execute => "REAL",
        }
    }
}

/// What to do with each matched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Move,
    Copy,
}

impl Action {
    /// Label used in the run log.
    pub fn log_label(&self) -> &'static str {
        match self {
            Action::Move => "MOVER",
            Action::Copy => "COPIAR",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move => f.write_str("move"),
            Action::Copy => f.write_str("copy"),
        }
    }
}

/// A validated relocation request.
///
/// Construction checks that the source is an existing directory and that at
/// least one extension is allowed, resolves both roots to absolute paths and
/// computes the directory traversal must avoid. The value never changes
/// afterwards.
#[derive(Debug, Clone)]
pub struct RelocationRequest {
    source_root: PathBuf,
    destination_root: PathBuf,
    mode: Mode,
    action: Action,
    extensions: ExtensionSet,
    avoid: Option<PathBuf>,
}

impl RelocationRequest {
    /// Builds a request from caller input.
    ///
    /// `destination` follows [`paths::resolve_destination`]: empty means the
    /// default folder inside the source, relative names are resolved against
    /// the source.
    ///
    /// # Errors
    ///
    /// Returns a [`RelocateError`] if the source is missing, not a directory,
    /// or the extension set is empty.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use solovideos::{Action, ExtensionSet, Mode, RelocationRequest};
    /// use std::path::Path;
    ///
    /// let request = RelocationRequest::new(
    ///     Path::new("/media/camera"),
    ///     "",
    ///     Mode::Simulate,
    ///     Action::Copy,
    ///     ExtensionSet::default(),
    /// )?;
    /// assert!(request.destination_root().ends_with("00_SOLO_VIDEOS"));
    /// # Ok::<(), solovideos::RelocateError>(())
    /// ```
    pub fn new(
        source: &Path,
        destination: &str,
        mode: Mode,
        action: Action,
        extensions: ExtensionSet,
    ) -> RelocateResult<Self> {
        if source.as_os_str().is_empty() || source.to_string_lossy().trim().is_empty() {
            return Err(RelocateError::EmptySource);
        }

        let source_root = paths::absolutize(source)?;
        if !source_root.exists() {
            return Err(RelocateError::SourceNotFound(source_root));
        }
        if !source_root.is_dir() {
            return Err(RelocateError::SourceNotDirectory(source_root));
        }
        if extensions.is_empty() {
            return Err(RelocateError::NoExtensions);
        }

        let destination_root = paths::resolve_destination(&source_root, destination)?;
        let avoid = paths::avoid_directive(&source_root, &destination_root);

        Ok(Self {
            source_root,
            destination_root,
            mode,
            action,
            extensions,
            avoid,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn destination_root(&self) -> &Path {
        &self.destination_root
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    /// The subtree traversal skips, set when the destination is inside the source.
    pub fn avoid(&self) -> Option<&Path> {
        self.avoid.as_deref()
    }
}

/// One qualifying file and where it is headed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub source_path: PathBuf,
    pub planned_destination: PathBuf,
    pub action: Action,
}

impl MatchRecord {
    /// The run log line for this record, e.g. `MOVER: /a/x.mp4 -> /out/a/x.mp4`.
    pub fn log_line(&self) -> String {
        format!(
            "{}: {} -> {}",
            self.action.log_label(),
            self.source_path.display(),
            self.planned_destination.display()
        )
    }
}

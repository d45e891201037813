//! Relocation of matched files into the destination tree.
//!
//! This module creates the mirrored destination directories, picks a
//! collision-free file name and performs the copy or move. Copies never
//! overwrite an existing file.

use crate::error::FileError;
use crate::request::{Action, MatchRecord};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Returns `path` if nothing exists there, otherwise the first free
/// `<stem>_<n><.ext>` sibling counting from 1.
///
/// Existence is checked afresh on every attempt, so repeated calls for the
/// same name see files created in between.
///
/// # Examples
///
/// ```no_run
/// use solovideos::relocator::ensure_unique;
/// use std::path::Path;
///
/// // With /out/clip.mp4 and /out/clip_1.mp4 present:
/// let free = ensure_unique(Path::new("/out/clip.mp4"));
/// assert_eq!(free, Path::new("/out/clip_2.mp4"));
/// ```
pub fn ensure_unique(path: &Path) -> PathBuf {
    if !exists_or_link(path) {
        return path.to_path_buf();
    }

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    let ext = path.extension();

    let mut counter: u64 = 1;
    loop {
        let mut name = OsString::from(&stem);
        name.push(format!("_{counter}"));
        if let Some(ext) = ext {
            name.push(".");
            name.push(ext);
        }
        let candidate = dir.join(name);
        if !exists_or_link(&candidate) {
            debug!(
                planned = %path.display(),
                resolved = %candidate.display(),
                "destination taken; using suffixed name"
            );
            return candidate;
        }
        counter += 1;
    }
}

/// Like `Path::exists`, but a dangling symlink also counts as taken.
fn exists_or_link(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copies `src` to a new file at `dst`, failing if `dst` already exists.
///
/// Permissions are carried over. A partially written destination is removed
/// before the error is returned.
pub fn copy_no_overwrite(src: &Path, dst: &Path) -> io::Result<u64> {
    let reader = File::open(src)?;
    let out = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let result = fill_new_file(reader, out, src, dst);
    if result.is_err() {
        let _ = fs::remove_file(dst);
    }
    result
}

fn fill_new_file(reader: File, out: File, src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(out);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::set_permissions(dst, fs::metadata(src)?.permissions())?;
    Ok(bytes)
}

/// Moves `src` to `dst`.
///
/// Tries a rename first; when source and destination are on different
/// devices, falls back to [`copy_then_remove`].
pub fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(src = %src.display(), dst = %dst.display(), "cross-device move; copying instead");
            copy_then_remove(src, dst)
        }
        Err(e) => Err(e),
    }
}

/// Moves by copying to a new file at `dst` and deleting `src`.
///
/// If `src` cannot be deleted the copy is removed again, so a failed move
/// leaves the file only at its source.
pub fn copy_then_remove(src: &Path, dst: &Path) -> io::Result<()> {
    copy_no_overwrite(src, dst)?;
    if let Err(e) = fs::remove_file(src) {
        let _ = fs::remove_file(dst);
        return Err(e);
    }
    Ok(())
}

/// Performs the filesystem side of a relocation run.
///
/// The relocator is only used in execute mode; simulation never reaches it.
#[derive(Debug, Clone, Copy)]
pub struct Relocator {
    action: Action,
}

impl Relocator {
    pub fn new(action: Action) -> Self {
        Self { action }
    }

    /// Relocates one matched file and returns where it ended up.
    ///
    /// Creates the destination directory (and any missing ancestors), then
    /// resolves a free name with [`ensure_unique`] and copies or moves.
    ///
    /// # Errors
    ///
    /// Returns a [`FileError`] describing the first step that failed. The
    /// source is left in place on failure.
    pub fn relocate(&self, record: &MatchRecord) -> Result<PathBuf, FileError> {
        let dest_dir = record
            .planned_destination
            .parent()
            .ok_or(FileError::NoFileName)?;
        if record.planned_destination.file_name().is_none() {
            return Err(FileError::NoFileName);
        }

        fs::create_dir_all(dest_dir).map_err(|e| FileError::CreateDir {
            path: dest_dir.to_path_buf(),
            source: e,
        })?;

        let final_destination = ensure_unique(&record.planned_destination);

        match self.action {
            Action::Copy => {
                copy_no_overwrite(&record.source_path, &final_destination).map_err(|e| {
                    FileError::Copy {
                        to: final_destination.clone(),
                        source: e,
                    }
                })?;
            }
            Action::Move => {
                move_file(&record.source_path, &final_destination).map_err(|e| {
                    FileError::Move {
                        to: final_destination.clone(),
                        source: e,
                    }
                })?;
            }
        }

        info!(
            action = %self.action,
            src = %record.source_path.display(),
            dst = %final_destination.display(),
            "relocated"
        );
        Ok(final_destination)
    }
}

//! Path resolution for a relocation run.
//!
//! Turns the user's source and destination into absolute, lexically
//! normalized roots and decides whether the destination must be excluded
//! from traversal because it lives inside the source.

use crate::error::{RelocateError, RelocateResult};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Destination directory name used when the user leaves the destination empty.
pub const DEFAULT_DEST_NAME: &str = "00_SOLO_VIDEOS";

/// Makes `path` absolute against the current directory and normalizes it.
pub fn absolutize(path: &Path) -> RelocateResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| RelocateError::PathResolution {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(normalize(&absolute))
}

/// Removes `.` components and folds `..` into the preceding component.
///
/// Purely lexical: symlinks are not resolved and the path need not exist.
/// A `..` directly after the root is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolves the destination specifier against the (absolute) source root.
///
/// * empty or whitespace: `<source>/00_SOLO_VIDEOS`
/// * absolute: used as-is
/// * anything else: joined onto the source root
pub fn resolve_destination(source_root: &Path, spec: &str) -> RelocateResult<PathBuf> {
    let spec = spec.trim();
    let joined = if spec.is_empty() {
        source_root.join(DEFAULT_DEST_NAME)
    } else if Path::new(spec).is_absolute() {
        PathBuf::from(spec)
    } else {
        source_root.join(spec)
    };
    absolutize(&joined)
}

/// Computes `path` relative to `base`, inserting `..` where `path` leaves `base`.
///
/// Both inputs must be absolute. Returns `None` when they are not, or when they
/// sit under different roots (e.g. different Windows drives). Component
/// comparison ignores case. An identical pair yields `.`.
pub fn relative_path(base: &Path, path: &Path) -> Option<PathBuf> {
    if !base.is_absolute() || !path.is_absolute() {
        return None;
    }

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let path_parts: Vec<Component<'_>> = path.components().collect();

    let is_anchor = |c: &Component<'_>| matches!(c, Component::Prefix(_) | Component::RootDir);
    let base_anchor: Vec<_> = base_parts.iter().take_while(|c| is_anchor(c)).collect();
    let path_anchor: Vec<_> = path_parts.iter().take_while(|c| is_anchor(c)).collect();
    if base_anchor.len() != path_anchor.len()
        || !base_anchor
            .iter()
            .zip(&path_anchor)
            .all(|(a, b)| component_eq(a, b))
    {
        return None;
    }

    let common = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| component_eq(a, b))
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &path_parts[common..] {
        rel.push(part.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    Some(rel)
}

/// Returns the directory traversal must skip, if any.
///
/// The destination is avoided when it equals or is nested inside the source.
/// If the relative path cannot be computed the run proceeds without any
/// exclusion; this is logged at debug level only.
pub fn avoid_directive(source_root: &Path, destination_root: &Path) -> Option<PathBuf> {
    match relative_path(source_root, destination_root) {
        Some(rel) => {
            let escapes = matches!(rel.components().next(), Some(Component::ParentDir));
            if escapes {
                None
            } else {
                Some(normalize(destination_root))
            }
        }
        None => {
            debug!(
                source = %source_root.display(),
                destination = %destination_root.display(),
                "could not relate destination to source; no directory will be avoided"
            );
            None
        }
    }
}

/// Returns true if `path` equals `dir` or lies beneath it, ignoring case.
pub fn is_within(path: &Path, dir: &Path) -> bool {
    let mut path_parts = path.components();
    dir.components().all(|d| {
        path_parts
            .next()
            .is_some_and(|p| component_eq(&d, &p))
    })
}

fn component_eq(a: &Component<'_>, b: &Component<'_>) -> bool {
    os_str_eq_ignore_case(a.as_os_str(), b.as_os_str())
}

/// Case-insensitive for valid Unicode names; names that are not valid
/// Unicode only match byte for byte.
fn os_str_eq_ignore_case(a: &OsStr, b: &OsStr) -> bool {
    match (a.to_str(), b.to_str()) {
        (Some(a), Some(b)) => a == b || a.to_lowercase() == b.to_lowercase(),
        _ => a.as_encoded_bytes() == b.as_encoded_bytes(),
    }
}

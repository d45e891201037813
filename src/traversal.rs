//! Recursive source-tree walk that yields the files a run should relocate.
//!
//! The walk is lazy and follows filesystem enumeration order, which is not
//! sorted. The avoided subtree is pruned as soon as it is reached.

use crate::error::TraversalError;
use crate::paths;
use crate::request::{MatchRecord, RelocationRequest};
use std::path::Path;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Iterator over the matches of a request.
///
/// Enumeration errors are yielded as `Err` items; the walk continues past
/// them.
pub struct Traversal<'a> {
    request: &'a RelocationRequest,
    entries: walkdir::IntoIter,
}

impl<'a> Traversal<'a> {
    pub fn new(request: &'a RelocationRequest) -> Self {
        Self {
            request,
            entries: WalkDir::new(request.source_root())
                .follow_links(false)
                .into_iter(),
        }
    }

    /// Maps a matched file to its place under the destination root.
    fn plan(&self, path: &Path) -> Option<MatchRecord> {
        let file_name = path.file_name()?;
        let parent = path.parent()?;
        let relative_dir = match parent.strip_prefix(self.request.source_root()) {
            Ok(rel) => rel,
            Err(_) => {
                warn!(path = %path.display(), "matched file is outside the source root; skipping");
                return None;
            }
        };

        Some(MatchRecord {
            source_path: path.to_path_buf(),
            planned_destination: self
                .request
                .destination_root()
                .join(relative_dir)
                .join(file_name),
            action: self.request.action(),
        })
    }

    fn is_avoided(&self, path: &Path) -> bool {
        self.request
            .avoid()
            .is_some_and(|avoid| paths::is_within(path, avoid))
    }
}

impl Iterator for Traversal<'_> {
    type Item = Result<MatchRecord, TraversalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };

            if self.is_avoided(entry.path()) {
                if entry.file_type().is_dir() {
                    debug!(dir = %entry.path().display(), "skipping destination subtree");
                    self.entries.skip_current_dir();
                }
                continue;
            }

            if !is_file_candidate(&entry) {
                continue;
            }

            if !self.request.extensions().matches(entry.path()) {
                trace!(path = %entry.path().display(), "extension not selected");
                continue;
            }

            if let Some(record) = self.plan(entry.path()) {
                return Some(Ok(record));
            }
        }
    }
}

/// Regular files, and symlinks that point at regular files.
fn is_file_candidate(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionSet;
    use crate::request::{Action, Mode};
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, rel.as_bytes()).expect("Failed to write test file");
    }

    fn request(root: &Path, dest: &str) -> RelocationRequest {
        RelocationRequest::new(
            root,
            dest,
            Mode::Simulate,
            Action::Move,
            ExtensionSet::parse([".mp4", ".mkv"]),
        )
        .expect("valid request")
    }

    fn sources(request: &RelocationRequest) -> HashSet<PathBuf> {
        Traversal::new(request)
            .map(|item| item.expect("no traversal errors").source_path)
            .collect()
    }

    #[test]
    fn test_yields_only_selected_extensions() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "a/one.mp4");
        touch(root, "b/c/two.MKV");
        touch(root, "notes.txt");
        touch(root, "noext");

        let request = request(root, "OUT");
        let found = sources(&request);
        let base = request.source_root();

        let expected: HashSet<PathBuf> = [base.join("a/one.mp4"), base.join("b/c/two.MKV")]
            .into_iter()
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_planned_destination_mirrors_relative_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "trip/day1/clip.mp4");
        touch(root, "top.mp4");

        let request = request(root, "OUT");
        let mut planned: Vec<PathBuf> = Traversal::new(&request)
            .map(|item| item.expect("no traversal errors").planned_destination)
            .collect();
        planned.sort();

        let out = request.source_root().join("OUT");
        assert_eq!(
            planned,
            vec![out.join("top.mp4"), out.join("trip/day1/clip.mp4")]
        );
    }

    #[test]
    fn test_skips_nested_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "keep.mp4");
        touch(root, "OUT/already.mp4");
        touch(root, "OUT/deep/also.mp4");
        touch(root, "OUTtakes/sibling.mp4");

        let request = request(root, "OUT");
        let found = sources(&request);
        let base = request.source_root();

        assert!(found.contains(&base.join("keep.mp4")));
        assert!(found.contains(&base.join("OUTtakes/sibling.mp4")));
        assert!(!found.iter().any(|p| p.starts_with(base.join("OUT"))));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_destination_equal_to_source_matches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        touch(root, "clip.mp4");

        let request = request(root, &root.to_string_lossy());
        assert_eq!(Traversal::new(&request).count(), 0);
    }

    #[test]
    fn test_records_carry_request_action() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        touch(temp_dir.path(), "clip.mp4");
        let request = RelocationRequest::new(
            temp_dir.path(),
            "OUT",
            Mode::Simulate,
            Action::Copy,
            ExtensionSet::default(),
        )
        .expect("valid request");

        let records: Vec<_> = Traversal::new(&request).collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Copy);
    }

    #[test]
    fn test_vanished_root_is_reported_not_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().join("gone");
        fs::create_dir(&root).expect("Failed to create directory");
        let request = request(&root, "OUT");
        fs::remove_dir(&root).expect("Failed to remove directory");

        let items: Vec<_> = Traversal::new(&request).collect();
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}

//! Extension-based file classification.
//!
//! This module knows the video formats the tool extracts by default and
//! provides [`ExtensionSet`], the normalized allow-list a relocation run
//! filters on. Classification looks at the file name only, never at content.
//!
//! # Examples
//!
//! ```
//! use solovideos::extensions::{ExtensionSet, VideoFormat};
//! use std::path::Path;
//!
//! let set = ExtensionSet::default();
//! assert_eq!(set.len(), VideoFormat::ALL.len());
//! assert!(set.matches(Path::new("holiday/CLIP.MP4")));
//! assert!(!set.matches(Path::new("notes.txt")));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// A video container format recognized out of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VideoFormat {
    Mp4,
    M4v,
    Mov,
    Avi,
    Mkv,
    Wmv,
    Flv,
    Webm,
    M2ts,
    ThreeGp,
}

impl VideoFormat {
    /// Every known format, in the order they are presented to users.
    pub const ALL: [VideoFormat; 10] = [
        VideoFormat::Mp4,
        VideoFormat::M4v,
        VideoFormat::Mov,
        VideoFormat::Avi,
        VideoFormat::Mkv,
        VideoFormat::Wmv,
        VideoFormat::Flv,
        VideoFormat::Webm,
        VideoFormat::M2ts,
        VideoFormat::ThreeGp,
    ];

    /// Returns the extension for this format, lowercase with a leading dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use solovideos::extensions::VideoFormat;
    ///
    /// assert_eq!(VideoFormat::Mp4.extension(), ".mp4");
    /// assert_eq!(VideoFormat::ThreeGp.extension(), ".3gp");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => ".mp4",
            VideoFormat::M4v => ".m4v",
            VideoFormat::Mov => ".mov",
            VideoFormat::Avi => ".avi",
            VideoFormat::Mkv => ".mkv",
            VideoFormat::Wmv => ".wmv",
            VideoFormat::Flv => ".flv",
            VideoFormat::Webm => ".webm",
            VideoFormat::M2ts => ".m2ts",
            VideoFormat::ThreeGp => ".3gp",
        }
    }

    /// Returns a human-readable description of this format.
    pub fn description(&self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "MPEG-4 video",
            VideoFormat::M4v => "iTunes MPEG-4 video",
            VideoFormat::Mov => "QuickTime movie",
            VideoFormat::Avi => "Audio Video Interleave",
            VideoFormat::Mkv => "Matroska video",
            VideoFormat::Wmv => "Windows Media video",
            VideoFormat::Flv => "Flash video",
            VideoFormat::Webm => "WebM video",
            VideoFormat::M2ts => "Blu-ray MPEG-2 transport stream",
            VideoFormat::ThreeGp => "3GPP mobile video",
        }
    }

    /// Looks up a format by extension, ignoring case and an optional leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalized = normalize_extension(ext)?;
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == normalized)
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Normalizes user input such as `MP4`, `.mp4` or `*.mp4` to `.mp4`.
///
/// Returns `None` for blank input or input that is only a dot.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('*').unwrap_or(trimmed);
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() || bare.contains(['/', '\\']) {
        return None;
    }
    Some(format!(".{}", bare.to_lowercase()))
}

/// The lowercase extension of `path` with a leading dot, if it has one.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// An allow-list of lowercase extensions, each stored with a leading dot.
///
/// Ordered so that listing it for logs is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    /// Builds a set from raw user input, skipping entries that normalize to nothing.
    ///
    /// The result may be empty; callers building a request must reject that.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            raw.into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        )
    }

    /// Builds a set from known formats.
    pub fn from_formats(formats: &[VideoFormat]) -> Self {
        Self(
            formats
                .iter()
                .map(|format| format.extension().to_string())
                .collect(),
        )
    }

    /// Returns true if the lowercase extension of `path` is in the set.
    pub fn matches(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.0.contains(&ext))
    }

    /// Returns true if `ext` (already normalized or not) is in the set.
    pub fn contains(&self, ext: &str) -> bool {
        normalize_extension(ext).is_some_and(|ext| self.0.contains(&ext))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates the extensions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Sorted, comma-separated listing, e.g. `.avi, .mkv, .mp4`.
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(", ")
    }
}

impl Default for ExtensionSet {
    /// All known video formats.
    fn default() -> Self {
        Self::from_formats(&VideoFormat::ALL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions_are_lowercase_with_dot() {
        for format in VideoFormat::ALL {
            let ext = format.extension();
            assert!(ext.starts_with('.'));
            assert_eq!(ext, ext.to_lowercase());
        }
    }

    #[test]
    fn test_from_extension_case_insensitive() {
        assert_eq!(VideoFormat::from_extension("MKV"), Some(VideoFormat::Mkv));
        assert_eq!(VideoFormat::from_extension(".3GP"), Some(VideoFormat::ThreeGp));
        assert_eq!(VideoFormat::from_extension("txt"), None);
        assert_eq!(VideoFormat::from_extension(""), None);
    }

    #[test]
    fn test_normalize_extension_variants() {
        assert_eq!(normalize_extension("mp4"), Some(".mp4".to_string()));
        assert_eq!(normalize_extension(".MP4"), Some(".mp4".to_string()));
        assert_eq!(normalize_extension("*.Mov"), Some(".mov".to_string()));
        assert_eq!(normalize_extension("  webm "), Some(".webm".to_string()));
        assert_eq!(normalize_extension(""), None);
        assert_eq!(normalize_extension("."), None);
        assert_eq!(normalize_extension("a/b"), None);
    }

    #[test]
    fn test_default_set_has_all_video_formats() {
        let set = ExtensionSet::default();
        assert_eq!(set.len(), 10);
        assert!(set.contains(".m2ts"));
        assert!(set.contains("flv"));
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let set = ExtensionSet::parse([".mp4"]);
        assert!(set.matches(Path::new("CLIP.MP4")));
        assert!(set.matches(Path::new("dir/clip.Mp4")));
        assert!(!set.matches(Path::new("clip.mp4.txt")));
        assert!(!set.matches(Path::new("mp4")));
    }

    #[test]
    fn test_joined_is_sorted() {
        let set = ExtensionSet::parse(["mkv", "AVI", ".mp4", "mkv"]);
        assert_eq!(set.joined(), ".avi, .mkv, .mp4");
    }

    #[test]
    fn test_parse_skips_blank_entries() {
        let set = ExtensionSet::parse(["", "  ", "."]);
        assert!(set.is_empty());
    }
}

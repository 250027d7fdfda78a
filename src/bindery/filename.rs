//! Directory-name policy for nodes.
//!
//! Node directories are named after the node's title, reduced to a form
//! that is safe on every filesystem the store targets. Names are always
//! lower-cased because case-insensitive filesystems would otherwise map
//! differently-cased titles onto the same directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Fallback name when sanitization leaves nothing usable.
pub const DEFAULT_NAME: &str = "folder";

/// Separator placed between a base name and its collision counter.
const SEP: &str = " ";

/// First counter tried when probing for a free name.
const FIRST_NUMBER: u32 = 2;

/// Reduces an arbitrary title to a valid directory name.
///
/// Path separators become dashes, a small blocked punctuation set is
/// removed, tabs become spaces, and surrounding whitespace/dots are
/// trimmed. A leading `__` is stripped because that prefix is reserved
/// for the store's internal directories. An empty result falls back to
/// [`DEFAULT_NAME`].
pub fn sanitize(title: &str) -> String {
    let mut name: String = title
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' => Some('-'),
            '?' | '\'' | '&' | '<' | '>' | '|' | '`' | ':' | ';' => None,
            '\t' => Some(' '),
            other => Some(other),
        })
        .collect();

    name = name.trim_matches(|c| c == ' ' || c == '\t' || c == '.').to_string();

    if let Some(rest) = name.strip_prefix("__") {
        name = rest.to_string();
    }

    if name.is_empty() {
        name = DEFAULT_NAME.to_string();
    }

    name.to_lowercase()
}

/// Returns a path under `dir` that does not exist yet.
///
/// Tries `base + ext` first, then `base 2 + ext`, `base 3 + ext`, and so
/// on. Collision checking is only meaningful for a single-threaded
/// caller; no cross-process locking is attempted.
pub fn unique_path(dir: &Path, base: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{}{}", base, ext));
    if !candidate.exists() {
        return candidate;
    }

    let mut i = FIRST_NUMBER;
    loop {
        let candidate = dir.join(format!("{}{}{}{}", base, SEP, i, ext));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

/// Sanitizes `title` and resolves collisions inside `dir` in one step.
pub fn valid_unique_path(dir: &Path, title: &str, ext: &str) -> PathBuf {
    unique_path(dir, &sanitize(title), ext)
}

/// In-memory variant of [`unique_path`] for callers that already hold a
/// directory listing. Returns the free name rather than a full path.
pub fn unique_name_in(existing: &HashSet<String>, base: &str, ext: &str) -> String {
    let candidate = format!("{}{}", base, ext);
    if !existing.contains(&candidate) {
        return candidate;
    }

    let mut i = FIRST_NUMBER;
    loop {
        let candidate = format!("{}{}{}{}", base, SEP, i, ext);
        if !existing.contains(&candidate) {
            return candidate;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sanitize_strips_reserved_prefix_and_punctuation() {
        assert_eq!(sanitize("__Secret: Plans?"), "secret plans");
    }

    #[test]
    fn sanitize_replaces_separators_and_lowercases() {
        assert_eq!(sanitize("My/Big\\Idea"), "my-big-idea");
        assert_eq!(sanitize("Tabs\there"), "tabs here");
        assert_eq!(sanitize("..dotted.."), "dotted");
    }

    #[test]
    fn sanitize_falls_back_on_empty() {
        assert_eq!(sanitize(""), DEFAULT_NAME);
        assert_eq!(sanitize("??:;"), DEFAULT_NAME);
        assert_eq!(sanitize("__"), DEFAULT_NAME);
    }

    #[test]
    fn unique_path_probes_numbered_suffixes() {
        let dir = tempdir().unwrap();
        for name in ["notes", "notes 2", "notes 3"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let free = valid_unique_path(dir.path(), "Notes", "");
        assert_eq!(free, dir.path().join("notes 4"));
    }

    #[test]
    fn unique_path_returns_base_when_free() {
        let dir = tempdir().unwrap();
        assert_eq!(
            unique_path(dir.path(), "fresh", ".xml"),
            dir.path().join("fresh.xml")
        );
    }

    #[test]
    fn unique_name_in_matches_directory_variant() {
        let existing: HashSet<String> =
            ["notes", "notes 2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_name_in(&existing, "notes", ""), "notes 3");
        assert_eq!(unique_name_in(&existing, "other", ""), "other");
    }
}

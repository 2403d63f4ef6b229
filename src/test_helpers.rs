//! Shared test utilities.
//!
//! Builders for in-memory sources and on-disk theme directories, plus a
//! manifest parser so tests can assert on the listed files instead of the
//! raw XML.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let outcome = merge(vec![
//!     source_themes("konsole", &["Dracula.colorscheme"]),
//!     source_themes("iterm", &["dracula.itermcolors"]),
//! ]);
//! assert_eq!(entry_names(outcome.accepted.iter()), vec!["Dracula.colorscheme"]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SourceConfig;
use crate::types::{SourceId, SourceThemes, ThemeEntry};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create `dir` (and parents) and write one small file per name.
pub fn write_themes(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        fs::write(dir.join(name), format!("theme {name}\n")).unwrap();
    }
}

/// In-memory source whose entries live under `<id>/`.
pub fn source_themes(id: &str, names: &[&str]) -> SourceThemes {
    source_themes_at(Path::new(""), id, id, names)
}

/// In-memory source whose entries live under `<anchor>/<dir>/`.
pub fn source_themes_at(anchor: &Path, dir: &str, id: &str, names: &[&str]) -> SourceThemes {
    let source = SourceId::new(id);
    let base: PathBuf = anchor.join(dir);
    SourceThemes {
        entries: names
            .iter()
            .map(|name| ThemeEntry::new(source.clone(), *name, base.join(name)))
            .collect(),
        source,
    }
}

/// Minimal source config with no repository.
pub fn source(id: &str, extension: &str) -> SourceConfig {
    SourceConfig {
        id: id.to_string(),
        label: String::new(),
        extension: extension.to_string(),
        repository: None,
        subdir: String::new(),
    }
}

// =========================================================================
// Extractors
// =========================================================================

/// Original filenames, in iteration order.
pub fn entry_names<'a>(entries: impl IntoIterator<Item = &'a ThemeEntry>) -> Vec<&'a str> {
    entries.into_iter().map(|e| e.original_name()).collect()
}

/// Paths listed in `<file>` elements of a rendered manifest, in order.
pub fn manifest_files(manifest: &str) -> Vec<&str> {
    manifest
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("<file>")
                .and_then(|rest| rest.strip_suffix("</file>"))
        })
        .collect()
}

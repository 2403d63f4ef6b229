//! Source directory enumeration.
//!
//! Collects the candidate theme files of one source: every regular file
//! directly inside the source directory whose name ends with the source's
//! extension. There is no recursion, and files that don't match the
//! extension are invisible (READMEs, licenses and screenshots live next to
//! the themes upstream).
//!
//! ```text
//! KodoTermThemes/konsole/          # source directory
//! ├── Breeze.colorscheme           # collected
//! ├── DarkPastels.colorscheme      # collected
//! ├── Breeze.COLORSCHEME           # ignored: suffix match is case-sensitive
//! ├── README.md                    # ignored
//! └── extras/                      # ignored: not a file
//!     └── Old.colorscheme          # ignored: not directly inside
//! ```
//!
//! ## Missing vs. empty
//!
//! A missing or unreadable directory is a [`ScanError::SourceUnavailable`],
//! never an empty result: a source whose download failed must not look like a
//! source that ships zero themes. An existing empty directory is fine.

use crate::types::{SourceId, SourceThemes, ThemeEntry};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source '{source_id}' unavailable at {}: {cause}", path.display())]
    SourceUnavailable {
        source_id: SourceId,
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
}

/// Enumerate the theme files of one source, sorted by filename.
///
/// Safe to call repeatedly: each call re-reads the directory from scratch.
pub fn collect(
    source: &SourceId,
    directory: &Path,
    extension: &str,
) -> Result<SourceThemes, ScanError> {
    let unavailable = |cause: io::Error| ScanError::SourceUnavailable {
        source_id: source.clone(),
        path: directory.to_path_buf(),
        cause,
    };

    let metadata = fs::metadata(directory).map_err(unavailable)?;
    if !metadata.is_dir() {
        return Err(unavailable(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for dir_entry in walker {
        let dir_entry = dir_entry.map_err(|e| unavailable(io::Error::from(e)))?;
        // Follows symlinks; dangling links are not files.
        if !dir_entry.path().is_file() {
            continue;
        }
        let Some(name) = dir_entry.file_name().to_str() else {
            tracing::warn!(
                source = %source,
                path = %dir_entry.path().display(),
                "skipping theme with non UTF-8 filename"
            );
            continue;
        };
        if !name.ends_with(extension) {
            continue;
        }
        let entry = ThemeEntry::new(source.clone(), name, dir_entry.path().to_path_buf());
        tracing::debug!(
            source = %source,
            name = entry.original_name(),
            identity = %entry.identity(),
            "collected theme"
        );
        entries.push(entry);
    }

    entries.sort_by(|a, b| a.original_name().cmp(b.original_name()));

    tracing::info!(
        source = %source,
        directory = %directory.display(),
        count = entries.len(),
        "collected source"
    );

    Ok(SourceThemes {
        source: source.clone(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{entry_names, write_themes};
    use tempfile::TempDir;

    fn konsole() -> SourceId {
        SourceId::new("konsole")
    }

    #[test]
    fn collects_matching_files_sorted() {
        let tmp = TempDir::new().unwrap();
        write_themes(
            tmp.path(),
            &["Zenburn.colorscheme", "Breeze.colorscheme", "Dracula.colorscheme"],
        );

        let themes = collect(&konsole(), tmp.path(), ".colorscheme").unwrap();

        assert_eq!(
            entry_names(&themes.entries),
            vec!["Breeze.colorscheme", "Dracula.colorscheme", "Zenburn.colorscheme"]
        );
        assert!(themes.entries.iter().all(|e| e.source() == &konsole()));
    }

    #[test]
    fn computes_identity_keys() {
        let tmp = TempDir::new().unwrap();
        write_themes(tmp.path(), &["Solarized-Dark.colorscheme"]);

        let themes = collect(&konsole(), tmp.path(), ".colorscheme").unwrap();

        assert_eq!(themes.entries[0].identity().as_str(), "solarizeddark");
        assert_eq!(
            themes.entries[0].path(),
            tmp.path().join("Solarized-Dark.colorscheme")
        );
    }

    #[test]
    fn non_matching_extensions_are_invisible() {
        let tmp = TempDir::new().unwrap();
        write_themes(
            tmp.path(),
            &["Breeze.colorscheme", "README.md", "LICENSE", "Breeze.colorscheme.bak"],
        );

        let themes = collect(&konsole(), tmp.path(), ".colorscheme").unwrap();
        assert_eq!(entry_names(&themes.entries), vec!["Breeze.colorscheme"]);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let tmp = TempDir::new().unwrap();
        write_themes(tmp.path(), &["Upper.JSON", "lower.json"]);

        let themes = collect(&SourceId::new("wt"), tmp.path(), ".json").unwrap();
        assert_eq!(entry_names(&themes.entries), vec!["lower.json"]);
    }

    #[test]
    fn subdirectories_are_not_descended_or_collected() {
        let tmp = TempDir::new().unwrap();
        write_themes(tmp.path(), &["Top.json"]);
        let nested = tmp.path().join("nested.json");
        fs::create_dir_all(&nested).unwrap();
        write_themes(&nested, &["Inner.json"]);

        let themes = collect(&SourceId::new("wt"), tmp.path(), ".json").unwrap();
        assert_eq!(entry_names(&themes.entries), vec!["Top.json"]);
    }

    #[test]
    fn empty_directory_yields_no_entries() {
        let tmp = TempDir::new().unwrap();
        let themes = collect(&konsole(), tmp.path(), ".colorscheme").unwrap();
        assert!(themes.is_empty());
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("never-downloaded");

        let result = collect(&konsole(), &missing, ".colorscheme");

        match result {
            Err(ScanError::SourceUnavailable {
                source_id, path, ..
            }) => {
                assert_eq!(source_id, konsole());
                assert_eq!(path, missing);
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn file_instead_of_directory_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("konsole");
        fs::write(&file, "not a dir").unwrap();

        let result = collect(&konsole(), &file, ".colorscheme");
        assert!(matches!(result, Err(ScanError::SourceUnavailable { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_unavailable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("konsole");
        write_themes(&dir, &["Breeze.colorscheme"]);
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores permission bits
        if fs::read_dir(&dir).is_ok() {
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = collect(&konsole(), &dir, ".colorscheme");
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(ScanError::SourceUnavailable { path, cause, .. }) => {
                assert_eq!(path, dir);
                assert_eq!(cause.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn rerun_gives_same_result() {
        let tmp = TempDir::new().unwrap();
        write_themes(tmp.path(), &["B.json", "a.json", "C.json"]);

        let first = collect(&SourceId::new("wt"), tmp.path(), ".json").unwrap();
        let second = collect(&SourceId::new("wt"), tmp.path(), ".json").unwrap();
        assert_eq!(first.entries, second.entries);
    }
}

//! Shared types passed between pipeline stages.
//!
//! Every stage (collect → merge → manifest → report) speaks in terms of
//! [`ThemeEntry`]. Entries are immutable once built: a stage that needs an
//! entry at a different location (the persister copying files into the
//! local themes directory) creates a new one with [`ThemeEntry::relocated`].

use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier of one upstream theme source, as named in `themes.toml`.
///
/// Doubles as the subdirectory name under the local themes directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical name of a theme, used to detect the same theme shipped by
/// several sources under different spellings.
///
/// Built only by [`crate::naming::normalize`], so every value is already in
/// canonical form: ASCII lowercase letters and digits, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub(crate) fn from_canonical(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One candidate theme file discovered in a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeEntry {
    source: SourceId,
    original_name: String,
    identity: IdentityKey,
    path: PathBuf,
}

impl ThemeEntry {
    /// Build an entry, deriving its identity key from `original_name`.
    pub fn new(source: SourceId, original_name: impl Into<String>, path: PathBuf) -> Self {
        let original_name = original_name.into();
        let identity = crate::naming::normalize(&original_name);
        Self {
            source,
            original_name,
            identity,
            path,
        }
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Filename as it appeared in the source directory (e.g. `Dracula.colorscheme`).
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn identity(&self) -> &IdentityKey {
        &self.identity
    }

    /// Location of the theme file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Same theme, stored somewhere else.
    pub fn relocated(&self, path: PathBuf) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }
}

/// All entries collected from one source, sorted by original filename.
#[derive(Debug, Clone)]
pub struct SourceThemes {
    pub source: SourceId,
    pub entries: Vec<ThemeEntry>,
}

impl SourceThemes {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

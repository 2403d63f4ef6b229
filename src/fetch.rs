//! Source retrieval and file persistence.
//!
//! The pipeline only needs two things from the outside world: a local
//! directory for each source ([`FetchSource`]) and a way to store an
//! accepted theme file ([`PersistFile`]). How that happens (a git clone,
//! an existing checkout, a plain copy) stays behind these traits.
//!
//! | Implementation | Used by | Behavior |
//! |----------------|---------|----------|
//! | [`LocalFetcher`] | `build`, `check` | points at `<themes_dir>/<id>` in the project |
//! | [`GitFetcher`] | `sync` | shallow-clones each repository once into the work dir |
//! | [`DirectoryPersister`] | `sync` | replaces `<themes_dir>/<id>` with the accepted files |

use crate::config::{SourceConfig, ThemesConfig};
use crate::types::ThemeEntry;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Source '{0}' has no repository configured")]
    MissingRepository(String),
    #[error("git clone of {repository} failed: {stderr}")]
    Git { repository: String, stderr: String },
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to prepare {}: {cause}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
    #[error("Failed to copy {} to {}: {cause}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        cause: io::Error,
    },
    #[error("No destination configured for source '{0}'")]
    UnknownSource(String),
}

/// Produces the local directory holding a source's theme files.
pub trait FetchSource {
    fn fetch(&mut self, source: &SourceConfig) -> Result<PathBuf, FetchError>;
}

/// Stores an accepted theme file and returns where it now lives.
pub trait PersistFile {
    /// Called once before the first `persist`, even when nothing is accepted.
    fn begin(&mut self) -> Result<(), PersistError> {
        Ok(())
    }

    fn persist(&mut self, entry: &ThemeEntry) -> Result<PathBuf, PersistError>;
}

/// Reads sources from the project's own themes directory.
///
/// Does not check that the directory exists; the collector reports that
/// as an unavailable source.
pub struct LocalFetcher {
    themes_dir: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: &Path, config: &ThemesConfig) -> Self {
        Self {
            themes_dir: root.join(&config.themes_dir),
        }
    }
}

impl FetchSource for LocalFetcher {
    fn fetch(&mut self, source: &SourceConfig) -> Result<PathBuf, FetchError> {
        Ok(self.themes_dir.join(&source.id))
    }
}

/// Shallow-clones upstream repositories with the `git` CLI.
///
/// Sources sharing a repository (Windows Terminal and iTerm2 schemes both
/// come from `iTerm2-Color-Schemes`) share a single clone.
pub struct GitFetcher {
    work_dir: PathBuf,
    clones: HashMap<String, PathBuf>,
}

impl GitFetcher {
    /// Start with a fresh, empty work directory.
    pub fn new(work_dir: PathBuf) -> Result<Self, FetchError> {
        if work_dir.exists() {
            fs::remove_dir_all(&work_dir)?;
        }
        fs::create_dir_all(&work_dir)?;
        Ok(Self {
            work_dir,
            clones: HashMap::new(),
        })
    }

    /// Remove the work directory and every clone in it.
    pub fn cleanup(self) -> Result<(), FetchError> {
        if self.work_dir.exists() {
            fs::remove_dir_all(&self.work_dir)?;
        }
        Ok(())
    }

    fn checkout(&mut self, repository: &str) -> Result<PathBuf, FetchError> {
        if let Some(existing) = self.clones.get(repository) {
            return Ok(existing.clone());
        }
        let target = self.work_dir.join(format!("repo-{}", self.clones.len()));
        tracing::info!(repository, target = %target.display(), "cloning");

        let output = Command::new("git")
            .args(["clone", "--depth", "1", "--quiet", repository])
            .arg(&target)
            .output()?;
        if !output.status.success() {
            return Err(FetchError::Git {
                repository: repository.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        self.clones.insert(repository.to_string(), target.clone());
        Ok(target)
    }
}

impl FetchSource for GitFetcher {
    fn fetch(&mut self, source: &SourceConfig) -> Result<PathBuf, FetchError> {
        let repository = source
            .repository
            .as_deref()
            .ok_or_else(|| FetchError::MissingRepository(source.id.clone()))?;
        let checkout = self.checkout(repository)?;
        Ok(checkout.join(&source.subdir))
    }
}

/// Copies accepted themes into `<themes_dir>/<source id>/`.
///
/// [`PersistFile::begin`] empties every configured source directory, so
/// themes dropped upstream (or now rejected as duplicates) disappear locally.
pub struct DirectoryPersister {
    destinations: HashMap<String, PathBuf>,
    prepared: bool,
}

impl DirectoryPersister {
    pub fn new(root: &Path, config: &ThemesConfig) -> Self {
        let destinations = config
            .sources
            .iter()
            .map(|s| (s.id.clone(), config.source_dir(root, s)))
            .collect();
        Self {
            destinations,
            prepared: false,
        }
    }

    fn prepare(&mut self) -> Result<(), PersistError> {
        for dir in self.destinations.values() {
            let prepare_err = |cause| PersistError::Prepare {
                path: dir.clone(),
                cause,
            };
            if dir.exists() {
                fs::remove_dir_all(dir).map_err(prepare_err)?;
            }
            fs::create_dir_all(dir).map_err(prepare_err)?;
        }
        self.prepared = true;
        Ok(())
    }
}

impl PersistFile for DirectoryPersister {
    fn begin(&mut self) -> Result<(), PersistError> {
        if !self.prepared {
            self.prepare()?;
        }
        Ok(())
    }

    fn persist(&mut self, entry: &ThemeEntry) -> Result<PathBuf, PersistError> {
        self.begin()?;
        let dir = self
            .destinations
            .get(entry.source().as_str())
            .ok_or_else(|| PersistError::UnknownSource(entry.source().to_string()))?;
        let target = dir.join(entry.original_name());
        fs::copy(entry.path(), &target).map_err(|cause| PersistError::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            cause,
        })?;
        tracing::debug!(from = %entry.path().display(), to = %target.display(), "persisted theme");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{source, write_themes};
    use crate::types::SourceId;
    use tempfile::TempDir;

    fn config_with(sources: Vec<SourceConfig>) -> ThemesConfig {
        ThemesConfig {
            themes_dir: "themes".to_string(),
            sources,
            ..ThemesConfig::default()
        }
    }

    #[test]
    fn local_fetcher_points_into_themes_dir() {
        let config = config_with(vec![source("konsole", ".colorscheme")]);
        let mut fetcher = LocalFetcher::new(Path::new("/project"), &config);

        let dir = fetcher.fetch(&config.sources[0]).unwrap();
        assert_eq!(dir, Path::new("/project/themes/konsole"));
    }

    #[test]
    fn git_fetcher_requires_repository() {
        let tmp = TempDir::new().unwrap();
        let mut fetcher = GitFetcher::new(tmp.path().join("work")).unwrap();

        let result = fetcher.fetch(&source("konsole", ".colorscheme"));
        assert!(matches!(result, Err(FetchError::MissingRepository(id)) if id == "konsole"));
    }

    #[test]
    fn git_fetcher_starts_clean_and_cleans_up() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(work.join("stale")).unwrap();

        let fetcher = GitFetcher::new(work.clone()).unwrap();
        assert!(work.exists());
        assert!(!work.join("stale").exists());

        fetcher.cleanup().unwrap();
        assert!(!work.exists());
    }

    #[test]
    fn git_fetcher_reuses_clone_for_shared_repository() {
        let tmp = TempDir::new().unwrap();
        let mut fetcher = GitFetcher::new(tmp.path().join("work")).unwrap();
        let checkout = tmp.path().join("work/repo-0");
        fetcher
            .clones
            .insert("https://example.invalid/schemes.git".to_string(), checkout.clone());

        let mut wt = source("windowsterminal", ".json");
        wt.repository = Some("https://example.invalid/schemes.git".to_string());
        wt.subdir = "windowsterminal".to_string();
        let mut iterm = source("iterm", ".itermcolors");
        iterm.repository = wt.repository.clone();
        iterm.subdir = "schemes".to_string();

        assert_eq!(fetcher.fetch(&wt).unwrap(), checkout.join("windowsterminal"));
        assert_eq!(fetcher.fetch(&iterm).unwrap(), checkout.join("schemes"));
        assert_eq!(fetcher.clones.len(), 1);
    }

    #[test]
    fn persister_replaces_destination_contents() {
        let tmp = TempDir::new().unwrap();
        let config = config_with(vec![source("konsole", ".colorscheme")]);
        let dest = config.source_dir(tmp.path(), &config.sources[0]);
        write_themes(&dest, &["Stale.colorscheme"]);

        let upstream = tmp.path().join("upstream");
        write_themes(&upstream, &["Breeze.colorscheme"]);
        let entry = ThemeEntry::new(
            SourceId::new("konsole"),
            "Breeze.colorscheme",
            upstream.join("Breeze.colorscheme"),
        );

        let mut persister = DirectoryPersister::new(tmp.path(), &config);
        let stored = persister.persist(&entry).unwrap();

        assert_eq!(stored, dest.join("Breeze.colorscheme"));
        assert_eq!(
            fs::read_to_string(&stored).unwrap(),
            fs::read_to_string(entry.path()).unwrap()
        );
        assert!(!dest.join("Stale.colorscheme").exists());
    }

    #[test]
    fn persister_empties_sources_with_no_accepted_files() {
        let tmp = TempDir::new().unwrap();
        let config = config_with(vec![
            source("konsole", ".colorscheme"),
            source("iterm", ".itermcolors"),
        ]);
        let iterm_dir = config.source_dir(tmp.path(), &config.sources[1]);
        write_themes(&iterm_dir, &["Old.itermcolors"]);

        let upstream = tmp.path().join("upstream");
        write_themes(&upstream, &["Breeze.colorscheme"]);
        let entry = ThemeEntry::new(
            SourceId::new("konsole"),
            "Breeze.colorscheme",
            upstream.join("Breeze.colorscheme"),
        );

        DirectoryPersister::new(tmp.path(), &config)
            .persist(&entry)
            .unwrap();

        assert!(iterm_dir.is_dir());
        assert_eq!(fs::read_dir(&iterm_dir).unwrap().count(), 0);
    }

    #[test]
    fn persister_rejects_unknown_source() {
        let tmp = TempDir::new().unwrap();
        let config = config_with(vec![source("konsole", ".colorscheme")]);
        let entry = ThemeEntry::new(SourceId::new("ghostty"), "A.conf", tmp.path().join("A.conf"));

        let result = DirectoryPersister::new(tmp.path(), &config).persist(&entry);
        assert!(matches!(result, Err(PersistError::UnknownSource(_))));
    }

    #[test]
    fn persister_reports_missing_input() {
        let tmp = TempDir::new().unwrap();
        let config = config_with(vec![source("konsole", ".colorscheme")]);
        let entry = ThemeEntry::new(
            SourceId::new("konsole"),
            "Gone.colorscheme",
            tmp.path().join("nowhere/Gone.colorscheme"),
        );

        let result = DirectoryPersister::new(tmp.path(), &config).persist(&entry);
        assert!(matches!(result, Err(PersistError::Copy { .. })));
    }
}

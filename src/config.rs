//! Project configuration.
//!
//! Handles loading, validating, and merging `themes.toml`. User values are
//! laid over the stock defaults: tables merge key by key, everything else
//! (including the `sources` array) is replaced wholesale.
//!
//! ## Config File Location
//!
//! `themes.toml` sits in the project root, next to the generated manifest:
//!
//! ```text
//! project/
//! ├── themes.toml              # optional, stock defaults otherwise
//! ├── KodoTermThemes.qrc       # generated manifest
//! └── KodoTermThemes/
//!     ├── konsole/
//!     ├── windowsterminal/
//!     └── iterm/
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! themes_dir = "KodoTermThemes"        # One subdirectory per source
//! manifest = "KodoTermThemes.qrc"      # Generated resource file
//! work_dir = "tmp_themes_download"     # Scratch space for `sync` clones
//! preview_limit = 10                   # Duplicates listed per colliding source
//!
//! # Listed highest priority first.
//! [[sources]]
//! id = "konsole"
//! label = "Konsole (KDE)"
//! extension = ".colorscheme"
//! repository = "https://github.com/KDE/konsole.git"
//! subdir = "data/color-schemes"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::types::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "themes.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `themes.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemesConfig {
    /// Directory (relative to the project root) holding one subdirectory per source.
    pub themes_dir: String,
    /// Manifest path relative to the project root.
    pub manifest: String,
    /// Scratch directory for `sync` clones, removed when the sync finishes.
    pub work_dir: String,
    /// How many rejected duplicates the report lists per colliding source.
    pub preview_limit: usize,
    /// Theme sources, highest priority first.
    pub sources: Vec<SourceConfig>,
}

impl Default for ThemesConfig {
    fn default() -> Self {
        Self {
            themes_dir: "KodoTermThemes".to_string(),
            manifest: "KodoTermThemes.qrc".to_string(),
            work_dir: "tmp_themes_download".to_string(),
            preview_limit: 10,
            sources: default_sources(),
        }
    }
}

fn default_sources() -> Vec<SourceConfig> {
    const ITERM2_SCHEMES: &str = "https://github.com/mbadolato/iTerm2-Color-Schemes.git";
    vec![
        SourceConfig {
            id: "konsole".to_string(),
            label: "Konsole (KDE)".to_string(),
            extension: ".colorscheme".to_string(),
            repository: Some("https://github.com/KDE/konsole.git".to_string()),
            subdir: "data/color-schemes".to_string(),
        },
        SourceConfig {
            id: "windowsterminal".to_string(),
            label: "Windows Terminal".to_string(),
            extension: ".json".to_string(),
            repository: Some(ITERM2_SCHEMES.to_string()),
            subdir: "windowsterminal".to_string(),
        },
        SourceConfig {
            id: "iterm".to_string(),
            label: "iTerm2".to_string(),
            extension: ".itermcolors".to_string(),
            repository: Some(ITERM2_SCHEMES.to_string()),
            subdir: "schemes".to_string(),
        },
    ]
}

/// One upstream theme collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Identifier, also the subdirectory name under `themes_dir`.
    pub id: String,
    /// Human-readable name for the report. Falls back to `id`.
    #[serde(default)]
    pub label: String,
    /// Filename suffix of this source's theme files (case-sensitive).
    pub extension: String,
    /// Git URL to clone for `sync`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Directory inside the checkout that holds the theme files.
    #[serde(default)]
    pub subdir: String,
}

impl SourceConfig {
    pub fn source_id(&self) -> SourceId {
        SourceId::new(self.id.clone())
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

impl ThemesConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let themes_dir = project_relative("themes_dir", &self.themes_dir)?;
        let manifest = project_relative("manifest", &self.manifest)?;
        let work_dir = project_relative("work_dir", &self.work_dir)?;
        // `sync` deletes the work dir wholesale and clears the theme dirs.
        for (key, other) in [("themes_dir", &themes_dir), ("manifest", &manifest)] {
            if work_dir.starts_with(other) || other.starts_with(&work_dir) {
                return Err(ConfigError::Validation(format!(
                    "work_dir '{}' overlaps {key} '{}'",
                    self.work_dir,
                    other.display()
                )));
            }
        }
        if self.preview_limit == 0 {
            return Err(ConfigError::Validation(
                "preview_limit must be at least 1".into(),
            ));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.is_empty()
                || !source
                    .id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            {
                return Err(ConfigError::Validation(format!(
                    "source id '{}' must be non-empty and use only letters, digits, '-' or '_'",
                    source.id
                )));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "source id '{}' is listed twice",
                    source.id
                )));
            }
            if source.extension.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' needs an extension",
                    source.id
                )));
            }
        }
        Ok(())
    }

    /// Local directory holding the themes of `source`.
    pub fn source_dir(&self, root: &Path, source: &SourceConfig) -> PathBuf {
        root.join(&self.themes_dir).join(&source.id)
    }

    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    pub fn work_dir_path(&self, root: &Path) -> PathBuf {
        root.join(&self.work_dir)
    }

    /// Source ids in priority order.
    pub fn source_order(&self) -> Vec<SourceId> {
        self.sources.iter().map(SourceConfig::source_id).collect()
    }
}

/// Check that `value` names a location strictly inside the project root.
///
/// Returns the path with `.` components dropped so callers can compare
/// locations component-wise.
fn project_relative(key: &str, value: &str) -> Result<PathBuf, ConfigError> {
    let mut normalized = PathBuf::new();
    for component in Path::new(value).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::Validation(format!(
                    "{key} '{value}' must be a relative path inside the project root"
                )));
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{key} '{value}' must name a path below the project root"
        )));
    }
    Ok(normalized)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ThemesConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `[[sources]]` list replaces the stock sources rather than extending them.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `themes.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ThemesConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ThemesConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `themes.toml` from the project root over the stock defaults.
pub fn load_config(root: &Path) -> Result<ThemesConfig, ConfigError> {
    let overlay = load_raw_config(root)?;
    if overlay.is_some() {
        tracing::debug!(path = %root.join(CONFIG_FILENAME).display(), "loaded config");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `themes.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Theme Harvest Configuration
# ===========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding one subdirectory per source (relative to this file).
themes_dir = "KodoTermThemes"

# Generated Qt resource file listing every retained theme.
manifest = "KodoTermThemes.qrc"

# Scratch directory for `sync` clones. Removed after each sync.
work_dir = "tmp_themes_download"

# Rejected duplicates shown per colliding source in the report.
preview_limit = 10

# ---------------------------------------------------------------------------
# Sources
# ---------------------------------------------------------------------------
# Listed highest priority first: when two sources ship the same theme
# (compared by name, ignoring case, punctuation and extension), the one
# listed first is kept. Defining any [[sources]] replaces this whole list.
#
#   id          subdirectory name under themes_dir
#   label       name shown in the report
#   extension   filename suffix, case-sensitive
#   repository  git URL cloned by `sync`
#   subdir      directory inside the clone holding the theme files

[[sources]]
id = "konsole"
label = "Konsole (KDE)"
extension = ".colorscheme"
repository = "https://github.com/KDE/konsole.git"
subdir = "data/color-schemes"

[[sources]]
id = "windowsterminal"
label = "Windows Terminal"
extension = ".json"
repository = "https://github.com/mbadolato/iTerm2-Color-Schemes.git"
subdir = "windowsterminal"

[[sources]]
id = "iterm"
label = "iTerm2"
extension = ".itermcolors"
repository = "https://github.com/mbadolato/iTerm2-Color-Schemes.git"
subdir = "schemes"
"##
}

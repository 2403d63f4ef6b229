//! Qt resource manifest (`.qrc`) generation.
//!
//! The manifest is checked into version control and consumed by `rcc`, so
//! the output must be byte-for-byte reproducible:
//!
//! ```text
//! <!DOCTYPE RCC><RCC version="1.0">
//! <qresource prefix="/">
//!     <file>KodoTermThemes/konsole/Breeze.colorscheme</file>
//!     <file>KodoTermThemes/konsole/DarkPastels.colorscheme</file>
//!     <file>KodoTermThemes/windowsterminal/3024 Day.json</file>
//!     <file>KodoTermThemes/iterm/Zenburn.itermcolors</file>
//! </qresource>
//! </RCC>
//! ```
//!
//! - Groups follow source priority order, not alphabetical order.
//! - Within a group, files are sorted by original filename.
//! - Paths are relative to the anchor (the project root) and always use `/`.

use crate::dedup::AcceptedSet;
use crate::types::{SourceId, ThemeEntry};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

const HEADER: &str = "<!DOCTYPE RCC><RCC version=\"1.0\">\n<qresource prefix=\"/\">\n";
const FOOTER: &str = "</qresource>\n</RCC>\n";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("{} is not inside {}", path.display(), anchor.display())]
    OutsideAnchor { path: PathBuf, anchor: PathBuf },
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
    #[error("Theme {name} belongs to source '{source_id}', which is not in the source order")]
    UnknownSource { source_id: SourceId, name: String },
    #[error("Failed to write manifest {}: {cause}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
}

/// Render the manifest for `accepted`, grouping entries by `source_order`.
pub fn render(
    accepted: &AcceptedSet,
    source_order: &[SourceId],
    anchor: &Path,
) -> Result<String, ManifestError> {
    if let Some(stray) = accepted.iter().find(|e| !source_order.contains(e.source())) {
        return Err(ManifestError::UnknownSource {
            source_id: stray.source().clone(),
            name: stray.original_name().to_string(),
        });
    }

    let mut out = String::from(HEADER);
    for source in source_order {
        let mut group: Vec<&ThemeEntry> = accepted.from_source(source).collect();
        group.sort_by(|a, b| a.original_name().cmp(b.original_name()));
        for entry in group {
            let rel = relative_path(entry.path(), anchor)?;
            out.push_str("    <file>");
            out.push_str(&escape_xml(&rel));
            out.push_str("</file>\n");
        }
    }
    out.push_str(FOOTER);
    Ok(out)
}

/// Write rendered manifest text, creating the parent directory if needed.
pub fn write(path: &Path, contents: &str) -> Result<(), ManifestError> {
    let write_err = |cause| ManifestError::Write {
        path: path.to_path_buf(),
        cause,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)
}

/// Outcome of comparing a rendered manifest with the one on disk.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{} is out of date, run `theme-harvest build`", .0.display())]
    Stale(PathBuf),
    #[error("{} does not exist, run `theme-harvest build`", .0.display())]
    Missing(PathBuf),
    #[error("Failed to read manifest {}: {cause}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        cause: io::Error,
    },
}

/// Verify the manifest at `path` is byte-identical to `rendered`.
pub fn check(path: &Path, rendered: &str) -> Result<(), CheckError> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == rendered => Ok(()),
        Ok(_) => Err(CheckError::Stale(path.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(CheckError::Missing(path.to_path_buf()))
        }
        Err(cause) => Err(CheckError::Read {
            path: path.to_path_buf(),
            cause,
        }),
    }
}

/// SHA-256 of the manifest text, as a hex string.
pub fn digest(contents: &str) -> String {
    format!("{:x}", Sha256::digest(contents.as_bytes()))
}

/// `path` relative to `anchor`, `/`-separated on every platform.
fn relative_path(path: &Path, anchor: &Path) -> Result<String, ManifestError> {
    let outside = || ManifestError::OutsideAnchor {
        path: path.to_path_buf(),
        anchor: anchor.to_path_buf(),
    };
    let rel = path.strip_prefix(anchor).map_err(|_| outside())?;

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| ManifestError::NonUtf8Path(path.to_path_buf()))?,
            ),
            Component::CurDir => {}
            _ => return Err(outside()),
        }
    }
    if parts.is_empty() {
        return Err(outside());
    }
    Ok(parts.join("/"))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

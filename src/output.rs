//! Run report formatting.
//!
//! # Output Format
//!
//! ```text
//! Sources
//!     Konsole (KDE)       233 collected, 233 kept
//!     Windows Terminal    412 collected, 410 kept
//!     iTerm2              450 collected,  38 kept
//! Total unique themes: 681
//!
//! Duplicates skipped: 414
//!     iTerm2 matching Konsole (KDE) (4)
//!         - Breeze.itermcolors (matches Breeze.colorscheme)
//!         ...
//!     iTerm2 matching Windows Terminal (408)
//!         - 3024 Day.itermcolors (matches 3024 Day.json)
//!         ... and 398 more
//!
//! Manifest
//!     KodoTermThemes.qrc (681 files, sha256 3f7a09c1d2e4)
//! ```
//!
//! # Architecture
//!
//! [`Summary`] is the report data, built from a merge outcome. It serializes
//! to JSON for `check --json`. [`format_report`] turns it into lines (pure,
//! testable) and [`print_report`] writes them to stdout.

use crate::config::ThemesConfig;
use crate::dedup::MergeOutcome;
use crate::manifest;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts for one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub id: String,
    pub label: String,
    pub collected: usize,
    pub accepted: usize,
}

/// A rejected file and the accepted file it collided with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Duplicate {
    pub name: String,
    pub matches: String,
}

/// All rejections of one source caused by one other source.
#[derive(Debug, Clone, Serialize)]
pub struct CollisionGroup {
    pub source: String,
    pub source_label: String,
    pub matched_source: String,
    pub matched_label: String,
    /// Sorted by rejected filename.
    pub duplicates: Vec<Duplicate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestSummary {
    pub path: String,
    pub files: usize,
    pub sha256: String,
}

/// Report data for one run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub sources: Vec<SourceSummary>,
    pub total_collected: usize,
    pub total_unique: usize,
    pub collisions: Vec<CollisionGroup>,
    pub manifest: ManifestSummary,
    #[serde(skip)]
    pub preview_limit: usize,
}

impl Summary {
    pub fn new(config: &ThemesConfig, outcome: &MergeOutcome, manifest_text: &str) -> Self {
        let label_of = |id: &str| {
            config
                .sources
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.display_label().to_string())
                .unwrap_or_else(|| id.to_string())
        };
        let rank_of = |id: &str| {
            outcome
                .counts
                .iter()
                .position(|c| c.source.as_str() == id)
                .unwrap_or(usize::MAX)
        };

        let sources = outcome
            .counts
            .iter()
            .map(|c| SourceSummary {
                id: c.source.to_string(),
                label: label_of(c.source.as_str()),
                collected: c.collected,
                accepted: c.accepted,
            })
            .collect();

        // (rejected rank, matched rank) keeps groups in priority order
        let mut grouped: BTreeMap<(usize, usize), CollisionGroup> = BTreeMap::new();
        for rejected in &outcome.rejected {
            let source = rejected.entry.source().as_str();
            let matched = rejected.cause.source().as_str();
            grouped
                .entry((rank_of(source), rank_of(matched)))
                .or_insert_with(|| CollisionGroup {
                    source: source.to_string(),
                    source_label: label_of(source),
                    matched_source: matched.to_string(),
                    matched_label: label_of(matched),
                    duplicates: Vec::new(),
                })
                .duplicates
                .push(Duplicate {
                    name: rejected.entry.original_name().to_string(),
                    matches: rejected.cause.original_name().to_string(),
                });
        }
        let collisions = grouped
            .into_values()
            .map(|mut group| {
                group.duplicates.sort();
                group
            })
            .collect();

        Self {
            sources,
            total_collected: outcome.total_collected(),
            total_unique: outcome.accepted.len(),
            collisions,
            manifest: ManifestSummary {
                path: config.manifest.clone(),
                files: outcome.accepted.len(),
                sha256: manifest::digest(manifest_text),
            },
            preview_limit: config.preview_limit,
        }
    }

    pub fn total_duplicates(&self) -> usize {
        self.collisions.iter().map(|g| g.duplicates.len()).sum()
    }
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format the run report.
pub fn format_report(summary: &Summary) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Sources".to_string());
    let label_width = summary
        .sources
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);
    let count_width = summary
        .sources
        .iter()
        .map(|s| s.collected.to_string().len())
        .max()
        .unwrap_or(1);
    for source in &summary.sources {
        lines.push(format!(
            "{}{:<label_width$}    {:>count_width$} collected, {:>count_width$} kept",
            indent(1),
            source.label,
            source.collected,
            source.accepted,
        ));
    }
    lines.push(format!("Total unique themes: {}", summary.total_unique));

    let total_duplicates = summary.total_duplicates();
    if total_duplicates > 0 {
        lines.push(String::new());
        lines.push(format!("Duplicates skipped: {}", total_duplicates));
        for group in &summary.collisions {
            lines.push(format!(
                "{}{} matching {} ({})",
                indent(1),
                group.source_label,
                group.matched_label,
                group.duplicates.len()
            ));
            for dup in group.duplicates.iter().take(summary.preview_limit) {
                lines.push(format!(
                    "{}- {} (matches {})",
                    indent(2),
                    dup.name,
                    dup.matches
                ));
            }
            if group.duplicates.len() > summary.preview_limit {
                lines.push(format!(
                    "{}... and {} more",
                    indent(2),
                    group.duplicates.len() - summary.preview_limit
                ));
            }
        }
    }

    lines.push(String::new());
    lines.push("Manifest".to_string());
    lines.push(format!(
        "{}{} ({} files, sha256 {})",
        indent(1),
        summary.manifest.path,
        summary.manifest.files,
        short_digest(&summary.manifest.sha256)
    ));

    lines
}

/// Print the run report to stdout.
pub fn print_report(summary: &Summary) {
    for line in format_report(summary) {
        println!("{}", line);
    }
}

/// Render the summary as pretty JSON. Lists every duplicate, not just the preview.
pub fn summary_json(summary: &Summary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

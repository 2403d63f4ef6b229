//! Single-run orchestration: fetch → collect → merge → manifest.
//!
//! Each function takes everything it needs as arguments and returns the
//! result; nothing is kept between runs. Any fetch or collect failure aborts
//! before the merge, so a manifest is only ever rendered from a complete view
//! of every source.

use crate::config::ThemesConfig;
use crate::dedup::{self, MergeOutcome};
use crate::fetch::{FetchError, FetchSource, PersistError, PersistFile};
use crate::manifest::{self, ManifestError};
use crate::output::Summary;
use crate::scan::{self, ScanError};
use crate::types::SourceThemes;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Everything a run produced. Nothing has been written yet.
#[derive(Debug)]
pub struct BuildResult {
    pub outcome: MergeOutcome,
    /// Rendered manifest text.
    pub manifest: String,
    pub summary: Summary,
}

/// Fetch and collect every configured source, in priority order.
pub fn collect_sources(
    config: &ThemesConfig,
    fetcher: &mut impl FetchSource,
) -> Result<Vec<SourceThemes>, PipelineError> {
    let mut collected = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let dir = fetcher.fetch(source)?;
        collected.push(scan::collect(&source.source_id(), &dir, &source.extension)?);
    }
    Ok(collected)
}

/// Deduplicate the themes already present in the project and render the
/// manifest for them.
pub fn build(
    root: &Path,
    config: &ThemesConfig,
    fetcher: &mut impl FetchSource,
) -> Result<BuildResult, PipelineError> {
    let outcome = dedup::merge(collect_sources(config, fetcher)?);
    finish(root, config, outcome)
}

/// Deduplicate freshly fetched sources, persist the accepted files, and
/// render the manifest for their new locations.
pub fn sync(
    root: &Path,
    config: &ThemesConfig,
    fetcher: &mut impl FetchSource,
    persister: &mut impl PersistFile,
) -> Result<BuildResult, PipelineError> {
    let mut outcome = dedup::merge(collect_sources(config, fetcher)?);

    persister.begin()?;
    outcome.accepted = outcome
        .accepted
        .try_map(|entry| Ok::<_, PersistError>(entry.relocated(persister.persist(entry)?)))?;
    tracing::info!(count = outcome.accepted.len(), "persisted accepted themes");

    finish(root, config, outcome)
}

fn finish(
    root: &Path,
    config: &ThemesConfig,
    outcome: MergeOutcome,
) -> Result<BuildResult, PipelineError> {
    let manifest = manifest::render(&outcome.accepted, &config.source_order(), root)?;
    let summary = Summary::new(config, &outcome, &manifest);
    Ok(BuildResult {
        outcome,
        manifest,
        summary,
    })
}

//! # Theme Harvest
//!
//! Gathers terminal color themes from several upstream collections into one
//! deduplicated directory and writes the Qt resource manifest (`.qrc`) that
//! bundles them into the terminal widget.
//!
//! # Architecture: One-Shot Pipeline
//!
//! ```text
//! 1. Fetch     sources        →  local directories   (git clone, or the project's own copy)
//! 2. Collect   directories    →  theme entries       (one pass per source, extension filter)
//! 3. Merge     entries        →  accepted + rejected (identity keys, first source wins)
//! 4. Manifest  accepted       →  KodoTermThemes.qrc  (grouped by source, sorted, reproducible)
//! 5. Report    merge outcome  →  stdout              (counts and duplicate previews)
//! ```
//!
//! A run owns all of its data; nothing survives between invocations. If any
//! source is missing the run stops before the merge, so a manifest is never
//! written from a partial view.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Filename → identity key normalization |
//! | [`scan`] | Enumerates one source directory into theme entries |
//! | [`dedup`] | Priority-ordered merge with first-writer-wins collisions |
//! | [`manifest`] | Deterministic `.qrc` rendering, writing, and drift checks |
//! | [`output`] | Run summary and report formatting |
//! | [`pipeline`] | Wires the stages together for `build` and `sync` |
//! | [`fetch`] | Source retrieval and file persistence traits with git/fs implementations |
//! | [`config`] | `themes.toml` loading, merging, and validation |
//! | [`types`] | Shared types (`ThemeEntry`, `SourceId`, `IdentityKey`) |
//!
//! # Design Decisions
//!
//! ## Identity by Name Only
//!
//! Theme files are never parsed. Two files are the same theme when their
//! names normalize to the same key (`Solarized-Dark.colorscheme` and
//! `solarized_dark.itermcolors` both become `solarizeddark`). Parsing three
//! unrelated formats to compare palettes would be slower and less predictable
//! than trusting upstream naming.
//!
//! ## Priority Is Order
//!
//! There is no priority field. The `[[sources]]` list in `themes.toml` is the
//! priority: the first source to present a key keeps it, and later sources
//! never evict it. Native formats go first so the terminal loads the
//! richest definition available.
//!
//! ## Reproducible Manifest
//!
//! The `.qrc` is checked into version control, so two runs over the same
//! files must produce the same bytes. Groups follow source order, files are
//! sorted within a group, and paths always use `/`. `check` fails when the
//! committed manifest has drifted from the themes on disk.

pub mod config;
pub mod dedup;
pub mod fetch;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Cross-source deduplication.
//!
//! Sources are merged in priority order, which is simply the order they are
//! listed in `themes.toml`. The first source to present an identity key owns
//! it; any later entry with the same key is rejected and remembers which
//! accepted entry it collided with.
//!
//! ```text
//! priority: konsole → windowsterminal → iterm
//!
//! konsole/Dracula.colorscheme        accepted
//! windowsterminal/Dracula.json       rejected (matches Dracula.colorscheme)
//! iterm/Dracula.itermcolors          rejected (matches Dracula.colorscheme)
//! iterm/Zenburn.itermcolors          accepted
//! ```
//!
//! Accepted entries are never evicted. Priority is expressed only through
//! processing order, so a caller wanting a different winner reorders the
//! sources.

use crate::types::{IdentityKey, SourceId, SourceThemes, ThemeEntry};
use std::collections::HashMap;

/// Deduplicated themes, keyed by identity.
///
/// Collision policy: first writer wins. [`AcceptedSet::insert`] refuses a key
/// that is already present and hands back the entry holding it.
#[derive(Debug, Default)]
pub struct AcceptedSet {
    index: HashMap<IdentityKey, usize>,
    entries: Vec<ThemeEntry>,
}

impl AcceptedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` unless its key is taken; on conflict returns the holder.
    pub fn insert(&mut self, entry: ThemeEntry) -> Result<(), (ThemeEntry, &ThemeEntry)> {
        if let Some(&pos) = self.index.get(entry.identity()) {
            return Err((entry, &self.entries[pos]));
        }
        self.index.insert(entry.identity().clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, key: &IdentityKey) -> Option<&ThemeEntry> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in acceptance order (priority order, then filename).
    pub fn iter(&self) -> impl Iterator<Item = &ThemeEntry> {
        self.entries.iter()
    }

    /// Accepted entries belonging to one source.
    pub fn from_source<'a>(&'a self, source: &'a SourceId) -> impl Iterator<Item = &'a ThemeEntry> {
        self.entries.iter().filter(move |e| e.source() == source)
    }

    /// Rebuild the set with every entry passed through `f`.
    ///
    /// `f` must not change identities (it is meant for relocating files), so
    /// the key index carries over unchanged.
    pub fn try_map<E>(
        self,
        mut f: impl FnMut(&ThemeEntry) -> Result<ThemeEntry, E>,
    ) -> Result<Self, E> {
        let entries = self
            .entries
            .iter()
            .map(&mut f)
            .collect::<Result<Vec<_>, E>>()?;
        debug_assert!(
            entries
                .iter()
                .zip(&self.entries)
                .all(|(new, old)| new.identity() == old.identity())
        );
        Ok(Self {
            index: self.index,
            entries,
        })
    }
}

/// A theme left out because another source already provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub entry: ThemeEntry,
    /// The accepted entry holding the same identity key.
    pub cause: ThemeEntry,
}

/// Number of files one source contributed and how many survived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    pub source: SourceId,
    pub collected: usize,
    pub accepted: usize,
}

/// Result of merging all sources.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub accepted: AcceptedSet,
    pub rejected: Vec<RejectedEntry>,
    /// One row per input source, in priority order.
    pub counts: Vec<SourceCount>,
}

impl MergeOutcome {
    /// Total entries fed into the merge.
    pub fn total_collected(&self) -> usize {
        self.counts.iter().map(|c| c.collected).sum()
    }

    /// Source order the merge ran in.
    pub fn source_order(&self) -> Vec<SourceId> {
        self.counts.iter().map(|c| c.source.clone()).collect()
    }
}

/// Merge collected sources, listed highest priority first.
pub fn merge(sources: Vec<SourceThemes>) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for SourceThemes {
        source,
        mut entries,
    } in sources
    {
        entries.sort_by(|a, b| a.original_name().cmp(b.original_name()));
        let collected = entries.len();
        let mut accepted = 0;

        for entry in entries {
            match outcome.accepted.insert(entry) {
                Ok(()) => accepted += 1,
                Err((entry, holder)) => {
                    tracing::debug!(
                        name = entry.original_name(),
                        source = %entry.source(),
                        matches = holder.original_name(),
                        matches_source = %holder.source(),
                        "duplicate theme skipped"
                    );
                    let cause = holder.clone();
                    outcome.rejected.push(RejectedEntry { entry, cause });
                }
            }
        }

        tracing::info!(source = %source, collected, accepted, "merged source");
        outcome.counts.push(SourceCount {
            source,
            collected,
            accepted,
        });
    }

    outcome
}

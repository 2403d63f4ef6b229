//! Theme filename normalization.
//!
//! Upstream collections spell the same theme differently: Konsole ships
//! `Solarized-Dark.colorscheme`, Windows Terminal `Solarized Dark.json`,
//! iTerm2 `solarized_dark.itermcolors`. All of them must land on the same
//! identity key so the merge stage can tell they are one theme.
//!
//! ## Rules
//!
//! 1. Take the basename.
//! 2. Drop the final extension (text after the last `.`). A leading dot
//!    (`.hidden`) is part of the name, not an extension separator.
//! 3. Lowercase, ASCII only. No locale-sensitive folding.
//! 4. Delete every character outside `a-z` and `0-9`.
//!
//! The result may be empty (`---.json` → `""`). Empty keys collide like any
//! other key.

use crate::types::IdentityKey;
use std::path::Path;

/// Map a theme filename to its identity key.
///
/// - `"Dracula.colorscheme"` → `"dracula"`
/// - `"Solarized Dark.json"` → `"solarizeddark"`
/// - `"Builtin_Tango-Light.itermcolors"` → `"builtintangolight"`
/// - `"3024 Day.json"` → `"3024day"`
/// - `"Café.json"` → `"caf"` (non-ASCII is dropped, not folded)
/// - `"schemes/Ocean.json"` → `"ocean"` (directories are ignored)
pub fn normalize(filename: &str) -> IdentityKey {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    let key: String = stem
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();

    IdentityKey::from_canonical(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> String {
        normalize(name).as_str().to_string()
    }

    #[test]
    fn strips_extension_and_lowercases() {
        assert_eq!(key("Dracula.colorscheme"), "dracula");
    }

    #[test]
    fn removes_spaces_and_punctuation() {
        assert_eq!(key("Solarized Dark.json"), "solarizeddark");
        assert_eq!(key("Builtin_Tango-Light.itermcolors"), "builtintangolight");
        assert_eq!(key("Gruvbox (Dark) +.json"), "gruvboxdark");
    }

    #[test]
    fn case_and_punctuation_insensitive() {
        assert_eq!(
            normalize("Solarized-Dark.json"),
            normalize("solarized_dark.colorscheme")
        );
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(key("3024 Day.json"), "3024day");
        assert_eq!(key("Atom One 2.itermcolors"), "atomone2");
    }

    #[test]
    fn only_final_extension_dropped() {
        assert_eq!(key("Base16.Ocean.json"), "base16ocean");
    }

    #[test]
    fn no_extension_keeps_whole_name() {
        assert_eq!(key("Monokai"), "monokai");
    }

    #[test]
    fn directory_components_ignored() {
        assert_eq!(key("schemes/Ocean.json"), "ocean");
    }

    #[test]
    fn non_ascii_removed_without_folding() {
        assert_eq!(key("Café.json"), "caf");
        assert_eq!(key("İstanbul.json"), "stanbul");
    }

    #[test]
    fn punctuation_only_name_is_empty_key() {
        assert_eq!(key("---.json"), "");
        assert_eq!(key(""), "");
    }

    #[test]
    fn leading_dot_is_not_an_extension() {
        assert_eq!(key(".Hidden"), "hidden");
    }

    #[test]
    fn idempotent() {
        for name in [
            "Dracula.colorscheme",
            "Solarized Dark.json",
            "Base16.Ocean.json",
            "---.json",
            "3024 Day.json",
            ".Hidden",
        ] {
            let once = normalize(name);
            assert_eq!(normalize(once.as_str()), once, "not idempotent for {name}");
        }
    }
}

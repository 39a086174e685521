// crates/ud-coverage-core/src/language.rs
// ============================================================================
// Module: Language Identity
// Description: Case-insensitive language keys, aliases, and axis ordering.
// Purpose: Give every pipeline stage one stable notion of "a language".
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The validator reports languages as enum names (`Rust`, `Odbc`, `Python`)
//! in validation results and as lowercase keys (`rust`, `odbc`) in its
//! cross-reference reports. Specification tags spell them in yet another way
//! (`@python_expected`). [`Language`] folds all of these into one lowercase
//! key, and [`LanguagePolicy`] applies aliases (the Rust core driver is
//! reported as `core`) and the presentation order of the language axis.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Language key the Rust core driver is reported under.
pub const CORE_LANGUAGE: &str = "core";

// ============================================================================
// SECTION: Language
// ============================================================================

/// Canonical language key.
///
/// # Invariants
/// - The key is trimmed and ASCII-lowercased; ordering is lexicographic on it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Creates a language key from any spelling of its name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    /// Returns the canonical key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the title-cased label used in report headings.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        chars.next().map_or_else(String::new, |first| {
            let mut label = String::with_capacity(self.0.len());
            label.push(first.to_ascii_uppercase());
            label.extend(chars);
            label
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Alias and ordering rules for the language axis.
///
/// # Invariants
/// - Alias keys and targets are stored as canonical keys.
/// - [`LanguagePolicy::order`] is total and deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePolicy {
    /// Raw key to canonical key rewrites (`rust` -> `core`).
    aliases: BTreeMap<String, String>,
    /// Languages rendered before all others, in this order.
    pinned: Vec<Language>,
}

impl LanguagePolicy {
    /// Builds a policy from alias pairs and pinned languages.
    #[must_use]
    pub fn new<A, P>(aliases: A, pinned: P) -> Self
    where
        A: IntoIterator<Item = (String, String)>,
        P: IntoIterator<Item = String>,
    {
        let aliases = aliases
            .into_iter()
            .map(|(from, to)| (Language::new(&from).0, Language::new(&to).0))
            .collect();
        let mut seen = BTreeSet::new();
        let pinned = pinned
            .into_iter()
            .map(|name| Language::new(&name))
            .filter(|language| seen.insert(language.clone()))
            .collect();
        Self {
            aliases,
            pinned,
        }
    }

    /// Resolves a raw language name to its canonical language.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Language {
        let language = Language::new(raw);
        match self.aliases.get(language.as_str()) {
            Some(target) => Language(target.clone()),
            None => language,
        }
    }

    /// Orders a set of languages: pinned first, then lexicographic.
    #[must_use]
    pub fn order<I>(&self, languages: I) -> Vec<Language>
    where
        I: IntoIterator<Item = Language>,
    {
        let mut remaining: BTreeSet<Language> = languages.into_iter().collect();
        let mut ordered = Vec::with_capacity(remaining.len());
        for pinned in &self.pinned {
            if remaining.remove(pinned) {
                ordered.push(pinned.clone());
            }
        }
        ordered.extend(remaining);
        ordered
    }
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self::new(
            [("rust".to_string(), CORE_LANGUAGE.to_string())],
            [CORE_LANGUAGE.to_string()],
        )
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

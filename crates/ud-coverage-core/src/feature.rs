// crates/ud-coverage-core/src/feature.rs
// ============================================================================
// Module: Feature Model
// Description: Features, scenarios, and the single-pass Gherkin header scan.
// Purpose: Turn a specification file into ordered scenarios with their tags.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! Parsing is a single forward scan over trimmed lines. Only the structural
//! lines matter: `@tag` lines, `Feature:`, and `Scenario:`. Step lines and
//! comments are skipped without side effects; any other prose clears the
//! pending-tag buffer so tags never leak onto an unrelated scenario.
//!
//! ## Invariants
//! - Scenarios keep declaration order; names are unique within a feature.
//! - Tags are stored exactly as written (case-sensitive).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;

use crate::language::Language;
use crate::language::LanguagePolicy;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Keyword opening the feature header.
const FEATURE_KEYWORD: &str = "Feature:";
/// Keywords opening a scenario.
const SCENARIO_KEYWORDS: [&str; 2] = ["Scenario Outline:", "Scenario:"];
/// Step keywords skipped by the structural scan.
const STEP_KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];
/// Structural Gherkin lines that never carry scenario identity.
const NEUTRAL_PREFIXES: [&str; 5] = ["Background:", "Examples:", "Rule:", "|", "\"\"\""];
/// Tag suffix declaring that a language is expected to implement a scenario.
const EXPECTED_SUFFIX: &str = "_expected";
/// Tag suffix declaring that a language does not need a scenario.
const NOT_NEEDED_SUFFIX: &str = "_not_needed";
/// Tag suffix marking integration-level scenarios.
const INTEGRATION_SUFFIX: &str = "_int";
/// Tag suffixes that mark a scenario as written for a driver (`@<lang>`,
/// `@<lang>_e2e`, `@<lang>_int`).
const DRIVER_TAG_SUFFIXES: [&str; 3] = ["_e2e", INTEGRATION_SUFFIX, ""];
/// Directory holding specification files.
const DEFINITIONS_DIR: &str = "definitions";
/// Directories under `definitions/` holding specifications for one language.
const LANGUAGE_ONLY_DIRS: [&str; 6] = ["core", "python", "odbc", "jdbc", "csharp", "javascript"];

/// Abbreviations expanded when a title is derived from a file name.
const TITLE_WORDS: [(&str, &str); 8] = [
    ("auth", "Authentication"),
    ("api", "API"),
    ("sql", "SQL"),
    ("http", "HTTP"),
    ("jwt", "JWT"),
    ("ssl", "SSL"),
    ("tls", "TLS"),
    ("db", "Database"),
];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Test level a scenario is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TestLevel {
    /// End-to-end scenario (default).
    E2e,
    /// Integration scenario (any tag ending in `_int`).
    Integration,
}

impl TestLevel {
    /// Returns the label shown next to the scenario name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::E2e => "E2E",
            Self::Integration => "Integration",
        }
    }
}

/// Whether a feature is shared by every driver or owned by one language.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum FeatureScope {
    /// Lives under `definitions/shared/` or outside any language directory.
    Shared,
    /// Lives under `definitions/<lang>/` for one of the single-language directories.
    LanguageOnly(Language),
}

impl FeatureScope {
    /// Derives the scope from a workspace-relative specification path.
    ///
    /// The first `definitions` component decides: a following
    /// single-language directory makes the feature language-only, anything
    /// else (including `shared`) keeps it shared.
    #[must_use]
    pub fn from_path(path: &str, policy: &LanguagePolicy) -> Self {
        let components: Vec<&str> = path.split(['/', '\\']).collect();
        let Some(position) = components.iter().position(|part| *part == DEFINITIONS_DIR) else {
            return Self::Shared;
        };
        // The component after `definitions` must be a directory, not the file itself.
        match components.get(position + 1..components.len().saturating_sub(1)) {
            Some([dir, ..]) if LANGUAGE_ONLY_DIRS.contains(&dir.to_ascii_lowercase().as_str()) => {
                Self::LanguageOnly(policy.resolve(dir))
            }
            _ => Self::Shared,
        }
    }

    /// Returns the owning language for language-only features.
    #[must_use]
    pub const fn language(&self) -> Option<&Language> {
        match self {
            Self::Shared => None,
            Self::LanguageOnly(language) => Some(language),
        }
    }

    /// Returns true for shared features.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }
}

/// A single named behavioral case within a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    /// Scenario name as written after `Scenario:`.
    pub name: String,
    /// Scenario-level tags, case preserved.
    pub tags: Vec<String>,
    /// Languages declared via `@<lang>_expected` (scenario or feature level).
    pub expected_languages: BTreeSet<Language>,
    /// Languages declared via `@<lang>_not_needed` (scenario or feature level).
    pub excluded_languages: BTreeSet<Language>,
    /// Languages with a driver tag (`@<lang>`, `@<lang>_e2e`, `@<lang>_int`)
    /// on the scenario itself.
    pub driver_languages: BTreeSet<Language>,
}

impl Scenario {
    /// Returns the test level derived from the scenario tags.
    #[must_use]
    pub fn test_level(&self) -> TestLevel {
        if self.tags.iter().any(|tag| tag.to_ascii_lowercase().ends_with(INTEGRATION_SUFFIX)) {
            TestLevel::Integration
        } else {
            TestLevel::E2e
        }
    }

    /// Returns true when `language` is declared as not needing this scenario.
    #[must_use]
    pub fn is_excluded_for(&self, language: &Language) -> bool {
        self.excluded_languages.contains(language)
    }

    /// Returns true when the scenario is still to do for `language`.
    ///
    /// A scenario is to do unless the language is excluded or the scenario
    /// carries one of the language's driver tags. An `_expected` declaration
    /// keeps it to do even when a driver tag is present. Feature-level driver
    /// tags do not count.
    #[must_use]
    pub fn is_todo_for(&self, language: &Language) -> bool {
        if self.is_excluded_for(language) {
            return false;
        }
        self.expected_languages.contains(language) || !self.driver_languages.contains(language)
    }
}

/// A file-backed set of scenarios.
///
/// # Invariants
/// - `path` is workspace-relative with `/` separators.
/// - `scenarios` is in declaration order with unique names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    /// Workspace-relative path of the specification file.
    pub path: String,
    /// Feature title (falls back to a title derived from the file name).
    pub title: String,
    /// Feature-level tags, case preserved.
    pub tags: Vec<String>,
    /// Presentation bucket (category directory or `other`).
    pub folder: String,
    /// Shared or language-only, derived from the path.
    pub scope: FeatureScope,
    /// Scenarios in declaration order.
    pub scenarios: Vec<Scenario>,
}

impl Feature {
    /// Returns the scenario names in declaration order.
    #[must_use]
    pub fn scenario_names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|scenario| scenario.name.as_str()).collect()
    }

    /// Returns the file stem of the specification path.
    #[must_use]
    pub fn stem(&self) -> &str {
        file_stem(&self.path)
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses specification text into a feature.
///
/// `path` is the workspace-relative path recorded on the feature; `folder`
/// is the presentation bucket computed by the catalog.
#[must_use]
pub fn parse_feature(path: &str, folder: &str, text: &str, policy: &LanguagePolicy) -> Feature {
    let mut pending: Vec<String> = Vec::new();
    let mut feature_tags: Vec<String> = Vec::new();
    let mut title: Option<String> = None;
    let mut in_header = true;
    let mut scenarios: Vec<Scenario> = Vec::new();
    let mut seen = BTreeSet::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('@') {
            let tags = line.split_whitespace().filter(|tag| tag.starts_with('@'));
            pending.extend(tags.map(String::from));
            continue;
        }
        if let Some(rest) = line.strip_prefix(FEATURE_KEYWORD) {
            title = Some(rest.trim().to_string());
            feature_tags = std::mem::take(&mut pending);
            in_header = false;
            continue;
        }
        if let Some(name) = scenario_name(line) {
            let tags = std::mem::take(&mut pending);
            if !seen.insert(name.to_string()) {
                warn!(feature = path, scenario = name, "duplicate scenario name ignored");
                continue;
            }
            let expected = declared_languages(&feature_tags, &tags, EXPECTED_SUFFIX, policy);
            let excluded = declared_languages(&feature_tags, &tags, NOT_NEEDED_SUFFIX, policy);
            let driver = driver_languages(&tags, policy);
            scenarios.push(Scenario {
                name: name.to_string(),
                tags,
                expected_languages: expected,
                excluded_languages: excluded,
                driver_languages: driver,
            });
            continue;
        }
        if line.starts_with('#') || is_step(line) || is_neutral(line) || in_header {
            continue;
        }
        pending.clear();
    }

    let title = match title {
        Some(title) if !title.is_empty() => title,
        _ => title_from_stem(file_stem(path)),
    };
    Feature {
        path: path.to_string(),
        title,
        tags: feature_tags,
        folder: folder.to_string(),
        scope: FeatureScope::from_path(path, policy),
        scenarios,
    }
}

/// Returns the scenario name when `line` opens a scenario.
fn scenario_name(line: &str) -> Option<&str> {
    SCENARIO_KEYWORDS.iter().find_map(|keyword| line.strip_prefix(keyword)).map(str::trim)
}

/// Returns true for `Given/When/Then/And/But/*` step lines.
fn is_step(line: &str) -> bool {
    STEP_KEYWORDS.iter().any(|keyword| {
        line.strip_prefix(keyword).is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
    })
}

/// Returns true for structural lines that neither open nor reset anything.
fn is_neutral(line: &str) -> bool {
    NEUTRAL_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Collects languages named by `@<lang><suffix>` tags at either level.
fn declared_languages(
    feature_tags: &[String],
    scenario_tags: &[String],
    suffix: &str,
    policy: &LanguagePolicy,
) -> BTreeSet<Language> {
    feature_tags
        .iter()
        .chain(scenario_tags)
        .filter_map(|tag| {
            let lowered = tag.trim_start_matches('@').to_ascii_lowercase();
            lowered
                .strip_suffix(suffix)
                .filter(|name| !name.is_empty())
                .map(|name| policy.resolve(name))
        })
        .collect()
}

/// Collects languages named by scenario-level driver tags.
fn driver_languages(scenario_tags: &[String], policy: &LanguagePolicy) -> BTreeSet<Language> {
    scenario_tags
        .iter()
        .filter_map(|tag| {
            let lowered = tag.trim_start_matches('@').to_ascii_lowercase();
            let name = DRIVER_TAG_SUFFIXES
                .iter()
                .find_map(|suffix| lowered.strip_suffix(suffix))
                .filter(|name| !name.is_empty())?;
            Some(policy.resolve(name))
        })
        .collect()
}

/// Returns the file name without directories or extension.
fn file_stem(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// Derives a human title from a file stem (`private_key_auth` -> `Private Key Authentication`).
#[must_use]
pub fn title_from_stem(stem: &str) -> String {
    stem.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lowered = word.to_ascii_lowercase();
            TITLE_WORDS.iter().find(|(short, _)| *short == lowered).map_or_else(
                || {
                    let mut chars = lowered.chars();
                    chars.next().map_or_else(String::new, |first| {
                        first.to_ascii_uppercase().to_string() + chars.as_str()
                    })
                },
                |(_, long)| (*long).to_string(),
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

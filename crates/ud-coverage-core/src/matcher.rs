// crates/ud-coverage-core/src/matcher.rs
// ============================================================================
// Module: Scenario Matcher
// Description: Scenario-name normalization and test declaration extraction.
// Purpose: Link scenarios to test methods for cross references and deep links.
// Dependencies: regex, thiserror, tracing
// ============================================================================

//! ## Overview
//! A scenario name such as `PUT with AUTO_COMPRESS=TRUE` is turned into four
//! candidate spellings (raw, snake_case, PascalCase, `test_` + snake_case).
//! A test method matches when its normalized name equals the normalized form
//! of any candidate. Normalization keeps only alphanumerics, lowercased.
//!
//! Declarations are found with a line scan that recognizes the marker styles
//! used by the driver test suites: `TEST_CASE("...")` macros, `@Test`-style
//! annotations, `#[test]`-style attributes, `def test_*` functions, and plain
//! `void name(` functions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::catalog::FeatureCatalog;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lines after an annotation marker searched for the method signature.
const ANNOTATION_LOOKAHEAD: usize = 3;
/// Lines before a `fn` searched for a test attribute (the `fn` line included).
const ATTRIBUTE_LOOKBACK: usize = 5;
/// Attribute prefixes marking a function as a test; `#[tokio::test` also
/// covers the argument form `#[tokio::test(flavor = "multi_thread")]`.
const TEST_ATTRIBUTES: [&str; 3] = ["#[test]", "#[rstest]", "#[tokio::test"];

const MACRO_PATTERN: &str = r#"TEST_CASE\s*\(\s*"([^"]+)""#;
const ANNOTATION_PATTERN: &str = r"^(?:@(?:Test|ParameterizedTest)|\[(?:Test|Fact))\b";
const SIGNATURE_PATTERN: &str = r"([A-Za-z_][A-Za-z0-9_]*)\s*\(";
const FUNCTION_PATTERN: &str = r"\bfn\s+([A-Za-z_][A-Za-z0-9_]*)\s*[<(]";
const PYTHON_PATTERN: &str = r"\bdef\s+(test_[A-Za-z0-9_]*)\s*\(";
const C_PATTERN: &str = r"\bvoid\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Matcher construction failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatcherError {
    /// A built-in declaration pattern failed to compile.
    #[error("invalid declaration pattern: {0}")]
    Pattern(String),
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Keeps ASCII letters and digits only, lowercased.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).map(|ch| ch.to_ascii_lowercase()).collect()
}

/// Removes everything except alphanumerics, underscores, and whitespace.
fn strip_punctuation(name: &str) -> String {
    name.chars().filter(|ch| ch.is_alphanumeric() || *ch == '_' || ch.is_whitespace()).collect()
}

/// Returns the four candidate spellings of a scenario name.
///
/// Order: raw name, snake_case, PascalCase, `test_` + snake_case.
#[must_use]
pub fn candidate_forms(scenario: &str) -> [String; 4] {
    let stripped = strip_punctuation(scenario);
    let snake = stripped.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_");
    let pascal: String = stripped
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect();
    let test_method = format!("test_{snake}");
    [scenario.to_string(), snake, pascal, test_method]
}

/// Returns true when `method` names a test for `scenario`.
#[must_use]
pub fn matches(method: &str, scenario: &str) -> bool {
    let method = normalize(method);
    if method.is_empty() {
        return false;
    }
    candidate_forms(scenario).iter().any(|candidate| normalize(candidate) == method)
}

// ============================================================================
// SECTION: Declarations
// ============================================================================

/// How a test declaration was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeclarationStyle {
    /// `TEST_CASE("<literal>"` macro; the literal is the identity.
    Macro,
    /// Method following an `@Test`-style annotation.
    Annotation,
    /// `fn` preceded by a test attribute.
    Attribute,
    /// `def test_*` function.
    Convention,
    /// `void name(` function.
    CStyle,
}

/// A test declaration found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDeclaration {
    /// 1-based line of the declaration.
    pub line: usize,
    /// Declared identity (method name or macro literal).
    pub name: String,
    /// Recognized marker style.
    pub style: DeclarationStyle,
}

// ============================================================================
// SECTION: Matcher
// ============================================================================

/// Compiled declaration patterns.
#[derive(Debug, Clone)]
pub struct ScenarioMatcher {
    /// `TEST_CASE("...")` macros.
    macro_case: Regex,
    /// Annotation marker lines.
    annotation: Regex,
    /// Identifier immediately before `(`.
    signature: Regex,
    /// `fn name(` declarations.
    function: Regex,
    /// `def test_name(` declarations.
    python: Regex,
    /// `void name(` declarations.
    c_function: Regex,
}

impl ScenarioMatcher {
    /// Compiles the declaration patterns.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError::Pattern`] when a pattern fails to compile.
    pub fn new() -> Result<Self, MatcherError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|err| MatcherError::Pattern(err.to_string()))
        };
        Ok(Self {
            macro_case: compile(MACRO_PATTERN)?,
            annotation: compile(ANNOTATION_PATTERN)?,
            signature: compile(SIGNATURE_PATTERN)?,
            function: compile(FUNCTION_PATTERN)?,
            python: compile(PYTHON_PATTERN)?,
            c_function: compile(C_PATTERN)?,
        })
    }

    /// Returns every test declaration in `text`, ordered by line.
    #[must_use]
    pub fn scan_declarations(&self, text: &str) -> Vec<TestDeclaration> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut found = BTreeSet::new();

        for (index, line) in lines.iter().enumerate() {
            let line_no = index + 1;
            if let Some(name) = capture(&self.macro_case, line) {
                found.insert(TestDeclaration {
                    line: line_no,
                    name,
                    style: DeclarationStyle::Macro,
                });
            }
            if self.annotation.is_match(line)
                && let Some(declaration) = self.annotated_signature(&lines, index)
            {
                found.insert(declaration);
            }
            if let Some(name) = capture(&self.function, line) {
                let start = index.saturating_sub(ATTRIBUTE_LOOKBACK);
                let attributed = lines[start..=index]
                    .iter()
                    .any(|prev| TEST_ATTRIBUTES.iter().any(|attr| prev.contains(attr)));
                if attributed {
                    found.insert(TestDeclaration {
                        line: line_no,
                        name,
                        style: DeclarationStyle::Attribute,
                    });
                }
            }
            if let Some(name) = capture(&self.python, line) {
                found.insert(TestDeclaration {
                    line: line_no,
                    name,
                    style: DeclarationStyle::Convention,
                });
            }
            if let Some(name) = capture(&self.c_function, line) {
                found.insert(TestDeclaration {
                    line: line_no,
                    name,
                    style: DeclarationStyle::CStyle,
                });
            }
        }
        found.into_iter().collect()
    }

    /// Finds the method signature following the annotation at `index`.
    fn annotated_signature(&self, lines: &[&str], index: usize) -> Option<TestDeclaration> {
        let end = (index + 1 + ANNOTATION_LOOKAHEAD).min(lines.len());
        lines[index + 1..end].iter().enumerate().find_map(|(offset, line)| {
            if line.is_empty() || line.starts_with('@') || line.starts_with('[') {
                return None;
            }
            capture(&self.signature, line).map(|name| TestDeclaration {
                line: index + offset + 2,
                name,
                style: DeclarationStyle::Annotation,
            })
        })
    }

    /// Maps each scenario to the line of the first declaration matching it.
    #[must_use]
    pub fn match_declarations(&self, text: &str, scenarios: &[&str]) -> BTreeMap<String, usize> {
        let mut lines = BTreeMap::new();
        for declaration in self.scan_declarations(text) {
            let target = scenarios.iter().find(|scenario| {
                !lines.contains_key(**scenario) && matches(&declaration.name, scenario)
            });
            if let Some(scenario) = target {
                lines.insert((*scenario).to_string(), declaration.line);
            }
        }
        lines
    }

    /// Reads `file` through the catalog cache and maps scenarios to lines.
    ///
    /// Unreadable files yield an empty map; deep links are best effort.
    pub fn extract_methods(
        &self,
        catalog: &mut FeatureCatalog,
        file: &Path,
        scenarios: &[&str],
    ) -> BTreeMap<String, usize> {
        match catalog.source_text(file) {
            Ok(text) => self.match_declarations(text, scenarios),
            Err(err) => {
                warn!(error = %err, "test source unavailable for deep links");
                BTreeMap::new()
            }
        }
    }
}

/// Returns the first capture group of `pattern` in `line`.
fn capture(pattern: &Regex, line: &str) -> Option<String> {
    pattern.captures(line).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, reason = "Test fixtures fail loudly on broken patterns.")]

    use super::*;

    fn matcher() -> ScenarioMatcher {
        match ScenarioMatcher::new() {
            Ok(matcher) => matcher,
            Err(err) => panic!("patterns compile: {err}"),
        }
    }

    #[test]
    fn put_scenario_matches_snake_case_test() {
        assert_eq!(normalize("PUT with AUTO_COMPRESS=TRUE"), "putwithautocompresstrue");
        assert!(matches("test_put_with_auto_compress_true", "PUT with AUTO_COMPRESS=TRUE"));
    }

    #[test]
    fn pascal_case_methods_match() {
        assert!(matches("ShouldConnectWithPat", "Should connect with PAT"));
        assert!(!matches("ShouldConnect", "Should connect with PAT"));
    }

    #[test]
    fn empty_method_names_never_match() {
        assert!(!matches("", "???"));
    }

    #[test]
    fn attribute_requires_recent_marker() {
        let text = "#[test]\nfn should_run() {}\n\n\n\n\n\n\nfn should_not() {}\n";
        let names: Vec<String> =
            matcher().scan_declarations(text).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["should_run".to_string()]);
    }

    #[test]
    fn attribute_on_the_same_line_counts() {
        let text = "#[test] fn select_one() {}\n";
        let lines = matcher().match_declarations(text, &["Select one"]);
        assert_eq!(lines.get("Select one"), Some(&1));
    }

    #[test]
    fn tokio_attribute_with_arguments_counts() {
        let text = "#[tokio::test(flavor = \"multi_thread\")]\nasync fn select_many() {}\n";
        let lines = matcher().match_declarations(text, &["Select many"]);
        assert_eq!(lines.get("Select many"), Some(&2));
    }

    #[test]
    fn attribute_on_the_previous_line_counts() {
        let text = "#[test]\nfn select_nothing() {}\n";
        let lines = matcher().match_declarations(text, &["Select nothing"]);
        assert_eq!(lines.get("Select nothing"), Some(&2));
    }

    #[test]
    fn normalization_keeps_ascii_only() {
        assert_eq!(normalize("Café naïve 2"), "cafnave2");
        assert!(matches("test_caf", "Café"));
    }

    #[test]
    fn annotation_signature_within_lookahead() {
        let text = "@Test\n@DisplayName(\"x\")\npublic void shouldFetchRows() {\n}";
        let declarations = matcher().scan_declarations(text);
        assert!(declarations.iter().any(|d| d.name == "shouldFetchRows"
            && d.line == 3
            && d.style == DeclarationStyle::Annotation));
    }

    #[test]
    fn first_declaration_wins() {
        let text = "def test_select_one():\n    pass\ndef test_select_one():\n    pass\n";
        let lines = matcher().match_declarations(text, &["Select one"]);
        assert_eq!(lines.get("Select one"), Some(&1));
    }
}

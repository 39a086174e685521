// crates/ud-coverage-core/tests/catalog_parsing.rs
// ============================================================================
// Module: Catalog Parsing Tests
// Description: Validate specification discovery and tag handling.
// Purpose: Ensure scenarios and tags survive parsing exactly as declared.
// Dependencies: ud-coverage-core, tempfile
// ============================================================================

//! Feature catalog integration tests.

#![allow(
    clippy::use_debug,
    clippy::panic_in_result_fn,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::path::Path;

use ud_coverage_core::FeatureCatalog;
use ud_coverage_core::FeatureScope;
use ud_coverage_core::Language;
use ud_coverage_core::LanguagePolicy;
use ud_coverage_core::TestLevel;
use ud_coverage_core::parse_feature;

mod common;

type TestResult = Result<(), String>;

const PRIVATE_KEY: &str = "\
@core_expected @python_expected
Feature: Private Key Authentication

  # comment lines keep pending tags
  @odbc_expected @jdbc_not_needed
  Scenario: Should authenticate using private file with password
    Given a private key file
    When I connect
    Then the session is open

  @auth_int
  Scenario: Should reject an invalid key
    Given an invalid key
    Then the connection fails
";

#[test]
fn feature_tags_and_scenario_tags_are_captured() -> TestResult {
    let policy = LanguagePolicy::default();
    let path = "tests/definitions/auth/private_key.feature";
    let feature = parse_feature(path, "auth", PRIVATE_KEY, &policy);
    if feature.title != "Private Key Authentication" {
        return Err(format!("unexpected title {}", feature.title));
    }
    if feature.tags != vec!["@core_expected".to_string(), "@python_expected".to_string()] {
        return Err(format!("unexpected feature tags {:?}", feature.tags));
    }
    let first = feature.scenarios.first().ok_or("missing first scenario")?;
    if first.tags != vec!["@odbc_expected".to_string(), "@jdbc_not_needed".to_string()] {
        return Err(format!("unexpected scenario tags {:?}", first.tags));
    }
    let expected: Vec<&str> = first.expected_languages.iter().map(Language::as_str).collect();
    if expected != vec!["core", "odbc", "python"] {
        return Err(format!("unexpected expected languages {expected:?}"));
    }
    if !first.is_excluded_for(&Language::new("jdbc")) {
        return Err("jdbc should be excluded".to_string());
    }
    Ok(())
}

#[test]
fn integration_tags_set_the_test_level() -> TestResult {
    let feature = parse_feature("a.feature", "other", PRIVATE_KEY, &LanguagePolicy::default());
    let levels: Vec<TestLevel> = feature.scenarios.iter().map(|s| s.test_level()).collect();
    if levels != vec![TestLevel::E2e, TestLevel::Integration] {
        return Err(format!("unexpected levels {levels:?}"));
    }
    Ok(())
}

#[test]
fn prose_lines_clear_pending_tags() -> TestResult {
    let text =
        "Feature: Query\n@odbc_expected\nSome prose describing things\nScenario: Select one\n";
    let feature = parse_feature("q.feature", "other", text, &LanguagePolicy::default());
    let scenario = feature.scenarios.first().ok_or("missing scenario")?;
    if !scenario.tags.is_empty() {
        return Err(format!("tags leaked onto scenario: {:?}", scenario.tags));
    }
    Ok(())
}

#[test]
fn duplicate_scenarios_keep_the_first() -> TestResult {
    let text = "Feature: Dup\n@a\nScenario: Same\n@b\nScenario: Same\nScenario Outline: Other\n";
    let feature = parse_feature("d.feature", "other", text, &LanguagePolicy::default());
    if feature.scenario_names() != vec!["Same", "Other"] {
        return Err(format!("unexpected scenarios {:?}", feature.scenario_names()));
    }
    let first = feature.scenarios.first().ok_or("missing scenario")?;
    if first.tags != vec!["@a".to_string()] {
        return Err(format!("first declaration not kept: {:?}", first.tags));
    }
    Ok(())
}

#[test]
fn empty_title_falls_back_to_file_name() -> TestResult {
    let feature = parse_feature(
        "tests/definitions/auth/jwt_auth.feature",
        "auth",
        "Feature:\nScenario: One\n",
        &LanguagePolicy::default(),
    );
    if feature.title != "JWT Authentication" {
        return Err(format!("unexpected fallback title {}", feature.title));
    }
    Ok(())
}

#[test]
fn catalog_walks_sorted_and_buckets_by_folder() -> TestResult {
    let dir = common::workspace()?;
    let root = dir.path();
    let select = "Feature: Select\nScenario: A\n";
    common::write(root, "tests/definitions/query/select.feature", select)?;
    let pat = "Feature: PAT\nScenario: B\nScenario: C\n";
    common::write(root, "tests/definitions/auth/pat.feature", pat)?;
    common::write(root, "tests/definitions/smoke.feature", "Feature: Smoke\nScenario: D\n")?;
    common::write(root, "tests/definitions/notes.txt", "Feature: Ignored\n")?;

    let mut catalog = FeatureCatalog::new(root, LanguagePolicy::default());
    let features = catalog.load(Path::new("tests/definitions"));
    let summary: Vec<(String, String, usize)> = features
        .iter()
        .map(|f| (f.path.clone(), f.folder.clone(), f.scenarios.len()))
        .collect();
    let expected = vec![
        ("tests/definitions/auth/pat.feature".to_string(), "auth".to_string(), 2),
        ("tests/definitions/query/select.feature".to_string(), "query".to_string(), 1),
        ("tests/definitions/smoke.feature".to_string(), "other".to_string(), 1),
    ];
    if summary != expected {
        return Err(format!("unexpected catalog {summary:?}"));
    }
    if catalog.cached_files() != 3 {
        return Err(format!("expected 3 cached files, got {}", catalog.cached_files()));
    }
    catalog.clear_cache();
    if catalog.cached_files() != 0 {
        return Err("cache not cleared".to_string());
    }
    Ok(())
}

#[test]
fn missing_directory_yields_no_features() -> TestResult {
    let dir = common::workspace()?;
    let mut catalog = FeatureCatalog::new(dir.path(), LanguagePolicy::default());
    if !catalog.load(Path::new("tests/definitions")).is_empty() {
        return Err("expected no features".to_string());
    }
    Ok(())
}

#[test]
fn scenario_counts_match_direct_parse() -> TestResult {
    let dir = common::workspace()?;
    let root = dir.path();
    common::write(root, "specs/a/one.feature", PRIVATE_KEY)?;
    let mut catalog = FeatureCatalog::new(root, LanguagePolicy::default());
    let features = catalog.load(Path::new("specs"));
    let loaded = features.first().ok_or("missing feature")?;
    let direct = parse_feature("specs/a/one.feature", "a", PRIVATE_KEY, &LanguagePolicy::default());
    if loaded != &direct {
        return Err("catalog feature differs from direct parse".to_string());
    }
    Ok(())
}

const DRIVER_TAGS: &str = "\
@python
Feature: Driver Tags

  @python
  Scenario: Bare tag
    Given x

  @python_e2e
  Scenario: End to end tag
    Given x

  @Python_INT
  Scenario: Integration tag
    Given x

  @python_e2e @python_expected
  Scenario: Still expected
    Given x

  @python_e2e @python_not_needed
  Scenario: Not needed
    Given x

  @odbc_e2e
  Scenario: Other driver
    Given x
";

#[test]
fn driver_tags_clear_the_todo_flag() -> TestResult {
    let policy = LanguagePolicy::default();
    let path = "tests/definitions/shared/tags.feature";
    let feature = parse_feature(path, "tags", DRIVER_TAGS, &policy);
    let python = Language::new("python");
    let todo: Vec<(&str, bool)> = feature
        .scenarios
        .iter()
        .map(|scenario| (scenario.name.as_str(), scenario.is_todo_for(&python)))
        .collect();
    let expected = vec![
        ("Bare tag", false),
        ("End to end tag", false),
        ("Integration tag", false),
        ("Still expected", true),
        ("Not needed", false),
        ("Other driver", true),
    ];
    if todo != expected {
        return Err(format!("unexpected todo flags {todo:?}"));
    }
    Ok(())
}

#[test]
fn definitions_subdirectory_decides_the_scope() -> TestResult {
    let policy = LanguagePolicy::default();
    let only = |name: &str| FeatureScope::LanguageOnly(Language::new(name));
    let cases = [
        ("tests/definitions/shared/auth/login.feature", FeatureScope::Shared),
        ("tests/definitions/auth/login.feature", FeatureScope::Shared),
        ("tests/definitions/odbc/handles.feature", only("odbc")),
        ("tests/definitions/core/arrow.feature", only("core")),
        ("tests/definitions/python/dbapi/cursor.feature", only("python")),
        ("tests/definitions/python.feature", FeatureScope::Shared),
        ("specs/odbc/handles.feature", FeatureScope::Shared),
    ];
    for (path, expected) in cases {
        let feature = parse_feature(path, "x", "Feature: X\n", &policy);
        if feature.scope != expected {
            return Err(format!("{path}: unexpected scope {:?}", feature.scope));
        }
    }
    Ok(())
}

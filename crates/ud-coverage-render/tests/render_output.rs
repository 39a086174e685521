// crates/ud-coverage-render/tests/render_output.rs
// ============================================================================
// Module: Renderer Output Tests
// Description: Render hand-built matrices as text tables and HTML.
// Purpose: Pin table layout, HTML structure, escaping, and determinism.
// Dependencies: ud-coverage-render, ud-coverage-core
// ============================================================================

//! Report renderer integration tests.

#![allow(
    clippy::use_debug,
    clippy::panic_in_result_fn,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use ud_coverage_core::CoverageMatrix;
use ud_coverage_core::CrossReferenceKind;
use ud_coverage_core::CrossReferenceLink;
use ud_coverage_core::CrossReferenceRecord;
use ud_coverage_core::Feature;
use ud_coverage_core::FeatureCoverage;
use ud_coverage_core::FeatureLanguage;
use ud_coverage_core::FeatureScope;
use ud_coverage_core::Implementation;
use ud_coverage_core::Language;
use ud_coverage_core::LanguageCoverage;
use ud_coverage_core::LanguageResult;
use ud_coverage_core::MissingImplementation;
use ud_coverage_core::Scenario;
use ud_coverage_core::ScenarioStatus;
use ud_coverage_render::RenderOptions;
use ud_coverage_render::ReportFormat;
use ud_coverage_render::render_html;
use ud_coverage_render::render_table;

type TestResult = Result<(), String>;

const AUTH_SCENARIO: &str = "Should authenticate using private file with password";

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a scenario; `drivers` are the languages its driver tags name.
fn scenario(name: &str, tags: &[&str], drivers: &[&str], excluded: &[&str]) -> Scenario {
    Scenario {
        name: name.to_string(),
        tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
        expected_languages: BTreeSet::new(),
        excluded_languages: excluded.iter().map(|lang| Language::new(lang)).collect(),
        driver_languages: drivers.iter().map(|lang| Language::new(lang)).collect(),
    }
}

fn feature(path: &str, title: &str, folder: &str, scenarios: Vec<Scenario>) -> Feature {
    Feature {
        path: path.to_string(),
        title: title.to_string(),
        tags: Vec::new(),
        folder: folder.to_string(),
        scope: FeatureScope::Shared,
        scenarios,
    }
}

fn present(
    language: &str,
    implemented: bool,
    source_path: Option<&str>,
    statuses: &[(&str, ScenarioStatus)],
    lines: &[(&str, usize)],
) -> (Language, FeatureLanguage) {
    let language = Language::new(language);
    let result = LanguageResult {
        language: language.clone(),
        implemented,
        source_path: source_path.map(str::to_string),
        scenario_status: statuses
            .iter()
            .map(|(name, status)| ((*name).to_string(), *status))
            .collect(),
        source_lines: lines.iter().map(|(name, line)| ((*name).to_string(), *line)).collect(),
    };
    (language, FeatureLanguage::Present(result))
}

fn breaking_change() -> CrossReferenceRecord {
    let mut implementations = BTreeMap::new();
    implementations.insert(
        Language::new("python"),
        vec![Implementation {
            test_method: "test_should_authenticate_using_private_file_with_password".to_string(),
            test_file: "python/tests/e2e/test_auth.py".to_string(),
            test_line: Some(21),
            old_behavior: None,
            new_behavior: None,
        }],
    );
    CrossReferenceRecord {
        kind: CrossReferenceKind::BreakingChange,
        id: "BC#7".to_string(),
        description: "Private key <password> handling changed".to_string(),
        implementations,
    }
}

fn matrix() -> CoverageMatrix {
    let auth = feature(
        "tests/definitions/auth/private_key.feature",
        "Private Key Authentication",
        "auth",
        vec![scenario(AUTH_SCENARIO, &["@core_e2e", "@python_e2e"], &["core", "python"], &[])],
    );
    let select = feature(
        "tests/definitions/query/select.feature",
        "Select <rows>",
        "query",
        vec![
            scenario("Select one", &["@core_int"], &["core"], &[]),
            scenario("Select legacy", &[], &[], &["python"]),
        ],
    );

    let link = CrossReferenceLink {
        kind: CrossReferenceKind::BreakingChange,
        id: "BC#7".to_string(),
        anchor: breaking_change().anchor(),
    };
    let mut auth_links = BTreeMap::new();
    auth_links
        .insert(AUTH_SCENARIO.to_string(), BTreeMap::from([(Language::new("python"), vec![link])]));

    let auth_row = FeatureCoverage {
        feature: auth,
        languages: BTreeMap::from([
            present(
                "core",
                true,
                Some("core/tests/auth.rs"),
                &[(AUTH_SCENARIO, ScenarioStatus::Pass)],
                &[(AUTH_SCENARIO, 4)],
            ),
            present(
                "python",
                false,
                Some("python/tests/e2e/test_auth.py"),
                &[(AUTH_SCENARIO, ScenarioStatus::Fail)],
                &[],
            ),
        ]),
        cross_references: auth_links,
    };
    let select_row = FeatureCoverage {
        feature: select,
        languages: BTreeMap::from([
            present(
                "core",
                true,
                None,
                &[("Select one", ScenarioStatus::Pass), ("Select legacy", ScenarioStatus::Pass)],
                &[],
            ),
            (Language::new("python"), FeatureLanguage::NotPresent),
        ]),
        cross_references: BTreeMap::new(),
    };

    let mut cross_references = BTreeMap::new();
    cross_references.insert(CrossReferenceKind::BreakingChange, vec![breaking_change()]);
    cross_references.insert(CrossReferenceKind::BehaviorDifference, Vec::new());

    CoverageMatrix {
        languages: vec![Language::new("core"), Language::new("python")],
        features: vec![auth_row, select_row],
        coverage: vec![
            LanguageCoverage::new(Language::new("core"), 3, 3),
            LanguageCoverage::new(Language::new("python"), 0, 3),
        ],
        missing: vec![
            MissingImplementation {
                feature_path: "tests/definitions/auth/private_key.feature".to_string(),
                feature_title: "Private Key Authentication".to_string(),
                language: Language::new("python"),
            },
            MissingImplementation {
                feature_path: "tests/definitions/query/select.feature".to_string(),
                feature_title: "Select <rows>".to_string(),
                language: Language::new("python"),
            },
        ],
        cross_references,
    }
}

fn empty_matrix() -> CoverageMatrix {
    CoverageMatrix {
        languages: Vec::new(),
        features: Vec::new(),
        coverage: Vec::new(),
        missing: Vec::new(),
        cross_references: BTreeMap::new(),
    }
}

fn options() -> RenderOptions {
    RenderOptions {
        title: "Coverage & Gaps".to_string(),
        source_link_base: Some("https://example.com/blob/main/".to_string()),
    }
}

// ============================================================================
// SECTION: Text Table
// ============================================================================

#[test]
fn table_groups_features_under_padded_folder_headers() -> TestResult {
    let table = render_table(&matrix());
    let lines: Vec<&str> = table.lines().collect();
    let expected = vec![
        format!("{:<28} | {:<8} | {:<8}", "Feature", "Core", "Python"),
        format!("{}-|-{}-|-{}", "-".repeat(28), "-".repeat(8), "-".repeat(8)),
        format!("=== AUTH {}", "=".repeat(42)),
        format!("  {:<26} | {:<8} | {:<8}", "Private Key Authentication", "PASS", "FAIL"),
        format!("=== QUERY {}", "=".repeat(41)),
        format!("  {:<26} | {:<8} | {:<8}", "Select <rows>", "PASS", "N/A"),
    ];
    if lines != expected {
        return Err(format!("unexpected table:\n{table}"));
    }
    if !table.ends_with('\n') {
        return Err("table must end with a newline".to_string());
    }
    Ok(())
}

#[test]
fn empty_matrices_render_degraded_reports() -> TestResult {
    let empty = empty_matrix();
    if render_table(&empty) != "No features found.\n" {
        return Err(format!("unexpected table {:?}", render_table(&empty)));
    }
    let html = render_html(&empty, &RenderOptions::default());
    if !html.contains("<h1>No features found</h1>") || html.contains("data-tab=\"") {
        return Err("degraded html should only carry the notice".to_string());
    }
    Ok(())
}

// ============================================================================
// SECTION: HTML
// ============================================================================

#[test]
fn html_has_all_tabs_and_summary_cards() -> TestResult {
    let html = render_html(&matrix(), &options());
    for needle in [
        "<title>Coverage &amp; Gaps</title>",
        "<button class=\"tab-button active\" data-tab=\"overview-tab\">📊 Shared Tests</button>",
        "data-tab=\"language-tab\">🔒 Language-Specific (0)</button>",
        "<p>No language-specific tests found.</p>",
        "data-tab=\"bc-tab\">📋 Breaking Changes (1)</button>",
        "data-tab=\"bd-tab\">📋 Behavior Differences (0)</button>",
        "data-tab=\"details-tab\"",
        "data-tab=\"missing-tab\">⚠️ Missing Implementations (2)</button>",
        "<div id=\"overview-tab\" class=\"tab-content active\">",
        "<div class=\"value high\">100.0%</div>",
        "<div class=\"value low\">0.0%</div>",
        "<p>No behavior differences recorded.</p>",
        "<h3>Python (2)</h3>",
    ] {
        if !html.contains(needle) {
            return Err(format!("missing {needle}"));
        }
    }
    if html.contains("http://") || html.contains("<link ") || html.contains("src=\"") {
        return Err("document must be self-contained".to_string());
    }
    Ok(())
}

#[test]
fn cross_reference_ids_link_to_their_blocks() -> TestResult {
    let html = render_html(&matrix(), &options());
    let anchor = breaking_change().anchor();
    if !html.contains(&format!("<details class=\"xref\" id=\"{anchor}\">")) {
        return Err(format!("missing record block {anchor}"));
    }
    let superscript = format!(
        "<sup class=\"xref-links\">\
         <a href=\"#{anchor}\" title=\"Breaking Change: BC#7\">7</a></sup>"
    );
    if html.matches(&superscript).count() != 2 {
        return Err("expected superscripts in overview and breakdown".to_string());
    }
    if !html.contains("Private key &lt;password&gt; handling changed") {
        return Err("record description not escaped".to_string());
    }
    Ok(())
}

#[test]
fn breakdown_cells_deep_link_and_mark_exclusions() -> TestResult {
    let html = render_html(&matrix(), &options());
    let passing = "<a href=\"https://example.com/blob/main/core/tests/auth.rs#L4\" \
                   title=\"core/tests/auth.rs\">✅</a>";
    if !html.contains(passing) {
        return Err("missing deep link with line".to_string());
    }
    let failing = "<a href=\"https://example.com/blob/main/python/tests/e2e/test_auth.py\" \
                   title=\"python/tests/e2e/test_auth.py\">❌</a>";
    if !html.contains(failing) {
        return Err("missing file link for failing scenario".to_string());
    }
    let excluded = "Select legacy<span class=\"test-level-e2e\">E2E</span></td>\
                    <td class=\"status\">✅</td>\
                    <td class=\"status\">\
                    <span class=\"status-excluded\" title=\"not needed\">-</span>";
    if !html.contains(excluded) {
        return Err("excluded scenario not rendered as excluded".to_string());
    }
    if !html.contains("Select one<span class=\"test-level-integration\">Integration</span>") {
        return Err("integration label missing".to_string());
    }
    if html.contains("Select <rows>") || !html.contains("Select &lt;rows&gt;") {
        return Err("feature title not escaped".to_string());
    }
    Ok(())
}

#[test]
fn fully_implemented_matrix_reports_no_gaps() -> TestResult {
    let mut matrix = matrix();
    matrix.missing.clear();
    let html = render_html(&matrix, &RenderOptions::default());
    if !html.contains("<p>No missing implementations found! ✅</p>") {
        return Err("missing empty-gap notice".to_string());
    }
    if !html.contains("<a href=\"core/tests/auth.rs#L4\"") {
        return Err("links without a base should be workspace relative".to_string());
    }
    Ok(())
}

#[test]
fn rendering_is_deterministic() -> TestResult {
    let matrix = matrix();
    for format in [ReportFormat::Table, ReportFormat::Html] {
        let first = format.render(&matrix, &options());
        let second = format.render(&matrix.clone(), &options());
        if first != second {
            return Err(format!("{format} output differs between runs"));
        }
    }
    Ok(())
}

#[test]
fn scenarios_without_a_driver_tag_are_todo() -> TestResult {
    let mut matrix = matrix();
    let auth = matrix.features.first_mut().ok_or("missing auth feature")?;
    for scenario in &mut auth.feature.scenarios {
        scenario.tags = vec!["@core_e2e".to_string()];
        scenario.driver_languages = BTreeSet::from([Language::new("core")]);
    }
    let html = render_html(&matrix, &options());
    let auth_row = format!("{AUTH_SCENARIO}<span class=\"test-level-e2e\">E2E</span></td>");
    let todo_row = format!(
        "{auth_row}<td class=\"status\">\
         <a href=\"https://example.com/blob/main/core/tests/auth.rs#L4\" \
         title=\"core/tests/auth.rs\">✅</a></td>\
         <td class=\"status\"><span class=\"status-todo\">TODO</span></td>"
    );
    if !html.contains(&todo_row) {
        return Err("failing untagged scenario should be TODO".to_string());
    }
    let select_one = "Select one<span class=\"test-level-integration\">Integration</span></td>\
                      <td class=\"status\">✅</td>\
                      <td class=\"status\"><span class=\"status-todo\">TODO</span></td>";
    if !html.contains(select_one) {
        return Err("untagged scenario without a result should be TODO".to_string());
    }
    Ok(())
}

#[test]
fn language_only_features_get_their_own_tab() -> TestResult {
    let mut matrix = matrix();
    let mut handles = feature(
        "tests/definitions/odbc/handles.feature",
        "Handles",
        "odbc",
        vec![
            scenario("Alloc", &["@odbc_e2e"], &["odbc"], &[]),
            scenario("Free", &[], &[], &[]),
        ],
    );
    handles.scope = FeatureScope::LanguageOnly(Language::new("odbc"));
    matrix.features.push(FeatureCoverage {
        feature: handles,
        languages: BTreeMap::from([
            (Language::new("core"), FeatureLanguage::NotPresent),
            (Language::new("python"), FeatureLanguage::NotPresent),
        ]),
        cross_references: BTreeMap::new(),
    });
    let html = render_html(&matrix, &options());
    for needle in [
        "data-tab=\"language-tab\">🔒 Language-Specific (1)</button>",
        "<h2>🔒 Language-Specific Tests</h2>",
        "<h3>🔒 ODBC (1 features)</h3>",
        "❌ <a href=\"#feature-tests-definitions-odbc-handles-feature\">Handles</a> \
         <span class=\"path\">(2 scenarios)</span>",
        "<li>Alloc <span class=\"tags\">@odbc_e2e</span></li>",
        "<li>Free</li>",
        "<details class=\"feature\" id=\"feature-tests-definitions-odbc-handles-feature\">",
    ] {
        if !html.contains(needle) {
            return Err(format!("missing {needle}"));
        }
    }
    if html.contains("<tr><td><a href=\"#feature-tests-definitions-odbc-handles-feature\">") {
        return Err("language-only feature leaked into the shared table".to_string());
    }
    Ok(())
}

#[test]
fn implementations_without_a_line_link_to_the_file() -> TestResult {
    let mut matrix = matrix();
    let records = matrix
        .cross_references
        .get_mut(&CrossReferenceKind::BreakingChange)
        .ok_or("missing breaking changes")?;
    for record in records.iter_mut() {
        for implementation in record.implementations.values_mut().flatten() {
            implementation.test_line = None;
        }
    }
    let html = render_html(&matrix, &options());
    let row = "<a href=\"https://example.com/blob/main/python/tests/e2e/test_auth.py\">\
               <code>test_should_authenticate_using_private_file_with_password</code></a> \
               <span class=\"path\">python/tests/e2e/test_auth.py</span>";
    if !html.contains(row) || html.contains("#L0") {
        return Err("implementation without a line should link to the bare file".to_string());
    }
    Ok(())
}

// crates/ud-coverage-render/src/html.rs
// ============================================================================
// Module: HTML Renderer
// Description: Self-contained tabbed HTML coverage report.
// Purpose: Browsable overview, cross references, breakdown, and gap list.
// Dependencies: ud-coverage-core
// ============================================================================

//! ## Overview
//! The document has one tab per view:
//! - Shared Tests: folder-grouped table of shared features plus per-language
//!   summary cards.
//! - Language-Specific: features living under a single-language definitions
//!   directory, grouped by owning language with their scenarios and tags.
//! - Breaking Changes and Behavior Differences: one expandable block per
//!   record with its per-language implementation locations.
//! - Detailed Breakdown: per feature, per scenario, per language glyph with a
//!   deep link into the implementing test file. Every feature is listed.
//! - Missing Implementations: (feature, language) pairs without a test.
//!
//! Styles and the tab script are embedded with `include_str!`, so the output
//! needs no network access. Cross-reference ids appear as superscript links
//! that jump to the record block in its tab.
//!
//! ## Invariants
//! - No timestamps or other run-dependent text are emitted.
//! - All catalog and validator text is escaped with [`escape_html`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write;

use ud_coverage_core::CoverageMatrix;
use ud_coverage_core::CrossReferenceKind;
use ud_coverage_core::CrossReferenceLink;
use ud_coverage_core::CrossReferenceRecord;
use ud_coverage_core::FeatureCoverage;
use ud_coverage_core::FeatureLanguage;
use ud_coverage_core::Implementation;
use ud_coverage_core::Language;
use ud_coverage_core::Scenario;
use ud_coverage_core::ScenarioStatus;
use ud_coverage_core::SourceLocation;

use crate::escape::deep_link;
use crate::escape::escape_html;
use crate::format::RenderOptions;
use crate::table::folder_title;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Embedded stylesheet.
const STYLE: &str = include_str!("../assets/report.css");
/// Embedded tab and link script.
const SCRIPT: &str = include_str!("../assets/report.js");
/// Body of the degraded document.
pub const NO_FEATURES: &str = "<h1>No features found</h1>";
/// Missing tab text when every pair is implemented.
pub const NO_MISSING: &str = "No missing implementations found! ✅";
/// Language-specific tab text when every feature is shared.
pub const NO_LANGUAGE_SPECIFIC: &str = "No language-specific tests found.";
/// Overview tab id.
const OVERVIEW_TAB: &str = "overview-tab";
/// Language-specific tab id.
const LANGUAGE_TAB: &str = "language-tab";
/// Detailed breakdown tab id.
const DETAILS_TAB: &str = "details-tab";
/// Missing implementations tab id.
const MISSING_TAB: &str = "missing-tab";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the HTML report for `matrix`.
#[must_use]
pub fn render_html(matrix: &CoverageMatrix, options: &RenderOptions) -> String {
    let title = escape_html(&options.title);
    if matrix.is_empty() {
        return document(&title, NO_FEATURES);
    }
    let base = options.source_link_base.as_deref();

    let language_only = matrix.language_only_features();
    let language_only_count: usize = language_only.values().map(Vec::len).sum();

    let mut tabs: Vec<(String, String)> = vec![
        (OVERVIEW_TAB.to_string(), "📊 Shared Tests".to_string()),
        (LANGUAGE_TAB.to_string(), format!("🔒 Language-Specific ({language_only_count})")),
    ];
    for kind in CrossReferenceKind::ALL {
        let count = matrix.cross_references.get(&kind).map_or(0, Vec::len);
        tabs.push((kind_tab(kind), format!("📋 {} ({count})", kind.heading())));
    }
    tabs.push((DETAILS_TAB.to_string(), "🔍 Detailed Breakdown".to_string()));
    tabs.push((
        MISSING_TAB.to_string(),
        format!("⚠️ Missing Implementations ({})", matrix.missing.len()),
    ));

    let mut body = String::new();
    let _ = writeln!(body, "<h1>{title}</h1>");
    body.push_str("<div class=\"tabs\">\n<div class=\"tab-buttons\">\n");
    for (index, (id, label)) in tabs.iter().enumerate() {
        let active = if index == 0 { " active" } else { "" };
        let _ = writeln!(
            body,
            "<button class=\"tab-button{active}\" data-tab=\"{id}\">{label}</button>"
        );
    }
    body.push_str("</div>\n");

    open_tab(&mut body, OVERVIEW_TAB, true);
    overview(&mut body, matrix);
    body.push_str("</div>\n");
    open_tab(&mut body, LANGUAGE_TAB, false);
    language_specific(&mut body, matrix, &language_only);
    body.push_str("</div>\n");
    for kind in CrossReferenceKind::ALL {
        open_tab(&mut body, &kind_tab(kind), false);
        let records = matrix.cross_references.get(&kind).map(Vec::as_slice).unwrap_or_default();
        cross_reference_tab(&mut body, kind, records, base);
        body.push_str("</div>\n");
    }
    open_tab(&mut body, DETAILS_TAB, false);
    details(&mut body, matrix, base);
    body.push_str("</div>\n");
    open_tab(&mut body, MISSING_TAB, false);
    missing(&mut body, matrix);
    body.push_str("</div>\n</div>\n");
    body.push_str("<footer>Generated by ud-coverage</footer>\n");
    document(&title, &body)
}

/// Wraps `body` in the document shell.
fn document(title: &str, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + STYLE.len() + SCRIPT.len() + 256);
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>{title}</title>");
    out.push_str("<style>\n");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("<script>\n");
    out.push_str(SCRIPT);
    out.push_str("</script>\n</body>\n</html>\n");
    out
}

/// Opens a tab panel.
fn open_tab(out: &mut String, id: &str, active: bool) {
    let class = if active { "tab-content active" } else { "tab-content" };
    let _ = writeln!(out, "<div id=\"{id}\" class=\"{class}\">");
}

/// Tab id of a cross-reference kind.
fn kind_tab(kind: CrossReferenceKind) -> String {
    format!("{}-tab", kind.slug())
}

// ============================================================================
// SECTION: Overview
// ============================================================================

/// Shared feature table and summary cards.
fn overview(out: &mut String, matrix: &CoverageMatrix) {
    out.push_str("<h2>Coverage by Feature</h2>\n");
    out.push_str(
        "<div class=\"legend\"><span><span class=\"status-pass\">✓</span> implemented</span>\
         <span><span class=\"status-fail\">✗</span> incomplete</span>\
         <span><span class=\"status-na\">-</span> no result</span>\
         <span><sup class=\"xref-links\">1</sup> cross reference</span></div>\n",
    );
    out.push_str("<table class=\"coverage-table\">\n<thead><tr><th>Feature</th>");
    language_headers(out, &matrix.languages);
    out.push_str("</tr></thead>\n<tbody>\n");
    let columns = matrix.languages.len() + 1;
    for (folder, features) in matrix.folders() {
        let features: Vec<&FeatureCoverage> =
            features.into_iter().filter(|coverage| coverage.feature.scope.is_shared()).collect();
        if features.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "<tr class=\"folder-row\"><td colspan=\"{columns}\">{}</td></tr>",
            escape_html(&folder_title(folder).to_uppercase())
        );
        for coverage in features {
            let _ = write!(
                out,
                "<tr><td><a href=\"#{}\">{}</a></td>",
                feature_anchor(&coverage.feature.path),
                escape_html(&coverage.feature.title)
            );
            for language in &matrix.languages {
                let glyph = match coverage.languages.get(language) {
                    Some(FeatureLanguage::Present(result)) if result.implemented => {
                        "<span class=\"status-pass\">✓</span>"
                    }
                    Some(FeatureLanguage::Present(_)) => "<span class=\"status-fail\">✗</span>",
                    Some(FeatureLanguage::NotPresent) | None => {
                        "<span class=\"status-na\">-</span>"
                    }
                };
                let links: BTreeSet<&CrossReferenceLink> = coverage
                    .feature
                    .scenarios
                    .iter()
                    .flat_map(|scenario| coverage.links(&scenario.name, language))
                    .collect();
                let _ = write!(out, "<td class=\"status\">{glyph}");
                superscripts(out, links.into_iter());
                out.push_str("</td>");
            }
            out.push_str("</tr>\n");
        }
    }
    out.push_str("</tbody>\n</table>\n");

    out.push_str("<h2>Coverage by Language</h2>\n<div class=\"summary-cards\">\n");
    for coverage in &matrix.coverage {
        let value = if coverage.total_scenarios == 0 {
            "N/A".to_string()
        } else {
            format!("{:.1}%", coverage.percentage)
        };
        let _ = writeln!(
            out,
            "<div class=\"summary-card\"><h3>{}</h3><div class=\"value {}\">{value}</div>\
             <div class=\"detail\">{} / {} scenarios</div></div>",
            escape_html(&coverage.language.display_name()),
            coverage.class.css_class(),
            coverage.implemented_scenarios,
            coverage.total_scenarios
        );
    }
    out.push_str("</div>\n");
}

// ============================================================================
// SECTION: Language-Specific
// ============================================================================

/// Language-only features per owning language, in axis order first.
fn language_specific(
    out: &mut String,
    matrix: &CoverageMatrix,
    grouped: &BTreeMap<&Language, Vec<&FeatureCoverage>>,
) {
    out.push_str("<h2>🔒 Language-Specific Tests</h2>\n");
    if grouped.is_empty() {
        let _ = writeln!(out, "<p>{NO_LANGUAGE_SPECIFIC}</p>");
        return;
    }
    let owners = matrix
        .languages
        .iter()
        .filter(|language| grouped.contains_key(language))
        .chain(grouped.keys().copied().filter(|language| !matrix.languages.contains(language)));
    for language in owners {
        let features = grouped.get(language).map(Vec::as_slice).unwrap_or_default();
        let _ = writeln!(
            out,
            "<h3>🔒 {} ({} features)</h3>",
            escape_html(&language.display_name().to_uppercase()),
            features.len()
        );
        for coverage in features {
            let icon = if coverage.result(language).is_some_and(|result| result.implemented) {
                "✅"
            } else {
                "❌"
            };
            let _ = writeln!(
                out,
                "<details class=\"feature\"><summary>{icon} <a href=\"#{}\">{}</a> \
                 <span class=\"path\">({} scenarios)</span></summary>\n\
                 <ul class=\"scenario-list\">",
                feature_anchor(&coverage.feature.path),
                escape_html(&coverage.feature.title),
                coverage.feature.scenarios.len()
            );
            for scenario in &coverage.feature.scenarios {
                let _ = write!(out, "<li>{}", escape_html(&scenario.name));
                if !scenario.tags.is_empty() {
                    let _ = write!(
                        out,
                        " <span class=\"tags\">{}</span>",
                        escape_html(&scenario.tags.join(" "))
                    );
                }
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n</details>\n");
        }
    }
}

// ============================================================================
// SECTION: Cross References
// ============================================================================

/// One block per record of `kind`.
fn cross_reference_tab(
    out: &mut String,
    kind: CrossReferenceKind,
    records: &[CrossReferenceRecord],
    base: Option<&str>,
) {
    let _ = writeln!(out, "<h2>{}</h2>", kind.heading());
    if records.is_empty() {
        let _ = writeln!(out, "<p>No {} recorded.</p>", kind.heading().to_lowercase());
        return;
    }
    for record in records {
        let _ = writeln!(
            out,
            "<details class=\"xref\" id=\"{}\">\
             <summary><span class=\"xref-id\">{}</span>{}</summary>",
            record.anchor(),
            escape_html(&record.id),
            escape_html(&record.description)
        );
        if record.implementations.values().all(Vec::is_empty) {
            out.push_str("<p>No implementations recorded.</p>\n</details>\n");
            continue;
        }
        out.push_str(
            "<table>\n<thead><tr><th>Language</th><th>Test</th><th>New behavior</th>\
             <th>Old behavior</th></tr></thead>\n<tbody>\n",
        );
        for (language, implementations) in &record.implementations {
            for implementation in implementations {
                implementation_row(out, language, implementation, base);
            }
        }
        out.push_str("</tbody>\n</table>\n</details>\n");
    }
}

/// Table row for one implementation of a record.
fn implementation_row(
    out: &mut String,
    language: &Language,
    implementation: &Implementation,
    base: Option<&str>,
) {
    let href = deep_link(base, &implementation.test_file, implementation.test_line);
    let position = match implementation.test_line {
        Some(line) => format!("{}:{line}", implementation.test_file),
        None => implementation.test_file.clone(),
    };
    let _ = write!(
        out,
        "<tr><td>{}</td><td><a href=\"{}\"><code>{}</code></a> \
         <span class=\"path\">{}</span></td><td>",
        escape_html(&language.display_name()),
        escape_html(&href),
        escape_html(&implementation.test_method),
        escape_html(&position)
    );
    location(out, implementation.new_behavior.as_ref(), base);
    out.push_str("</td><td>");
    location(out, implementation.old_behavior.as_ref(), base);
    out.push_str("</td></tr>\n");
}

/// Linked `file:line`, or `-` when absent.
fn location(out: &mut String, location: Option<&SourceLocation>, base: Option<&str>) {
    match location {
        Some(location) => {
            let href = deep_link(base, &location.file, Some(location.line));
            let _ = write!(
                out,
                "<a class=\"path\" href=\"{}\">{}:{}</a>",
                escape_html(&href),
                escape_html(&location.file),
                location.line
            );
        }
        None => out.push_str("<span class=\"status-na\">-</span>"),
    }
}

// ============================================================================
// SECTION: Detailed Breakdown
// ============================================================================

/// Per-scenario status grid for every feature.
fn details(out: &mut String, matrix: &CoverageMatrix, base: Option<&str>) {
    out.push_str("<h2>Detailed Breakdown</h2>\n");
    out.push_str(
        "<div class=\"legend\"><span>✅ passing</span><span>❌ failing</span>\
         <span><span class=\"status-todo\">TODO</span> expected but absent</span>\
         <span><span class=\"status-na\">N/A</span> no result</span>\
         <span><span class=\"status-excluded\">-</span> not needed</span></div>\n",
    );
    for (folder, features) in matrix.folders() {
        let _ = writeln!(out, "<h3>{}</h3>", escape_html(&folder_title(folder)));
        for coverage in features {
            let _ = writeln!(
                out,
                "<details class=\"feature\" id=\"{}\">\
                 <summary>{} <span class=\"path\">{}</span></summary>",
                feature_anchor(&coverage.feature.path),
                escape_html(&coverage.feature.title),
                escape_html(&coverage.feature.path)
            );
            if coverage.feature.scenarios.is_empty() {
                out.push_str("<p>No scenarios.</p>\n</details>\n");
                continue;
            }
            out.push_str("<table>\n<thead><tr><th>Scenario</th>");
            language_headers(out, &matrix.languages);
            out.push_str("</tr></thead>\n<tbody>\n");
            for scenario in &coverage.feature.scenarios {
                scenario_row(out, &matrix.languages, coverage, scenario, base);
            }
            out.push_str("</tbody>\n</table>\n</details>\n");
        }
    }
}

/// Row of one scenario across the language axis.
fn scenario_row(
    out: &mut String,
    languages: &[Language],
    coverage: &FeatureCoverage,
    scenario: &Scenario,
    base: Option<&str>,
) {
    let level = scenario.test_level();
    let _ = write!(
        out,
        "<tr><td>{}<span class=\"test-level-{}\">{}</span></td>",
        escape_html(&scenario.name),
        level.label().to_ascii_lowercase(),
        level.label()
    );
    for language in languages {
        out.push_str("<td class=\"status\">");
        scenario_cell(out, language, coverage, scenario, base);
        out.push_str("</td>");
    }
    out.push_str("</tr>\n");
}

/// Glyph, deep link, and superscripts of one (scenario, language) cell.
///
/// A passing scenario always shows its result. Anything else shows `TODO`
/// while the scenario is still to do for the language.
fn scenario_cell(
    out: &mut String,
    language: &Language,
    coverage: &FeatureCoverage,
    scenario: &Scenario,
    base: Option<&str>,
) {
    if scenario.is_excluded_for(language) {
        out.push_str("<span class=\"status-excluded\" title=\"not needed\">-</span>");
        return;
    }
    let status = coverage
        .result(language)
        .map(|result| (result, result.scenario_status.get(&scenario.name).copied()));
    let result = match status {
        Some((result, Some(ScenarioStatus::Pass))) => result,
        _ if scenario.is_todo_for(language) => {
            out.push_str("<span class=\"status-todo\">TODO</span>");
            return;
        }
        Some((result, _)) => result,
        None => {
            out.push_str("<span class=\"status-na\">N/A</span>");
            return;
        }
    };
    let glyph = match result.scenario_status.get(&scenario.name) {
        Some(ScenarioStatus::Pass) => "✅",
        Some(ScenarioStatus::Fail) | None => "❌",
    };
    match result.source_path.as_deref() {
        Some(path) => {
            let href = deep_link(base, path, result.source_lines.get(&scenario.name).copied());
            let _ = write!(
                out,
                "<a href=\"{}\" title=\"{}\">{glyph}</a>",
                escape_html(&href),
                escape_html(path)
            );
        }
        None => out.push_str(glyph),
    }
    superscripts(out, coverage.links(&scenario.name, language).iter());
}

// ============================================================================
// SECTION: Missing Implementations
// ============================================================================

/// Missing pairs grouped by language in axis order.
fn missing(out: &mut String, matrix: &CoverageMatrix) {
    out.push_str("<h2>Missing Implementations</h2>\n");
    if matrix.missing.is_empty() {
        let _ = writeln!(out, "<p>{NO_MISSING}</p>");
        return;
    }
    for language in &matrix.languages {
        let entries: Vec<_> =
            matrix.missing.iter().filter(|entry| &entry.language == language).collect();
        if entries.is_empty() {
            continue;
        }
        let _ = writeln!(
            out,
            "<h3>{} ({})</h3>\n<ul class=\"missing-list\">",
            escape_html(&language.display_name()),
            entries.len()
        );
        for entry in entries {
            let _ = writeln!(
                out,
                "<li><a href=\"#{}\">{}</a> <span class=\"path\">{}</span></li>",
                feature_anchor(&entry.feature_path),
                escape_html(&entry.feature_title),
                escape_html(&entry.feature_path)
            );
        }
        out.push_str("</ul>\n");
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// `<th>` cells for the language axis.
fn language_headers(out: &mut String, languages: &[Language]) {
    for language in languages {
        let _ = write!(out, "<th>{}</th>", escape_html(&language.display_name()));
    }
}

/// Superscript links to cross-reference records, comma separated.
fn superscripts<'a>(out: &mut String, links: impl Iterator<Item = &'a CrossReferenceLink>) {
    let rendered: Vec<String> = links
        .map(|link| {
            let short = link.id.rsplit_once('#').map_or(link.id.as_str(), |(_, number)| number);
            format!(
                "<a href=\"#{}\" title=\"{}: {}\">{}</a>",
                link.anchor,
                link.kind.label(),
                escape_html(&link.id),
                escape_html(short)
            )
        })
        .collect();
    if !rendered.is_empty() {
        let _ = write!(out, "<sup class=\"xref-links\">{}</sup>", rendered.join(","));
    }
}

/// Element id of a feature's breakdown block.
fn feature_anchor(path: &str) -> String {
    let slug: String = path
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("feature-{slug}")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_anchors_are_attribute_safe() {
        assert_eq!(
            feature_anchor("tests/definitions/auth/Key Pair.feature"),
            "feature-tests-definitions-auth-key-pair-feature"
        );
    }

    #[test]
    fn degraded_document_is_still_complete() {
        let html = document("T", NO_FEATURES);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>No features found</h1>\n<script>"));
        assert!(html.ends_with("</html>\n"));
    }
}

// crates/ud-coverage-render/src/escape.rs
// ============================================================================
// Module: HTML Escaping
// Description: Text escaping and deep-link construction for HTML output.
// Purpose: Keep untrusted catalog and validator text inert in the report.
// Dependencies: none
// ============================================================================

//! Escaping helpers shared by the HTML renderer.

// ============================================================================
// SECTION: Escaping
// ============================================================================

/// Escapes the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Builds the (unescaped) deep link to `path` at `line`.
///
/// With a base URL the path is appended to it; otherwise the
/// workspace-relative path is used as is.
#[must_use]
pub fn deep_link(base: Option<&str>, path: &str, line: Option<usize>) -> String {
    let path = path.trim_start_matches("./");
    let base = base.map(|base| base.trim_end_matches('/')).filter(|base| !base.is_empty());
    let mut link = match base {
        Some(base) => format!("{base}/{}", path.trim_start_matches('/')),
        None => path.to_string(),
    };
    if let Some(line) = line {
        link.push_str("#L");
        link.push_str(&line.to_string());
    }
    link
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("PUT with AUTO_COMPRESS=TRUE"), "PUT with AUTO_COMPRESS=TRUE");
    }

    #[test]
    fn deep_links_join_base_and_line() {
        assert_eq!(
            deep_link(Some("https://example.com/blob/main/"), "./python/test_a.py", Some(12)),
            "https://example.com/blob/main/python/test_a.py#L12"
        );
        assert_eq!(deep_link(None, "python/test_a.py", Some(3)), "python/test_a.py#L3");
        assert_eq!(deep_link(Some(""), "python/test_a.py", None), "python/test_a.py");
    }
}

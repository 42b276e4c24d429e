//! Markdown to safe HTML.
//!
//! Everything a user submits goes through [`sanitize`] before it is stored or
//! rendered. The conversion itself produces structural HTML from markdown
//! events; raw HTML embedded in the source is re-emitted as escaped text, and
//! links or images with a scheme outside the allowlist are dropped (their
//! inner text is kept).

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Convert raw markdown into HTML that is safe to embed in a page unescaped.
///
/// Pure and deterministic. Empty or whitespace-only input yields an empty
/// string. The output is not valid input for a second pass; always sanitize
/// from the original source.
pub fn sanitize(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);

    let mut events: Vec<Event> = Vec::new();
    // start tags dropped for an unsafe URL, so the matching end tags can be
    // dropped too while inner text still flows through
    let mut dropped: Vec<TagEnd> = Vec::new();

    for event in parser {
        match event {
            Event::Html(raw) | Event::InlineHtml(raw) => {
                // neutralized: push_html escapes text events
                events.push(Event::Text(raw));
            }
            Event::Start(Tag::Link { ref dest_url, .. }) if !is_safe_url(dest_url) => {
                dropped.push(TagEnd::Link);
            }
            Event::Start(Tag::Image { ref dest_url, .. }) if !is_safe_url(dest_url) => {
                dropped.push(TagEnd::Image);
            }
            Event::End(end @ (TagEnd::Link | TagEnd::Image))
                if dropped.last() == Some(&end) =>
            {
                dropped.pop();
            }
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// A URL is safe when it is relative or uses an allowlisted scheme.
fn is_safe_url(url: &str) -> bool {
    // control characters are stripped before scheme detection, the way
    // browsers do when resolving a URL
    let cleaned: String = url
        .trim()
        .chars()
        .filter(|c| !c.is_ascii_control())
        .collect();
    match cleaned.split_once(':') {
        // a colon after a path/query/fragment separator is not a scheme
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            matches!(
                scheme.to_ascii_lowercase().as_str(),
                "http" | "https" | "mailto"
            )
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_with_script_payload() {
        let result = sanitize("# Hello <script>alert(1)</script>");
        assert!(result.contains("<h1>"));
        assert!(result.contains("Hello"));
        assert!(!result.contains("<script"));
    }

    #[test]
    fn script_block_is_neutralized() {
        let result = sanitize("<script>\nalert(1)\n</script>");
        assert!(!result.contains("<script"));
        // the payload is still visible as text
        assert!(result.contains("&lt;script&gt;"));
    }

    #[test]
    fn inline_event_handler_is_neutralized() {
        let result = sanitize("look <img src=x onerror=alert(1)> here");
        assert!(!result.contains("<img"));
    }

    #[test]
    fn iframe_is_neutralized() {
        let result = sanitize("<iframe src=\"https://example.com\"></iframe>");
        assert!(!result.contains("<iframe"));
    }

    #[test]
    fn javascript_link_is_dropped_text_kept() {
        let result = sanitize("[boom](javascript:alert(1))");
        assert!(!result.contains("javascript:"));
        assert!(!result.contains("<a "));
        assert!(result.contains("boom"));
    }

    #[test]
    fn javascript_link_mixed_case_is_dropped() {
        let result = sanitize("[boom](JaVaScRiPt:alert(1))");
        assert!(!result.to_ascii_lowercase().contains("javascript:"));
    }

    #[test]
    fn data_uri_image_is_dropped() {
        let result = sanitize("![x](data:text/html;base64,PHNjcmlwdD4=)");
        assert!(!result.contains("<img"));
        assert!(!result.contains("data:"));
    }

    #[test]
    fn unsafe_image_inside_safe_link() {
        let result = sanitize("[![alt](javascript:x)](https://example.com)");
        assert!(result.contains("<a href=\"https://example.com\">"));
        assert!(!result.contains("<img"));
        assert!(result.contains("alt"));
    }

    #[test]
    fn https_link_survives() {
        let result = sanitize("[docs](https://example.com)");
        assert!(result.contains("<a href=\"https://example.com\">docs</a>"));
    }

    #[test]
    fn relative_and_mailto_links_survive() {
        assert!(sanitize("[p](/posts/abc)").contains("<a href=\"/posts/abc\">"));
        assert!(sanitize("[m](mailto:a@example.com)").contains("mailto:a@example.com"));
    }

    #[test]
    fn standard_markdown_renders() {
        let result = sanitize("# Title\n\n**bold** and *em*\n\n- one\n- two\n\n`code`");
        assert!(result.contains("<h1>Title</h1>"));
        assert!(result.contains("<strong>bold</strong>"));
        assert!(result.contains("<em>em</em>"));
        assert!(result.contains("<li>one</li>"));
        assert!(result.contains("<code>code</code>"));
    }

    #[test]
    fn fenced_code_block_renders() {
        let result = sanitize("```rust\nfn main() {}\n```");
        assert!(result.contains("<pre>"));
        assert!(result.contains("fn main() {}"));
    }

    #[test]
    fn markup_inside_code_block_is_escaped() {
        let result = sanitize("```\n<script>alert(1)</script>\n```");
        assert!(!result.contains("<script"));
        assert!(result.contains("&lt;script&gt;"));
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n\n  "), "");
    }

    #[test]
    fn unicode_passes_through() {
        let result = sanitize("# 你好\n\nCafé ☕");
        assert!(result.contains("你好"));
        assert!(result.contains("Café ☕"));
    }

    #[test]
    fn url_scheme_classification() {
        assert!(is_safe_url("https://example.com"));
        assert!(is_safe_url("http://example.com"));
        assert!(is_safe_url("mailto:a@example.com"));
        assert!(is_safe_url("/posts/123"));
        assert!(is_safe_url("#section"));
        assert!(is_safe_url("docs/page:1"));
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("JAVASCRIPT:alert(1)"));
        assert!(!is_safe_url(" javascript:alert(1)"));
        assert!(!is_safe_url("java\u{0}script:alert(1)"));
        assert!(!is_safe_url("vbscript:x"));
        assert!(!is_safe_url("data:text/html,x"));
    }
}

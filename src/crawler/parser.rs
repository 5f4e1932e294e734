//! Answer page parser
//!
//! This module turns an answer page into plain text:
//! - Title from the first `<h1>`
//! - Body from the article container, falling back to `div.cc`, then the
//!   whole page body
//! - Inline links flattened to `label (url)`

use crate::url::{decode_entities, UrlNormalizer};
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Title used when a page has no usable `<h1>`
pub const DEFAULT_TITLE: &str = "Support article";

/// Content-container selectors, tried in order
///
/// html5ever always synthesizes a `<body>`, so the last entry always matches.
const CONTAINER_SELECTORS: [&str; 3] = [
    r#"article[class*="article-container"]"#,
    "div.cc",
    "body",
];

/// Extracted content of an answer page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnswer {
    pub title: String,
    pub text: String,
}

/// Parses an answer page into a title and a plain-text body
///
/// Never fails: a page without any known container is rendered whole.
///
/// # Example
///
/// ```
/// use support_harvest::config::SiteConfig;
/// use support_harvest::crawler::parse_answer_page;
/// use support_harvest::url::UrlNormalizer;
///
/// let normalizer = UrlNormalizer::new(&SiteConfig::default()).unwrap();
/// let html = r#"<h1>Reset</h1><div class="cc"><p>See <a href="/answer/1">help</a>.</p></div>"#;
/// let parsed = parse_answer_page(html, "en", &normalizer);
/// assert_eq!(parsed.title, "Reset");
/// assert_eq!(parsed.text, "See help (https://support.google.com/answer/1?hl=en).");
/// ```
pub fn parse_answer_page(html: &str, lang: &str, normalizer: &UrlNormalizer) -> ParsedAnswer {
    let document = Html::parse_document(html);

    let title = first_inner_html(&document, "h1")
        .map(|raw| render_text(&raw, lang, normalizer))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let body = CONTAINER_SELECTORS
        .iter()
        .find_map(|selector| first_inner_html(&document, selector))
        .unwrap_or_default();

    ParsedAnswer {
        title,
        text: render_text(&body, lang, normalizer),
    }
}

/// Inner markup of the first element matching `selector`
fn first_inner_html(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.inner_html())
}

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect("valid regex"));
    };
}

static_regex!(SCRIPT_RE, r"(?is)<script\b.*?</script\s*>");
static_regex!(STYLE_RE, r"(?is)<style\b.*?</style\s*>");
static_regex!(ANCHOR_RE, r#"(?is)<a\s(?:[^>]*?\s)?href="([^"]*)"[^>]*>(.*?)</a\s*>"#);
static_regex!(TAG_RE, r"<[^>]+>");
static_regex!(SPACE_RUN_RE, r"\s+");
static_regex!(BR_RE, r"(?i)<br\s*/?>");
static_regex!(LI_OPEN_RE, r"(?i)<li\b[^>]*>");
static_regex!(P_CLOSE_RE, r"(?i)</p\s*>");
static_regex!(H_CLOSE_RE, r"(?i)</h[1-6]\s*>");
static_regex!(H_OPEN_RE, r"(?i)<h[1-6]\b[^>]*>");
static_regex!(TR_CLOSE_RE, r"(?i)</tr\s*>");
static_regex!(CELL_CLOSE_RE, r"(?i)</t[dh]\s*>");
static_regex!(HSPACE_RUN_RE, "[ \u{a0}]{2,}");
static_regex!(BLANK_LINES_RE, r"\n{3,}");

/// Renders a markup fragment as plain text
///
/// Script and style blocks are dropped. Structural tags become line breaks,
/// blank lines, list bullets or cell tabs. Every other tag is stripped.
pub fn render_text(html: &str, lang: &str, normalizer: &UrlNormalizer) -> String {
    let s = SCRIPT_RE.replace_all(html, "");
    let s = STYLE_RE.replace_all(&s, "");
    let s = ANCHOR_RE.replace_all(&s, |caps: &Captures| {
        render_anchor(&caps[1], &caps[2], lang, normalizer)
    });

    let s = BR_RE.replace_all(&s, "\n");
    let s = LI_OPEN_RE.replace_all(&s, "\n- ");
    let s = P_CLOSE_RE.replace_all(&s, "\n\n");
    let s = H_CLOSE_RE.replace_all(&s, "\n\n");
    let s = H_OPEN_RE.replace_all(&s, "\n");
    let s = TR_CLOSE_RE.replace_all(&s, "\n");
    let s = CELL_CLOSE_RE.replace_all(&s, "\t");
    let s = TAG_RE.replace_all(&s, "");

    let s = decode_entities(&s).replace('\t', "  ");
    let s = HSPACE_RUN_RE.replace_all(&s, " ");
    let s = BLANK_LINES_RE.replace_all(&s, "\n\n");

    s.trim().to_string()
}

/// `label (url)`, or just the label for in-page and script targets
fn render_anchor(href: &str, label: &str, lang: &str, normalizer: &UrlNormalizer) -> String {
    let label = TAG_RE.replace_all(label, "");
    let label = SPACE_RUN_RE.replace_all(&label, " ");
    let label = label.trim();

    let href = decode_entities(href);
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with('?')
        || href.to_ascii_lowercase().starts_with("javascript:")
    {
        return label.to_string();
    }

    let full = normalizer.normalize(href, Some(lang));
    if label.is_empty() {
        full
    } else {
        format!("{} ({})", label, full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    fn normalizer() -> UrlNormalizer {
        UrlNormalizer::new(&SiteConfig::default()).unwrap()
    }

    fn render(html: &str) -> String {
        render_text(html, "ko", &normalizer())
    }

    #[test]
    fn test_inline_link_rendered_with_url() {
        let html = r#"<html><body><a href="/answer/123">foo</a></body></html>"#;
        let parsed = parse_answer_page(html, "ko", &normalizer());
        assert!(parsed
            .text
            .contains("foo (https://support.google.com/answer/123?hl=ko)"));
    }

    #[test]
    fn test_title_from_h1() {
        let html = "<html><body><h1>Add <b>users</b> &amp; groups</h1><p>x</p></body></html>";
        let parsed = parse_answer_page(html, "ko", &normalizer());
        assert_eq!(parsed.title, "Add users & groups");
    }

    #[test]
    fn test_default_title() {
        let parsed = parse_answer_page("<p>no heading</p>", "ko", &normalizer());
        assert_eq!(parsed.title, DEFAULT_TITLE);
        assert_eq!(parsed.text, "no heading");
    }

    #[test]
    fn test_article_container_preferred() {
        let html = r#"
            <html><body>
              <nav>Navigation</nav>
              <div class="cc">Secondary</div>
              <article class="main article-container wide"><p>Primary</p></article>
            </body></html>
        "#;
        let parsed = parse_answer_page(html, "ko", &normalizer());
        assert_eq!(parsed.text, "Primary");
    }

    #[test]
    fn test_secondary_container_fallback() {
        let html = r#"
            <html><body>
              <nav>Navigation</nav>
              <div class="intro cc"><p>Secondary</p><div>nested</div></div>
            </body></html>
        "#;
        let parsed = parse_answer_page(html, "ko", &normalizer());
        assert!(parsed.text.starts_with("Secondary"));
        assert!(parsed.text.contains("nested"));
        assert!(!parsed.text.contains("Navigation"));
    }

    #[test]
    fn test_whole_body_fallback() {
        let html = "<html><body><nav>Navigation</nav><p>Content</p></body></html>";
        let parsed = parse_answer_page(html, "ko", &normalizer());
        assert!(parsed.text.contains("Navigation"));
        assert!(parsed.text.contains("Content"));
    }

    #[test]
    fn test_bare_fragment_uses_synthesized_body() {
        let parsed = parse_answer_page("plain <b>text</b>", "ko", &normalizer());
        assert_eq!(parsed.title, DEFAULT_TITLE);
        assert_eq!(parsed.text, "plain text");
    }

    #[test]
    fn test_total_on_arbitrary_input() {
        for input in ["", "plain text", "<<<>>>", "<a href=", "&#xZZ;"] {
            let parsed = parse_answer_page(input, "ko", &normalizer());
            assert!(!parsed.title.is_empty());
        }
    }

    #[test]
    fn test_scripts_and_styles_dropped() {
        let text = render("a<script>var x = '<p>';</script>b<style>p { color: red }</style>c");
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_anchor_targets_without_url() {
        assert_eq!(render(r##"<a href="#top">Top</a>"##), "Top");
        assert_eq!(render(r#"<a href="?tab=2">Tab</a>"#), "Tab");
        assert_eq!(render(r#"<a href="JavaScript:void(0)">Run</a>"#), "Run");
        assert_eq!(render(r#"<a href="">Empty</a>"#), "Empty");
    }

    #[test]
    fn test_anchor_without_label_renders_url() {
        assert_eq!(
            render(r#"<a href="/a/answer/9"><img src="x.png"></a>"#),
            "https://support.google.com/a/answer/9?hl=ko"
        );
    }

    #[test]
    fn test_anchor_label_whitespace_collapsed() {
        assert_eq!(
            render("<a href=\"/a/topic/1\">\n  Manage\n  <b>users</b>\n</a>"),
            "Manage users (https://support.google.com/a/topic/1?hl=ko)"
        );
    }

    #[test]
    fn test_data_href_not_taken_as_href() {
        assert_eq!(
            render(r#"<a data-href="/a/answer/1" href="/a/answer/2">x</a>"#),
            "x (https://support.google.com/a/answer/2?hl=ko)"
        );
    }

    #[test]
    fn test_list_rendering() {
        assert_eq!(render("<ul><li>one</li><li>two</li></ul>"), "- one\n- two");
    }

    #[test]
    fn test_paragraphs_and_breaks() {
        assert_eq!(render("<p>one<br>two</p><p>three</p>"), "one\ntwo\n\nthree");
    }

    #[test]
    fn test_headings() {
        assert_eq!(render("<p>intro</p><h2>Step 1</h2>text"), "intro\n\nStep 1\n\ntext");
    }

    #[test]
    fn test_table_rendering() {
        assert_eq!(
            render("<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>"),
            "A B \n1 2"
        );
    }

    #[test]
    fn test_entities_and_nbsp_collapsed() {
        assert_eq!(render("a&nbsp;&nbsp;b &lt;c&gt;"), "a b <c>");
    }

    #[test]
    fn test_blank_lines_collapsed() {
        assert_eq!(render("<p>a</p><p></p><p></p><p>b</p>"), "a\n\nb");
    }
}

//! Character-level decoding shared by the normalizer, extractor and parser

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Decodes every `;`-terminated HTML entity (named, decimal or hex)
///
/// Decoding is a single pass: `&amp;lt;` becomes `&lt;`, not `<`.
/// Unknown names are left as written.
///
/// # Examples
///
/// ```
/// use support_harvest::url::decode_entities;
///
/// assert_eq!(decode_entities("a &amp; b &#60;&#x3e;"), "a & b <>");
/// assert_eq!(decode_entities("&bogus;"), "&bogus;");
/// ```
pub fn decode_entities(s: &str) -> String {
    static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").expect("valid regex")
    });

    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            html_escape::decode_html_entities(&caps[0]).into_owned()
        })
        .into_owned()
}

/// Undoes JSON-string escaping so markup inside inline script payloads
/// becomes visible to pattern matching
///
/// Handles `\u003c`, `\u003e`, `\u0026`, `\u002f` (any case), `\/`,
/// `\"` and `\'`.
pub fn unescape_json_escapes(s: &str) -> String {
    static JSON_ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?i)\\u00(3c|3e|26|2f)|\\([/"'])"#).expect("valid regex")
    });

    JSON_ESCAPE_RE
        .replace_all(s, |caps: &Captures| {
            if let Some(quoted) = caps.get(2) {
                return quoted.as_str().to_string();
            }
            match caps[1].to_ascii_lowercase().as_str() {
                "3c" => "<",
                "3e" => ">",
                "26" => "&",
                _ => "/",
            }
            .to_string()
        })
        .into_owned()
}

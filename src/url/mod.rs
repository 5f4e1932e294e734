//! URL handling module for Support-Harvest
//!
//! This module provides link normalization, entity and JSON-escape decoding,
//! and classification of links into topic and answer pages.

mod escapes;
mod normalize;

use crate::state::LinkKind;
use regex::Regex;
use std::sync::LazyLock;

// Re-export main functions
pub use escapes::{decode_entities, unescape_json_escapes};
pub use normalize::UrlNormalizer;

/// Classifies a link by the page shape its path names
///
/// Answer shapes are checked before topic shapes, so a link naming both
/// (for example an answer URL carrying a topic in its query) is an answer.
///
/// # Examples
///
/// ```
/// use support_harvest::state::LinkKind;
/// use support_harvest::url::classify_link;
///
/// assert_eq!(classify_link("/a/answer/60781"), Some(LinkKind::Answer));
/// assert_eq!(classify_link("/a/topic/4388346"), Some(LinkKind::Topic));
/// assert_eq!(classify_link("/a/community"), None);
/// ```
pub fn classify_link(link: &str) -> Option<LinkKind> {
    static ANSWER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/answer/\d+").expect("valid regex"));
    static TOPIC_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"/topic/\d+").expect("valid regex"));

    if ANSWER_RE.is_match(link) {
        Some(LinkKind::Answer)
    } else if TOPIC_RE.is_match(link) {
        Some(LinkKind::Topic)
    } else {
        None
    }
}

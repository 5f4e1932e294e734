//! Pattern-based discovery of topic and answer links
//!
//! Help pages carry their navigation in several places: plain anchors,
//! `data-href` attributes, and JSON payloads inside inline scripts. Links
//! are found by pattern matching over the raw body rather than by parsing
//! a DOM, so links inside script payloads are found too.

use crate::state::LinkKind;
use crate::url::{classify_link, unescape_json_escapes, UrlNormalizer};
use crate::HarvestError;
use regex::Regex;
use std::collections::HashSet;

/// Path shape of an answer page, relative to the origin
const PATH_ANSWER: &str = r"/(?:[a-z0-9-]+/)*(?:a/)?answer/\d+";

/// Path shape of a topic page, relative to the origin
const PATH_TOPIC: &str = r"/(?:[a-z0-9-]+/)*(?:a/)?topic/\d+";

/// Links discovered in one page body, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedLinks {
    pub answers: Vec<String>,
    pub topics: Vec<String>,
}

impl ExtractedLinks {
    /// Total number of links across both categories
    pub fn len(&self) -> usize {
        self.answers.len() + self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty() && self.topics.is_empty()
    }
}

/// Link extractor bound to one site
///
/// Patterns are compiled once per site origin and applied in a fixed order:
/// bare relative paths, bare absolute URLs, anchor `href`s, then
/// `data-href` attributes, answers before topics within each group.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    normalizer: UrlNormalizer,
    patterns: Vec<Regex>,
    answer_shape: Regex,
    topic_shape: Regex,
}

impl LinkExtractor {
    /// Compiles the link patterns for the normalizer's origin
    pub fn new(normalizer: UrlNormalizer) -> Result<Self, HarvestError> {
        let origin = regex::escape(&normalizer.origin().origin().ascii_serialization());
        let abs_answer = format!("{}{}", origin, PATH_ANSWER);
        let abs_topic = format!("{}{}", origin, PATH_TOPIC);

        let sources = [
            format!(r#"({}[^"'<\s]*)"#, PATH_ANSWER),
            format!(r#"({}[^"'<\s]*)"#, PATH_TOPIC),
            format!(r#"({}[^"'<\s]*)"#, abs_answer),
            format!(r#"({}[^"'<\s]*)"#, abs_topic),
            format!(
                r#"(?i)<a[^>]+href="({}[^"]*|{}[^"]*)"[^>]*>"#,
                PATH_ANSWER, abs_answer
            ),
            format!(
                r#"(?i)<a[^>]+href="({}[^"]*|{}[^"]*)"[^>]*>"#,
                PATH_TOPIC, abs_topic
            ),
            format!(r#"(?i)data-href="({}[^"]*|{}[^"]*)""#, PATH_ANSWER, abs_answer),
            format!(r#"(?i)data-href="({}[^"]*|{}[^"]*)""#, PATH_TOPIC, abs_topic),
        ];

        let patterns = sources
            .iter()
            .map(|source| Regex::new(source))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            answer_shape: Regex::new(&format!("(?i)^{}", abs_answer))?,
            topic_shape: Regex::new(&format!("(?i)^{}", abs_topic))?,
            normalizer,
            patterns,
        })
    }

    /// Scans a raw page body for answer and topic links
    ///
    /// Each match is normalized with `lang` and kept only if the normalized
    /// form still has its category's absolute shape. Within one call the
    /// first occurrence of a link wins, and each category stops growing at
    /// its cap.
    pub fn extract(
        &self,
        raw_body: &str,
        lang: &str,
        max_answers: usize,
        max_topics: usize,
    ) -> ExtractedLinks {
        let body = unescape_json_escapes(raw_body);

        let mut links = ExtractedLinks::default();
        let mut seen_answers = HashSet::new();
        let mut seen_topics = HashSet::new();

        for pattern in &self.patterns {
            for caps in pattern.captures_iter(&body) {
                let Some(link) = caps.get(1) else { continue };

                match classify_link(link.as_str()) {
                    Some(LinkKind::Answer) if links.answers.len() < max_answers => {
                        let full = self.normalizer.normalize(link.as_str(), Some(lang));
                        if self.answer_shape.is_match(&full) && seen_answers.insert(full.clone()) {
                            links.answers.push(full);
                        }
                    }
                    Some(LinkKind::Topic) if links.topics.len() < max_topics => {
                        let full = self.normalizer.normalize(link.as_str(), Some(lang));
                        if self.topic_shape.is_match(&full) && seen_topics.insert(full.clone()) {
                            links.topics.push(full);
                        }
                    }
                    _ => {}
                }

                if links.answers.len() >= max_answers && links.topics.len() >= max_topics {
                    return links;
                }
            }
        }

        tracing::trace!(
            "Extracted {} answers and {} topics",
            links.answers.len(),
            links.topics.len()
        );

        links
    }
}

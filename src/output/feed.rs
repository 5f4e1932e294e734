//! RSS feed generation
//!
//! The content table's five columns are RSS item fields, so the whole table
//! can be published as an RSS 2.0 document.

use crate::output::OutputResult;
use crate::storage::{Article, Storage};
use chrono::{DateTime, Utc};
use html_escape::encode_text;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Channel-level metadata of the feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedChannel {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl FeedChannel {
    /// Channel describing articles harvested from `origin`
    pub fn for_site(origin: &str) -> Self {
        Self {
            title: "Support articles".to_string(),
            link: origin.to_string(),
            description: format!("Articles harvested from {}", origin),
        }
    }
}

/// Exports every stored article as an RSS feed at `output_path`
///
/// # Returns
///
/// * `Ok(usize)` - Number of items written
/// * `Err(OutputError)` - Failed to read articles or write the file
pub fn export_feed(
    storage: &dyn Storage,
    channel: &FeedChannel,
    output_path: &Path,
) -> OutputResult<usize> {
    let articles = storage.list_articles()?;
    write_feed(channel, &articles, Utc::now(), output_path)?;
    Ok(articles.len())
}

/// Writes an RSS feed of `articles` to `output_path`
pub fn write_feed(
    channel: &FeedChannel,
    articles: &[Article],
    built_at: DateTime<Utc>,
    output_path: &Path,
) -> OutputResult<()> {
    let rss = format_feed(channel, articles, built_at);

    let mut file = File::create(output_path)?;
    file.write_all(rss.as_bytes())?;

    Ok(())
}

/// Formats articles as an RSS 2.0 document
pub fn format_feed(channel: &FeedChannel, articles: &[Article], built_at: DateTime<Utc>) -> String {
    let mut rss = String::new();

    rss.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    rss.push_str("<rss version=\"2.0\">\n");
    rss.push_str("<channel>\n");
    push_element(&mut rss, 1, "title", &channel.title);
    push_element(&mut rss, 1, "link", &channel.link);
    push_element(&mut rss, 1, "description", &channel.description);
    push_element(
        &mut rss,
        1,
        "lastBuildDate",
        &built_at.format(crate::crawler::PUB_DATE_FORMAT).to_string(),
    );

    for article in articles {
        rss.push_str("  <item>\n");
        push_element(&mut rss, 2, "title", &article.title);
        push_element(&mut rss, 2, "link", &article.link);
        push_element(&mut rss, 2, "pubDate", &article.pub_date);
        push_element(&mut rss, 2, "description", &article.description);
        rss.push_str(&format!(
            "    <guid isPermaLink=\"false\">{}</guid>\n",
            encode_text(&article.guid)
        ));
        rss.push_str("  </item>\n");
    }

    rss.push_str("</channel>\n");
    rss.push_str("</rss>\n");

    rss
}

fn push_element(out: &mut String, depth: usize, name: &str, text: &str) {
    out.push_str(&format!(
        "{}<{}>{}</{}>\n",
        "  ".repeat(depth),
        name,
        encode_text(text),
        name
    ));
}

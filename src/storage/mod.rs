//! Storage module for persisting harvest state
//!
//! This module owns the two tables the harvester works against:
//! - the frontier queue (`kind | url | status | enqueued_at`)
//! - the content table (`title | link | pub_date | description | guid`)

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::{LinkKind, QueueStatus};
use sha2::{Digest, Sha256};

/// A row of the frontier queue
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: i64,
    pub kind: LinkKind,
    pub url: String,
    pub status: QueueStatus,
    pub enqueued_at: String,
    pub reserved_at: Option<String>,
}

/// A queue item reserved by `pop_batch`, carrying the row to mark done later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedItem {
    pub row: i64,
    pub kind: LinkKind,
    pub url: String,
}

/// A harvested answer page, shaped like an RSS item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub pub_date: String,
    pub description: String,
    /// Content fingerprint; the content table's upsert key
    pub guid: String,
}

impl Article {
    /// Fingerprint of a page's source URL and extracted text
    ///
    /// Edited pages get a new fingerprint, so the content table keeps one
    /// row per distinct version of a page.
    pub fn fingerprint(source_url: &str, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source_url.as_bytes());
        hasher.update(text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Row counts produced by one `upsert_articles` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = Article::fingerprint("https://support.google.com/a/answer/1", "body");
        let b = Article::fingerprint("https://support.google.com/a/answer/1", "body");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_text() {
        let url = "https://support.google.com/a/answer/1";
        assert_ne!(
            Article::fingerprint(url, "old body"),
            Article::fingerprint(url, "new body")
        );
    }

    #[test]
    fn test_fingerprint_hashes_concatenation() {
        assert_eq!(Article::fingerprint("ab", "c"), Article::fingerprint("a", "bc"));
    }
}

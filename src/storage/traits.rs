//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::{LinkKind, QueueStatus};
use crate::storage::{Article, QueueItem, ReservedItem, UpsertOutcome};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt row {row} in {table}: {message}")]
    CorruptRow {
        table: &'static str,
        row: i64,
        message: String,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Any row-addressable table store can back the harvester. Rows are
/// identified by an integer id, and "storage order" is ascending id.
///
/// Reservation in `pop_batch` is not a lease held against other processes:
/// two harvesters sharing one store may reserve the same rows. Run one
/// harvester at a time.
pub trait Storage {
    // ===== Frontier =====

    /// Adds `(kind, url)` as a pending item
    ///
    /// Returns false, without touching anything, when the identity already
    /// exists in any status, including done.
    fn enqueue(&mut self, kind: LinkKind, url: &str) -> StorageResult<bool>;

    /// Reserves up to `limit` pending items in storage order
    ///
    /// Each returned item's row is flipped to in-progress before returning.
    fn pop_batch(&mut self, limit: usize) -> StorageResult<Vec<ReservedItem>>;

    /// Flips the given in-progress rows to done
    ///
    /// Returns the number of rows changed.
    fn mark_done(&mut self, rows: &[i64]) -> StorageResult<usize>;

    /// Counts outstanding items (pending or in-progress)
    fn count_pending(&self) -> StorageResult<u64>;

    /// Returns in-progress items reserved before `reserved_before` to pending
    fn requeue_stale(&mut self, reserved_before: DateTime<Utc>) -> StorageResult<usize>;

    /// Looks up an item by its identity
    fn get_queue_item(&self, kind: LinkKind, url: &str) -> StorageResult<Option<QueueItem>>;

    /// Counts items in one status
    fn count_by_status(&self, status: QueueStatus) -> StorageResult<u64>;

    /// Counts all queue rows
    fn count_queue_items(&self) -> StorageResult<u64>;

    // ===== Content =====

    /// Inserts or overwrites articles keyed by their fingerprint
    ///
    /// Existing fingerprints have all five fields overwritten in place; new
    /// ones are appended. Rows are never deleted.
    fn upsert_articles(&mut self, items: &[Article]) -> StorageResult<UpsertOutcome>;

    /// Gets an article by fingerprint
    fn get_article(&self, guid: &str) -> StorageResult<Option<Article>>;

    /// Lists all articles in storage order
    fn list_articles(&self) -> StorageResult<Vec<Article>>;

    /// Counts all articles
    fn count_articles(&self) -> StorageResult<u64>;
}

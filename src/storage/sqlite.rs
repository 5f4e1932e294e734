//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::{LinkKind, QueueStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{Article, QueueItem, ReservedItem, UpsertOutcome};
use crate::HarvestError;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// Raw queue row as read from SQLite, before kind/status are parsed
type RawQueueRow = (i64, String, String, String, String, Option<String>);

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Fixed-width UTC timestamp, so stored values compare correctly as text
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn queue_item_from_raw(raw: RawQueueRow) -> StorageResult<QueueItem> {
    let (id, kind, url, status, enqueued_at, reserved_at) = raw;

    let kind = LinkKind::from_db_string(&kind).ok_or_else(|| StorageError::CorruptRow {
        table: "queue",
        row: id,
        message: format!("unknown kind '{}'", kind),
    })?;
    let status = QueueStatus::from_db_string(&status).ok_or_else(|| StorageError::CorruptRow {
        table: "queue",
        row: id,
        message: format!("unknown status '{}'", status),
    })?;

    Ok(QueueItem {
        id,
        kind,
        url,
        status,
        enqueued_at,
        reserved_at,
    })
}

fn article_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        title: row.get(0)?,
        link: row.get(1)?,
        pub_date: row.get(2)?,
        description: row.get(3)?,
        guid: row.get(4)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Frontier =====

    fn enqueue(&mut self, kind: LinkKind, url: &str) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO queue (kind, url, status, enqueued_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                kind.to_db_string(),
                url,
                QueueStatus::Pending.to_db_string(),
                timestamp(Utc::now())
            ],
        )?;
        Ok(changed == 1)
    }

    fn pop_batch(&mut self, limit: usize) -> StorageResult<Vec<ReservedItem>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let tx = self.conn.transaction()?;

        let candidates = {
            let mut stmt = tx.prepare(
                "SELECT id, kind, url FROM queue WHERE status = ?1 ORDER BY id ASC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(
                    params![QueueStatus::Pending.to_db_string(), limit as i64],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get(2)?)),
                )?
                .collect::<Result<Vec<(i64, String, String)>, _>>()?;
            rows
        };

        let now = timestamp(Utc::now());
        let mut reserved = Vec::with_capacity(candidates.len());
        for (row, kind, url) in candidates {
            let kind = LinkKind::from_db_string(&kind).ok_or_else(|| StorageError::CorruptRow {
                table: "queue",
                row,
                message: format!("unknown kind '{}'", kind),
            })?;

            tx.execute(
                "UPDATE queue SET status = ?1, reserved_at = ?2 WHERE id = ?3",
                params![QueueStatus::InProgress.to_db_string(), now, row],
            )?;

            reserved.push(ReservedItem { row, kind, url });
        }

        tx.commit()?;
        Ok(reserved)
    }

    fn mark_done(&mut self, rows: &[i64]) -> StorageResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut changed = 0;
        for row in rows {
            changed += tx.execute(
                "UPDATE queue SET status = ?1 WHERE id = ?2 AND status = ?3",
                params![
                    QueueStatus::Done.to_db_string(),
                    row,
                    QueueStatus::InProgress.to_db_string()
                ],
            )?;
        }
        tx.commit()?;

        Ok(changed)
    }

    fn count_pending(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM queue WHERE status IN (?1, ?2)",
            params![
                QueueStatus::Pending.to_db_string(),
                QueueStatus::InProgress.to_db_string()
            ],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn requeue_stale(&mut self, reserved_before: DateTime<Utc>) -> StorageResult<usize> {
        let changed = self.conn.execute(
            "UPDATE queue SET status = ?1, reserved_at = NULL
             WHERE status = ?2 AND (reserved_at IS NULL OR reserved_at < ?3)",
            params![
                QueueStatus::Pending.to_db_string(),
                QueueStatus::InProgress.to_db_string(),
                timestamp(reserved_before)
            ],
        )?;
        Ok(changed)
    }

    fn get_queue_item(&self, kind: LinkKind, url: &str) -> StorageResult<Option<QueueItem>> {
        let raw: Option<RawQueueRow> = self
            .conn
            .query_row(
                "SELECT id, kind, url, status, enqueued_at, reserved_at
                 FROM queue WHERE kind = ?1 AND url = ?2",
                params![kind.to_db_string(), url],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()?;

        raw.map(queue_item_from_raw).transpose()
    }

    fn count_by_status(&self, status: QueueStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM queue WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_queue_items(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Content =====

    fn upsert_articles(&mut self, items: &[Article]) -> StorageResult<UpsertOutcome> {
        if items.is_empty() {
            return Ok(UpsertOutcome::default());
        }

        let tx = self.conn.transaction()?;

        // Fingerprint -> row, built once per call
        let mut index: HashMap<String, i64> = {
            let mut stmt = tx.prepare("SELECT id, guid FROM articles")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, i64>(0)?)))?
                .collect::<Result<HashMap<_, _>, _>>()?;
            rows
        };

        let mut outcome = UpsertOutcome::default();
        for item in items {
            if let Some(&row) = index.get(&item.guid) {
                tx.execute(
                    "UPDATE articles SET title = ?1, link = ?2, pub_date = ?3, description = ?4, guid = ?5
                     WHERE id = ?6",
                    params![
                        item.title,
                        item.link,
                        item.pub_date,
                        item.description,
                        item.guid,
                        row
                    ],
                )?;
                outcome.updated += 1;
            } else {
                tx.execute(
                    "INSERT INTO articles (title, link, pub_date, description, guid)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        item.title,
                        item.link,
                        item.pub_date,
                        item.description,
                        item.guid
                    ],
                )?;
                index.insert(item.guid.clone(), tx.last_insert_rowid());
                outcome.inserted += 1;
            }
        }

        tx.commit()?;
        Ok(outcome)
    }

    fn get_article(&self, guid: &str) -> StorageResult<Option<Article>> {
        let article = self
            .conn
            .query_row(
                "SELECT title, link, pub_date, description, guid FROM articles WHERE guid = ?1",
                params![guid],
                article_from_row,
            )
            .optional()?;
        Ok(article)
    }

    fn list_articles(&self) -> StorageResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, link, pub_date, description, guid FROM articles ORDER BY id ASC",
        )?;

        let articles = stmt
            .query_map([], article_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn count_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

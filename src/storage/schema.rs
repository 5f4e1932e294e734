//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Support-Harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Crawl frontier: one row per (kind, url), never deleted
CREATE TABLE IF NOT EXISTS queue (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    enqueued_at TEXT NOT NULL,
    reserved_at TEXT,
    UNIQUE(kind, url)
);

CREATE INDEX IF NOT EXISTS idx_queue_status ON queue(status);

-- Harvested articles keyed by content fingerprint
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    pub_date TEXT NOT NULL,
    description TEXT NOT NULL,
    guid TEXT NOT NULL UNIQUE
);

CREATE INDEX IF NOT EXISTS idx_articles_link ON articles(link);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

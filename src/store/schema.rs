//! # Database Schema Module
//!
//! Tables for crawled jobs and canonical locations:
//!
//! 1. `jobs` - one row per posting, unique by `link`
//! 2. `tags` / `jobs_tags` - deduplicated tag names and their postings
//! 3. `locations` - gazetteer entries, unique by display address
//! 4. `jobs_locations` - at most one canonical location per posting

use crate::store::error::StoreError;
use libsql::{Connection, params};

const TABLES: [(&str, &str); 5] = [
    (
        "jobs",
        "CREATE TABLE IF NOT EXISTS jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            link TEXT NOT NULL UNIQUE,
            company TEXT NOT NULL,
            title TEXT NOT NULL,
            main_category TEXT NOT NULL,
            sub_category TEXT NOT NULL,
            employment_type TEXT NOT NULL,
            seniority TEXT NOT NULL,
            location TEXT NOT NULL,
            number_to_hire INTEGER NOT NULL,
            experience TEXT NOT NULL,
            salary TEXT NOT NULL,
            remote TEXT NOT NULL,
            interview_process TEXT NOT NULL,
            job_description TEXT NOT NULL,
            requirements TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "tags",
        "CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )",
    ),
    (
        "jobs_tags",
        "CREATE TABLE IF NOT EXISTS jobs_tags (
            job_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (job_id, tag_id),
            FOREIGN KEY (job_id) REFERENCES jobs(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
        )",
    ),
    (
        "locations",
        "CREATE TABLE IF NOT EXISTS locations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            address TEXT NOT NULL UNIQUE,
            country TEXT NOT NULL,
            city TEXT NOT NULL,
            area TEXT NOT NULL,
            zip_code TEXT NOT NULL
        )",
    ),
    (
        "jobs_locations",
        "CREATE TABLE IF NOT EXISTS jobs_locations (
            job_id INTEGER PRIMARY KEY,
            location_id INTEGER NOT NULL,
            FOREIGN KEY (job_id) REFERENCES jobs(id) ON DELETE CASCADE,
            FOREIGN KEY (location_id) REFERENCES locations(id) ON DELETE CASCADE
        )",
    ),
];

/// Names of every table created by `initialize_schema`
pub fn table_names() -> impl Iterator<Item = &'static str> {
    TABLES.iter().map(|(name, _)| *name)
}

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
    for (name, sql) in TABLES {
        conn.execute(sql, params![])
            .await
            .map_err(|e| StoreError::Schema(format!("Failed to create {} table: {}", name, e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_jobs_tags_tag_id ON jobs_tags(tag_id)",
        params![],
    )
    .await
    .map_err(|e| StoreError::Schema(format!("Failed to create index on jobs_tags: {}", e)))?;

    Ok(())
}

//! # Run History
//!
//! Summaries of completed runs kept in a local SQLite database so CI jobs
//! and developers can see how a suite trended.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, params};

use crate::error::{Error, Result};
use crate::testing::UnittestSummary;

/// Maximum number of runs to retain.
const MAX_HISTORY_ENTRIES: usize = 100;

/// One completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: i64,
    pub timestamp: u64,
    pub base_url: String,
    pub summary: UnittestSummary,
    pub report_path: Option<String>,
}

pub struct History {
    conn: Connection,
}

impl History {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS runs (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             finished_at INTEGER NOT NULL,
             base_url TEXT NOT NULL,
             total INTEGER NOT NULL,
             passed INTEGER NOT NULL,
             failed INTEGER NOT NULL,
             report_path TEXT
           );",
        )?;
        Ok(Self { conn })
    }

    /// Record a finished run, evicting the oldest entries beyond the limit.
    pub fn record(&self, base_url: &str, summary: &UnittestSummary, report_path: Option<&Path>) -> Result<i64> {
        let finished_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.conn.execute(
            "INSERT INTO runs (finished_at, base_url, total, passed, failed, report_path)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                finished_at as i64,
                base_url,
                summary.total as i64,
                summary.passed as i64,
                summary.failed as i64,
                report_path.map(|p| p.display().to_string()),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        self.conn.execute(
            "DELETE FROM runs WHERE id NOT IN (SELECT id FROM runs ORDER BY id DESC LIMIT ?1);",
            params![MAX_HISTORY_ENTRIES as i64],
        )?;

        Ok(id)
    }

    /// Most recent runs first.
    pub fn entries(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, finished_at, base_url, total, passed, failed, report_path
             FROM runs ORDER BY id DESC LIMIT ?1;",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(HistoryEntry {
                id: row.get(0)?,
                timestamp: row.get::<_, i64>(1)? as u64,
                base_url: row.get(2)?,
                summary: UnittestSummary {
                    total: row.get::<_, i64>(3)? as usize,
                    passed: row.get::<_, i64>(4)? as usize,
                    failed: row.get::<_, i64>(5)? as usize,
                },
                report_path: row.get(6)?,
            })
        })?;

        let entries = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM runs;", [])?;
        Ok(())
    }
}

//! Read-only access to a copied Chrome `History` database

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ForensicsError, ForensicsResult};

/// One row of the `urls` table.
#[derive(Debug, Clone, Serialize)]
pub struct VisitRecord {
    pub url: String,
    pub title: String,
    pub visit_count: i64,
    pub last_visit_time: i64,
}

/// Substrings marking authentication redirects, hidden from the visited list.
pub const AUTH_NOISE_PATTERNS: &[&str] = &["oauth", "accounts.google"];

pub struct HistoryDb {
    conn: Connection,
    path: PathBuf,
}

impl HistoryDb {
    /// Open a working copy read-only and run a quick integrity check.
    pub fn open(path: &Path) -> ForensicsResult<Self> {
        let storage = |source| ForensicsError::Storage {
            path: path.to_path_buf(),
            source,
        };

        if !path.is_file() {
            return Err(storage(rusqlite::Error::InvalidPath(path.to_path_buf())));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(storage)?;

        let integrity: String = conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))
            .map_err(storage)?;
        if integrity != "ok" {
            return Err(storage(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CORRUPT),
                Some(format!("quick_check: {}", integrity)),
            )));
        }

        debug!("Opened history copy {:?}", path);
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    fn storage_err(&self, source: rusqlite::Error) -> ForensicsError {
        ForensicsError::Storage {
            path: self.path.clone(),
            source,
        }
    }

    /// Walk every `urls` row, most recent first, until `visit` returns `false`.
    pub fn for_each_recent<F>(&self, mut visit: F) -> ForensicsResult<()>
    where
        F: FnMut(VisitRecord) -> bool,
    {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT url, title, visit_count, last_visit_time
                 FROM urls
                 ORDER BY last_visit_time DESC",
            )
            .map_err(|e| self.storage_err(e))?;

        let rows = stmt
            .query_map([], read_visit)
            .map_err(|e| self.storage_err(e))?;

        for row in rows {
            let record = row.map_err(|e| self.storage_err(e))?;
            if !visit(record) {
                break;
            }
        }
        Ok(())
    }

    /// Most recent visits, excluding authentication redirects, capped at `limit`.
    pub fn recent_sites(&self, limit: usize) -> ForensicsResult<Vec<VisitRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT url, title, visit_count, last_visit_time
                 FROM urls
                 WHERE instr(url, ?1) = 0
                   AND instr(url, ?2) = 0
                 ORDER BY last_visit_time DESC
                 LIMIT ?3",
            )
            .map_err(|e| self.storage_err(e))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(
                rusqlite::params![AUTH_NOISE_PATTERNS[0], AUTH_NOISE_PATTERNS[1], limit],
                read_visit,
            )
            .map_err(|e| self.storage_err(e))?;

        let mut sites = Vec::new();
        for row in rows {
            sites.push(row.map_err(|e| self.storage_err(e))?);
        }
        Ok(sites)
    }
}

fn read_visit(row: &rusqlite::Row<'_>) -> rusqlite::Result<VisitRecord> {
    Ok(VisitRecord {
        url: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        visit_count: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
        last_visit_time: row.get::<_, Option<i64>>(3)?.unwrap_or(0),
    })
}

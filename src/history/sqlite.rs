use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::PredictionQuery;
use crate::error::{PredictorError, Result};
use crate::history::{HistoryBackend, HistoryEntry};

/// SQLite-based history persistence
///
/// Schema:
/// ```sql
/// CREATE TABLE prediction_history (
///     position INTEGER PRIMARY KEY,
///     query TEXT NOT NULL,
///     result_count INTEGER NOT NULL,
///     recorded_at TEXT NOT NULL
/// );
/// ```
/// `position` 0 is the most recent entry; `query` holds the JSON snapshot.
pub struct SqliteHistoryBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryBackend {
    /// Open (or create) the history database
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS prediction_history (
                position INTEGER PRIMARY KEY,
                query TEXT NOT NULL,
                result_count INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PredictorError::HistoryStorage("sqlite connection lock poisoned".to_string()))
    }
}

#[async_trait]
impl HistoryBackend for SqliteHistoryBackend {
    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT query, result_count, recorded_at
             FROM prediction_history
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let query_json: String = row.get(0)?;
            let result_count: i64 = row.get(1)?;
            let recorded_at: String = row.get(2)?;

            let query: PredictionQuery = serde_json::from_str(&query_json)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

            let timestamp = DateTime::parse_from_rfc3339(&recorded_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

            Ok(HistoryEntry {
                query,
                result_count: usize::try_from(result_count).unwrap_or(0),
                timestamp,
            })
        })?;

        let entries = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    async fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM prediction_history", [])?;
        for (position, entry) in entries.iter().enumerate() {
            tx.execute(
                "INSERT INTO prediction_history (position, query, result_count, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    position as i64,
                    serde_json::to_string(&entry.query)?,
                    entry.result_count as i64,
                    entry.timestamp.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

use crate::app_dirs::AppDirs;
use crate::error::{GameError, Result};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub expression: String,
    pub result: i64,
    pub time: String,
    pub wrong_count: u32,
}

/// One finished game. Written once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Local>,
    pub total_time: String,
    pub score: f64,
    pub equation_text: String,
    pub steps: Vec<StepRecord>,
}

impl HistoryRecord {
    pub fn total_wrong(&self) -> u32 {
        self.steps.iter().map(|s| s.wrong_count).sum()
    }
}

/// Append-only log of finished games.
pub trait HistoryStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<()>;
    /// All records, newest first.
    fn list(&self) -> Result<Vec<HistoryRecord>>;
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS game_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT NOT NULL,
        total_time TEXT NOT NULL,
        score REAL NOT NULL,
        equation TEXT NOT NULL,
        steps_json TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE INDEX IF NOT EXISTS idx_game_history_timestamp ON game_history(timestamp);
"#;

/// History backed by SQLite.
#[derive(Debug)]
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Open the database at the default state location, creating it if needed.
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("arcmath_history.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<()> {
        let steps_json = serde_json::to_string(&record.steps)?;
        self.conn.execute(
            r#"
            INSERT INTO game_history (timestamp, total_time, score, equation, steps_json)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.timestamp.to_rfc3339(),
                record.total_time,
                record.score,
                record.equation_text,
                steps_json,
            ],
        )?;
        log::info!("saved game '{}' ({})", record.equation_text, record.total_time);
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT timestamp, total_time, score, equation, steps_json
            FROM game_history
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (timestamp, total_time, score, equation_text, steps_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| GameError::CorruptHistory(format!("bad timestamp '{}': {}", timestamp, e)))?
                .with_timezone(&Local);
            records.push(HistoryRecord {
                timestamp,
                total_time,
                score,
                equation_text,
                steps: serde_json::from_str(&steps_json)?,
            });
        }

        // stable sort keeps insertion order for identical timestamps
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}

/// Write records as CSV, one game per line with the steps flattened.
pub fn export_csv<P: AsRef<Path>>(records: &[HistoryRecord], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "equation", "total_time", "score", "wrong_answers", "steps"])?;
    for record in records {
        let steps = record
            .steps
            .iter()
            .map(|s| format!("{} = {} ({})", s.expression, s.result, s.time))
            .collect::<Vec<_>>()
            .join("; ");
        writer.write_record([
            record.timestamp.to_rfc3339(),
            record.equation_text.clone(),
            record.total_time.clone(),
            format!("{:.1}", record.score),
            record.total_wrong().to_string(),
            steps,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

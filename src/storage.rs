//! Embedded SQLite persistence for key/value memory and workflow definitions
//!
//! Every operation opens its own connection, runs a single statement, and drops the
//! connection again. Concurrent writes to the same key are last-write-wins.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::errors::AppError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS memory (
    key TEXT PRIMARY KEY,
    value TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
CREATE TABLE IF NOT EXISTS workflows (
    id TEXT PRIMARY KEY,
    name TEXT,
    config TEXT,
    status TEXT DEFAULT 'active'
);
"#;

/// A stored memory row. `created_at` is UTC as written by SQLite.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntry {
    pub key: String,
    pub value: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkflowStatus {
    #[default]
    Active,
    Paused,
    Archived,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Active => "active",
            WorkflowStatus::Paused => "paused",
            WorkflowStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(WorkflowStatus::Active),
            "paused" => Some(WorkflowStatus::Paused),
            "archived" => Some(WorkflowStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowRecord {
    pub id: String,
    pub name: String,
    pub config: Value,
    pub status: WorkflowStatus,
}

impl WorkflowRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            config,
            status: WorkflowStatus::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    path: Arc<Path>,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            path: Arc::from(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, AppError> {
        Ok(Connection::open(&self.path)?)
    }

    /// Create the parent directory and both tables if they are missing.
    pub fn init(&self) -> Result<(), AppError> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }

        self.connect()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Open the database, read its schema header, and close it again.
    pub fn probe(&self) -> Result<(), AppError> {
        let conn = self.connect()?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;
        conn.close().map_err(|(_, err)| AppError::from(err))
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        let raw: Option<Option<String>> = self
            .connect()?
            .query_row(
                "SELECT value FROM memory WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(Some(text)) => Ok(Some(serde_json::from_str(&text)?)),
            Some(None) => Ok(Some(Value::Null)),
            None => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: &Value) -> Result<(), AppError> {
        let text = serde_json::to_string(value)?;
        self.connect()?.execute(
            "INSERT OR REPLACE INTO memory (key, value) VALUES (?1, ?2)",
            params![key, text],
        )?;
        Ok(())
    }

    pub fn entry(&self, key: &str) -> Result<Option<MemoryEntry>, AppError> {
        let row: Option<(String, Option<String>, NaiveDateTime)> = self
            .connect()?
            .query_row(
                "SELECT key, value, created_at FROM memory WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        row.map(|(key, value, created_at)| -> Result<MemoryEntry, AppError> {
            let value = match value {
                Some(text) => serde_json::from_str(&text)?,
                None => Value::Null,
            };
            Ok(MemoryEntry {
                key,
                value,
                created_at,
            })
        })
        .transpose()
    }

    pub fn save_workflow(&self, record: &WorkflowRecord) -> Result<(), AppError> {
        let config = serde_json::to_string(&record.config)?;
        self.connect()?.execute(
            "INSERT OR REPLACE INTO workflows (id, name, config, status) VALUES (?1, ?2, ?3, ?4)",
            params![record.id, record.name, config, record.status.as_str()],
        )?;
        Ok(())
    }

    pub fn workflow(&self, id: &str) -> Result<Option<WorkflowRecord>, AppError> {
        let row: Option<(String, Option<String>, Option<String>, Option<String>)> = self
            .connect()?
            .query_row(
                "SELECT id, name, config, status FROM workflows WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((id, name, config, status)) = row else {
            return Ok(None);
        };

        let status = match status.as_deref() {
            None => WorkflowStatus::default(),
            Some(value) => WorkflowStatus::parse(value).ok_or_else(|| {
                AppError::internal(
                    "invalid_workflow_status",
                    format!("workflow {id} has unknown status {value:?}"),
                )
            })?,
        };
        let config = match config {
            Some(text) => serde_json::from_str(&text)?,
            None => Value::Null,
        };

        Ok(Some(WorkflowRecord {
            id,
            name: name.unwrap_or_default(),
            config,
            status,
        }))
    }

    /// Run a storage closure on the blocking pool.
    pub async fn blocking<F, T>(&self, work: F) -> Result<T, AppError>
    where
        F: FnOnce(&Store) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || work(&store))
            .await
            .map_err(|err| AppError::internal("storage_task_failed", err.to_string()))?
    }
}

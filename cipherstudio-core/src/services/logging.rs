//! Logging service - structured event logging to DuckDB
//!
//! Stores events in logs.duckdb next to the store. Only event names, ids and
//! error text are recorded: file contents, passwords and session tokens are
//! never logged.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use chrono::Utc;
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};

use crate::log_migrations::LOG_MIGRATIONS;
use crate::services::MigrationService;

/// Counter for generating unique IDs within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID based on timestamp + counter
fn generate_id() -> u64 {
    let timestamp = now_ms() as u64;

    // Lower 48 bits timestamp, upper 16 bits counter
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (timestamp << 16) | counter
}

/// Current unix timestamp in milliseconds
pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn detect_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

/// Entry point for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Cli,
    Desktop,
}

impl EntryPoint {
    fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Cli => "cli",
            EntryPoint::Desktop => "desktop",
        }
    }
}

/// A log event to be recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            project_id: None,
            command: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Set the project the event concerns
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Set the command context (for CLI events)
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub entry_point: String,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub project_id: Option<String>,
    pub command: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

/// Filter for reading entries back
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    pub project_id: Option<String>,
    pub event: Option<String>,
    pub errors_only: bool,
    pub limit: usize,
}

impl LogQuery {
    pub fn recent(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn for_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn errors_only(mut self) -> Self {
        self.errors_only = true;
        self
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        if let Some(project_id) = &self.project_id {
            conditions.push("project_id = ?");
            params.push(Value::Text(project_id.clone()));
        }
        if let Some(event) = &self.event {
            conditions.push("event = ?");
            params.push(Value::Text(event.clone()));
        }
        if self.errors_only {
            conditions.push("error_message IS NOT NULL");
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// Number of times one event was recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCount {
    pub event: String,
    pub total: u64,
    /// Entries of this event that carry an error message
    pub failures: u64,
}

const SELECT_ENTRY: &str = "SELECT id, timestamp, entry_point, app_version, platform,
       event, project_id, command, error_message, error_details
FROM sys_logs";

/// Service for structured event logging
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    entry_point: EntryPoint,
    app_version: String,
    platform: &'static str,
}

impl LoggingService {
    /// Open or create logs.duckdb in `data_dir` and run pending migrations
    pub fn new(
        data_dir: &Path,
        entry_point: EntryPoint,
        app_version: impl Into<String>,
    ) -> Result<Self> {
        let db_path = data_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;
        Self::with_connection(conn, Some(db_path), entry_point, app_version.into())
    }

    /// Log to an in-memory database (tests, ephemeral runs)
    pub fn in_memory(entry_point: EntryPoint, app_version: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, None, entry_point, app_version.into())
    }

    fn with_connection(
        conn: Connection,
        db_path: Option<PathBuf>,
        entry_point: EntryPoint,
        app_version: String,
    ) -> Result<Self> {
        MigrationService::new(&conn, LOG_MIGRATIONS).run_pending()?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            entry_point,
            app_version,
            platform: detect_platform(),
        })
    }

    /// Log an event
    ///
    /// entry_point, app_version and platform come from the service.
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO sys_logs (
                id, timestamp, entry_point, app_version, platform,
                event, project_id, command, error_message, error_details
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            duckdb::params![
                generate_id(),
                now_ms(),
                self.entry_point.as_str(),
                &self.app_version,
                self.platform,
                &event.event,
                &event.project_id,
                &event.command,
                &event.error_message,
                &event.error_details,
            ],
        )?;

        Ok(())
    }

    /// Entries matching `query`, newest first
    pub fn find(&self, query: &LogQuery) -> Result<Vec<LogEntry>> {
        let (filter, mut params) = query.where_clause();
        params.push(Value::BigInt(query.limit as i64));
        let sql = format!(
            "{}{} ORDER BY timestamp DESC, id DESC LIMIT ?",
            SELECT_ENTRY, filter
        );

        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(LogEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    entry_point: row.get(2)?,
                    app_version: row.get(3)?,
                    platform: row.get(4)?,
                    event: row.get(5)?,
                    project_id: row.get(6)?,
                    command: row.get(7)?,
                    error_message: row.get(8)?,
                    error_details: row.get(9)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// How often each event was recorded, most frequent first
    ///
    /// Limited to one project when `project_id` is given.
    pub fn event_counts(&self, project_id: Option<&str>) -> Result<Vec<EventCount>> {
        let query = LogQuery {
            project_id: project_id.map(str::to_string),
            ..LogQuery::default()
        };
        let (filter, params) = query.where_clause();
        let sql = format!(
            "SELECT event, COUNT(*), COUNT(error_message) FROM sys_logs{}
             GROUP BY event ORDER BY 2 DESC, event",
            filter
        );

        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut stmt = conn.prepare(&sql)?;
        let counts = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok(EventCount {
                    event: row.get(0)?,
                    total: row.get(1)?,
                    failures: row.get(2)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(counts)
    }

    /// Total number of log entries
    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete logs older than the given unix ms timestamp
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    /// Copy the logs database to `output_path` for troubleshooting
    pub fn export(&self, output_path: &Path) -> Result<PathBuf> {
        let db_path = self
            .db_path
            .as_ref()
            .ok_or_else(|| anyhow!("In-memory logs cannot be exported"))?;
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;

        // Flush the WAL so the copy is complete
        conn.execute("CHECKPOINT", [])?;
        std::fs::copy(db_path, output_path)?;

        Ok(output_path.to_path_buf())
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

/// Record an event on an optional logger, ignoring failures
///
/// Logging must never break the operation being logged.
pub fn record(logger: Option<&LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_logging_service_creation() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();
        assert!(service.db_path().unwrap().exists());
    }

    #[test]
    fn test_log_event() {
        let service = LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap();
        service.log(LogEvent::new("projects_loaded")).unwrap();

        let entries = service.find(&LogQuery::recent(10)).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "projects_loaded");
        assert_eq!(entries[0].entry_point, "cli");
        assert_eq!(entries[0].app_version, "1.0.0");
    }

    #[test]
    fn test_log_with_context() {
        let service = LoggingService::in_memory(EntryPoint::Desktop, "2.0.0").unwrap();
        service
            .log(
                LogEvent::new("project_renamed")
                    .with_project("project-1")
                    .with_command("project rename"),
            )
            .unwrap();

        let entries = service.find(&LogQuery::recent(10)).unwrap();
        assert_eq!(entries[0].project_id.as_deref(), Some("project-1"));
        assert_eq!(entries[0].command.as_deref(), Some("project rename"));
        assert_eq!(entries[0].entry_point, "desktop");
    }

    #[test]
    fn test_get_errors() {
        let service = LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap();
        service.log(LogEvent::new("manual_save")).unwrap();
        service
            .log(
                LogEvent::new("autosave_failed")
                    .with_error("quota exceeded")
                    .with_error_details("projects"),
            )
            .unwrap();

        let errors = service.find(&LogQuery::recent(10).errors_only()).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "autosave_failed");
        assert_eq!(errors[0].error_details.as_deref(), Some("projects"));
    }

    fn project_activity() -> LoggingService {
        let service = LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap();
        for event in [
            LogEvent::new("projects_loaded"),
            LogEvent::new("autosave_flushed").with_project("project-1"),
            LogEvent::new("autosave_flushed").with_project("project-1"),
            LogEvent::new("autosave_failed")
                .with_project("project-1")
                .with_error("autosave write failed"),
            LogEvent::new("autosave_flushed").with_project("project-2"),
            LogEvent::new("project_deleted").with_project("project-2"),
        ] {
            service.log(event).unwrap();
        }
        service
    }

    #[test]
    fn test_find_by_project_and_event() {
        let service = project_activity();

        let project = service.find(&LogQuery::recent(50).for_project("project-1")).unwrap();
        assert_eq!(project.len(), 3);
        assert!(project.iter().all(|e| e.project_id.as_deref() == Some("project-1")));

        let flushed = service
            .find(&LogQuery::recent(50).with_event("autosave_flushed"))
            .unwrap();
        assert_eq!(flushed.len(), 3);

        let both = service
            .find(
                &LogQuery::recent(50)
                    .for_project("project-2")
                    .with_event("autosave_flushed"),
            )
            .unwrap();
        assert_eq!(both.len(), 1);

        let failures = service
            .find(&LogQuery::recent(50).for_project("project-1").errors_only())
            .unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].event, "autosave_failed");

        assert_eq!(service.find(&LogQuery::recent(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_event_counts() {
        let service = project_activity();

        let all = service.event_counts(None).unwrap();
        assert_eq!(all[0].event, "autosave_flushed");
        assert_eq!(all[0].total, 3);
        assert_eq!(all.len(), 4);

        let project = service.event_counts(Some("project-1")).unwrap();
        assert_eq!(project.len(), 2);
        let failed = project.iter().find(|c| c.event == "autosave_failed").unwrap();
        assert_eq!(failed.total, 1);
        assert_eq!(failed.failures, 1);
    }

    #[test]
    fn test_count_and_delete() {
        let service = LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap();
        for event in ["a", "b", "c"] {
            service.log(LogEvent::new(event)).unwrap();
        }
        assert_eq!(service.count().unwrap(), 3);

        let deleted = service.delete_before(now_ms() + 1000).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_export() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), EntryPoint::Cli, "1.0.0").unwrap();
        service.log(LogEvent::new("session_login")).unwrap();

        let export_path = dir.path().join("export.duckdb");
        service.export(&export_path).unwrap();
        assert!(export_path.exists());

        let in_memory = LoggingService::in_memory(EntryPoint::Cli, "1.0.0").unwrap();
        assert!(in_memory.export(&export_path).is_err());
    }

    #[test]
    fn test_record_without_logger_is_noop() {
        record(None, LogEvent::new("ignored"));
    }
}

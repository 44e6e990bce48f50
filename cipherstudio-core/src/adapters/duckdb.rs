//! DuckDB key-value store implementation

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use duckdb::{params, Connection};
use fs2::FileExt;

use crate::domain::result::{self, Error};
use crate::migrations::MIGRATIONS;
use crate::ports::KeyValueStore;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// Durable key-value store backed by a single DuckDB table
///
/// Every key lives under a namespace so several stores can share one file.
/// Writes from separate processes are serialized with an exclusive lock on a
/// sibling `.lock` file.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
    namespace: String,
}

impl DuckDbStore {
    /// Open (or create) the store at `db_path`
    ///
    /// Retries with exponential backoff while another process holds the
    /// database file.
    pub fn new(db_path: &Path, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                        namespace,
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[cipherstudio] Store busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open store after {} retries", MAX_RETRIES)))
    }

    /// In-memory store with the same schema (nothing survives the process)
    pub fn open_in_memory(namespace: impl Into<String>) -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
            namespace: namespace.into(),
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; the store only needs core SQL
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Run pending store migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Ensure the store schema exists
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let mut stmt =
            conn.prepare("SELECT value FROM sys_kv WHERE namespace = ? AND key = ?")?;
        let value = stmt
            .query_map(params![self.namespace, key], |row| row.get::<_, String>(0))?
            .next()
            .transpose()?;
        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock()?;
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        let now = chrono::Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO sys_kv (namespace, key, value, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (namespace, key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at",
            params![self.namespace, key, value, now],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock()?;
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        conn.execute(
            "DELETE FROM sys_kv WHERE namespace = ? AND key = ?",
            params![self.namespace, key],
        )?;
        Ok(())
    }

    /// Exclusive cross-process write lock; None for in-memory stores
    fn write_lock(&self) -> Result<Option<WriteLock>> {
        match &self.db_path {
            Some(path) => Ok(Some(WriteLock::acquire(&path.with_extension("lock"))?)),
            None => Ok(None),
        }
    }
}

/// Held for the duration of one write
struct WriteLock {
    file: File,
}

impl WriteLock {
    fn acquire(lock_path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn storage_error(e: anyhow::Error) -> Error {
    Error::storage(e.to_string())
}

impl KeyValueStore for DuckDbStore {
    fn get(&self, key: &str) -> result::Result<Option<String>> {
        self.read(key).map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> result::Result<()> {
        self.write(key, value).map_err(storage_error)
    }

    fn remove(&self, key: &str) -> result::Result<()> {
        self.delete(key).map_err(storage_error)
    }
}

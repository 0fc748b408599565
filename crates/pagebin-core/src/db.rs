//! Durable access to the page store.
//!
//! A single SQLite connection serves the whole process. The database is
//! opened in write-ahead-log mode so readers proceed while a writer holds
//! its transaction, with a 30 second busy-timeout as the store-level wait.
//! On top of that, every operation runs inside a bounded retry loop that
//! backs off exponentially on transient contention and propagates any other
//! failure unchanged.
//!
//! Callers must treat every operation as potentially suspending: on
//! contention the task sleeps between attempts. The connection mutex is only
//! ever held for the duration of one synchronous statement, never across an
//! await point.

use crate::{Error, Result};
use rusqlite::{Connection, Params, Row};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Title assigned when nothing usable can be extracted from the content.
pub const DEFAULT_TITLE: &str = "Untitled";

const CREATE_PAGES_TABLE: &str = "CREATE TABLE IF NOT EXISTS pages (
    id TEXT PRIMARY KEY,
    html_content TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    password TEXT,
    is_protected INTEGER DEFAULT 0,
    code_type TEXT DEFAULT 'html',
    title TEXT DEFAULT 'Untitled'
);";

// Pre-title databases are upgraded in place; see init_schema.
const ADD_TITLE_COLUMN: &str = "ALTER TABLE pages ADD COLUMN title TEXT DEFAULT 'Untitled'";

/// Retry policy for transient contention.
///
/// Defaults to 3 attempts starting at 100ms, doubling between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetrySettings {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles after each failure.
    pub initial_backoff: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// Open-time settings for the store.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    /// How long the store itself waits on a locked database before
    /// reporting contention to us.
    pub busy_timeout: Duration,
    /// Application-level retry policy layered on top of the busy wait.
    pub retry: RetrySettings,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(30),
            retry: RetrySettings::default(),
        }
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy)]
pub struct ExecResult {
    /// Rowid of the last inserted row.
    pub last_insert_id: i64,
    /// Number of rows changed by the statement.
    pub rows_affected: usize,
}

/// Shared handle to the page database.
///
/// Cheap to clone; all clones share one connection. See the module docs for
/// the concurrency model.
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
    retry: RetrySettings,
}

impl Db {
    /// Opens (creating if necessary) the database at `path` and ensures the
    /// schema is in place.
    ///
    /// The parent directory is created if missing. WAL mode and the busy
    /// timeout are applied before any statement runs.
    pub fn open(path: impl AsRef<Path>, settings: StoreSettings) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Store(format!(
                    "failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        conn.busy_timeout(settings.busy_timeout)?;
        init_schema(&conn)?;
        info!(path = %path.display(), "page database ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            retry: settings.retry,
        })
    }

    /// Runs a multi-row query, mapping each row through `map`.
    pub async fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params + Copy,
        F: Fn(&Row<'_>) -> rusqlite::Result<T>,
    {
        with_retry(&self.retry, "query", || {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params, &map)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
        .await
    }

    /// Runs a single-row query. An absent row is `Ok(None)`, not an error.
    pub async fn get_one<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Option<T>>
    where
        P: Params + Copy,
        F: Fn(&Row<'_>) -> rusqlite::Result<T>,
    {
        use rusqlite::OptionalExtension;

        with_retry(&self.retry, "get_one", || {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(sql)?;
            let row = stmt.query_row(params, &map).optional()?;
            Ok(row)
        })
        .await
    }

    /// Runs an insert/update/delete statement.
    pub async fn execute<P>(&self, sql: &str, params: P) -> Result<ExecResult>
    where
        P: Params + Copy,
    {
        with_retry(&self.retry, "execute", || {
            let conn = self.lock()?;
            let rows_affected = conn.execute(sql, params)?;
            Ok(ExecResult {
                last_insert_id: conn.last_insert_rowid(),
                rows_affected,
            })
        })
        .await
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("database handle poisoned".to_string()))
    }
}

/// Creates the base schema and upgrades legacy databases.
///
/// The `title` column was added after the first schema shipped; re-adding it
/// on an up-to-date database reports a duplicate column, which is swallowed.
/// Any other alteration failure is logged as a warning and does not abort
/// startup.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_PAGES_TABLE)?;

    match conn.execute(ADD_TITLE_COLUMN, rusqlite::params![]) {
        Ok(_) => info!("added title column to pages table"),
        Err(err) if err.to_string().contains("duplicate column name") => {
            debug!("title column already present");
        },
        Err(err) => warn!("could not add title column: {err}"),
    }

    Ok(())
}

/// Bounded retry loop shared by all store operations.
///
/// Retries only transient errors, sleeping between attempts with a doubling
/// delay. After `max_attempts` failures the last observed error propagates
/// unchanged; non-transient errors propagate immediately.
pub(crate) async fn with_retry<T, F>(
    settings: &RetrySettings,
    operation: &'static str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut delay = settings.initial_backoff;
    let mut attempt = 1u32;

    loop {
        match op() {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "store operation succeeded after retry");
                }
                return Ok(value);
            },
            Err(err) if err.is_transient() && attempt < settings.max_attempts => {
                warn!(
                    operation,
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient store contention, backing off"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            },
            Err(err) => {
                warn!(
                    operation,
                    attempt,
                    category = err.category(),
                    error = %err,
                    "store operation failed"
                );
                return Err(err);
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rusqlite::params;
    use std::time::Instant;

    fn open_temp() -> (tempfile::TempDir, Db) {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::open(dir.path().join("pages.db"), StoreSettings::default()).unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn open_creates_directories_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db").join("pages.db");
        let db = Db::open(&path, StoreSettings::default()).unwrap();

        db.execute(
            "INSERT INTO pages (id, html_content, created_at) VALUES (?1, ?2, ?3)",
            params!["abc1234", "<p>hello</p>", 1_700_000_000_000_i64],
        )
        .await
        .unwrap();

        let content = db
            .get_one(
                "SELECT html_content FROM pages WHERE id = ?1",
                params!["abc1234"],
                |row| row.get::<_, String>(0),
            )
            .await
            .unwrap();
        assert_eq!(content.as_deref(), Some("<p>hello</p>"));
    }

    #[tokio::test]
    async fn wal_mode_is_enabled() {
        let (_dir, db) = open_temp();
        let mode = db
            .get_one("PRAGMA journal_mode", params![], |row| {
                row.get::<_, String>(0)
            })
            .await
            .unwrap();
        assert_eq!(mode.as_deref(), Some("wal"));
    }

    #[tokio::test]
    async fn reopening_an_existing_database_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.db");

        {
            let db = Db::open(&path, StoreSettings::default()).unwrap();
            db.execute(
                "INSERT INTO pages (id, html_content, created_at) VALUES (?1, ?2, ?3)",
                params!["aaaaaaa", "one", 1_i64],
            )
            .await
            .unwrap();
        }

        // Second open re-runs schema init; the title ALTER must be swallowed
        // and existing rows must survive.
        let db = Db::open(&path, StoreSettings::default()).unwrap();
        let count = db
            .get_one("SELECT COUNT(*) FROM pages", params![], |row| {
                row.get::<_, i64>(0)
            })
            .await
            .unwrap();
        assert_eq!(count, Some(1));
    }

    #[tokio::test]
    async fn get_one_returns_none_for_absent_row() {
        let (_dir, db) = open_temp();
        let row = db
            .get_one(
                "SELECT html_content FROM pages WHERE id = ?1",
                params!["nothere"],
                |row| row.get::<_, String>(0),
            )
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn clones_share_one_database() {
        let (_dir, db) = open_temp();
        let other = db.clone();

        let a = tokio::spawn(async move {
            other
                .execute(
                    "INSERT INTO pages (id, html_content, created_at) VALUES (?1, ?2, ?3)",
                    params!["task_a_1", "a", 1_i64],
                )
                .await
        });
        let b = db.execute(
            "INSERT INTO pages (id, html_content, created_at) VALUES (?1, ?2, ?3)",
            params!["task_b_1", "b", 2_i64],
        );

        a.await.unwrap().unwrap();
        b.await.unwrap();

        let count = db
            .get_one("SELECT COUNT(*) FROM pages", params![], |row| {
                row.get::<_, i64>(0)
            })
            .await
            .unwrap();
        assert_eq!(count, Some(2));
    }

    #[tokio::test]
    async fn retry_returns_success_after_transient_failures() {
        let settings = RetrySettings::default();
        let mut attempts = 0u32;

        let result = with_retry(&settings, "test", || {
            attempts += 1;
            if attempts < 3 {
                Err(Error::Contention("database is locked".to_string()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn retry_exhaustion_propagates_last_error_after_backoff() {
        let settings = RetrySettings::default();
        let mut attempts = 0u32;
        let started = Instant::now();

        let result: Result<()> = with_retry(&settings, "test", || {
            attempts += 1;
            Err(Error::Contention("database is locked".to_string()))
        })
        .await;

        let elapsed = started.elapsed();
        assert!(matches!(result, Err(Error::Contention(_))));
        assert_eq!(attempts, 3);
        // 100ms after the first failure, 200ms after the second.
        assert!(
            elapsed >= Duration::from_millis(300),
            "expected at least 300ms of backoff, got {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn non_transient_errors_are_not_retried() {
        let settings = RetrySettings::default();
        let mut attempts = 0u32;

        let result: Result<()> = with_retry(&settings, "test", || {
            attempts += 1;
            Err(Error::Integrity("UNIQUE constraint failed".to_string()))
        })
        .await;

        assert!(matches!(result, Err(Error::Integrity(_))));
        assert_eq!(attempts, 1);
    }
}

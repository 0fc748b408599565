//! Error types and handling for pagebin-core operations.
//!
//! This module provides the error type covering all failures in the page
//! store. Errors are categorized for easier handling and include context
//! about recoverability for retry logic.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: File system operations (database directory creation)
//! - **Contention Errors**: The store is busy or locked by another writer
//! - **Store Errors**: Any other failure reported by the underlying store
//! - **Integrity Errors**: Constraint violations, e.g. a duplicate page id
//! - **Configuration Errors**: Invalid settings or config files
//!
//! ## Recovery Hints
//!
//! Contention is expected to clear shortly and is the only class the store
//! access layer retries:
//!
//! ```rust
//! use pagebin_core::Error;
//!
//! let busy = Error::Contention("database is locked".to_string());
//! assert!(busy.is_transient());
//!
//! let broken = Error::Store("no such table: pages".to_string());
//! assert!(!broken.is_transient());
//! ```

use rusqlite::ErrorCode;
use thiserror::Error;

/// The main error type for pagebin-core operations.
///
/// All public functions in pagebin-core return `Result<T, Error>`. Driver
/// errors are classified into variants at the store boundary so that callers
/// (including the retry loop) never inspect driver-specific strings or codes.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers file system operations around the store, such as creating the
    /// database directory. The underlying `std::io::Error` is preserved.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store reported transient contention (busy or locked).
    ///
    /// Expected to clear shortly; the store access layer retries this class
    /// with exponential backoff before giving up and propagating the last
    /// observed error.
    #[error("Store contention: {0}")]
    Contention(String),

    /// Any other failure reported by the underlying store.
    ///
    /// Structural and programming errors land here: a malformed statement,
    /// a missing table, a type mismatch in a row mapping. Never retried.
    #[error("Store error: {0}")]
    Store(String),

    /// A constraint was violated.
    ///
    /// The practically relevant case is a duplicate page id on insert: the
    /// short id is hash-derived and collisions are improbable but possible,
    /// and the repository surfaces them as a creation failure rather than
    /// silently regenerating.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Requested resource was not found.
    ///
    /// Absent rows are represented as `Ok(None)` by the repository; this
    /// variant exists for callers that need a hard failure with a message,
    /// such as CLI lookups of a nonexistent id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                Self::Contention(err.to_string())
            },
            Some(ErrorCode::ConstraintViolation) => Self::Integrity(err.to_string()),
            _ => Self::Store(err.to_string()),
        }
    }
}

impl Error {
    /// Check if the error might clear if the operation is retried.
    ///
    /// Returns `true` only for store contention and for temporary I/O
    /// conditions. Structural errors, integrity violations, and
    /// configuration problems are permanent and must not be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Contention(_) => true,
            Self::Io(e) => {
                matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
                )
            },
            _ => false,
        }
    }

    /// Get the error category as a string identifier.
    ///
    /// Used in log lines and diagnostics so that contention and integrity
    /// failures can be told apart when reading output.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Contention(_) => "contention",
            Self::Store(_) => "store",
            Self::Integrity(_) => "integrity",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    fn sqlite_failure(code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(rusqlite::ffi::Error::new(code), None)
    }

    #[test]
    fn busy_and_locked_classify_as_contention() {
        // SQLITE_BUSY = 5, SQLITE_LOCKED = 6
        for code in [5, 6] {
            let err: Error = sqlite_failure(code).into();
            assert!(matches!(err, Error::Contention(_)), "code {code}: {err:?}");
            assert!(err.is_transient());
            assert_eq!(err.category(), "contention");
        }
    }

    #[test]
    fn constraint_violation_classifies_as_integrity() {
        // SQLITE_CONSTRAINT_PRIMARYKEY = 1555 (extended form of 19)
        for code in [19, 1555] {
            let err: Error = sqlite_failure(code).into();
            assert!(matches!(err, Error::Integrity(_)), "code {code}: {err:?}");
            assert!(!err.is_transient());
            assert_eq!(err.category(), "integrity");
        }
    }

    #[test]
    fn other_driver_errors_classify_as_store() {
        let err: Error = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, Error::Store(_)));
        assert!(!err.is_transient());
        assert_eq!(err.category(), "store");
    }

    #[test]
    fn io_timeouts_are_transient_but_other_io_is_not() {
        let timeout: Error = io::Error::new(io::ErrorKind::TimedOut, "timeout").into();
        assert!(timeout.is_transient());

        let denied: Error = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(!denied.is_transient());
        assert_eq!(denied.category(), "io");
    }

    #[test]
    fn display_includes_message() {
        let err = Error::Integrity("UNIQUE constraint failed: pages.id".to_string());
        let rendered = err.to_string();
        assert!(rendered.contains("Integrity error"));
        assert!(rendered.contains("pages.id"));

        let other = Error::Other("plain message".to_string());
        assert_eq!(other.to_string(), "plain message");
    }

    #[test]
    fn permanent_variants_are_not_transient() {
        let errors = vec![
            Error::Store("no such table".to_string()),
            Error::Integrity("duplicate".to_string()),
            Error::NotFound("missing".to_string()),
            Error::Config("bad value".to_string()),
            Error::Other("misc".to_string()),
        ];
        for err in errors {
            assert!(!err.is_transient(), "expected {err:?} to be permanent");
        }
    }
}

//! # pagebin-core
//!
//! Core functionality for pagebin - durable storage and admission control
//! for shareable content pages.
//!
//! A page is an immutable blob of markup submitted once and read many
//! times through a short hash-derived id. This crate owns the resilient
//! persistence layer and the request-admission logic; HTTP routing and
//! rendering live in consumers.
//!
//! ## Architecture
//!
//! - **Store access** ([`Db`]): one shared SQLite handle in write-ahead
//!   mode, with a bounded exponential-backoff retry loop masking transient
//!   contention.
//! - **Page repository** ([`Pages`]): entity shaping (id derivation,
//!   password generation, title extraction), CRUD, search/pagination, and
//!   statistics.
//! - **Admission control** ([`Gate`]): reconciles session- and
//!   cookie-based authentication into a single per-request decision.
//! - **Configuration** ([`Config`]): TOML settings with environment
//!   overrides.
//!
//! ## Quick Start
//!
//! ```rust
//! use pagebin_core::{Admission, Cookies, Gate, RequestInfo, Session};
//!
//! let gate = Gate::new(true);
//! let request = RequestInfo {
//!     path: "/api/pages".to_string(),
//!     accept: None,
//! };
//!
//! let mut session = Session::default();
//! let cookies = Cookies {
//!     auth: Some("true".to_string()),
//!     role: Some("admin".to_string()),
//! };
//!
//! // The cookie proves authentication, so the session is promoted.
//! assert_eq!(
//!     gate.admit_admin(&request, &mut session, &cookies),
//!     Admission::Granted
//! );
//! assert!(session.authenticated);
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, Error>`]. Transient store
//! contention is retried internally; everything else propagates unchanged
//! with a [`category`](Error::category) for log filtering. Absent rows are
//! `Ok(None)`, and admission outcomes are values, never errors.

/// Admission decisions from session and cookie authentication state
pub mod auth;
/// TOML configuration with environment overrides
pub mod config;
/// Durable, retry-aware access to the page store
pub mod db;
/// Error types and result aliases
pub mod error;
/// Page entity shaping and persistence
pub mod pages;
/// Record types for repository results
pub mod types;

// Re-export commonly used types
pub use auth::{Admission, Cookies, Gate, LOGIN_PATH, Rejection, RequestInfo, Role, Session};
pub use config::{AuthConfig, Config, RetryConfig, StoreConfig};
pub use db::{DEFAULT_TITLE, Db, ExecResult, RetrySettings, StoreSettings};
pub use error::{Error, Result};
pub use pages::Pages;
pub use types::*;

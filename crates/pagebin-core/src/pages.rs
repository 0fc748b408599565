//! Page entity shaping and persistence.
//!
//! All store access goes through [`Db`], so every operation here inherits
//! the retry policy for transient contention. Row shapes are explicit
//! structs from [`crate::types`]; nothing driver-specific escapes this
//! module.

use crate::db::{DEFAULT_TITLE, Db};
use crate::types::{
    CodeType, CreatedPage, Page, PageList, PageListing, RecentPage, Stats, TypeCount,
};
use crate::Result;
use chrono::{Local, NaiveTime, TimeZone, Utc};
use rand::Rng;
use regex::Regex;
use rusqlite::{Row, ToSql};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Length of the shareable short id (hex chars of the content digest).
///
/// Seven characters keep URLs short at the cost of a small collision
/// probability; a colliding insert fails on the primary key and surfaces as
/// [`crate::Error::Integrity`] rather than being silently regenerated.
const ID_CHARS: usize = 7;

/// Number of decimal digits in a generated page password.
const PASSWORD_DIGITS: usize = 5;

/// Character cap for titles taken from markup.
const MAX_TITLE_CHARS: usize = 100;

/// Character cap for titles synthesized from leading body text.
const SNIPPET_TITLE_CHARS: usize = 50;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>(.*?)</title>").unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<h1[^>]*>(.*?)</h1>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&[^;]+;").unwrap());

/// Repository for [`Page`] rows.
///
/// Cheap to clone; clones share the underlying [`Db`] handle.
#[derive(Clone)]
pub struct Pages {
    db: Db,
}

impl Pages {
    /// Creates a repository over an open database handle.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Stores a new page and returns its short id and generated password.
    ///
    /// The password is generated whether or not protection is enabled, so a
    /// page can later be promoted to protected without minting a new secret.
    /// A duplicate short id (hash collision) fails the insert and surfaces
    /// as [`crate::Error::Integrity`]; callers may retry with fresh input.
    pub async fn create(
        &self,
        content: &str,
        protected: bool,
        code_type: CodeType,
    ) -> Result<CreatedPage> {
        let created_at = Utc::now().timestamp_millis();
        let id = derive_id(content, created_at);
        let password = generate_password();
        let title = extract_title(content);

        self.db
            .execute(
                "INSERT INTO pages (id, html_content, created_at, password, is_protected, \
                 code_type, title) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id,
                    content,
                    created_at,
                    password,
                    protected,
                    code_type.as_str(),
                    title
                ],
            )
            .await?;

        info!(id = %id, code_type = %code_type, protected, "page created");
        Ok(CreatedPage { id, password })
    }

    /// Fetches a page by id. An unknown id is `Ok(None)`, not an error.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Page>> {
        self.db
            .get_one(
                "SELECT id, html_content, created_at, password, is_protected, code_type, title \
                 FROM pages WHERE id = ?1",
                rusqlite::params![id],
                map_page,
            )
            .await
    }

    /// Returns the newest `limit` pages as `(id, created_at)` pairs.
    pub async fn get_recent(&self, limit: u32) -> Result<Vec<RecentPage>> {
        self.db
            .query(
                "SELECT id, created_at FROM pages ORDER BY created_at DESC LIMIT ?1",
                rusqlite::params![i64::from(limit)],
                |row| {
                    Ok(RecentPage {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                    })
                },
            )
            .await
    }

    /// Returns one page of the admin listing, newest first.
    ///
    /// A non-empty `search` filters rows whose id or title contains the
    /// term as a substring; the total is computed with the same filter
    /// before pagination. Pages are numbered from 1.
    pub async fn list_paged(&self, page: u32, limit: u32, search: &str) -> Result<PageList> {
        let page = page.max(1);
        let limit = limit.max(1);
        let offset = i64::from(page - 1) * i64::from(limit);

        let (total, rows) = if search.is_empty() {
            let total = self
                .db
                .get_one("SELECT COUNT(*) FROM pages", rusqlite::params![], count_row)
                .await?;
            let rows = self
                .db
                .query(
                    "SELECT id, created_at, is_protected, code_type, title, password \
                     FROM pages ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                    rusqlite::params![i64::from(limit), offset],
                    map_listing,
                )
                .await?;
            (total, rows)
        } else {
            let pattern = format!("%{search}%");
            let total = self
                .db
                .get_one(
                    "SELECT COUNT(*) FROM pages WHERE id LIKE ?1 OR title LIKE ?2",
                    rusqlite::params![pattern, pattern],
                    count_row,
                )
                .await?;
            let rows = self
                .db
                .query(
                    "SELECT id, created_at, is_protected, code_type, title, password \
                     FROM pages WHERE id LIKE ?1 OR title LIKE ?2 \
                     ORDER BY created_at DESC LIMIT ?3 OFFSET ?4",
                    rusqlite::params![pattern, pattern, i64::from(limit), offset],
                    map_listing,
                )
                .await?;
            (total, rows)
        };

        let total = to_count(total);
        let total_pages = total.div_ceil(u64::from(limit));
        debug!(page, limit, search, total, "listed pages");

        Ok(PageList {
            pages: rows,
            total,
            total_pages,
            current_page: u64::from(page),
        })
    }

    /// Deletes one page. Returns `true` iff a row was removed.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let result = self
            .db
            .execute("DELETE FROM pages WHERE id = ?1", rusqlite::params![id])
            .await?;
        let removed = result.rows_affected > 0;
        info!(id = %id, removed, "page delete");
        Ok(removed)
    }

    /// Deletes every listed page in one statement and returns how many rows
    /// were removed. An empty list is a no-op that never reaches the store.
    pub async fn batch_delete(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("DELETE FROM pages WHERE id IN ({placeholders})");
        let params: Vec<&dyn ToSql> = ids.iter().map(|id| id as &dyn ToSql).collect();

        let result = self.db.execute(&sql, params.as_slice()).await?;
        info!(
            requested = ids.len(),
            deleted = result.rows_affected,
            "batch page delete"
        );
        Ok(result.rows_affected as u64)
    }

    /// Aggregates page statistics: totals, protection split, recency
    /// windows, and per-kind counts (largest first).
    pub async fn stats(&self) -> Result<Stats> {
        let total = to_count(
            self.db
                .get_one("SELECT COUNT(*) FROM pages", rusqlite::params![], count_row)
                .await?,
        );
        let protected_count = to_count(
            self.db
                .get_one(
                    "SELECT COUNT(*) FROM pages WHERE is_protected = 1",
                    rusqlite::params![],
                    count_row,
                )
                .await?,
        );

        let seven_days_ago = Utc::now().timestamp_millis() - 7 * 24 * 60 * 60 * 1000;
        let recent_count = to_count(
            self.db
                .get_one(
                    "SELECT COUNT(*) FROM pages WHERE created_at > ?1",
                    rusqlite::params![seven_days_ago],
                    count_row,
                )
                .await?,
        );

        let midnight = local_midnight_ms();
        let today_count = to_count(
            self.db
                .get_one(
                    "SELECT COUNT(*) FROM pages WHERE created_at > ?1",
                    rusqlite::params![midnight],
                    count_row,
                )
                .await?,
        );

        let type_stats = self
            .db
            .query(
                "SELECT code_type, COUNT(*) as count FROM pages \
                 GROUP BY code_type ORDER BY count DESC",
                rusqlite::params![],
                |row| {
                    Ok(TypeCount {
                        code_type: row
                            .get::<_, Option<String>>(0)?
                            .unwrap_or_else(|| CodeType::Html.as_str().to_string()),
                        count: u64::try_from(row.get::<_, i64>(1)?).unwrap_or(0),
                    })
                },
            )
            .await?;

        Ok(Stats {
            total,
            protected_count,
            unprotected_count: total.saturating_sub(protected_count),
            recent_count,
            today_count,
            type_stats,
        })
    }
}

fn map_page(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        password: row.get(3)?,
        is_protected: row.get::<_, Option<i64>>(4)?.unwrap_or(0) != 0,
        code_type: row
            .get::<_, Option<String>>(5)?
            .unwrap_or_else(|| CodeType::Html.as_str().to_string()),
        title: row
            .get::<_, Option<String>>(6)?
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    })
}

fn map_listing(row: &Row<'_>) -> rusqlite::Result<PageListing> {
    let created_at: i64 = row.get(1)?;
    Ok(PageListing {
        id: row.get(0)?,
        created_at,
        created_at_formatted: format_local_ms(created_at),
        is_protected: row.get::<_, Option<i64>>(2)?.unwrap_or(0) != 0,
        code_type: row
            .get::<_, Option<String>>(3)?
            .unwrap_or_else(|| CodeType::Html.as_str().to_string()),
        title: row
            .get::<_, Option<String>>(4)?
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        password: row.get(5)?,
    })
}

fn count_row(row: &Row<'_>) -> rusqlite::Result<i64> {
    row.get(0)
}

fn to_count(value: Option<i64>) -> u64 {
    value.and_then(|n| u64::try_from(n).ok()).unwrap_or(0)
}

/// Derives the shareable short id from the content and creation time.
fn derive_id(content: &str, timestamp_ms: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(timestamp_ms.to_string().as_bytes());
    let digest = hasher.finalize();
    format!("{digest:x}")[..ID_CHARS].to_string()
}

/// Generates a page password of [`PASSWORD_DIGITS`] decimal digits.
fn generate_password() -> String {
    let mut rng = rand::thread_rng();
    (0..PASSWORD_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Derives a display title from page content. Never fails.
///
/// Tries, in order: the text of a `<title>` tag (entities stripped), the
/// text of the first `<h1>` (nested tags stripped), the first
/// [`SNIPPET_TITLE_CHARS`] characters of the tag-stripped body (with an
/// ellipsis when truncated), and finally [`DEFAULT_TITLE`].
pub(crate) fn extract_title(content: &str) -> String {
    if let Some(m) = TITLE_RE.captures(content).and_then(|c| c.get(1)) {
        if !m.as_str().is_empty() {
            let cleaned = ENTITY_RE.replace_all(m.as_str().trim(), "");
            return truncate_chars(&cleaned, MAX_TITLE_CHARS);
        }
    }

    if let Some(m) = H1_RE.captures(content).and_then(|c| c.get(1)) {
        if !m.as_str().is_empty() {
            let cleaned = TAG_RE.replace_all(m.as_str().trim(), "");
            return truncate_chars(&cleaned, MAX_TITLE_CHARS);
        }
    }

    let text = TAG_RE.replace_all(content, "");
    let text = text.trim();
    if !text.is_empty() {
        let prefix = truncate_chars(text, SNIPPET_TITLE_CHARS);
        if text.chars().count() > SNIPPET_TITLE_CHARS {
            return format!("{prefix}...");
        }
        return prefix;
    }

    DEFAULT_TITLE.to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn format_local_ms(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map_or_else(String::new, |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn local_midnight_ms() -> i64 {
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map_or(0, |dt| dt.timestamp_millis())
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Kind of content a page holds. Stored as a lowercase string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    /// Plain markup, the base kind.
    #[default]
    Html,
    /// Markdown source rendered client-side.
    Markdown,
    /// Standalone vector graphic.
    Svg,
    /// Diagram source.
    Mermaid,
}

impl CodeType {
    /// The string stored in the `code_type` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
            Self::Svg => "svg",
            Self::Mermaid => "mermaid",
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Html),
            "markdown" => Ok(Self::Markdown),
            "svg" => Ok(Self::Svg),
            "mermaid" => Ok(Self::Mermaid),
            other => Err(Error::Other(format!(
                "unknown code type '{other}' (expected html, markdown, svg, or mermaid)"
            ))),
        }
    }
}

/// A stored page.
///
/// `code_type` stays a raw string on the way out so that legacy rows with
/// unrecognized kinds remain readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub content: String,
    /// Milliseconds since the epoch.
    pub created_at: i64,
    /// Always generated at creation; nullable only for legacy rows.
    pub password: Option<String>,
    pub is_protected: bool,
    pub code_type: String,
    pub title: String,
}

/// Identifier and credential handed back by a successful create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedPage {
    pub id: String,
    pub password: String,
}

/// One row of the newest-first recency listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentPage {
    pub id: String,
    pub created_at: i64,
}

/// One row of the paginated admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageListing {
    pub id: String,
    pub created_at: i64,
    /// Local-time rendering of `created_at` for display.
    pub created_at_formatted: String,
    pub is_protected: bool,
    pub code_type: String,
    pub title: String,
    pub password: Option<String>,
}

/// A page of listing rows plus pagination bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageList {
    pub pages: Vec<PageListing>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Page count for one content kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeCount {
    pub code_type: String,
    pub count: u64,
}

/// Aggregate statistics over all pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub protected_count: u64,
    pub unprotected_count: u64,
    /// Pages created in the last 7 days.
    pub recent_count: u64,
    /// Pages created since local midnight.
    pub today_count: u64,
    /// Per-kind counts, largest first.
    pub type_stats: Vec<TypeCount>,
}

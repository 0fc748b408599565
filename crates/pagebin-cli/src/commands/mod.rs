//! Command implementations, one module per subcommand.

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod recent;
pub mod stats;

use chrono::{Local, TimeZone};

/// Renders an epoch-millisecond timestamp in local time for display.
pub(crate) fn format_timestamp(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map_or_else(|| ms.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

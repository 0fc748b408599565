//! Recent command implementation

use anyhow::Result;
use pagebin_core::Pages;

use super::format_timestamp;

/// Lists the newest pages, one per line.
pub async fn execute(pages: &Pages, limit: u32, json: bool) -> Result<()> {
    let recent = pages.get_recent(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recent)?);
        return Ok(());
    }

    if recent.is_empty() {
        println!("no pages stored yet");
        return Ok(());
    }

    for page in recent {
        println!("{}  {}", page.id, format_timestamp(page.created_at));
    }
    Ok(())
}

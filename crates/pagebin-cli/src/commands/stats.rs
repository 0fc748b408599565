//! Statistics command implementation

use anyhow::Result;
use pagebin_core::Pages;

/// Prints aggregate page statistics.
pub async fn execute(pages: &Pages, json: bool) -> Result<()> {
    let stats = pages.stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("total pages:     {}", stats.total);
    println!("protected:       {}", stats.protected_count);
    println!("unprotected:     {}", stats.unprotected_count);
    println!("last 7 days:     {}", stats.recent_count);
    println!("created today:   {}", stats.today_count);

    if !stats.type_stats.is_empty() {
        println!();
        println!("by content kind:");
        for kind in &stats.type_stats {
            println!("  {:10} {}", kind.code_type, kind.count);
        }
    }
    Ok(())
}

//! List command implementation

use anyhow::Result;
use pagebin_core::Pages;

/// Pages through the stored pages, optionally filtered by a search term.
pub async fn execute(pages: &Pages, page: u32, limit: u32, search: &str, json: bool) -> Result<()> {
    let list = pages.list_paged(page, limit, search).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    if list.pages.is_empty() {
        if search.is_empty() {
            println!("no pages stored yet");
        } else {
            println!("no pages match '{search}'");
        }
        return Ok(());
    }

    for row in &list.pages {
        let lock = if row.is_protected { "locked" } else { "open" };
        println!(
            "{}  {}  {:8}  {:6}  {}",
            row.id, row.created_at_formatted, row.code_type, lock, row.title
        );
    }
    println!();
    println!(
        "page {} of {} ({} total)",
        list.current_page, list.total_pages, list.total
    );
    Ok(())
}

//! Delete command implementation

use anyhow::Result;
use pagebin_core::Pages;
use serde_json::json;

/// Deletes one or more pages by id.
///
/// A single id reports whether that page existed; multiple ids are removed
/// in one batch and only the count is reported.
pub async fn execute(pages: &Pages, ids: &[String], json_output: bool) -> Result<()> {
    if let [id] = ids {
        let removed = pages.delete_by_id(id).await?;
        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "id": id, "deleted": removed }))?
            );
        } else if removed {
            println!("deleted {id}");
        } else {
            println!("no page with id {id}");
        }
        return Ok(());
    }

    let deleted = pages.batch_delete(ids).await?;
    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "deleted_count": deleted }))?
        );
    } else {
        println!("deleted {deleted} of {} pages", ids.len());
    }
    Ok(())
}

//! Get command implementation

use anyhow::Result;
use pagebin_core::{Error, Pages};

use super::format_timestamp;

/// Prints one page by id. An unknown id is a hard error here, unlike in the
/// repository.
pub async fn execute(pages: &Pages, id: &str, json: bool) -> Result<()> {
    let page = pages
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("page '{id}'")))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        println!("id:        {}", page.id);
        println!("title:     {}", page.title);
        println!("created:   {}", format_timestamp(page.created_at));
        println!("type:      {}", page.code_type);
        println!("protected: {}", page.is_protected);
        println!();
        println!("{}", page.content);
    }
    Ok(())
}

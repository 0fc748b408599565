//! Create command implementation

use anyhow::{Context, Result};
use pagebin_core::{CodeType, Pages};
use std::io::Read;
use std::path::Path;

/// Stores a new page from a file or stdin and prints the id and password.
pub async fn execute(
    pages: &Pages,
    file: Option<&Path>,
    protect: bool,
    code_type: CodeType,
    json: bool,
) -> Result<()> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read content from stdin")?;
            buffer
        },
    };

    let created = pages.create(&content, protect, code_type).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&created)?);
    } else {
        println!("id:       {}", created.id);
        println!("password: {}", created.password);
        if protect {
            println!("viewers must present the password");
        }
    }
    Ok(())
}

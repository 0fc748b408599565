//! Command-line interface definitions

use clap::{Parser, Subcommand};
use pagebin_core::CodeType;
use std::path::PathBuf;

/// Top-level argument parser.
#[derive(Debug, Parser)]
#[command(
    name = "pagebin",
    about = "Admin console for the pagebin page store",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store a new page from a file or stdin
    Create {
        /// Read content from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,

        /// Require the generated password for viewing
        #[arg(long)]
        protect: bool,

        /// Content kind: html, markdown, svg, or mermaid
        #[arg(long = "type", value_name = "KIND", default_value = "html")]
        code_type: CodeType,
    },

    /// Print a stored page
    Get {
        /// Short page id
        id: String,
    },

    /// List the newest pages
    Recent {
        /// How many pages to show
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },

    /// Page through all stored pages, optionally filtered
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Rows per page
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Substring to match against ids and titles
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Delete pages by id
    Delete {
        /// One or more short page ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show aggregate statistics
    Stats,
}

//! pagebin CLI - admin console for the page store
//!
//! This is the main entry point for the pagebin command-line interface.
//! Command implementations are organized in separate modules under
//! `commands`.

use anyhow::Result;
use clap::Parser;
use pagebin_core::{Config, Db, Pages};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let config = Config::load()?;
    let db = Db::open(&config.store.path, config.store.settings())?;
    let pages = Pages::new(db);

    match cli.command {
        Commands::Create {
            file,
            protect,
            code_type,
        } => commands::create::execute(&pages, file.as_deref(), protect, code_type, cli.json).await,

        Commands::Get { id } => commands::get::execute(&pages, &id, cli.json).await,

        Commands::Recent { limit } => commands::recent::execute(&pages, limit, cli.json).await,

        Commands::List {
            page,
            limit,
            search,
        } => commands::list::execute(&pages, page, limit, &search, cli.json).await,

        Commands::Delete { ids } => commands::delete::execute(&pages, &ids, cli.json).await,

        Commands::Stats => commands::stats::execute(&pages, cli.json).await,
    }
}

fn initialize_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // Logs go to stderr so --json output stays machine-readable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

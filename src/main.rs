//! # Orphan Links CLI (`olm`)
//!
//! Finds documents nothing links to and suggests sentences in other
//! documents where a link to them would fit.
//!
//! ## Usage
//!
//! ```bash
//! olm --config ./config/olm.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `olm init` | Create the SQLite database and run schema migrations |
//! | `olm import <file.json>` | Load host documents from a JSON array |
//! | `olm scan` | Recount inbound links and refresh orphan records |
//! | `olm orphans` | List orphaned documents, newest first |
//! | `olm suggest <id>` | Regenerate link suggestions for a document |
//! | `olm suggestions <id>` | Show stored suggestions for a document |
//! | `olm review <id> <status>` | Accept, reject, or reset a suggestion |
//! | `olm report` | Orphan report as JSON |
//! | `olm serve` | Start the JSON HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! olm init
//! olm import ./export/posts.json
//! olm scan --progress human
//! olm orphans --limit 50
//! olm suggest 42
//! olm review 7 accepted
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use orphan_links::progress::ProgressMode;
use orphan_links::{config, db, import, migrate, orphans, scan, server, sqlite_store, suggest};
use orphan_links_core::orphans::DEFAULT_REPORT_LIMIT;

/// Orphan Links: find orphaned pages and suggest internal links to them.
#[derive(Parser)]
#[command(
    name = "olm",
    about = "Orphan Links: find orphaned pages and suggest internal links to them",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/olm.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the documents, link_pages, and
    /// link_suggestions tables. Safe to run more than once.
    Init,

    /// Import documents from a JSON file.
    Import {
        /// JSON array of `{id, title, body, type, status, published_at, permalink}`.
        file: PathBuf,
    },

    /// Count inbound links for every published document.
    Scan {
        /// Documents per batch. Defaults to `[analysis].batch_size`.
        #[arg(long)]
        batch_size: Option<usize>,

        /// Scan a single batch starting at this offset and print its outcome.
        #[arg(long)]
        offset: Option<usize>,

        /// Progress output on stderr: `off`, `human`, or `json`.
        /// Defaults to human on a TTY, off otherwise.
        #[arg(long)]
        progress: Option<String>,
    },

    /// List orphaned documents.
    Orphans {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Print only the number of orphans.
        #[arg(long)]
        count: bool,

        #[arg(long)]
        json: bool,
    },

    /// Regenerate link suggestions for a target document.
    Suggest {
        /// Target document id.
        target: i64,

        #[arg(long)]
        json: bool,
    },

    /// Show stored suggestions for a target document.
    Suggestions {
        /// Target document id.
        target: i64,

        /// `pending`, `accepted`, `rejected`, or `all`.
        #[arg(long, default_value = "pending")]
        status: String,

        #[arg(long)]
        json: bool,
    },

    /// Set a suggestion's status.
    Review {
        /// Suggestion id.
        id: i64,

        /// `pending`, `accepted`, or `rejected`.
        status: String,
    },

    /// Print the orphan report as JSON.
    Report {
        #[arg(long, default_value_t = DEFAULT_REPORT_LIMIT)]
        limit: usize,
    },

    /// Start the JSON HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("orphan_links=info,orphan_links_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { file } => {
            let pool = db::connect(&cfg).await?;
            let store = sqlite_store::SqliteStore::new(pool, cfg.site.root_url.clone());
            let summary = import::run_import(&store, &file).await?;
            println!(
                "Imported {} documents ({} published).",
                summary.imported, summary.published
            );
        }
        Commands::Scan {
            batch_size,
            offset,
            progress,
        } => {
            let mode = ProgressMode::from_flag(progress.as_deref())?;
            scan::run_scan(&cfg, batch_size, offset, mode).await?;
        }
        Commands::Orphans {
            limit,
            offset,
            count,
            json,
        } => {
            orphans::run_orphans(&cfg, limit, offset, count, json).await?;
        }
        Commands::Suggest { target, json } => {
            suggest::run_generate(&cfg, target, json).await?;
        }
        Commands::Suggestions {
            target,
            status,
            json,
        } => {
            suggest::run_list(&cfg, target, &status, json).await?;
        }
        Commands::Review { id, status } => {
            suggest::run_review(&cfg, id, &status).await?;
        }
        Commands::Report { limit } => {
            orphans::run_report(&cfg, limit).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

/// Categorize financial statement line items and learn from corrections.
#[derive(Parser)]
#[command(name = "stmtcat", version, about, long_about = None)]
pub struct Cli {
    /// Learning database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// TOML file overriding keyword sets and scoring constants
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Categorize a JSON request (`{"csv_data": [...], "file_type": "..."}`)
    Categorize {
        /// Request file; `-` reads stdin
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Overrides the request's file_type
        #[arg(long)]
        file_type: Option<String>,
    },

    /// Record a user correction
    Learn {
        #[arg(long)]
        account_name: Option<String>,

        #[arg(long)]
        file_type: Option<String>,

        /// One of income, expense, net_income, uncategorized
        #[arg(long)]
        category: Option<String>,
    },

    /// Print stored history for a statement type
    History {
        #[arg(long, default_value = stmtcat_engine::api::DEFAULT_FILE_TYPE)]
        file_type: String,
    },
}

fn default_db_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("com", "stmtcat", "stmtcat")
        .context("Failed to resolve data directory")?;
    let data_dir = project_dirs.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    Ok(data_dir.join("learning.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose; logs go to stderr so stdout stays JSON.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    let engine = commands::open_engine(&db_path, cli.config.as_deref()).await?;

    match cli.command {
        Commands::Categorize { input, file_type } => {
            commands::cmd_categorize(&engine, &input, file_type).await
        }
        Commands::Learn {
            account_name,
            file_type,
            category,
        } => commands::cmd_learn(&engine, account_name, file_type, category).await,
        Commands::History { file_type } => commands::cmd_history(&engine, &file_type).await,
    }
}

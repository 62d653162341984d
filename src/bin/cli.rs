use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trivia_api::config::DatabaseSettings;
use trivia_api::db;
use trivia_api::telemetry::init_tracing;
use trivia_api::transfer::{export_data, import_data};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database URL, e.g. sqlite:trivia.db
    database_url: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace categories and questions with the CSV files in a directory
    Import { path: PathBuf },
    /// Write categories and questions as CSV files into a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = DatabaseSettings {
        url: cli.database_url,
        max_connections: 1,
    };
    let pool = db::establish_connection(&settings)
        .await
        .context("Cannot connect to DB")?;
    match cli.command {
        Commands::Export { path } => export_data(&pool, &path).await.context("Cannot export"),
        Commands::Import { path } => {
            db::run_migrations(&pool).await?;
            import_data(&pool, &path).await.context("Cannot import")
        }
    }
}

//! Ranked battle season notice collector CLI
//!
//! Local execution entry point. For AWS Lambda, use `rankbattle-lambda`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rankbattle_crawler::{
    error::Result,
    models::Config,
    pipeline,
    services::{NetlifyPublisher, PublishCredentials},
    storage::LocalStorage,
    utils::http::{self, HttpFetcher},
};

/// rankbattle - Ranked battle season notice collector
#[derive(Parser, Debug)]
#[command(
    name = "rankbattle",
    version,
    about = "Collects ranked-battle season notices and publishes the season to regulation table"
)]
struct Cli {
    /// Path to storage directory holding config.toml and the store
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect new season notices and rebuild the table
    Scrape,

    /// List stored season notices
    List,

    /// Print the season to regulation table
    Json {
        /// Also write the compact table to this file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Publish the table to the static site
    Deploy,

    /// Validate configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    init_logging(cli.verbose, &config.logging.level);

    log::debug!("Loaded configuration from {}", config_path.display());

    match cli.command {
        Command::Scrape => {
            let storage = LocalStorage::open(&cli.storage_dir).await?;
            let fetcher = HttpFetcher::from_config(&config.crawler)?;

            let report = pipeline::run_scrape(&config, &fetcher, &storage).await?;
            log::info!(
                "Scrape complete: {} new, table has {} season(s)",
                report.new_count,
                report.table_size
            );
        }

        Command::List => {
            let storage = LocalStorage::open(&cli.storage_dir).await?;
            let announcements = pipeline::run_list(&storage).await?;

            if announcements.is_empty() {
                log::info!("No season notices stored yet.");
            }
            for announcement in &announcements {
                println!("{}", announcement.summary());
            }
        }

        Command::Json { output } => {
            let storage = LocalStorage::open(&cli.storage_dir).await?;
            let table = pipeline::run_json(&storage).await?;

            println!("{}", serde_json::to_string_pretty(&table)?);

            if let Some(path) = output {
                tokio::fs::write(&path, table.to_json_bytes()?).await?;
                log::info!("Table written to {}", path.display());
            }
        }

        Command::Deploy => {
            let credentials = PublishCredentials::from_env()?;
            let storage = LocalStorage::open(&cli.storage_dir).await?;
            let client = http::create_async_client(&config.crawler)?;
            let publisher = NetlifyPublisher::new(client, &config.publish, credentials);

            let report = pipeline::run_deploy(&config, &storage, &publisher).await?;
            log::info!(
                "Deploy {} complete ({})",
                report.deploy_id,
                if report.uploaded { "uploaded" } else { "unchanged" }
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}

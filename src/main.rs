// sitebot: scrape a website into a structured business record.
//
// Serves the HTTP surface by default; `sitebot scrape <url>` runs once and
// prints the record as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kodegen_tools_sitebot::server::{self, AppState};
use kodegen_tools_sitebot::{SiteBotConfig, build_scraper};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sitebot")]
#[command(about = "Crawl a website and extract a business record")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve {
        /// Overrides SITEBOT_BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },

    /// Scrape one site and print the record
    Scrape { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = SiteBotConfig::from_env().context("Invalid configuration")?;
    info!(
        generative = config.generative_enabled(),
        max_pages = config.max_pages(),
        "Configuration loaded"
    );

    match cli.command.unwrap_or(Commands::Serve { bind: None }) {
        Commands::Scrape { url } => {
            let scraper = build_scraper(config)?;
            let record = scraper.scrape(&url).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr().to_string());
            let scraper = build_scraper(config)?;
            server::serve(AppState::new(scraper), &bind_addr).await?;
        }
    }
    Ok(())
}

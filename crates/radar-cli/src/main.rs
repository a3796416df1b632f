//! Command-line interface for invest-radar
//!
//! ```bash
//! radar stock eqnr --days 10
//! radar analyze eqnr "How exposed is the company to gas prices?"
//! ```

mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use radar_client::{RadarClient, TickerNormalizer};
use radar_core::{AnalysisEvent, AnalysisTranscript};
use radar_utils::LogFormat;
use std::io::Write;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "radar")]
#[command(about = "Look up Oslo Børs stocks and stream AI analyses", long_about = None)]
#[command(version)]
struct Cli {
    /// Server base URL, overrides RADAR_SERVER_URL
    #[arg(long)]
    server: Option<String>,

    /// Market suffix appended to bare tickers, overrides RADAR_MARKET_SUFFIX
    #[arg(long)]
    suffix: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the latest quote and recent closing prices
    Stock {
        /// Ticker, e.g. EQNR or EQNR.OL
        ticker: String,

        /// Number of history points to show
        #[arg(short, long, default_value_t = 10)]
        days: usize,
    },

    /// Stream a search-grounded analysis
    Analyze {
        /// Ticker used to look up the company name
        ticker: String,

        /// Question to ask about the stock
        query: String,

        /// Company name to analyze, skips the quote lookup
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = radar_utils::env_parse("RADAR_LOG_FORMAT", LogFormat::Pretty);
    radar_utils::init_tracing_with(format, "warn");

    let cli = Cli::parse();
    let client = match cli.server.as_deref() {
        Some(url) => RadarClient::new(url)?,
        None => RadarClient::from_env()?,
    };
    let normalizer = cli
        .suffix
        .map_or_else(TickerNormalizer::from_env, TickerNormalizer::new);
    debug!(server = %client.base_url(), suffix = normalizer.suffix(), "Client ready");

    match cli.command {
        Commands::Stock { ticker, days } => {
            let ticker = normalizer.normalize(&ticker);
            show_stock(&client, &ticker, days).await
        }
        Commands::Analyze {
            ticker,
            query,
            name,
        } => {
            let name = match name {
                Some(name) => name,
                None => {
                    let ticker = normalizer.normalize(&ticker);
                    let snapshot = client
                        .fetch_stock(&ticker)
                        .await
                        .with_context(|| format!("could not look up {ticker}"))?;
                    snapshot.stock.name
                }
            };
            run_analysis(&client, &name, &query).await
        }
    }
}

async fn show_stock(client: &RadarClient, ticker: &str, days: usize) -> anyhow::Result<()> {
    let snapshot = client.fetch_stock(ticker).await?;

    println!("{}", render::quote_table(&snapshot.stock));
    if days > 0 && !snapshot.history.is_empty() {
        println!("{}", render::history_table(&snapshot.history, days));
    }
    Ok(())
}

async fn run_analysis(client: &RadarClient, name: &str, query: &str) -> anyhow::Result<()> {
    debug!(stock = name, "Starting analysis");

    let mut events = client.analyze(name, query).await;
    let mut transcript = AnalysisTranscript::new();
    let mut stdout = std::io::stdout();

    while let Some(event) = events.next().await {
        transcript.apply(&event);
        if let AnalysisEvent::Text { text } = &event {
            write!(stdout, "{text}")?;
            stdout.flush()?;
        }
    }

    println!();
    let sources = render::source_list(transcript.sources());
    if !sources.is_empty() {
        println!("\n{sources}");
    }

    if transcript.has_error() {
        anyhow::bail!("analysis did not complete: {}", transcript.errors().join("; "));
    }
    Ok(())
}

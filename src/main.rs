//! get-papers-list - fetch PubMed papers with non-academic authors
//!
//! ## Usage
//! ```bash
//! get-papers-list "cancer immunotherapy 2023" -f results.csv
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pubmed_papers::config::Config;
use pubmed_papers::eutils::EutilsClient;
use pubmed_papers::pipeline::{ErrorPolicy, Output, Pipeline};
use pubmed_papers::RecordLayout;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Fetch PubMed papers based on a search query.
#[derive(Parser)]
#[command(name = "get-papers-list")]
#[command(version, about, long_about = None)]
struct Cli {
    /// PubMed search query
    query: String,

    /// Output CSV filename (prints to the console when omitted)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Only write identifier, title and publication date
    #[arg(long)]
    basic: bool,

    /// Stop at the first failed stage instead of continuing with empty results
    #[arg(long)]
    strict: bool,

    /// Maximum number of papers to fetch
    #[arg(long)]
    retmax: Option<usize>,

    /// Contact email sent to NCBI
    #[arg(long, env = "PUBMED_EMAIL")]
    email: Option<String>,

    /// NCBI API key
    #[arg(long, env = "PUBMED_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Config file (default: ~/.pubmed_papers.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli);

    let layout = if cli.basic { RecordLayout::Basic } else { RecordLayout::Full };
    let policy = if cli.strict { ErrorPolicy::Strict } else { ErrorPolicy::Lenient };
    let output = cli.file.map(Output::Csv).unwrap_or(Output::Console);

    let client = EutilsClient::new(config).context("Failed to create E-utilities client")?;
    let pipeline = Pipeline::new(client, layout, policy);

    let records = pipeline.run(&cli.query).await.context("Failed to fetch papers")?;
    pipeline.emit(&records, &output).context("Failed to write results")?;
    Ok(())
}

/// The single line a failed run prints
fn failure_message(e: &anyhow::Error) -> String {
    format!("Error: {:#}", e)
}

/// Config file values overlaid with command-line values
fn build_config(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };

    if let Some(retmax) = cli.retmax {
        config.retmax = retmax;
    }
    if cli.email.is_some() {
        config.email = cli.email.clone();
    }
    if cli.api_key.is_some() {
        config.api_key = cli.api_key.clone();
    }
    config
}

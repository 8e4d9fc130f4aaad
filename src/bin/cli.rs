//! CLI binary for pricecheck.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pricecheck::{AppConfig, build_sources, source_status};
use pricecheck_core::ComparisonRequest;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// pricecheck: find the cheapest listings for a product across marketplaces.
#[derive(Parser)]
#[command(name = "pricecheck", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Compare prices for a product and print the ranked listings as JSON.
    Compare {
        /// Product name, e.g. `Sony WH-1000XM5 headphones`.
        #[arg(required = true, num_args = 1..)]
        product: Vec<String>,

        /// Force the mock marketplace on.
        #[arg(long)]
        mock: bool,

        /// Drop listings whose title does not mention the brand or model.
        #[arg(long)]
        strict: bool,

        /// Maximum number of listings to print.
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Show which marketplaces are configured.
    Sources,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pricecheck=info,pricecheck_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Compare {
            product,
            mock,
            strict,
            max_results,
        } => {
            config.sources.mock_mode |= mock;
            config.compare.relevance_filter |= strict;
            if let Some(max_results) = max_results {
                config.compare.max_results = max_results;
            }
            run_compare(&config, product.join(" ")).await
        }
        Command::Sources => list_sources(&config),
    }
}

async fn run_compare(config: &AppConfig, product_name: String) -> anyhow::Result<()> {
    let sources = build_sources(config)?;
    let request = ComparisonRequest { product_name };
    let product_name = request.product_name()?;

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, cancelling comparison");
            cancel_clone.cancel();
        }
    });

    let result =
        pricecheck_core::compare_with_cancel(product_name, &sources, &config.compare, &cancel)
            .await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn list_sources(config: &AppConfig) -> anyhow::Result<()> {
    let sources = build_sources(config)?;
    println!("{}", serde_json::to_string_pretty(&source_status(&sources))?);
    Ok(())
}

//! reply-cli: batch generation and reporting over the reply store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use reply_gateway::batch::BatchRunner;
use reply_gateway::config::ReplyConfig;
use reply_gateway::domain::{Platform, format_timestamp};
use reply_gateway::persistence::{self, ReplyQuery, ReplyStore};
use reply_gateway::report::{self, ReportSummary, preview};
use reply_gateway::service::ReplyService;
use reply_gateway::telemetry;

/// Batch and reporting utilities for reply-gateway.
///
/// Store and generator settings come from the same environment variables
/// (or `.env`) as the server. Only `batch` needs generator credentials.
#[derive(Debug, Parser)]
#[command(name = "reply-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate and store replies for every row of a CSV file.
    Batch {
        /// CSV file with `platform` and `post_text` columns.
        #[arg(default_value = "posts.csv")]
        csv: PathBuf,
        /// Process at most this many usable rows (0 = all).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print totals and export every stored reply to CSV.
    Report {
        /// Destination CSV file.
        #[arg(long, short, default_value = "report.csv")]
        output: PathBuf,
        /// Number of recent replies to print.
        #[arg(long, default_value_t = 5)]
        sample: u32,
    },
    /// Print the most recent stored replies.
    Recent {
        /// Number of replies to print.
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Only replies for this platform.
        #[arg(long)]
        platform: Option<Platform>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ReplyConfig::from_env().context("invalid configuration")?;
    telemetry::init(config.log_format).map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Command::Batch { csv, limit } => {
            let service = ReplyService::from_config(&config)
                .await
                .context("cannot start reply service")?;
            let summary = BatchRunner::new(service)
                .run_path(&csv, limit)
                .await
                .with_context(|| format!("batch over {} failed", csv.display()))?;
            println!(
                "Successfully processed {} out of {} posts.",
                summary.succeeded, summary.attempted
            );
        }
        Command::Report { output, sample } => {
            let store = open_store(&config).await?;
            let store = store.as_ref();
            let summary = ReportSummary::collect(store).await?;
            if summary.total == 0 {
                println!("No records found in the database.");
                return Ok(());
            }
            println!("{summary}");
            let written = report::export_csv(store, &output).await?;
            println!("Report saved to {} ({written} rows)", output.display());
            println!("\nSample of generated replies:");
            print_records(store, &ReplyQuery::newest(sample)).await?;
        }
        Command::Recent { limit, platform } => {
            let store = open_store(&config).await?;
            let store = store.as_ref();
            let summary = ReportSummary::collect(store).await?;
            println!("Total records in database: {}", summary.total);
            let mut query = ReplyQuery::newest(limit);
            if let Some(platform) = platform {
                query = query.for_platform(platform);
            }
            println!("\nMost recent records:");
            print_records(store, &query).await?;
        }
    }

    Ok(())
}

/// Opens the reply store alone; reading needs no generator credentials.
async fn open_store(config: &ReplyConfig) -> Result<Arc<dyn ReplyStore>> {
    persistence::open(&config.store)
        .await
        .context("cannot open reply store")
}

async fn print_records(store: &dyn ReplyStore, query: &ReplyQuery) -> Result<()> {
    let records = store.list(query).await?;
    if records.is_empty() {
        println!("No records found in the database.");
    }
    for record in records {
        println!(
            "\n#{} {} at {}",
            record.id,
            record.platform,
            format_timestamp(&record.timestamp)
        );
        println!("Post: {}", preview(&record.post_text, 100));
        println!("Reply: {}", preview(&record.generated_reply, 100));
        println!("{}", "-".repeat(50));
    }
    Ok(())
}

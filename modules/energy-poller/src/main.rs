use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use em6_client::Em6Client;
use energy_poller::{CsvSink, HistorySink, PgSink, PollOutcome, Poller};
use lightyears_common::PollerConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SinkKind {
    Csv,
    Postgres,
}

#[derive(Parser)]
#[command(
    name = "energy-poller",
    about = "Append the latest em6 generation reading when it has changed"
)]
struct Cli {
    /// Where readings are stored
    #[arg(long, value_enum, default_value_t = SinkKind::Csv)]
    sink: SinkKind,

    /// CSV history file (overrides POLLER_CSV_PATH)
    #[arg(long)]
    csv_path: Option<PathBuf>,
}

/// `RUST_LOG` plus info level for this binary and the workspace crates it drives.
fn log_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("energy_poller=info".parse()?)
        .add_directive("em6_client=info".parse()?)
        .add_directive("lightyears_common=info".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    let cli = Cli::parse();
    let config = PollerConfig::from_env()?;

    let source = Arc::new(Em6Client::new(config.feed_url.clone()));

    let sink: Arc<dyn HistorySink> = match cli.sink {
        SinkKind::Csv => {
            let path = cli
                .csv_path
                .unwrap_or_else(|| PathBuf::from(&config.csv_path));
            Arc::new(CsvSink::new(path))
        }
        SinkKind::Postgres => {
            let sink = PgSink::connect(config.require_database_url()?).await?;
            sink.migrate().await?;
            Arc::new(sink)
        }
    };

    info!(feed = %config.feed_url, sink = %sink.describe(), "Energy poller starting");

    match Poller::new(source, sink).run_cycle().await? {
        PollOutcome::NoData => info!("Feed returned no items, nothing to record"),
        PollOutcome::Unchanged { trading_date } => info!(
            trading_date = trading_date.as_deref().unwrap_or(""),
            "Data source has not updated since the last run"
        ),
        PollOutcome::Appended { trading_date, .. } => info!(
            trading_date = trading_date.as_deref().unwrap_or(""),
            "Reading recorded"
        ),
    }

    Ok(())
}

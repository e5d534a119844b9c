use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use lightyears_common::ExtractorConfig;
use notion_client::NotionClient;
use obligation_extractor::{router, AppState, Extractor, HttpAttachmentFetcher, NotionDocumentStore};

#[derive(Parser)]
#[command(
    name = "obligation-extractor",
    about = "Extract contractual obligations from documents queued in Notion"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Listen for webhook triggers (default)
    Serve,
    /// Process every Ready document once and exit
    RunOnce,
}

fn build_extractor(config: &ExtractorConfig) -> Extractor {
    let notion = NotionClient::new(config.notion_api_key.clone());
    let store = NotionDocumentStore::new(notion, config.notion_database_id.clone());
    let analyzer = OpenAi::new(config.openai_api_key.clone(), config.openai_model.clone());

    Extractor::new(
        Arc::new(store),
        Arc::new(HttpAttachmentFetcher::new()),
        Arc::new(analyzer),
    )
}

/// `RUST_LOG` plus info level for this binary and the workspace crates it drives.
fn log_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("obligation_extractor=info".parse()?)
        .add_directive("notion_client=info".parse()?)
        .add_directive("ai_client=info".parse()?)
        .add_directive("lightyears_common=info".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(log_filter()?).init();

    let cli = Cli::parse();
    let config = ExtractorConfig::from_env()?;
    let extractor = build_extractor(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = router(AppState::new(extractor, config.background));
            let addr = format!("{}:{}", config.host, config.port);
            info!(background = config.background, "Obligation extractor listening on {addr}");

            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app).await?;
        }
        Command::RunOnce => {
            let summary = extractor.process_ready_documents().await?;
            info!(
                completed = summary.completed,
                failed = summary.failed,
                skipped = summary.skipped,
                "Run complete"
            );
        }
    }

    Ok(())
}

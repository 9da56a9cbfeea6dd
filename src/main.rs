//! ai-codereview — LLM review comments for pull requests.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! error propagation and user-facing messages.

mod cli;

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use ai_codereview::config::Config;
use ai_codereview::diff::filter::PathFilter;
use ai_codereview::env::Env;
use ai_codereview::github::client::GithubClient;
use ai_codereview::logging;
use ai_codereview::models::EventPayload;
use ai_codereview::orchestrator::{ReviewPipeline, RunOutcome};
use ai_codereview::providers::completion::ChatCompletionsClient;

use cli::args::Cli;

#[tokio::main]
async fn main() {
    logging::init("info");
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        Config::load(cli.config.as_deref(), &Env::real()).context("failed to load config")?;
    cli.apply_overrides(&mut config);
    config.validate().context("invalid configuration")?;

    let event = EventPayload::load(&cli.event_path)
        .await
        .context("failed to load event payload")?;

    // validate() guarantees the token is present
    let token = config.github.token.as_deref().unwrap_or_default();
    let host = GithubClient::new(&config.github.api_url, token)
        .context("failed to create GitHub client")?;
    let provider =
        ChatCompletionsClient::new(&config.model).context("failed to create completion client")?;
    let filter = PathFilter::new(&config.review.exclude).context("invalid exclude pattern")?;

    let pipeline = ReviewPipeline::new(Arc::new(host), Arc::new(provider))
        .with_filter(filter)
        .with_max_concurrent(config.review.max_concurrent)
        .with_dry_run(cli.dry_run);

    match pipeline.run(&event).await.context("review failed")? {
        RunOutcome::DryRun { payload } => {
            let json = serde_json::to_string_pretty(&payload)
                .context("failed to serialize review")?;
            println!("{json}");
        }
        RunOutcome::Published { comments } => {
            info!(comments, "done");
        }
        outcome => info!(?outcome, "done, nothing published"),
    }

    Ok(())
}

//! Clap argument types and how they override loaded configuration.

use clap::Parser;
use std::path::PathBuf;

use ai_codereview::config::Config;
use ai_codereview::constants;
use ai_codereview::diff::filter::parse_patterns;

/// Review a pull request with an LLM and post the comments as one review.
#[derive(Parser, Debug)]
#[command(name = constants::APP_NAME, version = constants::VERSION)]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the CI event payload (JSON).
    #[arg(long, env = constants::ENV_EVENT_PATH)]
    pub event_path: PathBuf,

    /// Comma-separated glob patterns of files to skip. Replaces the
    /// configured list; may be repeated.
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Completion calls allowed in flight at once.
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Review everything but print the review instead of publishing it.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl Cli {
    /// Apply flag values on top of file and environment configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if !self.exclude.is_empty() {
            config.review.exclude = self
                .exclude
                .iter()
                .flat_map(|list| parse_patterns(list))
                .collect();
        }
        if let Some(n) = self.max_concurrent {
            config.review.max_concurrent = n;
        }
    }
}

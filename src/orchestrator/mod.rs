//! Review pipeline: diff retrieval, per-hunk model review, and publication.

pub mod prompt;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::diff::DiffError;
use crate::diff::filter::{PathFilter, reviewable_files};
use crate::diff::parser::parse_unified_diff;
use crate::github::{self, DiffSource, GithubError, PullRequestHost};
use crate::models::diff::FileDiff;
use crate::models::event::EventPayload;
use crate::models::review::{CreateReview, PrDetails, ReviewComment};
use crate::models::Prompt;
use crate::providers::CompletionProvider;

/// Errors that abort a pipeline run.
///
/// Per-hunk model failures are not errors here; they are logged and the
/// hunk contributes no comments.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("GitHub error: {0}")]
    Github(#[from] GithubError),

    #[error(transparent)]
    Diff(#[from] DiffError),
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The event action is not reviewed; nothing was done.
    UnsupportedEvent(String),
    /// No diff was available for the event.
    NoDiff,
    /// Every hunk was reviewed but the model had nothing to say.
    NoComments,
    /// One review holding `comments` comments was created.
    Published { comments: usize },
    /// Publication was skipped; this is the review that would have been sent.
    DryRun { payload: CreateReview },
}

/// One unit of model work: a prompt for a single hunk of a file.
struct HunkTask {
    path: String,
    prompt: Prompt,
}

/// Drives a review run against a hosting API and a completion provider.
pub struct ReviewPipeline {
    host: Arc<dyn PullRequestHost>,
    provider: Arc<dyn CompletionProvider>,
    filter: PathFilter,
    max_concurrent: usize,
    dry_run: bool,
}

impl ReviewPipeline {
    /// Create a pipeline that reviews hunks one at a time and publishes.
    pub fn new(host: Arc<dyn PullRequestHost>, provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            host,
            provider,
            filter: PathFilter::empty(),
            max_concurrent: 1,
            dry_run: false,
        }
    }

    /// Drop files whose destination matches `filter`.
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Allow up to `max_concurrent` completion calls in flight.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Skip publication and return the review payload instead.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the whole review for one CI event.
    pub async fn run(&self, event: &EventPayload) -> Result<RunOutcome, PipelineError> {
        let details = github::get_pr_details(self.host.as_ref(), event).await?;
        info!(
            owner = %details.owner,
            repo = %details.repo,
            number = details.pull_number,
            action = %event.action,
            "reviewing pull request"
        );

        let diff = match github::get_diff(self.host.as_ref(), &details, event).await? {
            DiffSource::Fetched(diff) => diff,
            DiffSource::Unsupported(action) => {
                info!(%action, "unsupported event, nothing to review");
                return Ok(RunOutcome::UnsupportedEvent(action));
            }
            DiffSource::Absent => {
                info!("no diff found");
                return Ok(RunOutcome::NoDiff);
            }
        };

        let files = reviewable_files(parse_unified_diff(&diff)?, &self.filter);
        let tasks = hunk_tasks(&files, &details);
        info!(
            files = files.len(),
            hunks = tasks.len(),
            "diff parsed"
        );

        let comments: Vec<ReviewComment> =
            self.review_hunks(tasks).await.into_iter().flatten().collect();

        if comments.is_empty() {
            info!("no review comments produced");
            return Ok(RunOutcome::NoComments);
        }

        let review = CreateReview::comment(comments);
        if self.dry_run {
            info!(comments = review.comments.len(), "dry run, not publishing");
            return Ok(RunOutcome::DryRun { payload: review });
        }

        self.host
            .create_review(
                &details.owner,
                &details.repo,
                details.pull_number,
                &review,
            )
            .await?;
        info!(comments = review.comments.len(), "review published");
        Ok(RunOutcome::Published {
            comments: review.comments.len(),
        })
    }

    /// Review every task, returning each task's comments in task order.
    async fn review_hunks(&self, tasks: Vec<HunkTask>) -> Vec<Vec<ReviewComment>> {
        if self.max_concurrent <= 1 {
            let mut results = Vec::with_capacity(tasks.len());
            for task in tasks {
                results.push(review_hunk(self.provider.as_ref(), task).await);
            }
            return results;
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut join_set = JoinSet::new();
        let mut results = vec![Vec::new(); tasks.len()];

        for (index, task) in tasks.into_iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let sem = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return (index, Vec::new());
                };
                (index, review_hunk(provider.as_ref(), task).await)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, comments)) => results[index] = comments,
                Err(e) => warn!(error = %e, "review task panicked"),
            }
        }

        results
    }
}

/// Build one task per hunk of every file that has a destination path.
fn hunk_tasks(files: &[FileDiff], details: &PrDetails) -> Vec<HunkTask> {
    files
        .iter()
        .filter_map(|file| file.destination().map(|path| (path, file)))
        .flat_map(|(path, file)| {
            file.hunks.iter().map(move |hunk| HunkTask {
                path: path.to_string(),
                prompt: prompt::build_prompt(path, details, hunk),
            })
        })
        .collect()
}

/// Ask the model about one hunk; failures yield no comments.
async fn review_hunk(provider: &dyn CompletionProvider, task: HunkTask) -> Vec<ReviewComment> {
    match provider.review(&task.prompt).await {
        Ok(reviews) => {
            debug!(path = %task.path, comments = reviews.len(), "hunk reviewed");
            reviews
                .into_iter()
                .map(|review| ReviewComment::from_model(&task.path, review))
                .collect()
        }
        Err(e) => {
            warn!(path = %task.path, error = %e, "hunk review failed, skipping");
            Vec::new()
        }
    }
}

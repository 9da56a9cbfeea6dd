//! Hosting API access: pull request details, diff retrieval, and review
//! publication.
//!
//! [`PullRequestHost`] is the seam between the review pipeline and the
//! REST API; [`client::GithubClient`] is the production implementation.

pub mod client;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::event::{EventPayload, PullRequestAction};
use crate::models::review::{CreateReview, PrDetails};

/// Errors from hosting API calls.
#[derive(Error, Debug)]
pub enum GithubError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{call} failed with HTTP {status}: {body}")]
    Status {
        call: &'static str,
        status: u16,
        body: String,
    },

    #[error("token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("event payload is missing `{0}`")]
    MissingEventField(&'static str),
}

/// Pull request fields returned by the metadata call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct PullRequestInfo {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
}

/// Operations the review pipeline needs from the hosting platform.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Fetch pull request metadata.
    async fn pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestInfo, GithubError>;

    /// Fetch the full pull request diff in diff media format.
    async fn pull_request_diff(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<String, GithubError>;

    /// Compare two commits and return the comparison's diff URL, if any.
    async fn compare_diff_url(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Option<String>, GithubError>;

    /// Download a diff from a URL returned by the API.
    async fn fetch_diff(&self, url: &str) -> Result<String, GithubError>;

    /// Create one review holding all comments.
    async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        review: &CreateReview,
    ) -> Result<(), GithubError>;
}

/// Outcome of diff retrieval for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSource {
    /// Diff text was retrieved.
    Fetched(String),
    /// The event is handled but no diff is available.
    Absent,
    /// The event action is not one this tool reviews.
    Unsupported(String),
}

/// Combine the event payload with one metadata call.
pub async fn get_pr_details(
    host: &dyn PullRequestHost,
    event: &EventPayload,
) -> Result<PrDetails, GithubError> {
    let info = host
        .pull_request(event.owner(), event.repo(), event.number)
        .await?;
    Ok(PrDetails {
        owner: event.owner().to_string(),
        repo: event.repo().to_string(),
        pull_number: event.number,
        title: info.title,
        description: info.body.unwrap_or_default(),
    })
}

/// Retrieve the diff to review for the triggering event.
///
/// `opened` fetches the whole pull request diff. `synchronize` compares
/// the commits before and after the push and downloads the comparison's
/// diff URL; without one the diff is [`DiffSource::Absent`].
pub async fn get_diff(
    host: &dyn PullRequestHost,
    details: &PrDetails,
    event: &EventPayload,
) -> Result<DiffSource, GithubError> {
    match &event.action {
        PullRequestAction::Opened => {
            let diff = host
                .pull_request_diff(&details.owner, &details.repo, details.pull_number)
                .await?;
            debug!(bytes = diff.len(), "fetched pull request diff");
            Ok(non_empty(diff))
        }
        PullRequestAction::Synchronize => {
            let base = event
                .before
                .as_deref()
                .ok_or(GithubError::MissingEventField("before"))?;
            let head = event
                .after
                .as_deref()
                .ok_or(GithubError::MissingEventField("after"))?;

            match host
                .compare_diff_url(&details.owner, &details.repo, base, head)
                .await?
            {
                Some(url) => {
                    debug!(%url, "fetching comparison diff");
                    Ok(non_empty(host.fetch_diff(&url).await?))
                }
                None => {
                    info!(base, head, "comparison returned no diff URL");
                    Ok(DiffSource::Absent)
                }
            }
        }
        PullRequestAction::Other(action) => Ok(DiffSource::Unsupported(action.clone())),
    }
}

fn non_empty(diff: String) -> DiffSource {
    if diff.trim().is_empty() {
        DiffSource::Absent
    } else {
        DiffSource::Fetched(diff)
    }
}

//! `reqwest`-backed REST client for the GitHub API.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::constants;
use crate::models::review::CreateReview;

use super::{GithubError, PullRequestHost, PullRequestInfo};

/// GitHub REST API client authenticated with a token.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

#[derive(Deserialize)]
struct CompareResponse {
    #[serde(default)]
    diff_url: Option<String>,
}

impl GithubClient {
    /// Create a client for `api_url` (e.g. `https://api.github.com`).
    pub fn new(api_url: &str, token: &str) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT));
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| GithubError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{owner}/{repo}", self.api_url)
    }

    /// Send a GET and return the response if the status is a success.
    async fn get(
        &self,
        call: &'static str,
        url: &str,
        accept: &'static str,
    ) -> Result<reqwest::Response, GithubError> {
        debug!(call, url, "GET");
        let response = self.http.get(url).header(ACCEPT, accept).send().await?;
        check_status(call, response).await
    }
}

/// Turn a non-success status into [`GithubError::Status`] carrying the body.
async fn check_status(
    call: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, GithubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    Err(GithubError::Status {
        call,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl PullRequestHost for GithubClient {
    async fn pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestInfo, GithubError> {
        let url = format!("{}/pulls/{number}", self.repo_url(owner, repo));
        let response = self
            .get("get pull request", &url, constants::MEDIA_TYPE_JSON)
            .await?;
        Ok(response.json().await?)
    }

    async fn pull_request_diff(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<String, GithubError> {
        let url = format!("{}/pulls/{number}", self.repo_url(owner, repo));
        let response = self
            .get("get pull request diff", &url, constants::MEDIA_TYPE_DIFF)
            .await?;
        Ok(response.text().await?)
    }

    async fn compare_diff_url(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Option<String>, GithubError> {
        let url = format!("{}/compare/{base}...{head}", self.repo_url(owner, repo));
        let response = self
            .get("compare commits", &url, constants::MEDIA_TYPE_JSON)
            .await?;
        let compare: CompareResponse = response.json().await?;
        Ok(compare.diff_url.filter(|u| !u.is_empty()))
    }

    async fn fetch_diff(&self, url: &str) -> Result<String, GithubError> {
        let response = self
            .get("fetch diff", url, constants::MEDIA_TYPE_DIFF)
            .await?;
        Ok(response.text().await?)
    }

    async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        review: &CreateReview,
    ) -> Result<(), GithubError> {
        let url = format!("{}/pulls/{number}/reviews", self.repo_url(owner, repo));
        debug!(%url, comments = review.comments.len(), "POST review");
        let response = self
            .http
            .post(&url)
            .header(ACCEPT, constants::MEDIA_TYPE_JSON)
            .json(review)
            .send()
            .await?;
        check_status("create review", response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let client = GithubClient::new("https://ghe.example.com/api/v3/", "tok").unwrap();
        assert_eq!(
            client.repo_url("acme", "widgets"),
            "https://ghe.example.com/api/v3/repos/acme/widgets"
        );
    }

    #[test]
    fn new_rejects_token_with_newline() {
        assert!(matches!(
            GithubClient::new("https://api.github.com", "bad\ntoken"),
            Err(GithubError::InvalidToken)
        ));
    }

    #[test]
    fn compare_response_without_diff_url() {
        let parsed: CompareResponse = serde_json::from_str(r#"{"status": "ahead"}"#).unwrap();
        assert!(parsed.diff_url.is_none());
    }

    #[test]
    fn pull_request_info_allows_null_body() {
        let info: PullRequestInfo =
            serde_json::from_str(r#"{"title": "Fix it", "body": null, "number": 3}"#).unwrap();
        assert_eq!(info.title, "Fix it");
        assert!(info.body.is_none());
    }
}

//! GitHub REST API client for publishing radar issues.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Invalid repository '{0}', expected owner/name")]
    InvalidRepo(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Issue fields echoed back by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub html_url: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
struct CreateIssue<'a> {
    title: &'a str,
    body: &'a str,
}

/// Minimal GitHub REST client authenticated with a personal access token.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("radar/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Creates an issue in `repo` (`owner/name`).
    #[instrument(skip(self, body))]
    pub async fn create_issue(
        &self,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<Issue, GitHubError> {
        let (owner, name) = split_repo(repo)?;
        let url = format!("{}/repos/{owner}/{name}/issues", self.api_url);

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&CreateIssue { title, body })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let issue: Issue = resp.json().await?;
        debug!(number = issue.number, "created issue");
        Ok(issue)
    }
}

/// Splits `owner/name`, rejecting anything else.
pub fn split_repo(repo: &str) -> Result<(&str, &str), GitHubError> {
    match repo.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(GitHubError::InvalidRepo(repo.to_owned())),
    }
}

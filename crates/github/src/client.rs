//! HTTP client for the GitHub REST API v3.
//!
//! One request per port call, no retries, no rate limiting: a workflow run
//! makes at most four calls.

use async_trait::async_trait;
use pipeline::{
    CodeRepository, CommitSha, FileCommit, GitHubError, Issue, IssueNumber, IssueTracker,
    LabelName, LabelSet, RepositoryId, SubmissionKind, UserLogin,
};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    ApiErrorBody, ApiIssue, ApiLabel, CommentRequest, CommitIdentity, CreateFileRequest,
    CreateFileResponse, SetLabelsRequest,
};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned via `X-GitHub-Api-Version`.
const API_VERSION: &str = "2022-11-28";

/// Errors constructing a [`GitHubClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The API base URL is not an absolute http(s) URL.
    #[error("invalid GitHub API URL '{0}'")]
    InvalidBaseUrl(String),

    /// The token is empty.
    #[error("GitHub token is empty")]
    EmptyToken,

    /// The HTTP client could not be built (TLS backend failure).
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Settings for [`GitHubClient`].
#[derive(Clone)]
pub struct GitHubClientConfig {
    /// Installation or workflow token.
    pub token: String,
    /// REST base URL, e.g. [`DEFAULT_API_URL`] or a GHES `/api/v3` URL.
    pub api_url: String,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl std::fmt::Debug for GitHubClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClientConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// GitHub REST client implementing [`IssueTracker`] and [`CodeRepository`].
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    token: String,
    base: Url,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Creates a client from `config`.
    pub fn new(config: GitHubClientConfig) -> Result<Self, ClientError> {
        if config.token.is_empty() {
            return Err(ClientError::EmptyToken);
        }
        let base = Url::parse(&config.api_url)
            .ok()
            .filter(|u| matches!(u.scheme(), "http" | "https") && !u.cannot_be_a_base())
            .ok_or_else(|| ClientError::InvalidBaseUrl(config.api_url.clone()))?;
        let http = Client::builder().user_agent(config.user_agent).build()?;
        Ok(Self {
            http,
            token: config.token,
            base,
        })
    }

    /// Builds `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repo_endpoint<'a>(
        &self,
        repository: &'a RepositoryId,
        rest: impl IntoIterator<Item = &'a str>,
    ) -> Url {
        self.endpoint(
            ["repos", repository.owner(), repository.name()]
                .into_iter()
                .chain(rest),
        )
    }

    /// Builds an authorised request.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, path = url.path(), "GitHub request");
        self.http
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Sends `request`, mapping transport failures and non-success statuses.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, GitHubError> {
        let response = request
            .send()
            .await
            .map_err(|e| GitHubError::Transport(format!("{what}: {e}")))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|b| b.message)
            .unwrap_or(text);
        Err(match status {
            StatusCode::NOT_FOUND => GitHubError::NotFound(format!("{what}: {message}")),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                GitHubError::Conflict(format!("{what}: {message}"))
            }
            _ => GitHubError::Api {
                status: status.as_u16(),
                message: format!("{what}: {message}"),
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, GitHubError> {
        self.send(request, what)
            .await?
            .json::<T>()
            .await
            .map_err(|e| GitHubError::Decode(format!("{what}: {e}")))
    }
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn get_issue(
        &self,
        repository: &RepositoryId,
        number: IssueNumber,
    ) -> Result<Issue, GitHubError> {
        let number_segment = number.to_string();
        let url = self.repo_endpoint(repository, ["issues", number_segment.as_str()]);
        let api: ApiIssue = self
            .send_json(self.request(Method::GET, url), "get issue")
            .await?;
        api.into_issue()
            .map_err(|e| GitHubError::Decode(e.to_string()))
    }

    async fn set_labels(
        &self,
        repository: &RepositoryId,
        number: IssueNumber,
        labels: &LabelSet,
    ) -> Result<LabelSet, GitHubError> {
        let number_segment = number.to_string();
        let url = self.repo_endpoint(repository, ["issues", number_segment.as_str(), "labels"]);
        let body = SetLabelsRequest {
            labels: labels.names().into_iter().map(str::to_string).collect(),
        };
        let returned: Vec<ApiLabel> = self
            .send_json(self.request(Method::PUT, url).json(&body), "set labels")
            .await?;
        Ok(returned
            .into_iter()
            .filter_map(|l| LabelName::new(l.name))
            .collect())
    }

    async fn post_comment(
        &self,
        repository: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<(), GitHubError> {
        let number_segment = number.to_string();
        let url =
            self.repo_endpoint(repository, ["issues", number_segment.as_str(), "comments"]);
        let request = CommentRequest {
            body: body.to_string(),
        };
        self.send(self.request(Method::POST, url).json(&request), "post comment")
            .await?;
        Ok(())
    }

    async fn has_prior_submission(
        &self,
        repository: &RepositoryId,
        author: &UserLogin,
        kind: SubmissionKind,
        before: IssueNumber,
    ) -> Result<bool, GitHubError> {
        let mut url = self.repo_endpoint(repository, ["issues"]);
        url.query_pairs_mut()
            .append_pair("creator", author.as_str())
            .append_pair("state", "all")
            .append_pair("sort", "created")
            .append_pair("direction", "asc")
            .append_pair("per_page", "100");
        // Issues and pull requests together, oldest first, so an earlier
        // submission is on the first page.
        let items: Vec<ApiIssue> = self
            .send_json(self.request(Method::GET, url), "list submissions")
            .await?;
        Ok(items
            .iter()
            .any(|item| item.kind() == kind && item.number < before.as_u64()))
    }
}

#[async_trait]
impl CodeRepository for GitHubClient {
    async fn create_file(&self, commit: &FileCommit) -> Result<CommitSha, GitHubError> {
        let url = self.repo_endpoint(
            &commit.repository,
            std::iter::once("contents").chain(commit.path.as_str().split('/')),
        );
        let identity = CommitIdentity {
            name: commit.identity.name.clone(),
            email: commit.identity.email.clone(),
        };
        let body = CreateFileRequest {
            message: commit.message.clone(),
            content: commit.content.as_str().to_string(),
            branch: commit.branch.as_ref().map(|b| b.as_str().to_string()),
            committer: identity.clone(),
            author: identity,
        };
        let response: CreateFileResponse = self
            .send_json(self.request(Method::PUT, url).json(&body), "create file")
            .await?;
        CommitSha::new(response.commit.sha)
            .ok_or_else(|| GitHubError::Decode("create file: empty commit sha".into()))
    }
}

//! Metaphore bot trigger event source infrastructure.
//!
//! Implements the [`pipeline::EventSource`] trait for GitHub Actions: the
//! runner writes the webhook payload that triggered the workflow to the file
//! named by `GITHUB_EVENT_PATH`, and [`ActionsEventSource`] turns it into a
//! [`pipeline::GitHubEvent`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Environment lookup, file access and payload
//! deserialization all live here. The [`pipeline`] crate sees only
//! [`pipeline::EventSource`] and [`pipeline::GitHubEvent`].

use std::path::PathBuf;

use async_trait::async_trait;
use github::models::{ApiIssue, ApiUser};
use pipeline::{EventAction, EventSource, EventSourceError, GitHubEvent, RepositoryId, SubmissionKind};
use serde::Deserialize;
use tracing::debug;

/// Environment variable naming the event payload file.
pub const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";

/// Environment variable holding `owner/name` of the workflow repository.
pub const REPOSITORY_VAR: &str = "GITHUB_REPOSITORY";

#[derive(Debug, Deserialize)]
struct Payload {
    action: Option<String>,
    #[serde(default)]
    issue: Option<ApiIssue>,
    #[serde(default)]
    pull_request: Option<ApiIssue>,
    #[serde(default)]
    repository: Option<PayloadRepository>,
}

#[derive(Debug, Deserialize)]
struct PayloadRepository {
    name: String,
    owner: ApiUser,
}

/// Reads the single event of a GitHub Actions run from disk.
#[derive(Debug, Clone)]
pub struct ActionsEventSource {
    event_path: PathBuf,
    repository_hint: Option<String>,
}

impl ActionsEventSource {
    /// Creates a source reading `event_path`. `repository_hint` (`owner/name`)
    /// is used when the payload has no `repository` object.
    pub fn new(event_path: impl Into<PathBuf>, repository_hint: Option<String>) -> Self {
        Self {
            event_path: event_path.into(),
            repository_hint,
        }
    }

    /// Creates a source from `GITHUB_EVENT_PATH` and `GITHUB_REPOSITORY`.
    pub fn from_env() -> Result<Self, EventSourceError> {
        let path = std::env::var_os(EVENT_PATH_VAR)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EventSourceError::Missing(EVENT_PATH_VAR.to_string()))?;
        let hint = std::env::var(REPOSITORY_VAR).ok().filter(|r| !r.is_empty());
        Ok(Self::new(path, hint))
    }
}

#[async_trait]
impl EventSource for ActionsEventSource {
    async fn load(&self) -> Result<GitHubEvent, EventSourceError> {
        let raw = tokio::fs::read_to_string(&self.event_path)
            .await
            .map_err(|e| EventSourceError::Io {
                path: self.event_path.display().to_string(),
                message: e.to_string(),
            })?;
        debug!(path = %self.event_path.display(), bytes = raw.len(), "event payload read");
        parse_event(&raw, self.repository_hint.as_deref())
    }
}

/// Parses an issues / pull_request webhook payload.
pub fn parse_event(raw: &str, repository_hint: Option<&str>) -> Result<GitHubEvent, EventSourceError> {
    let payload: Payload =
        serde_json::from_str(raw).map_err(|e| EventSourceError::Malformed(e.to_string()))?;

    let action = payload
        .action
        .as_deref()
        .map(EventAction::parse)
        .ok_or_else(|| EventSourceError::Malformed("payload has no action".into()))?;

    let repository = match (&payload.repository, repository_hint) {
        (Some(repo), _) => RepositoryId::new(repo.owner.login.clone(), repo.name.clone())
            .ok_or_else(|| {
                EventSourceError::Malformed(format!(
                    "invalid repository '{}/{}'",
                    repo.owner.login, repo.name
                ))
            })?,
        (None, Some(hint)) => hint
            .parse::<RepositoryId>()
            .map_err(|e| EventSourceError::Malformed(e.to_string()))?,
        (None, None) => {
            return Err(EventSourceError::Missing(format!(
                "repository (payload has none and {REPOSITORY_VAR} is unset)"
            )))
        }
    };

    let subject = match (payload.issue, payload.pull_request) {
        (Some(issue), _) => issue.into_issue(),
        (None, Some(pr)) => pr.into_issue_of_kind(SubmissionKind::PullRequest),
        (None, None) => {
            return Err(EventSourceError::Malformed(
                "payload is neither an issue nor a pull request event".into(),
            ))
        }
    }
    .map_err(|e| EventSourceError::Malformed(e.to_string()))?;

    Ok(GitHubEvent {
        action,
        repository,
        subject,
    })
}

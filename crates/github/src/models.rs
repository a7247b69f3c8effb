//! GitHub REST API v3 request and response models.
//!
//! The same issue shape appears in REST responses and in webhook payloads, so
//! [`ApiIssue`] is shared with the `listener` crate. Conversion into the domain
//! [`Issue`] is where GitHub's loose JSON (nullable bodies, empty strings) is
//! validated.

use pipeline::{
    Issue, IssueNumber, IssueState, LabelName, LabelSet, SubmissionKind, Timestamp, UserLogin,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a well-formed JSON object does not describe a valid issue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid issue #{number}: {reason}")]
pub struct ModelError {
    /// Number of the offending issue.
    pub number: u64,
    /// What was wrong.
    pub reason: String,
}

/// A GitHub account reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUser {
    pub login: String,
}

/// A label applied to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLabel {
    pub name: String,
}

/// An issue or pull request.
///
/// Pull requests served from the issues endpoint carry a `pull_request` object;
/// webhook `pull_request` payloads do not, so callers pass the kind explicitly
/// when they know it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiIssue {
    pub number: u64,
    pub title: String,
    pub user: ApiUser,
    pub created_at: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    #[serde(default)]
    pub assignees: Vec<ApiUser>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl ApiIssue {
    /// Issue or pull request, judged by the `pull_request` marker.
    pub fn kind(&self) -> SubmissionKind {
        if self.pull_request.is_some() {
            SubmissionKind::PullRequest
        } else {
            SubmissionKind::Issue
        }
    }

    /// Converts into the domain type using [`ApiIssue::kind`].
    pub fn into_issue(self) -> Result<Issue, ModelError> {
        let kind = self.kind();
        self.into_issue_of_kind(kind)
    }

    /// Converts into the domain type with an explicit kind.
    pub fn into_issue_of_kind(self, kind: SubmissionKind) -> Result<Issue, ModelError> {
        let number = self.number;
        let invalid = |reason: String| ModelError { number, reason };

        let author = UserLogin::new(self.user.login)
            .ok_or_else(|| invalid("empty author login".into()))?;
        let created_at = Timestamp::parse_rfc3339(&self.created_at)
            .ok_or_else(|| invalid(format!("bad created_at '{}'", self.created_at)))?;
        let state = match self.state.as_str() {
            "open" => IssueState::Open,
            "closed" => IssueState::Closed,
            other => return Err(invalid(format!("unknown state '{other}'"))),
        };
        // Empty names are never produced by GitHub; drop rather than fail.
        let labels: LabelSet = self
            .labels
            .into_iter()
            .filter_map(|l| LabelName::new(l.name))
            .collect();
        let assignees = self
            .assignees
            .into_iter()
            .filter_map(|a| UserLogin::new(a.login))
            .collect();

        Ok(Issue {
            number: IssueNumber::new(number),
            kind,
            title: self.title,
            author,
            created_at,
            state,
            labels,
            assignees,
            body: self.body.unwrap_or_default(),
        })
    }
}

/// Request body for replacing an issue's labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLabelsRequest {
    pub labels: Vec<String>,
}

/// Request body for posting a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub body: String,
}

/// Name and e-mail recorded on a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// Request body for `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileRequest {
    pub message: String,
    /// Base64 file content.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub committer: CommitIdentity,
    pub author: CommitIdentity,
}

/// The commit part of a contents-API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}

/// Response from the create-file endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileResponse {
    pub commit: CommitRef,
}

/// GitHub's error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

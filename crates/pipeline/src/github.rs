//! GitHub-facing port traits.
//!
//! The `github` crate implements these over the REST API; tests implement them
//! in memory. Nothing in this module performs I/O.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    BotIdentity, BranchName, CommitSha, ContentPath, EncodedContent, Issue, IssueNumber, LabelSet,
    RepositoryId, SubmissionKind, UserLogin,
};

/// Failures reported by a GitHub port implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GitHubError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("GitHub request failed: {0}")]
    Transport(String),

    /// The requested resource does not exist or is not visible to the token.
    #[error("GitHub resource not found: {0}")]
    NotFound(String),

    /// The write conflicts with existing state (e.g. the file already exists).
    #[error("GitHub rejected the write: {0}")]
    Conflict(String),

    /// Any other non-success response.
    #[error("GitHub returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("GitHub response could not be decoded: {0}")]
    Decode(String),
}

/// A request to create one file in a repository with a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCommit {
    /// Repository receiving the file.
    pub repository: RepositoryId,
    /// Target branch; `None` means the repository's default branch.
    pub branch: Option<BranchName>,
    /// Path of the new file.
    pub path: ContentPath,
    /// Base64 file content.
    pub content: EncodedContent,
    /// Commit message.
    pub message: String,
    /// Recorded as both author and committer.
    pub identity: BotIdentity,
}

/// Issue operations the bot performs.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetches the current state of an issue or pull request.
    async fn get_issue(
        &self,
        repository: &RepositoryId,
        number: IssueNumber,
    ) -> Result<Issue, GitHubError>;

    /// Replaces the issue's labels with `labels` and returns the resulting set.
    async fn set_labels(
        &self,
        repository: &RepositoryId,
        number: IssueNumber,
        labels: &LabelSet,
    ) -> Result<LabelSet, GitHubError>;

    /// Posts a comment on an issue or pull request.
    async fn post_comment(
        &self,
        repository: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<(), GitHubError>;

    /// Returns `true` if `author` opened an issue (or pull request, per `kind`)
    /// in the repository before `before`.
    async fn has_prior_submission(
        &self,
        repository: &RepositoryId,
        author: &UserLogin,
        kind: SubmissionKind,
        before: IssueNumber,
    ) -> Result<bool, GitHubError>;
}

/// Repository content operations the bot performs.
#[async_trait]
pub trait CodeRepository: Send + Sync {
    /// Creates a new file with one commit. Fails with
    /// [`GitHubError::Conflict`] if the path already exists.
    async fn create_file(&self, commit: &FileCommit) -> Result<CommitSha, GitHubError>;
}

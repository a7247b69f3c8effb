//! Inbound trigger events and the [`EventSource`] port that supplies them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Issue, RepositoryId};

/// The webhook `action` an event was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventAction {
    /// An issue or pull request was opened.
    Opened,
    /// An issue or pull request was closed.
    Closed,
    /// Any other action (`edited`, `labeled`, ...). Carries the raw value.
    Other(String),
}

impl EventAction {
    /// Maps a raw webhook `action` string onto the three routing states.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "opened" => Self::Opened,
            "closed" => Self::Closed,
            other => Self::Other(other.to_string()),
        }
    }

    /// The raw action name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One issue or pull-request lifecycle event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubEvent {
    /// What happened.
    pub action: EventAction,
    /// Repository the event was raised in.
    pub repository: RepositoryId,
    /// The issue or pull request as it was when the event fired.
    pub subject: Issue,
}

/// Errors raised while obtaining the trigger event.
#[derive(Debug, Error)]
pub enum EventSourceError {
    /// A required input (environment variable, file) is not present.
    #[error("event input missing: {0}")]
    Missing(String),

    /// The event payload could not be read.
    #[error("failed to read event payload from {path}: {message}")]
    Io {
        /// Where the payload was expected.
        path: String,
        /// Underlying I/O error text.
        message: String,
    },

    /// The event payload is not a recognisable issue or pull-request event.
    #[error("malformed event payload: {0}")]
    Malformed(String),
}

/// Supplies the event a run should process.
///
/// Under GitHub Actions there is exactly one event per invocation.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Loads the event for this run.
    async fn load(&self) -> Result<GitHubEvent, EventSourceError>;
}

//! Top-level error type for the metaphore bot domain.
//!
//! [`MetaphorError`] covers conditions that fail a run. Component-level errors
//! ([`crate::GitHubError`], [`crate::EventSourceError`]) are defined next to the
//! ports that produce them and converted here.
//!
//! Classification mismatches are *not* errors; they are reported as
//! [`crate::SkipReason`] values.

use thiserror::Error;

use crate::{EventSourceError, GitHubError};

/// Errors that fail a bot run.
///
/// There is no retry policy: each workflow run is one-shot and the error
/// message becomes the run's failure annotation.
#[derive(Debug, Error)]
pub enum MetaphorError {
    /// A GitHub API call failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// The trigger event could not be loaded.
    #[error(transparent)]
    EventSource(#[from] EventSourceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_errors_keep_their_message() {
        let source = GitHubError::NotFound("issue #42".into());
        let err: MetaphorError = source.clone().into();
        assert_eq!(err.to_string(), source.to_string());

        let err: MetaphorError = EventSourceError::Missing("GITHUB_EVENT_PATH".into()).into();
        assert!(matches!(
            err,
            MetaphorError::EventSource(EventSourceError::Missing(_))
        ));
    }
}

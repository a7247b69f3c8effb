//! Greets first-time contributors when they open an issue or pull request.

use std::sync::Arc;

use pipeline::{GitHubEvent, IssueTracker, MetaphorError, SkipReason, SubmissionKind};
use tracing::{debug, info, instrument};

use crate::RunOutcome;

/// Greeting templates, taken verbatim from the action inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GreetingConfig {
    /// Posted on a contributor's first issue.
    pub issue_message: Option<String>,
    /// Posted on a contributor's first pull request.
    pub pr_message: Option<String>,
    /// Appended after a blank line to every greeting.
    pub footer: Option<String>,
}

impl GreetingConfig {
    /// The full comment body for `kind`, or `None` if no message is set.
    pub fn compose(&self, kind: SubmissionKind) -> Option<String> {
        let message = match kind {
            SubmissionKind::Issue => self.issue_message.as_deref(),
            SubmissionKind::PullRequest => self.pr_message.as_deref(),
        }
        .map(str::trim)
        .filter(|m| !m.is_empty())?;

        match self.footer.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            Some(footer) => Some(format!("{message}\n\n{footer}")),
            None => Some(message.to_string()),
        }
    }
}

/// Posts the configured greeting on a newcomer's first submission.
pub struct GreetingHandler {
    tracker: Arc<dyn IssueTracker>,
    config: GreetingConfig,
}

impl GreetingHandler {
    pub fn new(tracker: Arc<dyn IssueTracker>, config: GreetingConfig) -> Self {
        Self { tracker, config }
    }

    /// Handles an `opened` event.
    #[instrument(skip_all, fields(number = %event.subject.number, kind = %event.subject.kind))]
    pub async fn handle(&self, event: &GitHubEvent) -> Result<RunOutcome, MetaphorError> {
        let subject = &event.subject;
        let Some(body) = self.config.compose(subject.kind) else {
            debug!(kind = %subject.kind, "no greeting configured");
            return Ok(RunOutcome::Skipped(SkipReason::NoGreetingConfigured));
        };

        let returning = self
            .tracker
            .has_prior_submission(&event.repository, &subject.author, subject.kind, subject.number)
            .await?;
        if returning {
            info!(author = %subject.author, "returning contributor, not greeting");
            return Ok(RunOutcome::Skipped(SkipReason::ReturningContributor));
        }

        self.tracker
            .post_comment(&event.repository, subject.number, &body)
            .await?;
        info!(author = %subject.author, number = %subject.number, "greeting posted");
        Ok(RunOutcome::Greeted {
            number: subject.number,
        })
    }
}

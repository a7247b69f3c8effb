//! What a run did.

use pipeline::{Category, CommitSha, ContentPath, IssueNumber, LabelSet, SkipReason};

/// Details of a successful story publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// The published issue.
    pub number: IssueNumber,
    /// Category the story was filed under.
    pub category: Category,
    /// Path of the committed story file.
    pub path: ContentPath,
    /// SHA of the commit that created the file.
    pub commit: CommitSha,
    /// The issue's labels after the sentinel was added.
    pub labels: LabelSet,
}

/// Terminal result of handling one event.
///
/// Errors (API failures, malformed events) are reported separately as
/// [`pipeline::MetaphorError`]; every variant here is a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A greeting comment was posted on the new issue or pull request.
    Greeted {
        /// Where the greeting was posted.
        number: IssueNumber,
    },
    /// A story file was committed and the issue labelled.
    Published(Publication),
    /// Nothing to do for this event.
    Skipped(SkipReason),
    /// The event action is not handled. The run must report failure.
    Unsupported {
        /// The raw action name.
        action: String,
    },
}

impl RunOutcome {
    /// Returns `true` if this outcome must fail the workflow run.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Greeted { number } => write!(f, "greeted author of #{number}"),
            Self::Published(p) => write!(f, "published #{} to {}", p.number, p.path),
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Unsupported { action } => write!(f, "unsupported event action '{action}'"),
        }
    }
}

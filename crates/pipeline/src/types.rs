//! Shared value types for the metaphore bot domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! invariants (labels are duplicate-free, timestamps are UTC) and participate in
//! the classification and publishing rules.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{IssueNumber, LabelName, UserLogin};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Displays as RFC 3339 with second precision and a `Z` suffix,
/// which is the form written into story front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Parses an RFC 3339 / ISO 8601 timestamp such as `"2024-01-14T08:00:00Z"`.
    pub fn parse_rfc3339(raw: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// An ordered, duplicate-free set of issue labels.
///
/// Order is the order GitHub reported the labels in; it is preserved when the
/// set is written back so existing labels keep their position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet(Vec<LabelName>);

impl LabelSet {
    /// Creates an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `label` unless it is already present.
    ///
    /// Returns `true` if the label was added.
    pub fn insert(&mut self, label: LabelName) -> bool {
        if self.contains(&label) {
            false
        } else {
            self.0.push(label);
            true
        }
    }

    /// Returns a copy of this set with `label` appended (no-op if present).
    #[must_use]
    pub fn with(&self, label: LabelName) -> Self {
        let mut next = self.clone();
        next.insert(label);
        next
    }

    /// Returns `true` if the set contains a label with exactly this name.
    pub fn contains(&self, label: &LabelName) -> bool {
        self.0.iter().any(|l| l == label)
    }

    /// Returns `true` if the set contains a label whose name is `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.0.iter().any(|l| l.as_str() == name)
    }

    /// Number of labels in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set has no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &LabelName> {
        self.0.iter()
    }

    /// Label names as string slices, in order.
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(LabelName::as_str).collect()
    }
}

impl FromIterator<LabelName> for LabelSet {
    fn from_iter<I: IntoIterator<Item = LabelName>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// Lifecycle state of an issue or pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    /// Still open.
    Open,
    /// Closed (completed, not planned, or merged).
    Closed,
}

/// Whether a submission is a plain issue or a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    /// A GitHub issue.
    Issue,
    /// A GitHub pull request.
    PullRequest,
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issue => f.write_str("issue"),
            Self::PullRequest => f.write_str("pull request"),
        }
    }
}

/// A snapshot of an issue (or pull request) as reported by GitHub.
///
/// Read-only to the bot apart from label replacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Repository-scoped number.
    pub number: IssueNumber,
    /// Issue or pull request.
    pub kind: SubmissionKind,
    /// Title as entered by the author.
    pub title: String,
    /// Handle of the account that opened the issue.
    pub author: UserLogin,
    /// When the issue was opened.
    pub created_at: Timestamp,
    /// Open or closed.
    pub state: IssueState,
    /// Current labels.
    pub labels: LabelSet,
    /// Handles of the assigned accounts.
    pub assignees: Vec<UserLogin>,
    /// Free-text body. GitHub reports an absent body as `null`; that is stored
    /// as the empty string.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Injected configuration values
// ---------------------------------------------------------------------------

/// The identity recorded as both author and committer of story commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotIdentity {
    /// Display name (e.g. `"metaphore-bot"`).
    pub name: String,
    /// Commit e-mail address.
    pub email: String,
}

/// The accounts allowed to approve publication by being assigned to an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerAllowList(Vec<UserLogin>);

impl ReviewerAllowList {
    /// Creates an allow-list from the given handles.
    pub fn new(reviewers: impl IntoIterator<Item = UserLogin>) -> Self {
        Self(reviewers.into_iter().collect())
    }

    /// Returns `true` if `login` is on the list.
    pub fn permits(&self, login: &UserLogin) -> bool {
        self.0.iter().any(|r| r == login)
    }

    /// Returns the first of `assignees` that is on the list, if any.
    pub fn first_authorized<'a>(&self, assignees: &'a [UserLogin]) -> Option<&'a UserLogin> {
        assignees.iter().find(|a| self.permits(a))
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(name: &str) -> LabelName {
        LabelName::new(name).unwrap()
    }

    #[test]
    fn label_set_insert_is_idempotent_and_keeps_order() {
        let mut set: LabelSet = [label("metaphore"), label("rust")].into_iter().collect();
        assert!(set.insert(label("published")));
        assert!(!set.insert(label("published")));
        assert_eq!(set.names(), vec!["metaphore", "rust", "published"]);
    }

    #[test]
    fn label_set_from_iter_drops_duplicates() {
        let set: LabelSet = [label("rust"), label("rust"), label("zig")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn timestamp_round_trips_github_format() {
        let ts = Timestamp::parse_rfc3339("2024-01-14T08:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2024-01-14T08:00:00Z");

        let offset = Timestamp::parse_rfc3339("2024-01-14T10:00:00+02:00").unwrap();
        assert_eq!(offset, ts);
        assert!(Timestamp::parse_rfc3339("yesterday").is_none());
    }

    #[test]
    fn allow_list_finds_first_authorized_assignee() {
        let reviewers = ReviewerAllowList::new(UserLogin::new("darkterminal"));
        let assignees = vec![
            UserLogin::new("someone").unwrap(),
            UserLogin::new("darkterminal").unwrap(),
        ];
        assert_eq!(
            reviewers.first_authorized(&assignees).map(UserLogin::as_str),
            Some("darkterminal")
        );
        assert!(reviewers.first_authorized(&assignees[..1]).is_none());
    }
}

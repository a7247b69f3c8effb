//! Story classification: deciding whether a closed issue is a publishable
//! metaphor, and under which category.
//!
//! Categories live in a single table ([`Category::ALL`]); adding a category
//! means adding one row. An issue matches only when its labels are *exactly*
//! the required tag plus one category label.

use serde::{Deserialize, Serialize};

use crate::{Issue, IssueState, LabelSet, ReviewerAllowList, UserLogin};

/// Label every metaphor issue must carry alongside its category label.
pub const REQUIRED_TAG: &str = "metaphore";

/// A technical category a metaphor is filed under.
///
/// The label name doubles as the directory name under the stories root and
/// as the `language` front-matter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Linux,
    Cpp,
    Css,
    Golang,
    Javascript,
    Java,
    Maths,
    Python,
    Php,
    Physics,
    Ruby,
    Rust,
    Zig,
}

impl Category {
    /// Every known category, in display order.
    pub const ALL: [Category; 13] = [
        Category::Linux,
        Category::Cpp,
        Category::Css,
        Category::Golang,
        Category::Javascript,
        Category::Java,
        Category::Maths,
        Category::Python,
        Category::Php,
        Category::Physics,
        Category::Ruby,
        Category::Rust,
        Category::Zig,
    ];

    /// The label (and directory) name for this category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Linux => "linux",
            Category::Cpp => "cpp",
            Category::Css => "css",
            Category::Golang => "golang",
            Category::Javascript => "javascript",
            Category::Java => "java",
            Category::Maths => "maths",
            Category::Python => "python",
            Category::Php => "php",
            Category::Physics => "physics",
            Category::Ruby => "ruby",
            Category::Rust => "rust",
            Category::Zig => "zig",
        }
    }

    /// Looks up a category by its exact label name.
    pub fn from_label(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns `true` if `labels` is exactly `{REQUIRED_TAG, category}`.
pub fn is_exact_match(labels: &LabelSet, category: Category) -> bool {
    labels.len() == 2 && labels.contains_name(REQUIRED_TAG) && labels.contains_name(category.label())
}

/// Returns the category `labels` exact-matches, or `None`.
///
/// No match is the normal outcome for most closed issues, not an error.
pub fn classify(labels: &LabelSet) -> Option<Category> {
    Category::ALL
        .into_iter()
        .find(|category| is_exact_match(labels, *category))
}

/// Why a closed-issue event did not lead to publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The issue is still open.
    NotClosed,
    /// The closed item is a pull request, not an issue.
    NotAnIssue,
    /// The labels are not exactly the metaphor tag plus one category.
    NotAMetaphor,
    /// No assignee is on the reviewer allow-list.
    NoAuthorizedReviewer,
    /// No greeting is configured for this kind of submission.
    NoGreetingConfigured,
    /// The author has contributed before; greetings are for newcomers only.
    ReturningContributor,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NotClosed => "issue is not closed",
            Self::NotAnIssue => "item is a pull request",
            Self::NotAMetaphor => "labels do not match a metaphor category",
            Self::NoAuthorizedReviewer => "no authorized reviewer is assigned",
            Self::NoGreetingConfigured => "no greeting message is configured",
            Self::ReturningContributor => "author is a returning contributor",
        };
        f.write_str(text)
    }
}

/// Result of checking every publication gate for an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The issue may be published under `category`, approved by `reviewer`.
    Eligible {
        /// The matched category.
        category: Category,
        /// The allow-listed assignee that authorises publication.
        reviewer: UserLogin,
    },
    /// The issue must be left alone.
    Skip(SkipReason),
}

/// Checks the publication gates in order: kind, closed state, exact label
/// match, authorised assignee. The first failing gate is reported.
pub fn assess(issue: &Issue, reviewers: &ReviewerAllowList) -> Eligibility {
    if issue.kind != crate::SubmissionKind::Issue {
        return Eligibility::Skip(SkipReason::NotAnIssue);
    }
    if issue.state != IssueState::Closed {
        return Eligibility::Skip(SkipReason::NotClosed);
    }
    let Some(category) = classify(&issue.labels) else {
        return Eligibility::Skip(SkipReason::NotAMetaphor);
    };
    match reviewers.first_authorized(&issue.assignees) {
        Some(reviewer) => Eligibility::Eligible {
            category,
            reviewer: reviewer.clone(),
        },
        None => Eligibility::Skip(SkipReason::NoAuthorizedReviewer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueNumber, LabelName, SubmissionKind, Timestamp};

    fn labels(names: &[&str]) -> LabelSet {
        names
            .iter()
            .map(|n| LabelName::new(*n).unwrap())
            .collect()
    }

    fn issue(label_names: &[&str], assignees: &[&str], state: IssueState) -> Issue {
        Issue {
            number: IssueNumber::new(42),
            kind: SubmissionKind::Issue,
            title: "A Tale of Borrow Checker".into(),
            author: UserLogin::new("writer").unwrap(),
            created_at: Timestamp::parse_rfc3339("2024-01-14T08:00:00Z").unwrap(),
            state,
            labels: labels(label_names),
            assignees: assignees
                .iter()
                .map(|a| UserLogin::new(*a).unwrap())
                .collect(),
            body: "Once upon a compile...".into(),
        }
    }

    fn reviewers() -> ReviewerAllowList {
        ReviewerAllowList::new(UserLogin::new("darkterminal"))
    }

    #[test]
    fn every_category_matches_with_the_required_tag() {
        for category in Category::ALL {
            assert_eq!(
                classify(&labels(&[REQUIRED_TAG, category.label()])),
                Some(category)
            );
            // Order is irrelevant.
            assert_eq!(
                classify(&labels(&[category.label(), REQUIRED_TAG])),
                Some(category)
            );
        }
    }

    #[test]
    fn non_exact_label_sets_do_not_match() {
        let cases: &[&[&str]] = &[
            &[],
            &[REQUIRED_TAG],
            &["rust"],
            &[REQUIRED_TAG, "cobol"],
            &[REQUIRED_TAG, "rust", "bug"],
            &[REQUIRED_TAG, "rust", "zig"],
            &[REQUIRED_TAG, "rust", "published"],
            &["Metaphore", "rust"],
            &["bug", "rust"],
        ];
        for case in cases {
            assert_eq!(classify(&labels(case)), None, "{case:?}");
        }
    }

    #[test]
    fn category_labels_round_trip_through_the_table() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("Rust"), None);
    }

    #[test]
    fn assess_accepts_closed_issue_with_reviewer() {
        let outcome = assess(
            &issue(&["metaphore", "rust"], &["darkterminal"], IssueState::Closed),
            &reviewers(),
        );
        assert_eq!(
            outcome,
            Eligibility::Eligible {
                category: Category::Rust,
                reviewer: UserLogin::new("darkterminal").unwrap(),
            }
        );
    }

    #[test]
    fn assess_reports_first_failing_gate() {
        let r = reviewers();
        assert_eq!(
            assess(&issue(&["metaphore", "rust"], &["darkterminal"], IssueState::Open), &r),
            Eligibility::Skip(SkipReason::NotClosed)
        );
        assert_eq!(
            assess(&issue(&["bug"], &["darkterminal"], IssueState::Closed), &r),
            Eligibility::Skip(SkipReason::NotAMetaphor)
        );
        assert_eq!(
            assess(&issue(&["metaphore", "rust"], &["intruder"], IssueState::Closed), &r),
            Eligibility::Skip(SkipReason::NoAuthorizedReviewer)
        );
        assert_eq!(
            assess(&issue(&["metaphore", "rust"], &[], IssueState::Closed), &r),
            Eligibility::Skip(SkipReason::NoAuthorizedReviewer)
        );

        let mut pr = issue(&["metaphore", "rust"], &["darkterminal"], IssueState::Closed);
        pr.kind = SubmissionKind::PullRequest;
        assert_eq!(assess(&pr, &r), Eligibility::Skip(SkipReason::NotAnIssue));
    }
}

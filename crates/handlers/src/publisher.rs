//! Publishes a closed metaphor issue as a story file in the content repository.
//!
//! Sequence: fetch the issue → check the publication gates → render and encode
//! the story → commit it → add the sentinel label. The label is written only
//! after the commit succeeds, so a failed commit leaves the issue untouched and
//! a later run can try again.

use std::sync::Arc;

use pipeline::{
    assess, render_story, story_path, BotIdentity, BranchName, CodeRepository, Eligibility,
    FileCommit, GitHubEvent, IssueTracker, LabelName, MetaphorError, RepositoryId,
    ReviewerAllowList, SkipReason, StoryFields, SubmissionKind,
};
use tracing::{info, instrument};

use crate::{Publication, RunOutcome};

/// Where and as whom stories are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Directory under which `{category}/{slug}.md` files are created.
    pub stories_root: String,
    /// Repository receiving story commits; `None` means the event's repository.
    pub content_repository: Option<RepositoryId>,
    /// Branch receiving story commits; `None` means the default branch.
    pub content_branch: Option<BranchName>,
    /// Author and committer of story commits.
    pub identity: BotIdentity,
    /// Assignees allowed to approve publication.
    pub reviewers: ReviewerAllowList,
    /// Label added once the story is committed.
    pub published_label: LabelName,
}

/// Turns approved metaphor issues into committed story files.
pub struct StoryPublisher {
    tracker: Arc<dyn IssueTracker>,
    repository: Arc<dyn CodeRepository>,
    config: PublisherConfig,
}

impl StoryPublisher {
    pub fn new(
        tracker: Arc<dyn IssueTracker>,
        repository: Arc<dyn CodeRepository>,
        config: PublisherConfig,
    ) -> Self {
        Self {
            tracker,
            repository,
            config,
        }
    }

    /// Handles a `closed` event.
    #[instrument(skip_all, fields(number = %event.subject.number))]
    pub async fn handle(&self, event: &GitHubEvent) -> Result<RunOutcome, MetaphorError> {
        if event.subject.kind != SubmissionKind::Issue {
            info!("closed item is a pull request, nothing to publish");
            return Ok(RunOutcome::Skipped(SkipReason::NotAnIssue));
        }

        // The payload snapshot may be stale; labels and assignees are re-read.
        let issue = self
            .tracker
            .get_issue(&event.repository, event.subject.number)
            .await?;

        let (category, reviewer) = match assess(&issue, &self.config.reviewers) {
            Eligibility::Eligible { category, reviewer } => (category, reviewer),
            Eligibility::Skip(reason) => {
                info!(%reason, labels = ?issue.labels.names(), "issue not published");
                return Ok(RunOutcome::Skipped(reason));
            }
        };
        info!(%category, %reviewer, "publishing metaphor");

        let document = render_story(&StoryFields::from_issue(&issue, category));
        let path = story_path(&self.config.stories_root, category, &issue.title, issue.number);
        let commit = FileCommit {
            repository: self
                .config
                .content_repository
                .clone()
                .unwrap_or_else(|| event.repository.clone()),
            branch: self.config.content_branch.clone(),
            path: path.clone(),
            content: document.encode(),
            message: commit_message(&issue.title, issue.author.as_str()),
            identity: self.config.identity.clone(),
        };
        let sha = self.repository.create_file(&commit).await?;
        info!(%path, commit = %sha, "story committed");

        let wanted = issue.labels.with(self.config.published_label.clone());
        let labels = self
            .tracker
            .set_labels(&event.repository, issue.number, &wanted)
            .await?;
        info!(labels = ?labels.names(), "issue labelled as published");

        Ok(RunOutcome::Published(Publication {
            number: issue.number,
            category,
            path,
            commit: sha,
            labels,
        }))
    }
}

/// Commit message for a published story; references the story's author.
pub fn commit_message(title: &str, author: &str) -> String {
    format!("Publish metaphor \"{title}\" by @{author}")
}

#[cfg(test)]
mod tests {
    use pipeline::{Category, EventAction, GitHubError, IssueState, UserLogin};

    use super::*;
    use crate::testing::{borrow_checker_issue, labels, login, repo, FakeGitHub};

    fn config() -> PublisherConfig {
        PublisherConfig {
            stories_root: "src/content/stories".into(),
            content_repository: None,
            content_branch: None,
            identity: BotIdentity {
                name: "metaphore-bot".into(),
                email: "bot@example.com".into(),
            },
            reviewers: ReviewerAllowList::new(UserLogin::new("darkterminal")),
            published_label: LabelName::new("published").unwrap(),
        }
    }

    fn closed_event() -> GitHubEvent {
        GitHubEvent {
            action: EventAction::Closed,
            repository: repo(),
            subject: borrow_checker_issue(),
        }
    }

    fn publisher(fake: &Arc<FakeGitHub>, config: PublisherConfig) -> StoryPublisher {
        StoryPublisher::new(fake.clone(), fake.clone(), config)
    }

    #[tokio::test]
    async fn publishes_approved_metaphor_and_labels_issue() {
        let fake = Arc::new(FakeGitHub::serving(borrow_checker_issue()));

        let outcome = publisher(&fake, config())
            .handle(&closed_event())
            .await
            .unwrap();

        let commits = fake.commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        let commit = &commits[0];
        assert_eq!(
            commit.path.as_str(),
            "src/content/stories/rust/a-tale-of-borrow-checker.md"
        );
        assert_eq!(commit.repository, repo());
        assert_eq!(commit.identity.name, "metaphore-bot");
        assert!(commit.message.contains("@ferris"));

        let expected_doc = render_story(&StoryFields::from_issue(
            &borrow_checker_issue(),
            Category::Rust,
        ));
        assert!(expected_doc.as_str().contains("language: rust\n"));
        assert_eq!(commit.content, expected_doc.encode());

        let writes = fake.label_writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1.names(), vec!["metaphore", "rust", "published"]);

        match outcome {
            RunOutcome::Published(p) => {
                assert_eq!(p.category, Category::Rust);
                assert_eq!(p.labels, labels(&["metaphore", "rust", "published"]));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn unauthorized_assignee_causes_no_side_effects() {
        let mut issue = borrow_checker_issue();
        issue.assignees = vec![login("someone-else")];
        let fake = Arc::new(FakeGitHub::serving(issue));

        let outcome = publisher(&fake, config())
            .handle(&closed_event())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Skipped(SkipReason::NoAuthorizedReviewer));
        assert_eq!(fake.side_effect_count(), 0);
    }

    #[tokio::test]
    async fn commit_failure_leaves_labels_untouched() {
        let fake = Arc::new(FakeGitHub {
            commit_error: Some(GitHubError::Conflict("file already exists".into())),
            ..FakeGitHub::serving(borrow_checker_issue())
        });

        let err = publisher(&fake, config())
            .handle(&closed_event())
            .await
            .unwrap_err();

        assert!(matches!(err, MetaphorError::GitHub(GitHubError::Conflict(_))));
        assert!(fake.label_writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_run_after_publication_is_a_no_op() {
        let fake = Arc::new(FakeGitHub::serving(borrow_checker_issue()));
        let publisher = publisher(&fake, config());

        publisher.handle(&closed_event()).await.unwrap();
        let again = publisher.handle(&closed_event()).await.unwrap();

        assert_eq!(again, RunOutcome::Skipped(SkipReason::NotAMetaphor));
        assert_eq!(fake.commits.lock().unwrap().len(), 1);
        assert_eq!(fake.label_writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reopened_issue_is_not_published() {
        let mut issue = borrow_checker_issue();
        issue.state = IssueState::Open;
        let fake = Arc::new(FakeGitHub::serving(issue));

        let outcome = publisher(&fake, config())
            .handle(&closed_event())
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Skipped(SkipReason::NotClosed));
        assert_eq!(fake.side_effect_count(), 0);
    }

    #[tokio::test]
    async fn closed_pull_request_is_skipped_without_fetching() {
        let fake = Arc::new(FakeGitHub::default());
        let mut event = closed_event();
        event.subject.kind = SubmissionKind::PullRequest;

        let outcome = publisher(&fake, config()).handle(&event).await.unwrap();

        assert_eq!(outcome, RunOutcome::Skipped(SkipReason::NotAnIssue));
        assert!(fake.fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn commits_go_to_configured_content_repository_and_branch() {
        let fake = Arc::new(FakeGitHub::serving(borrow_checker_issue()));
        let content: RepositoryId = "metaphore-org/site".parse().unwrap();
        let config = PublisherConfig {
            content_repository: Some(content.clone()),
            content_branch: BranchName::new("content"),
            ..config()
        };

        publisher(&fake, config)
            .handle(&closed_event())
            .await
            .unwrap();

        let commits = fake.commits.lock().unwrap();
        assert_eq!(commits[0].repository, content);
        assert_eq!(commits[0].branch.as_ref().map(BranchName::as_str), Some("content"));
        // Labels are still written on the issue's own repository.
        assert_eq!(fake.label_writes.lock().unwrap()[0].0.as_u64(), 42);
    }

    #[test]
    fn commit_message_references_author() {
        assert_eq!(
            commit_message("Ownership", "ferris"),
            "Publish metaphor \"Ownership\" by @ferris"
        );
    }
}

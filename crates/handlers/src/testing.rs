//! In-memory port implementations for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use pipeline::{
    CodeRepository, CommitSha, FileCommit, GitHubError, Issue, IssueNumber, IssueState,
    IssueTracker, LabelName, LabelSet, RepositoryId, SubmissionKind, Timestamp, UserLogin,
};

/// Records every call and serves one issue.
#[derive(Default)]
pub struct FakeGitHub {
    pub issue: Mutex<Option<Issue>>,
    pub prior_submission: bool,
    pub commit_error: Option<GitHubError>,
    pub fetches: Mutex<Vec<IssueNumber>>,
    pub commits: Mutex<Vec<FileCommit>>,
    pub label_writes: Mutex<Vec<(IssueNumber, LabelSet)>>,
    pub comments: Mutex<Vec<(IssueNumber, String)>>,
}

impl FakeGitHub {
    pub fn serving(issue: Issue) -> Self {
        Self {
            issue: Mutex::new(Some(issue)),
            ..Self::default()
        }
    }

    pub fn side_effect_count(&self) -> usize {
        self.commits.lock().unwrap().len()
            + self.label_writes.lock().unwrap().len()
            + self.comments.lock().unwrap().len()
    }
}

#[async_trait]
impl IssueTracker for FakeGitHub {
    async fn get_issue(
        &self,
        _repository: &RepositoryId,
        number: IssueNumber,
    ) -> Result<Issue, GitHubError> {
        self.fetches.lock().unwrap().push(number);
        self.issue
            .lock()
            .unwrap()
            .clone()
            .filter(|i| i.number == number)
            .ok_or_else(|| GitHubError::NotFound(format!("issue #{number}")))
    }

    async fn set_labels(
        &self,
        _repository: &RepositoryId,
        number: IssueNumber,
        labels: &LabelSet,
    ) -> Result<LabelSet, GitHubError> {
        self.label_writes
            .lock()
            .unwrap()
            .push((number, labels.clone()));
        if let Some(issue) = self.issue.lock().unwrap().as_mut() {
            issue.labels = labels.clone();
        }
        Ok(labels.clone())
    }

    async fn post_comment(
        &self,
        _repository: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<(), GitHubError> {
        self.comments
            .lock()
            .unwrap()
            .push((number, body.to_string()));
        Ok(())
    }

    async fn has_prior_submission(
        &self,
        _repository: &RepositoryId,
        _author: &UserLogin,
        _kind: SubmissionKind,
        _before: IssueNumber,
    ) -> Result<bool, GitHubError> {
        Ok(self.prior_submission)
    }
}

#[async_trait]
impl CodeRepository for FakeGitHub {
    async fn create_file(&self, commit: &FileCommit) -> Result<CommitSha, GitHubError> {
        if let Some(err) = &self.commit_error {
            return Err(err.clone());
        }
        self.commits.lock().unwrap().push(commit.clone());
        Ok(CommitSha::new("3f786850e387550fdab836ed7e6dc881de23001b").unwrap())
    }
}

pub fn repo() -> RepositoryId {
    "darkterminal/metaphore".parse().unwrap()
}

pub fn login(name: &str) -> UserLogin {
    UserLogin::new(name).unwrap()
}

pub fn labels(names: &[&str]) -> LabelSet {
    names.iter().map(|n| LabelName::new(*n).unwrap()).collect()
}

/// Issue #42 from the end-to-end scenario.
pub fn borrow_checker_issue() -> Issue {
    Issue {
        number: IssueNumber::new(42),
        kind: SubmissionKind::Issue,
        title: "A Tale of Borrow Checker".into(),
        author: login("ferris"),
        created_at: Timestamp::parse_rfc3339("2024-01-14T08:00:00Z").unwrap(),
        state: IssueState::Closed,
        labels: labels(&["metaphore", "rust"]),
        assignees: vec![login("darkterminal")],
        body: "Once upon a compile...".into(),
    }
}

//! Core domain for the metaphore bot.
//!
//! This crate contains every domain concept, newtype identifier, classification
//! and rendering rule, and the port traits used throughout the workspace.
//! Infrastructure crates implement the traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`IssueNumber`, `LabelName`, `RepositoryId`, etc.) |
//! | [`types`] | Shared value types (`Issue`, `LabelSet`, `Timestamp`, etc.) |
//! | [`classifier`] | Category table and publication gates |
//! | [`render`] | Story template, slugs, paths, base64 encoding |
//! | [`events`] | Trigger events and the `EventSource` port |
//! | [`github`] | `IssueTracker` / `CodeRepository` ports |
//! | [`errors`] | Top-level error type |

pub mod classifier;
pub mod errors;
pub mod events;
pub mod github;
pub mod identifiers;
pub mod render;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use classifier::{assess, classify, is_exact_match, Category, Eligibility, SkipReason, REQUIRED_TAG};
pub use errors::MetaphorError;
pub use events::{EventAction, EventSource, EventSourceError, GitHubEvent};
pub use github::{CodeRepository, FileCommit, GitHubError, IssueTracker};
pub use identifiers::{
    BranchName, CommitSha, ContentPath, InvalidRepositoryId, IssueNumber, LabelName, RepositoryId,
    RunId, UserLogin,
};
pub use render::{
    render_story, slugify, story_path, substitute, EncodedContent, StoryDocument, StoryFields,
    STORY_TEMPLATE,
};
pub use types::{
    BotIdentity, Issue, IssueState, LabelSet, ReviewerAllowList, SubmissionKind, Timestamp,
};

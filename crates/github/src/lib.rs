//! Metaphore bot GitHub infrastructure adapter.
//!
//! Implements the GitHub-facing traits defined in the [`pipeline`] crate
//! (`IssueTracker`, `CodeRepository`) over the GitHub REST API v3 using
//! [`reqwest`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! All GitHub API details (URLs, headers, status mapping, JSON shapes) are
//! handled here; the [`pipeline`] crate never sees them.
//!
//! ## Endpoints
//!
//! | Port method | Endpoint |
//! |-------------|----------|
//! | `get_issue` | `GET /repos/{owner}/{repo}/issues/{number}` |
//! | `set_labels` | `PUT /repos/{owner}/{repo}/issues/{number}/labels` |
//! | `post_comment` | `POST /repos/{owner}/{repo}/issues/{number}/comments` |
//! | `has_prior_submission` | `GET /repos/{owner}/{repo}/issues?creator=...&state=all` |
//! | `create_file` | `PUT /repos/{owner}/{repo}/contents/{path}` |

pub mod client;
pub mod models;

pub use client::{ClientError, GitHubClient, GitHubClientConfig, DEFAULT_API_URL};
pub use models::{ApiIssue, ModelError};

//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example, a
//! [`UserLogin`] with a [`LabelName`] even though both are strings under the hood.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub(crate) String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// The repository-scoped number of an issue or pull request (`#42`).
    ///
    /// Issues and pull requests share one number sequence per repository.
    IssueNumber
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single bot invocation.
///
/// Generated fresh for every run and attached to the root tracing span so all
/// activity from one workflow step can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (GitHub / Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// A GitHub account handle (e.g. `"darkterminal"`), without the leading `@`.
    UserLogin
}

string_id! {
    /// The name of an issue label (e.g. `"metaphore"`, `"rust"`).
    ///
    /// Label comparison is exact and case-sensitive.
    LabelName
}

string_id! {
    /// A Git branch name (e.g. `"main"`).
    BranchName
}

string_id! {
    /// A Git commit SHA returned by the contents API.
    CommitSha
}

string_id! {
    /// A file path relative to the content repository root
    /// (e.g. `"src/content/stories/rust/a-tale-of-borrow-checker.md"`).
    ContentPath
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Identifies a GitHub repository in `"owner/name"` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    /// Creates a repository identifier, returning `None` if either part is
    /// empty or contains a `/`.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Option<Self> {
        let owner = owner.into();
        let name = name.into();
        let valid = |s: &str| !s.is_empty() && !s.contains('/');
        if valid(&owner) && valid(&name) {
            Some(Self { owner, name })
        } else {
            None
        }
    }

    /// The account or organisation that owns the repository.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepositoryId {
    type Err = InvalidRepositoryId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once('/')
            .and_then(|(owner, name)| Self::new(owner, name))
            .ok_or_else(|| InvalidRepositoryId(s.to_string()))
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Returned when a string is not a valid `owner/name` pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository '{0}', expected owner/name")]
pub struct InvalidRepositoryId(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_reject_empty_values() {
        assert!(UserLogin::new("").is_none());
        assert_eq!(LabelName::new("rust").unwrap().as_str(), "rust");
    }

    #[test]
    fn repository_id_parses_owner_and_name() {
        let repo: RepositoryId = "darkterminal/metaphore".parse().unwrap();
        assert_eq!(repo.owner(), "darkterminal");
        assert_eq!(repo.name(), "metaphore");
        assert_eq!(repo.to_string(), "darkterminal/metaphore");
    }

    #[test]
    fn repository_id_rejects_malformed_input() {
        for raw in ["", "metaphore", "/metaphore", "darkterminal/", "a/b/c"] {
            assert!(raw.parse::<RepositoryId>().is_err(), "{raw} should not parse");
        }
    }
}

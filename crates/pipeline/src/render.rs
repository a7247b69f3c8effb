//! Story rendering: front-matter template substitution, title slugs, story
//! paths, and the transport encoding used by the contents API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::{Category, ContentPath, Issue, IssueNumber, Timestamp};

/// The story file template. Front matter carries five fixed keys followed by a
/// blank line and the issue body verbatim.
///
/// Values are inserted literally, without YAML quoting. A title containing
/// `: ` or starting with a YAML indicator (`#`, `[`, `&`, ...) yields front
/// matter that a strict YAML parser rejects; such titles need editing before
/// the story is built.
pub const STORY_TEMPLATE: &str = "---
layout: story
title: {title}
author: {author}
created_at: {created_at}
language: {language}
---

{content}
";

/// The values substituted into [`STORY_TEMPLATE`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoryFields<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub created_at: Timestamp,
    pub category: Category,
    pub content: &'a str,
}

impl<'a> StoryFields<'a> {
    /// Collects the story fields from an issue filed under `category`.
    pub fn from_issue(issue: &'a Issue, category: Category) -> Self {
        Self {
            title: &issue.title,
            author: issue.author.as_str(),
            created_at: issue.created_at,
            category,
            content: &issue.body,
        }
    }
}

/// A rendered story file, ready to be encoded and committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDocument(String);

impl StoryDocument {
    /// The rendered markdown text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base64-encodes the document for the contents API.
    pub fn encode(&self) -> EncodedContent {
        EncodedContent(STANDARD.encode(self.0.as_bytes()))
    }
}

/// Standard (padded) base64 of a document's UTF-8 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContent(String);

impl EncodedContent {
    /// The base64 text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Renders [`STORY_TEMPLATE`] with `fields`.
pub fn render_story(fields: &StoryFields<'_>) -> StoryDocument {
    let created_at = fields.created_at.to_string();
    StoryDocument(substitute(STORY_TEMPLATE, |name| match name {
        "title" => Some(fields.title),
        "author" => Some(fields.author),
        "created_at" => Some(created_at.as_str()),
        "language" => Some(fields.category.label()),
        "content" => Some(fields.content),
        _ => None,
    }))
}

/// Replaces every `{name}` token in `template` for which `lookup` returns a
/// value.
///
/// The scan runs once over the template. Substituted values are appended to
/// the output and never scanned again, so a value that itself contains
/// `{title}` is emitted verbatim. Tokens `lookup` does not recognise are
/// copied unchanged.
pub fn substitute<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('}') {
            Some(close) => {
                let name = &after_open[..close];
                match lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after_open[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Converts a title into a file-name slug.
///
/// ASCII letters and digits are kept and lower-cased; every run of other
/// characters becomes a single `-`; separators at either end are dropped.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Builds `{stories_root}/{category}/{slug}.md`.
///
/// Falls back to `issue-{number}` as the file stem when the title has no
/// ASCII letters or digits.
pub fn story_path(
    stories_root: &str,
    category: Category,
    title: &str,
    number: IssueNumber,
) -> ContentPath {
    let mut stem = slugify(title);
    if stem.is_empty() {
        stem = format!("issue-{number}");
    }
    let root = stories_root.trim_matches('/');
    let path = if root.is_empty() {
        format!("{category}/{stem}.md")
    } else {
        format!("{root}/{category}/{stem}.md")
    };
    ContentPath(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(title: &'a str, content: &'a str) -> StoryFields<'a> {
        StoryFields {
            title,
            author: "writer",
            created_at: Timestamp::parse_rfc3339("2024-01-14T08:00:00Z").unwrap(),
            category: Category::Rust,
            content,
        }
    }

    #[test]
    fn renders_front_matter_and_body() {
        let doc = render_story(&fields("A Tale of Borrow Checker", "Once upon a compile..."));
        assert_eq!(
            doc.as_str(),
            "---\nlayout: story\ntitle: A Tale of Borrow Checker\nauthor: writer\n\
             created_at: 2024-01-14T08:00:00Z\nlanguage: rust\n---\n\nOnce upon a compile...\n"
        );
    }

    #[test]
    fn plain_values_leave_no_placeholders() {
        let doc = render_story(&fields("Ownership", "Borrowed books go back."));
        for token in ["{title}", "{author}", "{created_at}", "{language}", "{content}"] {
            assert!(!doc.as_str().contains(token), "{token} left in output");
        }
    }

    #[test]
    fn placeholder_text_in_values_is_emitted_verbatim() {
        let doc = render_story(&fields("About {content}", "Use {title} and {author} here"));
        assert!(doc.as_str().contains("title: About {content}\n"));
        assert!(doc.as_str().ends_with("\nUse {title} and {author} here\n"));
    }

    #[test]
    fn yaml_significant_titles_are_not_quoted() {
        let doc = render_story(&fields("Rust: ownership", "body"));
        assert!(doc.as_str().contains("\ntitle: Rust: ownership\n"));
    }

    #[test]
    fn substitute_keeps_unknown_and_unclosed_tokens() {
        let out = substitute("{a} {b} {c", |name| (name == "a").then_some("x"));
        assert_eq!(out, "x {b} {c");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("A Tale of Borrow Checker"), "a-tale-of-borrow-checker");
        assert_eq!(slugify("  --C++ & Rust: 2 langs--  "), "c-rust-2-langs");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn story_path_uses_root_category_and_slug() {
        let path = story_path(
            "src/content/stories/",
            Category::Rust,
            "A Tale of Borrow Checker",
            IssueNumber::new(42),
        );
        assert_eq!(
            path.as_str(),
            "src/content/stories/rust/a-tale-of-borrow-checker.md"
        );
    }

    #[test]
    fn story_path_falls_back_to_issue_number() {
        let path = story_path("stories", Category::Zig, "???", IssueNumber::new(7));
        assert_eq!(path.as_str(), "stories/zig/issue-7.md");
    }

    #[test]
    fn encode_is_standard_base64() {
        let doc = StoryDocument("hi\n".to_string());
        assert_eq!(doc.encode().as_str(), "aGkK");
    }
}

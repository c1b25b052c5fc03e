//! UI-facing projection of threads.
//!
//! This is the serialized thread list a side panel renders. Field names are
//! camelCase to match what webview front ends expect.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::id::{CommentRef, ThreadId};
use crate::thread::{Thread, ThreadState};

/// One-indexed, inclusive line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLineRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalComment {
    /// Composite `<threadId>:comment:<commentId>` ID.
    pub id: CommentRef,
    pub thread_id: ThreadId,
    pub content: String,
    pub author: ExternalAuthor,
    pub created_at: DateTime<Utc>,
    /// `false` only for the first comment of a thread.
    pub is_reply: bool,
    /// Composite ID of the thread's first comment, set on replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<CommentRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalThread {
    pub id: ThreadId,
    pub file_path: String,
    /// One-indexed first line.
    pub line: u32,
    /// Set only when the thread spans more than one line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_range: Option<ExternalLineRange>,
    pub status: ThreadState,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub comments: Vec<ExternalComment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExternalComment {
    fn from_comment(comment: &Comment, parent: Option<CommentRef>) -> Self {
        Self {
            id: comment.comment_ref(),
            thread_id: comment.thread(),
            content: comment.body().as_str().to_string(),
            author: ExternalAuthor {
                name: comment.author().name.clone(),
                avatar_url: comment.author().avatar_url.clone(),
            },
            created_at: comment.created_at(),
            is_reply: parent.is_some(),
            parent_comment_id: parent,
        }
    }
}

impl Thread {
    /// Build the UI projection of this thread.
    ///
    /// `file_path` is relative to `workspace_root` when possible. Threads on
    /// non-file URIs fall back to `<uri>:<line>`.
    #[must_use]
    pub fn to_external(&self, workspace_root: Option<&Path>) -> ExternalThread {
        let location = self.location();
        let line = location.line();
        let file_path = location
            .relative_path(workspace_root)
            .unwrap_or_else(|| format!("{}:{line}", location.uri));

        let root_ref = self.first_comment().map(Comment::comment_ref);
        let comments = self
            .comments()
            .iter()
            .enumerate()
            .map(|(index, comment)| {
                let parent = if index == 0 { None } else { root_ref };
                ExternalComment::from_comment(comment, parent)
            })
            .collect();

        ExternalThread {
            id: self.id(),
            file_path,
            line,
            line_range: location.is_multi_line().then(|| ExternalLineRange {
                start: line,
                end: location.end_line(),
            }),
            status: self.state(),
            is_draft: self.is_draft(),
            label: self.label().map(ToString::to_string),
            comments,
            created_at: self.created_at(),
            updated_at: self.updated_at(),
        }
    }
}

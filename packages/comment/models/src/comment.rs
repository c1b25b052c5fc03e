use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{CommentId, CommentRef, ThreadId};

/// Body of a comment: either plain text or markdown source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommentBody {
    Plain(String),
    Markdown(String),
}

impl CommentBody {
    /// The text of the body, with markdown left as source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Markdown(text) => text,
        }
    }

    #[must_use]
    pub const fn is_markdown(&self) -> bool {
        matches!(self, Self::Markdown(_))
    }
}

impl Default for CommentBody {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl From<&str> for CommentBody {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<String> for CommentBody {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl std::fmt::Display for CommentBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Author of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    /// Display name.
    pub name: String,
    /// Avatar image location, if the host knows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CommentAuthor {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            avatar_url: None,
            email: None,
        }
    }
}

/// Whether a comment is being displayed or edited.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::AsRefStr,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommentMode {
    #[default]
    Preview,
    Editing,
}

/// A single comment or reply inside a thread.
///
/// `saved_body` holds the last explicitly saved body. `body` may drift from
/// it while the comment is in [`CommentMode::Editing`]; [`Comment::save`] is
/// the only way to move `saved_body` forward after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    id: CommentId,
    thread: ThreadId,
    body: CommentBody,
    saved_body: CommentBody,
    author: CommentAuthor,
    mode: CommentMode,
    label: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment in preview mode.
    #[must_use]
    pub fn new(
        id: CommentId,
        thread: ThreadId,
        body: CommentBody,
        author: CommentAuthor,
        label: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            thread,
            saved_body: body.clone(),
            body,
            author,
            mode: CommentMode::Preview,
            label,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// The thread this comment belongs to.
    #[must_use]
    pub const fn thread(&self) -> ThreadId {
        self.thread
    }

    #[must_use]
    pub const fn comment_ref(&self) -> CommentRef {
        CommentRef::new(self.thread, self.id)
    }

    #[must_use]
    pub const fn body(&self) -> &CommentBody {
        &self.body
    }

    #[must_use]
    pub const fn saved_body(&self) -> &CommentBody {
        &self.saved_body
    }

    #[must_use]
    pub const fn author(&self) -> &CommentAuthor {
        &self.author
    }

    #[must_use]
    pub const fn mode(&self) -> CommentMode {
        self.mode
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the body has unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.body != self.saved_body
    }

    /// Replace the body without saving it.
    pub fn update_body(&mut self, body: CommentBody, now: DateTime<Utc>) {
        self.body = body;
        self.updated_at = now;
    }

    /// Commit the current body as the saved body and leave editing mode.
    pub fn save(&mut self, now: DateTime<Utc>) {
        self.saved_body = self.body.clone();
        self.mode = CommentMode::Preview;
        self.updated_at = now;
    }

    /// Throw away unsaved changes and leave editing mode.
    pub fn cancel(&mut self) {
        self.body = self.saved_body.clone();
        self.mode = CommentMode::Preview;
    }

    /// Switch to editing mode.
    pub fn edit(&mut self) {
        self.mode = CommentMode::Editing;
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}

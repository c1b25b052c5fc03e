use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::comment::Comment;
use crate::id::{CommentId, ThreadId};

const CONTEXT_SEPARATOR: char = '|';
const DRAFT_TAG: &str = "draft";
const RESOLVED_TAG: &str = "resolved";

/// Zero-based, inclusive line range as reported by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    #[must_use]
    pub const fn single(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }
}

/// Where a thread is anchored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadLocation {
    /// File identifier. Either a filesystem path, a `file://` URI, or some
    /// other editor URI (`untitled:`, `vscode-notebook-cell://`, ...).
    pub uri: String,
    pub range: LineRange,
    /// Zero-based column of the range start.
    #[serde(default)]
    pub start_character: u32,
}

impl ThreadLocation {
    #[must_use]
    pub fn new(uri: impl Into<String>, range: LineRange) -> Self {
        Self {
            uri: uri.into(),
            range,
            start_character: 0,
        }
    }

    /// One-indexed first line.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.range.start + 1
    }

    /// One-indexed last line.
    #[must_use]
    pub const fn end_line(&self) -> u32 {
        self.range.end + 1
    }

    /// One-indexed column of the range start.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.start_character + 1
    }

    #[must_use]
    pub const fn is_multi_line(&self) -> bool {
        self.range.start != self.range.end
    }

    /// The filesystem path behind `uri`, if it names one.
    #[must_use]
    pub fn fs_path(&self) -> Option<&Path> {
        if let Some(path) = self.uri.strip_prefix("file://") {
            return Some(Path::new(path));
        }
        if self.uri.contains("://") || has_editor_scheme(&self.uri) {
            return None;
        }
        Some(Path::new(&self.uri))
    }

    /// Path for display, relative to `workspace_root` when the file lives
    /// under it.
    ///
    /// Returns `None` when `uri` does not name a filesystem path at all.
    #[must_use]
    pub fn relative_path(&self, workspace_root: Option<&Path>) -> Option<String> {
        let path = self.fs_path()?;
        let relative = workspace_root
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        Some(relative.to_string_lossy().into_owned())
    }
}

/// Editor URIs like `untitled:Untitled-1` carry a scheme without `//`.
/// Windows drive letters (`C:\...`) are single characters and don't count.
fn has_editor_scheme(uri: &str) -> bool {
    uri.split_once(':').is_some_and(|(scheme, _)| {
        scheme.len() > 1
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Resolution state of a thread.
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
pub enum ThreadState {
    #[default]
    Open,
    Resolved,
}

/// Whether the editor shows a thread expanded or collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapsibleState {
    #[default]
    Expanded,
    Collapsed,
}

/// Typed replacement for the host's free-form `contextValue` string.
///
/// The string form is derived, never stored, so the draft flag, the
/// resolution state and the marker string can't disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreadContext {
    pub draft: bool,
    pub state: ThreadState,
}

impl ThreadContext {
    /// Render the `contextValue` marker, e.g. `"draft|resolved"`.
    #[must_use]
    pub fn context_value(&self) -> String {
        let mut tags = Vec::with_capacity(2);
        if self.draft {
            tags.push(DRAFT_TAG);
        }
        if self.state == ThreadState::Resolved {
            tags.push(RESOLVED_TAG);
        }
        tags.join(&CONTEXT_SEPARATOR.to_string())
    }

    /// Parse a host `contextValue` string. Unknown tags and empty segments
    /// left behind by sloppy string edits are ignored.
    #[must_use]
    pub fn from_context_value(value: &str) -> Self {
        let mut context = Self::default();
        for tag in value.split(CONTEXT_SEPARATOR).map(str::trim) {
            match tag {
                DRAFT_TAG => context.draft = true,
                RESOLVED_TAG => context.state = ThreadState::Resolved,
                _ => {}
            }
        }
        context
    }
}

/// A location-anchored, ordered collection of comments.
///
/// Comments are only ever appended or removed, never reordered. `updated_at`
/// never moves backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    id: ThreadId,
    location: ThreadLocation,
    comments: Vec<Comment>,
    context: ThreadContext,
    collapsible: CollapsibleState,
    label: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Thread {
    #[must_use]
    pub fn new(id: ThreadId, location: ThreadLocation, now: DateTime<Utc>) -> Self {
        Self {
            id,
            location,
            comments: vec![],
            context: ThreadContext {
                draft: false,
                state: ThreadState::Open,
            },
            collapsible: CollapsibleState::Expanded,
            label: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ThreadId {
        self.id
    }

    #[must_use]
    pub const fn location(&self) -> &ThreadLocation {
        &self.location
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub const fn context(&self) -> ThreadContext {
        self.context
    }

    #[must_use]
    pub const fn state(&self) -> ThreadState {
        self.context.state
    }

    #[must_use]
    pub const fn is_draft(&self) -> bool {
        self.context.draft
    }

    #[must_use]
    pub const fn collapsible(&self) -> CollapsibleState {
        self.collapsible
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

    #[must_use]
    pub fn first_comment(&self) -> Option<&Comment> {
        self.comments.first()
    }

    #[must_use]
    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id() == id)
    }

    pub fn comment_mut(&mut self, id: CommentId) -> Option<&mut Comment> {
        self.comments.iter_mut().find(|c| c.id() == id)
    }

    pub fn comments_mut(&mut self) -> impl Iterator<Item = &mut Comment> {
        self.comments.iter_mut()
    }

    /// Refresh `updated_at`, never moving it backwards.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = self.updated_at.max(now);
    }

    pub fn push_comment(&mut self, comment: Comment, now: DateTime<Utc>) {
        self.comments.push(comment);
        self.touch(now);
    }

    /// Remove a comment, keeping the order of the rest.
    pub fn remove_comment(&mut self, id: CommentId, now: DateTime<Utc>) -> Option<Comment> {
        let pos = self.comments.iter().position(|c| c.id() == id)?;
        let removed = self.comments.remove(pos);
        self.touch(now);
        Some(removed)
    }

    pub fn set_state(&mut self, state: ThreadState, now: DateTime<Utc>) {
        self.context.state = state;
        self.touch(now);
    }

    pub const fn set_draft(&mut self, draft: bool) {
        self.context.draft = draft;
    }

    pub const fn set_collapsible(&mut self, collapsible: CollapsibleState) {
        self.collapsible = collapsible;
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;
    use crate::comment::CommentAuthor;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn thread() -> Thread {
        Thread::new(
            ThreadId::new(1, 0),
            ThreadLocation::new("src/lib.rs", LineRange::single(4)),
            at(100),
        )
    }

    fn comment(id: u64) -> Comment {
        Comment::new(
            CommentId(id),
            ThreadId::new(1, 0),
            format!("comment {id}").into(),
            CommentAuthor::named("Alice"),
            None,
            at(100),
        )
    }

    #[test]
    fn test_context_value_rendering() {
        let mut ctx = ThreadContext::default();
        assert_eq!(ctx.context_value(), "");

        ctx.state = ThreadState::Resolved;
        assert_eq!(ctx.context_value(), "resolved");

        ctx.draft = true;
        assert_eq!(ctx.context_value(), "draft|resolved");

        ctx.state = ThreadState::Open;
        assert_eq!(ctx.context_value(), "draft");
    }

    #[test]
    fn test_context_value_parses_mangled_separators() {
        let ctx = ThreadContext::from_context_value("|resolved||");
        assert_eq!(ctx.state, ThreadState::Resolved);
        assert!(!ctx.draft);

        let ctx = ThreadContext::from_context_value("draft|");
        assert_eq!(ctx.state, ThreadState::Open);
        assert!(ctx.draft);
    }

    #[test]
    fn test_context_value_round_trip_after_cycles() {
        let mut ctx = ThreadContext::default();
        for _ in 0..5 {
            ctx.state = ThreadState::Resolved;
            ctx = ThreadContext::from_context_value(&ctx.context_value());
            ctx.state = ThreadState::Open;
            ctx = ThreadContext::from_context_value(&ctx.context_value());
        }
        assert_eq!(ctx, ThreadContext::default());
        assert_eq!(ctx.context_value(), "");
    }

    #[test]
    fn test_touch_never_moves_backwards() {
        let mut t = thread();
        t.touch(at(50));
        assert_eq!(t.updated_at(), at(100));
        t.touch(at(200));
        assert_eq!(t.updated_at(), at(200));
    }

    #[test]
    fn test_remove_comment_keeps_order() {
        let mut t = thread();
        for id in 1..=4 {
            t.push_comment(comment(id), at(100));
        }

        let removed = t.remove_comment(CommentId(2), at(110)).unwrap();
        assert_eq!(removed.id(), CommentId(2));

        let ids: Vec<_> = t.comments().iter().map(Comment::id).collect();
        assert_eq!(ids, vec![CommentId(1), CommentId(3), CommentId(4)]);
        assert!(t.remove_comment(CommentId(2), at(120)).is_none());
    }

    #[test]
    fn test_location_line_numbers() {
        let loc = ThreadLocation::new("a.rs", LineRange { start: 2, end: 6 });
        assert_eq!(loc.line(), 3);
        assert_eq!(loc.end_line(), 7);
        assert_eq!(loc.column(), 1);
        assert!(loc.is_multi_line());
        assert!(!ThreadLocation::new("a.rs", LineRange::single(2)).is_multi_line());
    }

    #[test]
    fn test_relative_path() {
        let root = Path::new("/work/project");

        let loc = ThreadLocation::new("file:///work/project/src/main.rs", LineRange::single(0));
        assert_eq!(loc.relative_path(Some(root)).as_deref(), Some("src/main.rs"));

        let loc = ThreadLocation::new("/elsewhere/main.rs", LineRange::single(0));
        assert_eq!(
            loc.relative_path(Some(root)).as_deref(),
            Some("/elsewhere/main.rs")
        );

        let loc = ThreadLocation::new("test.ts", LineRange::single(0));
        assert_eq!(loc.relative_path(None).as_deref(), Some("test.ts"));

        let loc = ThreadLocation::new("untitled:Untitled-1", LineRange::single(0));
        assert_eq!(loc.relative_path(Some(root)), None);

        let loc = ThreadLocation::new("vscode-notebook-cell://x/y", LineRange::single(0));
        assert_eq!(loc.relative_path(None), None);
    }
}

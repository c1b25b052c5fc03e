//! The thread registry.
//!
//! Single source of truth for which threads exist, what their IDs are, and
//! what the editor and the UI should show for them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use reviewpad_comment_models::{
    CollapsibleState, Comment, CommentAuthor, CommentBody, CommentId, CommentRef, ExternalThread,
    Thread, ThreadId, ThreadState,
};

use crate::clock::{Clock, SystemClock};
use crate::config::ReviewConfig;
use crate::ids::IdGenerator;
use crate::listener::{ListenerError, ListenerId, Listeners};
use crate::native::{NativeHandle, NativeThread, NativeThreadView};

/// Data for a comment that is about to be added to a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub body: CommentBody,
    pub author: CommentAuthor,
    pub label: Option<String>,
}

impl NewComment {
    #[must_use]
    pub fn new(body: impl Into<CommentBody>, author: CommentAuthor) -> Self {
        Self {
            body: body.into(),
            author,
            label: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Result of [`ThreadRegistry::remove_comment_from_thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveCommentOutcome {
    /// No such thread or comment. Nothing changed.
    NotFound,
    /// The comment was removed and the thread still has comments.
    Removed,
    /// The comment was the last one, so the thread was destroyed too.
    ThreadDeleted,
}

struct TrackedThread {
    thread: Thread,
    native: Box<dyn NativeThread>,
}

impl TrackedThread {
    fn sync(&mut self) {
        let view = NativeThreadView {
            comments: self.thread.comments(),
            context_value: self.thread.context().context_value(),
            state: self.thread.state(),
            collapsible: self.thread.collapsible(),
            label: self.thread.label(),
        };
        self.native.sync(&view);
    }

    /// Dispose the native thread and hand back the thread data.
    fn destroy(mut self) -> Thread {
        if let Err(e) = self.native.dispose() {
            log::warn!("Failed to dispose native thread {}: {e}", self.thread.id());
        }
        self.thread
    }
}

/// In-memory registry of comment threads.
///
/// All operations run to completion synchronously. Lookups that miss are
/// reported through the return value and never change state. Every mutation
/// that changes the UI projection notifies listeners exactly once, after the
/// mutation is complete.
pub struct ThreadRegistry {
    threads: BTreeMap<ThreadId, TrackedThread>,
    ids: IdGenerator,
    clock: Box<dyn Clock>,
    listeners: Listeners,
    config: ReviewConfig,
}

impl std::fmt::Debug for ThreadRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadRegistry")
            .field("threads", &self.threads.keys().collect::<Vec<_>>())
            .field("ids", &self.ids)
            .field("listeners", &self.listeners)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new(ReviewConfig::default())
    }
}

impl ThreadRegistry {
    /// Create a registry that stamps times from the system clock.
    #[must_use]
    pub fn new(config: ReviewConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    #[must_use]
    pub fn with_clock(config: ReviewConfig, clock: impl Clock + 'static) -> Self {
        Self {
            threads: BTreeMap::new(),
            ids: IdGenerator::new(),
            clock: Box::new(clock),
            listeners: Listeners::default(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Register a change listener.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut() -> Result<(), ListenerError> + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn notify(&mut self) {
        self.listeners.notify();
    }

    fn id_for_handle(&self, handle: NativeHandle) -> Option<ThreadId> {
        self.threads
            .iter()
            .find(|(_, entry)| entry.native.handle() == handle)
            .map(|(id, _)| *id)
    }

    /// Track a native thread, or touch it if it is already tracked.
    fn track(&mut self, native: Box<dyn NativeThread>) -> ThreadId {
        let now = self.now();

        if let Some(id) = self.id_for_handle(native.handle()) {
            if let Some(entry) = self.threads.get_mut(&id) {
                entry.thread.touch(now);
            }
            return id;
        }

        let id = self.ids.next_thread_id(now);
        let mut entry = TrackedThread {
            thread: Thread::new(id, native.location(), now),
            native,
        };
        entry.sync();
        self.threads.insert(id, entry);
        log::debug!("Tracking thread {id}");

        id
    }

    /// Start tracking a native thread.
    ///
    /// A handle that is already tracked keeps its ID and only has its
    /// `updated_at` refreshed. The duplicate handle object is dropped.
    pub fn add_thread(&mut self, native: Box<dyn NativeThread>) -> ThreadId {
        let id = self.track(native);
        self.notify();
        id
    }

    /// Stop tracking a native thread without disposing it.
    ///
    /// For hosts that have already torn the native thread down themselves.
    pub fn remove_thread(&mut self, handle: NativeHandle) -> Option<Thread> {
        let id = self.id_for_handle(handle)?;
        let entry = self.threads.remove(&id)?;
        log::debug!("Untracked thread {id}");
        self.notify();
        Some(entry.thread)
    }

    /// Destroy a thread as a whole, disposing its native thread.
    pub fn delete_thread(&mut self, id: ThreadId) -> Option<Thread> {
        let entry = self.threads.remove(&id)?;
        let thread = entry.destroy();
        log::info!("Deleted thread {id}");
        self.notify();
        Some(thread)
    }

    #[must_use]
    pub fn find_thread_by_id(&self, id: ThreadId) -> Option<&Thread> {
        self.threads.get(&id).map(|entry| &entry.thread)
    }

    #[must_use]
    pub fn find_thread_by_handle(&self, handle: NativeHandle) -> Option<&Thread> {
        self.id_for_handle(handle)
            .and_then(|id| self.find_thread_by_id(id))
    }

    #[must_use]
    pub fn find_comment(&self, comment: CommentRef) -> Option<&Comment> {
        self.find_thread_by_id(comment.thread)?
            .comment(comment.comment)
    }

    /// Snapshot of every thread in creation order.
    #[must_use]
    pub fn all_threads(&self) -> Vec<Thread> {
        self.threads
            .values()
            .map(|entry| entry.thread.clone())
            .collect()
    }

    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    fn insert_comment(&mut self, comment_ref: CommentRef, new: NewComment) -> bool {
        let now = self.now();
        let Some(entry) = self.threads.get_mut(&comment_ref.thread) else {
            return false;
        };

        let comment = Comment::new(
            comment_ref.comment,
            comment_ref.thread,
            new.body,
            new.author,
            new.label,
            now,
        );
        entry.thread.push_comment(comment, now);
        entry.sync();
        true
    }

    /// Add a comment to a native thread, tracking the thread first if needed.
    pub fn add_comment_to_thread(
        &mut self,
        native: Box<dyn NativeThread>,
        comment: NewComment,
    ) -> CommentRef {
        let thread = self.track(native);
        let comment_ref = CommentRef::new(thread, self.ids.next_comment_id());
        self.insert_comment(comment_ref, comment);
        self.notify();
        comment_ref
    }

    /// Append a comment to a tracked thread.
    pub fn append_comment(&mut self, thread: ThreadId, comment: NewComment) -> Option<CommentRef> {
        if !self.threads.contains_key(&thread) {
            return None;
        }

        let comment_ref = CommentRef::new(thread, self.ids.next_comment_id());
        self.insert_comment(comment_ref, comment);
        self.notify();
        Some(comment_ref)
    }

    /// Reply to a thread as `author_name`.
    pub fn reply_to_thread(
        &mut self,
        thread: ThreadId,
        content: &str,
        author_name: &str,
    ) -> Option<CommentRef> {
        self.append_comment(
            thread,
            NewComment::new(content, CommentAuthor::named(author_name)),
        )
    }

    /// Remove a comment. Removing the last comment destroys the thread.
    pub fn remove_comment_from_thread(
        &mut self,
        thread: ThreadId,
        comment: CommentId,
    ) -> RemoveCommentOutcome {
        let now = self.now();
        let Some(entry) = self.threads.get_mut(&thread) else {
            return RemoveCommentOutcome::NotFound;
        };
        if entry.thread.remove_comment(comment, now).is_none() {
            return RemoveCommentOutcome::NotFound;
        }
        log::info!("Deleted comment {comment} from thread {thread}");

        let outcome = if entry.thread.comments().is_empty() {
            if let Some(entry) = self.threads.remove(&thread) {
                entry.destroy();
            }
            log::info!("Deleted thread {thread} after its last comment was removed");
            RemoveCommentOutcome::ThreadDeleted
        } else {
            entry.sync();
            RemoveCommentOutcome::Removed
        };

        self.notify();
        outcome
    }

    /// Apply `f` to a comment and push the result to the native thread.
    fn with_comment(
        &mut self,
        comment_ref: CommentRef,
        f: impl FnOnce(&mut Comment, DateTime<Utc>),
    ) -> bool {
        let now = self.now();
        let Some(entry) = self.threads.get_mut(&comment_ref.thread) else {
            return false;
        };
        let Some(comment) = entry.thread.comment_mut(comment_ref.comment) else {
            return false;
        };

        f(comment, now);
        entry.sync();
        true
    }

    /// Save a comment's current body and return it to preview mode.
    pub fn save_comment_in_thread(&mut self, thread: ThreadId, comment: CommentId) -> bool {
        let saved = self.with_comment(CommentRef::new(thread, comment), |c, now| c.save(now));
        if !saved {
            return false;
        }

        let now = self.now();
        if let Some(entry) = self.threads.get_mut(&thread) {
            entry.thread.touch(now);
        }
        self.notify();
        true
    }

    /// Replace a comment's body without saving it.
    pub fn update_comment_body(&mut self, comment: CommentRef, body: CommentBody) -> bool {
        self.with_comment(comment, |c, now| c.update_body(body, now))
    }

    /// Put a comment into editing mode. Other comments are left alone.
    pub fn edit_comment(&mut self, comment: CommentRef) -> bool {
        self.with_comment(comment, |c, _| c.edit())
    }

    /// Revert a comment to its saved body and return it to preview mode.
    pub fn cancel_comment(&mut self, comment: CommentRef) -> bool {
        self.with_comment(comment, |c, _| c.cancel())
    }

    /// The one place resolution state changes.
    fn set_thread_state(&mut self, thread: ThreadId, state: ThreadState) -> bool {
        let now = self.now();
        let Some(entry) = self.threads.get_mut(&thread) else {
            return false;
        };

        entry.thread.set_state(state, now);
        entry.thread.set_collapsible(match state {
            ThreadState::Open => CollapsibleState::Expanded,
            ThreadState::Resolved => CollapsibleState::Collapsed,
        });
        entry.sync();
        log::info!("Thread {thread} state changed to: {state:?}");

        self.notify();
        true
    }

    pub fn resolve_thread(&mut self, thread: ThreadId) -> bool {
        self.set_thread_state(thread, ThreadState::Resolved)
    }

    pub fn reopen_thread(&mut self, thread: ThreadId) -> bool {
        self.set_thread_state(thread, ThreadState::Open)
    }

    /// Mark an open thread as a draft and append its first draft comment.
    ///
    /// Resolved threads have to be reopened first. Starting a draft on a
    /// thread that already is one only appends the comment.
    pub fn start_draft(&mut self, thread: ThreadId, comment: NewComment) -> Option<CommentRef> {
        let entry = self.threads.get_mut(&thread)?;
        if entry.thread.state() == ThreadState::Resolved {
            log::debug!("Not starting a draft on resolved thread {thread}");
            return None;
        }
        entry.thread.set_draft(true);

        let comment_ref = CommentRef::new(thread, self.ids.next_comment_id());
        self.insert_comment(comment_ref, comment);
        log::debug!("Thread {thread} is now a draft");

        self.notify();
        Some(comment_ref)
    }

    /// Finish a draft: optionally append one last comment, clear the draft
    /// marker, collapse the thread and drop the pending label from every
    /// comment in it.
    pub fn finish_draft(&mut self, thread: ThreadId, final_comment: Option<NewComment>) -> bool {
        if !self.threads.contains_key(&thread) {
            return false;
        }

        if let Some(new) = final_comment {
            let comment_ref = CommentRef::new(thread, self.ids.next_comment_id());
            self.insert_comment(comment_ref, new);
        }

        let now = self.now();
        let pending = self.config.pending_label.as_str();
        let Some(entry) = self.threads.get_mut(&thread) else {
            return false;
        };

        entry.thread.set_draft(false);
        entry.thread.set_collapsible(CollapsibleState::Collapsed);
        for comment in entry.thread.comments_mut() {
            if comment.label() == Some(pending) {
                comment.set_label(None);
            }
        }
        entry.thread.touch(now);
        entry.sync();
        log::debug!("Finished draft on thread {thread}");

        self.notify();
        true
    }

    pub fn set_thread_label(&mut self, thread: ThreadId, label: Option<String>) -> bool {
        let now = self.now();
        let Some(entry) = self.threads.get_mut(&thread) else {
            return false;
        };

        entry.thread.set_label(label);
        entry.thread.touch(now);
        entry.sync();

        self.notify();
        true
    }

    /// The serialized thread list the UI renders, in creation order.
    #[must_use]
    pub fn to_external_format(&self) -> Vec<ExternalThread> {
        let root = self.config.workspace_root.as_deref();
        self.threads
            .values()
            .map(|entry| entry.thread.to_external(root))
            .collect()
    }
}

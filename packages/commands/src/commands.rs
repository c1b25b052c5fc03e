//! The command dispatcher.
//!
//! Per-thread lifecycle:
//!
//! ```text
//! no-thread --create_thread--> open --start_draft--> draft --finish_draft--> open
//! open --resolve_thread--> resolved --reopen_thread--> open
//! any --delete_thread--> no-thread
//! any --delete_comment(last)--> no-thread
//! ```
//!
//! Every command tolerates input that no longer exists. A click on a thread
//! that was deleted a moment ago is expected, so those commands simply do
//! nothing.

use reviewpad_comment_models::{CommentAuthor, CommentRef, ExternalThread, ThreadId};
use reviewpad_registry::{NativeThread, NewComment, RemoveCommentOutcome, ThreadRegistry};

use crate::ui::{UiCommand, UiCommandError};
use crate::user::UserResolver;

/// Runs user and UI commands against a [`ThreadRegistry`].
#[derive(Debug)]
pub struct CommentCommands<U: UserResolver> {
    registry: ThreadRegistry,
    users: U,
}

impl<U: UserResolver> CommentCommands<U> {
    #[must_use]
    pub const fn new(registry: ThreadRegistry, users: U) -> Self {
        Self { registry, users }
    }

    #[must_use]
    pub const fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }

    pub const fn registry_mut(&mut self) -> &mut ThreadRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn into_registry(self) -> ThreadRegistry {
        self.registry
    }

    /// Pick the author for a new comment.
    ///
    /// An explicit, non-blank name wins. Otherwise the current user, and if
    /// that comes back blank, the configured fallback author.
    #[must_use]
    pub fn resolve_author(&self, explicit: Option<&str>) -> CommentAuthor {
        if let Some(name) = explicit.map(str::trim).filter(|name| !name.is_empty()) {
            return CommentAuthor::named(name);
        }

        let current = self.users.current_user();
        let current = current.trim();
        if current.is_empty() {
            CommentAuthor::named(self.registry.config().fallback_author.clone())
        } else {
            CommentAuthor::named(current)
        }
    }

    fn pending_label(&self) -> String {
        self.registry.config().pending_label.clone()
    }

    /// Start a thread on a native thread with its first comment.
    pub fn create_thread(
        &mut self,
        native: Box<dyn NativeThread>,
        text: &str,
        author: Option<&str>,
    ) -> CommentRef {
        let author = self.resolve_author(author);
        let comment_ref = self
            .registry
            .add_comment_to_thread(native, NewComment::new(text, author));
        log::info!("Created thread {}", comment_ref.thread);
        comment_ref
    }

    /// Reply to a thread. Replies to a draft thread are labelled pending.
    pub fn reply_comment(
        &mut self,
        thread: ThreadId,
        text: &str,
        author: Option<&str>,
    ) -> Option<CommentRef> {
        let is_draft = self.registry.find_thread_by_id(thread)?.is_draft();

        let mut comment = NewComment::new(text, self.resolve_author(author));
        if is_draft {
            comment = comment.with_label(self.pending_label());
        }

        self.registry.append_comment(thread, comment)
    }

    /// Turn an open thread into a draft and add a pending comment to it.
    pub fn start_draft(&mut self, thread: ThreadId, text: &str) -> Option<CommentRef> {
        let comment =
            NewComment::new(text, self.resolve_author(None)).with_label(self.pending_label());
        self.registry.start_draft(thread, comment)
    }

    /// Finish a draft, optionally adding one last comment.
    pub fn finish_draft(&mut self, thread: ThreadId, text: Option<&str>) -> bool {
        let final_comment = text
            .filter(|text| !text.trim().is_empty())
            .map(|text| NewComment::new(text, self.resolve_author(None)));
        self.registry.finish_draft(thread, final_comment)
    }

    /// Delete one comment. Deleting the last comment deletes the thread.
    pub fn delete_comment(&mut self, comment: CommentRef) -> RemoveCommentOutcome {
        self.registry
            .remove_comment_from_thread(comment.thread, comment.comment)
    }

    /// Delete a whole thread.
    pub fn delete_thread(&mut self, thread: ThreadId) -> bool {
        self.registry.delete_thread(thread).is_some()
    }

    pub fn resolve_thread(&mut self, thread: ThreadId) -> bool {
        self.registry.resolve_thread(thread)
    }

    pub fn reopen_thread(&mut self, thread: ThreadId) -> bool {
        self.registry.reopen_thread(thread)
    }

    pub fn edit_comment(&mut self, comment: CommentRef) -> bool {
        self.registry.edit_comment(comment)
    }

    pub fn update_comment_body(&mut self, comment: CommentRef, text: &str) -> bool {
        self.registry.update_comment_body(comment, text.into())
    }

    pub fn save_comment(&mut self, comment: CommentRef) -> bool {
        self.registry
            .save_comment_in_thread(comment.thread, comment.comment)
    }

    /// Throw away unsaved edits to a comment.
    pub fn cancel_save_comment(&mut self, comment: CommentRef) -> bool {
        self.registry.cancel_comment(comment)
    }

    /// Run a command that came from a UI front end.
    pub fn dispatch(&mut self, command: UiCommand) {
        log::debug!("Dispatching UI command: {command:?}");

        let applied = match command {
            UiCommand::Reply {
                thread,
                content,
                author,
            } => self
                .reply_comment(thread, &content, author.as_deref())
                .is_some(),
            UiCommand::Resolve(thread) => self.resolve_thread(thread),
            UiCommand::Reopen(thread) => self.reopen_thread(thread),
            UiCommand::DeleteThread(thread) => self.delete_thread(thread),
            UiCommand::DeleteComment(comment) => {
                self.delete_comment(comment) != RemoveCommentOutcome::NotFound
            }
            UiCommand::EditComment(comment) => self.edit_comment(comment),
            UiCommand::UpdateComment { comment, content } => {
                self.update_comment_body(comment, &content)
            }
            UiCommand::SaveComment(comment) => self.save_comment(comment),
            UiCommand::CancelComment(comment) => self.cancel_save_comment(comment),
        };

        if !applied {
            log::debug!("UI command had nothing to act on");
        }
    }

    /// Parse and run a JSON webview message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message can't be parsed. A well-formed
    /// command that targets a missing thread or comment is not an error.
    pub fn dispatch_json(&mut self, json: &str) -> Result<(), UiCommandError> {
        let command = UiCommand::from_json(json)?;
        self.dispatch(command);
        Ok(())
    }

    #[must_use]
    pub fn threads(&self) -> Vec<ExternalThread> {
        self.registry.to_external_format()
    }

    /// The thread list as the JSON payload posted to a webview.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn threads_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self.threads())
    }
}

//! Webview message boundary.
//!
//! Front ends post JSON messages with primitive fields. They are parsed once
//! here into [`UiCommand`], so the dispatcher only ever sees structured IDs.

use reviewpad_comment_models::{CommentId, CommentRef, ParseIdError, ThreadId};
use serde::Deserialize;

/// Errors turning a webview message into a command.
#[derive(Debug, thiserror::Error)]
pub enum UiCommandError {
    /// The message isn't valid JSON or isn't a known command.
    #[error("Invalid UI message: {0}")]
    Json(#[from] serde_json::Error),

    /// An ID field is malformed.
    #[error(transparent)]
    Id(#[from] ParseIdError),

    /// A numeric comment ID arrived without the thread it belongs to.
    #[error("Comment {0} has no thread ID")]
    MissingThreadId(CommentId),

    /// The composite comment ID names a different thread than `threadId`.
    #[error("Comment {comment} does not belong to thread {thread}")]
    ThreadMismatch {
        thread: ThreadId,
        comment: CommentRef,
    },
}

/// A comment ID as front ends send it: the composite string, or a bare
/// number next to a `threadId`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawCommentId {
    Number(u64),
    Composite(String),
}

/// Raw webview message.
#[derive(Debug, Clone, Deserialize)]
#[serde(
    tag = "command",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
enum UiMessage {
    Reply {
        thread_id: ThreadId,
        content: String,
        #[serde(default)]
        author_name: Option<String>,
    },
    Resolve {
        thread_id: ThreadId,
    },
    Reopen {
        thread_id: ThreadId,
    },
    DeleteThread {
        thread_id: ThreadId,
    },
    DeleteComment {
        #[serde(default)]
        thread_id: Option<ThreadId>,
        comment_id: RawCommentId,
    },
    EditComment {
        #[serde(default)]
        thread_id: Option<ThreadId>,
        comment_id: RawCommentId,
    },
    UpdateComment {
        #[serde(default)]
        thread_id: Option<ThreadId>,
        comment_id: RawCommentId,
        content: String,
    },
    SaveComment {
        #[serde(default)]
        thread_id: Option<ThreadId>,
        comment_id: RawCommentId,
    },
    CancelComment {
        #[serde(default)]
        thread_id: Option<ThreadId>,
        comment_id: RawCommentId,
    },
}

/// A command issued from a UI front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Reply {
        thread: ThreadId,
        content: String,
        author: Option<String>,
    },
    Resolve(ThreadId),
    Reopen(ThreadId),
    DeleteThread(ThreadId),
    DeleteComment(CommentRef),
    EditComment(CommentRef),
    UpdateComment {
        comment: CommentRef,
        content: String,
    },
    SaveComment(CommentRef),
    CancelComment(CommentRef),
}

fn comment_ref(thread: Option<ThreadId>, raw: RawCommentId) -> Result<CommentRef, UiCommandError> {
    match raw {
        RawCommentId::Number(id) => {
            let comment = CommentId(id);
            let thread = thread.ok_or(UiCommandError::MissingThreadId(comment))?;
            Ok(CommentRef::new(thread, comment))
        }
        RawCommentId::Composite(s) => {
            let comment: CommentRef = s.parse()?;
            match thread {
                Some(thread) if thread != comment.thread => {
                    Err(UiCommandError::ThreadMismatch { thread, comment })
                }
                _ => Ok(comment),
            }
        }
    }
}

impl TryFrom<UiMessage> for UiCommand {
    type Error = UiCommandError;

    fn try_from(message: UiMessage) -> Result<Self, Self::Error> {
        Ok(match message {
            UiMessage::Reply {
                thread_id,
                content,
                author_name,
            } => Self::Reply {
                thread: thread_id,
                content,
                author: author_name,
            },
            UiMessage::Resolve { thread_id } => Self::Resolve(thread_id),
            UiMessage::Reopen { thread_id } => Self::Reopen(thread_id),
            UiMessage::DeleteThread { thread_id } => Self::DeleteThread(thread_id),
            UiMessage::DeleteComment {
                thread_id,
                comment_id,
            } => Self::DeleteComment(comment_ref(thread_id, comment_id)?),
            UiMessage::EditComment {
                thread_id,
                comment_id,
            } => Self::EditComment(comment_ref(thread_id, comment_id)?),
            UiMessage::UpdateComment {
                thread_id,
                comment_id,
                content,
            } => Self::UpdateComment {
                comment: comment_ref(thread_id, comment_id)?,
                content,
            },
            UiMessage::SaveComment {
                thread_id,
                comment_id,
            } => Self::SaveComment(comment_ref(thread_id, comment_id)?),
            UiMessage::CancelComment {
                thread_id,
                comment_id,
            } => Self::CancelComment(comment_ref(thread_id, comment_id)?),
        })
    }
}

impl UiCommand {
    /// Parse a JSON webview message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message isn't a known command or carries
    /// malformed IDs.
    pub fn from_json(json: &str) -> Result<Self, UiCommandError> {
        let message: UiMessage = serde_json::from_str(json)?;
        message.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply() {
        let command = UiCommand::from_json(
            r#"{"command":"reply","threadId":"thread-1-5","content":"Agreed","authorName":"Bob"}"#,
        )
        .unwrap();

        assert_eq!(
            command,
            UiCommand::Reply {
                thread: ThreadId::new(1, 5),
                content: "Agreed".to_string(),
                author: Some("Bob".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_composite_comment_id() {
        let command = UiCommand::from_json(
            r#"{"command":"deleteComment","commentId":"thread-2-9:comment:4"}"#,
        )
        .unwrap();

        assert_eq!(
            command,
            UiCommand::DeleteComment(CommentRef::new(ThreadId::new(2, 9), CommentId(4)))
        );
    }

    #[test]
    fn test_parse_numeric_comment_id_with_thread() {
        let command = UiCommand::from_json(
            r#"{"command":"saveComment","threadId":"thread-2-9","commentId":4}"#,
        )
        .unwrap();

        assert_eq!(
            command,
            UiCommand::SaveComment(CommentRef::new(ThreadId::new(2, 9), CommentId(4)))
        );
    }

    #[test]
    fn test_numeric_comment_id_needs_thread() {
        let err = UiCommand::from_json(r#"{"command":"editComment","commentId":4}"#).unwrap_err();
        assert!(matches!(err, UiCommandError::MissingThreadId(CommentId(4))));
    }

    #[test]
    fn test_mismatched_thread_is_rejected() {
        let err = UiCommand::from_json(
            r#"{"command":"cancelComment","threadId":"thread-1-0","commentId":"thread-2-0:comment:4"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, UiCommandError::ThreadMismatch { .. }));
    }

    #[test]
    fn test_malformed_messages() {
        assert!(matches!(
            UiCommand::from_json(r#"{"command":"explode"}"#),
            Err(UiCommandError::Json(_))
        ));
        assert!(matches!(
            UiCommand::from_json(r#"{"command":"resolve","threadId":"nope"}"#),
            Err(UiCommandError::Json(_))
        ));
        assert!(matches!(
            UiCommand::from_json(r#"{"command":"deleteComment","commentId":"garbage"}"#),
            Err(UiCommandError::Id(ParseIdError::InvalidCommentRef(_)))
        ));
    }
}

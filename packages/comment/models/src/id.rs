//! Identifiers for threads and comments.
//!
//! Thread IDs are assigned by the registry and outlive any editor-native
//! handle. Comment IDs are process-wide counters. The composite
//! `<threadId>:comment:<commentId>` string only exists at the UI boundary;
//! inside the core it is always a [`CommentRef`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

const THREAD_PREFIX: &str = "thread-";
const COMMENT_SEPARATOR: &str = ":comment:";

/// Error returned when parsing an identifier from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseIdError {
    /// The string is not a `thread-<sequence>-<millis>` thread ID.
    #[error("Invalid thread ID: {0}")]
    InvalidThreadId(String),
    /// The string is not a numeric comment ID.
    #[error("Invalid comment ID: {0}")]
    InvalidCommentId(String),
    /// The string is not a `<threadId>:comment:<commentId>` composite ID.
    #[error("Invalid composite comment ID: {0}")]
    InvalidCommentRef(String),
}

/// Unique identifier of a comment, never reused within a process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CommentId(pub u64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CommentId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| ParseIdError::InvalidCommentId(s.to_string()))
    }
}

/// Registry-assigned thread identifier.
///
/// Ordering follows the sequence number, so sorting by `ThreadId` yields
/// creation order. The millisecond stamp only disambiguates IDs across
/// processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId {
    sequence: u64,
    millis: u64,
}

impl ThreadId {
    #[must_use]
    pub const fn new(sequence: u64, millis: u64) -> Self {
        Self { sequence, millis }
    }

    #[must_use]
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    #[must_use]
    pub const fn millis(&self) -> u64 {
        self.millis
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{THREAD_PREFIX}{}-{}", self.sequence, self.millis)
    }
}

impl FromStr for ThreadId {
    type Err = ParseIdError;

    /// Parse a thread ID.
    ///
    /// Format: `thread-<sequence>-<millis>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::str::FromStr;
    /// use reviewpad_comment_models::ThreadId;
    ///
    /// let id = ThreadId::from_str("thread-3-1700000000000").unwrap();
    /// assert_eq!(id.sequence(), 3);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseIdError::InvalidThreadId(s.to_string());

        let rest = s.strip_prefix(THREAD_PREFIX).ok_or_else(invalid)?;
        let (sequence, millis) = rest.split_once('-').ok_or_else(invalid)?;

        Ok(Self {
            sequence: sequence.parse().map_err(|_| invalid())?,
            millis: millis.parse().map_err(|_| invalid())?,
        })
    }
}

impl Serialize for ThreadId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ThreadId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Structured form of the composite comment ID handed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentRef {
    /// Thread that owns the comment.
    pub thread: ThreadId,
    /// The comment within that thread.
    pub comment: CommentId,
}

impl CommentRef {
    #[must_use]
    pub const fn new(thread: ThreadId, comment: CommentId) -> Self {
        Self { thread, comment }
    }
}

impl fmt::Display for CommentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{COMMENT_SEPARATOR}{}", self.thread, self.comment)
    }
}

impl FromStr for CommentRef {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (thread, comment) = s
            .rsplit_once(COMMENT_SEPARATOR)
            .ok_or_else(|| ParseIdError::InvalidCommentRef(s.to_string()))?;

        Ok(Self {
            thread: thread.parse()?,
            comment: comment.parse()?,
        })
    }
}

impl Serialize for CommentRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CommentRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

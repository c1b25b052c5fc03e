use chrono::{DateTime, Utc};
use reviewpad_comment_models::{CommentId, ThreadId};

/// Monotonic counters for comment and thread identity.
///
/// Owned by a registry. Counters only move forward, so an ID is never handed
/// out twice for the lifetime of the generator, deletions included.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last_comment: u64,
    last_thread: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_comment: 0,
            last_thread: 0,
        }
    }

    pub const fn next_comment_id(&mut self) -> CommentId {
        self.last_comment += 1;
        CommentId(self.last_comment)
    }

    /// Next thread ID, stamped with `now` in milliseconds.
    pub fn next_thread_id(&mut self, now: DateTime<Utc>) -> ThreadId {
        self.last_thread += 1;
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        ThreadId::new(self.last_thread, millis)
    }
}

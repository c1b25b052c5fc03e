//! Change listeners.
//!
//! Listeners run synchronously after a mutation has fully completed. A
//! listener that fails or panics is logged and skipped; it never reaches the
//! registry's caller.

use std::panic::{self, AssertUnwindSafe};

/// Error a change listener may report.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl From<&str> for ListenerError {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ListenerError {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Callback invoked after every visible mutation.
pub type Listener = Box<dyn FnMut() -> Result<(), ListenerError>>;

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn notify(&mut self) {
        for (id, listener) in &mut self.entries {
            match panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("Change listener {id:?} failed: {e}"),
                Err(_) => log::error!("Change listener {id:?} panicked"),
            }
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

//! Boundary to the editor's own thread objects.
//!
//! The registry never creates native threads. The host hands them over and
//! the registry keeps them in step with its own state, disposing them when a
//! thread is destroyed.

use reviewpad_comment_models::{CollapsibleState, Comment, ThreadLocation, ThreadState};

/// Opaque identity of a native thread handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u64);

/// Errors a native thread may report when disposed.
#[derive(Debug, thiserror::Error)]
pub enum NativeThreadError {
    /// The handle had already been disposed by the host.
    #[error("Native thread already disposed")]
    AlreadyDisposed,
    /// Any other host-side failure.
    #[error("Native thread error: {0}")]
    Host(String),
}

/// Everything the editor needs to draw a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeThreadView<'a> {
    pub comments: &'a [Comment],
    /// Host `contextValue` marker derived from the thread's draft and
    /// resolution state.
    pub context_value: String,
    pub state: ThreadState,
    pub collapsible: CollapsibleState,
    pub label: Option<&'a str>,
}

/// An editor-native comment thread.
pub trait NativeThread {
    /// Identity used to recognise a handle that is already tracked.
    fn handle(&self) -> NativeHandle;

    /// Where the editor anchored this thread.
    fn location(&self) -> ThreadLocation;

    /// Push the registry's view of the thread into the editor.
    fn sync(&mut self, view: &NativeThreadView<'_>);

    /// Release the editor's visual resources for this thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fails to dispose the thread. The registry
    /// logs it and carries on.
    fn dispose(&mut self) -> Result<(), NativeThreadError>;
}

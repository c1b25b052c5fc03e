//! In-memory [`NativeThread`] for tests and headless hosts.

use std::cell::RefCell;
use std::rc::Rc;

use reviewpad_comment_models::{
    CollapsibleState, CommentMode, LineRange, ThreadLocation, ThreadState,
};

use crate::native::{NativeHandle, NativeThread, NativeThreadError, NativeThreadView};

/// What the registry last pushed into a native thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub bodies: Vec<String>,
    pub labels: Vec<Option<String>>,
    pub modes: Vec<CommentMode>,
    pub context_value: String,
    pub state: ThreadState,
    pub collapsible: CollapsibleState,
    pub label: Option<String>,
}

#[derive(Debug, Default)]
struct Recorded {
    syncs: Vec<SyncRecord>,
    dispose_calls: usize,
}

/// Read side of a [`RecordingNativeThread`], kept by the test after the
/// thread itself has been handed to a registry.
#[derive(Debug, Clone)]
pub struct NativeProbe {
    recorded: Rc<RefCell<Recorded>>,
}

impl NativeProbe {
    #[must_use]
    pub fn last_sync(&self) -> Option<SyncRecord> {
        self.recorded.borrow().syncs.last().cloned()
    }

    #[must_use]
    pub fn sync_count(&self) -> usize {
        self.recorded.borrow().syncs.len()
    }

    #[must_use]
    pub fn dispose_calls(&self) -> usize {
        self.recorded.borrow().dispose_calls
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.dispose_calls() > 0
    }
}

/// A native thread that records what the registry does to it.
#[derive(Debug)]
pub struct RecordingNativeThread {
    handle: NativeHandle,
    location: ThreadLocation,
    fail_dispose: bool,
    recorded: Rc<RefCell<Recorded>>,
}

impl RecordingNativeThread {
    /// Create a thread at a zero-based `line` of `uri`.
    #[must_use]
    pub fn new(handle: u64, uri: &str, line: u32) -> (Self, NativeProbe) {
        Self::with_location(handle, ThreadLocation::new(uri, LineRange::single(line)))
    }

    #[must_use]
    pub fn with_location(handle: u64, location: ThreadLocation) -> (Self, NativeProbe) {
        let recorded = Rc::new(RefCell::new(Recorded::default()));
        let probe = NativeProbe {
            recorded: recorded.clone(),
        };
        (
            Self {
                handle: NativeHandle(handle),
                location,
                fail_dispose: false,
                recorded,
            },
            probe,
        )
    }

    /// Make `dispose` report a host failure.
    #[must_use]
    pub const fn failing_dispose(mut self) -> Self {
        self.fail_dispose = true;
        self
    }

    /// A second handle object for the same native thread.
    #[must_use]
    pub fn same_handle(&self) -> Self {
        Self {
            handle: self.handle,
            location: self.location.clone(),
            fail_dispose: self.fail_dispose,
            recorded: self.recorded.clone(),
        }
    }
}

impl NativeThread for RecordingNativeThread {
    fn handle(&self) -> NativeHandle {
        self.handle
    }

    fn location(&self) -> ThreadLocation {
        self.location.clone()
    }

    fn sync(&mut self, view: &NativeThreadView<'_>) {
        self.recorded.borrow_mut().syncs.push(SyncRecord {
            bodies: view
                .comments
                .iter()
                .map(|c| c.body().as_str().to_string())
                .collect(),
            labels: view
                .comments
                .iter()
                .map(|c| c.label().map(ToString::to_string))
                .collect(),
            modes: view.comments.iter().map(|c| c.mode()).collect(),
            context_value: view.context_value.clone(),
            state: view.state,
            collapsible: view.collapsible,
            label: view.label.map(ToString::to_string),
        });
    }

    fn dispose(&mut self) -> Result<(), NativeThreadError> {
        let mut recorded = self.recorded.borrow_mut();
        recorded.dispose_calls += 1;
        if self.fail_dispose {
            return Err(NativeThreadError::Host("dispose refused".to_string()));
        }
        if recorded.dispose_calls > 1 {
            return Err(NativeThreadError::AlreadyDisposed);
        }
        Ok(())
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory comment thread registry for `Reviewpad`.
//!
//! The registry owns every live thread, hands out thread and comment IDs,
//! destroys threads whose last comment goes away, keeps editor-native threads
//! in step, and produces the serialized thread list a UI renders.

mod clock;
mod config;
mod ids;
mod listener;
mod native;
mod registry;
pub mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ReviewConfig};
pub use ids::IdGenerator;
pub use listener::{Listener, ListenerError, ListenerId};
pub use native::{NativeHandle, NativeThread, NativeThreadError, NativeThreadView};
pub use registry::{NewComment, RemoveCommentOutcome, ThreadRegistry};
pub use reviewpad_comment_models as models;

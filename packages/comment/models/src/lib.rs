#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Comment and thread models for `Reviewpad`.
//!
//! This crate provides the comment entity, thread data, identifiers and the
//! UI-facing projection shared by the registry, command and export crates.

pub mod comment;
pub mod external;
pub mod id;
pub mod thread;

pub use comment::{Comment, CommentAuthor, CommentBody, CommentMode};
pub use external::{ExternalAuthor, ExternalComment, ExternalLineRange, ExternalThread};
pub use id::{CommentId, CommentRef, ParseIdError, ThreadId};
pub use thread::{
    CollapsibleState, LineRange, Thread, ThreadContext, ThreadLocation, ThreadState,
};

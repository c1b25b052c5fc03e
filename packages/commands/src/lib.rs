#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Comment thread commands for `Reviewpad`.
//!
//! This crate maps editor and webview events onto thread registry mutations,
//! deciding who authors a comment and how drafts are labelled.

mod commands;
mod ui;
mod user;

pub use commands::CommentCommands;
pub use reviewpad_registry as registry;
pub use ui::{UiCommand, UiCommandError};
pub use user::{FixedUser, UserResolver};

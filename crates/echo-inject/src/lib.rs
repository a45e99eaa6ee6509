//! Echo inject crate - the content-script core.
//!
//! Finds a sane insertion target on an arbitrary page, inserts report text at
//! the caret, and fires the native events a host-page framework listens to.
//! When no target exists the text goes to the clipboard and a toast tells the
//! user. Every call reads the page fresh; nothing survives between calls.
//!
//! The algorithms are written against the [`Page`] trait. [`MemoryPage`]
//! implements it in memory for tests and the CLI harness; the `wasm32` build
//! adds a web-sys backend and the `handle_message` entry point.

pub mod clipboard;
pub mod content;
pub mod dom;
pub mod error;
pub mod notify;
pub mod resolver;
pub mod runtime;
pub mod target;
pub mod toast;
mod utf16;
pub mod visibility;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clipboard::{copy_to_clipboard, Clipboard, MemoryClipboard};
pub use content::{ContentScript, InsertionOutcome};
pub use dom::memory::MemoryPage;
pub use dom::{ComputedStyle, EventKind, Page};
pub use error::{ClipboardError, DomError};
pub use resolver::TargetResolver;
pub use runtime::{LocalTask, Runtime};
pub use target::{CursorState, EditableTarget, TargetKind};
pub use toast::NotificationPresenter;

#[cfg(not(target_arch = "wasm32"))]
pub use runtime::TokioRuntime;

#[cfg(target_arch = "wasm32")]
pub use web::{handle_message, WebClipboard, WebPage, WebRuntime};

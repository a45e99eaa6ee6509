//! Clipboard fallback used when no editable target exists.
//!
//! The write is best-effort and fire-and-forget: a failure is logged and
//! never reaches the caller.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use tracing::{error, info};

use crate::error::ClipboardError;
use crate::runtime::Runtime;

/// System clipboard access.
pub trait Clipboard: Clone + 'static {
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>>;
}

/// Start an asynchronous clipboard write of `text` and return immediately.
pub fn copy_to_clipboard<C, R>(clipboard: &C, runtime: &R, text: &str)
where
    C: Clipboard,
    R: Runtime,
{
    let clipboard = clipboard.clone();
    let text = text.to_string();
    runtime.spawn(Box::pin(async move {
        match clipboard.write_text(&text).await {
            Ok(()) => info!(text_len = text.len(), "Report copied to clipboard"),
            Err(e) => error!(error = %e, "Failed to copy report to clipboard"),
        }
    }));
}

/// In-memory clipboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
    failure: Rc<RefCell<Option<ClipboardError>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose every write fails with `error`.
    pub fn failing(error: ClipboardError) -> Self {
        let clipboard = Self::default();
        *clipboard.failure.borrow_mut() = Some(error);
        clipboard
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if let Some(err) = self.failure.borrow().clone() {
            return Err(err);
        }
        *self.contents.borrow_mut() = Some(text.to_string());
        Ok(())
    }
}

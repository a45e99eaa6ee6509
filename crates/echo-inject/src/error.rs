//! Error types for DOM access and clipboard writes.
//!
//! Neither type ever crosses the message boundary: DOM failures turn into
//! the clipboard fallback, clipboard failures are logged and dropped.

/// Errors raised while reading or mutating the page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("Element is not attached to the document")]
    Detached,
    #[error("Element is not a text field: <{0}>")]
    NotAField(String),
    #[error("Offset {offset} is out of bounds for length {len}")]
    OutOfBounds { offset: u32, len: u32 },
    #[error("Rich-text region has no usable selection range")]
    NoRange,
    #[error("Unsupported DOM operation: {0}")]
    Unsupported(String),
    #[error("DOM exception: {0}")]
    Js(String),
}

/// Errors from writing to the system clipboard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard is not available in this context")]
    Unavailable,
    #[error("Clipboard write rejected: {0}")]
    Rejected(String),
}

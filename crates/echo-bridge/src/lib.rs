//! Echo bridge crate - the control-surface side of the message boundary.
//!
//! Sends `insertReport` requests to a tab's content script over a
//! [`ContentChannel`], loading the script on demand when the tab has none,
//! and keeps the popup's per-open state in a [`PopupSession`].

pub mod channel;
pub mod error;
pub mod session;

pub use channel::{ContentChannel, InsertClient, InsertReply, TabId};
pub use error::BridgeError;
pub use session::PopupSession;

//! Error types for the control-surface bridge.

use echo_core::error::EchoError;

use crate::channel::TabId;

/// Errors from sending a request to a content script.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("No response from tab {tab} within {timeout_ms} ms")]
    Timeout { tab: TabId, timeout_ms: u64 },
    #[error("No content script is listening in tab {0}")]
    Unreachable(TabId),
    #[error("Content script injection failed: {0}")]
    InjectionFailed(String),
    #[error("Channel error: {0}")]
    Channel(String),
    #[error("Session error: {0}")]
    Session(String),
    #[error("Core error: {0}")]
    Core(#[from] EchoError),
}

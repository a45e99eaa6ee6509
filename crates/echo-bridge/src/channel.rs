//! Typed request/response exchange with a tab's content script.
//!
//! The popup and the page script live in separate execution contexts. A
//! request is sent over a [`ContentChannel`] and the sender waits for the
//! response or a timeout, never longer. A tab that has no listener yet gets
//! the content script injected and the request is sent once more.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use echo_core::config::BridgeConfig;
use echo_core::protocol::{ContentRequest, ContentResponse};
use tracing::{info, warn};

use crate::error::BridgeError;
use crate::session::PopupSession;

/// Browser tab identifier.
pub type TabId = u32;

/// Transport to the content script of a tab.
///
/// Browser message ports are single-threaded, so futures need not be `Send`.
#[async_trait(?Send)]
pub trait ContentChannel {
    /// Deliver `request` and wait for the listener's answer.
    ///
    /// Returns [`BridgeError::Unreachable`] when no listener exists in the tab.
    async fn send(&self, tab: TabId, request: &ContentRequest)
        -> Result<ContentResponse, BridgeError>;

    /// Load `script` into the tab so a listener exists.
    async fn inject(&self, tab: TabId, script: &str) -> Result<(), BridgeError>;
}

/// What happened to the report on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertReply {
    /// The text went into an editable field on the page.
    Inserted,
    /// No editable field was found; the page copied the text to the
    /// clipboard and told the user.
    CopiedToClipboard,
}

impl From<ContentResponse> for InsertReply {
    fn from(response: ContentResponse) -> Self {
        if response.success {
            InsertReply::Inserted
        } else {
            InsertReply::CopiedToClipboard
        }
    }
}

impl fmt::Display for InsertReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertReply::Inserted => write!(f, "Report inserted"),
            InsertReply::CopiedToClipboard => write!(f, "Report copied to clipboard"),
        }
    }
}

/// Sends `insertReport` requests with a timeout and lazy injection.
pub struct InsertClient<C> {
    channel: C,
    timeout: Duration,
    content_script: String,
}

impl<C: ContentChannel> InsertClient<C> {
    pub fn new(channel: C, config: &BridgeConfig) -> Self {
        Self {
            channel,
            timeout: config.response_timeout(),
            content_script: config.content_script.clone(),
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Ask the content script in `tab` to insert `text`.
    ///
    /// When the tab has no listener the script is injected and the request
    /// is retried exactly once. A timeout is not retried: the listener
    /// exists and may still act on the first request.
    pub async fn insert_report(&self, tab: TabId, text: &str) -> Result<InsertReply, BridgeError> {
        let request = ContentRequest::insert_report(text);

        let response = match self.send(tab, &request).await {
            Err(BridgeError::Unreachable(_)) => {
                info!(tab, script = %self.content_script, "No listener in tab, injecting content script");
                self.channel
                    .inject(tab, &self.content_script)
                    .await
                    .map_err(|e| match e {
                        BridgeError::InjectionFailed(_) => e,
                        other => BridgeError::InjectionFailed(other.to_string()),
                    })?;
                self.send(tab, &request).await?
            }
            other => other?,
        };

        let reply = InsertReply::from(response);
        info!(tab, reply = %reply, text_len = text.len(), "Insert request answered");
        Ok(reply)
    }

    /// Insert the session's current report, holding the session busy for
    /// the duration of the exchange.
    pub async fn insert_current(
        &self,
        session: &mut PopupSession,
        tab: TabId,
    ) -> Result<InsertReply, BridgeError> {
        let text = session.begin_insert()?;
        let result = self.insert_report(tab, &text).await;
        session.finish_insert();
        if let Err(ref e) = result {
            warn!(tab, session_id = %session.id, error = %e, "Insert failed");
        }
        result
    }

    async fn send(&self, tab: TabId, request: &ContentRequest) -> Result<ContentResponse, BridgeError> {
        match tokio::time::timeout(self.timeout, self.channel.send(tab, request)).await {
            Ok(result) => result,
            Err(_) => Err(BridgeError::Timeout {
                tab,
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scripted channel: a tab has a listener once injected (or from the
    /// start when `loaded`).
    #[derive(Default)]
    struct MockChannel {
        loaded: Cell<bool>,
        success: bool,
        fail_injection: bool,
        hang: bool,
        sends: Cell<u32>,
        injected: RefCell<Vec<(TabId, String)>>,
        received: RefCell<Vec<ContentRequest>>,
    }

    #[async_trait(?Send)]
    impl ContentChannel for MockChannel {
        async fn send(
            &self,
            tab: TabId,
            request: &ContentRequest,
        ) -> Result<ContentResponse, BridgeError> {
            self.sends.set(self.sends.get() + 1);
            if !self.loaded.get() {
                return Err(BridgeError::Unreachable(tab));
            }
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.received.borrow_mut().push(request.clone());
            Ok(ContentResponse::new(self.success))
        }

        async fn inject(&self, tab: TabId, script: &str) -> Result<(), BridgeError> {
            if self.fail_injection {
                return Err(BridgeError::Channel("cannot script chrome:// pages".into()));
            }
            self.injected.borrow_mut().push((tab, script.to_string()));
            self.loaded.set(true);
            Ok(())
        }
    }

    fn client(channel: MockChannel) -> InsertClient<MockChannel> {
        InsertClient::new(channel, &BridgeConfig::default())
    }

    #[tokio::test]
    async fn test_insert_with_loaded_script() {
        let client = client(MockChannel {
            loaded: Cell::new(true),
            success: true,
            ..Default::default()
        });

        let reply = client.insert_report(1, "Nodule 1").await.unwrap();

        assert_eq!(reply, InsertReply::Inserted);
        assert_eq!(client.channel().sends.get(), 1);
        assert!(client.channel().injected.borrow().is_empty());
        assert_eq!(
            client.channel().received.borrow()[0],
            ContentRequest::insert_report("Nodule 1")
        );
    }

    #[tokio::test]
    async fn test_lazy_injection_retries_once() {
        let client = client(MockChannel {
            success: true,
            ..Default::default()
        });

        let reply = client.insert_report(4, "text").await.unwrap();

        assert_eq!(reply, InsertReply::Inserted);
        assert_eq!(client.channel().sends.get(), 2);
        assert_eq!(
            *client.channel().injected.borrow(),
            vec![(4, "content.js".to_string())]
        );
    }

    #[tokio::test]
    async fn test_clipboard_fallback_reply() {
        let client = client(MockChannel {
            loaded: Cell::new(true),
            success: false,
            ..Default::default()
        });

        let reply = client.insert_report(1, "text").await.unwrap();
        assert_eq!(reply, InsertReply::CopiedToClipboard);
        assert_eq!(reply.to_string(), "Report copied to clipboard");
    }

    #[tokio::test]
    async fn test_injection_failure() {
        let client = client(MockChannel {
            fail_injection: true,
            ..Default::default()
        });

        let err = client.insert_report(9, "text").await.unwrap_err();

        assert!(matches!(err, BridgeError::InjectionFailed(_)));
        assert_eq!(client.channel().sends.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_not_retried() {
        let client = client(MockChannel {
            loaded: Cell::new(true),
            hang: true,
            ..Default::default()
        });

        let err = client.insert_report(2, "text").await.unwrap_err();

        assert!(matches!(
            err,
            BridgeError::Timeout {
                tab: 2,
                timeout_ms: 5000
            }
        ));
        assert_eq!(client.channel().sends.get(), 1);
        assert!(client.channel().injected.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_insert_current_releases_session() {
        let client = client(MockChannel {
            loaded: Cell::new(true),
            success: true,
            ..Default::default()
        });
        let mut session = PopupSession::open();
        session.set_report("Impression: benign");

        let reply = client.insert_current(&mut session, 1).await.unwrap();

        assert_eq!(reply, InsertReply::Inserted);
        assert!(!session.is_busy());
        assert_eq!(
            client.channel().received.borrow()[0].text(),
            "Impression: benign"
        );
    }

    #[tokio::test]
    async fn test_insert_current_releases_session_on_error() {
        let client = client(MockChannel {
            fail_injection: true,
            ..Default::default()
        });
        let mut session = PopupSession::open();
        session.set_report("text");

        assert!(client.insert_current(&mut session, 1).await.is_err());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_insert_current_without_report() {
        let client = client(MockChannel::default());
        let mut session = PopupSession::open();

        let err = client.insert_current(&mut session, 1).await.unwrap_err();

        assert!(matches!(err, BridgeError::Session(_)));
        assert_eq!(client.channel().sends.get(), 0);
    }
}

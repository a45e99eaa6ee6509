//! In-process stand-in for a browser tab.
//!
//! `PageChannel` routes bridge requests to a `ContentScript` bound to a
//! `MemoryPage`, serializing both directions to JSON so the exchange goes
//! through the same message contract the extension uses.

use std::cell::RefCell;

use async_trait::async_trait;
use echo_bridge::{BridgeError, ContentChannel, TabId};
use echo_core::config::EchoConfig;
use echo_core::error::EchoError;
use echo_core::protocol::{ContentRequest, ContentResponse};
use echo_inject::{ContentScript, MemoryClipboard, MemoryPage, TokioRuntime};
use tracing::info;

type PageScript = ContentScript<MemoryPage, MemoryClipboard, TokioRuntime>;

pub struct PageChannel {
    page: MemoryPage,
    clipboard: MemoryClipboard,
    config: EchoConfig,
    script: RefCell<Option<PageScript>>,
}

impl PageChannel {
    /// A tab showing `page`. With `loaded` false the tab has no listener
    /// until the content script is injected.
    pub fn new(page: MemoryPage, clipboard: MemoryClipboard, config: EchoConfig, loaded: bool) -> Self {
        let channel = Self {
            page,
            clipboard,
            config,
            script: RefCell::new(None),
        };
        if loaded {
            channel.load();
        }
        channel
    }

    pub fn is_loaded(&self) -> bool {
        self.script.borrow().is_some()
    }

    fn load(&self) {
        *self.script.borrow_mut() = Some(ContentScript::new(
            self.page.clone(),
            self.clipboard.clone(),
            TokioRuntime,
            &self.config,
        ));
    }
}

#[async_trait(?Send)]
impl ContentChannel for PageChannel {
    async fn send(&self, tab: TabId, request: &ContentRequest) -> Result<ContentResponse, BridgeError> {
        let message = serde_json::to_string(request).map_err(EchoError::from)?;

        let reply = {
            let script = self.script.borrow();
            let script = script.as_ref().ok_or(BridgeError::Unreachable(tab))?;
            script.handle_json(&message)
        };

        let reply = reply.ok_or_else(|| {
            BridgeError::Channel("content script did not answer the request".to_string())
        })?;
        let response: ContentResponse = serde_json::from_str(&reply).map_err(EchoError::from)?;
        Ok(response)
    }

    async fn inject(&self, tab: TabId, script: &str) -> Result<(), BridgeError> {
        if script != self.config.bridge.content_script {
            return Err(BridgeError::InjectionFailed(format!(
                "unknown script '{script}'"
            )));
        }
        self.load();
        info!(tab, script, "Content script injected");
        Ok(())
    }
}

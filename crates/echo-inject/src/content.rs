//! Content-script entry: answers `insertReport` messages.
//!
//! Flow per call: resolve a target; if one exists, insert and fire events;
//! otherwise (or if the DOM throws along the way) copy the text to the
//! clipboard and show a toast. The caller only ever sees a boolean.

use echo_core::config::{EchoConfig, MissingRangePolicy};
use echo_core::protocol::{ContentRequest, ContentResponse};
use tracing::{error, info, warn};

use crate::clipboard::{copy_to_clipboard, Clipboard};
use crate::dom::Page;
use crate::error::DomError;
use crate::notify::notify;
use crate::resolver::TargetResolver;
use crate::runtime::Runtime;
use crate::target::TargetKind;
use crate::toast::NotificationPresenter;

/// Result of one insertion call. Carries no reference to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionOutcome {
    pub succeeded: bool,
}

/// The content-script core bound to one page.
///
/// Holds configuration and the page/clipboard/runtime seams only; every
/// call reads the page fresh.
pub struct ContentScript<P, C, R> {
    page: P,
    clipboard: C,
    runtime: R,
    resolver: TargetResolver,
    presenter: NotificationPresenter<P, R>,
    missing_range: MissingRangePolicy,
    fallback_message: String,
}

impl<P, C, R> ContentScript<P, C, R>
where
    P: Page,
    C: Clipboard,
    R: Runtime,
{
    pub fn new(page: P, clipboard: C, runtime: R, config: &EchoConfig) -> Self {
        Self {
            presenter: NotificationPresenter::new(
                page.clone(),
                runtime.clone(),
                config.toast.clone(),
            ),
            page,
            clipboard,
            runtime,
            resolver: TargetResolver::new(config.resolver.clone()),
            missing_range: config.insertion.missing_range,
            fallback_message: config.toast.message.clone(),
        }
    }

    /// Insert `text` into the best target on the page.
    ///
    /// Returns `succeeded: false` when the text went to the clipboard
    /// instead. DOM and clipboard failures never reach the caller. The
    /// fallback spawns local tasks on `runtime`, so with `TokioRuntime`
    /// the call must run inside a `tokio::task::LocalSet`.
    pub fn insert_report(&self, text: &str) -> InsertionOutcome {
        match self.try_insert(text) {
            Ok(Some(kind)) => {
                info!(%kind, text_len = text.len(), "Report inserted");
                return InsertionOutcome { succeeded: true };
            }
            Ok(None) => info!("No editable target, falling back to clipboard"),
            Err(e) => warn!(error = %e, "Insertion failed, falling back to clipboard"),
        }

        copy_to_clipboard(&self.clipboard, &self.runtime, text);
        if let Err(e) = self.presenter.show(&self.fallback_message) {
            warn!(error = %e, "Failed to show fallback notification");
        }
        InsertionOutcome { succeeded: false }
    }

    fn try_insert(&self, text: &str) -> Result<Option<TargetKind>, DomError> {
        let Some(target) = self.resolver.resolve(&self.page) else {
            return Ok(None);
        };
        target.insert(&self.page, text, self.missing_range)?;

        // The text is in; a failed dispatch must not send it to the
        // clipboard a second time.
        if let Err(e) = notify(&self.page, &target) {
            warn!(error = %e, "Failed to dispatch mutation events");
        }
        Ok(Some(target.kind()))
    }

    /// Answer a runtime message.
    ///
    /// Returns `None` for messages this script does not own or cannot parse,
    /// so the sender's other listeners can answer them.
    pub fn handle_message(&self, message: &serde_json::Value) -> Option<serde_json::Value> {
        let request = match ContentRequest::from_value(message) {
            Ok(Some(request)) => request,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed message");
                return None;
            }
        };

        let outcome = match &request {
            ContentRequest::InsertReport { text } => self.insert_report(text),
        };

        match serde_json::to_value(ContentResponse::new(outcome.succeeded)) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(error = %e, "Failed to encode response");
                None
            }
        }
    }

    /// [`handle_message`](Self::handle_message) over raw JSON text.
    pub fn handle_json(&self, message: &str) -> Option<String> {
        let value: serde_json::Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Ignoring message that is not JSON");
                return None;
            }
        };
        self.handle_message(&value).map(|response| response.to_string())
    }
}

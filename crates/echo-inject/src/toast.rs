//! Transient on-page toast.
//!
//! Each toast injects its own `<style>` with the entrance keyframes and a
//! fixed-position `<div>`. After the display duration the entrance
//! animation plays in reverse, then both nodes are removed. Overlapping
//! calls produce overlapping toasts.

use echo_core::config::ToastConfig;
use tracing::{debug, warn};

use crate::dom::Page;
use crate::error::DomError;
use crate::runtime::Runtime;

/// Attribute marking every node a toast adds to the page.
pub const TOAST_MARKER: &str = "data-echo-toast";

const TOAST_STYLE: [(&str, &str); 10] = [
    ("position", "fixed"),
    ("top", "20px"),
    ("right", "20px"),
    ("background", "#333"),
    ("color", "white"),
    ("padding", "12px 20px"),
    ("border-radius", "8px"),
    ("font-size", "14px"),
    ("z-index", "999999"),
    ("box-shadow", "0 4px 12px rgba(0,0,0,0.3)"),
];

pub struct NotificationPresenter<P, R> {
    page: P,
    runtime: R,
    config: ToastConfig,
}

impl<P: Page, R: Runtime> NotificationPresenter<P, R> {
    pub fn new(page: P, runtime: R, config: ToastConfig) -> Self {
        Self {
            page,
            runtime,
            config,
        }
    }

    /// Show `message` and schedule the toast's removal.
    pub fn show(&self, message: &str) -> Result<(), DomError> {
        let page = &self.page;

        let style = page.create_element("style")?;
        page.set_attribute(&style, TOAST_MARKER, "")?;
        page.set_text_content(&style, &self.keyframes());

        let toast = page.create_element("div")?;
        page.set_attribute(&toast, TOAST_MARKER, "")?;
        page.set_attribute(&toast, "role", "status")?;
        for (property, value) in TOAST_STYLE {
            page.set_style_property(&toast, property, value)?;
        }
        page.set_style_property(&toast, "animation", &self.animation(false))?;
        page.set_text_content(&toast, message);

        page.append_to_head(&style)?;
        if let Err(e) = page.append_to_body(&toast) {
            page.remove(&style);
            return Err(e);
        }
        debug!(message_len = message.len(), "Toast shown");

        let page = self.page.clone();
        let runtime = self.runtime.clone();
        let display = self.config.display_duration();
        let animation = self.config.animation_duration();
        let exit_animation = self.animation(true);
        self.runtime.spawn(Box::pin(async move {
            runtime.sleep(display).await;
            if let Err(e) = page.set_style_property(&toast, "animation", &exit_animation) {
                warn!(error = %e, "Failed to start toast exit animation");
            }
            runtime.sleep(animation).await;
            page.remove(&toast);
            page.remove(&style);
            debug!("Toast removed");
        }));
        Ok(())
    }

    fn keyframes(&self) -> String {
        format!(
            "@keyframes {} {{ from {{ transform: translateX(100%); opacity: 0; }} \
             to {{ transform: translateX(0); opacity: 1; }} }}",
            self.config.animation_name
        )
    }

    fn animation(&self, reverse: bool) -> String {
        let mut value = format!(
            "{} {}ms ease",
            self.config.animation_name, self.config.animation_ms
        );
        if reverse {
            value.push_str(" reverse");
        }
        value
    }
}

//! Browser backend (wasm32 only).
//!
//! Implements [`Page`] over `web_sys::Document`, the clipboard over
//! `navigator.clipboard.writeText`, and the runtime over `setTimeout` and
//! `wasm_bindgen_futures::spawn_local`. The extension's JS shim forwards
//! each runtime message to [`handle_message`] as JSON and sends back
//! whatever it returns.

use std::time::Duration;

use echo_core::config::EchoConfig;
use js_sys::{Function, Promise, Reflect};
use tracing::{error, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, EventInit, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
    Node, Range, Window,
};

use crate::clipboard::Clipboard;
use crate::content::ContentScript;
use crate::dom::{ComputedStyle, EventKind, Page};
use crate::error::{ClipboardError, DomError};
use crate::runtime::{LocalTask, Runtime};

const CANDIDATE_SELECTOR: &str = "textarea, input, [contenteditable]";

fn js_error(value: JsValue) -> DomError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_else(|| format!("{value:?}"));
    DomError::Js(message)
}

/// The live page the content script runs in.
#[derive(Debug, Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    pub fn from_global() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::Js("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::Js("no document".into()))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

enum Field<'a> {
    Input(&'a HtmlInputElement),
    TextArea(&'a HtmlTextAreaElement),
}

fn field(element: &Element) -> Result<Field<'_>, DomError> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        Ok(Field::Input(input))
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        Ok(Field::TextArea(area))
    } else {
        Err(DomError::NotAField(element.tag_name().to_ascii_lowercase()))
    }
}

fn html(element: &Element) -> Result<&HtmlElement, DomError> {
    element
        .dyn_ref::<HtmlElement>()
        .ok_or_else(|| DomError::Unsupported(format!("<{}> is not an HTML element", element.tag_name())))
}

impl Page for WebPage {
    type Element = Element;
    type Node = Node;
    type Range = Range;

    fn active_element(&self) -> Option<Element> {
        self.document.active_element()
    }

    fn editable_candidates(&self) -> Vec<Element> {
        let list = match self.document.query_selector_all(CANDIDATE_SELECTOR) {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %js_error(e), "Candidate query failed");
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn computed_style(&self, element: &Element) -> Option<ComputedStyle> {
        let style = self.window.get_computed_style(element).ok()??;
        let read = |property: &str| style.get_property_value(property).unwrap_or_default();
        Some(ComputedStyle {
            display: read("display"),
            visibility: read("visibility"),
            opacity: read("opacity"),
        })
    }

    fn has_offset_parent(&self, element: &Element) -> bool {
        element
            .dyn_ref::<HtmlElement>()
            .is_some_and(|h| h.offset_parent().is_some())
    }

    fn value(&self, element: &Element) -> Result<String, DomError> {
        Ok(match field(element)? {
            Field::Input(input) => input.value(),
            Field::TextArea(area) => area.value(),
        })
    }

    fn set_value(&self, element: &Element, value: &str) -> Result<(), DomError> {
        match field(element)? {
            Field::Input(input) => input.set_value(value),
            Field::TextArea(area) => area.set_value(value),
        }
        Ok(())
    }

    fn selection_offsets(&self, element: &Element) -> Option<(u32, u32)> {
        let (start, end) = match field(element).ok()? {
            Field::Input(input) => (input.selection_start(), input.selection_end()),
            Field::TextArea(area) => (area.selection_start(), area.selection_end()),
        };
        match (start, end) {
            (Ok(Some(start)), Ok(Some(end))) => Some((start, end)),
            _ => None,
        }
    }

    fn set_selection_range(&self, element: &Element, start: u32, end: u32) -> Result<(), DomError> {
        match field(element)? {
            Field::Input(input) => input.set_selection_range(start, end),
            Field::TextArea(area) => area.set_selection_range(start, end),
        }
        .map_err(js_error)
    }

    fn focus(&self, element: &Element) -> Result<(), DomError> {
        html(element)?.focus().map_err(js_error)
    }

    fn first_range(&self) -> Result<Option<Range>, DomError> {
        let Some(selection) = self.window.get_selection().map_err(js_error)? else {
            return Ok(None);
        };
        if selection.range_count() == 0 {
            return Ok(None);
        }
        selection.get_range_at(0).map(Some).map_err(js_error)
    }

    fn range_within(&self, range: &Range, element: &Element) -> bool {
        let (Ok(start), Ok(end)) = (range.start_container(), range.end_container()) else {
            return false;
        };
        element.contains(Some(&start)) && element.contains(Some(&end))
    }

    fn range_at_end(&self, element: &Element) -> Result<Range, DomError> {
        let range = self.document.create_range().map_err(js_error)?;
        range.select_node_contents(element).map_err(js_error)?;
        range.collapse_with_to_start(false);
        Ok(range)
    }

    fn delete_range_contents(&self, range: &Range) -> Result<(), DomError> {
        range.delete_contents().map_err(js_error)
    }

    fn insert_text_at(&self, range: &Range, text: &str) -> Result<Node, DomError> {
        let node = self.document.create_text_node(text);
        range.insert_node(&node).map_err(js_error)?;
        Ok(Node::from(node))
    }

    fn collapse_selection_after(&self, node: &Node) -> Result<Range, DomError> {
        let range = self.document.create_range().map_err(js_error)?;
        range.set_start_after(node).map_err(js_error)?;
        range.set_end_after(node).map_err(js_error)?;

        let selection = self
            .window
            .get_selection()
            .map_err(js_error)?
            .ok_or(DomError::NoRange)?;
        selection.remove_all_ranges().map_err(js_error)?;
        selection.add_range(&range).map_err(js_error)?;
        Ok(range)
    }

    fn dispatch_event(&self, element: &Element, kind: EventKind, bubbles: bool) -> Result<(), DomError> {
        let init = EventInit::new();
        init.set_bubbles(bubbles);
        let event = Event::new_with_event_init_dict(kind.as_str(), &init).map_err(js_error)?;
        element.dispatch_event(&event).map_err(js_error)?;
        Ok(())
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        self.document.create_element(tag).map_err(js_error)
    }

    fn set_attribute(&self, element: &Element, name: &str, value: &str) -> Result<(), DomError> {
        element.set_attribute(name, value).map_err(js_error)
    }

    fn set_text_content(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }

    fn set_style_property(&self, element: &Element, property: &str, value: &str) -> Result<(), DomError> {
        html(element)?
            .style()
            .set_property(property, value)
            .map_err(js_error)
    }

    fn append_to_head(&self, element: &Element) -> Result<(), DomError> {
        let head = self
            .document
            .head()
            .ok_or_else(|| DomError::Unsupported("document has no <head>".into()))?;
        head.append_child(element).map_err(js_error)?;
        Ok(())
    }

    fn append_to_body(&self, element: &Element) -> Result<(), DomError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| DomError::Unsupported("document has no <body>".into()))?;
        body.append_child(element).map_err(js_error)?;
        Ok(())
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }
}

/// `navigator.clipboard`, looked up per write so pages without the async
/// clipboard API report `Unavailable` instead of throwing.
#[derive(Debug, Clone)]
pub struct WebClipboard {
    window: Window,
}

impl WebClipboard {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

fn clipboard_error(value: JsValue) -> ClipboardError {
    ClipboardError::Rejected(match js_error(value) {
        DomError::Js(message) => message,
        other => other.to_string(),
    })
}

impl Clipboard for WebClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let navigator = self.window.navigator();
        let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
            .map_err(clipboard_error)?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return Err(ClipboardError::Unavailable);
        }
        let write: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .map_err(clipboard_error)?
            .dyn_into()
            .map_err(|_| ClipboardError::Unavailable)?;
        let promise: Promise = write
            .call1(&clipboard, &JsValue::from_str(text))
            .map_err(clipboard_error)?
            .dyn_into()
            .map_err(clipboard_error)?;
        JsFuture::from(promise).await.map_err(clipboard_error)?;
        Ok(())
    }
}

/// JS event-loop runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebRuntime;

impl Runtime for WebRuntime {
    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalTask {
        let ms = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            });
            if !matches!(scheduled, Some(Ok(_))) {
                warn!(ms, "setTimeout unavailable, resolving immediately");
                if let Err(e) = resolve.call0(&JsValue::NULL) {
                    error!(error = %js_error(e), "Failed to resolve timer");
                }
            }
        });
        Box::pin(async move {
            if let Err(e) = JsFuture::from(promise).await {
                warn!(error = %js_error(e), "Timer rejected");
            }
        })
    }
}

/// Message entry point for the extension shim.
///
/// Takes the request as JSON text and returns the JSON response, or
/// `undefined` for messages this script does not answer.
#[wasm_bindgen(js_name = handleMessage)]
pub fn handle_message(message: &str) -> Option<String> {
    let page = match WebPage::from_global() {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "Content script has no page to work on");
            return None;
        }
    };
    let clipboard = WebClipboard::new(page.window().clone());
    ContentScript::new(page, clipboard, WebRuntime, &EchoConfig::default()).handle_json(message)
}

//! Page abstraction the content-script core is written against.
//!
//! Handles behave like browser DOM references: cheap to clone, shared, and
//! mutated through `&self`. Offsets are UTF-16 code units.

use std::fmt;

use crate::error::DomError;

pub mod memory;

/// The subset of computed style the visibility check reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedStyle {
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
        }
    }
}

/// Native events dispatched after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Change,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live document.
pub trait Page: Clone + 'static {
    type Element: Clone + PartialEq + fmt::Debug + 'static;
    type Node: Clone + fmt::Debug + 'static;
    type Range: Clone + fmt::Debug + 'static;

    // -- queries ------------------------------------------------------------

    /// The element that currently holds focus, if any.
    fn active_element(&self) -> Option<Self::Element>;

    /// Every `textarea`, `input` and `[contenteditable]` element, in
    /// document order.
    fn editable_candidates(&self) -> Vec<Self::Element>;

    /// Lower-case tag name.
    fn tag_name(&self, element: &Self::Element) -> String;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn computed_style(&self, element: &Self::Element) -> Option<ComputedStyle>;

    /// Whether the element has a layout parent (`offsetParent != null`).
    fn has_offset_parent(&self, element: &Self::Element) -> bool;

    // -- text fields --------------------------------------------------------

    fn value(&self, element: &Self::Element) -> Result<String, DomError>;

    fn set_value(&self, element: &Self::Element, value: &str) -> Result<(), DomError>;

    /// `(selectionStart, selectionEnd)`, or `None` when the field reports no
    /// selection.
    fn selection_offsets(&self, element: &Self::Element) -> Option<(u32, u32)>;

    fn set_selection_range(
        &self,
        element: &Self::Element,
        start: u32,
        end: u32,
    ) -> Result<(), DomError>;

    fn focus(&self, element: &Self::Element) -> Result<(), DomError>;

    // -- rich text ----------------------------------------------------------

    /// First range of the document selection, if the selection has any.
    fn first_range(&self) -> Result<Option<Self::Range>, DomError>;

    /// Whether both ends of `range` lie inside `element`.
    fn range_within(&self, range: &Self::Range, element: &Self::Element) -> bool;

    /// A collapsed range after the last child of `element`.
    fn range_at_end(&self, element: &Self::Element) -> Result<Self::Range, DomError>;

    /// Remove the range's contents, leaving it collapsed at its start.
    fn delete_range_contents(&self, range: &Self::Range) -> Result<(), DomError>;

    /// Create a text node holding `text` and insert it at the range's start.
    fn insert_text_at(&self, range: &Self::Range, text: &str) -> Result<Self::Node, DomError>;

    /// Replace the document selection with a caret right after `node`.
    fn collapse_selection_after(&self, node: &Self::Node) -> Result<Self::Range, DomError>;

    // -- events -------------------------------------------------------------

    fn dispatch_event(
        &self,
        element: &Self::Element,
        kind: EventKind,
        bubbles: bool,
    ) -> Result<(), DomError>;

    // -- page chrome --------------------------------------------------------

    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError>;

    fn set_attribute(&self, element: &Self::Element, name: &str, value: &str)
        -> Result<(), DomError>;

    fn set_text_content(&self, element: &Self::Element, text: &str);

    fn set_style_property(
        &self,
        element: &Self::Element,
        property: &str,
        value: &str,
    ) -> Result<(), DomError>;

    fn append_to_head(&self, element: &Self::Element) -> Result<(), DomError>;

    fn append_to_body(&self, element: &Self::Element) -> Result<(), DomError>;

    /// Detach `element` from its parent. Detached elements are left alone.
    fn remove(&self, element: &Self::Element);
}

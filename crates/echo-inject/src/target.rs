//! Editable targets and cursor-correct insertion.
//!
//! A target is classified once, when it is acquired, into one of three
//! kinds. Insertion then works in two steps: read the target's cursor
//! context, and splice the text in at that cursor, which yields the new
//! collapsed caret.

use std::fmt;

use echo_core::config::MissingRangePolicy;
use tracing::{debug, warn};

use crate::dom::Page;
use crate::error::DomError;
use crate::utf16;

/// The three editable primitives the core knows how to write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Single-line text-like `<input>`.
    LinearField,
    /// `<textarea>`.
    MultilineField,
    /// `contenteditable` region.
    RichTextRegion,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::LinearField => write!(f, "linear_field"),
            TargetKind::MultilineField => write!(f, "multiline_field"),
            TargetKind::RichTextRegion => write!(f, "rich_text_region"),
        }
    }
}

/// A page element classified for insertion. Lives for one insertion call.
#[derive(Debug, Clone, PartialEq)]
pub enum EditableTarget<E> {
    LinearField(E),
    MultilineField(E),
    RichTextRegion(E),
}

/// Where the caret is, in the form the target kind understands.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorState<R> {
    /// UTF-16 offsets into a field's value.
    Offsets { start: u32, end: u32 },
    /// A range in the document selection.
    Range(R),
}

impl<R> CursorState<R> {
    pub fn offsets(&self) -> Option<(u32, u32)> {
        match self {
            CursorState::Offsets { start, end } => Some((*start, *end)),
            CursorState::Range(_) => None,
        }
    }
}

/// Whether a `contenteditable` attribute value makes the element editable.
pub fn is_content_editable(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v.is_empty() || v.eq_ignore_ascii_case("true"))
}

impl<E: Clone + PartialEq + fmt::Debug> EditableTarget<E> {
    /// Classify `element`, or return `None` when it is not an editable
    /// target. Disabled and read-only elements never qualify; `<input>`
    /// qualifies only when its type is in `input_types`.
    pub fn classify<P>(page: &P, element: &E, input_types: &[String]) -> Option<Self>
    where
        P: Page<Element = E>,
    {
        if page.attribute(element, "disabled").is_some()
            || page.attribute(element, "readonly").is_some()
        {
            return None;
        }

        match page.tag_name(element).as_str() {
            "textarea" => Some(EditableTarget::MultilineField(element.clone())),
            "input" => {
                let input_type = page
                    .attribute(element, "type")
                    .map(|t| t.trim().to_ascii_lowercase())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "text".to_string());
                input_types
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(&input_type))
                    .then(|| EditableTarget::LinearField(element.clone()))
            }
            _ if is_content_editable(page.attribute(element, "contenteditable").as_deref()) => {
                Some(EditableTarget::RichTextRegion(element.clone()))
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> TargetKind {
        match self {
            EditableTarget::LinearField(_) => TargetKind::LinearField,
            EditableTarget::MultilineField(_) => TargetKind::MultilineField,
            EditableTarget::RichTextRegion(_) => TargetKind::RichTextRegion,
        }
    }

    pub fn element(&self) -> &E {
        match self {
            EditableTarget::LinearField(e)
            | EditableTarget::MultilineField(e)
            | EditableTarget::RichTextRegion(e) => e,
        }
    }

    /// Insert `text` at the current cursor and return the collapsed caret
    /// that follows it.
    pub fn insert<P>(
        &self,
        page: &P,
        text: &str,
        policy: MissingRangePolicy,
    ) -> Result<CursorState<P::Range>, DomError>
    where
        P: Page<Element = E>,
    {
        let cursor = self.cursor(page, policy)?;
        self.insert_at(page, cursor, text)
    }

    /// Read the cursor context for this target.
    ///
    /// Fields without a selection report end-of-content. A rich-text region
    /// whose document selection has no range inside it follows `policy`.
    pub fn cursor<P>(
        &self,
        page: &P,
        policy: MissingRangePolicy,
    ) -> Result<CursorState<P::Range>, DomError>
    where
        P: Page<Element = E>,
    {
        match self {
            EditableTarget::LinearField(el) | EditableTarget::MultilineField(el) => {
                let (start, end) = match page.selection_offsets(el) {
                    Some(offsets) => offsets,
                    None => {
                        let len = utf16::len(&page.value(el)?);
                        (len, len)
                    }
                };
                Ok(CursorState::Offsets { start, end })
            }
            EditableTarget::RichTextRegion(el) => match page.first_range()? {
                Some(range) if page.range_within(&range, el) => Ok(CursorState::Range(range)),
                _ => {
                    debug!(%policy, "Rich-text region has no range inside it");
                    match policy {
                        MissingRangePolicy::AppendToEnd => {
                            Ok(CursorState::Range(page.range_at_end(el)?))
                        }
                        MissingRangePolicy::Reject => Err(DomError::NoRange),
                    }
                }
            },
        }
    }

    /// Replace the span under `cursor` with `text`, collapse the caret after
    /// it and re-focus the target.
    pub fn insert_at<P>(
        &self,
        page: &P,
        cursor: CursorState<P::Range>,
        text: &str,
    ) -> Result<CursorState<P::Range>, DomError>
    where
        P: Page<Element = E>,
    {
        match (self, cursor) {
            (
                EditableTarget::LinearField(el) | EditableTarget::MultilineField(el),
                CursorState::Offsets { start, end },
            ) => {
                let content = page.value(el)?;
                let start = utf16::char_boundary(&content, start);
                page.set_value(el, &utf16::splice(&content, start, end, text))?;

                let caret = start + utf16::len(text);
                // Some input types (email) reject selection ranges; the value
                // assignment already left the caret at the end there.
                if let Err(e) = page.set_selection_range(el, caret, caret) {
                    debug!(error = %e, "Field does not support selection ranges");
                }
                refocus(page, el);
                Ok(CursorState::Offsets {
                    start: caret,
                    end: caret,
                })
            }
            (EditableTarget::RichTextRegion(el), CursorState::Range(range)) => {
                page.delete_range_contents(&range)?;
                let node = page.insert_text_at(&range, text).map_err(|e| {
                    warn!(error = %e, "Selected content was deleted but the text could not be placed");
                    e
                })?;
                // The text is in; a caret that cannot move stays where the
                // deletion left it.
                let caret = match page.collapse_selection_after(&node) {
                    Ok(caret) => caret,
                    Err(e) => {
                        debug!(error = %e, "Failed to move the caret after inserted text");
                        range
                    }
                };
                refocus(page, el);
                Ok(CursorState::Range(caret))
            }
            (target, _) => Err(DomError::Unsupported(format!(
                "cursor does not match a {} target",
                target.kind()
            ))),
        }
    }
}

/// Re-focus after a mutation. Failures are logged only.
fn refocus<P: Page>(page: &P, element: &P::Element) {
    if let Err(e) = page.focus(element) {
        debug!(error = %e, "Failed to re-focus target");
    }
}

//! In-memory page used by tests and the CLI harness.
//!
//! A small arena DOM: a document root with `<head>` and `<body>`, element and
//! text nodes, focus, a document selection, inline style per element and a
//! log of every dispatched event. Ranges are plain boundary-point values;
//! the core only relies on a range's start after its contents are deleted,
//! which is where a live browser range collapses to as well.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::dom::{ComputedStyle, EventKind, Page};
use crate::error::DomError;
use crate::utf16;

/// Handle to a node in a [`MemoryPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A position inside a container: a UTF-16 offset for text nodes, a child
/// index for elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub container: NodeId,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl MemoryRange {
    pub fn new(container: NodeId, start: u32, end: u32) -> Self {
        Self {
            start: BoundaryPoint {
                container,
                offset: start,
            },
            end: BoundaryPoint {
                container,
                offset: end,
            },
        }
    }

    pub fn collapsed(container: NodeId, offset: u32) -> Self {
        Self::new(container, offset, offset)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// An event recorded by [`Page::dispatch_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEvent {
    pub target: NodeId,
    pub kind: EventKind,
    pub bubbles: bool,
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    value: String,
    selection: Option<(u32, u32)>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<NodeData>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    active: Option<NodeId>,
    selection: Vec<MemoryRange>,
    events: Vec<RecordedEvent>,
    selection_broken: bool,
    selection_locked: bool,
}

impl Arena {
    fn new() -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            active: None,
            selection: Vec::new(),
            events: Vec::new(),
            selection_broken: false,
            selection_locked: false,
        };
        arena.root = arena.alloc(NodeKind::Document);
        arena.head = arena.alloc_element("head");
        arena.body = arena.alloc_element("body");
        let (root, head, body) = (arena.root, arena.head, arena.body);
        arena.attach(root, head, None);
        arena.attach(root, body, None);
        arena
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    fn alloc_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id).kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.node_mut(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Insert `child` under `parent` at `index` (append when `None`).
    fn attach(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        self.detach(child);
        let children = &mut self.node_mut(parent).children;
        let at = index.unwrap_or(children.len()).min(children.len());
        children.insert(at, child);
        self.node_mut(child).parent = Some(parent);
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node_mut(child).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != child);
        }
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.node(id).parent?;
        let index = self.node(parent).children.iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.node(node).parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn is_attached(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, id)
    }

    fn style_of(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.style.get(property))
            .map(|s| s.as_str())
    }

    fn default_display(tag: &str) -> &'static str {
        match tag {
            "input" | "span" | "a" => "inline",
            "textarea" => "inline-block",
            "style" | "head" => "none",
            _ => "block",
        }
    }

    fn computed_style(&self, id: NodeId) -> Option<ComputedStyle> {
        let data = self.element(id)?;
        let display = self
            .style_of(id, "display")
            .unwrap_or_else(|| Self::default_display(&data.tag))
            .to_string();

        // Visibility inherits: nearest explicit value wins.
        let mut visibility = "visible".to_string();
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if let Some(v) = self.style_of(node, "visibility") {
                visibility = v.to_string();
                break;
            }
            cursor = self.node(node).parent;
        }

        let opacity = self.style_of(id, "opacity").unwrap_or("1").to_string();
        Some(ComputedStyle {
            display,
            visibility,
            opacity,
        })
    }

    fn has_offset_parent(&self, id: NodeId) -> bool {
        if !self.is_attached(id) || id == self.body {
            return false;
        }
        if self.style_of(id, "position") == Some("fixed") {
            return false;
        }
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node != self.root
                && self
                    .computed_style(node)
                    .is_some_and(|s| s.display == "none")
            {
                return false;
            }
            cursor = self.node(node).parent;
        }
        true
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.node(id).children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    fn text_content(&self, id: NodeId) -> String {
        match &self.node(id).kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Element(data) if data.tag == "input" || data.tag == "textarea" => {
                String::new()
            }
            _ => self
                .node(id)
                .children
                .iter()
                .map(|c| self.text_content(*c))
                .collect(),
        }
    }

    fn container_len(&self, id: NodeId) -> u32 {
        match &self.node(id).kind {
            NodeKind::Text(text) => utf16::len(text),
            _ => self.node(id).children.len() as u32,
        }
    }

    fn check_point(&self, point: BoundaryPoint) -> Result<(), DomError> {
        let len = self.container_len(point.container);
        if point.offset > len {
            return Err(DomError::OutOfBounds {
                offset: point.offset,
                len,
            });
        }
        Ok(())
    }

    fn delete_range(&mut self, range: &MemoryRange) -> Result<(), DomError> {
        self.check_point(range.start)?;
        self.check_point(range.end)?;

        if range.start.container == range.end.container {
            let (s, e) = (range.start.offset, range.end.offset.max(range.start.offset));
            let container = range.start.container;
            if let Some(text) = self.text_mut(container) {
                *text = utf16::splice(text, s, e, "");
            } else {
                let doomed: Vec<NodeId> =
                    self.node(container).children[s as usize..e as usize].to_vec();
                for child in doomed {
                    self.detach(child);
                }
            }
            return Ok(());
        }

        let ancestor = self
            .common_ancestor(range.start.container, range.end.container)
            .ok_or(DomError::Detached)?;

        // Trim the start side: drop everything after the start point up to
        // the child of the common ancestor that holds it.
        let first_doomed = if range.start.container == ancestor {
            range.start.offset as usize
        } else {
            self.truncate_after(range.start);
            let top = self.climb_detaching(range.start.container, ancestor, true)?;
            top + 1
        };

        // Trim the end side the same way, dropping everything before it.
        let last_doomed = if range.end.container == ancestor {
            range.end.offset as usize
        } else {
            self.truncate_before(range.end);
            self.climb_detaching(range.end.container, ancestor, false)?
        };

        if last_doomed > first_doomed {
            let doomed: Vec<NodeId> =
                self.node(ancestor).children[first_doomed..last_doomed].to_vec();
            for child in doomed {
                self.detach(child);
            }
        }
        Ok(())
    }

    fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let mut node = Some(a);
        while let Some(id) = node {
            if self.is_inclusive_ancestor(id, b) {
                return Some(id);
            }
            node = self.node(id).parent;
        }
        None
    }

    /// Remove the contents of `point.container` after `point.offset`.
    fn truncate_after(&mut self, point: BoundaryPoint) {
        if let Some(text) = self.text_mut(point.container) {
            *text = utf16::split_at(text, point.offset).0;
            return;
        }
        let doomed: Vec<NodeId> = self.node(point.container).children
            [point.offset as usize..]
            .to_vec();
        for child in doomed {
            self.detach(child);
        }
    }

    /// Remove the contents of `point.container` before `point.offset`.
    fn truncate_before(&mut self, point: BoundaryPoint) {
        if let Some(text) = self.text_mut(point.container) {
            *text = utf16::split_at(text, point.offset).1;
            return;
        }
        let doomed: Vec<NodeId> = self.node(point.container).children
            [..point.offset as usize]
            .to_vec();
        for child in doomed {
            self.detach(child);
        }
    }

    /// Walk from `node` up to the child of `ancestor` that contains it,
    /// detaching the siblings that follow (or precede) each step. Returns
    /// that child's index in `ancestor`.
    fn climb_detaching(
        &mut self,
        mut node: NodeId,
        ancestor: NodeId,
        following: bool,
    ) -> Result<usize, DomError> {
        loop {
            let (parent, index) = self.index_in_parent(node).ok_or(DomError::Detached)?;
            if parent == ancestor {
                return Ok(index);
            }
            let siblings = &self.node(parent).children;
            let doomed: Vec<NodeId> = if following {
                siblings[index + 1..].to_vec()
            } else {
                siblings[..index].to_vec()
            };
            for sibling in doomed {
                self.detach(sibling);
            }
            node = parent;
        }
    }

    fn insert_text(&mut self, point: BoundaryPoint, text: &str) -> Result<NodeId, DomError> {
        self.check_point(point)?;
        let node = self.alloc(NodeKind::Text(text.to_string()));

        let split = match &self.node(point.container).kind {
            NodeKind::Text(existing) => Some(utf16::split_at(existing, point.offset)),
            _ => None,
        };
        match split {
            Some((before, after)) => {
                let (parent, index) = self
                    .index_in_parent(point.container)
                    .ok_or(DomError::Detached)?;
                if let Some(existing) = self.text_mut(point.container) {
                    *existing = before;
                }
                self.attach(parent, node, Some(index + 1));
                if !after.is_empty() {
                    let rest = self.alloc(NodeKind::Text(after));
                    self.attach(parent, rest, Some(index + 2));
                }
            }
            None => self.attach(point.container, node, Some(point.offset as usize)),
        }
        Ok(node)
    }
}

/// In-memory [`Page`] implementation.
#[derive(Debug, Clone)]
pub struct MemoryPage {
    inner: Rc<RefCell<Arena>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// An empty document with `<head>` and `<body>`.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Arena::new())),
        }
    }

    pub fn head(&self) -> NodeId {
        self.inner.borrow().head
    }

    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    // -- building -----------------------------------------------------------

    /// Append a new element under `parent`.
    pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
        let mut arena = self.inner.borrow_mut();
        let id = arena.alloc_element(tag);
        arena.attach(parent, id, None);
        id
    }

    /// Append a text node under `parent`.
    pub fn append_text(&self, parent: NodeId, text: &str) -> NodeId {
        let mut arena = self.inner.borrow_mut();
        let id = arena.alloc(NodeKind::Text(text.to_string()));
        arena.attach(parent, id, None);
        id
    }

    /// Append a `<textarea>` holding `value` to the body.
    pub fn add_textarea(&self, value: &str) -> NodeId {
        let id = self.append_element(self.body(), "textarea");
        self.set_field_value(id, value);
        id
    }

    /// Append an `<input>` to the body. `None` leaves the `type` attribute off.
    pub fn add_input(&self, input_type: Option<&str>, value: &str) -> NodeId {
        let id = self.append_element(self.body(), "input");
        if let Some(t) = input_type {
            self.set_attr(id, "type", t);
        }
        self.set_field_value(id, value);
        id
    }

    /// Append a `<div contenteditable="true">` holding `text` to the body.
    pub fn add_editable(&self, text: &str) -> NodeId {
        let id = self.append_element(self.body(), "div");
        self.set_attr(id, "contenteditable", "true");
        if !text.is_empty() {
            self.append_text(id, text);
        }
        id
    }

    pub fn set_attr(&self, id: NodeId, name: &str, value: &str) {
        if let Some(data) = self.inner.borrow_mut().element_mut(id) {
            data.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_style(&self, id: NodeId, property: &str, value: &str) {
        if let Some(data) = self.inner.borrow_mut().element_mut(id) {
            data.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn set_field_value(&self, id: NodeId, value: &str) {
        if let Some(data) = self.inner.borrow_mut().element_mut(id) {
            data.value = value.to_string();
        }
    }

    /// Give `id` focus without touching its selection.
    pub fn focus_element(&self, id: NodeId) {
        self.inner.borrow_mut().active = Some(id);
    }

    pub fn blur(&self) {
        self.inner.borrow_mut().active = None;
    }

    /// Set a field's selection offsets.
    pub fn select_field(&self, id: NodeId, start: u32, end: u32) {
        if let Some(data) = self.inner.borrow_mut().element_mut(id) {
            data.selection = Some((start, end));
        }
    }

    /// Replace the document selection with `range`.
    pub fn select_range(&self, range: MemoryRange) {
        self.inner.borrow_mut().selection = vec![range];
    }

    pub fn clear_selection(&self) {
        self.inner.borrow_mut().selection.clear();
    }

    /// Make every selection read fail, like a page whose selection API
    /// throws.
    pub fn break_selection(&self) {
        self.inner.borrow_mut().selection_broken = true;
    }

    /// Make every selection write fail while reads keep working.
    pub fn lock_selection(&self) {
        self.inner.borrow_mut().selection_locked = true;
    }

    // -- inspecting ---------------------------------------------------------

    pub fn field_value(&self, id: NodeId) -> String {
        self.inner
            .borrow()
            .element(id)
            .map(|d| d.value.clone())
            .unwrap_or_default()
    }

    pub fn field_selection(&self, id: NodeId) -> Option<(u32, u32)> {
        self.inner.borrow().element(id).and_then(|d| d.selection)
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.inner.borrow().text_content(id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.inner.borrow().node(id).children.clone()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.inner.borrow().node(id).parent
    }

    pub fn active(&self) -> Option<NodeId> {
        self.inner.borrow().active
    }

    pub fn selection(&self) -> Vec<MemoryRange> {
        self.inner.borrow().selection.clone()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.inner.borrow().events.clone()
    }

    pub fn events_for(&self, id: NodeId) -> Vec<RecordedEvent> {
        self.inner
            .borrow()
            .events
            .iter()
            .filter(|e| e.target == id)
            .copied()
            .collect()
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.inner.borrow().is_attached(id)
    }

    /// Attached elements carrying attribute `name`.
    pub fn elements_with_attribute(&self, name: &str) -> Vec<NodeId> {
        let arena = self.inner.borrow();
        arena
            .document_order()
            .into_iter()
            .filter(|id| {
                arena
                    .element(*id)
                    .is_some_and(|d| d.attributes.contains_key(name))
            })
            .collect()
    }

    pub fn style_property(&self, id: NodeId, property: &str) -> Option<String> {
        self.inner
            .borrow()
            .style_of(id, property)
            .map(|s| s.to_string())
    }

    // -- fixtures -----------------------------------------------------------

    /// Build a page from a fixture description. Elements are appended to the
    /// body in fixture order.
    pub fn from_fixture(fixture: &PageFixture) -> Self {
        let page = Self::new();
        for element in &fixture.elements {
            let id = page.append_element(page.body(), &element.tag);
            if let Some(ref name) = element.id {
                page.set_attr(id, "id", name);
            }
            for (name, value) in &element.attributes {
                page.set_attr(id, name, value);
            }
            for (property, value) in &element.style {
                page.set_style(id, property, value);
            }
            page.set_field_value(id, &element.value);

            let text_node = element.text.as_deref().map(|t| page.append_text(id, t));

            if let Some([start, end]) = element.selection {
                if page.is_field(id) {
                    page.select_field(id, start, end);
                } else {
                    let range = match text_node {
                        Some(node) => MemoryRange::new(node, start, end),
                        None => MemoryRange::collapsed(id, 0),
                    };
                    page.select_range(range);
                }
            }
            if element.focused {
                page.focus_element(id);
            }
        }
        page
    }

    /// Per-element summary of the page body, for printing.
    pub fn snapshot(&self) -> Vec<ElementSnapshot> {
        let arena = self.inner.borrow();
        arena
            .document_order()
            .into_iter()
            .filter(|id| arena.is_inclusive_ancestor(arena.body, *id) && *id != arena.body)
            .filter_map(|id| {
                let data = arena.element(id)?;
                let is_field = data.tag == "input" || data.tag == "textarea";
                Some(ElementSnapshot {
                    id: data.attributes.get("id").cloned(),
                    tag: data.tag.clone(),
                    content: if is_field {
                        data.value.clone()
                    } else {
                        arena.text_content(id)
                    },
                    focused: arena.active == Some(id),
                })
            })
            .collect()
    }

    fn is_field(&self, id: NodeId) -> bool {
        self.inner
            .borrow()
            .element(id)
            .is_some_and(|d| d.tag == "input" || d.tag == "textarea")
    }
}

impl Page for MemoryPage {
    type Element = NodeId;
    type Node = NodeId;
    type Range = MemoryRange;

    fn active_element(&self) -> Option<NodeId> {
        self.inner.borrow().active
    }

    fn editable_candidates(&self) -> Vec<NodeId> {
        let arena = self.inner.borrow();
        arena
            .document_order()
            .into_iter()
            .filter(|id| {
                arena.element(*id).is_some_and(|d| {
                    d.tag == "textarea"
                        || d.tag == "input"
                        || d.attributes.contains_key("contenteditable")
                })
            })
            .collect()
    }

    fn tag_name(&self, element: &NodeId) -> String {
        self.inner
            .borrow()
            .element(*element)
            .map(|d| d.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .element(*element)
            .and_then(|d| d.attributes.get(name).cloned())
    }

    fn computed_style(&self, element: &NodeId) -> Option<ComputedStyle> {
        self.inner.borrow().computed_style(*element)
    }

    fn has_offset_parent(&self, element: &NodeId) -> bool {
        self.inner.borrow().has_offset_parent(*element)
    }

    fn value(&self, element: &NodeId) -> Result<String, DomError> {
        if !self.is_field(*element) {
            return Err(DomError::NotAField(self.tag_name(element)));
        }
        Ok(self.field_value(*element))
    }

    fn set_value(&self, element: &NodeId, value: &str) -> Result<(), DomError> {
        if !self.is_field(*element) {
            return Err(DomError::NotAField(self.tag_name(element)));
        }
        let mut arena = self.inner.borrow_mut();
        if let Some(data) = arena.element_mut(*element) {
            data.value = value.to_string();
            // Assigning a value moves the caret to the end, as browsers do.
            let end = utf16::len(value);
            data.selection = Some((end, end));
        }
        Ok(())
    }

    fn selection_offsets(&self, element: &NodeId) -> Option<(u32, u32)> {
        self.field_selection(*element)
    }

    fn set_selection_range(&self, element: &NodeId, start: u32, end: u32) -> Result<(), DomError> {
        if !self.is_field(*element) {
            return Err(DomError::NotAField(self.tag_name(element)));
        }
        let mut arena = self.inner.borrow_mut();
        if let Some(data) = arena.element_mut(*element) {
            let len = utf16::len(&data.value);
            let start = start.min(len);
            data.selection = Some((start, end.clamp(start, len)));
        }
        Ok(())
    }

    fn focus(&self, element: &NodeId) -> Result<(), DomError> {
        let mut arena = self.inner.borrow_mut();
        if !arena.is_attached(*element) {
            return Err(DomError::Detached);
        }
        arena.active = Some(*element);
        Ok(())
    }

    fn first_range(&self) -> Result<Option<MemoryRange>, DomError> {
        let arena = self.inner.borrow();
        if arena.selection_broken {
            return Err(DomError::Js("InvalidStateError: selection unavailable".into()));
        }
        Ok(arena.selection.first().copied())
    }

    fn range_within(&self, range: &MemoryRange, element: &NodeId) -> bool {
        let arena = self.inner.borrow();
        arena.is_inclusive_ancestor(*element, range.start.container)
            && arena.is_inclusive_ancestor(*element, range.end.container)
    }

    fn range_at_end(&self, element: &NodeId) -> Result<MemoryRange, DomError> {
        let arena = self.inner.borrow();
        if !arena.is_attached(*element) {
            return Err(DomError::Detached);
        }
        let len = arena.node(*element).children.len() as u32;
        Ok(MemoryRange::collapsed(*element, len))
    }

    fn delete_range_contents(&self, range: &MemoryRange) -> Result<(), DomError> {
        self.inner.borrow_mut().delete_range(range)
    }

    fn insert_text_at(&self, range: &MemoryRange, text: &str) -> Result<NodeId, DomError> {
        self.inner.borrow_mut().insert_text(range.start, text)
    }

    fn collapse_selection_after(&self, node: &NodeId) -> Result<MemoryRange, DomError> {
        let mut arena = self.inner.borrow_mut();
        if arena.selection_locked {
            return Err(DomError::Js("InvalidStateError: selection is locked".into()));
        }
        let (parent, index) = arena.index_in_parent(*node).ok_or(DomError::Detached)?;
        let range = MemoryRange::collapsed(parent, index as u32 + 1);
        arena.selection = vec![range];
        Ok(range)
    }

    fn dispatch_event(&self, element: &NodeId, kind: EventKind, bubbles: bool) -> Result<(), DomError> {
        let mut arena = self.inner.borrow_mut();
        if !arena.is_attached(*element) {
            return Err(DomError::Detached);
        }
        arena.events.push(RecordedEvent {
            target: *element,
            kind,
            bubbles,
        });
        Ok(())
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        Ok(self.inner.borrow_mut().alloc_element(tag))
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.set_attr(*element, name, value);
        Ok(())
    }

    fn set_text_content(&self, element: &NodeId, text: &str) {
        let mut arena = self.inner.borrow_mut();
        let old = arena.node(*element).children.clone();
        for child in old {
            arena.detach(child);
        }
        if !text.is_empty() {
            let node = arena.alloc(NodeKind::Text(text.to_string()));
            arena.attach(*element, node, None);
        }
    }

    fn set_style_property(&self, element: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.set_style(*element, property, value);
        Ok(())
    }

    fn append_to_head(&self, element: &NodeId) -> Result<(), DomError> {
        let mut arena = self.inner.borrow_mut();
        let head = arena.head;
        arena.attach(head, *element, None);
        Ok(())
    }

    fn append_to_body(&self, element: &NodeId) -> Result<(), DomError> {
        let mut arena = self.inner.borrow_mut();
        let body = arena.body;
        arena.attach(body, *element, None);
        Ok(())
    }

    fn remove(&self, element: &NodeId) {
        self.inner.borrow_mut().detach(*element);
    }
}

/// JSON description of a page for the CLI harness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFixture {
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

/// One body-level element of a [`PageFixture`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementFixture {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Field value (`input`/`textarea` only).
    #[serde(default)]
    pub value: String,
    /// Text child (non-field elements).
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub focused: bool,
    /// Field selection offsets, or a range inside the text child.
    #[serde(default)]
    pub selection: Option<[u32; 2]>,
}

/// Printable state of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tag: String,
    pub content: String,
    pub focused: bool,
}

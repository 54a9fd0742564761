//! Live document model for the dictionary page.
//!
//! An arena of element and text nodes rooted at `body`. Every child-list
//! change under `body` is queued as a [`MutationRecord`], the same batches a
//! subtree `MutationObserver` on the page body would deliver. Removed nodes
//! stay in the arena with their own subtree intact, so records can still be
//! inspected after the fact, until [`Document::collect_detached`] frees them.
//! Freed slots are reused under a new generation so old ids go stale instead
//! of pointing at someone else's node.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} has no parent")]
    Detached(NodeId),

    #[error("node {0:?} cannot be inserted into its own subtree")]
    Cycle(NodeId),
}

/// The subset of CSS selectors the page contract needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'a> {
    Tag(&'a str),
    Class(&'a str),
    /// Selector list, `a, .b`
    Any(&'a [Selector<'a>]),
}

impl Selector<'_> {
    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Tag(tag) => element.tag.eq_ignore_ascii_case(tag),
            Selector::Class(class) => element.has_class(class),
            Selector::Any(selectors) => selectors.iter().any(|s| s.matches(element)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    fn from_scraped(source: &scraper::node::Element) -> Self {
        Self {
            tag: source.name().to_ascii_lowercase(),
            classes: source.classes().map(str::to_string).collect(),
            attrs: source
                .attrs()
                .filter(|(name, _)| *name != "class")
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// One child-list change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    body: NodeId,
    url: String,
    viewport_width: u32,
    records: Vec<MutationRecord>,
}

impl Document {
    /// Empty page
    pub fn new(url: impl Into<String>) -> Self {
        let body = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(Element::new("body")),
        };

        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(body),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            url: url.into(),
            viewport_width: 0,
            records: Vec::new(),
        }
    }

    /// Load a page. Loading itself produces no mutation records.
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        let mut doc = Self::new(url);
        let body = doc.body;
        for id in doc.import_html(html) {
            doc.link(body, id);
        }
        doc
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    /// Host re-render: the body content is swapped for a new snapshot
    pub fn replace_body(&mut self, html: &str) {
        let imported = self.import_html(html);
        let body = self.body;

        let removed = self.take_children(body);
        for id in &imported {
            self.link(body, *id);
        }

        self.record(body, imported, removed);
    }

    /// Drain queued mutation records, oldest first
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn has_pending_records(&self) -> bool {
        !self.records.is_empty()
    }

    fn import_html(&mut self, html: &str) -> Vec<NodeId> {
        let parsed = Html::parse_document(html);
        let root = parsed.root_element();
        let body = root
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
            .unwrap_or(root);

        self.import_children(body)
    }

    fn import_children(&mut self, source: ElementRef<'_>) -> Vec<NodeId> {
        let mut imported = Vec::new();

        for child in source.children() {
            if let Some(element) = ElementRef::wrap(child) {
                let id = self.alloc(NodeKind::Element(Element::from_scraped(element.value())));
                for grandchild in self.import_children(element) {
                    self.link(id, grandchild);
                }
                imported.push(id);
            } else if let Some(text) = child.value().as_text() {
                imported.push(self.alloc(NodeKind::Text(text.to_string())));
            }
        }

        imported
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            kind,
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Append a detached, valid child without recording
    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Unlink every child of `id` without recording, returns them in order
    fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self
            .node_mut(id)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in &removed {
            if let Some(node) = self.node_mut(*child) {
                node.parent = None;
            }
        }
        removed
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Free every node that is no longer attached under `body`.
    ///
    /// Ids of freed nodes go stale, so this runs only once the records that
    /// mention removed nodes have been handled.
    pub fn collect_detached(&mut self) -> usize {
        let mut live = vec![false; self.slots.len()];
        live[self.body.index] = true;
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            for child in self.children(id) {
                live[child.index] = true;
                stack.push(*child);
            }
        }

        let mut freed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.is_some() && !live[index] {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
                freed += 1;
            }
        }
        freed
    }

    /// Nodes currently held, attached or not
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.is_connected(target) {
            self.records.push(MutationRecord {
                target,
                added,
                removed,
            });
        }
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    pub fn element(&self, id: NodeId) -> Result<&Element, DomError> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Ok(element),
            NodeKind::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            Some(NodeKind::Text(_)) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::UnknownNode(id)),
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    pub fn matches(&self, id: NodeId, selector: &Selector<'_>) -> bool {
        self.element(id).is_ok_and(|el| selector.matches(el))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_ok_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(id)?;
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.attr(name)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(id)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.element_mut(id)?.attrs.remove(name);
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).ok()?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings[pos + 1..]
            .iter()
            .copied()
            .find(|c| self.is_element(*c))
    }

    /// Attached under `body`
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.body, id)
    }

    /// Inclusive ancestry check
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nearest inclusive ancestor matching the selector
    pub fn closest(&self, id: NodeId, selector: &Selector<'_>) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };

        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
        self.record(parent, Vec::new(), vec![id]);
        Ok(())
    }

    /// Detach a node, a no-op for nodes without a parent
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.detach(id)
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::Cycle(child));
        }
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        self.link(parent, child);
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Insert `node` as the next sibling of `reference`
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::Detached(reference))?;
        self.check_insertable(parent, node)?;
        self.detach(node)?;

        let siblings = self
            .node_mut(parent)
            .map(|n| &mut n.children)
            .ok_or(DomError::UnknownNode(parent))?;
        let pos = siblings
            .iter()
            .position(|c| *c == reference)
            .ok_or(DomError::Detached(reference))?;
        siblings.insert(pos + 1, node);
        if let Some(inserted) = self.node_mut(node) {
            inserted.parent = Some(parent);
        }

        self.record(parent, vec![node], Vec::new());
        Ok(())
    }

    /// Replace all children with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.element(id)?;

        let removed = self.take_children(id);
        let text_node = self.create_text(text);
        self.link(id, text_node);

        self.record(id, vec![text_node], removed);
        Ok(())
    }

    /// Matching descendants of `scope` in document order
    pub fn query_all(&self, scope: NodeId, selector: &Selector<'_>) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.walk(scope, |id| {
            if self.matches(id, selector) {
                found.push(id);
            }
            true
        });
        found
    }

    /// First matching descendant of `scope`
    pub fn query(&self, scope: NodeId, selector: &Selector<'_>) -> Option<NodeId> {
        let mut found = None;
        self.walk(scope, |id| {
            if found.is_none() && self.matches(id, selector) {
                found = Some(id);
            }
            found.is_none()
        });
        found
    }

    /// Pre-order walk over descendants until `visit` returns false
    fn walk(&self, scope: NodeId, mut visit: impl FnMut(NodeId) -> bool) {
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !visit(id) {
                return;
            }
            stack.extend(self.children(id).iter().rev());
        }
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(id, None, &mut text);
        text
    }

    /// Text of all descendants, leaving out subtrees that match `skip`
    pub fn text_content_excluding(&self, id: NodeId, skip: &Selector<'_>) -> String {
        let mut text = String::new();
        self.collect_text(id, Some(skip), &mut text);
        text
    }

    fn collect_text(&self, id: NodeId, skip: Option<&Selector<'_>>, out: &mut String) {
        for child in self.children(id) {
            match self.node(*child).ok().map(|n| &n.kind) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(NodeKind::Element(element)) => {
                    if skip.is_some_and(|s| s.matches(element)) {
                        continue;
                    }
                    self.collect_text(*child, skip, out);
                }
                None => {}
            }
        }
    }

    /// Text of direct text children only
    pub fn own_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|child| match self.node(*child).ok().map(|n| &n.kind) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

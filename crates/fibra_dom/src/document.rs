//! In-memory document
//!
//! A [`Document`] is a cheap, cloneable handle to a node arena. It implements
//! [`Host`] so a renderer can mount into it, and exposes read-only inspection
//! helpers for assertions.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use fibra_core::{Event, EventHandler, HostError, PropValue, NODE_VALUE};
use fibra_reconciler::Host;

new_key_type! {
    /// Handle to a node in a [`Document`]
    pub struct NodeId;
}

/// What a node is
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A mount point; serializes as its children only
    Root,
    Element { tag: String },
    Text { value: String },
}

#[derive(Debug)]
struct DomNode {
    kind: NodeKind,
    properties: IndexMap<String, PropValue>,
    listeners: Vec<(String, EventHandler)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl DomNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            properties: IndexMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct DocumentInner {
    nodes: SlotMap<NodeId, DomNode>,
    mutations: u64,
}

impl DocumentInner {
    fn node(&self, id: NodeId) -> Result<&DomNode, HostError> {
        self.nodes
            .get(id)
            .ok_or_else(|| HostError::UnknownNode(format!("{:?}", id)))
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes.get_mut(id).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|&c| c != id);
        }
    }

    /// Check that `child` may be placed under `parent`
    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let parent_node = self.node(parent)?;
        self.node(child)?;

        if let NodeKind::Text { .. } = parent_node.kind {
            return Err(HostError::InvalidParent(format!("{:?} is a text node", parent)));
        }

        let mut current = Some(parent);
        while let Some(id) = current {
            if id == child {
                return Err(HostError::Cycle(format!(
                    "{:?} is an ancestor of {:?}",
                    child, parent
                )));
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        Ok(())
    }
}

/// In-memory document
#[derive(Clone, Debug, Default)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached mount point
    pub fn create_container(&self) -> NodeId {
        self.inner
            .borrow_mut()
            .nodes
            .insert(DomNode::new(NodeKind::Root))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.borrow().nodes.contains_key(id)
    }

    /// Number of live nodes, attached or not
    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    /// Number of tree, property and listener mutations applied so far
    pub fn mutation_count(&self) -> u64 {
        self.inner.borrow().mutations
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.inner.borrow().nodes.get(id).map(|n| n.kind.clone())
    }

    pub fn tag(&self, id: NodeId) -> Option<String> {
        match self.kind(id)? {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    /// Value of a text node
    pub fn text(&self, id: NodeId) -> Option<String> {
        match self.kind(id)? {
            NodeKind::Text { value } => Some(value),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .nodes
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.get(id).and_then(|n| n.parent)
    }

    pub fn property(&self, id: NodeId, key: &str) -> Option<PropValue> {
        self.inner
            .borrow()
            .nodes
            .get(id)
            .and_then(|n| n.properties.get(key).cloned())
    }

    pub fn property_keys(&self, id: NodeId) -> Vec<String> {
        self.inner
            .borrow()
            .nodes
            .get(id)
            .map(|n| n.properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.inner
            .borrow()
            .nodes
            .get(id)
            .map(|n| n.listeners.iter().filter(|(e, _)| e == event).count())
            .unwrap_or(0)
    }

    /// Concatenated text of every text node under `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        collect_text(&inner, id, &mut out);
        out
    }

    /// Serialize the subtree at `id` as HTML
    ///
    /// Properties become attributes in insertion order; handlers and opaque
    /// values are omitted.
    pub fn to_html(&self, id: NodeId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        write_html(&inner, id, &mut out);
        out
    }

    /// First element with `tag` at or below `root`, in document order
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.find(root, &|node| {
            matches!(&node.kind, NodeKind::Element { tag: t } if t == tag)
        })
    }

    /// First node at or below `root` whose `id` property equals `id`
    pub fn find_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.find(root, &|node| {
            node.properties.get("id").and_then(PropValue::as_str) == Some(id)
        })
    }

    fn find(&self, root: NodeId, pred: &dyn Fn(&DomNode) -> bool) -> Option<NodeId> {
        let inner = self.inner.borrow();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = inner.nodes.get(id) else {
                continue;
            };
            if pred(node) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Call every listener on `id` registered for `event.event_type`
    ///
    /// Handlers run after the document borrow is released, so they may
    /// mutate the document or trigger a re-render. Returns the number of
    /// handlers called.
    pub fn dispatch_event(&self, id: NodeId, event: &Event) -> usize {
        let handlers: Vec<EventHandler> = {
            let inner = self.inner.borrow();
            let Some(node) = inner.nodes.get(id) else {
                tracing::warn!(node = ?id, event = %event.event_type, "dispatch to unknown node");
                return 0;
            };
            node.listeners
                .iter()
                .filter(|(e, _)| *e == event.event_type)
                .map(|(_, h)| h.clone())
                .collect()
        };

        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    /// Dispatch a `click` event
    pub fn click(&self, id: NodeId) -> usize {
        self.dispatch_event(id, &Event::new("click"))
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut DocumentInner) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        inner.mutations += 1;
        f(&mut inner)
    }
}

fn collect_text(inner: &DocumentInner, id: NodeId, out: &mut String) {
    let Some(node) = inner.nodes.get(id) else {
        return;
    };
    if let NodeKind::Text { value } = &node.kind {
        out.push_str(value);
    }
    for &child in &node.children {
        collect_text(inner, child, out);
    }
}

fn escape(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn write_html(inner: &DocumentInner, id: NodeId, out: &mut String) {
    let Some(node) = inner.nodes.get(id) else {
        return;
    };

    match &node.kind {
        NodeKind::Text { value } => escape(value, out),
        NodeKind::Root => {
            for &child in &node.children {
                write_html(inner, child, out);
            }
        }
        NodeKind::Element { tag } => {
            out.push('<');
            out.push_str(tag);
            for (key, value) in &node.properties {
                if matches!(value, PropValue::Handler(_) | PropValue::Any(_)) {
                    continue;
                }
                let _ = write!(out, " {}=\"", key);
                escape(&value.to_string(), out);
                out.push('"');
            }
            out.push('>');
            for &child in &node.children {
                write_html(inner, child, out);
            }
            let _ = write!(out, "</{}>", tag);
        }
    }
}

// =============================================================================
// Host
// =============================================================================

impl Host for Document {
    type Node = NodeId;

    fn create_text_node(&self, text: &str) -> NodeId {
        self.inner.borrow_mut().nodes.insert(DomNode::new(NodeKind::Text {
            value: text.to_string(),
        }))
    }

    fn create_element_node(&self, tag: &str) -> NodeId {
        self.inner.borrow_mut().nodes.insert(DomNode::new(NodeKind::Element {
            tag: tag.to_string(),
        }))
    }

    fn set_property(&self, node: &NodeId, key: &str, value: &PropValue) {
        self.mutate(|inner| {
            let Some(dom) = inner.nodes.get_mut(*node) else {
                tracing::warn!(node = ?node, key, "set_property on unknown node");
                return;
            };
            match &mut dom.kind {
                NodeKind::Text { value: text } if key == NODE_VALUE => *text = value.to_string(),
                _ => {
                    dom.properties.insert(key.to_string(), value.clone());
                }
            }
        })
    }

    fn clear_property(&self, node: &NodeId, key: &str) {
        self.mutate(|inner| {
            let Some(dom) = inner.nodes.get_mut(*node) else {
                return;
            };
            match &mut dom.kind {
                NodeKind::Text { value } if key == NODE_VALUE => value.clear(),
                _ => {
                    dom.properties.shift_remove(key);
                }
            }
        })
    }

    fn add_event_listener(&self, node: &NodeId, event: &str, handler: &EventHandler) {
        self.mutate(|inner| {
            let Some(dom) = inner.nodes.get_mut(*node) else {
                return;
            };
            let exists = dom
                .listeners
                .iter()
                .any(|(e, h)| e == event && h.ptr_eq(handler));
            if !exists {
                dom.listeners.push((event.to_string(), handler.clone()));
            }
        })
    }

    fn remove_event_listener(&self, node: &NodeId, event: &str, handler: &EventHandler) {
        self.mutate(|inner| {
            if let Some(dom) = inner.nodes.get_mut(*node) {
                dom.listeners
                    .retain(|(e, h)| !(e == event && h.ptr_eq(handler)));
            }
        })
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
        self.mutate(|inner| {
            inner.check_insert(*parent, *child)?;
            inner.detach(*child);
            inner.nodes[*child].parent = Some(*parent);
            inner.nodes[*parent].children.push(*child);
            Ok(())
        })
    }

    fn insert_before(
        &self,
        parent: &NodeId,
        child: &NodeId,
        reference: &NodeId,
    ) -> Result<(), HostError> {
        self.mutate(|inner| {
            inner.check_insert(*parent, *child)?;
            if inner.node(*reference)?.parent != Some(*parent) {
                return Err(HostError::NotAChild(format!(
                    "{:?} is not a child of {:?}",
                    reference, parent
                )));
            }
            if child == reference {
                return Ok(());
            }

            inner.detach(*child);
            let siblings = &mut inner.nodes[*parent].children;
            let index = siblings
                .iter()
                .position(|c| c == reference)
                .unwrap_or(siblings.len());
            siblings.insert(index, *child);
            inner.nodes[*child].parent = Some(*parent);
            Ok(())
        })
    }

    fn remove(&self, node: &NodeId) {
        self.mutate(|inner| {
            inner.detach(*node);
            let mut stack = vec![*node];
            while let Some(id) = stack.pop() {
                if let Some(removed) = inner.nodes.remove(id) {
                    stack.extend(removed.children);
                }
            }
        })
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.parent_of(*node)
    }
}

//! Instrumented in-memory DOM.
//!
//! An arena of nodes implementing [`Dom`], with counters for every
//! primitive operation. Tests assert reconciliation minimality against
//! the counters; headless hosts can use [`MemoryDom::inner_html`] to read
//! the resulting markup.

use indexmap::IndexMap;

use driftui_core::EventHandler;

use crate::dom::Dom;

/// Handle into a [`MemoryDom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// Counters for raw DOM operations.
///
/// `inserted` counts both fresh insertions and moves; the reconciler's
/// [`Mutations`](crate::Mutations) distinguishes the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    /// Nodes created (elements and text).
    pub created: usize,
    /// Nodes detached from a parent.
    pub removed: usize,
    /// `insert_before`/`append_child` calls.
    pub inserted: usize,
    /// Attributes set.
    pub attrs_set: usize,
    /// Attributes removed.
    pub attrs_removed: usize,
    /// Text content replacements.
    pub text_sets: usize,
    /// Listeners registered.
    pub listeners_added: usize,
    /// Listeners removed.
    pub listeners_removed: usize,
}

impl OpCounts {
    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attrs: IndexMap<String, String>,
        listeners: IndexMap<String, EventHandler>,
    },
    Text(String),
}

#[derive(Debug)]
struct MemoryNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory [`Dom`] implementation with operation counters.
///
/// Node `0` is the root container, created up front; it represents the
/// mount point and is never replaced, only its children change.
#[derive(Debug)]
pub struct MemoryDom {
    nodes: Vec<MemoryNode>,
    /// Operation counters, public for test assertions.
    pub ops: OpCounts,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Creates a DOM holding only the root container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![MemoryNode {
                kind: NodeKind::Element {
                    tag: "root".into(),
                    attrs: IndexMap::new(),
                    listeners: IndexMap::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
            ops: OpCounts::default(),
        }
    }

    /// The root container handle.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Invokes the listener registered on `node` for `event`, if any.
    /// Returns `true` when a listener ran.
    #[must_use]
    pub fn dispatch(&self, node: NodeId, event: &str) -> bool {
        if let NodeKind::Element { listeners, .. } = &self.nodes[node.0].kind {
            if let Some(handler) = listeners.get(event) {
                handler.call();
                return true;
            }
        }
        false
    }

    /// Markup of the node's children, in the serializer's conventions
    /// (attributes in set order, empty-valued attributes as bare names).
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[node.0].children {
            self.write_node(&mut out, child);
        }
        out
    }

    /// Markup of the node itself.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Text(value) => driftui_core::html::escape_into(out, value),
            NodeKind::Element { tag, attrs, .. } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        driftui_core::html::escape_into(out, value);
                        out.push('"');
                    }
                }
                out.push('>');
                for &child in &node.children {
                    self.write_node(out, child);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != node);
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.ops.created += 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(MemoryNode {
            kind: NodeKind::Element {
                tag: tag.into(),
                attrs: IndexMap::new(),
                listeners: IndexMap::new(),
            },
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn create_text(&mut self, value: &str) -> NodeId {
        self.ops.created += 1;
        let id = NodeId(self.nodes.len());
        self.nodes.push(MemoryNode {
            kind: NodeKind::Text(value.into()),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.ops.attrs_set += 1;
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[node.0].kind {
            attrs.insert(name.into(), value.into());
        }
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        self.ops.attrs_removed += 1;
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[node.0].kind {
            attrs.shift_remove(name);
        }
    }

    fn set_text(&mut self, node: &NodeId, value: &str) {
        self.ops.text_sets += 1;
        if let NodeKind::Text(text) = &mut self.nodes[node.0].kind {
            value.clone_into(text);
        }
    }

    fn insert_before(&mut self, parent: &NodeId, node: &NodeId, anchor: Option<&NodeId>) {
        self.ops.inserted += 1;
        self.detach(*node);
        self.nodes[node.0].parent = Some(*parent);
        let children = &mut self.nodes[parent.0].children;
        let position = anchor
            .and_then(|anchor| children.iter().position(|child| child == anchor))
            .unwrap_or(children.len());
        children.insert(position, *node);
    }

    fn remove_child(&mut self, parent: &NodeId, node: &NodeId) {
        if self.nodes[node.0].parent == Some(*parent) {
            self.ops.removed += 1;
            self.detach(*node);
        }
    }

    fn add_listener(&mut self, node: &NodeId, event: &str, handler: EventHandler) {
        self.ops.listeners_added += 1;
        if let NodeKind::Element { listeners, .. } = &mut self.nodes[node.0].kind {
            listeners.insert(event.into(), handler);
        }
    }

    fn remove_listener(&mut self, node: &NodeId, event: &str) {
        self.ops.listeners_removed += 1;
        if let NodeKind::Element { listeners, .. } = &mut self.nodes[node.0].kind {
            listeners.shift_remove(event);
        }
    }

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_before_moves_attached_nodes() {
        let mut dom = MemoryDom::new();
        let root = dom.root();
        let a = dom.create_element("a");
        let b = dom.create_element("b");
        dom.append_child(&root, &a);
        dom.append_child(&root, &b);
        dom.insert_before(&root, &b, Some(&a));
        assert_eq!(dom.inner_html(root), "<b></b><a></a>");
    }

    #[test]
    fn test_bare_attribute_renders_without_value() {
        let mut dom = MemoryDom::new();
        let root = dom.root();
        let input = dom.create_element("input");
        dom.set_attribute(&input, "disabled", "");
        dom.append_child(&root, &input);
        assert_eq!(dom.inner_html(root), "<input disabled></input>");
    }

    #[test]
    fn test_dispatch_runs_registered_listener() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut dom = MemoryDom::new();
        let button = dom.create_element("button");
        let clicks = Rc::new(Cell::new(0));
        let seen = Rc::clone(&clicks);
        dom.add_listener(&button, "click", EventHandler::new(move || {
            seen.set(seen.get() + 1);
        }));
        assert!(dom.dispatch(button, "click"));
        assert!(!dom.dispatch(button, "keydown"));
        assert_eq!(clicks.get(), 1);
    }
}

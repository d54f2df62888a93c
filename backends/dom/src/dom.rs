//! The abstract native-DOM collaborator.

use driftui_core::EventHandler;

/// Primitives a host DOM must provide for reconciliation.
///
/// Node handles are opaque and cheap to clone; handle equality must mean
/// node identity. All mutating operations take `&mut self`: the
/// reconciler assumes exclusive, transient access to the tree it is
/// mutating for the duration of one pass.
pub trait Dom {
    /// Opaque node handle.
    type Node: Clone + PartialEq;

    /// Creates a detached element node.
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Creates a detached text node.
    fn create_text(&mut self, value: &str) -> Self::Node;

    /// Sets an attribute. Boolean attributes pass an empty value.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

    /// Removes an attribute if present.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);

    /// Replaces the text content of a text node.
    fn set_text(&mut self, node: &Self::Node, value: &str);

    /// Inserts `node` into `parent` before `anchor`, or at the end when
    /// `anchor` is `None`. Inserting an already-attached node moves it.
    fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, anchor: Option<&Self::Node>);

    /// Appends `node` as the last child of `parent`.
    fn append_child(&mut self, parent: &Self::Node, node: &Self::Node) {
        self.insert_before(parent, node, None);
    }

    /// Detaches `node` from `parent`.
    fn remove_child(&mut self, parent: &Self::Node, node: &Self::Node);

    /// Registers an event listener, replacing any previous listener for
    /// the same event.
    fn add_listener(&mut self, node: &Self::Node, event: &str, handler: EventHandler);

    /// Removes the listener for `event` if present.
    fn remove_listener(&mut self, node: &Self::Node, event: &str);

    /// Children of `node` in document order. Read-only; used when
    /// adopting server-rendered markup.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;
}

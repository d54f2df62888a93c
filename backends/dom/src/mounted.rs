//! The live baseline: last rendered trees fused with DOM handles.
//!
//! The runtime keeps one `MountedNode` per mounted root. It is the
//! previously rendered virtual tree with the live node handle and any
//! owned component instances folded in, so the reconciler has a single
//! source of truth to diff the next tree against. Releasing a subtree is
//! dropping it; listener and node cleanup happens through the removal of
//! the subtree root.

use driftui_core::{Attrs, ComponentType, Props};

use crate::dom::Dom;

pub(crate) enum MountedNode<D: Dom> {
    Element(MountedElement<D>),
    Text(MountedText<D>),
    Component(MountedComponent<D>),
}

pub(crate) struct MountedElement<D: Dom> {
    pub node: D::Node,
    pub tag: String,
    pub key: Option<String>,
    pub attrs: Attrs,
    pub children: Vec<MountedNode<D>>,
}

pub(crate) struct MountedText<D: Dom> {
    pub node: D::Node,
    pub value: String,
}

/// A live component instance: resolved props and the mounted subtree its
/// last render produced.
pub(crate) struct MountedComponent<D: Dom> {
    pub ty: &'static ComponentType,
    pub key: Option<String>,
    pub props: Props,
    pub rendered: Box<MountedNode<D>>,
}

impl<D: Dom> MountedNode<D> {
    /// The live DOM node this subtree roots at. For components that is
    /// the root of their rendered output; the component itself has no
    /// wrapper node.
    pub fn dom_node(&self) -> &D::Node {
        match self {
            Self::Element(el) => &el.node,
            Self::Text(text) => &text.node,
            Self::Component(component) => component.rendered.dom_node(),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Element(el) => el.key.as_deref(),
            Self::Component(component) => component.key.as_deref(),
            Self::Text(_) => None,
        }
    }
}

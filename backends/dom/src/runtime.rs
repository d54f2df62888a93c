//! The component runtime: mounting, updating and attaching live roots.
//!
//! A [`Runtime`] owns one root component instance and the container it
//! is mounted into. The container itself is never replaced; only its
//! single child is swapped. Ownership of the mounted subtree is
//! exclusive: unmounting removes it from the container and drops it
//! synchronously.

use driftui_core::{AttrValue, ComponentType, Props, RenderError, VNode, merge_props};

use crate::dom::Dom;
use crate::mounted::{MountedComponent, MountedElement, MountedNode, MountedText};
use crate::reconcile::{Mutations, build, reconcile};

/// A live root component instance bound to a container node.
pub struct Runtime<D: Dom> {
    container: D::Node,
    root: MountedComponent<D>,
}

impl<D: Dom> std::fmt::Debug for Runtime<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("component", &self.root.ty.name)
            .finish()
    }
}

impl<D: Dom> Runtime<D> {
    /// Validates needs, renders and mounts `ty` into `container`,
    /// replacing any children the container holds.
    ///
    /// # Errors
    ///
    /// [`RenderError::Configuration`] before any DOM work when a
    /// required need is missing; attribute coercion failures during the
    /// first build.
    pub fn mount(
        dom: &mut D,
        ty: &'static ComponentType,
        props: Props,
        container: D::Node,
    ) -> Result<(Self, Mutations), RenderError> {
        let resolved = ty.instantiate(&props)?;
        let tree = (ty.render)(&resolved);

        let mut muts = Mutations::default();
        for child in dom.child_nodes(&container) {
            dom.remove_child(&container, &child);
            muts.removed += 1;
        }
        let rendered = build(dom, &mut muts, &tree)?;
        dom.append_child(&container, rendered.dom_node());
        tracing::debug!(component = ty.name, "mounted component");

        Ok((
            Self {
                container,
                root: MountedComponent {
                    ty,
                    key: None,
                    props: resolved,
                    rendered: Box::new(rendered),
                },
            },
            muts,
        ))
    }

    /// Re-attaches `ty` over server-rendered markup already present in
    /// `container`.
    ///
    /// The existing children are adopted in document order as if they had
    /// been built from an equivalent previous tree: no nodes are rebuilt,
    /// the only mutations are event listener registrations (plus builds
    /// for any children the markup is missing). The adopted tree becomes
    /// the reconciliation baseline for later updates.
    ///
    /// # Errors
    ///
    /// Same as [`Runtime::mount`].
    pub fn attach(
        dom: &mut D,
        ty: &'static ComponentType,
        props: Props,
        container: D::Node,
    ) -> Result<(Self, Mutations), RenderError> {
        let resolved = ty.instantiate(&props)?;
        let tree = (ty.render)(&resolved);

        let mut muts = Mutations::default();
        let existing = dom.child_nodes(&container);
        let rendered = if let Some(node) = existing.first() {
            adopt(dom, &mut muts, node.clone(), &tree)?
        } else {
            let built = build(dom, &mut muts, &tree)?;
            dom.append_child(&container, built.dom_node());
            built
        };
        tracing::debug!(component = ty.name, "attached component to existing markup");

        Ok((
            Self {
                container,
                root: MountedComponent {
                    ty,
                    key: None,
                    props: resolved,
                    rendered: Box::new(rendered),
                },
            },
            muts,
        ))
    }

    /// Merges `new_props` over the current props (props absent from
    /// `new_props` keep their prior value, not the declared default),
    /// re-renders and reconciles against the last rendered tree.
    ///
    /// # Errors
    ///
    /// Validation and coercion failures; mutations applied before the
    /// failure stay applied, mirroring the no-retry policy.
    pub fn update(&mut self, dom: &mut D, new_props: Props) -> Result<Mutations, RenderError> {
        let merged = merge_props(&self.root.props, &new_props);
        let props = self.root.ty.instantiate(&merged)?;
        let tree = (self.root.ty.render)(&props);

        let mut muts = Mutations::default();
        reconcile(dom, &mut muts, &self.container, &mut self.root.rendered, &tree)?;
        self.root.props = props;
        Ok(muts)
    }

    /// Removes the mounted subtree from the container and releases it.
    pub fn unmount(self, dom: &mut D) -> Mutations {
        let mut muts = Mutations::default();
        dom.remove_child(&self.container, self.root.rendered.dom_node());
        muts.removed += 1;
        tracing::debug!(component = self.root.ty.name, "unmounted component");
        muts
    }

    /// The component type this runtime hosts.
    #[must_use]
    pub const fn component(&self) -> &'static ComponentType {
        self.root.ty
    }

    /// The container node the instance is mounted into.
    #[must_use]
    pub const fn container(&self) -> &D::Node {
        &self.container
    }

    /// The instance's current resolved props.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.root.props
    }
}

/// Walks `vnode` over an existing DOM node, claiming nodes in document
/// order. The markup is trusted to equal the serialized form of the
/// tree; only event listeners are applied, plus builds for children the
/// markup lacks.
fn adopt<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    node: D::Node,
    vnode: &VNode,
) -> Result<MountedNode<D>, RenderError> {
    match vnode {
        VNode::Text(value) => Ok(MountedNode::Text(MountedText {
            node,
            value: value.clone(),
        })),
        VNode::Element(el) => {
            for (name, value) in el.attrs.iter() {
                if let AttrValue::Handler(handler) = value {
                    let event = name.strip_prefix("on").unwrap_or(name);
                    dom.add_listener(&node, event, handler.clone());
                    muts.listeners_added += 1;
                }
            }
            let existing = dom.child_nodes(&node);
            let mut existing = existing.into_iter();
            let mut children = Vec::with_capacity(el.children.len());
            for child in &el.children {
                if let Some(child_node) = existing.next() {
                    children.push(adopt(dom, muts, child_node, child)?);
                } else {
                    let built = build(dom, muts, child)?;
                    dom.append_child(&node, built.dom_node());
                    children.push(built);
                }
            }
            Ok(MountedNode::Element(MountedElement {
                node,
                tag: el.tag.clone(),
                key: el.key.clone(),
                attrs: el.attrs.clone(),
                children,
            }))
        }
        VNode::Component(component) => {
            let props = component.ty.instantiate(&component.props)?;
            let tree = (component.ty.render)(&props);
            let rendered = adopt(dom, muts, node, &tree)?;
            Ok(MountedNode::Component(MountedComponent {
                ty: component.ty,
                key: component.key.clone(),
                props,
                rendered: Box::new(rendered),
            }))
        }
    }
}

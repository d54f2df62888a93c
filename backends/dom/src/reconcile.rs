//! Tree diffing and minimal DOM patching.
//!
//! The reconciler compares the mounted baseline (the previously rendered
//! tree fused with live node handles) against a new virtual tree and
//! drives the [`Dom`] primitives to make the live tree represent it.
//! Same-level sibling matching only: keyed children match by key, unkeyed
//! children match positionally within the unkeyed subset, and a
//! fundamental type or tag mismatch destroys and rebuilds the subtree.
//!
//! Moves are minimized with an anchor walk: surviving old children are
//! held in a queue of unprocessed live positions, and a reused child only
//! moves when it is not already the next unprocessed node.

use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;

use driftui_core::html::{RenderedAttr, render_attr};
use driftui_core::vnode::ComponentNode;
use driftui_core::{AttrValue, Attrs, RenderError, VNode, merge_props};

use crate::dom::Dom;
use crate::mounted::{MountedComponent, MountedElement, MountedNode, MountedText};

/// Mutations applied by one reconcile pass.
///
/// Subtree roots count once for `created`/`removed`/`moved`; attribute
/// and listener counters are per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mutations {
    /// DOM nodes created.
    pub created: usize,
    /// Subtree roots removed from the live tree.
    pub removed: usize,
    /// Reused subtree roots moved to a new position.
    pub moved: usize,
    /// Text nodes whose content changed.
    pub text_updates: usize,
    /// Attributes set or updated.
    pub attrs_set: usize,
    /// Attributes removed.
    pub attrs_removed: usize,
    /// Event listeners registered.
    pub listeners_added: usize,
    /// Event listeners removed.
    pub listeners_removed: usize,
}

impl Mutations {
    /// Returns `true` when the pass changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.created == 0
            && self.removed == 0
            && self.moved == 0
            && self.text_updates == 0
            && self.attrs_set == 0
            && self.attrs_removed == 0
            && self.listeners_added == 0
            && self.listeners_removed == 0
    }
}

fn event_name(attr: &str) -> &str {
    attr.strip_prefix("on").unwrap_or(attr)
}

/// Builds a detached mounted subtree for `vnode`. The caller inserts the
/// root; descendants are already attached.
pub(crate) fn build<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    vnode: &VNode,
) -> Result<MountedNode<D>, RenderError> {
    match vnode {
        VNode::Text(value) => {
            let node = dom.create_text(value);
            muts.created += 1;
            Ok(MountedNode::Text(MountedText {
                node,
                value: value.clone(),
            }))
        }
        VNode::Element(el) => {
            let node = dom.create_element(&el.tag);
            muts.created += 1;
            apply_attrs(dom, muts, &node, &el.attrs)?;
            let mut children = Vec::with_capacity(el.children.len());
            for child in &el.children {
                let mounted = build(dom, muts, child)?;
                dom.append_child(&node, mounted.dom_node());
                children.push(mounted);
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
            Ok(MountedNode::Component(instantiate(dom, muts, component)?))
        }
    }
}

fn instantiate<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    component: &ComponentNode,
) -> Result<MountedComponent<D>, RenderError> {
    let props = component.ty.instantiate(&component.props)?;
    let tree = (component.ty.render)(&props);
    tracing::debug!(component = component.ty.name, "mounting component instance");
    let rendered = build(dom, muts, &tree)?;
    Ok(MountedComponent {
        ty: component.ty,
        key: component.key.clone(),
        props,
        rendered: Box::new(rendered),
    })
}

fn apply_attrs<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    node: &D::Node,
    attrs: &Attrs,
) -> Result<(), RenderError> {
    for (name, value) in attrs.iter() {
        if let AttrValue::Handler(handler) = value {
            dom.add_listener(node, event_name(name), handler.clone());
            muts.listeners_added += 1;
        } else if let Some(rendered) = render_attr(name, value)? {
            set_rendered(dom, muts, node, name, &rendered);
        }
    }
    Ok(())
}

fn set_rendered<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    node: &D::Node,
    name: &str,
    rendered: &RenderedAttr,
) {
    match rendered {
        RenderedAttr::Value(value) => dom.set_attribute(node, name, value),
        RenderedAttr::Flag => dom.set_attribute(node, name, ""),
    }
    muts.attrs_set += 1;
}

/// Makes the mounted subtree represent `new`, mutating the live DOM
/// minimally. `parent` is the live parent of the subtree root.
pub(crate) fn reconcile<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    parent: &D::Node,
    mounted: &mut MountedNode<D>,
    new: &VNode,
) -> Result<(), RenderError> {
    match (&mut *mounted, new) {
        (MountedNode::Text(text), VNode::Text(value)) => {
            if text.value != *value {
                dom.set_text(&text.node, value);
                muts.text_updates += 1;
                value.clone_into(&mut text.value);
            }
            Ok(())
        }
        (MountedNode::Element(el), VNode::Element(next)) if el.tag == next.tag => {
            diff_attrs(dom, muts, &el.node, &el.attrs, &next.attrs)?;
            el.attrs = next.attrs.clone();
            el.key.clone_from(&next.key);
            let node = el.node.clone();
            reconcile_children(dom, muts, &node, &mut el.children, &next.children)
        }
        (MountedNode::Component(component), VNode::Component(next))
            if std::ptr::eq(component.ty, next.ty) && component.key == next.key =>
        {
            let merged = merge_props(&component.props, &next.props);
            let props = component.ty.instantiate(&merged)?;
            let tree = (component.ty.render)(&props);
            reconcile(dom, muts, parent, &mut component.rendered, &tree)?;
            component.props = props;
            Ok(())
        }
        _ => replace(dom, muts, parent, mounted, new),
    }
}

fn replace<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    parent: &D::Node,
    mounted: &mut MountedNode<D>,
    new: &VNode,
) -> Result<(), RenderError> {
    let fresh = build(dom, muts, new)?;
    dom.insert_before(parent, fresh.dom_node(), Some(mounted.dom_node()));
    let stale = std::mem::replace(mounted, fresh);
    dom.remove_child(parent, stale.dom_node());
    muts.removed += 1;
    log_unmount(&stale);
    Ok(())
}

fn log_unmount<D: Dom>(node: &MountedNode<D>) {
    match node {
        MountedNode::Component(component) => {
            tracing::debug!(component = component.ty.name, "unmounting component instance");
            log_unmount(&component.rendered);
        }
        MountedNode::Element(el) => el.children.iter().for_each(log_unmount),
        MountedNode::Text(_) => {}
    }
}

fn diff_attrs<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    node: &D::Node,
    old: &Attrs,
    new: &Attrs,
) -> Result<(), RenderError> {
    for (name, value) in new.iter() {
        match (old.get(name), value) {
            (Some(AttrValue::Handler(prev)), AttrValue::Handler(next)) => {
                if !prev.ptr_eq(next) {
                    dom.remove_listener(node, event_name(name));
                    muts.listeners_removed += 1;
                    dom.add_listener(node, event_name(name), next.clone());
                    muts.listeners_added += 1;
                }
            }
            (previous, AttrValue::Handler(next)) => {
                if let Some(prev_value) = previous {
                    if render_attr(name, prev_value)?.is_some() {
                        dom.remove_attribute(node, name);
                        muts.attrs_removed += 1;
                    }
                }
                dom.add_listener(node, event_name(name), next.clone());
                muts.listeners_added += 1;
            }
            (previous, value) => {
                let prev_rendered = match previous {
                    Some(AttrValue::Handler(_)) => {
                        dom.remove_listener(node, event_name(name));
                        muts.listeners_removed += 1;
                        None
                    }
                    Some(prev_value) => render_attr(name, prev_value)?,
                    None => None,
                };
                let rendered = render_attr(name, value)?;
                if rendered != prev_rendered {
                    if let Some(rendered) = rendered {
                        set_rendered(dom, muts, node, name, &rendered);
                    } else if prev_rendered.is_some() {
                        dom.remove_attribute(node, name);
                        muts.attrs_removed += 1;
                    }
                }
            }
        }
    }
    for (name, value) in old.iter() {
        if new.get(name).is_none() {
            if matches!(value, AttrValue::Handler(_)) {
                dom.remove_listener(node, event_name(name));
                muts.listeners_removed += 1;
            } else if render_attr(name, value)?.is_some() {
                dom.remove_attribute(node, name);
                muts.attrs_removed += 1;
            }
        }
    }
    Ok(())
}

fn reconcile_children<D: Dom>(
    dom: &mut D,
    muts: &mut Mutations,
    parent: &D::Node,
    old: &mut Vec<MountedNode<D>>,
    new: &[VNode],
) -> Result<(), RenderError> {
    // Index old keyed children; on a collision the first occurrence wins.
    let mut old_keys: IndexMap<String, usize> = IndexMap::new();
    for (index, child) in old.iter().enumerate() {
        if let Some(key) = child.key() {
            if old_keys.contains_key(key) {
                tracing::warn!(key, "duplicate sibling key among mounted children");
            } else {
                old_keys.insert(key.to_owned(), index);
            }
        }
    }

    let mut assigned: Vec<Option<usize>> = vec![None; new.len()];
    let mut claimed = vec![false; old.len()];

    let mut seen_keys = HashSet::new();
    for (position, vnode) in new.iter().enumerate() {
        if let Some(key) = vnode.key() {
            if !seen_keys.insert(key.to_owned()) {
                tracing::warn!(key, "duplicate sibling key; treating later occurrence as new");
                continue;
            }
            if let Some(&index) = old_keys.get(key) {
                assigned[position] = Some(index);
                claimed[index] = true;
            }
        }
    }

    // Unkeyed children pair up positionally within the unkeyed subset.
    let mut unkeyed_old = old
        .iter()
        .enumerate()
        .filter(|(_, child)| child.key().is_none())
        .map(|(index, _)| index);
    for (position, vnode) in new.iter().enumerate() {
        if vnode.key().is_none() {
            if let Some(index) = unkeyed_old.next() {
                assigned[position] = Some(index);
                claimed[index] = true;
            }
        }
    }
    drop(unkeyed_old);

    let mut slots: Vec<Option<MountedNode<D>>> = old.drain(..).map(Some).collect();

    for (index, slot) in slots.iter_mut().enumerate() {
        if !claimed[index] {
            if let Some(stale) = slot.take() {
                dom.remove_child(parent, stale.dom_node());
                muts.removed += 1;
                log_unmount(&stale);
            }
        }
    }

    // Surviving old children, in live order, not yet placed.
    let mut pending: VecDeque<usize> = claimed
        .iter()
        .enumerate()
        .filter(|&(_, &kept)| kept)
        .map(|(index, _)| index)
        .collect();

    let mut result = Vec::with_capacity(new.len());
    for (position, vnode) in new.iter().enumerate() {
        match assigned[position] {
            Some(index) => {
                let Some(mut child) = slots[index].take() else {
                    continue;
                };
                if pending.front() == Some(&index) {
                    pending.pop_front();
                } else {
                    // Out of live order: this is the one case that costs
                    // a DOM move.
                    pending.retain(|&kept| kept != index);
                    let anchor = anchor_node(&slots, &pending);
                    dom.insert_before(parent, child.dom_node(), anchor.as_ref());
                    muts.moved += 1;
                }
                reconcile(dom, muts, parent, &mut child, vnode)?;
                result.push(child);
            }
            None => {
                let child = build(dom, muts, vnode)?;
                let anchor = anchor_node(&slots, &pending);
                dom.insert_before(parent, child.dom_node(), anchor.as_ref());
                result.push(child);
            }
        }
    }
    *old = result;
    Ok(())
}

fn anchor_node<D: Dom>(
    slots: &[Option<MountedNode<D>>],
    pending: &VecDeque<usize>,
) -> Option<D::Node> {
    pending
        .front()
        .and_then(|&index| slots[index].as_ref())
        .map(|child| child.dom_node().clone())
}

#[cfg(test)]
mod tests {
    use driftui_core::{ComponentType, Need, Props, attrs, class, h, props, style};

    use super::*;
    use crate::memory::MemoryDom;

    fn mount(dom: &mut MemoryDom, tree: &VNode) -> MountedNode<MemoryDom> {
        let root = dom.root();
        let mut muts = Mutations::default();
        let mounted = build(dom, &mut muts, tree).unwrap();
        dom.append_child(&root, mounted.dom_node());
        dom.ops.reset();
        mounted
    }

    fn patch(dom: &mut MemoryDom, mounted: &mut MountedNode<MemoryDom>, next: &VNode) -> Mutations {
        let root = dom.root();
        let mut muts = Mutations::default();
        reconcile(dom, &mut muts, &root, mounted, next).unwrap();
        muts
    }

    fn keyed_list(keys: &[&str]) -> VNode {
        let items: Vec<VNode> = keys
            .iter()
            .map(|&key| h("li", (attrs().key(key), key)))
            .collect();
        h("ul", items)
    }

    #[test]
    fn test_single_text_change_is_one_mutation() {
        let mut dom = MemoryDom::new();
        let before = h("div", vec![h("span", "a"), h("span", "b")]);
        let after = h("div", vec![h("span", "a"), h("span", "c")]);
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.text_updates, 1);
        assert_eq!(muts.created, 0);
        assert_eq!(muts.removed, 0);
        assert_eq!(muts.moved, 0);
        assert_eq!(dom.inner_html(dom.root()), "<div><span>a</span><span>c</span></div>");
    }

    #[test]
    fn test_identical_trees_touch_nothing() {
        let mut dom = MemoryDom::new();
        let tree = h("div", (style([("width", "100px")]), vec![h("span", "x")]));
        let mut mounted = mount(&mut dom, &tree);

        let muts = patch(&mut dom, &mut mounted, &tree);

        assert!(muts.is_empty(), "expected no mutations, got {muts:?}");
        assert_eq!(dom.ops, crate::memory::OpCounts::default());
    }

    #[test]
    fn test_keyed_reorder_moves_without_rebuilding() {
        let mut dom = MemoryDom::new();
        let mut mounted = mount(&mut dom, &keyed_list(&["a", "b", "c"]));

        let muts = patch(&mut dom, &mut mounted, &keyed_list(&["c", "a", "b"]));

        assert_eq!(muts.created, 0);
        assert_eq!(muts.removed, 0);
        assert_eq!(muts.moved, 1);
        assert_eq!(
            dom.inner_html(dom.root()),
            "<ul><li>c</li><li>a</li><li>b</li></ul>",
        );
    }

    #[test]
    fn test_keyed_node_in_place_does_not_move() {
        let mut dom = MemoryDom::new();
        let mut mounted = mount(&mut dom, &keyed_list(&["a", "b", "c"]));

        let muts = patch(&mut dom, &mut mounted, &keyed_list(&["a", "c"]));

        assert_eq!(muts.moved, 0);
        assert_eq!(muts.removed, 1);
        assert_eq!(muts.created, 0);
        assert_eq!(dom.inner_html(dom.root()), "<ul><li>a</li><li>c</li></ul>");
    }

    #[test]
    fn test_unmatched_keys_create_and_remove() {
        let mut dom = MemoryDom::new();
        let mut mounted = mount(&mut dom, &keyed_list(&["a", "b"]));

        let muts = patch(&mut dom, &mut mounted, &keyed_list(&["b", "d"]));

        assert_eq!(muts.removed, 1, "a removed");
        assert!(muts.created >= 1, "d created");
        assert_eq!(dom.inner_html(dom.root()), "<ul><li>b</li><li>d</li></ul>");
    }

    #[test]
    fn test_duplicate_sibling_keys_resolve_deterministically() {
        let mut dom = MemoryDom::new();
        let before = h(
            "ul",
            vec![
                h("li", (attrs().key("a"), "first")),
                h("li", (attrs().key("a"), "second")),
            ],
        );
        let after = h(
            "ul",
            vec![
                h("li", (attrs().key("a"), "first")),
                h("li", (attrs().key("a"), "third")),
            ],
        );
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        // The first occurrence matches; the later duplicate is rebuilt.
        assert_eq!(muts.removed, 1);
        assert_eq!(
            dom.inner_html(dom.root()),
            "<ul><li>first</li><li>third</li></ul>",
        );
    }

    #[test]
    fn test_mixed_keyed_and_unkeyed_children() {
        let mut dom = MemoryDom::new();
        let before = h(
            "ul",
            vec![
                h("li", (attrs().key("a"), "a")),
                h("li", "plain"),
                h("li", (attrs().key("b"), "b")),
            ],
        );
        let after = h(
            "ul",
            vec![
                h("li", (attrs().key("b"), "b")),
                h("li", "plain"),
                h("li", (attrs().key("a"), "a")),
            ],
        );
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.created, 0);
        assert_eq!(muts.removed, 0);
        assert_eq!(dom.inner_html(dom.root()), "<ul><li>b</li><li>plain</li><li>a</li></ul>");
    }

    #[test]
    fn test_empty_children_removes_everything() {
        let mut dom = MemoryDom::new();
        let mut mounted = mount(&mut dom, &h("ul", vec![h("li", "a"), h("li", "b")]));

        let muts = patch(&mut dom, &mut mounted, &h("ul", ()));

        assert_eq!(muts.removed, 2);
        assert_eq!(dom.inner_html(dom.root()), "<ul></ul>");
    }

    #[test]
    fn test_tag_change_replaces_subtree() {
        let mut dom = MemoryDom::new();
        let mut mounted = mount(&mut dom, &h("div", "x"));

        let muts = patch(&mut dom, &mut mounted, &h("section", "x"));

        assert_eq!(muts.removed, 1);
        assert_eq!(muts.created, 2, "element and text rebuilt");
        assert_eq!(dom.inner_html(dom.root()), "<section>x</section>");
    }

    #[test]
    fn test_text_to_element_replaces() {
        let mut dom = MemoryDom::new();
        let mut mounted = mount(&mut dom, &h("div", "plain"));
        let after = h("div", h("b", "bold"));

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.removed, 1);
        assert_eq!(dom.inner_html(dom.root()), "<div><b>bold</b></div>");
    }

    #[test]
    fn test_attribute_add_update_remove() {
        let mut dom = MemoryDom::new();
        let before = h("div", attrs().attr("id", "a").attr("title", "t"));
        let after = h("div", attrs().attr("id", "b").attr("lang", "en"));
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.attrs_set, 2, "id updated, lang added");
        assert_eq!(muts.attrs_removed, 1, "title removed");
        assert_eq!(dom.inner_html(dom.root()), r#"<div id="b" lang="en"></div>"#);
    }

    #[test]
    fn test_class_recomputed_wholesale() {
        let mut dom = MemoryDom::new();
        let before = h("div", class([("active", true), ("hidden", false)]));
        let after = h("div", class([("active", true), ("hidden", true)]));
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.attrs_set, 1);
        assert_eq!(dom.inner_html(dom.root()), r#"<div class="active hidden"></div>"#);
    }

    #[test]
    fn test_class_dropping_to_all_false_removes_attribute() {
        let mut dom = MemoryDom::new();
        let before = h("div", class([("active", true)]));
        let after = h("div", class([("active", false)]));
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.attrs_removed, 1);
        assert_eq!(dom.inner_html(dom.root()), "<div></div>");
    }

    #[test]
    fn test_handler_swap_replaces_listener() {
        let mut dom = MemoryDom::new();
        let before = h("button", attrs().on("click", || {}));
        let after = h("button", attrs().on("click", || {}));
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.listeners_removed, 1);
        assert_eq!(muts.listeners_added, 1);
    }

    #[test]
    fn test_unchanged_handler_is_left_alone() {
        let mut dom = MemoryDom::new();
        let shared = attrs().on("click", || {});
        let before = h("button", shared.clone());
        let after = h("button", shared);
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert!(muts.is_empty(), "identity-equal handler must not be touched");
    }

    static COUNTER: ComponentType = ComponentType {
        name: "counter",
        needs: &[Need::required("count")],
        render: |props| h("div", format!("count {}", props["count"])),
    };

    #[test]
    fn test_component_reuse_updates_in_place() {
        let mut dom = MemoryDom::new();
        let before = h("div", h(&COUNTER, props! { "count" => 1 }));
        let after = h("div", h(&COUNTER, props! { "count" => 2 }));
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.created, 0);
        assert_eq!(muts.removed, 0);
        assert_eq!(muts.text_updates, 1);
        assert_eq!(dom.inner_html(dom.root()), "<div><div>count 2</div></div>");
    }

    static OTHER: ComponentType = ComponentType {
        name: "other",
        needs: &[],
        render: |_| h("p", "other"),
    };

    #[test]
    fn test_component_type_change_rebuilds() {
        let mut dom = MemoryDom::new();
        let before = h("div", h(&COUNTER, props! { "count" => 1 }));
        let after = h("div", h(&OTHER, Props::new()));
        let mut mounted = mount(&mut dom, &before);

        let muts = patch(&mut dom, &mut mounted, &after);

        assert_eq!(muts.removed, 1);
        assert_eq!(dom.inner_html(dom.root()), "<div><p>other</p></div>");
    }
}

//! The `h` builder: flexible call shapes normalized into virtual nodes.
//!
//! The original call surface accepts a tag or component, an optional
//! attribute map and optional children. Those optional-argument shapes
//! are modeled as one tagged input union ([`HArgs`]) resolved exactly
//! once, at construction; nothing downstream re-interprets raw input
//! shapes.

use crate::component::{ComponentType, Props};
use crate::html;
use crate::vnode::{Attrs, ComponentNode, Element, VNode};

/// First argument of [`h`]: an element tag or a component type.
#[derive(Debug)]
pub enum HTag {
    /// An element tag such as `"div"`.
    Element(String),
    /// A component type reference; props come from the second argument.
    Component(&'static ComponentType),
}

impl From<&str> for HTag {
    fn from(tag: &str) -> Self {
        Self::Element(tag.into())
    }
}

impl From<String> for HTag {
    fn from(tag: String) -> Self {
        Self::Element(tag)
    }
}

impl From<&'static ComponentType> for HTag {
    fn from(ty: &'static ComponentType) -> Self {
        Self::Component(ty)
    }
}

/// Second argument of [`h`], resolved from the accepted shapes:
/// nothing (`()`), attributes, props, children, or `(attributes,
/// children)`.
#[derive(Debug, Default)]
pub struct HArgs {
    attrs: Option<Attrs>,
    children: Vec<VNode>,
    props: Option<Props>,
}

/// Values accepted where children are expected.
///
/// Bare strings and numbers coerce to text nodes; `None` children are
/// dropped without producing placeholder nodes.
pub trait IntoChildren {
    /// Resolves into the canonical ordered child sequence.
    fn into_children(self) -> Vec<VNode>;
}

impl IntoChildren for () {
    fn into_children(self) -> Vec<VNode> {
        Vec::new()
    }
}

impl IntoChildren for &str {
    fn into_children(self) -> Vec<VNode> {
        vec![VNode::Text(self.into())]
    }
}

impl IntoChildren for String {
    fn into_children(self) -> Vec<VNode> {
        vec![VNode::Text(self)]
    }
}

impl IntoChildren for i64 {
    fn into_children(self) -> Vec<VNode> {
        vec![VNode::Text(self.to_string())]
    }
}

impl IntoChildren for i32 {
    fn into_children(self) -> Vec<VNode> {
        vec![VNode::Text(self.to_string())]
    }
}

impl IntoChildren for u32 {
    fn into_children(self) -> Vec<VNode> {
        vec![VNode::Text(self.to_string())]
    }
}

impl IntoChildren for f64 {
    fn into_children(self) -> Vec<VNode> {
        vec![VNode::Text(html::fmt_number(self))]
    }
}

impl IntoChildren for VNode {
    fn into_children(self) -> Vec<VNode> {
        vec![self]
    }
}

impl IntoChildren for Vec<VNode> {
    fn into_children(self) -> Vec<VNode> {
        self
    }
}

impl IntoChildren for Option<VNode> {
    fn into_children(self) -> Vec<VNode> {
        self.into_iter().collect()
    }
}

impl IntoChildren for Vec<Option<VNode>> {
    fn into_children(self) -> Vec<VNode> {
        self.into_iter().flatten().collect()
    }
}

impl<const N: usize> IntoChildren for [VNode; N] {
    fn into_children(self) -> Vec<VNode> {
        self.into()
    }
}

impl From<Attrs> for HArgs {
    fn from(attrs: Attrs) -> Self {
        Self {
            attrs: Some(attrs),
            ..Self::default()
        }
    }
}

impl From<Props> for HArgs {
    fn from(props: Props) -> Self {
        Self {
            props: Some(props),
            ..Self::default()
        }
    }
}

impl<C: IntoChildren> From<(Attrs, C)> for HArgs {
    fn from((attrs, children): (Attrs, C)) -> Self {
        Self {
            attrs: Some(attrs),
            children: children.into_children(),
            props: None,
        }
    }
}

macro_rules! children_arg {
    ($($ty:ty),+ $(,)?) => {$(
        impl From<$ty> for HArgs {
            fn from(children: $ty) -> Self {
                Self {
                    children: IntoChildren::into_children(children),
                    ..Self::default()
                }
            }
        }
    )+};
}

children_arg!(
    (),
    &str,
    String,
    i64,
    i32,
    u32,
    f64,
    VNode,
    Vec<VNode>,
    Option<VNode>,
    Vec<Option<VNode>>,
);

impl<const N: usize> From<[VNode; N]> for HArgs {
    fn from(children: [VNode; N]) -> Self {
        Self {
            children: children.into(),
            ..Self::default()
        }
    }
}

/// Builds a virtual node from a tag or component type plus the flexible
/// second argument.
///
/// ```
/// use driftui_core::{h, style};
///
/// let node = h("div", (style([("width", "100px")]), "Hello World"));
/// assert_eq!(
///     driftui_core::serialize(&node).unwrap(),
///     r#"<div style="width: 100px">Hello World</div>"#,
/// );
/// ```
///
/// With a component type as the first argument the second argument is a
/// props map and any children are ignored; a component carries no
/// rendered children until instantiated.
pub fn h(tag: impl Into<HTag>, rest: impl Into<HArgs>) -> VNode {
    let args = rest.into();
    match tag.into() {
        HTag::Element(tag) => {
            let mut attrs = args.attrs.unwrap_or_default();
            let key = attrs.take_key();
            VNode::Element(Element {
                tag,
                attrs,
                children: args.children,
                key,
            })
        }
        HTag::Component(ty) => VNode::Component(ComponentNode {
            ty,
            props: args.props.unwrap_or_default(),
            key: None,
        }),
    }
}

/// Creates a text node.
pub fn text(value: impl Into<String>) -> VNode {
    VNode::Text(value.into())
}

/// Starts an empty attribute map.
#[must_use]
pub fn attrs() -> Attrs {
    Attrs::new()
}

/// Attribute map with a `style` composite, ready for chaining.
pub fn style<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Attrs
where
    K: Into<String>,
    V: Into<String>,
{
    Attrs::new().style(entries)
}

/// Attribute map with a `class` composite, ready for chaining.
pub fn class<K>(entries: impl IntoIterator<Item = (K, bool)>) -> Attrs
where
    K: Into<String>,
{
    Attrs::new().class(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Need;
    use crate::props;

    static CHILD: ComponentType = ComponentType {
        name: "child",
        needs: &[Need::required("value")],
        render: |props| h("div", format!("child with value {}", props["value"])),
    };

    #[test]
    fn test_tag_only() {
        let node = h("div", ());
        match node {
            VNode::Element(el) => {
                assert_eq!(el.tag, "div");
                assert!(el.attrs.is_empty());
                assert!(el.children.is_empty());
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_string_child_coerces_to_text() {
        let node = h("span", "a span");
        match node {
            VNode::Element(el) => assert_eq!(el.children, [VNode::text("a span")]),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_number_child_coerces_to_text() {
        let node = h("span", 2);
        match node {
            VNode::Element(el) => assert_eq!(el.children, [VNode::text("2")]),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_attrs_and_children() {
        let node = h("div", (style([("width", "100px")]), [h("span", ()), h("b", ())]));
        match node {
            VNode::Element(el) => {
                assert!(el.attrs.get("style").is_some());
                assert_eq!(el.children.len(), 2);
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_none_children_are_dropped() {
        let node = h("div", vec![Some(h("span", ())), None, Some(h("b", ()))]);
        match node {
            VNode::Element(el) => assert_eq!(el.children.len(), 2),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_key_moves_from_attrs_to_element() {
        let node = h("li", attrs().key("a"));
        assert_eq!(node.key(), Some("a"));
        match node {
            VNode::Element(el) => assert!(el.attrs.is_empty()),
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_component_node_from_props() {
        let node = h(&CHILD, props! { "value" => 2 });
        match node {
            VNode::Component(component) => {
                assert!(std::ptr::eq(component.ty, &CHILD));
                assert_eq!(component.props["value"], 2);
            }
            other => panic!("expected component, got {other:?}"),
        }
    }
}

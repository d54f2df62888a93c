//! The virtual node data model.
//!
//! A [`VNode`] is an immutable, lightweight description of one element,
//! text node or component instance. Trees of them are the universal
//! currency between the hyperscript builder, the HTML serializer and the
//! DOM reconciler. Construction normalizes everything once; no later code
//! path re-interprets raw input shapes.

use core::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::component::{ComponentType, Props};

/// A virtual node: one element, text node or component instance.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    /// An element such as `<div>` with attributes and ordered children.
    Element(Element),
    /// A text node; escaped on serialization.
    Text(String),
    /// A reference to a component type plus the props to instantiate it
    /// with. Carries no rendered children until instantiated.
    Component(ComponentNode),
}

impl VNode {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the reconciliation key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Element(el) => el.key.as_deref(),
            Self::Component(node) => node.key.as_deref(),
            Self::Text(_) => None,
        }
    }

    /// Returns a copy of this node carrying the given reconciliation key.
    ///
    /// Text nodes have no identity and are returned unchanged.
    #[must_use]
    pub fn keyed(self, key: impl Into<String>) -> Self {
        match self {
            Self::Element(mut el) => {
                el.key = Some(key.into());
                Self::Element(el)
            }
            Self::Component(mut node) => {
                node.key = Some(key.into());
                Self::Component(node)
            }
            text @ Self::Text(_) => text,
        }
    }
}

impl From<&str> for VNode {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for VNode {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// An element node: tag, authored-order attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Tag name, e.g. `"div"`.
    pub tag: String,
    /// Attributes in authored order.
    pub attrs: Attrs,
    /// Ordered children; order is significant and preserved.
    pub children: Vec<VNode>,
    /// Identity hint for keyed reconciliation.
    pub key: Option<String>,
}

/// A component reference: the type to instantiate and its props.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    /// The component capability; compared by identity.
    pub ty: &'static ComponentType,
    /// Supplied props, validated against the type's declared needs at
    /// instantiation time.
    pub props: Props,
    /// Identity hint for keyed reconciliation.
    pub key: Option<String>,
}

impl PartialEq for ComponentNode {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.ty, other.ty) && self.props == other.props && self.key == other.key
    }
}

/// An attribute map preserving authored order.
///
/// `style` and `class` live in the map as composite values; the optional
/// reconciliation key is carried alongside and never serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    entries: IndexMap<String, AttrValue>,
    key: Option<String>,
}

impl Attrs {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a plain attribute. A later duplicate name overwrites the
    /// earlier value in place, keeping the original position.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Sets the `style` composite from `(property, value)` pairs.
    ///
    /// Pair order is preserved; a duplicate property overwrites the
    /// earlier entry.
    #[must_use]
    pub fn style<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.entries.insert("style".into(), AttrValue::Style(map));
        self
    }

    /// Sets the `class` composite from `(name, enabled)` pairs.
    ///
    /// Only names mapped to `true` serialize; if none are, the attribute
    /// is omitted entirely.
    #[must_use]
    pub fn class<K>(mut self, entries: impl IntoIterator<Item = (K, bool)>) -> Self
    where
        K: Into<String>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.entries.insert("class".into(), AttrValue::Class(map));
        self
    }

    /// Registers an event handler under `on<event>`.
    ///
    /// Handlers never serialize to HTML; they apply only during live DOM
    /// reconciliation.
    #[must_use]
    pub fn on(mut self, event: &str, handler: impl Fn() + 'static) -> Self {
        self.entries.insert(
            format!("on{event}"),
            AttrValue::Handler(EventHandler::new(handler)),
        );
        self
    }

    /// Sets the reconciliation key for the element built from these
    /// attributes.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.get(name)
    }

    /// Iterates attributes in authored order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if no attributes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of attributes present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn take_key(&mut self) -> Option<String> {
        self.key.take()
    }
}

impl<'a> IntoIterator for &'a Attrs {
    type Item = (&'a str, &'a AttrValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a AttrValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// An attribute value.
#[derive(Clone)]
pub enum AttrValue {
    /// Plain string value.
    Str(String),
    /// Numeric value; integral numbers serialize without a fraction.
    Number(f64),
    /// Boolean attribute: `true` renders the bare name, `false` omits it.
    Bool(bool),
    /// The `style` composite: CSS property to value, in authored order.
    Style(IndexMap<String, String>),
    /// The `class` composite: class name to enabled flag, in authored
    /// order.
    Class(IndexMap<String, bool>),
    /// Raw prop passthrough. Scalars coerce on serialization; arrays and
    /// objects are a [`crate::RenderError::Serialization`].
    Json(Value),
    /// An event handler; never serialized, compared by identity.
    Handler(EventHandler),
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Style(map) => f.debug_tuple("Style").field(map).finish(),
            Self::Class(map) => f.debug_tuple("Class").field(map).finish(),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Style(a), Self::Style(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttrValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A reference-counted event handler.
///
/// Handlers have no string form; equality is pointer identity so the
/// reconciler can detect handler replacement without invoking anything.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
    /// Wraps a callback.
    pub fn new(handler: impl Fn() + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Invokes the callback.
    pub fn call(&self) {
        (self.0)();
    }

    /// Returns `true` if both handles wrap the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler(..)")
    }
}

//! Core building blocks of the `DriftUI` framework.
//!
//! This crate defines the virtual node data model, the [`h`] hyperscript
//! builder that normalizes flexible call shapes into [`VNode`] trees, the
//! deterministic HTML serializer used for server-side rendering, and the
//! component capability ([`ComponentType`]) with its declared-needs
//! validation. Live DOM reconciliation lives in the `driftui-dom` crate;
//! everything here is pure data and pure functions over it.

#[macro_use]
mod macros;

/// Component capability, declared needs and props validation.
pub mod component;
/// Error types shared across rendering surfaces.
pub mod error;
/// Deterministic HTML serialization.
pub mod html;
/// The `h` builder and its argument-shape normalization.
pub mod hyperscript;
/// Virtual node data model.
pub mod vnode;

pub use component::{ComponentType, Need, Props, merge_props};
pub use error::RenderError;
pub use html::serialize;
pub use hyperscript::{attrs, class, h, style, text};
pub use vnode::{AttrValue, Attrs, ComponentNode, Element, EventHandler, VNode};

#[doc(hidden)]
pub use serde_json as __json;

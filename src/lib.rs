#![doc = include_str!("../README.md")]

pub mod bootstrap;

#[doc(inline)]
pub use driftui_core::{
    AttrValue, Attrs, ComponentNode, ComponentType, Element, EventHandler, Need, Props,
    RenderError, VNode, attrs, class, h, merge_props, props, serialize, style, text,
};

#[doc(inline)]
pub use driftui_dom::{Dom, MemoryDom, Mutations, NodeId, OpCounts, Runtime};

pub mod prelude {
    //! Commonly used types and functions, importable in one `use`.
    //!
    //! ```rust
    //! use driftui::prelude::*;
    //!
    //! let node = h("div", "Hello World");
    //! assert_eq!(serialize(&node).unwrap(), "<div>Hello World</div>");
    //! ```

    pub use crate::bootstrap::{attach_call, prerender, prerender_script, props_literal};
    pub use driftui_core::{
        Attrs, ComponentType, Need, Props, RenderError, VNode, attrs, class, h, props, serialize,
        style, text,
    };
    pub use driftui_dom::{Dom, MemoryDom, Mutations, Runtime};
}

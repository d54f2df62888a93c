//! Live-DOM backend for `DriftUI`: reconciliation and the component
//! runtime.
//!
//! The native DOM is an injected collaborator, not something this crate
//! implements: the [`Dom`] trait exposes the create/remove/set-attribute/
//! insert-before style primitives a host environment provides, and the
//! reconciler drives them to apply minimal mutations. [`MemoryDom`] is an
//! instrumented in-memory implementation used by tests and headless
//! hosts.
//!
//! Everything runs synchronously on the calling thread; a reconcile pass
//! holds `&mut` access to the DOM for its whole duration and runs to
//! completion (spelled out in the type system rather than with locks).

mod dom;
mod memory;
mod mounted;
mod reconcile;
mod runtime;

pub use dom::Dom;
pub use memory::{MemoryDom, NodeId, OpCounts};
pub use reconcile::Mutations;
pub use runtime::Runtime;

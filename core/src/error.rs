//! Error types for rendering, serialization and component instantiation.

use thiserror::Error;

/// Errors produced while validating, rendering or serializing a tree.
///
/// Duplicate sibling keys are deliberately not represented here: the
/// reconciler resolves them deterministically (first occurrence wins) and
/// logs the collision instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// A required need was not supplied when instantiating a component.
    ///
    /// Raised before the component's `render` is ever invoked.
    #[error("component `{component}` is missing required need `{need}`")]
    Configuration {
        /// Name of the component type being instantiated.
        component: &'static str,
        /// Name of the missing need.
        need: &'static str,
    },

    /// An attribute value cannot be coerced to a string.
    ///
    /// Arrays and objects supplied as plain attribute values have no
    /// string form and are propagated as this error, not swallowed.
    #[error("attribute `{attribute}` cannot be coerced to a string")]
    Serialization {
        /// Name of the offending attribute.
        attribute: String,
    },
}

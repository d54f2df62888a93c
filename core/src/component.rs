//! Component capability and declared-needs validation.
//!
//! A component type is the polymorphic capability `{needs metadata,
//! render}`: a static description of the inputs a component declares
//! ("needs") plus a pure render function from validated props to a
//! virtual node tree. Types are compared by identity, which keeps
//! component references cheap to clone and trivially comparable during
//! reconciliation.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::RenderError;
use crate::html;
use crate::vnode::VNode;

/// Props supplied to a component, in authored order.
pub type Props = IndexMap<String, Value>;

/// One declared input of a component type.
#[derive(Debug, Clone)]
pub struct Need {
    /// Prop name the component reads.
    pub name: &'static str,
    /// Whether instantiation fails when the prop is absent.
    pub required: bool,
    /// Default producer for optional needs; `fn` so declarations stay
    /// `const`-constructible in statics.
    pub default: Option<fn() -> Value>,
}

impl Need {
    /// A need that must be supplied at instantiation.
    #[must_use]
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: None,
        }
    }

    /// An optional need with no default; resolves to JSON null when
    /// absent.
    #[must_use]
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            default: None,
        }
    }

    /// An optional need resolving to `default()` when absent.
    #[must_use]
    pub const fn with_default(name: &'static str, default: fn() -> Value) -> Self {
        Self {
            name,
            required: false,
            default: Some(default),
        }
    }
}

/// A component type: name, declared needs and render function.
///
/// Declared as a `static` and referenced by identity:
///
/// ```
/// use driftui_core::{ComponentType, Need, h};
///
/// static CHILD: ComponentType = ComponentType {
///     name: "child",
///     needs: &[Need::required("value")],
///     render: |props| h("div", format!("child with value {}", props["value"])),
/// };
/// ```
#[derive(Debug)]
pub struct ComponentType {
    /// Stable name, used in diagnostics and bootstrap scripts.
    pub name: &'static str,
    /// Declared inputs, validated before every render.
    pub needs: &'static [Need],
    /// Pure render function over validated props.
    pub render: fn(&Props) -> VNode,
}

impl ComponentType {
    /// Validates `props` against the declared needs and resolves the full
    /// prop set a render will see.
    ///
    /// Declared needs resolve first, in declaration order: a supplied
    /// value wins, then the declared default, then JSON null. Undeclared
    /// props are kept (and logged) so wrappers can forward freely.
    ///
    /// # Errors
    ///
    /// [`RenderError::Configuration`] if a required need is absent. No
    /// render work has happened at that point.
    pub fn instantiate(&self, props: &Props) -> Result<Props, RenderError> {
        let mut resolved = Props::new();
        for need in self.needs {
            match props.get(need.name) {
                Some(value) => {
                    resolved.insert(need.name.to_owned(), value.clone());
                }
                None if need.required => {
                    return Err(RenderError::Configuration {
                        component: self.name,
                        need: need.name,
                    });
                }
                None => {
                    let value = need.default.map_or(Value::Null, |default| default());
                    resolved.insert(need.name.to_owned(), value);
                }
            }
        }
        for (name, value) in props {
            if !self.needs.iter().any(|need| need.name == name) {
                tracing::warn!(component = self.name, prop = %name, "prop matches no declared need");
                resolved.insert(name.clone(), value.clone());
            }
        }
        Ok(resolved)
    }

    /// Validates needs and renders the component's tree.
    ///
    /// # Errors
    ///
    /// Propagates [`RenderError::Configuration`] from validation; the
    /// render function itself is infallible.
    pub fn render(&self, props: &Props) -> Result<VNode, RenderError> {
        let resolved = self.instantiate(props)?;
        Ok((self.render)(&resolved))
    }

    /// Server-side rendering path: validate, render and serialize.
    ///
    /// Stateless and side-effect free; requires no DOM.
    ///
    /// # Errors
    ///
    /// Propagates validation and serialization errors.
    pub fn html(&self, props: &Props) -> Result<String, RenderError> {
        html::serialize(&self.render(props)?)
    }
}

/// Merges `updates` over `base`, keeping `base` order for existing keys.
///
/// This is the update rule for already-instantiated components: a prop
/// absent from `updates` keeps its prior value, never falls back to the
/// declared default.
#[must_use]
pub fn merge_props(base: &Props, updates: &Props) -> Props {
    let mut merged = base.clone();
    for (name, value) in updates {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;
    use crate::h;

    thread_local! {
        static RENDERED: Cell<bool> = const { Cell::new(false) };
    }

    static STRICT: ComponentType = ComponentType {
        name: "strict",
        needs: &[Need::required("value")],
        render: |props| {
            RENDERED.with(|flag| flag.set(true));
            h("div", format!("value {}", props["value"]))
        },
    };

    static DEFAULTED: ComponentType = ComponentType {
        name: "defaulted",
        needs: &[Need::with_default("limit", || json!(10)), Need::optional("label")],
        render: |props| h("div", props["limit"].to_string()),
    };

    #[test]
    fn test_missing_required_need_fails_before_render() {
        RENDERED.with(|flag| flag.set(false));
        let err = STRICT.render(&Props::new()).unwrap_err();
        assert_eq!(
            err,
            RenderError::Configuration {
                component: "strict",
                need: "value",
            }
        );
        assert!(!RENDERED.with(Cell::get), "render must not run on config errors");
    }

    #[test]
    fn test_defaults_and_null_fallback() {
        let resolved = DEFAULTED.instantiate(&Props::new()).unwrap();
        assert_eq!(resolved["limit"], json!(10));
        assert_eq!(resolved["label"], Value::Null);
    }

    #[test]
    fn test_supplied_value_wins_over_default() {
        let props = crate::props! { "limit" => 3 };
        let resolved = DEFAULTED.instantiate(&props).unwrap();
        assert_eq!(resolved["limit"], json!(3));
    }

    #[test]
    fn test_unknown_props_are_kept() {
        let props = crate::props! { "limit" => 1, "extra" => "x" };
        let resolved = DEFAULTED.instantiate(&props).unwrap();
        assert_eq!(resolved["extra"], json!("x"));
    }

    #[test]
    fn test_merge_props_keeps_prior_values() {
        let base = crate::props! { "a" => 1, "b" => 2 };
        let merged = merge_props(&base, &crate::props! { "b" => 3 });
        assert_eq!(merged["a"], json!(1));
        assert_eq!(merged["b"], json!(3));
    }
}

//! Deterministic HTML serialization.
//!
//! `serialize` turns a virtual node tree into a canonical HTML string:
//! the server-side rendering output, and the exact bytes the bootstrap
//! script later re-attaches against. Determinism is structural here —
//! attributes, style properties and class names are insertion-ordered
//! maps, so identical trees always produce identical strings.
//!
//! The attribute normalization ([`render_attr`]) is shared with the DOM
//! patcher in `driftui-dom`, keeping the string and live surfaces from
//! drifting apart.

use serde_json::Value;

use crate::error::RenderError;
use crate::vnode::{AttrValue, Element, VNode};

/// A normalized attribute ready for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedAttr {
    /// Renders as `name="value"`.
    Value(String),
    /// A boolean attribute rendering as the bare name.
    Flag,
}

/// Serializes a virtual node tree to HTML.
///
/// Component nodes are instantiated transiently (needs validated, render
/// invoked) and replaced by their rendered output; component wrapper
/// markup never appears.
///
/// # Errors
///
/// Propagates needs-validation failures and attribute coercion failures.
pub fn serialize(node: &VNode) -> Result<String, RenderError> {
    let mut out = String::new();
    write_node(&mut out, node)?;
    Ok(out)
}

fn write_node(out: &mut String, node: &VNode) -> Result<(), RenderError> {
    match node {
        VNode::Text(value) => {
            escape_into(out, value);
            Ok(())
        }
        VNode::Element(el) => write_element(out, el),
        VNode::Component(component) => {
            let tree = component.ty.render(&component.props)?;
            write_node(out, &tree)
        }
    }
}

fn write_element(out: &mut String, el: &Element) -> Result<(), RenderError> {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in el.attrs.iter() {
        match render_attr(name, value)? {
            Some(RenderedAttr::Value(rendered)) => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(out, &rendered);
                out.push('"');
            }
            Some(RenderedAttr::Flag) => {
                out.push(' ');
                out.push_str(name);
            }
            None => {}
        }
    }
    out.push('>');
    for child in &el.children {
        write_node(out, child)?;
    }
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
    Ok(())
}

/// Normalizes one attribute to its output form.
///
/// Returns `None` when the attribute has no output at all: event
/// handlers, `false` booleans, JSON null, an empty `style` map, or a
/// `class` map with no enabled name.
///
/// # Errors
///
/// [`RenderError::Serialization`] when a JSON array or object is supplied
/// as a plain attribute value.
pub fn render_attr(name: &str, value: &AttrValue) -> Result<Option<RenderedAttr>, RenderError> {
    let rendered = match value {
        AttrValue::Str(s) => Some(RenderedAttr::Value(s.clone())),
        AttrValue::Number(n) => Some(RenderedAttr::Value(fmt_number(*n))),
        AttrValue::Bool(true) => Some(RenderedAttr::Flag),
        AttrValue::Bool(false) | AttrValue::Handler(_) => None,
        AttrValue::Style(map) => {
            if map.is_empty() {
                None
            } else {
                let body = map
                    .iter()
                    .map(|(prop, value)| format!("{prop}: {value}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                Some(RenderedAttr::Value(body))
            }
        }
        AttrValue::Class(map) => {
            let enabled = map
                .iter()
                .filter(|&(_, &on)| on)
                .map(|(class, _)| class.as_str())
                .collect::<Vec<_>>();
            if enabled.is_empty() {
                None
            } else {
                Some(RenderedAttr::Value(enabled.join(" ")))
            }
        }
        AttrValue::Json(value) => match value {
            Value::Null | Value::Bool(false) => None,
            Value::Bool(true) => Some(RenderedAttr::Flag),
            Value::Number(n) => Some(RenderedAttr::Value(n.to_string())),
            Value::String(s) => Some(RenderedAttr::Value(s.clone())),
            Value::Array(_) | Value::Object(_) => {
                return Err(RenderError::Serialization {
                    attribute: name.to_owned(),
                });
            }
        },
    };
    Ok(rendered)
}

/// HTML-escapes `text` into `out` (`&`, `<`, `>`, `"`).
pub fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Formats a numeric attribute or text value; integral numbers print
/// without a fractional part, matching the host scripting output the
/// serializer was specified against.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn fmt_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

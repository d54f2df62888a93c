//! Prerender bootstrap: server-rendered pages that re-attach client-side.
//!
//! The prerender script embeds two things that must agree byte for byte:
//! the application's server-rendered markup and the `attach(...)` call a
//! client executes to take the existing DOM over. Props serialize through
//! one code path ([`props_literal`]) with insertion order preserved, so
//! the values the server rendered from and the values the client
//! re-attaches with are always the same literal.

use serde_json::Value;

use driftui_core::{ComponentType, Props, RenderError};

/// The deterministic JSON literal for a props map.
///
/// Insertion order of the map (and of any nested objects) is preserved,
/// so equal props always produce identical text.
#[must_use]
pub fn props_literal(props: &Props) -> String {
    Value::Object(props.iter().map(|(k, v)| (k.clone(), v.clone())).collect()).to_string()
}

/// The client-side re-attach expression for `app` at `app_id`.
#[must_use]
pub fn attach_call(app: &ComponentType, app_id: &str, props: &Props) -> String {
    format!("{}.attach(\"{}\", {})", app.name, app_id, props_literal(props))
}

/// Emits the bootstrap script for a prerendered page.
///
/// The script invokes the layout component's `html` with the
/// application's serialized output embedded (as a JSON string literal)
/// and an `attach_func` that re-instantiates the application with the
/// same props at `app_id`:
///
/// ```text
/// layout.html({
///   application: "<div>...</div>",
///   javascript_include_tags: '',
///   attach_func: 'app.attach("app_id", {"need":"hello"})'
/// })
/// ```
///
/// # Errors
///
/// Propagates needs-validation and serialization failures from rendering
/// the application.
pub fn prerender_script(
    layout: &ComponentType,
    app: &ComponentType,
    app_id: &str,
    props: &Props,
) -> Result<String, RenderError> {
    let markup = app.html(props)?;
    let attach = attach_call(app, app_id, props);
    Ok(format!(
        "{layout}.html({{\n  application: {markup},\n  javascript_include_tags: '',\n  attach_func: '{attach}'\n}})\n",
        layout = layout.name,
        markup = Value::String(markup),
        attach = escape_single_quoted(&attach),
    ))
}

/// Renders the full prerendered page directly: the layout component's
/// `html` invoked with the application's markup, an empty
/// `javascript_include_tags` and the re-attach call as needs.
///
/// # Errors
///
/// Propagates validation and serialization failures from either
/// component.
pub fn prerender(
    layout: &ComponentType,
    app: &ComponentType,
    app_id: &str,
    props: &Props,
) -> Result<String, RenderError> {
    let markup = app.html(props)?;
    let attach = attach_call(app, app_id, props);
    let mut layout_props = Props::new();
    layout_props.insert("application".into(), Value::String(markup));
    layout_props.insert("javascript_include_tags".into(), Value::String(String::new()));
    layout_props.insert("attach_func".into(), Value::String(attach));
    layout.html(&layout_props)
}

fn escape_single_quoted(script: &str) -> String {
    script.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use driftui_core::{Need, h, props};

    use super::*;

    static APP: ComponentType = ComponentType {
        name: "app",
        needs: &[Need::required("need")],
        render: |props| h("div", format!("need {}", props["need"])),
    };

    #[test]
    fn test_props_literal_preserves_authored_order() {
        let props = props! { "b" => 1, "a" => 2 };
        assert_eq!(props_literal(&props), r#"{"b":1,"a":2}"#);
    }

    #[test]
    fn test_attach_call_shape() {
        let props = props! { "need" => "hello" };
        assert_eq!(
            attach_call(&APP, "app_id", &props),
            r#"app.attach("app_id", {"need":"hello"})"#,
        );
    }

    #[test]
    fn test_single_quote_escaping() {
        assert_eq!(escape_single_quoted(r"it's a \ test"), r"it\'s a \\ test");
    }
}

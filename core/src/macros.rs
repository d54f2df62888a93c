/// Builds a [`Props`](crate::component::Props) map in authored order.
///
/// Values go through `serde_json::json!`, so scalars, arrays and nested
/// maps all work. Computed values need parentheses: `"k" => (expr())`.
///
/// ```
/// use driftui_core::props;
///
/// let props = props! {
///     "need" => "hello",
///     "array_need" => [1],
///     "hash_need" => { "x": 1 },
/// };
/// assert_eq!(props["need"], "hello");
/// assert_eq!(props["hash_need"]["x"], 1);
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::component::Props::new()
    };
    ($($name:literal => $value:tt),+ $(,)?) => {{
        let mut props = $crate::component::Props::new();
        $(
            props.insert($name.to_string(), $crate::__json::json!($value));
        )+
        props
    }};
}

//! Short human-readable previews of values

use std::ops::ControlFlow;

use crate::enumerate::{EnumerationMode, OwnProperties, PropertyEnumerator};
use crate::heap::{Class, Heap, Value, format_number};

const MAX_ENTRIES: usize = 3;

/// Render a one-line preview of a value.
///
/// Scalars print as the host prints them (strings JSON-quoted), composites
/// show at most a few enumerable members, one level deep.
pub fn preview(heap: &Heap, value: &Value) -> String {
    render(heap, value, true)
}

fn render(heap: &Heap, value: &Value, descend: bool) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => quote(s),
        Value::Object(id) => {
            let object = heap.get(*id);
            match &object.class {
                Class::Function => "function".to_string(),
                Class::Array if descend => {
                    let items = entries(heap, *id, false);
                    format!("[{}]", items.join(", "))
                }
                Class::Array => "[…]".to_string(),
                Class::Object if descend => {
                    let items = entries(heap, *id, true);
                    if items.is_empty() {
                        "{}".to_string()
                    } else {
                        format!("{{{}}}", items.join(", "))
                    }
                }
                Class::Object => "{…}".to_string(),
                other => format!("[object {}]", other),
            }
        }
    }
}

fn entries(heap: &Heap, id: crate::heap::ObjectId, keyed: bool) -> Vec<String> {
    let mut items = Vec::new();
    let mut truncated = false;
    let enumerator = OwnProperties::new(EnumerationMode::EnumerableOnly);
    let result = enumerator.for_own_properties(heap, id, &mut |key, value| {
        if items.len() == MAX_ENTRIES {
            truncated = true;
            return ControlFlow::Break(());
        }
        let rendered = render(heap, &value, false);
        items.push(if keyed {
            format!("{}: {}", key, rendered)
        } else {
            rendered
        });
        ControlFlow::Continue(())
    });
    if result.is_err() {
        return vec!["…".to_string()];
    }
    if truncated {
        items.push("…".to_string());
    }
    items
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

/// Convert a value to JSON for machine-readable output.
///
/// Numbers JSON cannot hold and all objects become their preview string.
pub fn to_json(heap: &Heap, value: &Value) -> serde_json::Value {
    match value {
        Value::Undefined | Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(format_number(*n))),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Object(_) => serde_json::Value::String(preview(heap, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        let heap = Heap::new();
        assert_eq!(preview(&heap, &Value::from(12)), "12");
        assert_eq!(preview(&heap, &Value::from("a\"b")), "\"a\\\"b\"");
        assert_eq!(preview(&heap, &Value::Undefined), "undefined");
        assert_eq!(preview(&heap, &Value::Number(f64::NAN)), "NaN");
    }

    #[test]
    fn test_object_preview_is_shallow() {
        let mut heap = Heap::new();
        let inner = heap.object_from([("x", Value::from(1))]);
        let outer = heap.object_from([("a", Value::from(1)), ("b", Value::Object(inner))]);
        assert_eq!(preview(&heap, &Value::Object(outer)), "{a: 1, b: {…}}");
    }

    #[test]
    fn test_array_preview_truncates() {
        let mut heap = Heap::new();
        let arr = heap.array((1..=5).map(Value::from));
        assert_eq!(preview(&heap, &Value::Object(arr)), "[1, 2, 3, …]");
    }

    #[test]
    fn test_function_and_host_objects() {
        let mut heap = Heap::new();
        let f = heap.function();
        let re = heap.alloc(crate::heap::Object::new(Class::RegExp));
        assert_eq!(preview(&heap, &Value::Object(f)), "function");
        assert_eq!(preview(&heap, &Value::Object(re)), "[object RegExp]");
    }

    #[test]
    fn test_to_json() {
        let heap = Heap::new();
        assert_eq!(to_json(&heap, &Value::from(12)), serde_json::json!(12.0));
        assert_eq!(to_json(&heap, &Value::Number(f64::NAN)), serde_json::json!("NaN"));
        assert_eq!(to_json(&heap, &Value::Undefined), serde_json::Value::Null);
    }
}

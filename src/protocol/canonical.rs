//! Canonical JSON serialization.
//!
//! Object keys are emitted in ascending lexicographic (byte) order at every
//! nesting level, arrays keep their order, and no whitespace is written.
//! The output does not depend on how the input map was built.

use serde_json::Value;

/// Serialize `value` to its canonical JSON form.
pub fn to_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        // null, bool and numbers have a single compact rendering
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_string(s: &str, out: &mut String) {
    // serde_json's escaping matches JSON.stringify for all BMP input
    out.push_str(&Value::String(s.to_owned()).to_string());
}

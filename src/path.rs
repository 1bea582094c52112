//! Dotted paths into variable trees.
//!
//! A path such as `input.files.1` is split on `.` from left to right. Each segment either names
//! a key of an object, or is the index of a list element.

use crate::Value;

/// Get the value at `path`, returns `None` if the path does not resolve.
pub fn value_at_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(object) => object.get(segment),
        Value::List(list) => parse_index(segment).and_then(|idx| list.get(idx)),
        Value::Null
        | Value::Number(_)
        | Value::String(_)
        | Value::Boolean(_)
        | Value::Upload(_) => None,
    })
}

/// Get a mutable reference to the value at `path`, returns `None` if the path does not resolve.
pub fn value_at_path_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(object) => object.get_mut(segment),
        Value::List(list) => parse_index(segment).and_then(move |idx| list.get_mut(idx)),
        Value::Null
        | Value::Number(_)
        | Value::String(_)
        | Value::Boolean(_)
        | Value::Upload(_) => None,
    })
}

/// Replace the value at `path`.
///
/// Returns `false` and leaves `root` untouched if the path does not resolve: a key is missing,
/// an index is not a number or out of bounds, or a segment descends into a scalar.
pub fn set_value_at_path(root: &mut Value, path: &str, value: Value) -> bool {
    match value_at_path_mut(root, path) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    fn marker(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_set_top_level() {
        let mut root = value!({ "file": null, "other": 1 });
        assert!(set_value_at_path(&mut root, "file", marker("x")));
        assert_eq!(root, value!({ "file": "x", "other": 1 }));
    }

    #[test]
    fn test_set_nested() {
        let mut root = value!({
            "input": {
                "name": "a",
                "files": [null, null, { "inner": [null] }],
            }
        });
        assert!(set_value_at_path(&mut root, "input.files.1", marker("x")));
        assert!(set_value_at_path(&mut root, "input.files.2.inner.0", marker("y")));
        assert_eq!(
            root,
            value!({
                "input": {
                    "name": "a",
                    "files": [null, "x", { "inner": ["y"] }],
                }
            })
        );
    }

    #[test]
    fn test_set_twice_overwrites() {
        let mut root = value!({ "file": null });
        assert!(set_value_at_path(&mut root, "file", marker("first")));
        assert!(set_value_at_path(&mut root, "file", marker("second")));
        assert_eq!(value_at_path(&root, "file"), Some(&marker("second")));
    }

    #[test]
    fn test_missing_key() {
        let mut root = value!({ "input": { "files": [null] } });
        let before = root.clone();
        assert!(!set_value_at_path(&mut root, "input.file", marker("x")));
        assert!(!set_value_at_path(&mut root, "missing.files.0", marker("x")));
        assert_eq!(root, before);
    }

    #[test]
    fn test_bad_index() {
        let mut root = value!({ "files": [null, null] });
        let before = root.clone();
        assert!(!set_value_at_path(&mut root, "files.2", marker("x")));
        assert!(!set_value_at_path(&mut root, "files.5", marker("x")));
        assert!(!set_value_at_path(&mut root, "files.a", marker("x")));
        assert!(!set_value_at_path(&mut root, "files.-1", marker("x")));
        assert!(!set_value_at_path(&mut root, "files.+1", marker("x")));
        assert!(!set_value_at_path(&mut root, "files.", marker("x")));
        assert_eq!(root, before);
    }

    #[test]
    fn test_descend_into_scalar() {
        let mut root = value!({ "a": 1, "b": "s", "c": null, "d": true });
        let before = root.clone();
        for path in &["a.x", "b.0", "c.x", "d.x"] {
            assert!(!set_value_at_path(&mut root, path, marker("x")));
        }
        assert_eq!(root, before);
    }

    #[test]
    fn test_null_root() {
        let mut root = Value::Null;
        assert!(!set_value_at_path(&mut root, "file", marker("x")));
        assert_eq!(root, Value::Null);
    }

    #[test]
    fn test_list_root() {
        let mut root = value!([[null], null]);
        assert!(set_value_at_path(&mut root, "0.0", marker("x")));
        assert_eq!(root, value!([["x"], null]));
    }

    #[test]
    fn test_replaces_containers() {
        let mut root = value!({ "input": { "files": [1, 2] } });
        assert!(set_value_at_path(&mut root, "input.files", marker("x")));
        assert_eq!(root, value!({ "input": { "files": "x" } }));
    }
}

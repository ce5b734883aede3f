//! Recursive comparison of two parsed documents.

use super::value::{RenderMode, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Indentation added per nesting level in full mode
const INDENT: &str = "  ";

/// Compares two documents and returns one line per change.
///
/// Objects are compared key by key; any other pair of differing values
/// produces a single `value changed` line. Deep-equal documents yield no lines.
#[must_use]
pub fn diff_trees(before: &Value, after: &Value, mode: RenderMode) -> Vec<String> {
    let mut lines = Vec::new();
    match (before, after) {
        (Value::Object(before), Value::Object(after)) => {
            diff_objects(before, after, mode, 0, &mut lines);
        }
        _ if before == after => {}
        _ => lines.push(format!(
            "value changed: {} → {}",
            before.render_inline(mode),
            after.render_inline(mode)
        )),
    }
    lines
}

/// Lists every top-level field of a document as an `added` or `removed` line.
///
/// Used to describe the content of a created or deleted file.
#[must_use]
pub fn describe_fields(value: &Value, verb: &str, mode: RenderMode) -> Vec<String> {
    value.as_object().map_or_else(Vec::new, |map| {
        map.iter()
            .map(|(key, value)| format!("{verb} `{key}`: {}", value.render(mode)))
            .collect()
    })
}

/// Walks the union of keys in lexicographic order, appending change lines to `out`.
fn diff_objects(
    before: &BTreeMap<String, Value>,
    after: &BTreeMap<String, Value>,
    mode: RenderMode,
    indent: usize,
    out: &mut Vec<String>,
) {
    let pad = INDENT.repeat(indent);
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    for key in keys {
        match (before.get(key), after.get(key)) {
            (None, Some(added)) => {
                out.push(format!("{pad}added `{key}`: {}", added.render(mode)));
            }
            (Some(removed), None) => {
                out.push(format!("{pad}removed `{key}`: {}", removed.render(mode)));
            }
            (Some(old), Some(new)) if old == new => {}
            (Some(old), Some(new)) => {
                if let Some((old_map, new_map)) = nested_objects(old, new, mode) {
                    out.push(format!("{pad}modified `{key}`:"));
                    diff_objects(old_map, new_map, mode, indent + 1, out);
                } else {
                    out.push(format!(
                        "{pad}modified `{key}`: {} → {}",
                        old.render_inline(mode),
                        new.render_inline(mode)
                    ));
                }
            }
            (None, None) => {}
        }
    }
}

/// The pair of objects to recurse into, if the values call for a nested block.
///
/// Only in full mode: two objects, or two arrays that each hold exactly one
/// object (the single-record wrapper found in plugin manifests). Any other
/// array shape is compared as a plain value.
fn nested_objects<'a>(
    old: &'a Value,
    new: &'a Value,
    mode: RenderMode,
) -> Option<(&'a BTreeMap<String, Value>, &'a BTreeMap<String, Value>)> {
    if mode != RenderMode::Full {
        return None;
    }
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => Some((old, new)),
        (Value::Array(old), Value::Array(new)) if old.len() == 1 && new.len() == 1 => {
            Some((old[0].as_object()?, new[0].as_object()?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(before: &str, after: &str, mode: RenderMode) -> Vec<String> {
        diff_trees(
            &Value::parse(before).unwrap(),
            &Value::parse(after).unwrap(),
            mode,
        )
    }

    #[test]
    fn test_added_removed_modified() {
        let lines = diff(
            "{\"keep\":1,\"old\":true,\"version\":1}",
            "{\"keep\":1,\"new\":\"x\",\"version\":2}",
            RenderMode::Truncated,
        );
        assert_eq!(
            lines,
            vec![
                "added `new`: \"x\"",
                "removed `old`: true",
                "modified `version`: 1 → 2",
            ]
        );
    }

    #[test]
    fn test_equal_documents_produce_nothing() {
        assert!(diff("{\"a\":[1,2]}", "{ \"a\": [1, 2] }", RenderMode::Full).is_empty());
        assert!(diff("[1]", "[1]", RenderMode::Truncated).is_empty());
    }

    #[test]
    fn test_nested_object_truncated_is_single_line() {
        let lines = diff(
            "{\"permissions\":{\"allow\":[\"a\"]}}",
            "{\"permissions\":{\"allow\":[\"a\",\"b\"]}}",
            RenderMode::Truncated,
        );
        assert_eq!(lines, vec!["modified `permissions`: {...} → {...}"]);
    }

    #[test]
    fn test_nested_object_full_is_indented_block() {
        let lines = diff(
            "{\"permissions\":{\"allow\":[\"a\"],\"deny\":[]}}",
            "{\"permissions\":{\"allow\":[\"a\",\"b\"],\"ask\":[\"c\"],\"deny\":[]}}",
            RenderMode::Full,
        );
        assert_eq!(
            lines,
            vec![
                "modified `permissions`:",
                "  modified `allow`: [\"a\"] → [\"a\", \"b\"]",
                "  added `ask`: [\"c\"]",
            ]
        );
    }

    #[test]
    fn test_single_object_arrays_recurse_in_full_mode() {
        let before = "{\"plugins\":[{\"name\":\"fmt\",\"version\":\"1.0\"}]}";
        let after = "{\"plugins\":[{\"name\":\"fmt\",\"version\":\"1.1\"}]}";

        assert_eq!(
            diff(before, after, RenderMode::Full),
            vec!["modified `plugins`:", "  modified `version`: \"1.0\" → \"1.1\""]
        );
        assert_eq!(
            diff(before, after, RenderMode::Truncated),
            vec![
                "modified `plugins`: [{\"name\": \"fmt\", \"version\": \"1.0\"}] → [{\"name\": \"fmt\", \"version\": \"1.1\"}]"
            ]
        );
    }

    #[test]
    fn test_multi_element_arrays_are_plain_values() {
        let lines = diff(
            "{\"plugins\":[{\"n\":1},{\"n\":2}]}",
            "{\"plugins\":[{\"n\":1},{\"n\":3}]}",
            RenderMode::Full,
        );
        assert_eq!(
            lines,
            vec!["modified `plugins`: [{\"n\": 1}, {\"n\": 2}] → [{\"n\": 1}, {\"n\": 3}]"]
        );
    }

    #[test]
    fn test_object_replaced_by_scalar() {
        let lines = diff("{\"hooks\":{\"a\":1}}", "{\"hooks\":null}", RenderMode::Full);
        assert_eq!(lines, vec!["modified `hooks`: {\"a\": 1} → null"]);
    }

    #[test]
    fn test_non_object_roots() {
        let lines = diff("[1,2]", "[1,2,3]", RenderMode::Truncated);
        assert_eq!(lines, vec!["value changed: [1, 2] → [1, 2, 3]"]);
    }

    #[test]
    fn test_describe_fields() {
        let value = Value::parse("{\"b\":[1,2,3,4],\"a\":1}").unwrap();
        assert_eq!(
            describe_fields(&value, "added", RenderMode::Truncated),
            vec!["added `a`: 1", "added `b`: [1, 2, 3, ... +1 more]"]
        );
        assert!(describe_fields(&Value::Null, "added", RenderMode::Full).is_empty());
    }
}

use serde_json::Value;
use thiserror::Error;

use crate::models::OutlineNode;

/// Why an outline payload was rejected.
///
/// Carries the depth (and index where it applies) of the first offending
/// node so rejection messages are reproducible: validation always fails on
/// the first problem found in depth-first, left-to-right order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OutlineError {
    #[error("outline is not an array at depth {depth}")]
    NotAnArray { depth: usize },

    #[error("missing or invalid name at depth {depth}, index {index}")]
    InvalidName { depth: usize, index: usize },

    #[error("children is not an array at depth {depth}, index {index}")]
    InvalidChildren { depth: usize, index: usize },

    #[error("outline would exceed the maximum depth of {max_depth}")]
    TooDeep { max_depth: usize },
}

/// Validate an untrusted outline payload.
///
/// Root-level nodes sit at depth 0. A `max_depth` of `Some(n)` rejects the
/// whole outline if any node at depth >= n has non-empty children: the
/// gate fails closed rather than silently truncating user or generator
/// intent. Pass `None` for unconstrained projects.
///
/// The validator never repairs data. `null` (or an absent `children`) is
/// treated as an empty list; everything else must match the schema exactly.
pub fn validate(raw: &Value, max_depth: Option<usize>) -> Result<Vec<OutlineNode>, OutlineError> {
    validate_level(Some(raw), 0, max_depth)
}

fn validate_level(
    raw: Option<&Value>,
    depth: usize,
    max_depth: Option<usize>,
) -> Result<Vec<OutlineNode>, OutlineError> {
    let items = match raw {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(OutlineError::NotAnArray { depth }),
    };

    let mut nodes = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let entry = item
            .as_object()
            .ok_or(OutlineError::InvalidName { depth, index })?;

        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or(OutlineError::InvalidName { depth, index })?;

        let raw_children = entry.get("children");
        if let Some(children) = raw_children {
            if !children.is_null() && !children.is_array() {
                return Err(OutlineError::InvalidChildren { depth, index });
            }
        }

        if let Some(max) = max_depth {
            let has_children = raw_children
                .and_then(Value::as_array)
                .is_some_and(|children| !children.is_empty());
            if depth >= max && has_children {
                return Err(OutlineError::TooDeep { max_depth: max });
            }
        }

        let children = validate_level(raw_children, depth + 1, max_depth)?;
        nodes.push(OutlineNode {
            name: name.to_string(),
            children,
        });
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_array_is_a_valid_empty_outline() {
        assert_eq!(validate(&json!([]), None).unwrap(), vec![]);
    }

    #[test]
    fn null_is_treated_as_empty() {
        assert_eq!(validate(&Value::Null, None).unwrap(), vec![]);
    }

    #[test]
    fn non_array_payload_is_rejected() {
        assert_eq!(
            validate(&json!({"name": "A"}), None),
            Err(OutlineError::NotAnArray { depth: 0 })
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_eq!(
            validate(&json!([{"name": ""}]), None),
            Err(OutlineError::InvalidName { depth: 0, index: 0 })
        );
    }

    #[test]
    fn missing_name_is_rejected() {
        assert_eq!(
            validate(&json!([{"children": []}]), None),
            Err(OutlineError::InvalidName { depth: 0, index: 0 })
        );
    }

    #[test]
    fn non_object_element_is_rejected() {
        assert_eq!(
            validate(&json!(["just a string"]), None),
            Err(OutlineError::InvalidName { depth: 0, index: 0 })
        );
    }

    #[test]
    fn non_array_children_is_rejected() {
        assert_eq!(
            validate(&json!([{"name": "A", "children": "not-array"}]), None),
            Err(OutlineError::InvalidChildren { depth: 0, index: 0 })
        );
    }

    #[test]
    fn rejects_the_first_failure_in_traversal_order() {
        let raw = json!([
            {"name": "A", "children": [{"name": ""}]},
            {"name": ""}
        ]);
        // The nested bad name comes first depth-first.
        assert_eq!(
            validate(&raw, None),
            Err(OutlineError::InvalidName { depth: 1, index: 0 })
        );
    }

    #[test]
    fn depth_limit_fails_closed() {
        let raw = json!([
            {"name": "A", "children": [{"name": "B", "children": [{"name": "C"}]}]}
        ]);
        assert_eq!(
            validate(&raw, Some(1)),
            Err(OutlineError::TooDeep { max_depth: 1 })
        );
        // The same outline fits within depth 2.
        let nodes = validate(&raw, Some(2)).unwrap();
        assert_eq!(nodes[0].children[0].children[0].name, "C");
    }

    #[test]
    fn depth_limit_ignores_empty_children_arrays() {
        let raw = json!([{"name": "A", "children": [{"name": "B", "children": []}]}]);
        assert!(validate(&raw, Some(1)).is_ok());
    }

    #[test]
    fn nested_outline_converts_to_nodes() {
        let raw = json!([
            {"name": "Intro"},
            {"name": "Methods", "children": [{"name": "Setup"}]}
        ]);
        let nodes = validate(&raw, None).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].children[0].name, "Setup");
    }
}

use serde::{Deserialize, Serialize};

/// A validated outline node.
///
/// Outlines arrive as untrusted nested data from the external generator (or
/// pasted by the user) and exist only between validation and conversion;
/// they are never persisted. See [`crate::outline::validate()`] for the
/// gate that produces these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutlineNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

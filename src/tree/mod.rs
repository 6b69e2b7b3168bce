//! Pure structural operations over the section tree.
//!
//! All operations take the root-level section list (a forest) and are total:
//! a missing id is reported through the return value, never a panic. The
//! mutating operations return `None` when the target id is absent so callers
//! can keep their original forest, and on success they rebuild only the path
//! from the root to the touched node: every untouched subtree in the result
//! is the *same* `Arc` as in the input, observable with `Arc::ptr_eq`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{SectionNode, SectionPatch};

/// Depth-first search for a section by id. Returns the first match.
pub fn find(sections: &[Arc<SectionNode>], id: Uuid) -> Option<Arc<SectionNode>> {
    for node in sections {
        if node.id == id {
            return Some(Arc::clone(node));
        }
        if let Some(found) = find(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Apply a patch to the section with the given id.
///
/// Refreshes `updated_at` on the patched node and on every ancestor along
/// the path to it. Returns `None` if the id is not present.
pub fn update(
    sections: &[Arc<SectionNode>],
    id: Uuid,
    patch: &SectionPatch,
    now: DateTime<Utc>,
) -> Option<Vec<Arc<SectionNode>>> {
    let mut out = Vec::with_capacity(sections.len());
    let mut hit = false;
    for node in sections {
        if hit {
            out.push(Arc::clone(node));
            continue;
        }
        if node.id == id {
            let mut next = (**node).clone();
            if let Some(name) = &patch.name {
                next.name = name.clone();
            }
            if let Some(prompt) = &patch.prompt {
                next.prompt = prompt.clone();
            }
            if let Some(content) = &patch.content {
                next.content = content.clone();
            }
            if let Some(at) = patch.last_generated_at {
                next.last_generated_at = Some(at);
            }
            next.updated_at = now;
            out.push(Arc::new(next));
            hit = true;
        } else if let Some(children) = update(&node.children, id, patch, now) {
            let mut next = (**node).clone();
            next.children = children;
            next.updated_at = now;
            out.push(Arc::new(next));
            hit = true;
        } else {
            out.push(Arc::clone(node));
        }
    }
    hit.then_some(out)
}

/// Insert a section under `parent_id` at `position` (append by default).
///
/// A `None` parent inserts at the root level, which always succeeds. A
/// missing parent id returns `None` and leaves the forest for the caller to
/// keep. Ancestors of the insertion point get a fresh `updated_at`.
pub fn insert(
    sections: &[Arc<SectionNode>],
    parent_id: Option<Uuid>,
    node: SectionNode,
    position: Option<usize>,
    now: DateTime<Utc>,
) -> Option<Vec<Arc<SectionNode>>> {
    match parent_id {
        None => {
            let mut out: Vec<Arc<SectionNode>> = sections.iter().map(Arc::clone).collect();
            let at = position.unwrap_or(out.len()).min(out.len());
            out.insert(at, Arc::new(node));
            Some(out)
        }
        Some(pid) => insert_under(sections, pid, node, position, now),
    }
}

fn insert_under(
    sections: &[Arc<SectionNode>],
    parent_id: Uuid,
    node: SectionNode,
    position: Option<usize>,
    now: DateTime<Utc>,
) -> Option<Vec<Arc<SectionNode>>> {
    let mut out = Vec::with_capacity(sections.len());
    let mut hit = false;
    for current in sections {
        if hit {
            out.push(Arc::clone(current));
            continue;
        }
        if current.id == parent_id {
            let mut next = (**current).clone();
            let at = position.unwrap_or(next.children.len()).min(next.children.len());
            next.children.insert(at, Arc::new(node.clone()));
            next.updated_at = now;
            out.push(Arc::new(next));
            hit = true;
        } else if let Some(children) = insert_under(&current.children, parent_id, node.clone(), position, now)
        {
            let mut next = (**current).clone();
            next.children = children;
            next.updated_at = now;
            out.push(Arc::new(next));
            hit = true;
        } else {
            out.push(Arc::clone(current));
        }
    }
    hit.then_some(out)
}

/// Remove the subtree rooted at `id`. Returns `None` if the id is absent.
///
/// Ancestors of the removed node get a fresh `updated_at`.
pub fn delete(
    sections: &[Arc<SectionNode>],
    id: Uuid,
    now: DateTime<Utc>,
) -> Option<Vec<Arc<SectionNode>>> {
    let mut out = Vec::with_capacity(sections.len());
    let mut hit = false;
    for node in sections {
        if hit {
            out.push(Arc::clone(node));
            continue;
        }
        if node.id == id {
            hit = true;
            continue;
        }
        if let Some(children) = delete(&node.children, id, now) {
            let mut next = (**node).clone();
            next.children = children;
            next.updated_at = now;
            out.push(Arc::new(next));
            hit = true;
        } else {
            out.push(Arc::clone(node));
        }
    }
    hit.then_some(out)
}

/// Dotted 1-based numbering of a section ("2.1.3"), computed from its path
/// from the root. Never stored; recompute after any structure change.
pub fn numbering(sections: &[Arc<SectionNode>], id: Uuid) -> Option<String> {
    fn walk(sections: &[Arc<SectionNode>], id: Uuid, path: &mut Vec<usize>) -> bool {
        for (i, node) in sections.iter().enumerate() {
            path.push(i + 1);
            if node.id == id || walk(&node.children, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = Vec::new();
    walk(sections, id, &mut path).then(|| {
        path.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    })
}

/// Total number of sections in the forest.
pub fn count(sections: &[Arc<SectionNode>]) -> usize {
    sections
        .iter()
        .map(|node| 1 + count(&node.children))
        .sum()
}

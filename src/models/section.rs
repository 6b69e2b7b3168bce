use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One addressable node in a project's outline tree.
///
/// A section may hold free-text content, a diagram description, an image
/// reference, or tabular data; the `content` string is opaque to this crate
/// and is interpreted only by editor clients. What a section *is* (its
/// [`Kind`]) is derived from its name, never stored: renaming a section can
/// change its effective kind.
///
/// Children are `Arc`-shared. Structural edits rebuild only the path from the
/// root to the touched node and carry every untouched subtree over by
/// pointer, so consumers can detect unchanged branches with `Arc::ptr_eq`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionNode {
    pub id: Uuid,
    /// Display label; also encodes the section kind via a prefix convention.
    pub name: String,
    /// Generation instruction passed to the external generator.
    pub prompt: String,
    /// Opaque payload: markdown, diagram description, or image reference.
    pub content: String,
    /// Set only when content generation completes, never by structural edits.
    pub last_generated_at: Option<DateTime<Utc>>,
    /// Refreshed on any mutation touching this node or a descendant.
    pub updated_at: DateTime<Utc>,
    /// Ordered: position is display and numbering order.
    pub children: Vec<Arc<SectionNode>>,
}

impl SectionNode {
    /// Create an empty section with a fresh id.
    pub fn new(name: impl Into<String>, prompt: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            prompt: prompt.into(),
            content: String::new(),
            last_generated_at: None,
            updated_at: now,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> Kind {
        Kind::classify(&self.name)
    }
}

/// The derived classification of a section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Plain,
    Diagram,
    Flowchart,
    Figure,
    Table,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Diagram => "diagram",
            Self::Flowchart => "flowchart",
            Self::Figure => "figure",
            Self::Table => "table",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "plain" => Some(Self::Plain),
            "diagram" => Some(Self::Diagram),
            "flowchart" => Some(Self::Flowchart),
            "figure" => Some(Self::Figure),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    /// Classify a section name by its prefix.
    ///
    /// Checked in a fixed priority order: a name could loosely match more
    /// than one convention, and the first match wins.
    pub fn classify(name: &str) -> Kind {
        const PREFIXES: [(&str, Kind); 4] = [
            ("diagram", Kind::Diagram),
            ("flowchart", Kind::Flowchart),
            ("figure", Kind::Figure),
            ("table", Kind::Table),
        ];
        for (keyword, kind) in PREFIXES {
            if has_kind_prefix(name, keyword) {
                return kind;
            }
        }
        Kind::Plain
    }
}

/// True if `name` starts with `keyword` (case-insensitive), followed by an
/// optional number and a colon: "Diagram:", "Figure 3:", "flowchart 2:".
fn has_kind_prefix(name: &str, keyword: &str) -> bool {
    let trimmed = name.trim_start();
    let Some(head) = trimmed.get(..keyword.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(keyword) {
        return false;
    }
    let rest = trimmed[keyword.len()..]
        .trim_start()
        .trim_start_matches(|c: char| c.is_ascii_digit());
    rest.trim_start().starts_with(':')
}

/// Strip a recognized kind prefix from a section name, leaving the title.
///
/// Names without a recognized prefix are returned trimmed but otherwise
/// untouched.
pub fn strip_kind_prefix(name: &str) -> &str {
    if Kind::classify(name) == Kind::Plain {
        return name.trim();
    }
    match name.split_once(':') {
        Some((_, title)) => title.trim(),
        None => name.trim(),
    }
}

/// A partial edit to a single section. `id` and `children` are deliberately
/// not patchable; structure changes go through insert/delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionPatch {
    pub name: Option<String>,
    pub prompt: Option<String>,
    pub content: Option<String>,
    pub last_generated_at: Option<DateTime<Utc>>,
}

impl SectionPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.prompt.is_none()
            && self.content.is_none()
            && self.last_generated_at.is_none()
    }
}

/// Input for inserting a new section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSectionInput {
    /// Parent section id. `None` inserts at the root level.
    pub parent_id: Option<Uuid>,
    pub name: String,
    /// Generation prompt. Defaults to the kind-specific template when absent.
    pub prompt: Option<String>,
    /// Position among siblings. Defaults to appending.
    pub position: Option<usize>,
}

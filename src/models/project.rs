use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::section::SectionNode;

/// A project: one outline document and the metadata used to generate it.
///
/// The project is the single unit of mutation: there is no per-section
/// locking. `sections` is the root-level ordered list of the outline tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    /// Free text used to seed outline and content generation.
    pub context: String,
    pub team: Option<String>,
    pub institution: Option<String>,
    pub settings: GenerationSettings,
    pub sections: Vec<Arc<SectionNode>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// The depth limit to enforce on incoming outlines, or `None` when the
    /// project's generation is unconstrained.
    pub fn depth_limit(&self) -> Option<usize> {
        self.settings.constrained.then_some(self.settings.max_depth)
    }
}

/// Structural hints applied when generating or importing an outline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Minimum number of root sections the generator is asked to produce.
    pub min_sections: u32,
    /// Maximum nesting depth; root sections sit at depth 0.
    pub max_depth: usize,
    /// When false, the depth limit is a hint only and is not enforced.
    pub constrained: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            min_sections: 5,
            max_depth: 2,
            constrained: true,
        }
    }
}

/// Input for creating a new project. Projects start with no sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub title: String,
    #[serde(default)]
    pub context: Option<String>,
    pub team: Option<String>,
    pub institution: Option<String>,
    /// Defaults to [`GenerationSettings::default`] if not specified.
    pub settings: Option<GenerationSettings>,
}

/// Input for updating project metadata. All fields are optional for partial
/// updates; sections are edited through the section operations instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub context: Option<String>,
    pub team: Option<String>,
    pub institution: Option<String>,
    pub settings: Option<GenerationSettings>,
}

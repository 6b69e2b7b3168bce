use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{strip_kind_prefix, Kind, OutlineNode, Project, SectionNode};

/// Convert a validated outline into a fresh section forest for `project`.
///
/// Every node gets a newly minted id; this is the only place section ids
/// are created, and ids from the sections being replaced are never reused.
/// Content starts empty; the default prompt is derived from the node's kind.
///
/// For constrained projects, children of nodes at or beyond the configured
/// depth limit are dropped with a warning. Validated outlines cannot reach
/// this cutoff (the validator rejects them first); it exists for payloads
/// that legitimately skip depth validation in unconstrained mode.
pub fn convert(outline: &[OutlineNode], project: &Project) -> Vec<Arc<SectionNode>> {
    let now = Utc::now();
    convert_level(outline, project, 0, now)
}

fn convert_level(
    nodes: &[OutlineNode],
    project: &Project,
    depth: usize,
    now: DateTime<Utc>,
) -> Vec<Arc<SectionNode>> {
    nodes
        .iter()
        .map(|node| {
            let children = if node.children.is_empty() {
                Vec::new()
            } else if project.settings.constrained && depth >= project.settings.max_depth {
                tracing::warn!(
                    section = %node.name,
                    depth,
                    max_depth = project.settings.max_depth,
                    "dropping outline children beyond the depth limit"
                );
                Vec::new()
            } else {
                convert_level(&node.children, project, depth + 1, now)
            };

            Arc::new(SectionNode {
                id: Uuid::new_v4(),
                name: node.name.clone(),
                prompt: default_prompt(&node.name, project),
                content: String::new(),
                last_generated_at: None,
                updated_at: now,
                children,
            })
        })
        .collect()
}

/// The default generation prompt for a section, chosen by its kind.
///
/// Plain sections embed the project title and context so generated prose
/// stays on topic; the visual kinds only need their own title.
pub fn default_prompt(name: &str, project: &Project) -> String {
    let title = strip_kind_prefix(name);
    match Kind::classify(name) {
        Kind::Plain => format!(
            "Write the \"{title}\" section of the document \"{doc}\". \
             Document context: {context}. Use clear, well-structured markdown.",
            doc = project.title,
            context = project.context,
        ),
        Kind::Diagram => format!(
            "Describe a diagram titled \"{title}\": name the components, the \
             connections between them, and the labels on each connection."
        ),
        Kind::Flowchart => format!(
            "Describe a flowchart titled \"{title}\": list the steps, the \
             decision points, and the transitions between them in order."
        ),
        Kind::Figure => format!(
            "Describe the figure \"{title}\" precisely enough that an \
             illustrator could produce the image."
        ),
        Kind::Table => format!(
            "Lay out the table \"{title}\" as markdown, with column headers \
             and representative rows."
        ),
    }
}

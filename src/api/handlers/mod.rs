use std::collections::hash_map::Entry;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::api::AppState;
use crate::editor::Editor;
use crate::generate::{ContentRequest, OutlineRequest};
use crate::models::*;
use crate::outline;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn project_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Project not found".to_string())
}

fn section_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Section not found".to_string())
}

/// Run `f` against the project's editor session, opening one from the store
/// on first touch. All editor operations are synchronous, so the session
/// lock is never held across an await point.
fn with_editor<T>(
    state: &AppState,
    project_id: Uuid,
    f: impl FnOnce(&mut Editor) -> Result<T, (StatusCode, String)>,
) -> Result<T, (StatusCode, String)> {
    let mut editors = state.editors.lock().expect("editor lock poisoned");
    let editor = match editors.entry(project_id) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let editor = Editor::open(state.store.clone(), project_id)
                .map_err(internal_error)?
                .ok_or_else(project_not_found)?;
            entry.insert(editor)
        }
    };
    f(editor)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, (StatusCode, String)> {
    state
        .store
        .get_all_projects()
        .map(Json)
        .map_err(internal_error)
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), (StatusCode, String)> {
    state
        .store
        .create_project(input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, (StatusCode, String)> {
    with_editor(&state, id, |editor| Ok(Json(editor.project().clone())))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, (StatusCode, String)> {
    with_editor(&state, id, |editor| {
        editor
            .update_meta(input)
            .map(|p| Json(p.clone()))
            .map_err(internal_error)
    })
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .editors
        .lock()
        .expect("editor lock poisoned")
        .remove(&id);

    if state.store.delete_project(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(project_not_found())
    }
}

// ============================================================
// Sections
// ============================================================

pub async fn create_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateSectionInput>,
) -> Result<(StatusCode, Json<Arc<SectionNode>>), (StatusCode, String)> {
    with_editor(&state, id, |editor| {
        editor
            .insert_section(input)
            .map_err(internal_error)?
            .map(|section| (StatusCode::CREATED, Json(section)))
            .ok_or((
                StatusCode::NOT_FOUND,
                "Parent section not found".to_string(),
            ))
    })
}

pub async fn get_section(
    State(state): State<AppState>,
    Path((id, sid)): Path<(Uuid, Uuid)>,
) -> Result<Json<Arc<SectionNode>>, (StatusCode, String)> {
    with_editor(&state, id, |editor| {
        editor
            .find_section(sid)
            .map(Json)
            .ok_or_else(section_not_found)
    })
}

/// Query parameters for section updates.
#[derive(Debug, Deserialize)]
pub struct UpdateSectionQuery {
    /// `false` marks a live keystroke edit: the current history slot is
    /// rewritten in place and no new snapshot is created. Defaults to true.
    pub commit: Option<bool>,
}

pub async fn update_section(
    State(state): State<AppState>,
    Path((id, sid)): Path<(Uuid, Uuid)>,
    Query(query): Query<UpdateSectionQuery>,
    Json(patch): Json<SectionPatch>,
) -> Result<Json<Arc<SectionNode>>, (StatusCode, String)> {
    let commit = query.commit.unwrap_or(true);
    with_editor(&state, id, |editor| {
        editor
            .update_section(sid, &patch, commit)
            .map_err(internal_error)?
            .map(Json)
            .ok_or_else(section_not_found)
    })
}

pub async fn delete_section(
    State(state): State<AppState>,
    Path((id, sid)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, String)> {
    with_editor(&state, id, |editor| {
        if editor.delete_section(sid).map_err(internal_error)? {
            Ok(StatusCode::NO_CONTENT)
        } else {
            Err(section_not_found())
        }
    })
}

#[derive(Debug, Serialize)]
pub struct NumberingResponse {
    /// Dotted 1-based position, e.g. "2.1.3".
    pub numbering: String,
}

pub async fn get_numbering(
    State(state): State<AppState>,
    Path((id, sid)): Path<(Uuid, Uuid)>,
) -> Result<Json<NumberingResponse>, (StatusCode, String)> {
    with_editor(&state, id, |editor| {
        editor
            .numbering(sid)
            .map(|numbering| Json(NumberingResponse { numbering }))
            .ok_or_else(section_not_found)
    })
}

// ============================================================
// Outline import and generation
// ============================================================

pub async fn apply_outline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(raw): Json<Value>,
) -> Result<Json<Project>, (StatusCode, String)> {
    with_editor(&state, id, |editor| {
        let validated = outline::validate(&raw, editor.project().depth_limit())
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
        let project = editor.replace_outline(&validated).map_err(internal_error)?;
        Ok(Json(project.clone()))
    })
}

pub async fn generate_outline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, (StatusCode, String)> {
    let Some(generator) = state.generator.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "No generator is configured".to_string(),
        ));
    };

    let request = with_editor(&state, id, |editor| {
        let project = editor.project();
        Ok(OutlineRequest {
            title: project.title.clone(),
            context: project.context.clone(),
            min_sections: project.settings.min_sections,
            max_depth: project.depth_limit(),
        })
    })?;

    // The generator call happens outside the session lock.
    let payload = generator
        .generate_outline(&request)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    with_editor(&state, id, |editor| {
        let validated = outline::validate(&payload, editor.project().depth_limit())
            .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
        let project = editor.replace_outline(&validated).map_err(internal_error)?;
        Ok(Json(project.clone()))
    })
}

pub async fn generate_section_content(
    State(state): State<AppState>,
    Path((id, sid)): Path<(Uuid, Uuid)>,
) -> Result<Json<Arc<SectionNode>>, (StatusCode, String)> {
    let Some(generator) = state.generator.clone() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "No generator is configured".to_string(),
        ));
    };

    let request = with_editor(&state, id, |editor| {
        let section = editor.find_section(sid).ok_or_else(section_not_found)?;
        Ok(ContentRequest {
            kind: section.kind(),
            prompt: section.prompt.clone(),
        })
    })?;

    let content = generator
        .generate_content(&request)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    with_editor(&state, id, |editor| {
        editor
            .set_generated_content(sid, content)
            .map_err(internal_error)?
            .map(Json)
            .ok_or_else(section_not_found)
    })
}

// ============================================================
// Undo
// ============================================================

#[derive(Debug, Serialize)]
pub struct UndoResponse {
    /// False means there was nothing to undo; the project is unchanged.
    pub restored: bool,
}

pub async fn undo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UndoResponse>, (StatusCode, String)> {
    with_editor(&state, id, |editor| {
        editor
            .undo()
            .map(|restored| Json(UndoResponse { restored }))
            .map_err(internal_error)
    })
}

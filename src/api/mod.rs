mod handlers;
pub mod middleware;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::editor::Editor;
use crate::generate::GeneratorClient;
use crate::store::Store;
use middleware::SecurityConfig;

/// Shared state behind every handler.
///
/// Open editor sessions live in one map behind one mutex: the project is the
/// unit of mutation and all core operations are synchronous, so a single
/// lock serializes editing without any per-section locking.
#[derive(Clone)]
pub struct AppState {
    store: Store,
    editors: Arc<Mutex<HashMap<Uuid, Editor>>>,
    generator: Option<GeneratorClient>,
}

impl AppState {
    pub fn new(store: Store, generator: Option<GeneratorClient>) -> Self {
        Self {
            store,
            editors: Arc::new(Mutex::new(HashMap::new())),
            generator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    create_router_with_security(state, SecurityConfig::from_env())
}

pub fn create_router_with_security(state: AppState, security: SecurityConfig) -> Router {
    let mut api = Router::new()
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route("/projects", post(handlers::create_project))
        .route("/projects/{id}", get(handlers::get_project))
        .route("/projects/{id}", put(handlers::update_project))
        .route("/projects/{id}", delete(handlers::delete_project))
        // Sections
        .route("/projects/{id}/sections", post(handlers::create_section))
        .route("/projects/{id}/sections/{sid}", get(handlers::get_section))
        .route("/projects/{id}/sections/{sid}", put(handlers::update_section))
        .route("/projects/{id}/sections/{sid}", delete(handlers::delete_section))
        .route(
            "/projects/{id}/sections/{sid}/numbering",
            get(handlers::get_numbering),
        )
        // Outline import and generation
        .route("/projects/{id}/outline", post(handlers::apply_outline))
        .route(
            "/projects/{id}/outline/generate",
            post(handlers::generate_outline),
        )
        .route(
            "/projects/{id}/sections/{sid}/generate",
            post(handlers::generate_section_content),
        )
        // Undo
        .route("/projects/{id}/undo", post(handlers::undo))
        // Health
        .route("/health", get(handlers::health))
        .with_state(state);

    if let Some(limiter) = security.rate_limiter.clone() {
        api = api.layer(from_fn_with_state(limiter, middleware::rate_limit_middleware));
    }
    if security.api_key.is_some() {
        api = api.layer(from_fn_with_state(security, middleware::auth_middleware));
    }

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

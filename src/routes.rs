// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::SESSION_HEADER,
    handlers::{draft, exam, status},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Draft routes: compose the exam and manage staged questions.
/// * Exam routes: save a draft, read a saved exam back.
/// * Status routes: health, diagnostics, catalogue.
/// * Applies global middleware (Trace, CORS) and injects the shared state.
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(SESSION_HEADER),
        ]);

    let draft_routes = Router::new()
        .route("/", get(draft::get_draft))
        .route("/header", patch(draft::update_header))
        .route(
            "/scratch",
            patch(draft::update_scratch).delete(draft::clear_scratch),
        )
        .route(
            "/questions",
            post(draft::add_question).delete(draft::clear_questions),
        )
        .route("/questions/duplicate", post(draft::duplicate_last_question))
        .route("/questions/swap", post(draft::swap_questions))
        .route("/questions/{index}", delete(draft::delete_question))
        .route("/questions/{index}/edit", post(draft::edit_question))
        .route("/restore", post(draft::restore_draft));

    let exam_routes = Router::new()
        .route("/", post(exam::save_exam))
        .route("/{id}", get(exam::get_exam));

    let status_routes = Router::new()
        .route("/api/health", get(status::health))
        .route("/api/status", get(status::session_status))
        .route("/api/catalog", get(status::catalog));

    Router::new()
        .nest("/api/draft", draft_routes)
        .nest("/api/exams", exam_routes)
        .merge(status_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

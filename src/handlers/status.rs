// src/handlers/status.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use super::session::DraftSession;
use crate::{
    config::{
        Config, DEFAULT_DURATION_MINUTES, EXAM_DATA_KEY, MAX_DURATION_MINUTES,
        MIN_DURATION_MINUTES, QUESTIONS_KEY, SESSION_HEADER, SUBJECTS,
    },
    db::Database,
    error::AppError,
    models::{exam::ExamType, localized::Language},
    state::AppState,
};

const PREVIEW_COUNT: usize = 3;
const PREVIEW_CHARS: usize = 50;

fn connection_message(ok: bool) -> &'static str {
    if ok {
        "Database connection successful!"
    } else {
        "Database connection failed!"
    }
}

/// Checks database connectivity.
pub async fn health(State(db): State<Database>) -> impl IntoResponse {
    let database = db.health_check().await;
    Json(json!({
        "database": database,
        "message": connection_message(database),
    }))
}

/// Diagnostics view: database connectivity plus a summary of the session's draft.
pub async fn session_status(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
) -> Result<impl IntoResponse, AppError> {
    let database = state.db.health_check().await;
    let draft = state.drafts.peek(&session);

    let total = draft.staged_questions.len();
    let preview: Vec<String> = draft
        .staged_questions
        .iter()
        .take(PREVIEW_COUNT)
        .map(|question| question.preview(PREVIEW_CHARS))
        .collect();

    Ok(Json(json!({
        "database": database,
        "message": connection_message(database),
        "exam_complete": draft.exam_header.is_complete(),
        "exam": draft.exam_header,
        "total_questions": total,
        "preview": preview,
        "more_questions": total.saturating_sub(PREVIEW_COUNT),
        "active_drafts": state.drafts.len(),
    })))
}

/// Choices and limits the composer offers.
pub async fn catalog(State(config): State<Config>) -> impl IntoResponse {
    let languages: Vec<_> = Language::ALL
        .iter()
        .map(|language| json!({ "code": language.code(), "name": language.name() }))
        .collect();
    let years: Vec<i32> = config.exam_years.clone().collect();

    Json(json!({
        "exam_types": ExamType::ALL,
        "subjects": SUBJECTS,
        "years": years,
        "default_year": config.default_exam_year(),
        "languages": languages,
        "duration": {
            "min": MIN_DURATION_MINUTES,
            "max": MAX_DURATION_MINUTES,
            "default": DEFAULT_DURATION_MINUTES,
        },
        "storage_keys": {
            "exam": EXAM_DATA_KEY,
            "questions": QUESTIONS_KEY,
        },
        "session_header": SESSION_HEADER,
    }))
}

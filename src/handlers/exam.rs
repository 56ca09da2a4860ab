// src/handlers/exam.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use uuid::Uuid;

use super::session::{DraftResponse, DraftSession};
use crate::{
    db::Database,
    draft::{ClientStorage, clear_external_store},
    error::AppError,
    save,
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct SaveExamResponse {
    pub exam_id: Uuid,
    #[serde(flatten)]
    pub cycle: DraftResponse,
}

/// Saves the session's draft as an exam.
///
/// * Rejects drafts missing subject, type, year or questions, or with
///   out-of-range values.
/// * Writes the exam and all questions in one transaction.
/// * While the transaction runs, edits and a second save of the draft get 409.
/// * On success starts a fresh draft and tells the client to blank its stored copy.
/// * On failure the draft is left exactly as it was.
pub async fn save_exam(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
) -> Result<impl IntoResponse, AppError> {
    // The draft lock is not held while the transaction runs; the guard keeps
    // the draft frozen instead.
    let (draft, guard) = state.drafts.begin_save(&session)?;

    let exam_id = save::save_exam(
        &state.db,
        &draft.exam_header,
        &draft.staged_questions,
        &state.config.exam_years,
    )
    .await?;

    let draft = guard.complete();
    let mut storage = ClientStorage::default();
    clear_external_store(&mut storage);

    let cycle = DraftResponse {
        draft,
        storage: storage.into_writes(),
        message: Some(format!("Exam saved successfully! Exam ID: {exam_id}")),
    };

    Ok((StatusCode::CREATED, Json(SaveExamResponse { exam_id, cycle })))
}

/// Returns a saved exam with its questions.
pub async fn get_exam(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let exam = db
        .load_exam(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load exam {}: {:?}", id, e);
            AppError::from(e)
        })?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

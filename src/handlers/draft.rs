// src/handlers/draft.rs

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use super::session::{DraftSession, render_cycle, render_view};
use crate::{
    draft::{ClientStorage, RestoreOutcome},
    error::AppError,
    models::{exam::HeaderPatch, question::QuestionPatch},
    state::AppState,
};

/// Returns the session's draft, creating an empty one on first visit.
pub async fn get_draft(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
) -> impl IntoResponse {
    render_view(&state, &session)
}

/// Updates exam metadata. The title is re-derived, never taken from the client.
pub async fn update_header(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
    Json(payload): Json<HeaderPatch>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload
        .subject
        .as_deref()
        .is_some_and(|subject| subject.trim().is_empty())
    {
        return Err(AppError::BadRequest("Subject cannot be blank".to_string()));
    }

    if let Some(year) = payload.year {
        if !state.config.year_in_range(year) {
            let years = &state.config.exam_years;
            return Err(AppError::BadRequest(format!(
                "Year must be between {} and {}",
                years.start(),
                years.end()
            )));
        }
    }

    render_cycle(&state, &session, |draft| {
        draft.update_header(payload);
        Ok(None)
    })
}

/// Merges form input into the question being composed.
pub async fn update_scratch(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
    Json(payload): Json<QuestionPatch>,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        draft.update_scratch(payload);
        Ok(None)
    })
}

/// Empties the composition form.
pub async fn clear_scratch(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        draft.reset_scratch();
        Ok(Some("Form cleared".to_string()))
    })
}

/// Submits the composition form: merges the submitted fields, then stages
/// the question if it passes validation.
///
/// On validation failure every problem is reported and the form keeps its input.
pub async fn add_question(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
    Json(payload): Json<QuestionPatch>,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        draft.update_scratch(payload);
        let total = draft.stage_question()?;
        Ok(Some(format!(
            "Question {total} added successfully! Total questions: {total}"
        )))
    })
}

/// Removes a staged question (0-based index).
pub async fn delete_question(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        draft.unstage_question(index)?;
        Ok(Some(format!("Question {} deleted!", index + 1)))
    })
}

/// Moves a staged question back into the composition form for editing.
pub async fn edit_question(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        draft.edit_question(index)?;
        Ok(Some(format!("Question {} moved to edit form!", index + 1)))
    })
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub first: usize,
    pub second: usize,
}

/// Swaps two staged questions. Indices outside the list are ignored.
pub async fn swap_questions(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
    Json(payload): Json<SwapRequest>,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        let swapped = draft.reorder(payload.first, payload.second);
        Ok(swapped.then(|| "Question order updated".to_string()))
    })
}

pub async fn duplicate_last_question(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        let message = if draft.duplicate_last() {
            "Last question duplicated!"
        } else {
            "No questions to duplicate"
        };
        Ok(Some(message.to_string()))
    })
}

pub async fn clear_questions(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
) -> Result<impl IntoResponse, AppError> {
    render_cycle(&state, &session, |draft| {
        draft.clear_all_questions();
        Ok(Some("All questions cleared!".to_string()))
    })
}

/// Restores the draft from the client's local storage.
///
/// The body carries the stored values by key, e.g.
/// `{"preptab_exam_data": "{...}", "preptab_questions": "[...]"}`; missing or
/// `null` values count as nothing stored.
pub async fn restore_draft(
    State(state): State<AppState>,
    DraftSession(session): DraftSession,
    Json(payload): Json<HashMap<String, Option<String>>>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = payload
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect();
    let storage = ClientStorage::from_snapshot(snapshot);

    render_cycle(&state, &session, |draft| {
        let message = match draft.restore_from_external_store(&storage, &state.config.exam_years) {
            RestoreOutcome::Restored => "Draft restored from browser storage",
            RestoreOutcome::Unchanged => "Draft is already up to date",
            RestoreOutcome::NotRestored => "No saved draft found",
        };
        Ok(Some(message.to_string()))
    })
}

// src/handlers/session.rs

use std::collections::BTreeMap;

use axum::{Json, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use crate::{
    config::SESSION_HEADER,
    draft::{ClientStorage, DraftError, DraftState},
    error::AppError,
    state::AppState,
};

const MAX_SESSION_ID_LEN: usize = 128;

/// Id of the draft a request works on, taken from the `x-draft-session` header.
#[derive(Debug, Clone)]
pub struct DraftSession(pub String);

impl<S> FromRequestParts<S> for DraftSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if id.is_empty() || id.len() > MAX_SESSION_ID_LEN {
            return Err(AppError::BadRequest(format!(
                "Missing or invalid {SESSION_HEADER} header"
            )));
        }

        Ok(Self(id.to_string()))
    }
}

/// Body returned by every draft route.
#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub draft: DraftState,

    /// Client storage writes the client should apply, by key.
    pub storage: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Returns the session's draft as it is, creating it on first visit.
pub fn render_view(state: &AppState, session: &str) -> Json<DraftResponse> {
    state.drafts.with_draft(session, |draft| {
        Json(DraftResponse {
            draft: draft.clone(),
            storage: BTreeMap::new(),
            message: None,
        })
    })
}

/// Runs one request against the session's draft: applies `edit`, then
/// mirrors the draft if the edit changed anything worth keeping.
/// Drafts being saved refuse edits.
pub fn render_cycle(
    state: &AppState,
    session: &str,
    edit: impl FnOnce(&mut DraftState) -> Result<Option<String>, AppError>,
) -> Result<Json<DraftResponse>, AppError> {
    state.drafts.with_draft(session, |draft| {
        if draft.is_saving() {
            return Err(DraftError::SaveInProgress.into());
        }
        let message = edit(draft)?;

        let mut storage = ClientStorage::default();
        draft.flush_mirror(&mut storage);

        Ok(Json(DraftResponse {
            draft: draft.clone(),
            storage: storage.into_writes(),
            message,
        }))
    })
}

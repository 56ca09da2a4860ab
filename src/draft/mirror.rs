// src/draft/mirror.rs

use std::{
    collections::{BTreeMap, HashMap},
    ops::RangeInclusive,
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use super::DraftState;
use crate::{
    config::{EXAM_DATA_KEY, QUESTIONS_KEY},
    models::{exam::ExamHeader, question::QuestionDraft},
    validation::{check_header_bounds, messages},
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("client storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
enum MirrorError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid draft JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value storage living on the client (browser local storage).
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Client storage as seen during one request: the values the client sent
/// along, plus the writes the client should apply when the response arrives.
#[derive(Debug, Clone, Default)]
pub struct ClientStorage {
    snapshot: HashMap<String, String>,
    writes: BTreeMap<String, String>,
}

impl ClientStorage {
    pub fn from_snapshot(snapshot: HashMap<String, String>) -> Self {
        Self {
            snapshot,
            writes: BTreeMap::new(),
        }
    }

    pub fn writes(&self) -> &BTreeMap<String, String> {
        &self.writes
    }

    pub fn into_writes(self) -> BTreeMap<String, String> {
        self.writes
    }
}

impl KeyValueStore for ClientStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .writes
            .get(key)
            .or_else(|| self.snapshot.get(key))
            .cloned())
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.writes.insert(key.to_string(), value);
        Ok(())
    }
}

/// What a restore attempt did to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreOutcome {
    /// At least one slot was replaced with the stored copy.
    Restored,
    /// The stored copy matched what was already in memory.
    Unchanged,
    /// Nothing usable was stored.
    NotRestored,
}

impl DraftState {
    /// Writes the header and staged questions to client storage.
    /// Failures are logged and otherwise ignored: losing the mirror only
    /// loses draft recovery. Returns whether both writes went through.
    pub fn mirror_to_external_store(&mut self, store: &mut impl KeyValueStore) -> bool {
        self.needs_mirror = false;

        let result = write_json(store, EXAM_DATA_KEY, &self.exam_header)
            .and_then(|()| write_json(store, QUESTIONS_KEY, &self.staged_questions));

        match result {
            Ok(()) => {
                tracing::debug!(
                    questions = self.staged_questions.len(),
                    "Draft mirrored to client storage"
                );
                true
            }
            Err(e) => {
                tracing::warn!("Failed to mirror draft to client storage: {}", e);
                false
            }
        }
    }

    /// Mirrors the draft if anything changed since the last mirror.
    /// Called once at the end of every request.
    pub fn flush_mirror(&mut self, store: &mut impl KeyValueStore) -> bool {
        self.needs_mirror && self.mirror_to_external_store(store)
    }

    /// Reads the mirrored header and questions back from client storage.
    ///
    /// Each key is handled on its own. A stored value only replaces the
    /// in-memory slot when it differs from it. Unreadable or undecodable
    /// values leave the slot untouched, and so does a header whose year,
    /// duration or subject is out of bounds.
    pub fn restore_from_external_store(
        &mut self,
        store: &impl KeyValueStore,
        years: &RangeInclusive<i32>,
    ) -> RestoreOutcome {
        let mut decoded_any = false;
        let mut replaced_any = false;

        match read_json::<ExamHeader>(store, EXAM_DATA_KEY) {
            Ok(Some(mut header)) => {
                let issues = check_header_bounds(&header, years);
                if issues.is_empty() {
                    decoded_any = true;
                    header.refresh_title();
                    if header != self.exam_header {
                        self.exam_header = header;
                        replaced_any = true;
                    }
                } else {
                    tracing::warn!("Ignoring stored exam header: {:?}", messages(&issues));
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring stored exam header: {}", e),
        }

        match read_json::<Vec<QuestionDraft>>(store, QUESTIONS_KEY) {
            Ok(Some(questions)) => {
                decoded_any = true;
                if questions != self.staged_questions {
                    self.staged_questions = questions;
                    replaced_any = true;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring stored questions: {}", e),
        }

        match (decoded_any, replaced_any) {
            (_, true) => RestoreOutcome::Restored,
            (true, false) => RestoreOutcome::Unchanged,
            (false, false) => RestoreOutcome::NotRestored,
        }
    }
}

/// Blanks both mirror keys, so a reload starts from an empty draft.
pub fn clear_external_store(store: &mut impl KeyValueStore) {
    for key in [EXAM_DATA_KEY, QUESTIONS_KEY] {
        if let Err(e) = store.set_item(key, String::new()) {
            tracing::warn!("Failed to clear {} in client storage: {}", key, e);
        }
    }
}

fn write_json<T: Serialize>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), MirrorError> {
    let json = serde_json::to_string(value)?;
    store.set_item(key, json)?;
    Ok(())
}

/// Absent, blank and literal `null` values all mean nothing is stored.
fn read_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, MirrorError> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(raw)?))
}

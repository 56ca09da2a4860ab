// src/draft/registry.rs

use std::{
    collections::HashMap,
    ops::RangeInclusive,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use super::{DraftError, DraftState};
use crate::config::{Config, default_exam_year};

struct Entry {
    draft: DraftState,
    last_used: Instant,
}

/// Drafts of all connected clients, keyed by session id.
///
/// Drafts are only touched under the lock for synchronous edits; the lock is
/// never held across a database call. Idle drafts expire, and the number of
/// drafts is capped.
#[derive(Clone)]
pub struct DraftRegistry {
    drafts: Arc<Mutex<HashMap<String, Entry>>>,
    exam_years: RangeInclusive<i32>,
    idle_timeout: Duration,
    max_drafts: usize,
}

impl DraftRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            drafts: Arc::new(Mutex::new(HashMap::new())),
            exam_years: config.exam_years.clone(),
            idle_timeout: config.draft_idle_timeout,
            max_drafts: config.max_drafts,
        }
    }

    /// Year preselected in a fresh draft. Read from the clock on every call.
    pub fn default_year(&self) -> i32 {
        default_exam_year(&self.exam_years)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the session's draft, creating the draft on first use.
    pub fn with_draft<T>(&self, session: &str, f: impl FnOnce(&mut DraftState) -> T) -> T {
        let mut drafts = self.lock();
        let now = Instant::now();

        if !drafts.contains_key(session) {
            self.make_room(&mut drafts, now);
        }

        let entry = drafts.entry(session.to_string()).or_insert_with(|| Entry {
            draft: DraftState::new(self.default_year()),
            last_used: now,
        });
        entry.last_used = now;
        f(&mut entry.draft)
    }

    /// A copy of the session's draft, or a fresh draft when the session has
    /// none. Never creates or touches a draft.
    pub fn peek(&self, session: &str) -> DraftState {
        self.lock()
            .get(session)
            .map(|entry| entry.draft.clone())
            .unwrap_or_else(|| DraftState::new(self.default_year()))
    }

    /// Marks the session's draft as being saved and returns the copy to save.
    ///
    /// Until the guard is completed or dropped, edits and further saves of
    /// this draft are refused.
    pub fn begin_save(&self, session: &str) -> Result<(DraftState, SaveGuard), DraftError> {
        let draft = self.with_draft(session, DraftState::begin_save)?;
        let guard = SaveGuard {
            registry: self.clone(),
            session: session.to_string(),
            completed: false,
        };
        Ok((draft, guard))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops expired drafts, then the least recently used one if still full.
    /// Drafts being saved are kept.
    fn make_room(&self, drafts: &mut HashMap<String, Entry>, now: Instant) {
        drafts.retain(|_, entry| {
            entry.draft.is_saving() || now.duration_since(entry.last_used) < self.idle_timeout
        });

        if drafts.len() < self.max_drafts {
            return;
        }

        let oldest = drafts
            .iter()
            .filter(|(_, entry)| !entry.draft.is_saving())
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(session, _)| session.clone());
        if let Some(session) = oldest {
            tracing::debug!(%session, "Draft limit reached, evicting least recently used draft");
            drafts.remove(&session);
        }
    }
}

/// Holds a draft's saving mark. Dropping it without [`SaveGuard::complete`]
/// releases the draft for editing again.
pub struct SaveGuard {
    registry: DraftRegistry,
    session: String,
    completed: bool,
}

impl SaveGuard {
    /// Discards the saved draft and returns the fresh one the session starts over with.
    pub fn complete(mut self) -> DraftState {
        self.completed = true;
        self.registry.lock().remove(&self.session);
        DraftState::new(self.registry.default_year())
    }
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        if let Some(entry) = self.registry.lock().get_mut(&self.session) {
            entry.draft.end_save();
        }
    }
}

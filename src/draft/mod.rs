// src/draft/mod.rs

//! In-progress exam being composed: the header, the questions staged so far
//! and the question currently being filled in.
//!
//! Every mutation that changes what client storage should hold sets the
//! `needs_mirror` flag; [`DraftState::flush_mirror`] writes the mirror once
//! at the end of a request.

pub mod mirror;
pub mod registry;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    models::{
        exam::{ExamHeader, HeaderPatch},
        question::{QuestionDraft, QuestionPatch},
    },
    validation::{QuestionIssue, validate_question},
};

pub use mirror::{ClientStorage, KeyValueStore, RestoreOutcome, StorageError, clear_external_store};
pub use registry::{DraftRegistry, SaveGuard};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("question index {index} is out of range ({len} staged)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("question is incomplete")]
    InvalidQuestion(Vec<QuestionIssue>),

    #[error("this draft is being saved")]
    SaveInProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    pub exam_header: ExamHeader,
    pub staged_questions: Vec<QuestionDraft>,
    pub scratch_question: QuestionDraft,

    #[serde(skip)]
    needs_mirror: bool,

    #[serde(skip)]
    saving: bool,
}

impl DraftState {
    pub fn new(default_year: i32) -> Self {
        Self {
            exam_header: ExamHeader::new(default_year),
            staged_questions: Vec::new(),
            scratch_question: QuestionDraft::default(),
            needs_mirror: false,
            saving: false,
        }
    }

    /// Starts over with a fresh header and no questions.
    pub fn reset(&mut self, default_year: i32) {
        *self = Self::new(default_year);
    }

    pub fn needs_mirror(&self) -> bool {
        self.needs_mirror
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Marks the draft as being saved and returns the copy to save.
    pub fn begin_save(&mut self) -> Result<DraftState, DraftError> {
        if self.saving {
            return Err(DraftError::SaveInProgress);
        }
        self.saving = true;
        Ok(self.clone())
    }

    pub fn end_save(&mut self) {
        self.saving = false;
    }

    fn mark_dirty(&mut self) {
        self.needs_mirror = true;
    }

    /// Merges the given fields into the header and re-derives the title.
    pub fn update_header(&mut self, patch: HeaderPatch) {
        self.exam_header.apply(patch);
        self.mark_dirty();
    }

    /// Merges form input into the question being composed.
    /// The composition form is not mirrored, so this does not mark the draft dirty.
    pub fn update_scratch(&mut self, patch: QuestionPatch) {
        self.scratch_question.apply(patch);
    }

    pub fn reset_scratch(&mut self) {
        self.scratch_question = QuestionDraft::default();
    }

    /// Validates the question being composed and, if acceptable, appends a
    /// copy of it to the staged list and clears the form.
    /// Returns the number of staged questions.
    pub fn stage_question(&mut self) -> Result<usize, DraftError> {
        let issues = validate_question(&self.scratch_question);
        if !issues.is_empty() {
            return Err(DraftError::InvalidQuestion(issues));
        }

        let question = std::mem::take(&mut self.scratch_question);
        self.staged_questions.push(question);
        self.mark_dirty();

        Ok(self.staged_questions.len())
    }

    /// Removes the staged question at `index`; later questions move up by one.
    pub fn unstage_question(&mut self, index: usize) -> Result<QuestionDraft, DraftError> {
        self.check_index(index)?;
        let removed = self.staged_questions.remove(index);
        self.mark_dirty();
        Ok(removed)
    }

    /// Moves the staged question at `index` back into the composition form.
    /// Whatever was in the form is replaced.
    pub fn edit_question(&mut self, index: usize) -> Result<(), DraftError> {
        let question = self.unstage_question(index)?;
        self.scratch_question = question;
        Ok(())
    }

    /// Swaps two staged questions. Out-of-range indices leave the list as it
    /// is and return `false`.
    pub fn reorder(&mut self, index_a: usize, index_b: usize) -> bool {
        let len = self.staged_questions.len();
        if index_a >= len || index_b >= len {
            return false;
        }
        if index_a != index_b {
            self.staged_questions.swap(index_a, index_b);
            self.mark_dirty();
        }
        true
    }

    /// Appends a copy of the last staged question. Returns `false` when there
    /// is nothing to copy.
    pub fn duplicate_last(&mut self) -> bool {
        let Some(last) = self.staged_questions.last().cloned() else {
            return false;
        };
        self.staged_questions.push(last);
        self.mark_dirty();
        true
    }

    pub fn clear_all_questions(&mut self) {
        self.staged_questions.clear();
        self.mark_dirty();
    }

    fn check_index(&self, index: usize) -> Result<(), DraftError> {
        let len = self.staged_questions.len();
        if index >= len {
            return Err(DraftError::IndexOutOfRange { index, len });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        exam::ExamType,
        localized::{LocalizedText, LocalizedTextPatch},
        question::{AnswerKey, AnswerOptions},
    };

    fn question(text: &str) -> QuestionDraft {
        QuestionDraft {
            question: LocalizedText::english(text),
            options: AnswerOptions::new("1", "2", "3", "4"),
            answer: Some(AnswerKey::C),
            explanation: LocalizedText::english("Because."),
            verbose: LocalizedText::default(),
        }
    }

    fn draft_with(texts: &[&str]) -> DraftState {
        let mut draft = DraftState::new(2024);
        draft.staged_questions = texts.iter().map(|text| question(text)).collect();
        draft
    }

    fn texts(draft: &DraftState) -> Vec<&str> {
        draft
            .staged_questions
            .iter()
            .map(|q| q.question.en.as_str())
            .collect()
    }

    #[test]
    fn update_header_derives_title_and_marks_dirty() {
        let mut draft = DraftState::new(2024);
        assert!(!draft.needs_mirror());

        draft.update_header(HeaderPatch {
            exam_type: Some(ExamType::Jamb),
            subject: Some("Economics".to_string()),
            ..HeaderPatch::default()
        });

        assert_eq!(draft.exam_header.title, "JAMB Economics 2024");
        assert!(draft.needs_mirror());
    }

    #[test]
    fn staging_resets_the_form() {
        let mut draft = DraftState::new(2024);
        draft.scratch_question = question("First?");
        draft.scratch_question.verbose.ig = "Nkowa".to_string();

        let count = draft.stage_question().unwrap();

        assert_eq!(count, 1);
        assert_eq!(draft.scratch_question, QuestionDraft::default());
        assert_eq!(draft.staged_questions[0].question.en, "First?");
        assert_eq!(draft.staged_questions[0].verbose.ig, "Nkowa");
        assert!(draft.needs_mirror());
    }

    #[test]
    fn staged_copy_is_independent_of_the_form() {
        let mut draft = DraftState::new(2024);
        draft.scratch_question = question("Original?");
        draft.stage_question().unwrap();

        draft.update_scratch(QuestionPatch {
            question: Some(LocalizedTextPatch {
                en: Some("Changed?".to_string()),
                ..LocalizedTextPatch::default()
            }),
            ..QuestionPatch::default()
        });

        assert_eq!(draft.staged_questions[0].question.en, "Original?");
        assert_eq!(draft.scratch_question.question.en, "Changed?");
    }

    #[test]
    fn invalid_question_is_not_staged() {
        let mut draft = DraftState::new(2024);
        let mut incomplete = question("Half done?");
        incomplete.options.d.clear();
        draft.scratch_question = incomplete.clone();

        let err = draft.stage_question().unwrap_err();

        assert_eq!(
            err,
            DraftError::InvalidQuestion(vec![QuestionIssue::MissingOption(AnswerKey::D)])
        );
        assert!(draft.staged_questions.is_empty());
        assert_eq!(draft.scratch_question, incomplete);
        assert!(!draft.needs_mirror());
    }

    #[test]
    fn unstage_shifts_later_questions() {
        let mut draft = draft_with(&["one", "two", "three"]);

        let removed = draft.unstage_question(1).unwrap();

        assert_eq!(removed.question.en, "two");
        assert_eq!(texts(&draft), vec!["one", "three"]);
        assert!(draft.needs_mirror());
    }

    #[test]
    fn unstage_out_of_range_leaves_list_alone() {
        let mut draft = draft_with(&["one", "two"]);

        let err = draft.unstage_question(2).unwrap_err();

        assert_eq!(err, DraftError::IndexOutOfRange { index: 2, len: 2 });
        assert_eq!(texts(&draft), vec!["one", "two"]);
        assert!(!draft.needs_mirror());
    }

    #[test]
    fn edit_moves_question_into_the_form() {
        let mut draft = draft_with(&["one", "two"]);

        draft.edit_question(0).unwrap();

        assert_eq!(texts(&draft), vec!["two"]);
        assert_eq!(draft.scratch_question.question.en, "one");
        assert!(draft.edit_question(5).is_err());
    }

    #[test]
    fn reorder_swaps_entries() {
        let mut draft = draft_with(&["one", "two", "three"]);

        assert!(draft.reorder(0, 2));

        assert_eq!(texts(&draft), vec!["three", "two", "one"]);
        assert!(draft.needs_mirror());
    }

    #[test]
    fn reorder_out_of_range_is_a_silent_no_op() {
        let mut draft = draft_with(&["one", "two"]);

        assert!(!draft.reorder(0, 2));
        assert!(!draft.reorder(7, 1));

        assert_eq!(texts(&draft), vec!["one", "two"]);
        assert!(!draft.needs_mirror());
    }

    #[test]
    fn duplicate_last_copies_final_entry() {
        let mut draft = draft_with(&["one", "two"]);

        assert!(draft.duplicate_last());

        assert_eq!(texts(&draft), vec!["one", "two", "two"]);
    }

    #[test]
    fn duplicate_last_on_empty_list_is_a_no_op() {
        let mut draft = DraftState::new(2024);

        assert!(!draft.duplicate_last());

        assert!(draft.staged_questions.is_empty());
        assert!(!draft.needs_mirror());
    }

    #[test]
    fn clear_all_empties_the_list() {
        let mut draft = draft_with(&["one", "two"]);
        draft.clear_all_questions();
        assert!(draft.staged_questions.is_empty());
        assert!(draft.needs_mirror());
    }

    #[test]
    fn reset_returns_to_a_fresh_draft() {
        let mut draft = draft_with(&["one"]);
        draft.exam_header.subject = "Physics".to_string();
        draft.scratch_question = question("pending");

        draft.reset(2025);

        assert_eq!(draft, DraftState::new(2025));
    }

    #[test]
    fn second_save_is_refused_until_the_first_ends() {
        let mut draft = draft_with(&["a", "b"]);

        let copy = draft.begin_save().unwrap();
        assert_eq!(copy.staged_questions, draft.staged_questions);
        assert!(draft.is_saving());
        assert_eq!(draft.begin_save(), Err(DraftError::SaveInProgress));

        draft.end_save();
        assert!(draft.begin_save().is_ok());
    }
}

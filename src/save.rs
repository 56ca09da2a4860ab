// src/save.rs

//! Turns a finished draft into one exam row and its question rows, all in a
//! single transaction.

use std::ops::RangeInclusive;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::{ExamStore, StoreError, StoreSession},
    models::{
        exam::{ExamHeader, NewExam},
        question::{NewQuestion, QuestionDraft},
    },
    validation::{QuestionIssue, ReadinessIssue, check_exam_ready, validate_question},
};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("exam is not ready to be saved")]
    NotReady(Vec<ReadinessIssue>),

    #[error("question {number} is incomplete")]
    InvalidQuestion {
        number: usize,
        issues: Vec<QuestionIssue>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Saves the exam and its questions, numbered 1.. in list order.
///
/// The header must be complete and within bounds, with its year inside
/// `years`. Either everything is committed and the new exam id is returned,
/// or nothing is. Draft state is left to the caller.
pub async fn save_exam<S: ExamStore>(
    store: &S,
    header: &ExamHeader,
    questions: &[QuestionDraft],
    years: &RangeInclusive<i32>,
) -> Result<Uuid, SaveError> {
    let (exam, questions) = prepare(header, questions, years)?;

    let mut session = store.acquire_session().await.map_err(|e| {
        tracing::error!("Failed to open a database session: {}", e);
        e
    })?;

    match write_exam(&mut session, &exam, &questions).await {
        Ok(exam_id) => {
            session.commit().await.map_err(|e| {
                tracing::error!("Failed to commit exam '{}': {}", exam.title, e);
                e
            })?;
            tracing::info!(%exam_id, questions = questions.len(), "Saved exam '{}'", exam.title);
            Ok(exam_id)
        }
        Err(e) => {
            tracing::error!("Failed to save exam '{}': {}", exam.title, e);
            if let Err(rollback_err) = session.rollback().await {
                tracing::warn!("Rollback after failed save also failed: {}", rollback_err);
            }
            Err(e.into())
        }
    }
}

async fn write_exam<T: StoreSession>(
    session: &mut T,
    exam: &NewExam,
    questions: &[NewQuestion],
) -> Result<Uuid, StoreError> {
    let exam_id = session.insert_exam(exam).await?;

    for (number, question) in (1..).zip(questions) {
        session.insert_question(exam_id, number, question).await?;
    }

    Ok(exam_id)
}

/// Checks the draft and builds the rows to insert, without touching the database.
fn prepare(
    header: &ExamHeader,
    questions: &[QuestionDraft],
    years: &RangeInclusive<i32>,
) -> Result<(NewExam, Vec<NewQuestion>), SaveError> {
    let issues = check_exam_ready(header, questions, years);
    if !issues.is_empty() {
        return Err(SaveError::NotReady(issues));
    }
    let exam = NewExam::from_header(header).ok_or(SaveError::NotReady(issues))?;

    let questions = questions
        .iter()
        .enumerate()
        .map(|(index, draft)| {
            let number = index + 1;
            let issues = validate_question(draft);
            if !issues.is_empty() {
                return Err(SaveError::InvalidQuestion { number, issues });
            }
            NewQuestion::from_draft(draft).ok_or(SaveError::InvalidQuestion {
                number,
                issues: vec![QuestionIssue::MissingAnswer],
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((exam, questions))
}

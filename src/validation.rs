// src/validation.rs

//! Required-field checks for the composition form and for saving an exam.
//! Every rule is checked on its own, so a form with several gaps reports all
//! of them at once.

use std::{fmt, ops::RangeInclusive};

use serde::Serialize;

use crate::{
    config::{MAX_DURATION_MINUTES, MAX_SUBJECT_CHARS, MIN_DURATION_MINUTES},
    models::{
        exam::ExamHeader,
        question::{AnswerKey, QuestionDraft},
    },
};

/// A reason a question cannot be staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionIssue {
    MissingQuestionText,
    MissingOption(AnswerKey),
    MissingAnswer,
    MissingExplanation,
}

impl fmt::Display for QuestionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionIssue::MissingQuestionText => f.write_str("Question text in English is required"),
            QuestionIssue::MissingOption(key) => write!(f, "Option {key} is required"),
            QuestionIssue::MissingAnswer => f.write_str("Correct answer must be selected"),
            QuestionIssue::MissingExplanation => f.write_str("Explanation in English is required"),
        }
    }
}

/// A reason the draft cannot be saved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessIssue {
    MissingSubject,
    SubjectTooLong,
    MissingExamType,
    MissingYear,
    YearOutOfRange { min: i32, max: i32 },
    DurationOutOfRange,
    NoQuestions,
}

impl fmt::Display for ReadinessIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadinessIssue::MissingSubject => f.write_str("Please select a subject for the exam"),
            ReadinessIssue::SubjectTooLong => {
                write!(f, "Subject must be at most {MAX_SUBJECT_CHARS} characters")
            }
            ReadinessIssue::MissingExamType => f.write_str("Please select an exam type"),
            ReadinessIssue::MissingYear => f.write_str("Please select a year for the exam"),
            ReadinessIssue::YearOutOfRange { min, max } => {
                write!(f, "Year must be between {min} and {max}")
            }
            ReadinessIssue::DurationOutOfRange => write!(
                f,
                "Duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"
            ),
            ReadinessIssue::NoQuestions => {
                f.write_str("Please add at least one question before saving")
            }
        }
    }
}

/// Checks a question before it may be staged. An empty result means it is acceptable.
pub fn validate_question(question: &QuestionDraft) -> Vec<QuestionIssue> {
    let mut issues = Vec::new();

    if question.question.en.trim().is_empty() {
        issues.push(QuestionIssue::MissingQuestionText);
    }

    for key in AnswerKey::ALL {
        if question.options.get(key).trim().is_empty() {
            issues.push(QuestionIssue::MissingOption(key));
        }
    }

    if question.answer.is_none() {
        issues.push(QuestionIssue::MissingAnswer);
    }

    if question.explanation.en.trim().is_empty() {
        issues.push(QuestionIssue::MissingExplanation);
    }

    issues
}

/// Checks the values a header holds, whatever their source. Fields that are
/// still unset are not reported here.
pub fn check_header_bounds(header: &ExamHeader, years: &RangeInclusive<i32>) -> Vec<ReadinessIssue> {
    let mut issues = Vec::new();

    if header.subject.trim().chars().count() > MAX_SUBJECT_CHARS {
        issues.push(ReadinessIssue::SubjectTooLong);
    }
    if header.year.is_some_and(|year| !years.contains(&year)) {
        issues.push(ReadinessIssue::YearOutOfRange {
            min: *years.start(),
            max: *years.end(),
        });
    }
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&header.duration) {
        issues.push(ReadinessIssue::DurationOutOfRange);
    }

    issues
}

/// Checks that the exam header and staged list are ready for the save transaction.
pub fn check_exam_ready(
    header: &ExamHeader,
    staged: &[QuestionDraft],
    years: &RangeInclusive<i32>,
) -> Vec<ReadinessIssue> {
    let mut issues = Vec::new();

    if header.subject.trim().is_empty() {
        issues.push(ReadinessIssue::MissingSubject);
    }
    if header.exam_type.is_none() {
        issues.push(ReadinessIssue::MissingExamType);
    }
    if header.year.is_none() {
        issues.push(ReadinessIssue::MissingYear);
    }
    issues.extend(check_header_bounds(header, years));
    if staged.is_empty() {
        issues.push(ReadinessIssue::NoQuestions);
    }

    issues
}

/// Renders issues as the messages shown to the user.
pub fn messages<T: fmt::Display>(issues: &[T]) -> Vec<String> {
    issues.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        exam::ExamType,
        localized::LocalizedText,
        question::AnswerOptions,
    };

    const YEARS: RangeInclusive<i32> = 2015..=2025;

    fn complete_question() -> QuestionDraft {
        QuestionDraft {
            question: LocalizedText::english("What is the capital of Nigeria?"),
            options: AnswerOptions::new("Lagos", "Abuja", "Kano", "Ibadan"),
            answer: Some(AnswerKey::B),
            explanation: LocalizedText::english("Abuja became the capital in 1991."),
            verbose: LocalizedText::default(),
        }
    }

    #[test]
    fn complete_question_has_no_issues() {
        assert!(validate_question(&complete_question()).is_empty());
    }

    #[test]
    fn missing_text_and_option_c_reports_exactly_two_issues() {
        let mut question = complete_question();
        question.question.en.clear();
        question.options.c.clear();

        let issues = validate_question(&question);
        assert_eq!(
            issues,
            vec![
                QuestionIssue::MissingQuestionText,
                QuestionIssue::MissingOption(AnswerKey::C),
            ]
        );
    }

    #[test]
    fn whitespace_counts_as_empty() {
        let mut question = complete_question();
        question.explanation.en = "  \t".to_string();
        question.options.a = " ".to_string();

        let issues = validate_question(&question);
        assert_eq!(
            issues,
            vec![
                QuestionIssue::MissingOption(AnswerKey::A),
                QuestionIssue::MissingExplanation,
            ]
        );
    }

    #[test]
    fn other_languages_are_optional() {
        let mut question = complete_question();
        question.question.ha.clear();
        question.explanation.yo.clear();
        assert!(validate_question(&question).is_empty());
    }

    #[test]
    fn empty_form_reports_every_rule() {
        let mut question = QuestionDraft::default();
        question.answer = None;

        let messages = messages(&validate_question(&question));
        assert_eq!(
            messages,
            vec![
                "Question text in English is required",
                "Option A is required",
                "Option B is required",
                "Option C is required",
                "Option D is required",
                "Correct answer must be selected",
                "Explanation in English is required",
            ]
        );
    }

    #[test]
    fn readiness_reports_each_missing_piece() {
        let mut header = ExamHeader::new(2024);
        header.year = None;

        let issues = check_exam_ready(&header, &[], &YEARS);
        assert_eq!(
            issues,
            vec![
                ReadinessIssue::MissingSubject,
                ReadinessIssue::MissingExamType,
                ReadinessIssue::MissingYear,
                ReadinessIssue::NoQuestions,
            ]
        );

        header.exam_type = Some(ExamType::Waec);
        header.subject = "English".to_string();
        header.year = Some(2024);
        assert!(check_exam_ready(&header, &[complete_question()], &YEARS).is_empty());
    }

    #[test]
    fn readiness_enforces_header_bounds() {
        let mut header = ExamHeader::new(1850);
        header.exam_type = Some(ExamType::Waec);
        header.subject = "Physics".to_string();
        header.duration = 5;

        let issues = check_exam_ready(&header, &[complete_question()], &YEARS);
        assert_eq!(
            issues,
            vec![
                ReadinessIssue::YearOutOfRange { min: 2015, max: 2025 },
                ReadinessIssue::DurationOutOfRange,
            ]
        );
        assert_eq!(
            messages(&issues),
            vec![
                "Year must be between 2015 and 2025",
                "Duration must be between 15 and 300 minutes",
            ]
        );
    }

    #[test]
    fn header_bounds_ignore_unset_fields() {
        let mut header = ExamHeader::new(2020);
        header.year = None;
        assert!(check_header_bounds(&header, &YEARS).is_empty());

        header.subject = "x".repeat(MAX_SUBJECT_CHARS + 1);
        header.duration = MAX_DURATION_MINUTES + 1;
        assert_eq!(
            check_header_bounds(&header, &YEARS),
            vec![
                ReadinessIssue::SubjectTooLong,
                ReadinessIssue::DurationOutOfRange,
            ]
        );
    }
}

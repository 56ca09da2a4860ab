// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;

use super::localized::{LocalizedText, LocalizedTextPatch};

/// Letter of one of the four answer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four answer options, keyed by letter (`{"A": "...", ..., "D": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerOptions {
    #[serde(rename = "A")]
    pub a: String,
    #[serde(rename = "B")]
    pub b: String,
    #[serde(rename = "C")]
    pub c: String,
    #[serde(rename = "D")]
    pub d: String,
}

impl AnswerOptions {
    pub fn new(a: &str, b: &str, c: &str, d: &str) -> Self {
        Self {
            a: a.to_string(),
            b: b.to_string(),
            c: c.to_string(),
            d: d.to_string(),
        }
    }

    pub fn get(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::A => &self.a,
            AnswerKey::B => &self.b,
            AnswerKey::C => &self.c,
            AnswerKey::D => &self.d,
        }
    }

    pub fn set(&mut self, key: AnswerKey, text: String) {
        match key {
            AnswerKey::A => self.a = text,
            AnswerKey::B => self.b = text,
            AnswerKey::C => self.c = text,
            AnswerKey::D => self.d = text,
        }
    }
}

/// Partial update of [`AnswerOptions`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerOptionsPatch {
    #[serde(rename = "A")]
    pub a: Option<String>,
    #[serde(rename = "B")]
    pub b: Option<String>,
    #[serde(rename = "C")]
    pub c: Option<String>,
    #[serde(rename = "D")]
    pub d: Option<String>,
}

/// A question as it lives in a draft: the composition form and the staged list
/// share this shape. The field names match the JSON kept in client storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    #[serde(default)]
    pub question: LocalizedText,
    #[serde(default)]
    pub options: AnswerOptions,
    #[serde(default)]
    pub answer: Option<AnswerKey>,
    #[serde(default)]
    pub explanation: LocalizedText,
    #[serde(default)]
    pub verbose: LocalizedText,
}

impl Default for QuestionDraft {
    /// The empty composition form. Option A starts out selected.
    fn default() -> Self {
        Self {
            question: LocalizedText::default(),
            options: AnswerOptions::default(),
            answer: Some(AnswerKey::A),
            explanation: LocalizedText::default(),
            verbose: LocalizedText::default(),
        }
    }
}

impl QuestionDraft {
    pub fn apply(&mut self, patch: QuestionPatch) {
        if let Some(question) = patch.question {
            self.question.apply(question);
        }
        if let Some(options) = patch.options {
            let AnswerOptionsPatch { a, b, c, d } = options;
            for (key, text) in [
                (AnswerKey::A, a),
                (AnswerKey::B, b),
                (AnswerKey::C, c),
                (AnswerKey::D, d),
            ] {
                if let Some(text) = text {
                    self.options.set(key, text);
                }
            }
        }
        if let Some(answer) = patch.answer {
            self.answer = Some(answer);
        }
        if let Some(explanation) = patch.explanation {
            self.explanation.apply(explanation);
        }
        if let Some(verbose) = patch.verbose {
            self.verbose.apply(verbose);
        }
    }

    /// English question text cut to `max_chars`, with an ellipsis when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.question.en.trim();
        if text.chars().count() > max_chars {
            let cut: String = text.chars().take(max_chars).collect();
            format!("{cut}...")
        } else {
            text.to_string()
        }
    }
}

/// DTO for filling in the composition form field by field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionPatch {
    pub question: Option<LocalizedTextPatch>,
    pub options: Option<AnswerOptionsPatch>,
    pub answer: Option<AnswerKey>,
    pub explanation: Option<LocalizedTextPatch>,
    pub verbose: Option<LocalizedTextPatch>,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Question {
    pub id: Uuid,
    pub exam_id: Uuid,

    /// 1-based position within the exam.
    pub number: i32,

    /// Stored as JSONB.
    pub question: Json<LocalizedText>,

    pub options: Json<AnswerOptions>,

    /// Letter of the correct option.
    pub answer: String,

    pub explanation: Option<Json<LocalizedText>>,

    /// Extended explanation, NULL when none was written.
    pub verbose: Option<Json<LocalizedText>>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Question content to insert into 'questions'.
/// The owning exam and the number are supplied at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: LocalizedText,
    pub options: AnswerOptions,
    pub answer: AnswerKey,
    pub explanation: LocalizedText,
    pub verbose: Option<LocalizedText>,
}

impl NewQuestion {
    /// Returns `None` when no answer is selected.
    pub fn from_draft(draft: &QuestionDraft) -> Option<Self> {
        Some(Self {
            question: draft.question.clone(),
            options: draft.options.clone(),
            answer: draft.answer?,
            explanation: draft.explanation.clone(),
            verbose: (!draft.verbose.is_blank()).then(|| draft.verbose.clone()),
        })
    }
}

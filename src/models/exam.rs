// src/models/exam.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::question::Question;
use crate::config::DEFAULT_DURATION_MINUTES;

/// Examination body an exam belongs to.
/// Mapped to the Postgres enum `exam_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "exam_type", rename_all = "UPPERCASE")]
pub enum ExamType {
    Waec,
    Neco,
    Jamb,
    Prepquiz,
}

impl ExamType {
    pub const ALL: [ExamType; 4] = [
        ExamType::Waec,
        ExamType::Neco,
        ExamType::Jamb,
        ExamType::Prepquiz,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExamType::Waec => "WAEC",
            ExamType::Neco => "NECO",
            ExamType::Jamb => "JAMB",
            ExamType::Prepquiz => "PREPQUIZ",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the display title of an exam, e.g. "WAEC Mathematics 2024".
/// Empty until type, subject and year are all known.
pub fn derive_title(exam_type: Option<ExamType>, subject: &str, year: Option<i32>) -> String {
    let subject = subject.trim();
    match (exam_type, year) {
        (Some(exam_type), Some(year)) if !subject.is_empty() => {
            format!("{exam_type} {subject} {year}")
        }
        _ => String::new(),
    }
}

fn default_duration() -> i32 {
    DEFAULT_DURATION_MINUTES
}

/// Exam metadata being edited in a draft.
/// The field names match the JSON kept in client storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamHeader {
    #[serde(default)]
    pub exam_type: Option<ExamType>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub year: Option<i32>,
    /// Always derived from type, subject and year.
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_duration")]
    pub duration: i32,
}

impl ExamHeader {
    pub fn new(default_year: i32) -> Self {
        Self {
            exam_type: None,
            subject: String::new(),
            year: Some(default_year),
            title: String::new(),
            duration: DEFAULT_DURATION_MINUTES,
        }
    }

    pub fn refresh_title(&mut self) {
        self.title = derive_title(self.exam_type, &self.subject, self.year);
    }

    pub fn is_complete(&self) -> bool {
        self.exam_type.is_some() && !self.subject.trim().is_empty() && self.year.is_some()
    }

    pub fn apply(&mut self, patch: HeaderPatch) {
        if let Some(exam_type) = patch.exam_type {
            self.exam_type = Some(exam_type);
        }
        if let Some(subject) = patch.subject {
            self.subject = subject.trim().to_string();
        }
        if let Some(year) = patch.year {
            self.year = Some(year);
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        self.refresh_title();
    }
}

/// DTO for editing exam metadata. Fields are optional; the title is not editable.
///
/// A missing field leaves the current value alone, so once `exam_type` or
/// `year` is set a patch can change it but never clear it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HeaderPatch {
    pub exam_type: Option<ExamType>,
    #[validate(length(min = 1, max = 100, message = "Subject must be between 1 and 100 characters."))]
    pub subject: Option<String>,
    pub year: Option<i32>,
    #[validate(range(min = 15, max = 300, message = "Duration must be between 15 and 300 minutes."))]
    pub duration: Option<i32>,
}

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exam {
    pub id: Uuid,
    pub exam_type: ExamType,
    pub subject: String,
    pub year: Option<i32>,
    pub title: Option<String>,
    /// Minutes.
    pub duration: Option<i32>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A saved exam together with its questions, ordered by number.
#[derive(Debug, Clone, Serialize)]
pub struct SavedExam {
    #[serde(flatten)]
    pub exam: Exam,
    pub questions: Vec<Question>,
}

/// Row to insert into 'exams'. Built from a complete [`ExamHeader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExam {
    pub exam_type: ExamType,
    pub subject: String,
    pub year: i32,
    pub title: String,
    pub duration: i32,
}

impl NewExam {
    /// Returns `None` when type, subject or year is missing.
    pub fn from_header(header: &ExamHeader) -> Option<Self> {
        let exam_type = header.exam_type?;
        let year = header.year?;
        let subject = header.subject.trim();
        if subject.is_empty() {
            return None;
        }

        Some(Self {
            exam_type,
            subject: subject.to_string(),
            year,
            title: derive_title(Some(exam_type), subject, Some(year)),
            duration: header.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_joins_type_subject_and_year() {
        for exam_type in ExamType::ALL {
            let title = derive_title(Some(exam_type), "Physics", Some(2021));
            assert_eq!(title, format!("{} Physics 2021", exam_type.as_str()));
        }
    }

    #[test]
    fn title_is_empty_until_complete() {
        assert_eq!(derive_title(None, "Physics", Some(2021)), "");
        assert_eq!(derive_title(Some(ExamType::Jamb), "  ", Some(2021)), "");
        assert_eq!(derive_title(Some(ExamType::Jamb), "Physics", None), "");
    }

    #[test]
    fn changing_one_field_changes_only_that_part_of_the_title() {
        let mut header = ExamHeader::new(2020);
        header.apply(HeaderPatch {
            exam_type: Some(ExamType::Waec),
            subject: Some("Biology".to_string()),
            ..HeaderPatch::default()
        });
        assert_eq!(header.title, "WAEC Biology 2020");

        header.apply(HeaderPatch {
            year: Some(2023),
            ..HeaderPatch::default()
        });
        assert_eq!(header.title, "WAEC Biology 2023");

        header.apply(HeaderPatch {
            exam_type: Some(ExamType::Neco),
            ..HeaderPatch::default()
        });
        assert_eq!(header.title, "NECO Biology 2023");
    }

    #[test]
    fn empty_patch_keeps_type_and_year() {
        let mut header = ExamHeader::new(2020);
        header.apply(HeaderPatch {
            exam_type: Some(ExamType::Jamb),
            subject: Some("Physics".to_string()),
            ..HeaderPatch::default()
        });

        header.apply(HeaderPatch::default());

        assert_eq!(header.exam_type, Some(ExamType::Jamb));
        assert_eq!(header.year, Some(2020));
        assert_eq!(header.title, "JAMB Physics 2020");
    }

    #[test]
    fn exam_type_uses_uppercase_names() {
        let json = serde_json::to_string(&ExamType::Prepquiz).unwrap();
        assert_eq!(json, "\"PREPQUIZ\"");
        let parsed: ExamType = serde_json::from_str("\"JAMB\"").unwrap();
        assert_eq!(parsed, ExamType::Jamb);
    }

    #[test]
    fn header_patch_rejects_out_of_range_duration() {
        let patch = HeaderPatch {
            duration: Some(10),
            ..HeaderPatch::default()
        };
        assert!(patch.validate().is_err());

        let patch = HeaderPatch {
            duration: Some(300),
            ..HeaderPatch::default()
        };
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn new_exam_requires_a_complete_header() {
        let mut header = ExamHeader::new(2024);
        assert!(NewExam::from_header(&header).is_none());

        header.exam_type = Some(ExamType::Waec);
        header.subject = "Chemistry".to_string();
        let exam = NewExam::from_header(&header).unwrap();
        assert_eq!(exam.title, "WAEC Chemistry 2024");
        assert_eq!(exam.duration, 60);
    }
}

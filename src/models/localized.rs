// src/models/localized.rs

use serde::{Deserialize, Serialize};

/// Languages a question can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ha,
    Ig,
    Yo,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Ha, Language::Ig, Language::Yo];

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ha => "ha",
            Language::Ig => "ig",
            Language::Yo => "yo",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ha => "Hausa",
            Language::Ig => "Igbo",
            Language::Yo => "Yoruba",
        }
    }
}

/// Text with one slot per supported language.
/// Stored as a JSON object (`{"en": "...", "ha": "...", ...}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizedText {
    pub en: String,
    pub ha: String,
    pub ig: String,
    pub yo: String,
}

impl LocalizedText {
    pub fn english(text: impl Into<String>) -> Self {
        Self {
            en: text.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Ha => &self.ha,
            Language::Ig => &self.ig,
            Language::Yo => &self.yo,
        }
    }

    pub fn set(&mut self, language: Language, text: String) {
        match language {
            Language::En => self.en = text,
            Language::Ha => self.ha = text,
            Language::Ig => self.ig = text,
            Language::Yo => self.yo = text,
        }
    }

    /// True when every language slot is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        Language::ALL
            .iter()
            .all(|language| self.get(*language).trim().is_empty())
    }

    pub fn apply(&mut self, patch: LocalizedTextPatch) {
        let LocalizedTextPatch { en, ha, ig, yo } = patch;
        for (language, text) in [
            (Language::En, en),
            (Language::Ha, ha),
            (Language::Ig, ig),
            (Language::Yo, yo),
        ] {
            if let Some(text) = text {
                self.set(language, text);
            }
        }
    }
}

/// Partial update of a [`LocalizedText`]; absent languages are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalizedTextPatch {
    pub en: Option<String>,
    pub ha: Option<String>,
    pub ig: Option<String>,
    pub yo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_languages_default_to_empty() {
        let text: LocalizedText = serde_json::from_str(r#"{"en": "Hello"}"#).unwrap();
        assert_eq!(text.en, "Hello");
        assert_eq!(text.yo, "");
        assert!(!text.is_blank());
    }

    #[test]
    fn patch_only_touches_given_languages() {
        let mut text = LocalizedText::english("What is 2 + 2?");
        text.apply(LocalizedTextPatch {
            ha: Some("Menene 2 + 2?".to_string()),
            ..LocalizedTextPatch::default()
        });

        assert_eq!(text.en, "What is 2 + 2?");
        assert_eq!(text.get(Language::Ha), "Menene 2 + 2?");
        assert_eq!(text.ig, "");
    }

    #[test]
    fn whitespace_only_is_blank() {
        let text = LocalizedText::english("   \n");
        assert!(text.is_blank());
    }
}

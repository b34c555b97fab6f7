use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// School level a quiz is generated for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    Primary,
    Middle,
    High,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 3] = [
        EducationLevel::Primary,
        EducationLevel::Middle,
        EducationLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::Primary => "primary",
            EducationLevel::Middle => "middle",
            EducationLevel::High => "high",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier; each tier is generated as an independent batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Recognition,
    Understanding,
    Application,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Recognition,
        Difficulty::Understanding,
        Difficulty::Application,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Recognition => "recognition",
            Difficulty::Understanding => "understanding",
            Difficulty::Application => "application",
        }
    }

    /// Display label shown next to each question
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Recognition => "Nhận biết",
            Difficulty::Understanding => "Thông hiểu",
            Difficulty::Application => "Vận dụng",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated multiple-choice item. Immutable once built by the generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String, // "A", "B", "C" or "D"
    pub explanation: String,
    pub difficulty: Difficulty,
    pub difficulty_label: String,
}

/// Per-tier question counts for one quiz
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultyDistribution {
    pub recognition: usize,
    pub understanding: usize,
    pub application: usize,
}

impl DifficultyDistribution {
    pub fn count_for(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Recognition => self.recognition,
            Difficulty::Understanding => self.understanding,
            Difficulty::Application => self.application,
        }
    }

    pub fn total(&self) -> usize {
        self.recognition + self.understanding + self.application
    }
}

/// Credential and model preference passed explicitly into generate/chat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSettings {
    pub api_key: Option<String>,
    pub preferred_model: Option<String>,
}

impl GenerationSettings {
    pub fn new(api_key: impl Into<String>, preferred_model: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            preferred_model: Some(preferred_model.into()),
        }
    }

    /// Returns the credential if one is configured and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// A tier that produced no questions, with the reason surfaced by the fallback chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TierFailure {
    pub difficulty: Difficulty,
    pub requested: usize,
    pub error: String,
}

/// Result of a generation run; partial tier failures are reported, not hidden
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestionSet {
    pub questions: Vec<Question>,
    pub failed_tiers: Vec<TierFailure>,
    pub requested: usize,
}

impl GeneratedQuestionSet {
    pub fn is_partial(&self) -> bool {
        !self.failed_tiers.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One prior turn of a tutor conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Inline image attached to the newest chat turn, already stripped of its data-URL prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// History entry written when a learner finishes a quiz
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptRecord {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub grade: u8,
    pub topic: String,
    pub score: usize,
    pub total_questions: usize,
    pub level: EducationLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    pub level: EducationLevel,
    pub grade: u8,
    pub topic: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreQuizRequest {
    pub level: EducationLevel,
    pub grade: u8,
    pub topic: String,
    pub questions: Vec<Question>,
    pub answers: HashMap<String, String>, // question id -> chosen letter
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub message: String,
    pub image: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub has_api_key: bool,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_serializes_camel_case() {
        let question = Question {
            id: "q-1".to_string(),
            text: "1 + 1 = ?".to_string(),
            options: vec!["A. 1".into(), "B. 2".into(), "C. 3".into(), "D. 4".into()],
            correct_answer: "B".to_string(),
            explanation: "- Step: 1 + 1 = 2\n=> B".to_string(),
            difficulty: Difficulty::Recognition,
            difficulty_label: Difficulty::Recognition.label().to_string(),
        };

        let value = serde_json::to_value(&question).unwrap();
        assert_eq!(value["correctAnswer"], "B");
        assert_eq!(value["difficulty"], "recognition");
        assert_eq!(value["difficultyLabel"], "Nhận biết");
    }

    #[test]
    fn test_credential_ignores_blank_keys() {
        let blank = GenerationSettings {
            api_key: Some("   ".to_string()),
            preferred_model: None,
        };
        assert_eq!(blank.credential(), None);
        assert_eq!(GenerationSettings::default().credential(), None);
        assert_eq!(GenerationSettings::new("key", "m").credential(), Some("key"));
    }

    #[test]
    fn test_level_parsing() {
        let level: EducationLevel = serde_json::from_str("\"middle\"").unwrap();
        assert_eq!(level, EducationLevel::Middle);
        assert!(serde_json::from_str::<EducationLevel>("\"college\"").is_err());
    }
}

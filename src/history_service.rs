use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::Database;
use crate::fallback::DEFAULT_MODEL;
use crate::models::{
    EducationLevel, GenerationSettings, Question, QuizAttemptRecord, SettingsView,
};

pub const API_KEY_KEY: &str = "gemini_api_key";
pub const MODEL_KEY: &str = "gemini_model";
pub const HISTORY_KEY: &str = "math_quiz_history";

/// Settings and attempt history kept in the local key-value store
#[derive(Clone)]
pub struct HistoryService {
    db: Database,
    defaults: GenerationSettings,
    history_lock: Arc<Mutex<()>>,
}

impl HistoryService {
    /// `defaults` fill in whatever the learner has not stored
    pub fn new(db: Database, defaults: GenerationSettings) -> Self {
        Self {
            db,
            defaults,
            history_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Request overrides first, then stored values, then server defaults
    pub async fn resolve_settings(
        &self,
        api_key: Option<String>,
        model: Option<String>,
    ) -> Result<GenerationSettings> {
        let stored = self.stored_settings().await?;
        Ok(GenerationSettings {
            api_key: non_blank(api_key)
                .or(stored.api_key)
                .or_else(|| self.defaults.api_key.clone()),
            preferred_model: non_blank(model)
                .or(stored.preferred_model)
                .or_else(|| self.defaults.preferred_model.clone()),
        })
    }

    pub async fn settings_view(&self) -> Result<SettingsView> {
        let settings = self.resolve_settings(None, None).await?;
        Ok(SettingsView {
            has_api_key: settings.credential().is_some(),
            model: settings
                .preferred_model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// A blank value removes the stored setting
    pub async fn save_settings(&self, api_key: Option<String>, model: Option<String>) -> Result<()> {
        for (key, value) in [(API_KEY_KEY, api_key), (MODEL_KEY, model)] {
            match non_blank(value) {
                Some(value) => self.db.set(key, &value).await?,
                None => {
                    self.db.remove(key).await?;
                }
            }
        }
        info!("Settings saved");
        Ok(())
    }

    async fn stored_settings(&self) -> Result<GenerationSettings> {
        Ok(GenerationSettings {
            api_key: non_blank(self.db.get(API_KEY_KEY).await?),
            preferred_model: non_blank(self.db.get(MODEL_KEY).await?),
        })
    }

    /// Attempts, newest first. Unreadable history is treated as empty.
    pub async fn list_history(&self) -> Result<Vec<QuizAttemptRecord>> {
        let Some(raw) = self.db.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "Failed to parse stored quiz history, ignoring it");
                Ok(Vec::new())
            }
        }
    }

    pub async fn record_attempt(&self, record: QuizAttemptRecord) -> Result<()> {
        let _guard = self.history_lock.lock().await;

        let mut records = self.list_history().await?;
        records.insert(0, record);
        self.db
            .set(HISTORY_KEY, &serde_json::to_string(&records)?)
            .await?;

        info!(history_len = records.len(), "Quiz attempt recorded");
        Ok(())
    }

    pub async fn clear_history(&self) -> Result<()> {
        let _guard = self.history_lock.lock().await;
        self.db.remove(HISTORY_KEY).await?;
        info!("Quiz history cleared");
        Ok(())
    }
}

/// One point per question whose chosen letter matches the correct answer
pub fn score_attempt(questions: &[Question], answers: &HashMap<String, String>) -> usize {
    questions
        .iter()
        .filter(|question| {
            answers
                .get(&question.id)
                .is_some_and(|answer| answer.trim().eq_ignore_ascii_case(&question.correct_answer))
        })
        .count()
}

pub fn build_attempt_record(
    level: EducationLevel,
    grade: u8,
    topic: &str,
    questions: &[Question],
    answers: &HashMap<String, String>,
) -> QuizAttemptRecord {
    QuizAttemptRecord {
        id: Uuid::new_v4(),
        date: Utc::now(),
        grade,
        topic: topic.to_string(),
        score: score_attempt(questions, answers),
        total_questions: questions.len(),
        level,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

use futures_util::future::join_all;
use rand::seq::SliceRandom;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::curriculum::{distribution_for, is_valid_grade};
use crate::errors::QuizError;
use crate::fallback::{ModelChain, ModelFallbackInvoker};
use crate::llm_providers::StructuredRequest;
use crate::models::{
    Difficulty, DifficultyDistribution, EducationLevel, GeneratedQuestionSet, GenerationSettings,
    Question, TierFailure,
};
use crate::prompts::TierPrompt;
use crate::schema::{self, RawQuestion};
use crate::{log_performance, log_validation};

/// Outcome of one tier's fallback chain
#[derive(Debug)]
struct TierOutcome {
    difficulty: Difficulty,
    requested: usize,
    result: Result<Vec<Question>, QuizError>,
}

/// Builds a full question set by generating every difficulty tier concurrently
#[derive(Clone)]
pub struct QuestionSetGenerator {
    invoker: ModelFallbackInvoker,
}

impl QuestionSetGenerator {
    pub fn new(invoker: ModelFallbackInvoker) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &ModelFallbackInvoker {
        &self.invoker
    }

    pub async fn generate(
        &self,
        settings: &GenerationSettings,
        level: EducationLevel,
        grade: u8,
        topic: &str,
    ) -> Result<GeneratedQuestionSet, QuizError> {
        if settings.credential().is_none() {
            return Err(QuizError::MissingCredential);
        }

        let topic = topic.trim();
        if topic.is_empty() {
            log_validation!(failure, "quiz_request", error = "empty topic");
            return Err(QuizError::InvalidRequest("topic must not be empty".to_string()));
        }
        if !is_valid_grade(level, grade) {
            log_validation!(failure, "quiz_request", error = format!("grade {} for {}", grade, level));
            return Err(QuizError::InvalidRequest(format!(
                "grade {} is not part of the {} level",
                grade, level
            )));
        }

        info!(level = %level, grade = grade, topic = %topic, "Generating question set");
        self.generate_with_distribution(settings, distribution_for(level, grade), grade, topic)
            .await
    }

    /// Generate against an explicit distribution; tiers with a zero count never reach the provider
    pub async fn generate_with_distribution(
        &self,
        settings: &GenerationSettings,
        distribution: DifficultyDistribution,
        grade: u8,
        topic: &str,
    ) -> Result<GeneratedQuestionSet, QuizError> {
        let api_key = settings.credential().ok_or(QuizError::MissingCredential)?;
        let chain = ModelChain::with_preferred(settings.preferred_model.as_deref());
        let started = Instant::now();

        info!(
            recognition = distribution.recognition,
            understanding = distribution.understanding,
            application = distribution.application,
            models = ?chain.models(),
            "Dispatching tier requests"
        );

        let outcomes = join_all(Difficulty::ALL.iter().map(|&difficulty| {
            self.generate_tier(
                api_key,
                difficulty,
                distribution.count_for(difficulty),
                grade,
                topic,
                &chain,
            )
        }))
        .await;

        let set = merge_tiers(outcomes, distribution.total())?;

        log_performance!(
            "generate_question_set",
            duration_ms = started.elapsed().as_millis() as u64,
            count = set.questions.len()
        );
        Ok(set)
    }

    async fn generate_tier(
        &self,
        api_key: &str,
        difficulty: Difficulty,
        count: usize,
        grade: u8,
        topic: &str,
        chain: &ModelChain,
    ) -> TierOutcome {
        if count == 0 {
            return TierOutcome {
                difficulty,
                requested: 0,
                result: Ok(Vec::new()),
            };
        }

        let request = StructuredRequest {
            prompt: TierPrompt {
                count,
                difficulty,
                grade,
                topic,
            }
            .render(),
            schema: schema::response_schema(),
        };
        let operation = format!("generate_{}", difficulty);

        let result = self
            .invoker
            .invoke_structured(&operation, api_key, &request, chain)
            .await
            .map(|raw| {
                raw.into_iter()
                    .map(|question| normalize_question(question, difficulty))
                    .collect()
            });

        TierOutcome {
            difficulty,
            requested: count,
            result,
        }
    }
}

/// Concatenate the tiers that succeeded and shuffle; fail only when nothing came back
fn merge_tiers(
    outcomes: Vec<TierOutcome>,
    requested: usize,
) -> Result<GeneratedQuestionSet, QuizError> {
    let mut questions = Vec::with_capacity(requested);
    let mut failed_tiers = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(tier_questions) => questions.extend(tier_questions),
            Err(error) => {
                warn!(
                    difficulty = %outcome.difficulty,
                    requested = outcome.requested,
                    error = %error,
                    "Tier generation failed"
                );
                failed_tiers.push(TierFailure {
                    difficulty: outcome.difficulty,
                    requested: outcome.requested,
                    error: error.to_string(),
                });
            }
        }
    }

    if questions.is_empty() {
        return Err(QuizError::GenerationFailed);
    }

    questions.shuffle(&mut rand::thread_rng());

    Ok(GeneratedQuestionSet {
        questions,
        failed_tiers,
        requested,
    })
}

fn normalize_question(raw: RawQuestion, difficulty: Difficulty) -> Question {
    Question {
        id: format!("{}-{}", difficulty, Uuid::new_v4()),
        text: raw.text,
        options: raw.options,
        correct_answer: normalize_answer(raw.correct_answer.as_deref()),
        explanation: raw.explanation,
        difficulty,
        difficulty_label: difficulty.label().to_string(),
    }
}

/// Reduce a model-supplied answer to a single letter A-D.
///
/// A standalone letter token wins ("Answer: B!" gives "B"); otherwise the
/// first A-D character anywhere; otherwise "A". Unlike plain stripping of
/// every non A-D character, a lowercase standalone letter ("b") counts.
pub fn normalize_answer(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or_default();

    let standalone = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find(|token| matches!(*token, "A" | "B" | "C" | "D" | "a" | "b" | "c" | "d"));
    if let Some(token) = standalone {
        return token.to_ascii_uppercase();
    }

    raw.chars()
        .find(|c| matches!(c, 'A' | 'B' | 'C' | 'D'))
        .unwrap_or('A')
        .to_string()
}

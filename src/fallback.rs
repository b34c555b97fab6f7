//! Linear model fallback.
//!
//! Each invocation walks a [`ModelChain`] from the head, making exactly one
//! attempt per model and never two at once. Every attempt yields an
//! [`Attempt`]; [`decide`] turns it into return, continue or fail. Nothing is
//! remembered between invocations.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::errors::{QuizError, is_rate_limit_message, redact_secret};
use crate::llm_providers::{ChatTurnRequest, ModelClient, StructuredRequest};
use crate::log_llm_operation;
use crate::schema::{self, RawQuestion};

/// Model tried first when the user has not chosen one
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Models tried after the preferred one, in this order
pub const FALLBACK_ORDER: [&str; 4] = [
    "gemini-3-flash-preview",
    "gemini-3-pro-preview",
    "gemini-2.5-flash",
    "gemini-2.5-pro",
];

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(60);

/// Ordered, duplicate-free list of model identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain {
    models: Vec<String>,
}

impl ModelChain {
    /// Keeps the first occurrence of each identifier and skips blank ones
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for model in models {
            let model = model.into().trim().to_string();
            if !model.is_empty() && !unique.contains(&model) {
                unique.push(model);
            }
        }
        Self { models: unique }
    }

    /// Preferred model first, then the fixed fallback order
    pub fn with_preferred(preferred: Option<&str>) -> Self {
        let head = preferred.unwrap_or(DEFAULT_MODEL);
        Self::new(std::iter::once(head).chain(FALLBACK_ORDER))
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }
}

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptError {
    Provider(String),
    Schema(String),
    Timeout(Duration),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Provider(message) => f.write_str(message),
            AttemptError::Schema(message) => write!(f, "invalid response: {}", message),
            AttemptError::Timeout(limit) => {
                write!(f, "no response within {}s", limit.as_secs_f32())
            }
        }
    }
}

/// One model tried once
#[derive(Debug)]
pub struct Attempt<T> {
    pub model: String,
    pub outcome: Result<T, AttemptError>,
}

#[derive(Debug)]
pub enum Decision<T> {
    Return(T),
    Continue,
    Fail(QuizError),
}

/// Continue past any failure except the last; classify that one
pub fn decide<T>(attempt: Attempt<T>, is_last: bool) -> Decision<T> {
    match attempt.outcome {
        Ok(value) => Decision::Return(value),
        Err(_) if !is_last => Decision::Continue,
        Err(error) => Decision::Fail(classify_final_error(&error)),
    }
}

/// Map the error of the last model in the chain onto the user-facing taxonomy
pub fn classify_final_error(error: &AttemptError) -> QuizError {
    match error {
        AttemptError::Schema(message) => QuizError::SchemaViolation(message.clone()),
        AttemptError::Provider(message) if is_rate_limit_message(message) => {
            QuizError::ProviderExhausted
        }
        other => QuizError::ConnectionFailed(other.to_string()),
    }
}

/// Provider failure with the credential replaced by a placeholder
fn provider_error(error: &anyhow::Error, api_key: &str) -> AttemptError {
    AttemptError::Provider(redact_secret(&format!("{:#}", error), api_key))
}

/// Runs one logical request against a chain of models until one succeeds
#[derive(Clone)]
pub struct ModelFallbackInvoker {
    client: Arc<dyn ModelClient>,
    attempt_timeout: Duration,
}

impl ModelFallbackInvoker {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn provider_name(&self) -> &'static str {
        self.client.provider_name()
    }

    /// Structured generation. Non-JSON or empty output counts as a failed attempt.
    pub async fn invoke_structured(
        &self,
        operation: &str,
        api_key: &str,
        request: &StructuredRequest,
        chain: &ModelChain,
    ) -> Result<Vec<RawQuestion>, QuizError> {
        let client = &self.client;
        self.run(operation, chain, move |model| async move {
            let body = client
                .generate_structured(api_key, &model, request)
                .await
                .map_err(|e| provider_error(&e, api_key))?;
            schema::validate_response(&body).map_err(|e| match e {
                QuizError::SchemaViolation(message) => AttemptError::Schema(message),
                other => AttemptError::Schema(other.to_string()),
            })
        })
        .await
    }

    /// Chat turn. Any text, including an empty one, is a success.
    pub async fn invoke_chat(
        &self,
        operation: &str,
        api_key: &str,
        request: &ChatTurnRequest,
        chain: &ModelChain,
    ) -> Result<String, QuizError> {
        let client = &self.client;
        self.run(operation, chain, move |model| async move {
            client
                .chat(api_key, &model, request)
                .await
                .map_err(|e| provider_error(&e, api_key))
        })
        .await
    }

    async fn run<T, F, Fut>(
        &self,
        operation: &str,
        chain: &ModelChain,
        mut call: F,
    ) -> Result<T, QuizError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        if chain.is_empty() {
            return Err(QuizError::ConnectionFailed(
                "no candidate models configured".to_string(),
            ));
        }

        let last = chain.len() - 1;
        for (index, model) in chain.iter().enumerate() {
            log_llm_operation!(attempt, operation, model = model, index = index + 1, of = chain.len());

            let outcome = match tokio::time::timeout(self.attempt_timeout, call(model.to_string())).await {
                Ok(outcome) => outcome,
                Err(_) => Err(AttemptError::Timeout(self.attempt_timeout)),
            };
            let attempt = Attempt {
                model: model.to_string(),
                outcome,
            };

            if let Err(error) = &attempt.outcome {
                log_llm_operation!(failed, operation, model = model, error = error, last = index == last);
            }

            match decide(attempt, index == last) {
                Decision::Return(value) => {
                    log_llm_operation!(success, operation, model = model, index = index + 1);
                    return Ok(value);
                }
                Decision::Continue => continue,
                Decision::Fail(error) => {
                    log_llm_operation!(exhausted, operation, models = chain.len(), error = error);
                    return Err(error);
                }
            }
        }

        // The last attempt always resolves to Return or Fail above.
        debug!(operation = %operation, "Fallback chain ended without a decision");
        Err(QuizError::ConnectionFailed("fallback chain ended unexpectedly".to_string()))
    }
}

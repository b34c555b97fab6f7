use crate::api::ApiResponse;
use axum::{http::StatusCode, response::Json};
use tracing::{error, info, warn};

/// Failures surfaced by question generation and the tutor chat
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuizError {
    #[error("API key not found. Please set it in Settings.")]
    MissingCredential,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model returned an invalid response: {0}")]
    SchemaViolation(String),

    #[error("The system is overloaded (429 RESOURCE_EXHAUSTED). Please try again later or change the API key.")]
    ProviderExhausted,

    #[error("Connection failed: {0}. Please check the API key.")]
    ConnectionFailed(String),

    #[error("Could not generate questions. Every model failed; please check the API key and quota.")]
    GenerationFailed,
}

/// Centralized error types for consistent API error handling
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("LLM service error: {0}")]
    LLMError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] anyhow::Error),
}

impl From<QuizError> for ApiError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::MissingCredential => ApiError::MissingCredential(err.to_string()),
            QuizError::InvalidRequest(message) => ApiError::ValidationError(message),
            QuizError::ProviderExhausted => ApiError::RateLimited(err.to_string()),
            QuizError::SchemaViolation(_)
            | QuizError::ConnectionFailed(_)
            | QuizError::GenerationFailed => ApiError::LLMError(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(anyhow::Error::from(err))
    }
}

/// Error context for structured logging
#[derive(Debug)]
pub struct ErrorContext {
    pub operation: String,
    pub resource_type: String,
    pub detail: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str, resource_type: &str) -> Self {
        Self {
            operation: operation.to_string(),
            resource_type: resource_type.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::MissingCredential(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::LLMError(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert API error to HTTP response with consistent structure and logging
    pub fn to_response_with_context(
        self,
        context: ErrorContext,
    ) -> (StatusCode, Json<ApiResponse<()>>) {
        let status = self.status_code();
        let message = match &self {
            ApiError::ValidationError(message)
            | ApiError::MissingCredential(message)
            | ApiError::RateLimited(message)
            | ApiError::LLMError(message) => message.clone(),
            ApiError::DatabaseError(_) => "Storage operation failed. Please try again.".to_string(),
        };

        match &self {
            ApiError::ValidationError(_) | ApiError::MissingCredential(_) => {
                info!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    detail = ?context.detail,
                    error = %self,
                    "Rejected request"
                );
            }
            ApiError::RateLimited(_) | ApiError::LLMError(_) => {
                warn!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    detail = ?context.detail,
                    error = %self,
                    "LLM service error"
                );
            }
            ApiError::DatabaseError(_) => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    detail = ?context.detail,
                    error = %self,
                    "Database error"
                );
            }
        }

        (status, Json(ApiResponse::error(message)))
    }
}

/// Replace every occurrence of `secret` in a provider message
pub fn redact_secret(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        return message.to_string();
    }
    message.replace(secret, "[redacted]")
}

/// Messages from the provider that indicate quota or rate limiting
pub fn is_rate_limit_message(message: &str) -> bool {
    message.contains("429") || message.contains("RESOURCE_EXHAUSTED")
}

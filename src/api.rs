use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::{
    chat_service::ChatService,
    curriculum::{self, CurriculumOverview},
    errors::{ApiError, ErrorContext},
    history_service::{HistoryService, build_attempt_record},
    models::*,
    question_generator::QuestionSetGenerator,
};

// Import logging macros
use crate::{log_api_start, log_api_success, log_api_warn};

#[derive(Clone)]
pub struct AppState {
    pub generator: QuestionSetGenerator,
    pub chat_service: ChatService,
    pub history: HistoryService,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn fail(error: impl Into<ApiError>, operation: &str, resource_type: &str) -> (StatusCode, Json<ApiResponse<()>>) {
    error
        .into()
        .to_response_with_context(ErrorContext::new(operation, resource_type))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_curriculum() -> Json<ApiResponse<CurriculumOverview>> {
    Json(ApiResponse::success(curriculum::overview()))
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuizRequest>,
) -> ApiResult<GeneratedQuestionSet> {
    log_api_start!("generate_quiz", level = request.level, grade = request.grade);

    let settings = state
        .history
        .resolve_settings(request.api_key, request.model)
        .await
        .map_err(|e| fail(e, "generate_quiz", "settings"))?;

    let set = state
        .generator
        .generate(&settings, request.level, request.grade, &request.topic)
        .await
        .map_err(|e| {
            ApiError::from(e).to_response_with_context(
                ErrorContext::new("generate_quiz", "question_set").with_detail(&request.topic),
            )
        })?;

    if set.is_partial() {
        log_api_warn!(
            "generate_quiz",
            count = set.failed_tiers.len(),
            format!("returning {} of {} questions", set.questions.len(), set.requested)
        );
    }
    log_api_success!("generate_quiz", count = set.questions.len(), "question set generated");

    Ok(Json(ApiResponse::success(set)))
}

pub async fn score_quiz(
    State(state): State<AppState>,
    Json(request): Json<ScoreQuizRequest>,
) -> ApiResult<QuizAttemptRecord> {
    log_api_start!("score_quiz", level = request.level, grade = request.grade);

    if request.questions.is_empty() {
        return Err(fail(
            ApiError::ValidationError("cannot score an attempt without questions".to_string()),
            "score_quiz",
            "attempt",
        ));
    }

    let record = build_attempt_record(
        request.level,
        request.grade,
        &request.topic,
        &request.questions,
        &request.answers,
    );

    state
        .history
        .record_attempt(record.clone())
        .await
        .map_err(|e| fail(e, "score_quiz", "history"))?;

    info!(
        attempt_id = %record.id,
        score = record.score,
        total = record.total_questions,
        "Quiz attempt scored"
    );

    Ok(Json(ApiResponse::success(record)))
}

pub async fn list_history(State(state): State<AppState>) -> ApiResult<Vec<QuizAttemptRecord>> {
    log_api_start!("list_history");

    let records = state
        .history
        .list_history()
        .await
        .map_err(|e| fail(e, "list_history", "history"))?;

    log_api_success!("list_history", count = records.len(), "history listed");
    Ok(Json(ApiResponse::success(records)))
}

pub async fn clear_history(State(state): State<AppState>) -> ApiResult<()> {
    log_api_start!("clear_history");

    state
        .history
        .clear_history()
        .await
        .map_err(|e| fail(e, "clear_history", "history"))?;

    log_api_success!("clear_history", "history cleared");
    Ok(Json(ApiResponse::success(())))
}

pub async fn get_settings(State(state): State<AppState>) -> ApiResult<SettingsView> {
    let view = state
        .history
        .settings_view()
        .await
        .map_err(|e| fail(e, "get_settings", "settings"))?;

    Ok(Json(ApiResponse::success(view)))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<SettingsView> {
    log_api_start!("update_settings");

    state
        .history
        .save_settings(request.api_key, request.model)
        .await
        .map_err(|e| fail(e, "update_settings", "settings"))?;

    let view = state
        .history
        .settings_view()
        .await
        .map_err(|e| fail(e, "update_settings", "settings"))?;

    log_api_success!("update_settings", "settings saved");
    Ok(Json(ApiResponse::success(view)))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatReply> {
    log_api_start!("chat");

    let settings = state
        .history
        .resolve_settings(request.api_key, request.model)
        .await
        .map_err(|e| fail(e, "chat", "settings"))?;

    let reply = state
        .chat_service
        .chat(&settings, &request.history, &request.message, request.image.as_deref())
        .await
        .map_err(|e| fail(e, "chat", "chat_reply"))?;

    log_api_success!("chat", "tutor replied");
    Ok(Json(ApiResponse::success(ChatReply { reply })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/curriculum", get(get_curriculum))

        // Quiz routes
        .route("/api/quiz/generate", post(generate_quiz))
        .route("/api/quiz/score", post(score_quiz))

        // History and settings routes
        .route("/api/history", get(list_history).delete(clear_history))
        .route("/api/settings", get(get_settings).put(update_settings))

        // Tutor chat
        .route("/api/chat", post(chat))

        .with_state(state)
}
